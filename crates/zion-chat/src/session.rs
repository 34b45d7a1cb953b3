//! Session state.
//!
//! Everything a front-end renders (conversation, typing indicator, listening
//! state, active portal, loaded data) lives in one [`SessionState`] value that
//! only changes through [`SessionEvent`]s.

use std::sync::{Arc, Mutex, MutexGuard};

use zion_core::portal::PortalId;
use zion_core::types::{ConnectionStatus, ConversationMessage, DataSnapshot};

use crate::log::ConversationLog;

/// A state change triggered by one user action or dispatch step.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The user's own words, appended before any network activity.
    UserMessage(ConversationMessage),
    /// A reply or notice from the assistant.
    AssistantMessage(ConversationMessage),
    /// A dispatch was accepted; raises the typing indicator.
    DispatchStarted,
    /// A dispatch reached a terminal phase.
    DispatchSettled,
    PortalEntered(PortalId),
    /// Back to general chat; the panel stays open.
    PortalLeft,
    ListeningStarted,
    ListeningStopped,
    /// Business data arrived from the cache or the feed.
    DataLoaded {
        data: DataSnapshot,
        status: ConnectionStatus,
    },
    ConnectionChanged(ConnectionStatus),
    TaskRecorded(serde_json::Value),
}

/// Whether an event changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The event made no sense in the current state and was dropped.
    Ignored,
}

/// The full observable state of one chat session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    log: ConversationLog,
    outstanding_dispatches: usize,
    listening: bool,
    chat_open: bool,
    active_portal: Option<PortalId>,
    connection: ConnectionStatus,
    data: DataSnapshot,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: SessionEvent) -> Transition {
        match event {
            SessionEvent::UserMessage(message) | SessionEvent::AssistantMessage(message) => {
                self.log.append(message);
            }
            SessionEvent::DispatchStarted => {
                self.outstanding_dispatches += 1;
            }
            SessionEvent::DispatchSettled => {
                if self.outstanding_dispatches == 0 {
                    tracing::warn!("Dispatch settled with no dispatch outstanding");
                    return Transition::Ignored;
                }
                self.outstanding_dispatches -= 1;
            }
            SessionEvent::PortalEntered(portal) => {
                self.active_portal = Some(portal);
                self.chat_open = true;
            }
            SessionEvent::PortalLeft => {
                if self.active_portal.take().is_none() {
                    return Transition::Ignored;
                }
            }
            SessionEvent::ListeningStarted => {
                if self.listening {
                    return Transition::Ignored;
                }
                self.listening = true;
                self.chat_open = true;
            }
            SessionEvent::ListeningStopped => {
                if !self.listening {
                    return Transition::Ignored;
                }
                self.listening = false;
            }
            SessionEvent::DataLoaded { data, status } => {
                self.data = data;
                self.connection = status;
            }
            SessionEvent::ConnectionChanged(status) => self.connection = status,
            SessionEvent::TaskRecorded(task) => self.data.tasks.push(task),
        }
        Transition::Applied
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The typing indicator: true while any dispatch is queued or in flight.
    pub fn is_pending(&self) -> bool {
        self.outstanding_dispatches > 0
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_chat_open(&self) -> bool {
        self.chat_open
    }

    pub fn active_portal(&self) -> Option<PortalId> {
        self.active_portal
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn data(&self) -> &DataSnapshot {
        &self.data
    }
}

/// A [`SessionState`] shared between the dispatcher, voice input and UI.
///
/// The lock is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionState>>,
}

impl SharedSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // Events apply atomically, so a poisoned state is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn apply(&self, event: SessionEvent) -> Transition {
        self.lock().apply(event)
    }

    /// Read from the state without cloning it.
    pub fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        f(&self.lock())
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
