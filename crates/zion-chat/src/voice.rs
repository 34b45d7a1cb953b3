//! Voice capture adapter.
//!
//! Speech recognition is an injected capability. When present, a recognized
//! transcript is handed to the dispatcher exactly like typed input; a stopped
//! or failed recognition appends nothing.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use zion_core::config::VoiceConfig;

use crate::dispatcher::{ChatDispatcher, DispatchReport};
use crate::error::ChatError;
use crate::session::{SessionEvent, SharedSession, Transition};

/// Environment variable carrying the recognition language to the command.
pub const LANGUAGE_ENV: &str = "ZION_VOICE_LANG";

/// Turns one utterance into text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for one utterance. `Ok(None)` means stopped or nothing heard.
    async fn recognize(&self) -> Result<Option<String>, ChatError>;

    /// Stop an in-progress `recognize`, which then resolves to `Ok(None)`.
    fn abort(&self);
}

/// Whether speech recognition exists on this host.
#[derive(Clone, Default)]
pub enum VoiceCapability {
    Available(Arc<dyn SpeechRecognizer>),
    #[default]
    Unavailable,
}

impl fmt::Debug for VoiceCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceCapability::Available(_) => write!(f, "Available"),
            VoiceCapability::Unavailable => write!(f, "Unavailable"),
        }
    }
}

impl VoiceCapability {
    /// Build the capability from configuration.
    pub fn from_config(config: &VoiceConfig) -> Self {
        if !config.enabled {
            return VoiceCapability::Unavailable;
        }
        match CommandRecognizer::from_config(config) {
            Some(recognizer) => VoiceCapability::Available(Arc::new(recognizer)),
            None => {
                warn!("Voice input enabled but no recognizer command configured");
                VoiceCapability::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, VoiceCapability::Available(_))
    }
}

/// Runs an external speech-to-text command; its trimmed stdout is the
/// transcript.
#[derive(Debug)]
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    language: String,
    stop: Notify,
}

impl CommandRecognizer {
    /// `command[0]` is the program, the rest its arguments. `None` if empty.
    pub fn new(command: &[String], language: impl Into<String>) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            language: language.into(),
            stop: Notify::new(),
        })
    }

    pub fn from_config(config: &VoiceConfig) -> Option<Self> {
        Self::new(&config.command, config.language.clone())
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn recognize(&self) -> Result<Option<String>, ChatError> {
        let stopped = self.stop.notified();
        let child = Command::new(&self.program)
            .args(&self.args)
            .env(LANGUAGE_ENV, &self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatError::Voice(format!("failed to start {}: {}", self.program, e)))?;

        debug!(program = %self.program, "Recognizer started");

        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|e| ChatError::Voice(e.to_string()))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(ChatError::Voice(format!(
                        "recognizer exited with {}: {}",
                        output.status,
                        stderr.trim()
                    )));
                }
                let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Ok((!transcript.is_empty()).then_some(transcript))
            }
            _ = stopped => {
                debug!("Recognizer stopped");
                Ok(None)
            }
        }
    }

    fn abort(&self) {
        self.stop.notify_waiters();
    }
}

/// Clears the listening flag however a listen ends.
struct ListeningGuard<'a> {
    session: &'a SharedSession,
}

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.session.apply(SessionEvent::ListeningStopped);
    }
}

/// Voice entry point of a chat session.
#[derive(Debug, Clone)]
pub struct VoiceInput {
    capability: VoiceCapability,
    session: SharedSession,
}

impl VoiceInput {
    /// `session` must be the dispatcher's session.
    pub fn new(capability: VoiceCapability, session: SharedSession) -> Self {
        Self {
            capability,
            session,
        }
    }

    pub fn for_dispatcher(capability: VoiceCapability, dispatcher: &ChatDispatcher) -> Self {
        Self::new(capability, dispatcher.session().clone())
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_available()
    }

    /// Listen for one utterance and send it.
    ///
    /// Returns the dispatch report when a transcript was sent, `None` when
    /// recognition was stopped or heard nothing.
    pub async fn listen(
        &self,
        dispatcher: &ChatDispatcher,
    ) -> Result<Option<DispatchReport>, ChatError> {
        let recognizer = match &self.capability {
            VoiceCapability::Available(recognizer) => Arc::clone(recognizer),
            VoiceCapability::Unavailable => return Err(ChatError::VoiceUnavailable),
        };
        if self.session.apply(SessionEvent::ListeningStarted) == Transition::Ignored {
            return Err(ChatError::VoiceBusy);
        }

        let transcript = {
            let _listening = ListeningGuard {
                session: &self.session,
            };
            recognizer.recognize().await
        };

        match transcript {
            Ok(Some(text)) => {
                info!(chars = text.chars().count(), "Voice transcript received");
                Ok(dispatcher.send(&text).await)
            }
            Ok(None) => {
                debug!("Voice input ended without a transcript");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Voice recognition failed");
                Err(e)
            }
        }
    }

    /// Stop listening.
    pub fn stop(&self) {
        if let VoiceCapability::Available(recognizer) = &self.capability {
            recognizer.abort();
        }
        self.session.apply(SessionEvent::ListeningStopped);
    }
}

// =============================================================================
// Tests
// =============================================================================
