//! Chat dispatcher: delivers user messages with a two-stage fallback.
//!
//! Every non-empty `send` appends exactly one user message and exactly one
//! assistant message. The reply comes from the primary endpoint, else the
//! secondary endpoint, else a fixed local fallback text.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use zion_core::config::ChatConfig;
use zion_core::portal::PortalId;
use zion_core::types::{ConversationMessage, MessageOrigin};

use crate::backend::{
    ChatBackend, DispatchTarget, HttpBackend, OutboundRequest, PrimaryContext, PrimaryRequest,
    SecondaryRequest, GENERAL_CONTEXT,
};
use crate::error::ChatError;
use crate::session::{SessionEvent, SessionState, SharedSession, Transition};
use crate::state::{DispatchPhase, PhaseTracker};

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Ok,
    NetworkError,
    NonOkStatus,
    MalformedReply,
}

impl AttemptOutcome {
    fn from_error(err: &ChatError) -> Self {
        match err {
            ChatError::Status(_) => AttemptOutcome::NonOkStatus,
            ChatError::MalformedReply(_) => AttemptOutcome::MalformedReply,
            _ => AttemptOutcome::NetworkError,
        }
    }
}

/// One delivery attempt of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchAttempt {
    pub text: String,
    pub target: DispatchTarget,
    pub outcome: AttemptOutcome,
}

/// What a settled dispatch did.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Terminal phase: `Succeeded` or `LocalFallback`.
    pub phase: DispatchPhase,
    pub attempts: Vec<DispatchAttempt>,
    /// The assistant message appended to the log.
    pub reply: ConversationMessage,
}

impl DispatchReport {
    /// Which attempt produced the reply.
    pub fn resolved_by(&self) -> DispatchTarget {
        match self.reply.origin() {
            MessageOrigin::Primary => DispatchTarget::Primary,
            MessageOrigin::Secondary => DispatchTarget::Secondary,
            _ => DispatchTarget::LocalFallback,
        }
    }
}

/// Per-deployment dispatch settings.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub user_id: String,
    pub platform: String,
    pub max_message_length: usize,
    pub welcome_message: String,
    pub fallback_reply: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for DispatchSettings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            user_id: config.user_id.clone(),
            platform: config.platform.clone(),
            max_message_length: config.max_message_length,
            welcome_message: config.welcome_message.clone(),
            fallback_reply: config.fallback_reply.clone(),
        }
    }
}

/// Lowers the typing indicator when a dispatch ends, including when the
/// `send` future is dropped mid-flight.
struct PendingGuard<'a> {
    session: &'a SharedSession,
}

impl<'a> PendingGuard<'a> {
    fn raise(session: &'a SharedSession) -> Self {
        session.apply(SessionEvent::DispatchStarted);
        Self { session }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.session.apply(SessionEvent::DispatchSettled);
    }
}

/// Sends user messages and records the conversation.
///
/// Concurrent `send` calls are serialized: each appends its user message at
/// once, then waits its turn before contacting the endpoints, so replies are
/// appended in submission order.
pub struct ChatDispatcher {
    backend: Arc<dyn ChatBackend>,
    session: SharedSession,
    settings: DispatchSettings,
    session_id: Uuid,
    turn: AsyncMutex<()>,
}

impl std::fmt::Debug for ChatDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDispatcher")
            .field("session_id", &self.session_id)
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatDispatcher {
    /// Create a dispatcher with a fresh session.
    pub fn new(backend: Arc<dyn ChatBackend>, settings: DispatchSettings) -> Self {
        Self::with_session(backend, settings, SharedSession::default())
    }

    /// Create a dispatcher that records into an existing session.
    pub fn with_session(
        backend: Arc<dyn ChatBackend>,
        settings: DispatchSettings,
        session: SharedSession,
    ) -> Self {
        Self {
            backend,
            session,
            settings,
            session_id: Uuid::new_v4(),
            turn: AsyncMutex::new(()),
        }
    }

    /// Create a dispatcher talking HTTP to the configured endpoints.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatError> {
        let backend = HttpBackend::from_config(config)?;
        Ok(Self::new(Arc::new(backend), DispatchSettings::from(config)))
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// A copy of the session state.
    pub fn state(&self) -> SessionState {
        self.session.snapshot()
    }

    /// Seed the welcome message if the conversation has not started yet.
    pub fn welcome(&self) -> Option<ConversationMessage> {
        if self.session.read(|s| !s.log().is_empty()) {
            return None;
        }
        let message = ConversationMessage::assistant(
            self.settings.welcome_message.clone(),
            MessageOrigin::System,
        );
        self.session
            .apply(SessionEvent::AssistantMessage(message.clone()));
        Some(message)
    }

    /// Deliver one user utterance.
    ///
    /// Returns `None` for empty or whitespace-only input, which leaves the log
    /// untouched. Otherwise always appends one user and one assistant message;
    /// no delivery failure escapes.
    pub async fn send(&self, text: &str) -> Option<DispatchReport> {
        let text = self.normalize(text)?;
        let module = self.session.read(|s| s.active_portal());

        self.session
            .apply(SessionEvent::UserMessage(ConversationMessage::user(text.clone())));
        let _pending = PendingGuard::raise(&self.session);

        let _turn = self.turn.lock().await;
        let report = match self.run_chain(&text, module).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Dispatch chain broke; using local fallback");
                self.local_fallback(&text, Vec::new(), DispatchPhase::LocalFallback)
            }
        };

        self.session
            .apply(SessionEvent::AssistantMessage(report.reply.clone()));
        info!(
            resolved_by = %report.resolved_by(),
            attempts = report.attempts.len(),
            "Dispatch settled"
        );
        Some(report)
    }

    /// Enter a portal: make it the active module and post its notice.
    pub fn enter_portal(&self, portal: PortalId) -> ConversationMessage {
        let text = self
            .session
            .read(|s| portal.portal().arrival_message(s.data()));
        let message = ConversationMessage::assistant(text, MessageOrigin::System);
        self.session.apply(SessionEvent::PortalEntered(portal));
        self.session
            .apply(SessionEvent::AssistantMessage(message.clone()));
        debug!(portal = %portal, "Portal entered");
        message
    }

    /// Leave the active portal. Returns the portal left, if any.
    pub fn leave_portal(&self) -> Option<PortalId> {
        let portal = self.session.read(|s| s.active_portal())?;
        match self.session.apply(SessionEvent::PortalLeft) {
            Transition::Applied => {
                debug!(portal = %portal, "Portal left");
                Some(portal)
            }
            Transition::Ignored => None,
        }
    }

    /// Run one of a portal's actions as a chat message.
    pub async fn portal_action(&self, portal: PortalId, action: &str) -> Option<DispatchReport> {
        if action.trim().is_empty() {
            return None;
        }
        self.send(&portal.portal().action_utterance(action)).await
    }

    /// Record a task locally and confirm it in the conversation.
    pub fn create_task(&self, title: &str) -> Option<ConversationMessage> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let task = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": title,
            "done": false,
            "created_at": Utc::now(),
        });
        let message = ConversationMessage::assistant(
            format!("Task \"{}\" has been encoded into the productivity matrix.", title),
            MessageOrigin::System,
        );
        self.session.apply(SessionEvent::TaskRecorded(task));
        self.session
            .apply(SessionEvent::AssistantMessage(message.clone()));
        Some(message)
    }

    // -- Private helpers --

    fn normalize(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let limit = self.settings.max_message_length;
        if text.chars().count() > limit {
            warn!(limit, "Message too long; truncating");
            let truncated: String = text.chars().take(limit).collect();
            return Some(truncated.trim_end().to_string());
        }
        Some(text.to_string())
    }

    async fn run_chain(
        &self,
        text: &str,
        module: Option<PortalId>,
    ) -> Result<DispatchReport, ChatError> {
        let mut phase = PhaseTracker::new();
        let mut attempts = Vec::with_capacity(2);

        phase.advance(DispatchPhase::Sending)?;
        let primary = OutboundRequest::Primary(PrimaryRequest {
            message: text.to_string(),
            user_id: self.settings.user_id.clone(),
            platform: self.settings.platform.clone(),
            timestamp: Utc::now(),
            context: PrimaryContext {
                module,
                session_id: self.session_id,
            },
        });
        if let Some(reply) = self.attempt(&primary, &mut attempts).await {
            phase.advance(DispatchPhase::Succeeded)?;
            return Ok(self.report(phase, attempts, reply, MessageOrigin::Primary));
        }

        phase.advance(DispatchPhase::FallbackSending)?;
        let secondary = OutboundRequest::Secondary(SecondaryRequest {
            message: text.to_string(),
            context: module
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| GENERAL_CONTEXT.to_string()),
        });
        if let Some(reply) = self.attempt(&secondary, &mut attempts).await {
            phase.advance(DispatchPhase::Succeeded)?;
            return Ok(self.report(phase, attempts, reply, MessageOrigin::Secondary));
        }

        phase.advance(DispatchPhase::LocalFallback)?;
        Ok(self.local_fallback(text, attempts, phase.current()))
    }

    async fn attempt(
        &self,
        request: &OutboundRequest,
        attempts: &mut Vec<DispatchAttempt>,
    ) -> Option<String> {
        let target = request.target();
        debug!(target = %target, "Dispatch attempt");
        let (outcome, reply) = match self.backend.deliver(request).await {
            Ok(reply) => (AttemptOutcome::Ok, Some(reply)),
            Err(e) => {
                warn!(target = %target, error = %e, "Dispatch attempt failed");
                (AttemptOutcome::from_error(&e), None)
            }
        };
        attempts.push(DispatchAttempt {
            text: request.message().to_string(),
            target,
            outcome,
        });
        reply
    }

    fn report(
        &self,
        phase: PhaseTracker,
        attempts: Vec<DispatchAttempt>,
        reply: String,
        origin: MessageOrigin,
    ) -> DispatchReport {
        DispatchReport {
            phase: phase.current(),
            attempts,
            reply: ConversationMessage::assistant(reply, origin),
        }
    }

    fn local_fallback(
        &self,
        text: &str,
        mut attempts: Vec<DispatchAttempt>,
        phase: DispatchPhase,
    ) -> DispatchReport {
        attempts.push(DispatchAttempt {
            text: text.to_string(),
            target: DispatchTarget::LocalFallback,
            outcome: AttemptOutcome::Ok,
        });
        DispatchReport {
            phase,
            attempts,
            reply: ConversationMessage::assistant(
                self.settings.fallback_reply.clone(),
                MessageOrigin::LocalFallback,
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use zion_core::types::{ConnectionStatus, DataSnapshot, Role, Subscription};

    /// Backend answering from a per-target script and recording requests.
    #[derive(Default)]
    struct ScriptedBackend {
        primary: Mutex<VecDeque<Result<String, ChatError>>>,
        secondary: Mutex<VecDeque<Result<String, ChatError>>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedBackend {
        fn new(
            primary: Vec<Result<String, ChatError>>,
            secondary: Vec<Result<String, ChatError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                primary: Mutex::new(primary.into()),
                secondary: Mutex::new(secondary.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<OutboundRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn deliver(&self, request: &OutboundRequest) -> Result<String, ChatError> {
            self.seen.lock().unwrap().push(request.clone());
            tokio::task::yield_now().await;
            let script = match request.target() {
                DispatchTarget::Primary => &self.primary,
                _ => &self.secondary,
            };
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Network("script exhausted".into())))
        }
    }

    fn dispatcher(backend: Arc<ScriptedBackend>) -> ChatDispatcher {
        ChatDispatcher::new(backend, DispatchSettings::default())
    }

    fn down() -> Result<String, ChatError> {
        Err(ChatError::Network("connection refused".into()))
    }

    // ---- Input handling ----

    #[tokio::test]
    async fn test_empty_and_whitespace_input_is_noop() {
        let backend = ScriptedBackend::new(vec![], vec![]);
        let d = dispatcher(backend.clone());
        for input in ["", "   ", "\n\t "] {
            assert!(d.send(input).await.is_none());
        }
        assert!(d.state().log().is_empty());
        assert!(!d.state().is_pending());
        assert!(backend.seen().is_empty());
    }

    #[tokio::test]
    async fn test_input_is_trimmed() {
        let backend = ScriptedBackend::new(vec![Ok("hi".into())], vec![]);
        let d = dispatcher(backend.clone());
        d.send("  hello zion  ").await.unwrap();
        assert_eq!(d.state().log().messages()[0].text(), "hello zion");
        assert_eq!(backend.seen()[0].message(), "hello zion");
    }

    #[tokio::test]
    async fn test_long_input_is_truncated() {
        let backend = ScriptedBackend::new(vec![Ok("ok".into())], vec![]);
        let settings = DispatchSettings {
            max_message_length: 5,
            ..DispatchSettings::default()
        };
        let d = ChatDispatcher::new(backend.clone(), settings);
        d.send("abcdefghij").await.unwrap();
        assert_eq!(backend.seen()[0].message(), "abcde");
    }

    #[tokio::test]
    async fn test_truncation_drops_trailing_whitespace() {
        let backend = ScriptedBackend::new(vec![Ok("ok".into())], vec![]);
        let settings = DispatchSettings {
            max_message_length: 4,
            ..DispatchSettings::default()
        };
        let d = ChatDispatcher::new(backend.clone(), settings);
        d.send("abc     def").await.unwrap();
        assert_eq!(backend.seen()[0].message(), "abc");
        assert_eq!(d.state().log().messages()[0].text(), "abc");
    }

    // ---- Fallback chain ----

    #[tokio::test]
    async fn test_primary_success() {
        let backend = ScriptedBackend::new(vec![Ok("from webhook".into())], vec![]);
        let d = dispatcher(backend.clone());

        let report = d.send("status?").await.unwrap();
        assert_eq!(report.phase, DispatchPhase::Succeeded);
        assert_eq!(report.resolved_by(), DispatchTarget::Primary);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(report.attempts[0].outcome, AttemptOutcome::Ok);

        let state = d.state();
        assert_eq!(state.log().len(), 2);
        assert_eq!(state.log().messages()[0].role(), Role::User);
        assert_eq!(state.log().last_assistant().unwrap().text(), "from webhook");
        assert!(!state.is_pending());
        assert_eq!(backend.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_primary_status_error_falls_back_to_secondary() {
        let backend = ScriptedBackend::new(vec![Err(ChatError::Status(500))], vec![Ok("ok".into())]);
        let d = dispatcher(backend.clone());

        let report = d.send("hello").await.unwrap();
        assert_eq!(report.phase, DispatchPhase::Succeeded);
        assert_eq!(report.resolved_by(), DispatchTarget::Secondary);
        assert_eq!(
            report.attempts.iter().map(|a| a.outcome).collect::<Vec<_>>(),
            vec![AttemptOutcome::NonOkStatus, AttemptOutcome::Ok]
        );

        let state = d.state();
        assert_eq!(state.log().len(), 2);
        assert_eq!(state.log().last_assistant().unwrap().text(), "ok");
        assert_eq!(
            state.log().last_assistant().unwrap().origin(),
            MessageOrigin::Secondary
        );
    }

    #[tokio::test]
    async fn test_both_down_uses_local_fallback() {
        let backend = ScriptedBackend::new(vec![down()], vec![Err(ChatError::Timeout(15))]);
        let d = dispatcher(backend);

        let report = d.send("anyone there?").await.unwrap();
        assert_eq!(report.phase, DispatchPhase::LocalFallback);
        assert_eq!(report.resolved_by(), DispatchTarget::LocalFallback);
        assert_eq!(
            report.attempts.iter().map(|a| a.target).collect::<Vec<_>>(),
            vec![
                DispatchTarget::Primary,
                DispatchTarget::Secondary,
                DispatchTarget::LocalFallback
            ]
        );

        let state = d.state();
        assert_eq!(state.log().len(), 2);
        let reply = state.log().last_assistant().unwrap();
        assert_eq!(reply.text(), DispatchSettings::default().fallback_reply);
        assert_eq!(reply.origin(), MessageOrigin::LocalFallback);
        assert!(!state.is_pending());
    }

    #[tokio::test]
    async fn test_malformed_primary_reply_triggers_secondary() {
        let backend = ScriptedBackend::new(
            vec![Err(ChatError::MalformedReply("no reply".into()))],
            vec![Ok("backup".into())],
        );
        let d = dispatcher(backend);
        let report = d.send("hi").await.unwrap();
        assert_eq!(report.attempts[0].outcome, AttemptOutcome::MalformedReply);
        assert_eq!(report.reply.text(), "backup");
    }

    #[tokio::test]
    async fn test_every_path_adds_exactly_two_messages() {
        let backend = ScriptedBackend::new(
            vec![Ok("a".into()), down(), down()],
            vec![Ok("b".into()), down()],
        );
        let d = dispatcher(backend);
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            d.send(text).await.unwrap();
            assert_eq!(d.state().log().len(), (i + 1) * 2);
        }
        let origins: Vec<MessageOrigin> = d
            .state()
            .log()
            .messages()
            .iter()
            .filter(|m| m.role() == Role::Assistant)
            .map(|m| m.origin())
            .collect();
        assert_eq!(
            origins,
            vec![
                MessageOrigin::Primary,
                MessageOrigin::Secondary,
                MessageOrigin::LocalFallback
            ]
        );
    }

    // ---- Context ----

    #[tokio::test]
    async fn test_context_follows_active_portal() {
        let backend = ScriptedBackend::new(vec![down()], vec![Ok("fine".into())]);
        let d = dispatcher(backend.clone());
        d.enter_portal(PortalId::Tasks);
        d.send("what is due?").await.unwrap();

        let seen = backend.seen();
        match &seen[0] {
            OutboundRequest::Primary(req) => {
                assert_eq!(req.context.module, Some(PortalId::Tasks));
                assert_eq!(req.context.session_id, d.session_id());
                assert_eq!(req.user_id, "zion-user");
            }
            other => panic!("expected primary request, got {:?}", other),
        }
        match &seen[1] {
            OutboundRequest::Secondary(req) => assert_eq!(req.context, "tasks"),
            other => panic!("expected secondary request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_secondary_context_defaults_to_general() {
        let backend = ScriptedBackend::new(vec![down()], vec![Ok("fine".into())]);
        let d = dispatcher(backend.clone());
        d.send("hello").await.unwrap();
        match &backend.seen()[1] {
            OutboundRequest::Secondary(req) => assert_eq!(req.context, GENERAL_CONTEXT),
            other => panic!("expected secondary request, got {:?}", other),
        }
    }

    // ---- Concurrency ----

    #[tokio::test]
    async fn test_concurrent_sends_are_serialized() {
        let backend = ScriptedBackend::new(vec![Ok("first".into()), Ok("second".into())], vec![]);
        let d = dispatcher(backend);

        let (a, b) = tokio::join!(d.send("one"), d.send("two"));
        assert_eq!(a.unwrap().reply.text(), "first");
        assert_eq!(b.unwrap().reply.text(), "second");

        let state = d.state();
        assert_eq!(state.log().len(), 4);
        assert!(!state.is_pending());
        let texts: Vec<&str> = state.log().messages().iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["one", "two", "first", "second"]);
    }

    #[tokio::test]
    async fn test_dropped_send_clears_pending() {
        let backend = ScriptedBackend::new(vec![Ok("never seen".into())], vec![]);
        let d = dispatcher(backend);

        let held = d.turn.lock().await;
        {
            let fut = d.send("stuck");
            tokio::pin!(fut);
            let polled = tokio::time::timeout(std::time::Duration::from_millis(20), &mut fut).await;
            assert!(polled.is_err(), "send should wait for its turn");
            assert!(d.state().is_pending());
        }
        drop(held);
        assert!(!d.state().is_pending());
        assert_eq!(d.state().log().len(), 1);
    }

    // ---- Local notices ----

    #[tokio::test]
    async fn test_welcome_only_once() {
        let d = dispatcher(ScriptedBackend::new(vec![], vec![]));
        assert!(d.welcome().is_some());
        assert!(d.welcome().is_none());
        assert_eq!(d.state().log().len(), 1);
        assert_eq!(d.state().log().messages()[0].origin(), MessageOrigin::System);
    }

    #[tokio::test]
    async fn test_enter_subscriptions_portal_reports_total() {
        let d = dispatcher(ScriptedBackend::new(vec![], vec![]));
        d.session().apply(SessionEvent::DataLoaded {
            data: DataSnapshot {
                subscriptions: vec![
                    Subscription::new("Netflix", "15.99"),
                    Subscription::new("Spotify", "9.99"),
                ],
                ..DataSnapshot::default()
            },
            status: ConnectionStatus::Connected,
        });

        let notice = d.enter_portal(PortalId::Subscriptions);
        assert_eq!(
            notice.text(),
            "Financial dimension unlocked. Monitoring 2 active subscriptions totaling $25.98/month."
        );
        let state = d.state();
        assert_eq!(state.active_portal(), Some(PortalId::Subscriptions));
        assert!(state.is_chat_open());
    }

    #[tokio::test]
    async fn test_leave_portal_restores_general_context() {
        let backend = ScriptedBackend::new(vec![down()], vec![Ok("fine".into())]);
        let d = dispatcher(backend.clone());
        assert_eq!(d.leave_portal(), None);

        d.enter_portal(PortalId::Ai);
        assert_eq!(d.leave_portal(), Some(PortalId::Ai));
        assert_eq!(d.state().active_portal(), None);
        assert!(d.state().is_chat_open());

        d.send("hello again").await.unwrap();
        match &backend.seen()[1] {
            OutboundRequest::Secondary(req) => assert_eq!(req.context, GENERAL_CONTEXT),
            other => panic!("expected secondary request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_portal_action_sends_utterance() {
        let backend = ScriptedBackend::new(vec![Ok("done".into())], vec![]);
        let d = dispatcher(backend.clone());
        d.portal_action(PortalId::Analytics, "View Reports").await.unwrap();
        assert_eq!(backend.seen()[0].message(), "View Reports for Analytics Portal");
        assert!(d.portal_action(PortalId::Analytics, "  ").await.is_none());
    }

    #[tokio::test]
    async fn test_create_task_records_and_confirms() {
        let d = dispatcher(ScriptedBackend::new(vec![], vec![]));
        let message = d.create_task("  Renew passport ").unwrap();
        assert_eq!(
            message.text(),
            "Task \"Renew passport\" has been encoded into the productivity matrix."
        );
        let state = d.state();
        assert_eq!(state.data().tasks.len(), 1);
        assert_eq!(state.data().tasks[0]["title"], "Renew passport");
        assert!(d.create_task("   ").is_none());
    }
}
