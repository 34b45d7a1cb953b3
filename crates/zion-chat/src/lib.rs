//! Conversational core of Zion.
//!
//! A [`ChatDispatcher`] delivers each user message to the primary webhook,
//! falls back to the secondary endpoint, and finally to a fixed local reply,
//! recording everything in the shared [`SharedSession`]. [`VoiceInput`] feeds
//! recognized speech into the same path.

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod log;
pub mod session;
pub mod state;
pub mod voice;

pub use backend::{
    extract_reply, ChatBackend, DispatchTarget, HttpBackend, OutboundRequest, PrimaryContext,
    PrimaryRequest, SecondaryRequest,
};
pub use dispatcher::{
    AttemptOutcome, ChatDispatcher, DispatchAttempt, DispatchReport, DispatchSettings,
};
pub use error::ChatError;
pub use log::ConversationLog;
pub use session::{SessionEvent, SessionState, SharedSession, Transition};
pub use state::{DispatchPhase, PhaseTracker};
pub use voice::{CommandRecognizer, SpeechRecognizer, VoiceCapability, VoiceInput};
