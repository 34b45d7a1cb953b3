//! Error types for chat dispatch and voice input.

use crate::state::DispatchPhase;

/// Errors from the chat engine.
///
/// Dispatch errors are recovered inside the dispatcher (primary failure
/// triggers the secondary attempt, secondary failure the local fallback).
/// Voice errors are returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("endpoint returned HTTP {0}")]
    Status(u16),
    #[error("reply could not be read: {0}")]
    MalformedReply(String),
    #[error("invalid dispatch transition: {from} -> {to}")]
    InvalidTransition { from: DispatchPhase, to: DispatchPhase },
    #[error("voice input is unavailable")]
    VoiceUnavailable,
    #[error("voice input is already listening")]
    VoiceBusy,
    #[error("voice error: {0}")]
    Voice(String),
    #[error("client setup failed: {0}")]
    Setup(String),
}
