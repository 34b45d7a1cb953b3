//! Per-dispatch state machine.
//!
//! Valid transitions:
//! - Idle -> Sending (primary attempt begins)
//! - Sending -> Succeeded (primary replied)
//! - Sending -> FallbackSending (primary failed, secondary attempt begins)
//! - FallbackSending -> Succeeded (secondary replied)
//! - FallbackSending -> LocalFallback (secondary failed)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Phase of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchPhase {
    Idle,
    Sending,
    FallbackSending,
    Succeeded,
    LocalFallback,
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPhase::Idle => write!(f, "Idle"),
            DispatchPhase::Sending => write!(f, "Sending"),
            DispatchPhase::FallbackSending => write!(f, "FallbackSending"),
            DispatchPhase::Succeeded => write!(f, "Succeeded"),
            DispatchPhase::LocalFallback => write!(f, "LocalFallback"),
        }
    }
}

impl DispatchPhase {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &DispatchPhase) -> bool {
        matches!(
            (self, target),
            (DispatchPhase::Idle, DispatchPhase::Sending)
                | (DispatchPhase::Sending, DispatchPhase::Succeeded)
                | (DispatchPhase::Sending, DispatchPhase::FallbackSending)
                | (DispatchPhase::FallbackSending, DispatchPhase::Succeeded)
                | (DispatchPhase::FallbackSending, DispatchPhase::LocalFallback)
        )
    }
}

/// Tracks the phase of one dispatch.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: DispatchPhase,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: DispatchPhase::Idle,
        }
    }

    pub fn current(&self) -> DispatchPhase {
        self.current
    }

    /// Attempt to move to `target`.
    pub fn advance(&mut self, target: DispatchPhase) -> Result<(), ChatError> {
        if !self.current.can_transition_to(&target) {
            return Err(ChatError::InvalidTransition {
                from: self.current,
                to: target,
            });
        }
        tracing::debug!("Dispatch phase: {} -> {}", self.current, target);
        self.current = target;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
