//! Error types for transfer encoding, signing and reconciliation
//!
//! Every variant carries enough context (field, contract, step) for the
//! caller to decide whether a rerun is safe.

use alloy::primitives::Address;
use thiserror::Error;

use crate::reconcile::ReconcileStep;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    // ========================================================================
    // Local validation errors (raised before any external call)
    // ========================================================================

    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Field overflow: {field} = {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: String,
        bits: u32,
    },

    #[error("Invalid transfer payload: {0}")]
    InvalidPayload(String),

    // ========================================================================
    // Signing primitive errors
    // ========================================================================

    #[error("Signing primitive unavailable: {0}")]
    SigningUnavailable(String),

    #[error("Signing primitive returned malformed output: {0}")]
    SigningProtocolError(String),

    // ========================================================================
    // Collaborator errors
    // ========================================================================

    #[error("{step} failed on {contract}: {source}")]
    CollaboratorCallFailed {
        step: ReconcileStep,
        contract: Address,
        #[source]
        source: CallError,
    },

    #[error("Precondition failed at {step} on {contract}: {reason}")]
    PrecheckFailed {
        step: ReconcileStep,
        contract: Address,
        reason: String,
    },
}

impl BridgeError {
    pub(crate) fn invalid_amount(input: &str, reason: impl Into<String>) -> Self {
        BridgeError::InvalidAmount {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap a collaborator failure with the step that issued it.
    ///
    /// A call rejected because the contract is paused becomes
    /// [`BridgeError::PrecheckFailed`]; everything else is
    /// [`BridgeError::CollaboratorCallFailed`].
    pub fn from_call(step: ReconcileStep, contract: Address, source: CallError) -> Self {
        match source {
            CallError::Paused(reason) => BridgeError::PrecheckFailed {
                step,
                contract,
                reason,
            },
            source => BridgeError::CollaboratorCallFailed {
                step,
                contract,
                source,
            },
        }
    }

    /// Errors after which rerunning the same operation can make progress.
    ///
    /// Signing failures are excluded: the payload/key pair is unchanged, so a
    /// rerun would hit the same environment defect.
    pub fn is_rerunnable(&self) -> bool {
        matches!(
            self,
            BridgeError::CollaboratorCallFailed { .. } | BridgeError::PrecheckFailed { .. }
        )
    }
}

/// Failure reported by a chain collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The contract rejected the call because it is paused.
    #[error("contract is paused: {0}")]
    Paused(String),

    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Classify a raw revert/transport message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_ascii_lowercase().contains("paused") {
            CallError::Paused(message)
        } else {
            CallError::Failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::Mutation;

    #[test]
    fn test_call_error_classification() {
        assert_eq!(
            CallError::from_message("execution reverted: Pausable: paused"),
            CallError::Paused("execution reverted: Pausable: paused".to_string())
        );
        assert_eq!(
            CallError::from_message("connection refused"),
            CallError::Failed("connection refused".to_string())
        );
    }

    #[test]
    fn test_paused_call_becomes_precheck_failure() {
        let step = ReconcileStep::Apply(Mutation::SetCanDeposit { id: 3 });
        let err = BridgeError::from_call(step, Address::ZERO, CallError::Paused("paused".into()));
        assert!(matches!(err, BridgeError::PrecheckFailed { .. }));
        assert!(err.is_rerunnable());
    }

    #[test]
    fn test_failed_call_keeps_step_context() {
        let step = ReconcileStep::QueryToken { id: 7 };
        let err = BridgeError::from_call(step, Address::ZERO, CallError::Failed("timeout".into()));
        let msg = err.to_string();
        assert!(msg.contains("query token 7"), "unexpected message: {}", msg);
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_signing_errors_are_not_rerunnable() {
        assert!(!BridgeError::SigningUnavailable("missing".into()).is_rerunnable());
        assert!(!BridgeError::SigningProtocolError("bad json".into()).is_rerunnable());
    }
}
