//! Bridge and token configuration reconciliation
//!
//! Brings deployed contracts into the required configuration: validators
//! hold the `deposit` role on the bridge, each bridge token id is registered
//! and enabled, the bridge holds the roles it needs on each token, and
//! tokens are unpaused.
//!
//! Each pass reads current state, computes a plan with the pure functions in
//! [`plan`], and applies it. Every mutation is preceded by a state check,
//! so a pass is idempotent and a failed pass can simply be rerun.
//!
//! ## Submodules
//!
//! - `collaborators` - Traits for the bridge and token contracts
//! - `plan` - Pure planning from a state snapshot to a mutation list
//! - `executor` - Runs passes against live collaborators

pub mod collaborators;
pub mod executor;
pub mod plan;

pub use collaborators::{AccessControl, BridgeContract, CallResult, TokenContract};
pub use executor::{
    reconcile_operator, reconcile_token, reconcile_token_with_operator, reconcile_validators,
    Reconciler,
};
pub use plan::{
    plan_operator, plan_operator_grants, plan_registration, plan_token, plan_validators,
    OperatorSnapshot, TokenSnapshot, TokenTarget,
};

use alloy::primitives::{Address, TxHash};
use serde::Serialize;
use std::fmt;

use crate::roles::Role;

/// Which collaborator a call is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    Bridge,
    Token,
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Bridge => f.write_str("bridge"),
            ContractKind::Token => f.write_str("token"),
        }
    }
}

/// A single state-changing call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    GrantRole {
        on: ContractKind,
        role: Role,
        account: Address,
    },
    AddToken {
        id: u32,
        is_wrapped: bool,
        decimals: u8,
        token: Address,
    },
    SetCanWithdraw {
        id: u32,
    },
    SetCanDeposit {
        id: u32,
    },
    Unpause,
}

impl Mutation {
    pub fn target(&self) -> ContractKind {
        match self {
            Mutation::GrantRole { on, .. } => *on,
            Mutation::AddToken { .. }
            | Mutation::SetCanWithdraw { .. }
            | Mutation::SetCanDeposit { .. } => ContractKind::Bridge,
            Mutation::Unpause => ContractKind::Token,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::GrantRole { on, role, account } => {
                write!(f, "grant {} to {} on {}", role, account, on)
            }
            Mutation::AddToken {
                id,
                is_wrapped,
                decimals,
                token,
            } => write!(
                f,
                "register token {} as {} (wrapped: {}, decimals: {})",
                id, token, is_wrapped, decimals
            ),
            Mutation::SetCanWithdraw { id } => write!(f, "enable withdraw for token {}", id),
            Mutation::SetCanDeposit { id } => write!(f, "enable deposit for token {}", id),
            Mutation::Unpause => f.write_str("unpause token"),
        }
    }
}

/// The call a reconciliation error happened in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStep {
    QueryToken {
        id: u32,
    },
    QueryRole {
        on: ContractKind,
        role: Role,
        account: Address,
    },
    Apply(Mutation),
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStep::QueryToken { id } => write!(f, "query token {}", id),
            ReconcileStep::QueryRole { on, role, account } => {
                write!(f, "query {} role of {} on {}", role, account, on)
            }
            ReconcileStep::Apply(mutation) => write!(f, "{}", mutation),
        }
    }
}

/// A mutation that was sent, with the contract it went to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedMutation {
    pub mutation: Mutation,
    pub contract: Address,
    pub tx_hash: TxHash,
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Mutations sent, in order
    pub applied: Vec<AppliedMutation>,
    /// Checks that found the required state already in place
    pub satisfied: usize,
}

impl ReconcileReport {
    /// True when the pass changed nothing except the unconditional unpause
    pub fn is_noop(&self) -> bool {
        self.applied.iter().all(|a| a.mutation == Mutation::Unpause)
    }

    pub fn mutations(&self) -> impl Iterator<Item = &Mutation> {
        self.applied.iter().map(|a| &a.mutation)
    }

    pub fn grants(&self) -> usize {
        self.mutations()
            .filter(|m| matches!(m, Mutation::GrantRole { .. }))
            .count()
    }

    pub fn registrations(&self) -> usize {
        self.mutations()
            .filter(|m| matches!(m, Mutation::AddToken { .. }))
            .count()
    }

    pub fn merge(&mut self, other: ReconcileReport) {
        self.applied.extend(other.applied);
        self.satisfied += other.satisfied;
    }
}
