//! Pure reconciliation planning
//!
//! Each function maps observed state plus the desired target to the ordered
//! list of mutations still needed. No I/O happens here.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{ContractKind, Mutation};
use crate::roles::Role;
use crate::types::{TokenQuery, TokenRegistration, REGISTRATION_DECIMALS};

/// Roles granted to a token's operator account
pub const OPERATOR_TOKEN_ROLES: [Role; 3] = [Role::Admin, Role::MintTo, Role::BurnFrom];

// ============================================================================
// Validators
// ============================================================================

/// Grants for validators that do not yet hold `deposit` on the bridge.
///
/// `holders` pairs each required address with whether it already holds the
/// role. Repeated addresses are planned once.
pub fn plan_validators(holders: &[(Address, bool)]) -> Vec<Mutation> {
    let mut seen = HashSet::new();
    holders
        .iter()
        .filter(|(account, _)| seen.insert(*account))
        .filter(|(_, has_role)| !has_role)
        .map(|(account, _)| Mutation::GrantRole {
            on: ContractKind::Bridge,
            role: Role::Deposit,
            account: *account,
        })
        .collect()
}

// ============================================================================
// Tokens
// ============================================================================

/// Desired registration of a bridge token id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTarget {
    pub id: u32,
    pub is_wrapped: bool,
    pub token: Address,
}

/// Observed state relevant to one token id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenSnapshot {
    pub registration: TokenQuery,
    /// Bridge holds `bridgeTx` on the token (only consulted for wrapped tokens)
    pub bridge_tx: bool,
    pub mint_to: bool,
    pub burn_from: bool,
}

/// The registration call for an id that is not bound to any token
pub fn plan_registration(current: &TokenQuery, target: &TokenTarget) -> Option<Mutation> {
    (!current.is_registered()).then(|| Mutation::AddToken {
        id: target.id,
        is_wrapped: target.is_wrapped,
        decimals: REGISTRATION_DECIMALS,
        token: target.token,
    })
}

/// Mutations needed to bring token `target.id` into its required state.
///
/// An unregistered id is registered first with [`REGISTRATION_DECIMALS`].
/// An id bound to any token (even a different one) is never re-registered.
/// The token is always unpaused last.
pub fn plan_token(snapshot: &TokenSnapshot, target: &TokenTarget, bridge: Address) -> Vec<Mutation> {
    let mut plan = Vec::new();

    let registration = match plan_registration(&snapshot.registration, target) {
        Some(add) => {
            plan.push(add);
            TokenRegistration::fresh(target.id, target.token, target.is_wrapped).query()
        }
        None => snapshot.registration,
    };

    let grant = |role| Mutation::GrantRole {
        on: ContractKind::Token,
        role,
        account: bridge,
    };

    if target.is_wrapped && !snapshot.bridge_tx {
        plan.push(grant(Role::BridgeTx));
    }
    if !snapshot.mint_to {
        plan.push(grant(Role::MintTo));
    }
    if !snapshot.burn_from {
        plan.push(grant(Role::BurnFrom));
    }

    if !registration.can_withdraw {
        plan.push(Mutation::SetCanWithdraw { id: target.id });
    }
    if !registration.can_deposit {
        plan.push(Mutation::SetCanDeposit { id: target.id });
    }

    plan.push(Mutation::Unpause);
    plan
}

// ============================================================================
// Operator
// ============================================================================

/// Roles an operator account already holds on a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSnapshot {
    pub operator: Address,
    pub admin: bool,
    pub mint_to: bool,
    pub burn_from: bool,
}

impl OperatorSnapshot {
    fn holds(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin,
            Role::MintTo => self.mint_to,
            Role::BurnFrom => self.burn_from,
            _ => false,
        }
    }
}

/// Grants the operator is missing
pub fn plan_operator_grants(snapshot: &OperatorSnapshot) -> Vec<Mutation> {
    OPERATOR_TOKEN_ROLES
        .into_iter()
        .filter(|role| !snapshot.holds(*role))
        .map(|role| Mutation::GrantRole {
            on: ContractKind::Token,
            role,
            account: snapshot.operator,
        })
        .collect()
}

/// Grants the operator is missing, followed by the unpause
pub fn plan_operator(snapshot: &OperatorSnapshot) -> Vec<Mutation> {
    let mut plan = plan_operator_grants(snapshot);
    plan.push(Mutation::Unpause);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> Address {
        Address::repeat_byte(0xB0)
    }

    fn target(is_wrapped: bool) -> TokenTarget {
        TokenTarget {
            id: 4,
            is_wrapped,
            token: Address::repeat_byte(0x70),
        }
    }

    fn configured() -> TokenSnapshot {
        TokenSnapshot {
            registration: TokenQuery {
                token: Address::repeat_byte(0x70),
                can_withdraw: true,
                can_deposit: true,
            },
            bridge_tx: true,
            mint_to: true,
            burn_from: true,
        }
    }

    #[test]
    fn test_validators_only_missing() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let plan = plan_validators(&[(a, true), (b, false), (b, false)]);
        assert_eq!(
            plan,
            vec![Mutation::GrantRole {
                on: ContractKind::Bridge,
                role: Role::Deposit,
                account: b
            }]
        );
        assert!(plan_validators(&[(a, true), (b, true)]).is_empty());
    }

    #[test]
    fn test_configured_token_only_unpauses() {
        assert_eq!(plan_token(&configured(), &target(true), bridge()), vec![Mutation::Unpause]);
    }

    #[test]
    fn test_unregistered_token_full_plan() {
        let plan = plan_token(&TokenSnapshot::default(), &target(true), bridge());
        let grant = |role| Mutation::GrantRole {
            on: ContractKind::Token,
            role,
            account: bridge(),
        };
        assert_eq!(
            plan,
            vec![
                Mutation::AddToken {
                    id: 4,
                    is_wrapped: true,
                    decimals: 2,
                    token: Address::repeat_byte(0x70)
                },
                grant(Role::BridgeTx),
                grant(Role::MintTo),
                grant(Role::BurnFrom),
                Mutation::SetCanWithdraw { id: 4 },
                Mutation::SetCanDeposit { id: 4 },
                Mutation::Unpause,
            ]
        );
    }

    #[test]
    fn test_unwrapped_token_skips_bridge_tx() {
        let mut snapshot = configured();
        snapshot.bridge_tx = false;
        assert_eq!(plan_token(&snapshot, &target(false), bridge()), vec![Mutation::Unpause]);

        let plan = plan_token(&snapshot, &target(true), bridge());
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_registered_to_other_token_is_not_reregistered() {
        let mut snapshot = configured();
        snapshot.registration.token = Address::repeat_byte(0x99);
        snapshot.registration.can_deposit = false;

        let plan = plan_token(&snapshot, &target(false), bridge());
        assert!(!plan.iter().any(|m| matches!(m, Mutation::AddToken { .. })));
        assert_eq!(plan, vec![Mutation::SetCanDeposit { id: 4 }, Mutation::Unpause]);
    }

    #[test]
    fn test_operator_plan() {
        let operator = Address::repeat_byte(0x0A);
        let plan = plan_operator(&OperatorSnapshot {
            operator,
            admin: true,
            mint_to: false,
            burn_from: true,
        });
        assert_eq!(
            plan,
            vec![
                Mutation::GrantRole {
                    on: ContractKind::Token,
                    role: Role::MintTo,
                    account: operator
                },
                Mutation::Unpause
            ]
        );
    }

    #[test]
    fn test_operator_grants_never_unpause() {
        let snapshot = OperatorSnapshot {
            operator: Address::repeat_byte(0x0A),
            admin: false,
            mint_to: false,
            burn_from: false,
        };
        let grants = plan_operator_grants(&snapshot);
        assert_eq!(grants.len(), 3);
        assert!(!grants.contains(&Mutation::Unpause));

        let all_held = OperatorSnapshot {
            admin: true,
            mint_to: true,
            burn_from: true,
            ..snapshot
        };
        assert!(plan_operator_grants(&all_held).is_empty());
    }
}
