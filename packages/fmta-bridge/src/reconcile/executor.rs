//! Reconciliation passes against live collaborators

use alloy::primitives::Address;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::plan::{
    plan_operator, plan_operator_grants, plan_registration, plan_token, plan_validators, OperatorSnapshot,
    TokenSnapshot, TokenTarget,
};
use super::{
    AppliedMutation, BridgeContract, ContractKind, Mutation, ReconcileReport, ReconcileStep,
    TokenContract,
};
use crate::error::{BridgeError, CallError, Result};
use crate::roles::Role;
use crate::types::TokenQuery;

/// State for one pass: the collaborators involved and what has been done
struct Pass<'a> {
    bridge: Option<&'a dyn BridgeContract>,
    token: Option<&'a dyn TokenContract>,
    report: ReconcileReport,
}

impl<'a> Pass<'a> {
    fn new(bridge: Option<&'a dyn BridgeContract>, token: Option<&'a dyn TokenContract>) -> Self {
        Self {
            bridge,
            token,
            report: ReconcileReport::default(),
        }
    }

    fn bridge(&self, step: &ReconcileStep) -> Result<&'a dyn BridgeContract> {
        self.bridge.ok_or_else(|| missing(step, ContractKind::Bridge))
    }

    fn token(&self, step: &ReconcileStep) -> Result<&'a dyn TokenContract> {
        self.token.ok_or_else(|| missing(step, ContractKind::Token))
    }

    fn address_of(&self, on: ContractKind, step: &ReconcileStep) -> Result<Address> {
        Ok(match on {
            ContractKind::Bridge => self.bridge(step)?.address(),
            ContractKind::Token => self.token(step)?.address(),
        })
    }

    async fn query_token(&mut self, id: u32) -> Result<TokenQuery> {
        let step = ReconcileStep::QueryToken { id };
        let bridge = self.bridge(&step)?;
        bridge
            .query_token(id)
            .await
            .map_err(|e| BridgeError::from_call(step, bridge.address(), e))
    }

    async fn has_role(&mut self, on: ContractKind, role: Role, account: Address) -> Result<bool> {
        let step = ReconcileStep::QueryRole { on, role, account };
        let contract = self.address_of(on, &step)?;

        let result = match on {
            ContractKind::Bridge => self.bridge(&step)?.has_role(role, account).await,
            ContractKind::Token => self.token(&step)?.has_role(role, account).await,
        };
        let held = result.map_err(|e| BridgeError::from_call(step, contract, e))?;

        if held {
            debug!(role = %role, account = %account, contract = %contract, "Role already held");
            self.report.satisfied += 1;
        }
        Ok(held)
    }

    async fn apply(&mut self, mutation: Mutation) -> Result<()> {
        let step = ReconcileStep::Apply(mutation.clone());
        let contract = self.address_of(mutation.target(), &step)?;

        let result = match &mutation {
            Mutation::GrantRole { on, role, account } => match on {
                ContractKind::Bridge => self.bridge(&step)?.grant_role(*role, *account).await,
                ContractKind::Token => self.token(&step)?.grant_role(*role, *account).await,
            },
            Mutation::AddToken {
                id,
                is_wrapped,
                decimals,
                token,
            } => {
                self.bridge(&step)?
                    .add_token(*id, *is_wrapped, *decimals, *token)
                    .await
            }
            Mutation::SetCanWithdraw { id } => {
                self.bridge(&step)?.set_token_can_withdraw(*id, true).await
            }
            Mutation::SetCanDeposit { id } => {
                self.bridge(&step)?.set_token_can_deposit(*id, true).await
            }
            Mutation::Unpause => self.token(&step)?.set_paused(false).await,
        };

        let tx_hash = result.map_err(|e| BridgeError::from_call(step, contract, e))?;

        info!(
            contract = %contract,
            tx_hash = %tx_hash,
            "Applied: {}",
            mutation
        );

        self.report.applied.push(AppliedMutation {
            mutation,
            contract,
            tx_hash,
        });
        Ok(())
    }

    async fn apply_all(&mut self, plan: Vec<Mutation>) -> Result<()> {
        for mutation in plan {
            self.apply(mutation).await?;
        }
        Ok(())
    }
}

fn missing(step: &ReconcileStep, on: ContractKind) -> BridgeError {
    BridgeError::CollaboratorCallFailed {
        step: step.clone(),
        contract: Address::ZERO,
        source: CallError::Failed(format!("no {} collaborator in this pass", on)),
    }
}

// ============================================================================
// Passes
// ============================================================================

/// Ensure every address in `validators` holds `deposit` on the bridge.
pub async fn reconcile_validators(
    bridge: &dyn BridgeContract,
    validators: &[Address],
) -> Result<ReconcileReport> {
    let mut pass = Pass::new(Some(bridge), None);

    let mut holders = Vec::with_capacity(validators.len());
    for &validator in validators {
        let held = pass
            .has_role(ContractKind::Bridge, Role::Deposit, validator)
            .await?;
        holders.push((validator, held));
    }

    pass.apply_all(plan_validators(&holders)).await?;

    info!(
        bridge = %bridge.address(),
        validators = validators.len(),
        granted = pass.report.grants(),
        "Validators reconciled"
    );
    Ok(pass.report)
}

/// Register and configure bridge token `id` for `token`.
///
/// An unregistered id is registered with the fixed registration decimals
/// and re-queried; an id already bound to any token is left bound. The
/// bridge then receives its roles on the token, the id is enabled for
/// withdrawals and deposits, and finally the token is unpaused.
pub async fn reconcile_token(
    bridge: &dyn BridgeContract,
    id: u32,
    is_wrapped: bool,
    token: &dyn TokenContract,
) -> Result<ReconcileReport> {
    let target = TokenTarget {
        id,
        is_wrapped,
        token: token.address(),
    };
    let mut pass = Pass::new(Some(bridge), Some(token));

    let mut registration = pass.query_token(id).await?;
    if registration.is_registered() {
        pass.report.satisfied += 1;
        if registration.token != target.token {
            warn!(
                id,
                registered = %registration.token,
                requested = %target.token,
                "Token id is bound to a different token, keeping existing registration"
            );
        }
    } else if let Some(add) = plan_registration(&registration, &target) {
        pass.apply(add).await?;

        registration = pass.query_token(id).await?;
        if !registration.is_registered() {
            return Err(BridgeError::PrecheckFailed {
                step: ReconcileStep::QueryToken { id },
                contract: bridge.address(),
                reason: "token still unregistered after addToken".to_string(),
            });
        }
    }

    let bridge_address = bridge.address();
    let bridge_tx = if is_wrapped {
        pass.has_role(ContractKind::Token, Role::BridgeTx, bridge_address)
            .await?
    } else {
        false
    };
    let mint_to = pass
        .has_role(ContractKind::Token, Role::MintTo, bridge_address)
        .await?;
    let burn_from = pass
        .has_role(ContractKind::Token, Role::BurnFrom, bridge_address)
        .await?;

    if registration.can_withdraw {
        pass.report.satisfied += 1;
    }
    if registration.can_deposit {
        pass.report.satisfied += 1;
    }

    let snapshot = TokenSnapshot {
        registration,
        bridge_tx,
        mint_to,
        burn_from,
    };
    pass.apply_all(plan_token(&snapshot, &target, bridge_address))
        .await?;

    info!(
        id,
        token = %target.token,
        wrapped = is_wrapped,
        applied = pass.report.applied.len(),
        "Token reconciled"
    );
    Ok(pass.report)
}

async fn operator_snapshot(pass: &mut Pass<'_>, operator: Address) -> Result<OperatorSnapshot> {
    Ok(OperatorSnapshot {
        operator,
        admin: pass.has_role(ContractKind::Token, Role::Admin, operator).await?,
        mint_to: pass.has_role(ContractKind::Token, Role::MintTo, operator).await?,
        burn_from: pass
            .has_role(ContractKind::Token, Role::BurnFrom, operator)
            .await?,
    })
}

/// Ensure `operator` holds `admin`, `mintTo` and `burnFrom` on `token`,
/// then unpause it.
pub async fn reconcile_operator(
    token: &dyn TokenContract,
    operator: Address,
) -> Result<ReconcileReport> {
    let mut pass = Pass::new(None, Some(token));

    let snapshot = operator_snapshot(&mut pass, operator).await?;
    pass.apply_all(plan_operator(&snapshot)).await?;

    info!(
        token = %token.address(),
        operator = %operator,
        granted = pass.report.grants(),
        "Operator reconciled"
    );
    Ok(pass.report)
}

/// Bootstrap `operator` on `token` and then run [`reconcile_token`].
///
/// The operator grants are applied without their own unpause, so the token
/// is unpaused exactly once, after every role and flag of both passes.
pub async fn reconcile_token_with_operator(
    bridge: &dyn BridgeContract,
    id: u32,
    is_wrapped: bool,
    token: &dyn TokenContract,
    operator: Option<Address>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    if let Some(operator) = operator {
        let mut pass = Pass::new(None, Some(token));
        let snapshot = operator_snapshot(&mut pass, operator).await?;
        pass.apply_all(plan_operator_grants(&snapshot)).await?;

        info!(
            token = %token.address(),
            operator = %operator,
            granted = pass.report.grants(),
            "Operator roles reconciled"
        );
        report.merge(pass.report);
    }

    report.merge(reconcile_token(bridge, id, is_wrapped, token).await?);
    Ok(report)
}

// ============================================================================
// Reconciler
// ============================================================================

/// Owns a bridge collaborator and serializes passes run through it.
///
/// Only passes on the same `Reconciler` are serialized. Separate processes
/// pointed at the same bridge are not coordinated.
pub struct Reconciler<B> {
    bridge: B,
    lock: Mutex<()>,
}

impl<B: BridgeContract> Reconciler<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            lock: Mutex::new(()),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub async fn validators(&self, validators: &[Address]) -> Result<ReconcileReport> {
        let _guard = self.lock.lock().await;
        reconcile_validators(&self.bridge, validators).await
    }

    pub async fn token(
        &self,
        id: u32,
        is_wrapped: bool,
        token: &dyn TokenContract,
    ) -> Result<ReconcileReport> {
        let _guard = self.lock.lock().await;
        reconcile_token(&self.bridge, id, is_wrapped, token).await
    }

    /// Operator bootstrap (when `operator` is set) followed by the token pass,
    /// under one lock.
    pub async fn token_with_operator(
        &self,
        id: u32,
        is_wrapped: bool,
        token: &dyn TokenContract,
        operator: Option<Address>,
    ) -> Result<ReconcileReport> {
        let _guard = self.lock.lock().await;
        reconcile_token_with_operator(&self.bridge, id, is_wrapped, token, operator).await
    }

    pub async fn operator(
        &self,
        token: &dyn TokenContract,
        operator: Address,
    ) -> Result<ReconcileReport> {
        let _guard = self.lock.lock().await;
        reconcile_operator(token, operator).await
    }
}
