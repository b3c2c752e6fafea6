//! Authorization gate.
//!
//! Every mutating entry point passes through [`AuthorizationGate`]. The gate
//! requires the attested caller to be the expected account and asks a
//! pluggable [`CapabilityVerifier`] whether that account signed the call with
//! the named capability. Global operations name a fixed capability; department
//! operations name the department's own `required_capability`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use budget_types::{AccountId, Capability, LedgerConfig};
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};
use crate::host::Invocation;

/// Decides whether `actor` authorized `invocation` with `capability`.
pub trait CapabilityVerifier: Send + Sync {
    fn verify(&self, invocation: &Invocation, actor: &AccountId, capability: &Capability) -> bool;
}

/// Actor and capability must both match a signature. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegatedKeyVerifier;

impl CapabilityVerifier for DelegatedKeyVerifier {
    fn verify(&self, invocation: &Invocation, actor: &AccountId, capability: &Capability) -> bool {
        invocation.authorizations_for(actor, capability).next().is_some()
    }
}

/// Any signature by the actor suffices; the capability is not inspected.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectIdentityVerifier;

impl CapabilityVerifier for DirectIdentityVerifier {
    fn verify(&self, invocation: &Invocation, actor: &AccountId, _capability: &Capability) -> bool {
        invocation
            .authorizations
            .iter()
            .any(|auth| &auth.actor == actor)
    }
}

/// Threshold policy for one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyThreshold {
    pub threshold: usize,
    pub keys: BTreeSet<String>,
}

/// Requires `threshold` distinct registered keys to co-sign a capability.
///
/// Capabilities without a registered policy fall back to a single
/// delegated-key signature.
#[derive(Debug, Default, Clone)]
pub struct MultiSigVerifier {
    policies: HashMap<Capability, KeyThreshold>,
}

impl MultiSigVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(
        mut self,
        capability: Capability,
        threshold: usize,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.policies.insert(
            capability,
            KeyThreshold {
                threshold: threshold.max(1),
                keys: keys.into_iter().map(Into::into).collect(),
            },
        );
        self
    }
}

impl CapabilityVerifier for MultiSigVerifier {
    fn verify(&self, invocation: &Invocation, actor: &AccountId, capability: &Capability) -> bool {
        let Some(policy) = self.policies.get(capability) else {
            return DelegatedKeyVerifier.verify(invocation, actor, capability);
        };
        let signed: BTreeSet<&str> = invocation
            .authorizations_for(actor, capability)
            .filter_map(|auth| auth.key.as_deref())
            .filter(|key| policy.keys.contains(*key))
            .collect();
        signed.len() >= policy.threshold
    }
}

/// Capability check wrapped around every mutating call.
#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<dyn CapabilityVerifier>,
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<dyn CapabilityVerifier>) -> Self {
        Self { verifier }
    }

    /// The configured executor must be the caller and must have signed with
    /// `capability`.
    pub fn authorize(
        &self,
        config: &LedgerConfig,
        invocation: &Invocation,
        capability: &Capability,
    ) -> LedgerResult<()> {
        self.authorize_account(&config.executor, invocation, capability)
    }

    /// Same check against an arbitrary account (the ledger's own account
    /// for initialization).
    pub fn authorize_account(
        &self,
        account: &AccountId,
        invocation: &Invocation,
        capability: &Capability,
    ) -> LedgerResult<()> {
        if &invocation.caller == account && self.verifier.verify(invocation, account, capability) {
            return Ok(());
        }
        warn!(
            caller = %invocation.caller,
            expected = %account,
            capability = %capability,
            "authorization denied"
        );
        Err(LedgerError::Unauthorized {
            actor: account.clone(),
            capability: capability.clone(),
        })
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate").finish_non_exhaustive()
    }
}
