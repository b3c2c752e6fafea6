//! Host platform collaborators: invocation attestation, identity lookups, and
//! the bundle of services a ledger runs against.

use std::sync::Arc;

use budget_types::{AccountId, AssetReference, Capability};
use serde::{Deserialize, Serialize};

use crate::auth::{CapabilityVerifier, DelegatedKeyVerifier};
use crate::clock::{Clock, SystemClock};
use crate::payment::PaymentGateway;

/// One signature attached to an invocation: `actor` authorized the call with
/// `capability`, optionally naming the key that signed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: AccountId,
    pub capability: Capability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Authorization {
    pub fn new(actor: AccountId, capability: Capability) -> Self {
        Self {
            actor,
            capability,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Attested context of a single call: who is calling and what they signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub caller: AccountId,
    pub authorizations: Vec<Authorization>,
}

impl Invocation {
    /// A call with no signatures attached.
    pub fn new(caller: AccountId) -> Self {
        Self {
            caller,
            authorizations: Vec::new(),
        }
    }

    /// A call by `actor` signed once with `capability`.
    pub fn signed(actor: AccountId, capability: Capability) -> Self {
        Self {
            caller: actor.clone(),
            authorizations: vec![Authorization::new(actor, capability)],
        }
    }

    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorizations.push(authorization);
        self
    }

    /// Signatures by `actor` for `capability`.
    pub fn authorizations_for<'a>(
        &'a self,
        actor: &'a AccountId,
        capability: &'a Capability,
    ) -> impl Iterator<Item = &'a Authorization> + 'a {
        self.authorizations
            .iter()
            .filter(move |auth| &auth.actor == actor && &auth.capability == capability)
    }
}

/// Existence checks against the host's account and asset registries.
pub trait IdentityDirectory: Send + Sync {
    fn account_exists(&self, account: &AccountId) -> bool;

    /// The issuing contract exists and has issued `asset.symbol`.
    fn asset_exists(&self, asset: &AssetReference) -> bool;
}

/// Everything a ledger needs from its host.
#[derive(Clone)]
pub struct LedgerHost {
    /// The ledger's own account: platform authority and payment custody
    pub account: AccountId,
    pub directory: Arc<dyn IdentityDirectory>,
    pub verifier: Arc<dyn CapabilityVerifier>,
    pub payments: Arc<dyn PaymentGateway>,
    pub clock: Arc<dyn Clock>,
}

impl LedgerHost {
    /// Host with delegated-key verification and the system clock.
    pub fn new(
        account: AccountId,
        directory: Arc<dyn IdentityDirectory>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            account,
            directory,
            verifier: Arc::new(DelegatedKeyVerifier),
            payments,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CapabilityVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl std::fmt::Debug for LedgerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerHost")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}
