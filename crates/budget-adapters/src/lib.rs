//! Reference host collaborators for the budget ledger.
//!
//! Deterministic stand-ins for the platform's identity registry and the
//! token contract, for local runs, replay and the conformance suite.

#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use budget_core::{IdentityDirectory, PaymentError, PaymentGateway, TransferReceipt, TransferRequest};
use budget_types::{AccountId, Amount, AssetReference};
use chrono::Utc;
use uuid::Uuid;

/// Fixed set of accounts and issued assets.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    accounts: BTreeSet<AccountId>,
    /// Issuing contract -> symbols it has issued
    issued: BTreeMap<AccountId, BTreeSet<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.accounts.insert(AccountId::new(account));
        self
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts
            .extend(accounts.into_iter().map(AccountId::new));
        self
    }

    /// Register `asset`, creating its issuing contract account if needed.
    pub fn with_asset(mut self, asset: &AssetReference) -> Self {
        self.accounts.insert(asset.contract.clone());
        self.issued
            .entry(asset.contract.clone())
            .or_default()
            .insert(asset.symbol.clone());
        self
    }
}

impl IdentityDirectory for StaticDirectory {
    fn account_exists(&self, account: &AccountId) -> bool {
        self.accounts.contains(account)
    }

    fn asset_exists(&self, asset: &AssetReference) -> bool {
        self.issued
            .get(&asset.contract)
            .is_some_and(|symbols| symbols.contains(&asset.symbol))
    }
}

/// Records every transfer it accepts. With a custody balance set, transfers
/// that would overdraw it are refused.
#[derive(Debug, Default)]
pub struct RecordingPaymentGateway {
    transfers: RwLock<Vec<TransferRequest>>,
    balance: RwLock<Option<Amount>>,
}

impl RecordingPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway holding `balance` minor units in the ledger's custody.
    pub fn with_balance(balance: Amount) -> Self {
        Self {
            transfers: RwLock::new(Vec::new()),
            balance: RwLock::new(Some(balance)),
        }
    }

    /// Accepted transfers, oldest first.
    pub fn transfers(&self) -> Vec<TransferRequest> {
        match self.transfers.read() {
            Ok(transfers) => transfers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Total paid to `recipient`.
    pub fn paid_to(&self, recipient: &AccountId) -> Amount {
        self.transfers()
            .iter()
            .filter(|transfer| &transfer.to == recipient)
            .map(|transfer| transfer.amount)
            .sum()
    }

    pub fn balance(&self) -> Option<Amount> {
        self.balance.read().ok().and_then(|balance| *balance)
    }
}

impl PaymentGateway for RecordingPaymentGateway {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, PaymentError> {
        let mut balance = self
            .balance
            .write()
            .map_err(|_| PaymentError::Unavailable("custody balance lock poisoned".to_string()))?;
        let mut transfers = self
            .transfers
            .write()
            .map_err(|_| PaymentError::Unavailable("transfer log lock poisoned".to_string()))?;

        if let Some(available) = balance.as_mut() {
            let Some(remaining) = available.checked_sub(request.amount) else {
                return Err(PaymentError::Rejected {
                    contract: request.asset.contract.clone(),
                    reason: format!(
                        "overdrawn balance: {} available, {} requested",
                        request.asset.format_amount(*available),
                        request.asset.format_amount(request.amount)
                    ),
                });
            };
            *available = remaining;
        }
        transfers.push(request.clone());

        Ok(TransferReceipt {
            transfer_id: Uuid::new_v4().to_string(),
            settled_at: Utc::now(),
        })
    }
}

/// Refuses every transfer.
#[derive(Debug, Clone)]
pub struct RejectingPaymentGateway {
    reason: String,
}

impl RejectingPaymentGateway {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PaymentGateway for RejectingPaymentGateway {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, PaymentError> {
        Err(PaymentError::Rejected {
            contract: request.asset.contract.clone(),
            reason: self.reason.clone(),
        })
    }
}
