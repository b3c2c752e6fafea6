//! Payment collaborator seam.
//!
//! The ledger never moves funds itself. A spend hands a [`TransferRequest`] to
//! the configured [`PaymentGateway`]; the host runs that transfer inside the
//! same atomic invocation, so a refused transfer aborts the spend and a failed
//! spend never leaves a transfer behind.

use budget_types::{AccountId, Amount, AssetReference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transfer of `amount` minor units of `asset` out of the ledger's custody.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub asset: AssetReference,
    pub amount: Amount,
    pub memo: String,
}

/// Acknowledgement from the payment collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Identifier assigned by the payment side
    pub transfer_id: String,
    pub settled_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("transfer rejected by {contract}: {reason}")]
    Rejected { contract: AccountId, reason: String },

    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// External asset-transfer entry point.
pub trait PaymentGateway: Send + Sync {
    fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, PaymentError>;
}
