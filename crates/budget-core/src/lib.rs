//! Budget Core - the accounting and authorization state machine.
//!
//! A single executor account governs departments, each with a monthly
//! ceiling, named expenditures that reserve part of that ceiling, and a
//! two-stage workflow for changing it. Spends are checked against both the
//! expenditure's and the department's ceiling, with usage rolling over at
//! UTC calendar-month boundaries, and pay out through an external gateway.
//!
//! ```text
//! Invocation ─► AuthorizationGate ─► BudgetLedger ─► ChangeSet ─► LedgerStore
//!                                        │
//!                                        ├─► Clock (rollover)
//!                                        └─► PaymentGateway (spend)
//! ```
//!
//! Every operation stages its writes and commits them once, after all checks
//! and the payment have passed. An error therefore means nothing was written.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod accumulation;
mod applications;
pub mod auth;
pub mod clock;
mod departments;
pub mod error;
mod expenditures;
pub mod host;
mod ledger;
pub mod payment;
mod queries;
pub mod settings;
mod spend;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use accumulation::{accumulate, effective_usage};
pub use auth::{
    AuthorizationGate, CapabilityVerifier, DelegatedKeyVerifier, DirectIdentityVerifier,
    KeyThreshold, MultiSigVerifier,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, LedgerError, LedgerResult, QuotaScope};
pub use host::{Authorization, IdentityDirectory, Invocation, LedgerHost};
pub use ledger::BudgetLedger;
pub use payment::{PaymentError, PaymentGateway, TransferReceipt, TransferRequest};
pub use queries::{ApplicationFilter, DepartmentSummary, ExpenditureSummary, ExpenseQuery};
pub use settings::{
    CapabilitySettings, LedgerSettings, LimitSettings, LoggingSettings, SettingsError,
};
pub use spend::SpendReceipt;
pub use telemetry::{init_tracing, TelemetryError};
