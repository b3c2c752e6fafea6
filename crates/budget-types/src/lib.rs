//! Budget Types - the shared vocabulary of the departmental budget ledger.
//!
//! Everything that crosses a crate boundary lives here: sequential record
//! identifiers, host identities and capabilities, the payment asset reference,
//! the persisted records, and the calendar-month bucket used for rollover.

#![deny(unsafe_code)]

mod account;
mod ids;
mod period;
mod records;

pub use account::{AccountId, AssetReference, Capability};
pub use ids::{ApplicationId, DepartmentId, ExpenditureId, ExpenseId};
pub use period::MonthBucket;
pub use records::{
    AllowanceApplication, ApplicationStatus, Department, Expenditure, ExpenseRecord, LedgerConfig,
};

/// Monetary amounts are unsigned minor units of the configured asset.
pub type Amount = u64;
