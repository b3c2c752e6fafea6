use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{AccountId, AssetReference, Capability};
use crate::ids::{ApplicationId, DepartmentId, ExpenditureId, ExpenseId};
use crate::Amount;

/// Write-once ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The single delegated identity allowed to drive mutating operations
    pub executor: AccountId,
    /// Asset every spend is paid out in
    pub asset: AssetReference,
}

/// A spending unit with a monthly ceiling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub enabled: bool,
    /// Capability the executor must sign department-scoped calls with
    pub required_capability: Capability,
    /// Monthly ceiling
    pub monthly_allowance: Amount,
    /// Sum of the ceilings of this department's live expenditures
    pub allowance_allocated: Amount,
    /// Spent within the month of `last_spend_time`
    pub allowance_used: Amount,
    pub last_spend_time: DateTime<Utc>,
}

impl Department {
    /// A fresh department: enabled, every figure zero, never spent.
    pub fn new(id: DepartmentId, name: impl Into<String>, required_capability: Capability) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            required_capability,
            monthly_allowance: 0,
            allowance_allocated: 0,
            allowance_used: 0,
            last_spend_time: DateTime::<Utc>::default(),
        }
    }

    /// Ceiling not yet reserved by expenditures. Zero when over-allocated.
    pub fn unallocated(&self) -> Amount {
        self.monthly_allowance.saturating_sub(self.allowance_allocated)
    }

    /// True after an approved decrease left the ceiling below the allocation.
    pub fn is_over_allocated(&self) -> bool {
        self.allowance_allocated > self.monthly_allowance
    }
}

/// Lifecycle of an allowance-change application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Request to move a department's ceiling from one value to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceApplication {
    pub id: ApplicationId,
    pub department_id: DepartmentId,
    pub from_allowance: Amount,
    pub to_allowance: Amount,
    pub status: ApplicationStatus,
}

/// A named payee drawing against its department's allowance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expenditure {
    pub id: ExpenditureId,
    pub department_id: DepartmentId,
    pub name: String,
    pub recipient: AccountId,
    /// Own ceiling, counted in the department's allocation while not removed
    pub monthly_allowance: Amount,
    pub allowance_used: Amount,
    pub last_spend_time: DateTime<Utc>,
    /// Tombstone; removed expenditures stay addressable for the audit trail
    pub removed: bool,
}

impl Expenditure {
    pub fn new(
        id: ExpenditureId,
        department_id: DepartmentId,
        name: impl Into<String>,
        recipient: AccountId,
        monthly_allowance: Amount,
    ) -> Self {
        Self {
            id,
            department_id,
            name: name.into(),
            recipient,
            monthly_allowance,
            allowance_used: 0,
            last_spend_time: DateTime::<Utc>::default(),
            removed: false,
        }
    }
}

/// Immutable audit record of one disbursement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub department_id: DepartmentId,
    pub expenditure_id: ExpenditureId,
    pub timestamp: DateTime<Utc>,
    pub amount: Amount,
    pub memo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_department_is_enabled_and_empty() {
        let dept = Department::new(DepartmentId(1), "Ops", Capability::new("ops"));
        assert!(dept.enabled);
        assert_eq!(dept.monthly_allowance, 0);
        assert_eq!(dept.allowance_allocated, 0);
        assert_eq!(dept.allowance_used, 0);
        assert_eq!(dept.last_spend_time.timestamp(), 0);
    }

    #[test]
    fn over_allocation_is_reported() {
        let mut dept = Department::new(DepartmentId(1), "Ops", Capability::new("ops"));
        dept.monthly_allowance = 500;
        dept.allowance_allocated = 300;
        assert_eq!(dept.unallocated(), 200);
        assert!(!dept.is_over_allocated());

        dept.monthly_allowance = 200;
        assert_eq!(dept.unallocated(), 0);
        assert!(dept.is_over_allocated());
    }

    #[test]
    fn application_status_serializes_snake_case() {
        let json = serde_json::to_string(&ApplicationStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        assert!(ApplicationStatus::Rejected.is_terminal());
        assert!(!ApplicationStatus::Pending.is_terminal());
    }
}
