//! Expenditure registry.

use budget_storage::ChangeSet;
use budget_types::{AccountId, Amount, DepartmentId, Expenditure, ExpenditureId};
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult, QuotaScope};
use crate::host::Invocation;
use crate::ledger::BudgetLedger;

impl BudgetLedger {
    /// Add a payee to a department, reserving `monthly_allowance` of the
    /// department's ceiling for it.
    pub fn add_expenditure(
        &self,
        invocation: &Invocation,
        department_id: DepartmentId,
        name: impl Into<String>,
        recipient: AccountId,
        monthly_allowance: Amount,
    ) -> LedgerResult<Expenditure> {
        let _span = self.begin("add_expenditure");
        let _serial = self.serialize();

        let mut department = self.require_department(department_id)?;
        let config = self.get_config()?;
        self.authorize(&config, invocation, &department.required_capability)?;

        if !self.host().directory.account_exists(&recipient) {
            return Err(LedgerError::InvalidIdentity(format!(
                "recipient account {recipient} does not exist"
            )));
        }

        let allocated = department
            .allowance_allocated
            .checked_add(monthly_allowance)
            .ok_or(LedgerError::Overflow("department allocation"))?;
        if allocated > department.monthly_allowance {
            warn!(
                department = %department_id,
                requested = allocated,
                ceiling = department.monthly_allowance,
                unallocated = department.unallocated(),
                "allocation rejected"
            );
            return Err(LedgerError::QuotaExceeded {
                scope: QuotaScope::Allocation(department_id),
                requested: allocated,
                ceiling: department.monthly_allowance,
            });
        }

        let id = ExpenditureId::after(self.store().last_expenditure_id(department_id)?)
            .ok_or(LedgerError::Overflow("expenditure id"))?;
        let expenditure = Expenditure::new(id, department_id, name, recipient, monthly_allowance);
        department.allowance_allocated = allocated;

        let mut changes = ChangeSet::new();
        changes
            .put_expenditure(expenditure.clone())
            .put_department(department);
        self.commit(changes)?;

        info!(
            department = %department_id,
            expenditure = %id,
            recipient = %expenditure.recipient,
            allowance = monthly_allowance,
            allocated,
            "expenditure added"
        );
        Ok(expenditure)
    }

    /// Tombstone an expenditure and release its reservation.
    pub fn remove_expenditure(
        &self,
        invocation: &Invocation,
        department_id: DepartmentId,
        expenditure_id: ExpenditureId,
    ) -> LedgerResult<Expenditure> {
        let _span = self.begin("remove_expenditure");
        let _serial = self.serialize();

        let mut department = self.require_department(department_id)?;
        let config = self.get_config()?;
        self.authorize(&config, invocation, &department.required_capability)?;

        let mut expenditure = self.require_expenditure(department_id, expenditure_id)?;
        if expenditure.removed {
            return Err(LedgerError::ExpenditureAlreadyRemoved {
                department: department_id,
                expenditure: expenditure_id,
            });
        }

        expenditure.removed = true;
        // Live ceilings always sum to the allocation.
        department.allowance_allocated = department
            .allowance_allocated
            .checked_sub(expenditure.monthly_allowance)
            .ok_or(LedgerError::Overflow("department allocation"))?;

        let mut changes = ChangeSet::new();
        changes
            .put_expenditure(expenditure.clone())
            .put_department(department);
        self.commit(changes)?;

        info!(
            department = %department_id,
            expenditure = %expenditure_id,
            released = expenditure.monthly_allowance,
            "expenditure removed"
        );
        Ok(expenditure)
    }
}
