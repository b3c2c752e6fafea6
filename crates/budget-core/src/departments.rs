//! Department registry.

use budget_storage::ChangeSet;
use budget_types::{Capability, Department, DepartmentId};
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::host::Invocation;
use crate::ledger::BudgetLedger;

impl BudgetLedger {
    /// Register a department. New departments are enabled with a zero
    /// allowance; the allowance is raised through the application workflow.
    pub fn create_department(
        &self,
        invocation: &Invocation,
        name: impl Into<String>,
        required_capability: Capability,
    ) -> LedgerResult<Department> {
        let _span = self.begin("create_department");
        let _serial = self.serialize();

        let config = self.get_config()?;
        self.authorize(&config, invocation, &self.capabilities().add_department)?;

        let id = DepartmentId::after(self.store().last_department_id()?)
            .ok_or(LedgerError::Overflow("department id"))?;
        let department = Department::new(id, name, required_capability);

        let mut changes = ChangeSet::new();
        changes.put_department(department.clone());
        self.commit(changes)?;

        info!(
            department = %department.id,
            name = %department.name,
            capability = %department.required_capability,
            "department created"
        );
        Ok(department)
    }

    /// Enable or suspend a department. Pending applications and expenditures
    /// are left as they are.
    pub fn set_enabled(
        &self,
        invocation: &Invocation,
        id: DepartmentId,
        enabled: bool,
    ) -> LedgerResult<Department> {
        let _span = self.begin("set_enabled");
        let _serial = self.serialize();

        let config = self.get_config()?;
        self.authorize(&config, invocation, &self.capabilities().toggle_department)?;

        let mut department = self.require_department(id)?;
        if department.enabled == enabled {
            return Err(LedgerError::StatusUnchanged {
                department: id,
                enabled,
            });
        }
        department.enabled = enabled;

        let mut changes = ChangeSet::new();
        changes.put_department(department.clone());
        self.commit(changes)?;

        info!(department = %id, enabled, "department status changed");
        Ok(department)
    }
}
