//! Allowance-change workflow.
//!
//! An application moves from `Pending` to `Approved` or `Rejected` exactly
//! once. Only approval touches the department, and only its ceiling: an
//! approved decrease below the current allocation leaves the department
//! over-allocated until expenditures are removed.

use budget_storage::ChangeSet;
use budget_types::{
    Amount, AllowanceApplication, ApplicationId, ApplicationStatus, DepartmentId,
};
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::host::Invocation;
use crate::ledger::BudgetLedger;

impl BudgetLedger {
    /// Open a pending application to change a department's ceiling.
    pub fn propose_allowance(
        &self,
        invocation: &Invocation,
        department_id: DepartmentId,
        new_allowance: Amount,
    ) -> LedgerResult<AllowanceApplication> {
        let _span = self.begin("propose_allowance");
        let _serial = self.serialize();

        let department = self.require_department(department_id)?;
        let config = self.get_config()?;
        self.authorize(&config, invocation, &department.required_capability)?;

        // Full scan: applications are kept in one id-ordered collection so
        // audit listings stay in creation order.
        let applications = self.store().applications()?;
        if let Some(pending) = applications.iter().find(|app| {
            app.department_id == department_id && app.status == ApplicationStatus::Pending
        }) {
            return Err(LedgerError::PendingApplicationExists {
                department: department_id,
                application: pending.id,
            });
        }

        if department.monthly_allowance == new_allowance {
            return Err(LedgerError::AllowanceUnchanged {
                department: department_id,
                allowance: new_allowance,
            });
        }

        let id = ApplicationId::after(self.store().last_application_id()?)
            .ok_or(LedgerError::Overflow("application id"))?;
        let application = AllowanceApplication {
            id,
            department_id,
            from_allowance: department.monthly_allowance,
            to_allowance: new_allowance,
            status: ApplicationStatus::Pending,
        };

        let mut changes = ChangeSet::new();
        changes.put_application(application.clone());
        self.commit(changes)?;

        info!(
            application = %id,
            department = %department_id,
            from = application.from_allowance,
            to = application.to_allowance,
            "allowance change proposed"
        );
        Ok(application)
    }

    /// Approve or reject a pending application.
    pub fn process_application(
        &self,
        invocation: &Invocation,
        id: ApplicationId,
        approve: bool,
    ) -> LedgerResult<AllowanceApplication> {
        let _span = self.begin("process_application");
        let _serial = self.serialize();

        let config = self.get_config()?;
        self.authorize(&config, invocation, &self.capabilities().process_application)?;

        let mut application = self
            .store()
            .application(id)?
            .ok_or(LedgerError::ApplicationNotFound(id))?;
        if application.status.is_terminal() {
            return Err(LedgerError::ApplicationAlreadyProcessed {
                application: id,
                status: application.status,
            });
        }

        let mut changes = ChangeSet::new();
        application.status = if approve {
            ApplicationStatus::Approved
        } else {
            ApplicationStatus::Rejected
        };
        changes.put_application(application.clone());

        if approve {
            let mut department = self.require_department(application.department_id)?;
            department.monthly_allowance = application.to_allowance;
            if department.is_over_allocated() {
                warn!(
                    department = %department.id,
                    allocated = department.allowance_allocated,
                    allowance = department.monthly_allowance,
                    "approved allowance is below current allocation"
                );
            }
            changes.put_department(department);
        }

        self.commit(changes)?;

        info!(
            application = %id,
            department = %application.department_id,
            status = %application.status,
            "application processed"
        );
        Ok(application)
    }
}
