//! Spend engine.
//!
//! A spend is checked against two ceilings, the expenditure's and the
//! department's, each with its own rollover clock. The payment runs before
//! anything is written; if the commit then fails the host aborts the whole
//! invocation, transfer included.

use budget_storage::ChangeSet;
use budget_types::{Amount, DepartmentId, ExpenditureId, ExpenseId, ExpenseRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accumulation::accumulate;
use crate::error::{LedgerError, LedgerResult, QuotaScope};
use crate::host::Invocation;
use crate::ledger::BudgetLedger;
use crate::payment::{TransferReceipt, TransferRequest};

/// Outcome of a successful spend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub expense: ExpenseRecord,
    pub transfer: TransferReceipt,
}

impl BudgetLedger {
    /// Pay `amount` from the ledger's custody to an expenditure's recipient.
    pub fn spend(
        &self,
        invocation: &Invocation,
        department_id: DepartmentId,
        expenditure_id: ExpenditureId,
        amount: Amount,
        memo: impl Into<String>,
    ) -> LedgerResult<SpendReceipt> {
        let _span = self.begin("spend");
        let _serial = self.serialize();
        let memo = memo.into();

        let mut department = self.require_department(department_id)?;
        let mut expenditure = self.require_expenditure(department_id, expenditure_id)?;
        let config = self.get_config()?;
        self.authorize(&config, invocation, &department.required_capability)?;

        if !department.enabled {
            return Err(LedgerError::Suspended(department_id));
        }
        if expenditure.removed {
            return Err(LedgerError::Removed {
                department: department_id,
                expenditure: expenditure_id,
            });
        }
        if amount == 0 {
            return Err(LedgerError::InvalidInput(
                "spend amount must be positive".to_string(),
            ));
        }
        if memo.len() > self.limits().max_memo_bytes {
            return Err(LedgerError::InvalidInput(format!(
                "memo is {} bytes, limit is {}",
                memo.len(),
                self.limits().max_memo_bytes
            )));
        }

        let now = self.host().clock.now();
        let expenditure_used = accumulate(
            expenditure.allowance_used,
            amount,
            expenditure.last_spend_time,
            now,
        )?;
        let department_used =
            accumulate(department.allowance_used, amount, department.last_spend_time, now)?;

        if expenditure_used > expenditure.monthly_allowance {
            warn!(
                department = %department_id,
                expenditure = %expenditure_id,
                requested = expenditure_used,
                ceiling = expenditure.monthly_allowance,
                "spend rejected"
            );
            return Err(LedgerError::QuotaExceeded {
                scope: QuotaScope::ExpenditureUsage(department_id, expenditure_id),
                requested: expenditure_used,
                ceiling: expenditure.monthly_allowance,
            });
        }
        if department_used > department.monthly_allowance {
            warn!(
                department = %department_id,
                requested = department_used,
                ceiling = department.monthly_allowance,
                "spend rejected"
            );
            return Err(LedgerError::QuotaExceeded {
                scope: QuotaScope::DepartmentUsage(department_id),
                requested: department_used,
                ceiling: department.monthly_allowance,
            });
        }

        let expense_id = ExpenseId::after(self.store().last_expense_id()?)
            .ok_or(LedgerError::Overflow("expense id"))?;

        let transfer = self.host().payments.transfer(&TransferRequest {
            from: self.host().account.clone(),
            to: expenditure.recipient.clone(),
            asset: config.asset.clone(),
            amount,
            memo: memo.clone(),
        })?;

        expenditure.allowance_used = expenditure_used;
        expenditure.last_spend_time = now;
        department.allowance_used = department_used;
        department.last_spend_time = now;
        let expense = ExpenseRecord {
            id: expense_id,
            department_id,
            expenditure_id,
            timestamp: now,
            amount,
            memo,
        };

        let mut changes = ChangeSet::new();
        changes
            .put_expenditure(expenditure)
            .put_department(department)
            .append_expense(expense.clone());
        self.commit(changes)?;

        info!(
            department = %department_id,
            expenditure = %expenditure_id,
            expense = %expense_id,
            amount = %config.asset.format_amount(amount),
            transfer_id = %transfer.transfer_id,
            "spend recorded"
        );
        Ok(SpendReceipt { expense, transfer })
    }
}
