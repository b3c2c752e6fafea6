//! Read-only views for dashboards and audits. No authorization, no writes.

use budget_types::{
    AccountId, AllowanceApplication, Amount, ApplicationId, ApplicationStatus, Department,
    DepartmentId, Expenditure, ExpenditureId, ExpenseRecord, LedgerConfig, MonthBucket,
};
use serde::{Deserialize, Serialize};

use crate::accumulation::effective_usage;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::BudgetLedger;

/// Narrows [`BudgetLedger::applications`]. Empty fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFilter {
    pub department: Option<DepartmentId>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(ApplicationStatus::Pending),
            ..Self::default()
        }
    }

    pub fn department(mut self, department: DepartmentId) -> Self {
        self.department = Some(department);
        self
    }

    fn matches(&self, application: &AllowanceApplication) -> bool {
        self.department
            .map_or(true, |dept| application.department_id == dept)
            && self.status.map_or(true, |status| application.status == status)
    }
}

/// Narrows [`BudgetLedger::expense_history`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseQuery {
    pub department: Option<DepartmentId>,
    pub expenditure: Option<ExpenditureId>,
    /// Most recent `limit` records
    pub limit: Option<usize>,
}

impl ExpenseQuery {
    fn matches(&self, expense: &ExpenseRecord) -> bool {
        self.department
            .map_or(true, |dept| expense.department_id == dept)
            && self
                .expenditure
                .map_or(true, |exp| expense.expenditure_id == exp)
    }
}

/// A department's figures as they read this month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    pub id: DepartmentId,
    pub name: String,
    pub enabled: bool,
    pub month: MonthBucket,
    pub monthly_allowance: Amount,
    pub allowance_allocated: Amount,
    /// Zero if nothing was spent this month, whatever is stored
    pub allowance_used: Amount,
    /// Live expenditures only
    pub expenditures: Vec<ExpenditureSummary>,
}

impl DepartmentSummary {
    pub fn percent_used(&self) -> f64 {
        percent(self.allowance_used, self.monthly_allowance)
    }

    pub fn remaining(&self) -> Amount {
        self.monthly_allowance.saturating_sub(self.allowance_used)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenditureSummary {
    pub id: ExpenditureId,
    pub name: String,
    pub recipient: AccountId,
    pub monthly_allowance: Amount,
    pub allowance_used: Amount,
}

impl ExpenditureSummary {
    pub fn percent_used(&self) -> f64 {
        percent(self.allowance_used, self.monthly_allowance)
    }

    pub fn remaining(&self) -> Amount {
        self.monthly_allowance.saturating_sub(self.allowance_used)
    }
}

fn percent(used: Amount, ceiling: Amount) -> f64 {
    if ceiling == 0 {
        return 0.0;
    }
    used as f64 * 100.0 / ceiling as f64
}

impl BudgetLedger {
    /// The configuration record, if `initialize` has run.
    pub fn config(&self) -> LedgerResult<Option<LedgerConfig>> {
        Ok(self.store().config()?)
    }

    pub fn department(&self, id: DepartmentId) -> LedgerResult<Department> {
        self.require_department(id)
    }

    pub fn departments(&self) -> LedgerResult<Vec<Department>> {
        Ok(self.store().departments()?)
    }

    pub fn application(&self, id: ApplicationId) -> LedgerResult<AllowanceApplication> {
        self.store()
            .application(id)?
            .ok_or(LedgerError::ApplicationNotFound(id))
    }

    /// Applications in creation order.
    pub fn applications(&self, filter: &ApplicationFilter) -> LedgerResult<Vec<AllowanceApplication>> {
        Ok(self
            .store()
            .applications()?
            .into_iter()
            .filter(|app| filter.matches(app))
            .collect())
    }

    pub fn expenditure(
        &self,
        department: DepartmentId,
        id: ExpenditureId,
    ) -> LedgerResult<Expenditure> {
        self.require_expenditure(department, id)
    }

    /// A department's expenditures in id order, tombstoned ones only when
    /// `include_removed` is set.
    pub fn expenditures(
        &self,
        department: DepartmentId,
        include_removed: bool,
    ) -> LedgerResult<Vec<Expenditure>> {
        self.require_department(department)?;
        Ok(self
            .store()
            .expenditures(department)?
            .into_iter()
            .filter(|exp| include_removed || !exp.removed)
            .collect())
    }

    /// Figures for a dashboard card, with stale usage read as zero.
    pub fn department_summary(&self, id: DepartmentId) -> LedgerResult<DepartmentSummary> {
        let department = self.require_department(id)?;
        let now = self.host().clock.now();

        let expenditures = self
            .expenditures(id, false)?
            .into_iter()
            .map(|exp| ExpenditureSummary {
                allowance_used: effective_usage(exp.allowance_used, exp.last_spend_time, now),
                id: exp.id,
                name: exp.name,
                recipient: exp.recipient,
                monthly_allowance: exp.monthly_allowance,
            })
            .collect();

        Ok(DepartmentSummary {
            id,
            allowance_used: effective_usage(
                department.allowance_used,
                department.last_spend_time,
                now,
            ),
            name: department.name,
            enabled: department.enabled,
            month: MonthBucket::of(now),
            monthly_allowance: department.monthly_allowance,
            allowance_allocated: department.allowance_allocated,
            expenditures,
        })
    }

    /// Expense records, newest first.
    pub fn expense_history(&self, query: &ExpenseQuery) -> LedgerResult<Vec<ExpenseRecord>> {
        let matching = self
            .store()
            .expenses()?
            .into_iter()
            .rev()
            .filter(|expense| query.matches(expense));
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::Duration;

    #[test]
    fn application_filter() {
        let fx = Fixture::initialized();
        let ops = fx.funded_department("Ops", "ops", 100);
        let hr = fx.department("HR", "hr");
        fx.ledger.propose_allowance(&fx.exec("hr"), hr, 50).unwrap();
        fx.ledger.propose_allowance(&fx.exec("ops"), ops, 200).unwrap();

        assert_eq!(fx.ledger.applications(&ApplicationFilter::default()).unwrap().len(), 3);
        let pending = fx.ledger.applications(&ApplicationFilter::pending()).unwrap();
        assert_eq!(pending.len(), 2);
        let ops_pending = fx
            .ledger
            .applications(&ApplicationFilter::pending().department(ops))
            .unwrap();
        assert_eq!(ops_pending.len(), 1);
        assert_eq!(ops_pending[0].to_allowance, 200);
    }

    #[test]
    fn removed_expenditures_hidden_unless_requested() {
        let fx = Fixture::initialized();
        let dept = fx.funded_department("Ops", "ops", 500);
        let rent = fx.expenditure(dept, "ops", "Rent", "landlord", 100);
        fx.expenditure(dept, "ops", "Cloud", "cloud", 100);
        fx.ledger
            .remove_expenditure(&fx.exec("ops"), dept, rent)
            .unwrap();

        assert_eq!(fx.ledger.expenditures(dept, false).unwrap().len(), 1);
        assert_eq!(fx.ledger.expenditures(dept, true).unwrap().len(), 2);
        assert!(fx.ledger.expenditure(dept, rent).unwrap().removed);
        assert!(fx.ledger.expenditures(DepartmentId(9), true).is_err());
    }

    #[test]
    fn summary_reads_stale_usage_as_zero() {
        let fx = Fixture::initialized();
        let dept = fx.funded_department("Ops", "ops", 400);
        let rent = fx.expenditure(dept, "ops", "Rent", "landlord", 200);
        fx.ledger.spend(&fx.exec("ops"), dept, rent, 50, "").unwrap();

        let summary = fx.ledger.department_summary(dept).unwrap();
        assert_eq!(summary.allowance_used, 50);
        assert_eq!(summary.allowance_allocated, 200);
        assert_eq!(summary.remaining(), 350);
        assert!((summary.percent_used() - 12.5).abs() < f64::EPSILON);
        assert_eq!(summary.expenditures.len(), 1);
        assert!((summary.expenditures[0].percent_used() - 25.0).abs() < f64::EPSILON);

        fx.clock.advance(Duration::days(40));
        let before = fx.ledger.store().snapshot().unwrap();
        let summary = fx.ledger.department_summary(dept).unwrap();
        assert_eq!(summary.allowance_used, 0);
        assert_eq!(summary.expenditures[0].allowance_used, 0);
        // Reading never writes the reset back.
        assert_eq!(fx.ledger.store().snapshot().unwrap(), before);
    }

    #[test]
    fn history_is_newest_first_and_filterable() {
        let fx = Fixture::initialized();
        let dept = fx.funded_department("Ops", "ops", 1_000);
        let rent = fx.expenditure(dept, "ops", "Rent", "landlord", 500);
        let cloud = fx.expenditure(dept, "ops", "Cloud", "cloud", 500);
        fx.ledger.spend(&fx.exec("ops"), dept, rent, 10, "first").unwrap();
        fx.ledger.spend(&fx.exec("ops"), dept, cloud, 20, "second").unwrap();
        fx.ledger.spend(&fx.exec("ops"), dept, rent, 30, "third").unwrap();

        let all = fx.ledger.expense_history(&ExpenseQuery::default()).unwrap();
        let memos: Vec<_> = all.iter().map(|e| e.memo.as_str()).collect();
        assert_eq!(memos, vec!["third", "second", "first"]);

        let rent_only = fx
            .ledger
            .expense_history(&ExpenseQuery {
                department: Some(dept),
                expenditure: Some(rent),
                limit: Some(1),
            })
            .unwrap();
        assert_eq!(rent_only.len(), 1);
        assert_eq!(rent_only[0].memo, "third");
    }

    #[test]
    fn config_is_optional_before_initialize() {
        let fx = Fixture::new();
        assert!(fx.ledger.config().unwrap().is_none());
        let fx = Fixture::initialized();
        assert_eq!(fx.ledger.config().unwrap().unwrap().executor, executor());
    }
}
