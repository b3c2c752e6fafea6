//! Whole-state invariant checks.
//!
//! Every rule here must hold after any sequence of invocations, successful
//! or not. Rules that only hold immediately after a particular operation
//! (usage against a department ceiling that may since have been lowered)
//! are checked by the callers of that operation instead.

use std::collections::BTreeMap;

use budget_storage::LedgerState;
use budget_types::{Amount, ApplicationStatus, DepartmentId, ExpenseId};

/// A broken rule and where it broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub detail: String,
}

impl Violation {
    fn new(rule: &'static str, detail: String) -> Self {
        Self { rule, detail }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.detail)
    }
}

/// Run every rule against `state`.
pub fn check(state: &LedgerState) -> Vec<Violation> {
    let mut violations = Vec::new();
    allocation_matches_live_ceilings(state, &mut violations);
    over_allocation_needs_approved_decrease(state, &mut violations);
    single_pending_application(state, &mut violations);
    expenditure_usage_within_ceiling(state, &mut violations);
    expense_history_is_sequential(state, &mut violations);
    violations
}

fn allocation_matches_live_ceilings(state: &LedgerState, out: &mut Vec<Violation>) {
    for department in state.departments.values() {
        let live: Option<Amount> = state
            .department_expenditures(department.id)
            .filter(|exp| !exp.removed)
            .try_fold(0u64, |sum, exp| sum.checked_add(exp.monthly_allowance));
        if live != Some(department.allowance_allocated) {
            out.push(Violation::new(
                "allocation",
                format!(
                    "department {} records {} allocated, live ceilings sum to {:?}",
                    department.id, department.allowance_allocated, live
                ),
            ));
        }
    }
}

/// Allocation can only exceed the ceiling after an approved decrease.
fn over_allocation_needs_approved_decrease(state: &LedgerState, out: &mut Vec<Violation>) {
    for department in state.departments.values() {
        if !department.is_over_allocated() {
            continue;
        }
        let decreased = state.applications.values().any(|app| {
            app.department_id == department.id
                && app.status == ApplicationStatus::Approved
                && app.to_allowance < app.from_allowance
        });
        if !decreased {
            out.push(Violation::new(
                "over-allocation",
                format!(
                    "department {} allocates {} of {} without an approved decrease",
                    department.id, department.allowance_allocated, department.monthly_allowance
                ),
            ));
        }
    }
}

fn single_pending_application(state: &LedgerState, out: &mut Vec<Violation>) {
    let mut pending: BTreeMap<DepartmentId, usize> = BTreeMap::new();
    for app in state.applications.values() {
        if app.status == ApplicationStatus::Pending {
            *pending.entry(app.department_id).or_default() += 1;
        }
    }
    for (department, count) in pending {
        if count > 1 {
            out.push(Violation::new(
                "pending-application",
                format!("department {department} has {count} pending applications"),
            ));
        }
    }
}

/// Expenditure ceilings never change, so their usage bound is permanent.
fn expenditure_usage_within_ceiling(state: &LedgerState, out: &mut Vec<Violation>) {
    for expenditures in state.expenditures.values() {
        for exp in expenditures.values() {
            if exp.allowance_used > exp.monthly_allowance {
                out.push(Violation::new(
                    "expenditure-usage",
                    format!(
                        "expenditure {} of department {} used {} of {}",
                        exp.id, exp.department_id, exp.allowance_used, exp.monthly_allowance
                    ),
                ));
            }
        }
    }
}

fn expense_history_is_sequential(state: &LedgerState, out: &mut Vec<Violation>) {
    for (position, (id, expense)) in state.expenses.iter().enumerate() {
        let expected = ExpenseId(position as u64 + 1);
        if *id != expected || expense.id != expected {
            out.push(Violation::new(
                "expense-ids",
                format!("expense at position {position} has id {id}, expected {expected}"),
            ));
        }
        if state
            .expenditure(expense.department_id, expense.expenditure_id)
            .is_none()
        {
            out.push(Violation::new(
                "expense-reference",
                format!(
                    "expense {id} points at missing expenditure {} of department {}",
                    expense.expenditure_id, expense.department_id
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use budget_types::{
        AccountId, AllowanceApplication, ApplicationId, Capability, Department, Expenditure,
        ExpenditureId,
    };

    fn department(allowance: Amount, allocated: Amount) -> Department {
        let mut dept = Department::new(DepartmentId(1), "Ops", Capability::new("ops"));
        dept.monthly_allowance = allowance;
        dept.allowance_allocated = allocated;
        dept
    }

    fn expenditure(id: u64, allowance: Amount) -> Expenditure {
        Expenditure::new(
            ExpenditureId(id),
            DepartmentId(1),
            "Rent",
            AccountId::new("alice"),
            allowance,
        )
    }

    #[test]
    fn empty_state_is_clean() {
        assert!(check(&LedgerState::new()).is_empty());
    }

    #[test]
    fn detects_allocation_drift() {
        let mut state = LedgerState::new();
        state.departments.insert(DepartmentId(1), department(500, 300));
        state
            .expenditures
            .entry(DepartmentId(1))
            .or_default()
            .insert(ExpenditureId(1), expenditure(1, 200));

        let violations = check(&state);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "allocation");
    }

    #[test]
    fn over_allocation_is_excused_by_approved_decrease() {
        let mut state = LedgerState::new();
        state.departments.insert(DepartmentId(1), department(100, 300));
        state
            .expenditures
            .entry(DepartmentId(1))
            .or_default()
            .insert(ExpenditureId(1), expenditure(1, 300));
        assert_eq!(check(&state)[0].rule, "over-allocation");

        state.applications.insert(
            ApplicationId(1),
            AllowanceApplication {
                id: ApplicationId(1),
                department_id: DepartmentId(1),
                from_allowance: 500,
                to_allowance: 100,
                status: ApplicationStatus::Approved,
            },
        );
        assert!(check(&state).is_empty());
    }
}
