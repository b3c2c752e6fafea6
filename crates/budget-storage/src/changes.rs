use budget_types::{AllowanceApplication, Department, Expenditure, ExpenseRecord, LedgerConfig};

/// One staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    /// Create the configuration singleton. Rejected if it already exists.
    PutConfig(LedgerConfig),
    /// Insert or replace a department by id.
    PutDepartment(Department),
    /// Insert or replace an application by id.
    PutApplication(AllowanceApplication),
    /// Insert or replace an expenditure under its department.
    PutExpenditure(Expenditure),
    /// Append to the expense history. Rejected if the id is taken.
    AppendExpense(ExpenseRecord),
}

impl Write {
    pub fn label(&self) -> &'static str {
        match self {
            Write::PutConfig(_) => "put_config",
            Write::PutDepartment(_) => "put_department",
            Write::PutApplication(_) => "put_application",
            Write::PutExpenditure(_) => "put_expenditure",
            Write::AppendExpense(_) => "append_expense",
        }
    }
}

/// Writes staged by one invocation, committed together or not at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    writes: Vec<Write>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_config(&mut self, config: LedgerConfig) -> &mut Self {
        self.writes.push(Write::PutConfig(config));
        self
    }

    pub fn put_department(&mut self, department: Department) -> &mut Self {
        self.writes.push(Write::PutDepartment(department));
        self
    }

    pub fn put_application(&mut self, application: AllowanceApplication) -> &mut Self {
        self.writes.push(Write::PutApplication(application));
        self
    }

    pub fn put_expenditure(&mut self, expenditure: Expenditure) -> &mut Self {
        self.writes.push(Write::PutExpenditure(expenditure));
        self
    }

    pub fn append_expense(&mut self, expense: ExpenseRecord) -> &mut Self {
        self.writes.push(Write::AppendExpense(expense));
        self
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
