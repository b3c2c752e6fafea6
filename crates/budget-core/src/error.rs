use budget_storage::StorageError;
use budget_types::{
    AccountId, Amount, ApplicationId, ApplicationStatus, Capability, DepartmentId, ExpenditureId,
};
use thiserror::Error;

use crate::payment::PaymentError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Which ceiling a quota check ran against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuotaScope {
    /// Department ceiling vs. sum of expenditure ceilings
    Allocation(DepartmentId),
    /// Department ceiling vs. this month's department usage
    DepartmentUsage(DepartmentId),
    /// Expenditure ceiling vs. this month's expenditure usage
    ExpenditureUsage(DepartmentId, ExpenditureId),
}

impl std::fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuotaScope::Allocation(dept) => write!(f, "allocation of department {dept}"),
            QuotaScope::DepartmentUsage(dept) => write!(f, "usage of department {dept}"),
            QuotaScope::ExpenditureUsage(dept, exp) => {
                write!(f, "usage of expenditure {exp} in department {dept}")
            }
        }
    }
}

/// Coarse failure taxonomy, stable across message changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotInitialized,
    AlreadyInitialized,
    Unauthorized,
    NotFound,
    Conflict,
    NoOp,
    Overflow,
    QuotaExceeded,
    Suspended,
    Removed,
    InvalidIdentity,
    InvalidInput,
    Payment,
    Storage,
}

/// Every way a ledger invocation can abort. A returned error means no state
/// was written.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger has not been initialized")]
    NotInitialized,

    #[error("ledger has already been initialized")]
    AlreadyInitialized,

    #[error("{actor} has not authorized this call with capability '{capability}'")]
    Unauthorized {
        actor: AccountId,
        capability: Capability,
    },

    #[error("department {0} does not exist")]
    DepartmentNotFound(DepartmentId),

    #[error("expenditure {expenditure} does not exist in department {department}")]
    ExpenditureNotFound {
        department: DepartmentId,
        expenditure: ExpenditureId,
    },

    #[error("application {0} does not exist")]
    ApplicationNotFound(ApplicationId),

    #[error("department {department} already has pending application {application}")]
    PendingApplicationExists {
        department: DepartmentId,
        application: ApplicationId,
    },

    #[error("application {application} has already been processed ({status})")]
    ApplicationAlreadyProcessed {
        application: ApplicationId,
        status: ApplicationStatus,
    },

    #[error("expenditure {expenditure} in department {department} has already been removed")]
    ExpenditureAlreadyRemoved {
        department: DepartmentId,
        expenditure: ExpenditureId,
    },

    #[error("department {department} is already {}", status_label(.enabled))]
    StatusUnchanged {
        department: DepartmentId,
        enabled: bool,
    },

    #[error("department {department} allowance is already {allowance}")]
    AllowanceUnchanged {
        department: DepartmentId,
        allowance: Amount,
    },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("quota exceeded: {scope} would reach {requested}, ceiling is {ceiling}")]
    QuotaExceeded {
        scope: QuotaScope,
        requested: Amount,
        ceiling: Amount,
    },

    #[error("department {0} has been suspended")]
    Suspended(DepartmentId),

    #[error("expenditure {expenditure} in department {department} has been removed")]
    Removed {
        department: DepartmentId,
        expenditure: ExpenditureId,
    },

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("payment failed: {0}")]
    Payment(#[from] PaymentError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

fn status_label(enabled: &bool) -> &'static str {
    if *enabled {
        "enabled"
    } else {
        "disabled"
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotInitialized => ErrorKind::NotInitialized,
            LedgerError::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            LedgerError::Unauthorized { .. } => ErrorKind::Unauthorized,
            LedgerError::DepartmentNotFound(_)
            | LedgerError::ExpenditureNotFound { .. }
            | LedgerError::ApplicationNotFound(_) => ErrorKind::NotFound,
            LedgerError::PendingApplicationExists { .. }
            | LedgerError::ApplicationAlreadyProcessed { .. }
            | LedgerError::ExpenditureAlreadyRemoved { .. } => ErrorKind::Conflict,
            LedgerError::StatusUnchanged { .. } | LedgerError::AllowanceUnchanged { .. } => {
                ErrorKind::NoOp
            }
            LedgerError::Overflow(_) => ErrorKind::Overflow,
            LedgerError::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            LedgerError::Suspended(_) => ErrorKind::Suspended,
            LedgerError::Removed { .. } => ErrorKind::Removed,
            LedgerError::InvalidIdentity(_) => ErrorKind::InvalidIdentity,
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::Payment(_) => ErrorKind::Payment,
            LedgerError::Storage(_) => ErrorKind::Storage,
        }
    }
}
