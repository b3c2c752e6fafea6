//! File-backed ledger store.
//!
//! State lives in memory; each commit is written to a JSON snapshot before it
//! becomes visible. Snapshots carry a blake3 checksum of the state that is
//! verified when the file is opened.

use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use budget_types::{
    AllowanceApplication, ApplicationId, Department, DepartmentId, Expenditure, ExpenditureId,
    ExpenseId, ExpenseRecord, LedgerConfig,
};
use serde::{Deserialize, Serialize};

use crate::changes::ChangeSet;
use crate::error::{StorageError, StorageResult};
use crate::memory::InMemoryLedgerStore;
use crate::state::LedgerState;
use crate::traits::LedgerStore;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    checksum: String,
    state: LedgerState,
}

/// Ledger store persisted as a single snapshot file.
#[derive(Debug)]
pub struct FileLedgerStore {
    path: PathBuf,
    inner: InMemoryLedgerStore,
}

impl FileLedgerStore {
    /// Open `path`, hydrating from it when present. A missing file is an
    /// empty ledger; it is created on the first commit.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            load_snapshot(&path)?
        } else {
            LedgerState::new()
        };
        Ok(Self {
            path,
            inner: InMemoryLedgerStore::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(state: &LedgerState) -> StorageResult<String> {
    let bytes =
        serde_json::to_vec(state).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn load_snapshot(path: &Path) -> StorageResult<LedgerState> {
    let raw = fs::read(path)?;
    let snapshot: Snapshot =
        serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StorageError::Integrity(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }

    let expected = checksum(&snapshot.state)?;
    if expected != snapshot.checksum {
        return Err(StorageError::Integrity(format!(
            "checksum mismatch in {}",
            path.display()
        )));
    }

    Ok(snapshot.state)
}

fn write_snapshot(path: &Path, state: &LedgerState) -> StorageResult<()> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        checksum: checksum(state)?,
        state: state.clone(),
    };
    let bytes = serde_json::to_vec_pretty(&snapshot)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    // Readers never see a torn file: write aside, flush to disk, then rename over.
    let staging = path.with_extension("tmp");
    let mut file = File::create(&staging)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&staging, path)?;
    Ok(())
}

impl LedgerStore for FileLedgerStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn config(&self) -> StorageResult<Option<LedgerConfig>> {
        self.inner.config()
    }

    fn department(&self, id: DepartmentId) -> StorageResult<Option<Department>> {
        self.inner.department(id)
    }

    fn last_department_id(&self) -> StorageResult<Option<DepartmentId>> {
        self.inner.last_department_id()
    }

    fn departments(&self) -> StorageResult<Vec<Department>> {
        self.inner.departments()
    }

    fn application(&self, id: ApplicationId) -> StorageResult<Option<AllowanceApplication>> {
        self.inner.application(id)
    }

    fn last_application_id(&self) -> StorageResult<Option<ApplicationId>> {
        self.inner.last_application_id()
    }

    fn applications(&self) -> StorageResult<Vec<AllowanceApplication>> {
        self.inner.applications()
    }

    fn expenditure(
        &self,
        department: DepartmentId,
        id: ExpenditureId,
    ) -> StorageResult<Option<Expenditure>> {
        self.inner.expenditure(department, id)
    }

    fn last_expenditure_id(
        &self,
        department: DepartmentId,
    ) -> StorageResult<Option<ExpenditureId>> {
        self.inner.last_expenditure_id(department)
    }

    fn expenditures(&self, department: DepartmentId) -> StorageResult<Vec<Expenditure>> {
        self.inner.expenditures(department)
    }

    fn last_expense_id(&self) -> StorageResult<Option<ExpenseId>> {
        self.inner.last_expense_id()
    }

    fn expenses(&self) -> StorageResult<Vec<ExpenseRecord>> {
        self.inner.expenses()
    }

    fn snapshot(&self) -> StorageResult<LedgerState> {
        self.inner.snapshot()
    }

    fn commit(&self, changes: ChangeSet) -> StorageResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.inner.write(|state| {
            let mut next = state.clone();
            next.apply(changes)?;
            write_snapshot(&self.path, &next)?;
            *state = next;
            Ok(())
        })
    }
}
