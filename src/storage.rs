//! File-backed store
//!
//! All state lives under `<root>/.orgtask/`:
//!
//! ```text
//! .orgtask/
//!   organizations.json            # Organization registry
//!   users.json                    # User registry
//!   tasks.json                    # Task registry
//!   audit/                        # Write-once audit entries
//!     <timestamp>-<uuid>.json
//! ```
//!
//! Registries are rewritten atomically under an exclusive lock on
//! `<file>.lock`. Each task write is its own read-modify-write, so
//! concurrent writers to the same task are last-write-wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::hierarchy::OrgHierarchy;
use crate::lock::{self, lock_path_for, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::model::{AuditLogEntry, Organization, OwnedTask, Task, User};
use crate::scope::{AuditScope, AuditSort, TaskScope, TaskSort};
use crate::store::{DirectoryStore, Store};

/// Name of the data directory under the root
pub const DATA_DIR: &str = ".orgtask";

const SCHEMA_VERSION: &str = "orgtask.store.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Registry<T> {
    schema_version: String,
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

impl<T> Registry<T> {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn organizations_file(&self) -> PathBuf {
        self.data_dir().join("organizations.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.data_dir().join("tasks.json")
    }

    pub fn audit_dir(&self) -> PathBuf {
        self.data_dir().join("audit")
    }

    fn audit_lock_path(&self) -> PathBuf {
        self.audit_dir().join("audit.lock")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the data directory and any missing registry files
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.data_dir())?;
        fs::create_dir_all(self.audit_dir())?;
        for path in [
            self.organizations_file(),
            self.users_file(),
            self.tasks_file(),
        ] {
            if !path.exists() {
                self.write_registry::<serde_json::Value>(&path, &Registry::empty())?;
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.data_dir().exists()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::Storage(format!(
                "no data directory at {}; run 'orgtask init' first",
                self.data_dir().display()
            )))
        }
    }

    // =========================================================================
    // Registry I/O
    // =========================================================================

    fn read_registry<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        self.ensure_initialized()?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let _lock = FileLock::acquire(lock_path_for(path), self.lock_timeout_ms)?;
        let content = fs::read_to_string(path)?;
        let registry: Registry<T> = serde_json::from_str(&content)?;
        Ok(registry.records)
    }

    fn write_registry<T: Serialize>(&self, path: &Path, registry: &Registry<T>) -> Result<()> {
        let json = serde_json::to_vec_pretty(registry)?;
        lock::write_atomic(path, &json)
    }

    fn update_registry<T, R, F>(&self, path: &Path, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        self.ensure_initialized()?;
        let _lock = FileLock::acquire(lock_path_for(path), self.lock_timeout_ms)?;

        let mut registry: Registry<T> = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)?
        } else {
            Registry::empty()
        };

        let result = f(&mut registry.records)?;
        self.write_registry(path, &registry)?;
        Ok(result)
    }

    fn load_hierarchy(&self) -> Result<OrgHierarchy> {
        let organizations: Vec<Organization> = self.read_registry(&self.organizations_file())?;
        Ok(OrgHierarchy::from_organizations(organizations))
    }

    fn load_users(&self) -> Result<HashMap<String, User>> {
        let users: Vec<User> = self.read_registry(&self.users_file())?;
        Ok(users.into_iter().map(|user| (user.id.clone(), user)).collect())
    }

    /// Tasks whose owner is missing from users.json are skipped.
    fn join_tasks(&self, tasks: Vec<Task>) -> Result<Vec<OwnedTask>> {
        let users = self.load_users()?;
        let hierarchy = self.load_hierarchy()?;

        Ok(tasks
            .into_iter()
            .filter_map(|task| {
                let Some(owner) = users.get(&task.user_id).cloned() else {
                    warn!(task_id = %task.id, user_id = %task.user_id, "skipping task with missing owner");
                    return None;
                };
                let organization = owner
                    .organization_id
                    .as_deref()
                    .and_then(|org_id| hierarchy.get(org_id))
                    .cloned();
                Some(OwnedTask {
                    task,
                    owner,
                    organization,
                })
            })
            .collect())
    }

    // =========================================================================
    // Audit entries
    // =========================================================================

    /// Read every audit entry, in file-name (timestamp) order
    pub fn read_audit_entries(&self) -> Result<Vec<AuditLogEntry>> {
        self.ensure_initialized()?;
        let dir = self.audit_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let _lock = FileLock::acquire(self.audit_lock_path(), self.lock_timeout_ms)?;

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path)?;
            entries.push(serde_json::from_str(&content)?);
        }
        Ok(entries)
    }
}

fn audit_filename(entry: &AuditLogEntry) -> String {
    let ts = entry.timestamp.format("%Y%m%dT%H%M%S%.6fZ");
    format!("{}-{}.json", ts, entry.id)
}

impl Store for FileStore {
    fn find_task(&self, id: &str) -> Result<Option<OwnedTask>> {
        let tasks: Vec<Task> = self.read_registry(&self.tasks_file())?;
        let Some(task) = tasks.into_iter().find(|task| task.id == id) else {
            return Ok(None);
        };
        Ok(self.join_tasks(vec![task])?.pop())
    }

    fn find_tasks(&self, scope: &TaskScope, sort: &TaskSort) -> Result<Vec<OwnedTask>> {
        let tasks: Vec<Task> = self.read_registry(&self.tasks_file())?;
        let mut matching: Vec<OwnedTask> = self
            .join_tasks(tasks)?
            .into_iter()
            .filter(|task| scope.matches(task))
            .collect();
        sort.sort(&mut matching);
        Ok(matching)
    }

    fn find_organization(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.load_hierarchy()?.get(id).cloned())
    }

    fn find_child_organizations(&self, id: &str) -> Result<Vec<Organization>> {
        Ok(self
            .load_hierarchy()?
            .children_of(id)
            .into_iter()
            .cloned()
            .collect())
    }

    fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<()> {
        self.ensure_initialized()?;
        let _lock = FileLock::acquire(self.audit_lock_path(), self.lock_timeout_ms)?;
        let path = self.audit_dir().join(audit_filename(entry));
        let json = serde_json::to_vec_pretty(entry)?;
        lock::write_new(&path, &json)
    }

    fn find_audit_logs(
        &self,
        scope: &AuditScope,
        sort: &AuditSort,
    ) -> Result<Vec<AuditLogEntry>> {
        let mut entries: Vec<AuditLogEntry> = self
            .read_audit_entries()?
            .into_iter()
            .filter(|entry| scope.matches(entry))
            .collect();
        sort.sort(&mut entries);
        Ok(entries)
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        self.update_registry(&self.tasks_file(), |tasks: &mut Vec<Task>| {
            match tasks.iter_mut().find(|existing| existing.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => tasks.push(task.clone()),
            }
            Ok(())
        })
    }

    fn replace_task(&self, task: &Task) -> Result<()> {
        self.update_registry(&self.tasks_file(), |tasks: &mut Vec<Task>| {
            let existing = tasks
                .iter_mut()
                .find(|existing| existing.id == task.id)
                .ok_or_else(|| Error::NotFound(format!("task {}", task.id)))?;
            *existing = task.clone();
            Ok(())
        })
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        self.update_registry(&self.tasks_file(), |tasks: &mut Vec<Task>| {
            let before = tasks.len();
            tasks.retain(|task| task.id != id);
            if tasks.len() == before {
                return Err(Error::NotFound(format!("task {id}")));
            }
            Ok(())
        })
    }

    fn set_task_order(&self, id: &str, order: i64) -> Result<bool> {
        self.update_registry(&self.tasks_file(), |tasks: &mut Vec<Task>| {
            Ok(match tasks.iter_mut().find(|task| task.id == id) {
                Some(task) => {
                    task.order = order;
                    true
                }
                None => false,
            })
        })
    }
}

impl DirectoryStore for FileStore {
    fn list_organizations(&self) -> Result<Vec<Organization>> {
        self.read_registry(&self.organizations_file())
    }

    fn insert_organization(&self, organization: &Organization) -> Result<()> {
        self.update_registry(
            &self.organizations_file(),
            |organizations: &mut Vec<Organization>| {
                if organizations.iter().any(|org| org.name == organization.name) {
                    return Err(Error::InvalidArgument(format!(
                        "organization name already taken: {}",
                        organization.name
                    )));
                }
                let mut candidate = organizations.clone();
                candidate.push(organization.clone());
                OrgHierarchy::from_organizations(candidate).validate()?;
                organizations.push(organization.clone());
                Ok(())
            },
        )
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.read_registry(&self.users_file())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.read_registry(&self.users_file())?;
        Ok(users.into_iter().find(|user| user.username == username))
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        self.update_registry(&self.users_file(), |users: &mut Vec<User>| {
            if users.iter().any(|existing| existing.username == user.username) {
                return Err(Error::InvalidArgument(format!(
                    "username already taken: {}",
                    user.username
                )));
            }
            users.push(user.clone());
            Ok(())
        })
    }

    fn reset_directory(&self) -> Result<()> {
        self.update_registry(&self.tasks_file(), |tasks: &mut Vec<Task>| {
            tasks.clear();
            Ok(())
        })?;
        self.update_registry(&self.users_file(), |users: &mut Vec<User>| {
            users.clear();
            Ok(())
        })?;
        self.update_registry(
            &self.organizations_file(),
            |organizations: &mut Vec<Organization>| {
                organizations.clear();
                Ok(())
            },
        )
    }
}
