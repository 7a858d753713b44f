//! Store collaborator interfaces.
//!
//! The service layer only ever talks to storage through these traits. Task
//! reads come back joined with the owner, the owner's organization and that
//! organization's parent id, so scope and guard checks never issue
//! follow-up queries.

use crate::error::Result;
use crate::model::{AuditLogEntry, Organization, OwnedTask, Task, User};
use crate::scope::{AuditScope, AuditSort, TaskScope, TaskSort};

pub trait Store {
    fn find_task(&self, id: &str) -> Result<Option<OwnedTask>>;

    fn find_tasks(&self, scope: &TaskScope, sort: &TaskSort) -> Result<Vec<OwnedTask>>;

    fn find_organization(&self, id: &str) -> Result<Option<Organization>>;

    /// Organizations whose parent is `id`.
    fn find_child_organizations(&self, id: &str) -> Result<Vec<Organization>>;

    /// Append a write-once entry. Never overwrites.
    fn append_audit_log(&self, entry: &AuditLogEntry) -> Result<()>;

    fn find_audit_logs(&self, scope: &AuditScope, sort: &AuditSort)
        -> Result<Vec<AuditLogEntry>>;

    /// Insert or replace by id.
    fn save_task(&self, task: &Task) -> Result<()>;

    /// Replace an existing task. `NotFound` when the row is gone.
    fn replace_task(&self, task: &Task) -> Result<()>;

    fn delete_task(&self, id: &str) -> Result<()>;

    /// Point write of a single task's rank. Returns `false` when the task is missing.
    fn set_task_order(&self, id: &str, order: i64) -> Result<bool>;
}

/// Organization and user records, maintained outside the scoping core.
pub trait DirectoryStore {
    fn list_organizations(&self) -> Result<Vec<Organization>>;

    fn insert_organization(&self, organization: &Organization) -> Result<()>;

    fn list_users(&self) -> Result<Vec<User>>;

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    fn insert_user(&self, user: &User) -> Result<()>;

    /// Remove every organization, user and task. Audit entries are untouched.
    fn reset_directory(&self) -> Result<()>;
}
