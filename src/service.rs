//! Task operations exposed to callers.
//!
//! Every operation takes the acting identity explicitly. Reads go through
//! the scope resolver, single-record writes through the mutation guard, and
//! successful writes through the audit engine.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{self, DEFAULT_PREVIEW_LEN};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::guard;
use crate::model::{Actor, AuditAction, AuditLogEntry, NewTask, OwnedTask, Task, TaskChanges};
use crate::ordering::{self, RankAssignment};
use crate::scope::{self, AuditRule, AuditScope, AuditSort, TaskScope, TaskSort};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub default_category: String,
    pub description_preview_len: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_category: "Work".to_string(),
            description_preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl From<&Config> for ServiceOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_category: config.tasks.default_category.clone(),
            description_preview_len: config.audit.description_preview_len,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskService<S> {
    store: S,
    options: ServiceOptions,
}

impl<S: Store> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ServiceOptions::default())
    }

    pub fn with_options(store: S, options: ServiceOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Tasks visible to `actor`, by rank, then status, then newest first.
    pub fn list_tasks(&self, actor: &Actor) -> Result<Vec<OwnedTask>> {
        let scope = TaskScope::for_actor(actor);
        debug!(actor = %actor.username, role = %actor.role, ?scope, "listing tasks");
        self.store.find_tasks(&scope, &TaskSort::list_default())
    }

    pub fn create_task(&self, actor: &Actor, request: NewTask) -> Result<OwnedTask> {
        if actor.organization_id().is_none() {
            return Err(Error::InvalidState(format!(
                "user {} has no organization; cannot create tasks",
                actor.username
            )));
        }

        let title = request.title.trim();
        if title.is_empty() {
            return Err(Error::InvalidArgument("title cannot be empty".to_string()));
        }

        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(&self.options.default_category)
            .to_string();

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: request.description,
            status: Default::default(),
            category,
            order: 0,
            created_at: chrono::Utc::now(),
            user_id: actor.id.clone(),
        };

        self.store.save_task(&task)?;

        let entry = AuditLogEntry::record(
            AuditAction::Create,
            actor,
            task.id.clone(),
            audit::created_details(&task.title),
        );
        if let Err(err) = self.store.append_audit_log(&entry) {
            warn!(task_id = %task.id, error = %err, "audit append failed; removing created task");
            if let Err(rollback) = self.store.delete_task(&task.id) {
                warn!(task_id = %task.id, error = %rollback, "rollback of created task failed");
            }
            return Err(err);
        }

        info!(actor = %actor.username, task_id = %task.id, "task created");
        self.store
            .find_task(&task.id)?
            .ok_or_else(|| Error::NotFound(format!("task {}", task.id)))
    }

    /// Apply `changes` to task `id`. A request that changes nothing writes
    /// nothing and returns the stored task untouched.
    pub fn update_task(&self, actor: &Actor, id: &str, changes: &TaskChanges) -> Result<OwnedTask> {
        let mut current = self.load_for_mutation(actor, id)?;

        let diff = audit::diff_task(
            &current.task,
            changes,
            self.options.description_preview_len,
        );
        if diff.is_empty() {
            debug!(task_id = %id, "update is a no-op");
            return Ok(current);
        }

        let entry = AuditLogEntry::record(AuditAction::Update, actor, id, diff.details());
        self.store.append_audit_log(&entry)?;
        self.store.replace_task(&diff.updated)?;

        info!(actor = %actor.username, task_id = %id, changes = diff.clauses.len(), "task updated");
        current.task = diff.updated;
        Ok(current)
    }

    /// Delete task `id`. The DELETE entry is written before the task is removed.
    pub fn delete_task(&self, actor: &Actor, id: &str) -> Result<()> {
        let current = self.load_for_mutation(actor, id)?;

        let entry = AuditLogEntry::record(
            AuditAction::Delete,
            actor,
            id,
            audit::deleted_details(&current.task.title),
        );
        self.store.append_audit_log(&entry)?;
        self.store.delete_task(id)?;

        info!(actor = %actor.username, task_id = %id, "task deleted");
        Ok(())
    }

    /// Rank `ordered_ids` by position. Not atomic across ids.
    pub fn reorder(&self, actor: &Actor, ordered_ids: &[String]) -> Result<Vec<RankAssignment>> {
        debug!(actor = %actor.username, count = ordered_ids.len(), "reordering tasks");
        ordering::apply_ranks(&self.store, ordered_ids)
    }

    /// Audit entries visible to `actor`, newest first.
    pub fn list_audit_logs(&self, actor: &Actor) -> Result<Vec<AuditLogEntry>> {
        let scope = self.resolve_audit_scope(actor)?;
        debug!(actor = %actor.username, orgs = scope.org_ids().len(), "listing audit logs");
        self.store.find_audit_logs(&scope, &AuditSort::newest_first())
    }

    pub fn resolve_audit_scope(&self, actor: &Actor) -> Result<AuditScope> {
        match scope::audit_rule(actor)? {
            AuditRule::Organization(org_id) => Ok(AuditScope::new([org_id])),
            AuditRule::OrganizationAndChildren(org_id) => {
                let organization = self
                    .store
                    .find_organization(&org_id)?
                    .ok_or_else(|| Error::NotFound(format!("organization {org_id}")))?;
                let children = self.store.find_child_organizations(&organization.id)?;
                Ok(AuditScope::new(
                    std::iter::once(organization.id).chain(children.into_iter().map(|c| c.id)),
                ))
            }
        }
    }

    fn load_for_mutation(&self, actor: &Actor, id: &str) -> Result<OwnedTask> {
        let task = self
            .store
            .find_task(id)?
            .ok_or_else(|| Error::NotFound("Task not found".to_string()))?;
        guard::ensure_can_mutate(actor, &task)?;
        Ok(task)
    }
}
