//! Audit trail: field-level diffs and write-once log entries.
//!
//! Every successful task mutation produces exactly one entry. Updates that
//! change nothing produce none.

use chrono::Utc;
use uuid::Uuid;

use crate::model::{Actor, AuditAction, AuditLogEntry, Task, TaskChanges, FALLBACK_CATEGORY};

/// Default length of description previews in diff clauses.
pub const DEFAULT_PREVIEW_LEN: usize = 20;

const ELLIPSIS: &str = "...";
const CLAUSE_SEPARATOR: &str = "; ";

impl AuditLogEntry {
    /// New entry stamped now, attributed to `actor` and the actor's current organization.
    pub fn record(
        action: AuditAction,
        actor: &Actor,
        task_id: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            task_id: task_id.into(),
            user_id: actor.username.clone(),
            org_id: actor.organization_id.clone(),
            details: Some(details.into()),
            timestamp: Utc::now(),
        }
    }
}

pub fn created_details(title: &str) -> String {
    format!("Created task: \"{title}\"")
}

pub fn deleted_details(title: &str) -> String {
    format!("Deleted task: {title}")
}

/// Result of comparing a stored task with requested changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDiff {
    pub clauses: Vec<String>,
    pub updated: Task,
}

impl TaskDiff {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clauses joined into a single `details` string.
    pub fn details(&self) -> String {
        self.clauses.join(CLAUSE_SEPARATOR)
    }
}

/// Compare title, category, description and status, in that order.
///
/// A field counts as changed only when it is present, non-empty and
/// different from the stored value.
pub fn diff_task(current: &Task, changes: &TaskChanges, preview_len: usize) -> TaskDiff {
    let mut clauses = Vec::new();
    let mut updated = current.clone();

    if let Some(title) = changed_text(changes.title.as_deref(), &current.title) {
        clauses.push(format!(
            "Title changed from \"{}\" to \"{}\"",
            current.title, title
        ));
        updated.title = title.to_string();
    }

    if let Some(category) = changed_text(changes.category.as_deref(), &current.category) {
        let old = if current.category.is_empty() {
            FALLBACK_CATEGORY
        } else {
            current.category.as_str()
        };
        clauses.push(format!("Category changed from \"{old}\" to \"{category}\""));
        updated.category = category.to_string();
    }

    if let Some(description) = changed_text(changes.description.as_deref(), &current.description)
    {
        clauses.push(format!(
            "Description changed from \"{}\" to \"{}\"",
            preview(&current.description, preview_len),
            preview(description, preview_len)
        ));
        updated.description = description.to_string();
    }

    if let Some(status) = changes.status {
        if status != current.status {
            clauses.push(format!(
                "Status changed from {} to {}",
                current.status, status
            ));
            updated.status = status;
        }
    }

    TaskDiff { clauses, updated }
}

fn changed_text<'a>(requested: Option<&'a str>, current: &str) -> Option<&'a str> {
    requested.filter(|value| !value.is_empty() && *value != current)
}

/// First `max_chars` characters, with a trailing ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Format a single audit entry for human-readable output
pub fn format_entry(entry: &AuditLogEntry) -> String {
    let org = entry.org_id.as_deref().unwrap_or("-");
    let details = entry.details.as_deref().unwrap_or("");
    format!(
        "{ts} {action:<6} task={task} actor={actor} org={org} {details}",
        ts = entry.timestamp.to_rfc3339(),
        action = entry.action,
        task = entry.task_id,
        actor = entry.user_id,
    )
    .trim_end()
    .to_string()
}
