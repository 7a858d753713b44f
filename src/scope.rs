//! Access scope resolution.
//!
//! Visibility is derived from two facts only: the actor's id and the
//! actor's organization (plus its direct children). The role/resource
//! table lives in [`visibility`]; everything else is a pure translation of
//! that table into predicates the store can evaluate.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Actor, AuditLogEntry, OwnedTask, Role, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    TaskList,
    AuditLog,
}

/// How far an actor can see for a given resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only records the actor owns.
    OwnRecords,
    /// Records whose organization is the actor's organization.
    OwnOrganization,
    /// The actor's organization and its direct children.
    OrganizationAndChildren,
    Denied,
}

pub fn visibility(role: Role, kind: ResourceKind) -> Visibility {
    match (kind, role) {
        (ResourceKind::TaskList, Role::Viewer) => Visibility::OwnRecords,
        (ResourceKind::TaskList, Role::Admin) => Visibility::OwnOrganization,
        (ResourceKind::TaskList, Role::Owner) => Visibility::OrganizationAndChildren,
        (ResourceKind::AuditLog, Role::Viewer) => Visibility::Denied,
        (ResourceKind::AuditLog, Role::Admin) => Visibility::OwnOrganization,
        (ResourceKind::AuditLog, Role::Owner) => Visibility::OrganizationAndChildren,
    }
}

/// Predicate over stored tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskScope {
    OwnedBy(String),
    Organization(String),
    OrganizationOrChildren(String),
    /// Matches nothing (e.g. an organization-scoped actor without an organization).
    Empty,
}

impl TaskScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match visibility(actor.role, ResourceKind::TaskList) {
            Visibility::OwnRecords => TaskScope::OwnedBy(actor.id.clone()),
            Visibility::OwnOrganization => match actor.organization_id() {
                Some(org) => TaskScope::Organization(org.to_string()),
                None => TaskScope::Empty,
            },
            Visibility::OrganizationAndChildren => match actor.organization_id() {
                Some(org) => TaskScope::OrganizationOrChildren(org.to_string()),
                None => TaskScope::Empty,
            },
            Visibility::Denied => TaskScope::Empty,
        }
    }

    pub fn matches(&self, task: &OwnedTask) -> bool {
        match self {
            TaskScope::OwnedBy(user_id) => task.owner_id() == user_id,
            TaskScope::Organization(org_id) => task.organization_id() == Some(org_id.as_str()),
            TaskScope::OrganizationOrChildren(org_id) => {
                task.organization_id() == Some(org_id.as_str())
                    || task.parent_organization_id() == Some(org_id.as_str())
            }
            TaskScope::Empty => false,
        }
    }
}

/// Audit read rule before the organization's children are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRule {
    Organization(String),
    OrganizationAndChildren(String),
}

pub fn audit_rule(actor: &Actor) -> Result<AuditRule> {
    let visibility = visibility(actor.role, ResourceKind::AuditLog);
    if matches!(visibility, Visibility::Denied | Visibility::OwnRecords) {
        return Err(Error::PermissionDenied(
            "Viewers cannot access audit logs".to_string(),
        ));
    }

    let org_id = actor
        .organization_id()
        .ok_or_else(|| {
            Error::InvalidState(format!(
                "actor {} has no organization; audit logs are organization-scoped",
                actor.username
            ))
        })?
        .to_string();

    Ok(match visibility {
        Visibility::OrganizationAndChildren => AuditRule::OrganizationAndChildren(org_id),
        _ => AuditRule::Organization(org_id),
    })
}

/// Explicit set of organization ids whose audit entries are readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditScope {
    org_ids: BTreeSet<String>,
}

impl AuditScope {
    pub fn new(org_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            org_ids: org_ids.into_iter().collect(),
        }
    }

    pub fn org_ids(&self) -> &BTreeSet<String> {
        &self.org_ids
    }

    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        entry
            .org_id
            .as_ref()
            .map(|org| self.org_ids.contains(org))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    Order,
    /// Compared by wire name, the way a string status column sorts.
    Status,
    CreatedAt,
}

/// Composite sort over tasks; ties after every key fall back to task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSort {
    keys: Vec<(TaskSortKey, SortDirection)>,
}

impl TaskSort {
    pub fn new(keys: Vec<(TaskSortKey, SortDirection)>) -> Self {
        Self { keys }
    }

    /// `order` asc, `status` asc, `created_at` desc.
    pub fn list_default() -> Self {
        Self::new(vec![
            (TaskSortKey::Order, SortDirection::Ascending),
            (TaskSortKey::Status, SortDirection::Ascending),
            (TaskSortKey::CreatedAt, SortDirection::Descending),
        ])
    }

    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        self.keys
            .iter()
            .fold(Ordering::Equal, |acc, (key, direction)| {
                acc.then_with(|| {
                    let ordering = match key {
                        TaskSortKey::Order => left.order.cmp(&right.order),
                        TaskSortKey::Status => left.status.as_str().cmp(right.status.as_str()),
                        TaskSortKey::CreatedAt => left.created_at.cmp(&right.created_at),
                    };
                    direction.apply(ordering)
                })
            })
            .then_with(|| left.id.cmp(&right.id))
    }

    pub fn sort(&self, tasks: &mut [OwnedTask]) {
        tasks.sort_by(|left, right| self.compare(&left.task, &right.task));
    }
}

impl Default for TaskSort {
    fn default() -> Self {
        Self::list_default()
    }
}

/// Audit entries sort on timestamp only; ties fall back to entry id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSort {
    pub direction: SortDirection,
}

impl AuditSort {
    pub fn newest_first() -> Self {
        Self {
            direction: SortDirection::Descending,
        }
    }

    pub fn compare(&self, left: &AuditLogEntry, right: &AuditLogEntry) -> Ordering {
        self.direction
            .apply(left.timestamp.cmp(&right.timestamp))
            .then_with(|| left.id.cmp(&right.id))
    }

    pub fn sort(&self, entries: &mut [AuditLogEntry]) {
        entries.sort_by(|left, right| self.compare(left, right));
    }
}

impl Default for AuditSort {
    fn default() -> Self {
        Self::newest_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuditAction, Organization, TaskStatus, User};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn actor(id: &str, role: Role, org: Option<&str>) -> Actor {
        Actor::new(id, id, role, org.map(|o| o.to_string()))
    }

    fn owned(task_id: &str, owner: &str, org: Option<(&str, Option<&str>)>) -> OwnedTask {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        OwnedTask {
            task: Task {
                id: task_id.to_string(),
                title: task_id.to_string(),
                description: String::new(),
                status: TaskStatus::Open,
                category: "Work".to_string(),
                order: 0,
                created_at,
                user_id: owner.to_string(),
            },
            owner: User {
                id: owner.to_string(),
                username: owner.to_string(),
                role: Role::Viewer,
                organization_id: org.map(|(id, _)| id.to_string()),
                created_at,
            },
            organization: org.map(|(id, parent)| Organization {
                id: id.to_string(),
                name: id.to_string(),
                parent_id: parent.map(|p| p.to_string()),
                created_at,
            }),
        }
    }

    #[test]
    fn rule_table_is_exhaustive() {
        let expected = [
            (Role::Viewer, ResourceKind::TaskList, Visibility::OwnRecords),
            (Role::Admin, ResourceKind::TaskList, Visibility::OwnOrganization),
            (
                Role::Owner,
                ResourceKind::TaskList,
                Visibility::OrganizationAndChildren,
            ),
            (Role::Viewer, ResourceKind::AuditLog, Visibility::Denied),
            (Role::Admin, ResourceKind::AuditLog, Visibility::OwnOrganization),
            (
                Role::Owner,
                ResourceKind::AuditLog,
                Visibility::OrganizationAndChildren,
            ),
        ];
        for (role, kind, visible) in expected {
            assert_eq!(visibility(role, kind), visible, "{role} {kind:?}");
        }
    }

    #[test]
    fn viewer_scope_is_own_tasks_only() {
        let scope = TaskScope::for_actor(&actor("tom", Role::Viewer, Some("eng")));
        assert!(scope.matches(&owned("t3", "tom", Some(("eng", Some("hq"))))));
        assert!(!scope.matches(&owned("t2", "gwynne", Some(("eng", Some("hq"))))));
    }

    #[test]
    fn admin_scope_is_own_org_only() {
        let scope = TaskScope::for_actor(&actor("gwynne", Role::Admin, Some("eng")));
        assert!(scope.matches(&owned("t2", "someone", Some(("eng", Some("hq"))))));
        assert!(!scope.matches(&owned("t1", "elon", Some(("hq", None)))));
        assert!(!scope.matches(&owned("t9", "x", Some(("eng-web", Some("eng"))))));
    }

    #[test]
    fn owner_scope_stops_at_direct_children() {
        let scope = TaskScope::for_actor(&actor("elon", Role::Owner, Some("hq")));
        assert!(scope.matches(&owned("t1", "elon", Some(("hq", None)))));
        assert!(scope.matches(&owned("t2", "gwynne", Some(("eng", Some("hq"))))));
        assert!(!scope.matches(&owned("t9", "x", Some(("eng-web", Some("eng"))))));
        assert!(!scope.matches(&owned("t8", "y", None)));
    }

    #[test]
    fn org_less_admin_sees_nothing() {
        let scope = TaskScope::for_actor(&actor("a", Role::Admin, None));
        assert_eq!(scope, TaskScope::Empty);
        assert!(!scope.matches(&owned("t", "b", None)));
    }

    #[test]
    fn audit_rule_per_role() {
        assert!(matches!(
            audit_rule(&actor("tom", Role::Viewer, Some("eng"))),
            Err(Error::PermissionDenied(_))
        ));
        assert_eq!(
            audit_rule(&actor("g", Role::Admin, Some("eng"))).unwrap(),
            AuditRule::Organization("eng".to_string())
        );
        assert_eq!(
            audit_rule(&actor("e", Role::Owner, Some("hq"))).unwrap(),
            AuditRule::OrganizationAndChildren("hq".to_string())
        );
        assert!(matches!(
            audit_rule(&actor("e", Role::Owner, None)),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn default_sort_orders_by_rank_status_then_newest() {
        let mut a = owned("a", "u", None);
        let mut b = owned("b", "u", None);
        let mut c = owned("c", "u", None);
        let mut d = owned("d", "u", None);
        a.task.order = 1;
        b.task.status = TaskStatus::Open;
        c.task.status = TaskStatus::Done;
        d.task.status = TaskStatus::Open;
        d.task.created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let mut tasks = vec![a, b, c, d];
        TaskSort::list_default().sort(&mut tasks);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec!["c", "d", "b", "a"]);
    }

    #[test]
    fn audit_scope_and_sort() {
        let scope = AuditScope::new(vec!["hq".to_string(), "eng".to_string()]);
        let entry = |org: Option<&str>, day: u32| AuditLogEntry {
            id: Uuid::new_v4(),
            action: AuditAction::Create,
            task_id: "t".to_string(),
            user_id: "elon".to_string(),
            org_id: org.map(|o| o.to_string()),
            details: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        };
        assert!(scope.matches(&entry(Some("eng"), 1)));
        assert!(!scope.matches(&entry(Some("other"), 1)));
        assert!(!scope.matches(&entry(None, 1)));

        let mut entries = vec![entry(Some("hq"), 1), entry(Some("hq"), 3), entry(Some("hq"), 2)];
        AuditSort::newest_first().sort(&mut entries);
        let days: Vec<String> = entries
            .iter()
            .map(|e| e.timestamp.format("%d").to_string())
            .collect();
        assert_eq!(days, vec!["03", "02", "01"]);
    }
}
