//! Mutation and role guards.
//!
//! [`can_mutate`] decides single-record edit/delete rights; [`require_roles`]
//! is the coarse gate a caller puts in front of a whole operation.

use crate::error::{Error, Result};
use crate::model::{Actor, OwnedTask, Role};

/// Outcome of a per-record mutation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDecision {
    /// The actor owns the task.
    Owner,
    /// The task lives in the actor's organization or one of its direct children.
    OrganizationScope,
    Denied,
}

impl MutationDecision {
    pub fn is_permitted(self) -> bool {
        !matches!(self, MutationDecision::Denied)
    }
}

pub fn can_mutate(actor: &Actor, task: &OwnedTask) -> MutationDecision {
    if task.owner_id() == actor.id {
        return MutationDecision::Owner;
    }
    if actor.role == Role::Viewer {
        return MutationDecision::Denied;
    }

    let Some(actor_org) = actor.organization_id() else {
        return MutationDecision::Denied;
    };
    if task.organization_id() == Some(actor_org) || task.parent_organization_id() == Some(actor_org)
    {
        MutationDecision::OrganizationScope
    } else {
        MutationDecision::Denied
    }
}

pub fn ensure_can_mutate(actor: &Actor, task: &OwnedTask) -> Result<MutationDecision> {
    let decision = can_mutate(actor, task);
    if !decision.is_permitted() {
        tracing::warn!(
            actor = %actor.username,
            task_id = %task.id(),
            "mutation denied"
        );
        return Err(Error::PermissionDenied("Access Denied".to_string()));
    }
    Ok(decision)
}

/// Empty `required` means unrestricted. OWNER passes every gate.
pub fn require_roles(actor: Option<&Actor>, required: &[Role]) -> Result<()> {
    if required.is_empty() {
        return Ok(());
    }

    let actor = actor.ok_or_else(|| {
        Error::PermissionDenied("No user found in request".to_string())
    })?;

    if actor.role == Role::Owner || required.contains(&actor.role) {
        return Ok(());
    }

    let names: Vec<&str> = required.iter().map(Role::as_str).collect();
    Err(Error::PermissionDenied(format!(
        "You need to be a {} to access this resource",
        names.join(" or ")
    )))
}
