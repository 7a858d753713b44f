//! Organization tree.
//!
//! Stored as two flat maps (id -> record, id -> parent id); the children
//! index is derived from the parent map and never persisted.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::Organization;

#[derive(Debug, Clone, Default)]
pub struct OrgHierarchy {
    by_id: HashMap<String, Organization>,
    parent_by_id: HashMap<String, String>,
    children_by_id: HashMap<String, Vec<String>>,
}

impl OrgHierarchy {
    pub fn from_organizations(orgs: impl IntoIterator<Item = Organization>) -> Self {
        let mut by_id = HashMap::new();
        let mut parent_by_id = HashMap::new();
        for org in orgs {
            if let Some(parent) = &org.parent_id {
                parent_by_id.insert(org.id.clone(), parent.clone());
            }
            by_id.insert(org.id.clone(), org);
        }

        let mut children_by_id: HashMap<String, Vec<String>> = HashMap::new();
        for (child, parent) in &parent_by_id {
            children_by_id
                .entry(parent.clone())
                .or_default()
                .push(child.clone());
        }
        for children in children_by_id.values_mut() {
            children.sort_by(|left, right| {
                let left_org = &by_id[left];
                let right_org = &by_id[right];
                left_org
                    .created_at
                    .cmp(&right_org.created_at)
                    .then_with(|| left.cmp(right))
            });
        }

        Self {
            by_id,
            parent_by_id,
            children_by_id,
        }
    }

    /// Every organization, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Organization> {
        self.by_id.values()
    }

    pub fn get(&self, id: &str) -> Option<&Organization> {
        self.by_id.get(id)
    }

    pub fn parent_id_of(&self, id: &str) -> Option<&str> {
        self.parent_by_id.get(id).map(String::as_str)
    }

    pub fn parent_of(&self, id: &str) -> Option<&Organization> {
        self.parent_id_of(id).and_then(|parent| self.by_id.get(parent))
    }

    /// Direct children of `id` (depth exactly 1), oldest first.
    pub fn children_of(&self, id: &str) -> Vec<&Organization> {
        self.children_by_id
            .get(id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| self.by_id.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Would pointing `org_id` at `parent_id` close a loop?
    pub fn would_create_cycle(&self, org_id: &str, parent_id: &str) -> bool {
        let mut current = Some(parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == org_id {
                return true;
            }
            steps += 1;
            if steps > self.by_id.len() {
                return true;
            }
            current = self.parent_id_of(id);
        }
        false
    }

    /// Reject dangling parent references and cycles.
    pub fn validate(&self) -> Result<()> {
        for (child, parent) in &self.parent_by_id {
            if !self.by_id.contains_key(parent) {
                return Err(Error::InvalidState(format!(
                    "organization {child} references missing parent {parent}"
                )));
            }
            if self.would_create_cycle(child, parent) {
                return Err(Error::InvalidState(format!(
                    "organization {child} is part of a parent cycle"
                )));
            }
        }
        Ok(())
    }
}
