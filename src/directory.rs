//! User and organization registration, plus demo seeding.

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Organization, Role, Task, TaskStatus, User, FALLBACK_CATEGORY};
use crate::store::{DirectoryStore, Store};

/// Which organization a new user lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationChoice {
    /// Create a new organization; a child of `parent_id` when given, else a root.
    Create {
        name: String,
        parent_id: Option<String>,
    },
    /// Join an existing organization by id.
    Join { id: String },
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub role: Role,
    pub organization: Option<OrganizationChoice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: User,
    pub organization: Organization,
    pub created_organization: bool,
}

pub fn register<D: DirectoryStore + ?Sized>(
    store: &D,
    request: RegisterRequest,
) -> Result<Registration> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(Error::InvalidArgument("username cannot be empty".to_string()));
    }
    if store.find_user_by_username(username)?.is_some() {
        return Err(Error::InvalidArgument(format!(
            "username already taken: {username}"
        )));
    }

    let (organization, created_organization) = match request.organization {
        Some(OrganizationChoice::Create { name, parent_id }) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidArgument(
                    "organization name cannot be empty".to_string(),
                ));
            }
            let organization = match parent_id {
                Some(parent_id) => {
                    let parent = find_organization(store, &parent_id)?.ok_or_else(|| {
                        Error::InvalidArgument("Parent Organization not found".to_string())
                    })?;
                    Organization::new(name, Some(parent.id))
                }
                None => {
                    if request.role != Role::Owner {
                        return Err(Error::InvalidArgument(
                            "Only Owners can create a Root Organization".to_string(),
                        ));
                    }
                    Organization::new(name, None)
                }
            };
            store.insert_organization(&organization)?;
            (organization, true)
        }
        Some(OrganizationChoice::Join { id }) => {
            let organization = find_organization(store, &id)?
                .ok_or_else(|| Error::InvalidArgument("Organization not found".to_string()))?;
            (organization, false)
        }
        None => {
            return Err(Error::InvalidArgument(
                "Must provide an organization name (to create) or an organization id (to join)"
                    .to_string(),
            ))
        }
    };

    let user = User::new(username, request.role, Some(organization.id.clone()));
    store.insert_user(&user)?;

    info!(
        username = %user.username,
        role = %user.role,
        organization = %organization.name,
        created_organization,
        "user registered"
    );
    Ok(Registration {
        user,
        organization,
        created_organization,
    })
}

fn find_organization<D: DirectoryStore + ?Sized>(
    store: &D,
    id: &str,
) -> Result<Option<Organization>> {
    Ok(store
        .list_organizations()?
        .into_iter()
        .find(|organization| organization.id == id))
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub organizations: Vec<Organization>,
    pub users: Vec<User>,
    pub tasks: Vec<Task>,
}

/// Replace organizations, users and tasks with the demo directory.
///
/// Audit entries are left alone and the seeded tasks are not audited.
pub fn seed<S: Store + DirectoryStore + ?Sized>(store: &S) -> Result<SeedSummary> {
    store.reset_directory()?;

    let spacex = Organization::new("SpaceX", None);
    store.insert_organization(&spacex)?;
    let engineering = Organization::new("SpaceX Engineering", Some(spacex.id.clone()));
    store.insert_organization(&engineering)?;

    let elon = User::new("elon", Role::Owner, Some(spacex.id.clone()));
    let gwynne = User::new("gwynne", Role::Admin, Some(engineering.id.clone()));
    let tom = User::new("tom", Role::Viewer, Some(engineering.id.clone()));
    for user in [&elon, &gwynne, &tom] {
        store.insert_user(user)?;
    }

    let now = Utc::now();
    let seeded = [
        (&elon, "Elon Task (Mars)", "Plan the mission to Mars"),
        (&gwynne, "Gwynne Task (Budget)", "Approve Q1 Engineering Budget"),
        (&tom, "Tom Task (Bugfix)", "Fix the login bug"),
    ];
    let mut tasks = Vec::with_capacity(seeded.len());
    for (offset, (owner, title, description)) in seeded.into_iter().enumerate() {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            status: TaskStatus::Open,
            category: FALLBACK_CATEGORY.to_string(),
            order: 0,
            // Strictly increasing so "newest first" is deterministic.
            created_at: now + Duration::milliseconds(offset as i64),
            user_id: owner.id.clone(),
        };
        store.save_task(&task)?;
        tasks.push(task);
    }

    info!(tasks = tasks.len(), "directory seeded");
    Ok(SeedSummary {
        organizations: vec![spacex, engineering],
        users: vec![elon, gwynne, tom],
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().to_path_buf());
        store.init().unwrap();
        (temp, store)
    }

    fn create(username: &str, role: Role, name: &str, parent_id: Option<String>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            role,
            organization: Some(OrganizationChoice::Create {
                name: name.to_string(),
                parent_id,
            }),
        }
    }

    #[test]
    fn owner_creates_root_and_admin_creates_child() {
        let (_temp, store) = store();
        let root = register(&store, create("elon", Role::Owner, "SpaceX", None)).unwrap();
        assert!(root.created_organization);
        assert!(root.organization.is_root());

        let child = register(
            &store,
            create("gwynne", Role::Admin, "Eng", Some(root.organization.id.clone())),
        )
        .unwrap();
        assert_eq!(
            child.organization.parent_id.as_deref(),
            Some(root.organization.id.as_str())
        );
        assert_eq!(
            child.user.organization_id.as_deref(),
            Some(child.organization.id.as_str())
        );
    }

    #[test]
    fn only_owner_creates_root() {
        let (_temp, store) = store();
        let err = register(&store, create("gwynne", Role::Admin, "Rogue", None)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(msg) if msg.contains("Root Organization")));
        assert!(store.list_organizations().unwrap().is_empty());
    }

    #[test]
    fn missing_parent_or_org_rejected() {
        let (_temp, store) = store();
        let err = register(
            &store,
            create("gwynne", Role::Admin, "Eng", Some("nope".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(msg) if msg == "Parent Organization not found"));

        let err = register(
            &store,
            RegisterRequest {
                username: "tom".to_string(),
                role: Role::Viewer,
                organization: Some(OrganizationChoice::Join {
                    id: "nope".to_string(),
                }),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(msg) if msg == "Organization not found"));

        let err = register(
            &store,
            RegisterRequest {
                username: "tom".to_string(),
                role: Role::Viewer,
                organization: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn join_existing_and_duplicate_username() {
        let (_temp, store) = store();
        let root = register(&store, create("elon", Role::Owner, "SpaceX", None)).unwrap();
        let joined = register(
            &store,
            RegisterRequest {
                username: "tom".to_string(),
                role: Role::Viewer,
                organization: Some(OrganizationChoice::Join {
                    id: root.organization.id.clone(),
                }),
            },
        )
        .unwrap();
        assert!(!joined.created_organization);
        assert_eq!(store.list_organizations().unwrap().len(), 1);

        let err = register(&store, create("tom", Role::Owner, "Other", None)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(store.list_organizations().unwrap().len(), 1);
    }

    #[test]
    fn seed_installs_demo_directory() {
        let (_temp, store) = store();
        register(&store, create("someone", Role::Owner, "Old", None)).unwrap();

        let summary = seed(&store).unwrap();
        assert_eq!(summary.tasks.len(), 3);

        let orgs = store.list_organizations().unwrap();
        let names: Vec<_> = orgs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["SpaceX", "SpaceX Engineering"]);
        assert!(store.find_user_by_username("someone").unwrap().is_none());
        assert_eq!(
            store.find_user_by_username("gwynne").unwrap().unwrap().role,
            Role::Admin
        );
        assert!(store.read_audit_entries().unwrap().is_empty());

        // Reseeding replaces rather than duplicates.
        seed(&store).unwrap();
        assert_eq!(store.list_users().unwrap().len(), 3);
    }
}
