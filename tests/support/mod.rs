#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use orgtask::directory::{self, OrganizationChoice, RegisterRequest, SeedSummary};
use orgtask::model::{Actor, Organization, Role, User};
use orgtask::storage::FileStore;
use orgtask::store::DirectoryStore;
use orgtask::TaskService;
use tempfile::TempDir;

pub struct TestRoot {
    dir: TempDir,
    store: FileStore,
}

impl TestRoot {
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let store = FileStore::new(dir.path().to_path_buf());
        store.init().expect("init store");
        Self { dir, store }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn service(&self) -> TaskService<FileStore> {
        TaskService::new(self.store.clone())
    }

    pub fn seed(&self) -> SeedSummary {
        directory::seed(&self.store).expect("seed")
    }

    pub fn actor(&self, username: &str) -> Actor {
        let user = self
            .store
            .find_user_by_username(username)
            .expect("read users")
            .unwrap_or_else(|| panic!("unknown user {username}"));
        Actor::from(&user)
    }

    pub fn org_named(&self, name: &str) -> Organization {
        self.store
            .list_organizations()
            .expect("read organizations")
            .into_iter()
            .find(|org| org.name == name)
            .unwrap_or_else(|| panic!("unknown organization {name}"))
    }

    /// Register a user into an organization, creating it (as a child of
    /// `parent` when given) if no organization has that name yet.
    pub fn register(&self, username: &str, role: Role, org: &str, parent: Option<&str>) -> User {
        let existing = self
            .store
            .list_organizations()
            .expect("read organizations")
            .into_iter()
            .find(|o| o.name == org);
        let organization = match existing {
            Some(found) => OrganizationChoice::Join { id: found.id },
            None => OrganizationChoice::Create {
                name: org.to_string(),
                parent_id: parent.map(|name| self.org_named(name).id),
            },
        };
        let registration = directory::register(
            &self.store,
            RegisterRequest {
                username: username.to_string(),
                role,
                organization: Some(organization),
            },
        )
        .expect("register");
        registration.user
    }

    /// A user with no organization, inserted directly.
    pub fn orphan(&self, username: &str, role: Role) -> User {
        let user = User::new(username, role, None);
        self.store.insert_user(&user).expect("insert user");
        user
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("orgtask").expect("binary");
        cmd.arg("--root").arg(self.path());
        cmd.env_remove("ORGTASK_USER");
        cmd.env_remove("ORGTASK_ROOT");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

pub fn parse_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("valid json output")
}
