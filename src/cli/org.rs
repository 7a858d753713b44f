//! orgtask register / org list command implementations

use std::path::PathBuf;

use crate::cli::Session;
use crate::directory::{self, OrganizationChoice, RegisterRequest};
use crate::error::Result;
use crate::hierarchy::OrgHierarchy;
use crate::model::{Organization, Role};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::DirectoryStore;

/// Options for `orgtask register`
pub struct RegisterOptions {
    pub username: String,
    pub role: String,
    pub org_name: Option<String>,
    pub parent: Option<String>,
    pub org: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct OrgListing {
    #[serde(flatten)]
    organization: Organization,
    children: usize,
}

pub fn run_register(options: RegisterOptions) -> Result<()> {
    let role: Role = options.role.parse()?;
    let organization = match (options.org_name, options.org) {
        (Some(name), _) => Some(OrganizationChoice::Create {
            name,
            parent_id: options.parent,
        }),
        (None, Some(id)) => Some(OrganizationChoice::Join { id }),
        (None, None) => None,
    };

    let session = Session::open(options.root)?;
    let registration = directory::register(
        &session.store,
        RegisterRequest {
            username: options.username,
            role,
            organization,
        },
    )?;

    let mut human = HumanOutput::new(format!(
        "orgtask register: {}",
        registration.user.username
    ));
    human.push_summary("id", registration.user.id.clone());
    human.push_summary("role", registration.user.role.to_string());
    human.push_summary(
        "organization",
        format!(
            "{} ({})",
            registration.organization.name, registration.organization.id
        ),
    );
    if registration.created_organization {
        human.push_detail("created organization");
    }
    human.push_next_step(format!("orgtask login {}", registration.user.username));

    emit_success(options.output, "register", &registration, Some(&human))
}

pub fn run_list(root: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(root)?;
    let hierarchy = OrgHierarchy::from_organizations(session.store.list_organizations()?);

    let mut organizations: Vec<&Organization> = hierarchy.iter().collect();
    organizations.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let listing: Vec<OrgListing> = organizations
        .iter()
        .map(|organization| OrgListing {
            organization: (*organization).clone(),
            children: hierarchy.children_of(&organization.id).len(),
        })
        .collect();

    let mut human = HumanOutput::new(format!("orgtask org list: {} organization(s)", listing.len()));
    for entry in &listing {
        let parent = hierarchy
            .parent_of(&entry.organization.id)
            .map(|parent| parent.name.as_str())
            .unwrap_or("-");
        human.push_detail(format!(
            "{} {} parent={} children={}",
            entry.organization.id, entry.organization.name, parent, entry.children
        ));
    }

    emit_success(output, "org list", &listing, Some(&human))
}
