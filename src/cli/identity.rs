//! orgtask login / whoami command implementations

use std::path::PathBuf;

use crate::actor;
use crate::cli::Session;
use crate::error::{Error, Result};
use crate::model::Actor;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::DirectoryStore;

/// Options for `orgtask login`
pub struct LoginOptions {
    pub username: String,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `orgtask whoami`
pub struct WhoamiOptions {
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct LoginReport {
    actor: Actor,
    path: PathBuf,
}

pub fn run_login(options: LoginOptions) -> Result<()> {
    let session = Session::open(options.root)?;

    let user = session
        .store
        .find_user_by_username(options.username.trim())?
        .ok_or_else(|| Error::NotFound(format!("user {}", options.username.trim())))?;
    actor::persist_actor(&session.root, &user.username)?;

    let report = LoginReport {
        actor: Actor::from(&user),
        path: session.store.data_dir().join("actor"),
    };

    let mut human = HumanOutput::new(format!("orgtask login: {}", user.username));
    human.push_summary("role", user.role.to_string());
    human.push_summary("path", report.path.display().to_string());
    human.push_next_step("orgtask task list");

    emit_success(options.output, "login", &report, Some(&human))
}

pub fn run_whoami(options: WhoamiOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;

    let mut human = HumanOutput::new(format!("orgtask whoami: {}", actor.username));
    human.push_summary("id", actor.id.clone());
    human.push_summary("role", actor.role.to_string());
    human.push_summary(
        "organization",
        actor.organization_id().unwrap_or("none").to_string(),
    );
    if actor.organization_id().is_none() {
        human.push_warning("user has no organization; task creation and audit reads will fail");
    }

    emit_success(options.output, "whoami", &actor, Some(&human))
}
