//! Acting identity resolution.
//!
//! Username resolution order:
//! 1) CLI --as (explicit)
//! 2) ORGTASK_USER environment variable
//! 3) Persisted value in .orgtask/actor (written by `login`)
//! 4) Config default (actor.default)
//!
//! The username is then looked up in the directory; the resulting [`Actor`]
//! snapshot is what every core operation receives.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Actor;
use crate::storage::DATA_DIR;
use crate::store::DirectoryStore;

/// Environment variable naming the acting user
pub const ACTOR_ENV: &str = "ORGTASK_USER";

const ACTOR_FILENAME: &str = "actor";

/// Resolve the acting username, or `None` when nothing names one.
pub fn resolve_username(root: &Path, cli_actor: Option<&str>) -> Result<Option<String>> {
    if let Some(actor) = non_empty(cli_actor) {
        return Ok(Some(actor.to_string()));
    }

    if let Ok(env_actor) = std::env::var(ACTOR_ENV) {
        if let Some(actor) = non_empty(Some(env_actor.as_str())) {
            return Ok(Some(actor.to_string()));
        }
    }

    if let Some(actor) = load_persisted_actor(root)? {
        return Ok(Some(actor));
    }

    let config = Config::load_from_root(root);
    Ok(non_empty(Some(config.actor.default.as_str())).map(str::to_string))
}

/// Resolve the acting user and load their directory record.
pub fn resolve_actor<D: DirectoryStore + ?Sized>(
    store: &D,
    root: &Path,
    cli_actor: Option<&str>,
) -> Result<Actor> {
    let username = resolve_username(root, cli_actor)?.ok_or_else(|| {
        Error::InvalidArgument(format!(
            "No user found in request; pass --as <username>, set {ACTOR_ENV}, or run 'orgtask login'"
        ))
    })?;
    let user = store
        .find_user_by_username(&username)?
        .ok_or_else(|| Error::NotFound(format!("user {username}")))?;
    Ok(Actor::from(&user))
}

/// Persist the acting username in `.orgtask/actor`.
pub fn persist_actor(root: &Path, username: &str) -> Result<()> {
    let username = non_empty(Some(username))
        .ok_or_else(|| Error::InvalidArgument("username cannot be empty".to_string()))?;

    std::fs::create_dir_all(root.join(DATA_DIR))?;
    std::fs::write(actor_path(root), format!("{username}\n"))?;
    Ok(())
}

/// Load the acting username from `.orgtask/actor`, if present.
pub fn load_persisted_actor(root: &Path) -> Result<Option<String>> {
    let path = actor_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    Ok(non_empty(Some(raw.as_str())).map(str::to_string))
}

fn actor_path(root: &Path) -> PathBuf {
    root.join(DATA_DIR).join(ACTOR_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
