//! orgtask init and seed command implementations
//!
//! `init` creates the data directory, empty registries and a default config.
//! `seed` replaces the directory with the demo organizations and users.

use std::path::{Path, PathBuf};

use crate::cli::Session;
use crate::config::Config;
use crate::directory;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::FileStore;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    data_dir: bool,
}

pub fn run_init(root: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let root = match root {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let store = FileStore::new(root.clone());
    let created_data_dir = !store.is_initialized();
    store.init()?;
    let created_config = ensure_config(&root)?;

    let report = InitReport {
        root: root.clone(),
        created: InitCreated {
            config: created_config,
            data_dir: created_data_dir,
        },
    };

    let mut created_items = Vec::new();
    if created_config {
        created_items.push(crate::config::CONFIG_FILE);
    }
    if created_data_dir {
        created_items.push(".orgtask/");
    }

    let header = if created_items.is_empty() {
        "orgtask init: nothing to do".to_string()
    } else {
        "orgtask init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("root", root.display().to_string());
    human.push_summary(
        "created",
        if created_items.is_empty() {
            "none".to_string()
        } else {
            created_items.join(", ")
        },
    );
    human.push_next_step("orgtask seed");
    human.push_next_step("orgtask register <username> --role OWNER --org-name <name>");

    emit_success(output, "init", &report, Some(&human))
}

pub fn run_seed(root: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(root)?;
    session.store.init()?;

    let summary = directory::seed(&session.store)?;

    let mut human = HumanOutput::new("orgtask seed: directory replaced");
    human.push_summary("root", session.root.display().to_string());
    for organization in &summary.organizations {
        human.push_detail(format!("org {} ({})", organization.name, organization.id));
    }
    for user in &summary.users {
        human.push_detail(format!("user {} [{}]", user.username, user.role));
    }
    human.push_summary("tasks", summary.tasks.len().to_string());
    human.push_next_step("orgtask --as elon task list");

    emit_success(output, "seed", &summary, Some(&human))
}

fn ensure_config(root: &Path) -> Result<bool> {
    let config_path = Config::path_in(root);
    if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::Storage(format!(
                "{} exists but is not a file: {}",
                crate::config::CONFIG_FILE,
                config_path.display()
            )));
        }
        return Ok(false);
    }

    Config::default().save(&config_path)?;
    Ok(true)
}
