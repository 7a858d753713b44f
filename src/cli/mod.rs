//! Command-line interface for orgtask
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::actor;
use crate::config::Config;
use crate::error::Result;
use crate::model::Actor;
use crate::output::OutputOptions;
use crate::service::{ServiceOptions, TaskService};
use crate::storage::{FileStore, DATA_DIR};

mod audit;
mod identity;
mod init;
mod org;
mod task;

/// orgtask - Organization-scoped task tracking
///
/// Tasks belong to users, users belong to organizations, and every change
/// is recorded in an append-only audit trail visible by role.
#[derive(Parser, Debug)]
#[command(name = "orgtask")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data root holding .orgtask/ (defaults to the current directory or the user data dir)
    #[arg(long, global = true, env = "ORGTASK_ROOT")]
    pub root: Option<PathBuf>,

    /// Username to act as
    #[arg(long = "as", global = true, env = "ORGTASK_USER", value_name = "USERNAME")]
    pub as_user: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and empty registries
    Init,

    /// Replace organizations, users and tasks with demo data
    Seed,

    /// Remember a username as the default acting user
    Login {
        /// Registered username
        username: String,
    },

    /// Show the resolved acting user
    Whoami,

    /// Register a user, creating or joining an organization
    Register {
        /// Unique username
        username: String,

        /// Role: OWNER, ADMIN or VIEWER
        #[arg(long)]
        role: String,

        /// Create a new organization with this name
        #[arg(long, conflicts_with = "org")]
        org_name: Option<String>,

        /// Parent organization id for the new organization
        #[arg(long, requires = "org_name")]
        parent: Option<String>,

        /// Join an existing organization by id
        #[arg(long)]
        org: Option<String>,
    },

    /// Organization directory
    #[command(subcommand)]
    Org(OrgCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Audit trail
    #[command(subcommand)]
    Audit(AuditCommands),
}

/// Organization subcommands
#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// List organizations with their parents
    List,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks visible to the acting user
    List,

    /// Create a task owned by the acting user
    New {
        /// Task title
        title: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// Category (defaults to tasks.default_category)
        #[arg(long)]
        category: Option<String>,
    },

    /// Change fields of a task
    Edit {
        /// Task id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// OPEN, IN_PROGRESS or DONE
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Delete a task (OWNER or ADMIN)
    Rm {
        /// Task id
        id: String,
    },

    /// Rank tasks by the order given
    Reorder {
        /// Task ids, first gets rank 0
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Audit subcommands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// Show audit entries visible to the acting user, newest first
    Log {
        /// Maximum entries to show (0 = all; defaults to audit.default_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Resolve the data root: explicit flag, then a current directory that
/// already holds `.orgtask/`, then the per-user data directory.
pub(crate) fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root);
    }

    let cwd = std::env::current_dir()?;
    if cwd.join(DATA_DIR).exists() {
        return Ok(cwd);
    }

    Ok(directories::ProjectDirs::from("", "", "orgtask")
        .map_or(cwd, |dirs| dirs.data_dir().to_path_buf()))
}

/// Everything a command needs once the data root is known.
pub(crate) struct Session {
    pub root: PathBuf,
    pub config: Config,
    pub store: FileStore,
}

impl Session {
    pub(crate) fn open(root: Option<PathBuf>) -> Result<Self> {
        let root = resolve_root(root)?;
        Ok(Self::at(&root))
    }

    pub(crate) fn at(root: &Path) -> Self {
        let config = Config::load_from_root(root);
        let store =
            FileStore::new(root.to_path_buf()).with_lock_timeout(config.storage.lock_timeout_ms);
        Self {
            root: root.to_path_buf(),
            config,
            store,
        }
    }

    pub(crate) fn service(&self) -> TaskService<FileStore> {
        TaskService::with_options(self.store.clone(), ServiceOptions::from(&self.config))
    }

    pub(crate) fn actor(&self, cli_actor: Option<&str>) -> Result<Actor> {
        actor::resolve_actor(&self.store, &self.root, cli_actor)
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run_init(self.root, output),
            Commands::Seed => init::run_seed(self.root, output),
            Commands::Login { username } => identity::run_login(identity::LoginOptions {
                username,
                root: self.root,
                output,
            }),
            Commands::Whoami => identity::run_whoami(identity::WhoamiOptions {
                actor: self.as_user,
                root: self.root,
                output,
            }),
            Commands::Register {
                username,
                role,
                org_name,
                parent,
                org,
            } => org::run_register(org::RegisterOptions {
                username,
                role,
                org_name,
                parent,
                org,
                root: self.root,
                output,
            }),
            Commands::Org(cmd) => match cmd {
                OrgCommands::List => org::run_list(self.root, output),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::List => task::run_list(task::ListOptions {
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
                TaskCommands::New {
                    title,
                    description,
                    category,
                } => task::run_new(task::NewOptions {
                    title,
                    description,
                    category,
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    status,
                    category,
                } => task::run_edit(task::EditOptions {
                    id,
                    title,
                    description,
                    status,
                    category,
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
                TaskCommands::Rm { id } => task::run_rm(task::RmOptions {
                    id,
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
                TaskCommands::Reorder { ids } => task::run_reorder(task::ReorderOptions {
                    ids,
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
            },
            Commands::Audit(cmd) => match cmd {
                AuditCommands::Log { limit } => audit::run_log(audit::LogOptions {
                    limit,
                    actor: self.as_user,
                    root: self.root,
                    output,
                }),
            },
        }
    }
}
