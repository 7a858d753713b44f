//! orgtask - Organization-Scoped Task Tracking Library
//!
//! This library provides the core functionality for the orgtask CLI:
//! role- and hierarchy-scoped access to tasks, plus an append-only audit
//! trail of every task mutation.
//!
//! # Core Concepts
//!
//! - **Organizations**: A forest; each organization has at most one parent
//! - **Roles**: OWNER, ADMIN and VIEWER decide which tasks and audit entries are visible
//! - **Mutation guard**: Owners of a task, or members of its organization or the parent organization, may change it
//! - **Audit trail**: One write-once entry per successful create, update or delete
//!
//! # Module Organization
//!
//! - `model`: Domain records (organizations, users, tasks, audit entries)
//! - `hierarchy`: Organization tree queries
//! - `scope`: Visibility rule table, query scopes and sort orders
//! - `guard`: Per-task mutation guard and route-level role gate
//! - `audit`: Field diffs, audit details strings and entry construction
//! - `ordering`: Dense task ranks
//! - `service`: Task operations taking an explicit actor
//! - `directory`: User registration and demo seeding
//! - `store`: Store collaborator traits
//! - `storage`: File-backed store under `.orgtask/`
//! - `lock`: File locking and atomic writes
//! - `actor`: Acting identity resolution
//! - `config`: Configuration loading from `.orgtask.toml`
//! - `output`: Human and JSON output envelopes
//! - `cli`: Command-line interface using clap
//! - `error`: Error types and result aliases

pub mod actor;
pub mod audit;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod guard;
pub mod hierarchy;
pub mod lock;
pub mod model;
pub mod ordering;
pub mod output;
pub mod scope;
pub mod service;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
pub use service::TaskService;
