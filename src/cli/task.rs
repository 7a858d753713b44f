//! orgtask task command implementations.

use std::path::PathBuf;

use crate::cli::Session;
use crate::error::Result;
use crate::guard;
use crate::model::{NewTask, OwnedTask, Role, TaskChanges, TaskStatus};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Roles allowed to reach `task rm` at all; the per-task guard still applies.
const DELETE_ROLES: &[Role] = &[Role::Owner, Role::Admin];

pub struct ListOptions {
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct NewOptions {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct RmOptions {
    pub id: String,
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

pub struct ReorderOptions {
    pub ids: Vec<String>,
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct RemovedReport {
    id: String,
    removed: bool,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    let tasks = session.service().list_tasks(&actor)?;

    let mut human = HumanOutput::new(format!(
        "orgtask task list: {} task(s) visible to {} [{}]",
        tasks.len(),
        actor.username,
        actor.role
    ));
    for task in &tasks {
        human.push_detail(format_task_line(task));
    }

    emit_success(options.output, "task list", &tasks, Some(&human))
}

pub fn run_new(options: NewOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    let task = session.service().create_task(
        &actor,
        NewTask {
            title: options.title,
            description: options.description,
            category: options.category,
        },
    )?;

    let mut human = HumanOutput::new(format!("orgtask task new: {}", task.id()));
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("orgtask task edit {} --status IN_PROGRESS", task.id()));

    emit_success(options.output, "task new", &task, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let status = options
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()?;
    let changes = TaskChanges {
        title: options.title,
        description: options.description,
        status,
        category: options.category,
    };

    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    let task = session.service().update_task(&actor, &options.id, &changes)?;

    let mut human = HumanOutput::new(format!("orgtask task edit: {}", task.id()));
    push_task_summary(&mut human, &task);

    emit_success(options.output, "task edit", &task, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    guard::require_roles(Some(&actor), DELETE_ROLES)?;
    session.service().delete_task(&actor, &options.id)?;

    let report = RemovedReport {
        id: options.id.clone(),
        removed: true,
    };
    let human = HumanOutput::new(format!("orgtask task rm: {}", options.id));

    emit_success(options.output, "task rm", &report, Some(&human))
}

pub fn run_reorder(options: ReorderOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    let ranks = session.service().reorder(&actor, &options.ids)?;

    let mut human = HumanOutput::new(format!("orgtask task reorder: {} task(s)", ranks.len()));
    for rank in &ranks {
        human.push_detail(format!("{} {}", rank.order, rank.id));
    }

    emit_success(options.output, "task reorder", &ranks, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, task: &OwnedTask) {
    human.push_summary("title", task.task.title.clone());
    human.push_summary("status", task.task.status.to_string());
    human.push_summary("category", task.task.category.clone());
    human.push_summary("owner", task.owner.username.clone());
}

fn format_task_line(task: &OwnedTask) -> String {
    let org = task
        .organization
        .as_ref()
        .map(|org| org.name.as_str())
        .unwrap_or("-");
    format!(
        "{id} #{order} [{status}] {title} ({category}) owner={owner} org={org}",
        id = task.id(),
        order = task.task.order,
        status = task.task.status,
        title = task.task.title,
        category = task.task.category,
        owner = task.owner.username,
    )
}
