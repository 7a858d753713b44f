//! orgtask audit command implementations.

use std::path::PathBuf;

use crate::audit::format_entry;
use crate::cli::Session;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct LogOptions {
    pub limit: Option<usize>,
    pub actor: Option<String>,
    pub root: Option<PathBuf>,
    pub output: OutputOptions,
}

pub fn run_log(options: LogOptions) -> Result<()> {
    let session = Session::open(options.root)?;
    let actor = session.actor(options.actor.as_deref())?;
    let mut entries = session.service().list_audit_logs(&actor)?;

    let total = entries.len();
    let limit = options
        .limit
        .unwrap_or(session.config.audit.default_limit);
    if limit > 0 {
        entries.truncate(limit);
    }

    let mut human = HumanOutput::new(format!(
        "orgtask audit log: {} of {} entr{}",
        entries.len(),
        total,
        if total == 1 { "y" } else { "ies" }
    ));
    for entry in &entries {
        human.push_detail(format_entry(entry));
    }
    if entries.len() < total {
        human.push_next_step("orgtask audit log --limit 0");
    }

    emit_success(options.output, "audit log", &entries, Some(&human))
}
