use anyhow::Result;

use crate::commands::{CommandReport, describe_cycle};
use crate::trending::lock::RunLock;
use crate::trending::paths::resolve_paths;
use crate::trending::pipeline::{CyclePlan, execute};
use crate::trending::render::MarkdownRenderer;

#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub dry_run: bool,
}

pub fn run(opts: &IndexOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("index");
    report.detail(format!("archives_dir={}", paths.archives_dir.display()));

    if !paths.document_file.exists() {
        report.issue("document does not exist; nothing to index");
        return Ok(report);
    }

    let _lock = if opts.dry_run {
        None
    } else {
        Some(RunLock::acquire(&paths.lock_file())?)
    };

    let outcome = execute(
        &paths,
        &CyclePlan {
            rotate: None,
            merge: None,
            renderer: &MarkdownRenderer,
            new_document_title: None,
            dry_run: opts.dry_run,
        },
    )?;
    describe_cycle(&mut report, &outcome);

    Ok(report)
}
