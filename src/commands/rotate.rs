use anyhow::Result;

use crate::commands::{CommandReport, describe_cycle};
use crate::trending::calendar::YearMonth;
use crate::trending::config::load_config;
use crate::trending::lock::RunLock;
use crate::trending::paths::resolve_paths;
use crate::trending::pipeline::{CyclePlan, RotationScope, execute};
use crate::trending::render::MarkdownRenderer;

#[derive(Debug, Clone)]
pub struct RotateOptions {
    pub month: String,
    pub dry_run: bool,
}

pub fn run(opts: &RotateOptions) -> Result<CommandReport> {
    let month = YearMonth::parse(&opts.month)?;
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.home)?;
    let mut report = CommandReport::new("rotate");

    let _lock = if opts.dry_run {
        None
    } else {
        Some(RunLock::acquire(&paths.lock_file())?)
    };

    let outcome = execute(
        &paths,
        &CyclePlan {
            rotate: Some(RotationScope::Month(month)),
            merge: None,
            renderer: &MarkdownRenderer,
            new_document_title: cfg.document.title.as_deref(),
            dry_run: opts.dry_run,
        },
    )?;
    describe_cycle(&mut report, &outcome);

    Ok(report)
}
