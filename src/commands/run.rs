use anyhow::Result;
use std::path::Path;

use crate::commands::{CommandReport, describe_cycle};
use crate::trending::audit;
use crate::trending::calendar::{RunContext, parse_run_date};
use crate::trending::config::load_config;
use crate::trending::fetch::source_from_config;
use crate::trending::lock::RunLock;
use crate::trending::paths::resolve_paths;
use crate::trending::pipeline::{CyclePlan, execute, scheduled_rotation};
use crate::trending::render::MarkdownRenderer;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub date: Option<String>,
    pub items_file: Option<String>,
    pub dry_run: bool,
}

pub fn run(opts: &RunOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let cfg = load_config(&paths.home)?;
    let ctx = match opts.date.as_deref() {
        Some(raw) => RunContext::new(parse_run_date(raw)?),
        None => RunContext::today_in(cfg.timezone()?),
    };

    let mut report = CommandReport::new("run");
    report.detail(format!("run_date={}", ctx.run_date));

    let lock = if opts.dry_run {
        None
    } else {
        Some(RunLock::acquire(&paths.lock_file())?)
    };
    if let Some(lock) = &lock {
        report.detail(format!("lock={}", lock.path().display()));
    }

    let source = source_from_config(
        &cfg.fetch,
        opts.items_file.as_deref().map(Path::new),
        &paths.home,
    );
    let items = match source.fetch() {
        Ok(items) => items,
        Err(err) => {
            if !opts.dry_run {
                audit::record(&paths, "fetch", "failed", &format!("{err:#}"));
            }
            return Err(err.context(format!("fetching items from {}", source.name())));
        }
    };
    report.detail(format!("fetch.source={}", source.name()));
    report.detail(format!("fetch.items={}", items.len()));
    if items.is_empty() {
        report.detail("merge=skipped reason=no-items");
    }

    let outcome = execute(
        &paths,
        &CyclePlan {
            rotate: Some(scheduled_rotation(&ctx)),
            merge: Some((ctx, &items)),
            renderer: &MarkdownRenderer,
            new_document_title: cfg.document.title.as_deref(),
            dry_run: opts.dry_run,
        },
    )?;
    describe_cycle(&mut report, &outcome);

    Ok(report)
}
