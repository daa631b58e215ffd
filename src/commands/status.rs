use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::trending::audit::read_events;
use crate::trending::calendar::RunContext;
use crate::trending::config::{FETCH_SOURCE_FILE, load_config, resolve_config_path};
use crate::trending::index::scan_archives;
use crate::trending::paths::resolve_paths;
use crate::trending::pipeline::load_document;

include!(concat!(env!("OUT_DIR"), "/trendlog_env_allowlist.rs"));

/// Recognised `TRENDLOG_*` variables that are currently set.
pub fn env_overrides() -> Vec<(&'static str, String)> {
    GENERATED_TRENDLOG_ENV_ALLOWLIST
        .iter()
        .filter_map(|key| env::var(key).ok().map(|value| (*key, value)))
        .collect()
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");
    report.detail(format!("build_id={}", env!("BUILD_UUID")));
    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("document={}", paths.document_file.display()));
    report.detail(format!("archives_dir={}", paths.archives_dir.display()));
    report.detail(format!("state_dir={}", paths.state_dir.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    match resolve_config_path(&paths.home) {
        Some(path) => report.detail(format!("config_path={}", path.display())),
        None => report.detail("config_path=none"),
    }

    let loaded = load_document(&paths.document_file)?;

    match load_config(&paths.home) {
        Ok(cfg) => {
            report.detail(format!("schedule.timezone={}", cfg.schedule.timezone));
            match cfg.timezone() {
                Ok(tz) => {
                    let ctx = RunContext::today_in(tz);
                    report.detail(format!("today={}", ctx.run_date));
                    report.detail(format!(
                        "document.has_today={}",
                        loaded.doc.has_date(ctx.run_date)
                    ));
                    report.detail(format!("rotation_day={}", ctx.is_rotation_day()));
                }
                Err(err) => report.issue(format!("config: {err:#}")),
            }
            report.detail(format!("fetch.source={}", cfg.fetch.source));
            if cfg.fetch.source == FETCH_SOURCE_FILE {
                report.detail(format!(
                    "fetch.items_file={}",
                    cfg.fetch.items_file.as_deref().unwrap_or("none")
                ));
            } else {
                report.detail(format!("fetch.query={}", cfg.fetch.query));
                report.detail(format!("fetch.limit={}", cfg.fetch.limit));
            }
        }
        Err(err) => report.issue(format!("config: {err:#}")),
    }

    let index = scan_archives(&paths.archives_dir)?;
    report.detail(format!("archives={}", index.len()));
    if let Some(newest) = index.newest_first().first() {
        report.detail(format!("archives.newest={newest}"));
    }

    report.detail(format!("document.exists={}", loaded.raw.is_some()));
    report.detail(format!("document.sections={}", loaded.doc.sections.len()));
    if let Some(last) = loaded.doc.sections.iter().map(|s| s.date).max() {
        report.detail(format!("document.latest={last}"));
    }

    if let Some(last) = read_events(&paths)?.last() {
        report.detail(format!(
            "audit.last={} {} at={}",
            last.phase, last.status, last.at_epoch_secs
        ));
    }

    for (key, value) in env_overrides() {
        report.detail(format!("env.{key}={value}"));
    }

    Ok(report)
}
