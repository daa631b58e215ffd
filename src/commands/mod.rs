pub mod index;
pub mod rotate;
pub mod run;
pub mod sections;
pub mod status;

use serde::Serialize;

use crate::trending::pipeline::{CycleOutcome, RotationScope, RotationStatus};

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

/// Shared report lines for every command that runs a cycle.
pub fn describe_cycle(report: &mut CommandReport, outcome: &CycleOutcome) {
    report.detail(format!("document={}", outcome.document_path.display()));
    if outcome.dry_run {
        report.detail("dry_run=true");
    }

    match &outcome.rotation {
        RotationStatus::NotScheduled => report.detail("rotation=not-scheduled"),
        RotationStatus::NoOp(RotationScope::Month(month)) => {
            report.detail(format!("rotation=noop month={month}"))
        }
        RotationStatus::NoOp(RotationScope::Outstanding { current, .. }) => {
            report.detail(format!("rotation=noop before={current}"))
        }
        RotationStatus::Rotated(archives) => {
            for archive in archives {
                report.detail(format!("rotation=rotated month={}", archive.month));
                report.detail(format!("archive.path={}", archive.archive_path.display()));
                report.detail(format!("archive.existed={}", archive.existed));
                report.detail(format!("archive.moved={}", archive.moved));
                report.detail(format!("archive.added={}", archive.added));
                report.detail(format!(
                    "archive.already_archived={}",
                    archive.already_archived
                ));
            }
            report.detail(format!("archives.written={}", outcome.archives_written));
        }
    }

    if outcome.merge.appended {
        report.detail(format!("merge.items={}", outcome.merge.item_count));
        report.detail(format!("merge.replaced={}", outcome.merge.replaced));
    }

    let months = outcome
        .index_months
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    report.detail(format!("index.entries={}", months.len()));
    if !months.is_empty() {
        report.detail(format!("index.months={}", months.join(",")));
    }
    if !outcome.ignored_headers.is_empty() {
        let lines = outcome
            .ignored_headers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        report.detail(format!("parse.ignored_header_lines={}", lines.join(",")));
    }
    report.detail(format!("document.changed={}", outcome.document_changed));
    report.detail(format!("document.written={}", outcome.document_written));
}
