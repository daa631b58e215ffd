use anyhow::Result;
use std::collections::BTreeSet;

use crate::commands::CommandReport;
use crate::trending::calendar::YearMonth;
use crate::trending::paths::resolve_paths;
use crate::trending::pipeline::load_document;
use crate::trending::section::{parse_sections, sections_in_month};

#[derive(Debug, Clone, Default)]
pub struct SectionsOptions {
    pub month: Option<String>,
}

pub fn run(opts: &SectionsOptions) -> Result<CommandReport> {
    let month = opts.month.as_deref().map(YearMonth::parse).transpose()?;
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("sections");
    report.detail(format!("document={}", paths.document_file.display()));

    let loaded = load_document(&paths.document_file)?;
    let raw = loaded.raw.as_deref().unwrap_or_default();
    if loaded.raw.is_none() {
        report.detail("document.exists=false");
    }
    report.detail(format!("index.present={}", loaded.doc.had_index));

    let listed = match month {
        Some(m) => sections_in_month(raw, m.year, m.month),
        None => parse_sections(raw),
    };
    for section in &listed {
        let items = section
            .text
            .lines()
            .filter(|l| l.starts_with("- "))
            .count();
        report.detail(format!(
            "section date={} items={items} bytes={}",
            section.date,
            section.text.len()
        ));
    }
    report.detail(format!("sections.listed={}", listed.len()));

    let mut seen = BTreeSet::new();
    for section in &loaded.doc.sections {
        if !seen.insert(section.date) {
            report.issue(format!("duplicate section for {}", section.date));
        }
    }
    for line in &loaded.doc.ignored_headers {
        report.issue(format!("line {line}: section header without a valid date"));
    }

    Ok(report)
}
