use crate::trending::calendar::YearMonth;
use crate::trending::paths::TrendPaths;
use crate::trending::section::INDEX_HEADING;
use crate::trending::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// The set of known archive months. Always rendered newest first, whatever
/// order the directory listing produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveIndex {
    months: BTreeSet<YearMonth>,
}

impl ArchiveIndex {
    pub fn from_months(months: impl IntoIterator<Item = YearMonth>) -> Self {
        Self {
            months: months.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, month: YearMonth) -> bool {
        self.months.insert(month)
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn newest_first(&self) -> Vec<YearMonth> {
        let mut out = self.months.iter().copied().collect::<Vec<_>>();
        out.sort_by_key(|m| Reverse(*m));
        out
    }

    /// The index block, or `None` when there is nothing to link.
    pub fn render(&self, paths: &TrendPaths) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        out.push_str(INDEX_HEADING);
        out.push_str("\n\n");
        for month in self.newest_first() {
            out.push_str(&format!(
                "- [{}]({})\n",
                month.display_name(),
                paths.archive_link(&month.archive_file_name())
            ));
        }
        out.push('\n');
        Some(out)
    }
}

/// Lists `<Month>-<Year>.md` files in `dir`. Other `.md` files are reported
/// and skipped; a missing directory is an empty index.
pub fn scan_archives(dir: &Path) -> Result<ArchiveIndex> {
    if !dir.exists() {
        return Ok(ArchiveIndex::default());
    }

    let mut months = Vec::new();

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match YearMonth::from_archive_file_name(name) {
            Some(month) => months.push(month),
            None if name.ends_with(".md") => warn::emit(WarnEvent {
                code: "ARCHIVE_NAME_IGNORED",
                stage: "index",
                action: "scan-archives",
                target: &path.display().to_string(),
                reason: "name-not-month-year",
                err: "",
            }),
            None => {}
        }
    }
    Ok(ArchiveIndex::from_months(months))
}
