use crate::trending::calendar::YearMonth;
use crate::trending::paths::TrendPaths;
use crate::trending::section::{Document, Section, parse_document};
use crate::trending::util::read_optional;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A rotation computed in memory. Nothing is on disk until the caller
/// persists `text` to `archive_path`.
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub month: YearMonth,
    pub archive_path: PathBuf,
    pub text: String,
    /// Sections taken out of the live document.
    pub moved: usize,
    /// Sections that were not in the archive yet.
    pub added: usize,
    /// Sections the archive already held, left as archived.
    pub already_archived: usize,
    pub existed: bool,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnionCounts {
    pub added: usize,
    pub already_archived: usize,
}

pub fn archive_preamble(month: YearMonth) -> String {
    format!("# {}\n\n", month.display_name())
}

/// Set-union of `incoming` into `archive`, keyed by date. Archived sections
/// keep their place and content; new dates are appended in incoming order.
pub fn union_sections(archive: &mut Document, incoming: Vec<Section>) -> UnionCounts {
    let mut known = archive
        .sections
        .iter()
        .map(|s| s.date)
        .collect::<BTreeSet<NaiveDate>>();
    let mut counts = UnionCounts::default();
    for section in incoming {
        if known.insert(section.date) {
            archive.push_section(section);
            counts.added += 1;
        } else {
            counts.already_archived += 1;
        }
    }
    counts
}

/// Composes the archive text for `month` given its current content (if any).
pub fn merge_archive_text(
    existing: Option<&str>,
    month: YearMonth,
    incoming: Vec<Section>,
) -> (String, UnionCounts) {
    let mut archive = match existing {
        Some(raw) => parse_document(raw),
        None => Document {
            preamble: archive_preamble(month),
            ..Document::default()
        },
    };
    let counts = union_sections(&mut archive, incoming);
    (archive.render(), counts)
}

/// Moves every section of `month` out of `doc` and into the archive plan.
/// Returns `None` when the document holds nothing for that month; `doc` is
/// then left untouched.
pub fn plan_rotation(
    paths: &TrendPaths,
    doc: &mut Document,
    month: YearMonth,
) -> Result<Option<ArchivePlan>> {
    let taken = doc.take_month(month);
    if taken.is_empty() {
        return Ok(None);
    }

    let moved = taken.len();
    let archive_path = paths.archive_file(&month.archive_file_name());
    let existing = read_optional(&archive_path)?;
    let (text, counts) = merge_archive_text(existing.as_deref(), month, taken);
    let changed = existing.as_deref() != Some(text.as_str());

    Ok(Some(ArchivePlan {
        month,
        archive_path,
        text,
        moved,
        added: counts.added,
        already_archived: counts.already_archived,
        existed: existing.is_some(),
        changed,
    }))
}
