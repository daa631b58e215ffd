use crate::trending::calendar::{YearMonth, is_iso_date_shape};
use chrono::NaiveDate;
use std::collections::BTreeSet;

pub const SECTION_HEADER_PREFIX: &str = "## Trending On ";
pub const INDEX_HEADING: &str = "## Monthly Archives";

pub fn section_header(date: NaiveDate) -> String {
    format!("{SECTION_HEADER_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// One date-keyed block. `text` is the exact slice of the source document,
/// header line included, up to the next boundary or end of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub date: NaiveDate,
    pub text: String,
}

/// Structured view of a log document.
///
/// Rendering a parsed document without an index block reproduces the input
/// byte for byte; the index block is the only thing parsing discards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub preamble: String,
    pub sections: Vec<Section>,
    pub had_index: bool,
    /// 1-based line numbers of header-like lines whose date did not parse.
    pub ignored_headers: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Section(NaiveDate),
    Index,
    MalformedHeader,
    Other,
}

fn classify(line: &str) -> LineKind {
    let content = line.trim_end_matches(['\n', '\r']).trim_end();
    if content == INDEX_HEADING {
        return LineKind::Index;
    }
    let Some(rest) = content.strip_prefix(SECTION_HEADER_PREFIX) else {
        return LineKind::Other;
    };
    if !is_iso_date_shape(rest) {
        return LineKind::MalformedHeader;
    }
    match NaiveDate::parse_from_str(rest, "%Y-%m-%d") {
        Ok(date) => LineKind::Section(date),
        Err(_) => LineKind::MalformedHeader,
    }
}

fn is_index_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("- ")
}

enum Cursor {
    Preamble,
    Section,
    Index,
}

pub fn parse_document(text: &str) -> Document {
    let mut doc = Document::default();
    let mut cursor = Cursor::Preamble;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let kind = classify(line);
        match kind {
            LineKind::Section(date) => {
                doc.sections.push(Section {
                    date,
                    text: line.to_string(),
                });
                cursor = Cursor::Section;
                continue;
            }
            LineKind::Index => {
                doc.had_index = true;
                cursor = Cursor::Index;
                continue;
            }
            LineKind::MalformedHeader => doc.ignored_headers.push(idx + 1),
            LineKind::Other => {}
        }

        if matches!(cursor, Cursor::Index) {
            if kind == LineKind::Other && is_index_line(line) {
                continue;
            }
            cursor = if doc.sections.is_empty() {
                Cursor::Preamble
            } else {
                Cursor::Section
            };
        }

        match cursor {
            Cursor::Section => {
                if let Some(section) = doc.sections.last_mut() {
                    section.text.push_str(line);
                }
            }
            _ => doc.preamble.push_str(line),
        }
    }

    doc
}

pub fn parse_sections(text: &str) -> Vec<Section> {
    parse_document(text).sections
}

/// Sections dated within `year`/`month`, in document order. Empty when none
/// match or when `month` is out of range.
pub fn sections_in_month(text: &str, year: i32, month: u32) -> Vec<Section> {
    let Some(target) = YearMonth::new(year, month) else {
        return Vec::new();
    };
    parse_document(text).sections_in(target).cloned().collect()
}

fn ensure_line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

impl Document {
    pub fn sections_in(&self, month: YearMonth) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| month.contains(s.date))
    }

    /// Distinct months older than `month` that still have sections here,
    /// oldest first.
    pub fn months_before(&self, month: YearMonth) -> Vec<YearMonth> {
        self.sections
            .iter()
            .map(|s| YearMonth::of(s.date))
            .filter(|m| *m < month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.sections.iter().any(|s| s.date == date)
    }

    /// Removes every section matching `pred`, keeping relative order on both
    /// sides.
    pub fn take_sections(&mut self, pred: impl Fn(&Section) -> bool) -> Vec<Section> {
        let (taken, kept): (Vec<Section>, Vec<Section>) = std::mem::take(&mut self.sections)
            .into_iter()
            .partition(|s| pred(s));
        self.sections = kept;
        taken
    }

    pub fn take_month(&mut self, month: YearMonth) -> Vec<Section> {
        self.take_sections(|s| month.contains(s.date))
    }

    pub fn take_date(&mut self, date: NaiveDate) -> Vec<Section> {
        self.take_sections(|s| s.date == date)
    }

    /// Appends `section` at the end, first closing an unterminated last line.
    pub fn push_section(&mut self, section: Section) {
        match self.sections.last_mut() {
            Some(last) => ensure_line_break(&mut last.text),
            None => ensure_line_break(&mut self.preamble),
        }
        self.sections.push(section);
    }

    /// `preamble + index_block + sections`. `index_block` is inserted as is;
    /// pass `None` to omit the index.
    pub fn render_with_index(&self, index_block: Option<&str>) -> String {
        let mut out = self.preamble.clone();
        if let Some(block) = index_block {
            ensure_line_break(&mut out);
            out.push_str(block);
        }
        for section in &self.sections {
            out.push_str(&section.text);
        }
        out
    }

    pub fn render(&self) -> String {
        self.render_with_index(None)
    }
}
