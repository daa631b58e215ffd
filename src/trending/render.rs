use crate::trending::item::Item;
use crate::trending::section::section_header;
use chrono::NaiveDate;

/// Turns a day's items into one section of the log.
///
/// Implementations must start the section with [`section_header`] and must
/// not emit any other line that parses as a section or index header, so the
/// parser finds exactly the boundaries the renderer produced.
pub trait SectionRenderer {
    fn render(&self, date: NaiveDate, items: &[Item]) -> String;
}

/// Markdown list, one line per item, terminated by a blank line.
pub struct MarkdownRenderer;

fn single_line(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn link_text(input: &str) -> String {
    single_line(input).replace('[', "\\[").replace(']', "\\]")
}

/// Percent-encodes the characters that would end a markdown link target
/// early. Other characters pass through unchanged.
fn link_target(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.trim().chars() {
        match ch {
            ' ' | '\t' | '\n' | '\r' => out.push_str("%20"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_item_line(item: &Item) -> String {
    let mut line = format!("- [{}]({})", link_text(&item.name), link_target(&item.url));
    if let Some(stars) = item.stars {
        line.push_str(&format!(" ⭐ {stars}"));
    }
    if let Some(language) = item.language.as_deref().map(single_line)
        && !language.is_empty()
    {
        line.push_str(&format!(" `{language}`"));
    }
    if let Some(description) = item.description.as_deref().map(single_line)
        && !description.is_empty()
    {
        line.push_str(": ");
        line.push_str(&description);
    }
    line
}

impl SectionRenderer for MarkdownRenderer {
    fn render(&self, date: NaiveDate, items: &[Item]) -> String {
        let mut out = section_header(date);
        out.push_str("\n\n");
        for item in items {
            out.push_str(&render_item_line(item));
            out.push('\n');
        }
        out.push('\n');
        out
    }
}
