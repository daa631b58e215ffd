use crate::trending::calendar::RunContext;
use crate::trending::item::Item;
use crate::trending::render::SectionRenderer;
use crate::trending::section::{Document, Section};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Previous sections for the run date that were dropped.
    pub replaced: usize,
    pub appended: bool,
    pub item_count: usize,
}

/// Ensures the run date's section is present exactly once, at the end.
///
/// With no items the document is left as it is, including any section the
/// run date already has.
pub fn merge_today(
    doc: &mut Document,
    ctx: &RunContext,
    items: &[Item],
    renderer: &dyn SectionRenderer,
) -> MergeOutcome {
    if items.is_empty() {
        return MergeOutcome::default();
    }

    let replaced = doc.take_date(ctx.run_date).len();
    doc.push_section(Section {
        date: ctx.run_date,
        text: renderer.render(ctx.run_date, items),
    });

    MergeOutcome {
        replaced,
        appended: true,
        item_count: items.len(),
    }
}

/// Final document text: preamble, then the index block, then sections.
pub fn compose(doc: &Document, index_block: Option<&str>) -> String {
    doc.render_with_index(index_block)
}

/// Title preamble for a document that does not exist yet.
pub fn new_document_preamble(title: Option<&str>) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("# {title}\n\n"),
        None => String::new(),
    }
}
