use crate::trending::archive::{ArchivePlan, plan_rotation};
use crate::trending::audit;
use crate::trending::calendar::{RunContext, YearMonth};
use crate::trending::index::scan_archives;
use crate::trending::item::Item;
use crate::trending::merge::{MergeOutcome, compose, merge_today, new_document_preamble};
use crate::trending::paths::TrendPaths;
use crate::trending::render::SectionRenderer;
use crate::trending::section::{Document, parse_document};
use crate::trending::util::{read_optional, short_hash, write_atomic};
use crate::trending::warn::{self, WarnEvent};
use anyhow::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub raw: Option<String>,
    pub doc: Document,
}

/// Which months a cycle moves out of the live document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationScope {
    /// Exactly this month, whatever the run date.
    Month(YearMonth),
    /// Every month older than `current` still holding sections. `due` marks
    /// the first of the month; on other days the scope only fires when a
    /// missed run left older sections behind.
    Outstanding { current: YearMonth, due: bool },
}

#[derive(Debug, Clone)]
pub enum RotationStatus {
    NotScheduled,
    NoOp(RotationScope),
    /// One plan per archived month, oldest first.
    Rotated(Vec<ArchivePlan>),
}

/// What one cycle should do. `rotate` and `merge` are independent so the
/// same path serves `run`, `rotate` and `index`.
pub struct CyclePlan<'a> {
    pub rotate: Option<RotationScope>,
    pub merge: Option<(RunContext, &'a [Item])>,
    pub renderer: &'a dyn SectionRenderer,
    pub new_document_title: Option<&'a str>,
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub document_path: PathBuf,
    pub rotation: RotationStatus,
    pub merge: MergeOutcome,
    pub index_months: Vec<YearMonth>,
    pub ignored_headers: Vec<usize>,
    pub document_changed: bool,
    pub document_written: bool,
    pub archives_written: usize,
    pub dry_run: bool,
}

pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let raw = read_optional(path)?;
    let doc = parse_document(raw.as_deref().unwrap_or_default());
    for line in &doc.ignored_headers {
        warn::emit(WarnEvent {
            code: "PARSE_AMBIGUITY",
            stage: "parse",
            action: "ignore-header",
            target: &path.display().to_string(),
            reason: &format!("line {line} has no valid date"),
            err: "",
        });
    }
    Ok(LoadedDocument { raw, doc })
}

/// The rotation a run date calls for. Older months are always in scope so a
/// run after a missed first of the month still empties them out.
pub fn scheduled_rotation(ctx: &RunContext) -> RotationScope {
    RotationScope::Outstanding {
        current: ctx.current_month(),
        due: ctx.is_rotation_day(),
    }
}

fn rotate_scope(
    paths: &TrendPaths,
    doc: &mut Document,
    scope: RotationScope,
) -> Result<RotationStatus> {
    let months = match scope {
        RotationScope::Month(month) => vec![month],
        RotationScope::Outstanding { current, .. } => doc.months_before(current),
    };

    let mut archives = Vec::new();
    for month in months {
        if let Some(archive) = plan_rotation(paths, doc, month)? {
            archives.push(archive);
        }
    }

    Ok(match scope {
        _ if !archives.is_empty() => RotationStatus::Rotated(archives),
        RotationScope::Outstanding { due: false, .. } => RotationStatus::NotScheduled,
        _ => RotationStatus::NoOp(scope),
    })
}

pub fn execute(paths: &TrendPaths, plan: &CyclePlan<'_>) -> Result<CycleOutcome> {
    let LoadedDocument { raw, mut doc } = load_document(&paths.document_file)?;

    let rotation = match plan.rotate {
        None => RotationStatus::NotScheduled,
        Some(scope) => rotate_scope(paths, &mut doc, scope)?,
    };

    let mut index = scan_archives(&paths.archives_dir)?;
    if let RotationStatus::Rotated(archives) = &rotation {
        for archive in archives {
            index.insert(archive.month);
        }
    }

    let merge = match plan.merge {
        Some((ctx, items)) => merge_today(&mut doc, &ctx, items, plan.renderer),
        None => MergeOutcome::default(),
    };

    if raw.is_none() && doc.preamble.is_empty() && !doc.sections.is_empty() {
        doc.preamble = new_document_preamble(plan.new_document_title);
    }

    let index_block = index.render(paths);
    let text = compose(&doc, index_block.as_deref());
    let document_changed = match raw.as_deref() {
        Some(existing) => existing != text,
        None => !text.is_empty(),
    };

    let mut archives_written = 0;
    let mut document_written = false;
    if !plan.dry_run {
        // Archives first: an interruption between the writes leaves the
        // sections in both places, which the next rotation unions away.
        if let RotationStatus::Rotated(archives) = &rotation {
            for archive in archives.iter().filter(|a| a.changed) {
                write_atomic(&archive.archive_path, &archive.text)?;
                archives_written += 1;
            }
        }
        if document_changed {
            write_atomic(&paths.document_file, &text)?;
            document_written = true;
        }
    }

    let outcome = CycleOutcome {
        document_path: paths.document_file.clone(),
        rotation,
        merge,
        index_months: index.newest_first(),
        ignored_headers: doc.ignored_headers.clone(),
        document_changed,
        document_written,
        archives_written,
        dry_run: plan.dry_run,
    };
    if !plan.dry_run {
        record_audit(paths, &outcome, &text);
    }
    Ok(outcome)
}

fn record_audit(paths: &TrendPaths, outcome: &CycleOutcome, text: &str) {
    match &outcome.rotation {
        RotationStatus::NotScheduled => {}
        RotationStatus::NoOp(scope) => audit::record(
            paths,
            "rotate",
            "noop",
            &match scope {
                RotationScope::Month(month) => format!("month={month} no sections in document"),
                RotationScope::Outstanding { current, .. } => {
                    format!("before={current} no older sections in document")
                }
            },
        ),
        RotationStatus::Rotated(archives) => {
            for archive in archives {
                audit::record(
                    paths,
                    "rotate",
                    "ok",
                    &format!(
                        "month={} archive={} existed={} moved={} added={} already_archived={} changed={} hash={}",
                        archive.month,
                        archive.archive_path.display(),
                        archive.existed,
                        archive.moved,
                        archive.added,
                        archive.already_archived,
                        archive.changed,
                        short_hash(&archive.text)
                    ),
                );
            }
        }
    }

    if outcome.merge.appended {
        audit::record(
            paths,
            "merge",
            "ok",
            &format!(
                "items={} replaced={}",
                outcome.merge.item_count, outcome.merge.replaced
            ),
        );
    }

    audit::record(
        paths,
        "write",
        if outcome.document_written {
            "ok"
        } else {
            "unchanged"
        },
        &format!(
            "document={} archives_written={} index_entries={} hash={}",
            outcome.document_path.display(),
            outcome.archives_written,
            outcome.index_months.len(),
            short_hash(text)
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trending::paths::paths_for_home;
    use crate::trending::render::MarkdownRenderer;
    use crate::trending::section::parse_sections;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn ctx(y: i32, m: u32, d: u32) -> RunContext {
        RunContext::new(NaiveDate::from_ymd_opt(y, m, d).expect("date"))
    }

    fn items(names: &[&str]) -> Vec<Item> {
        names
            .iter()
            .map(|n| Item::new(*n, format!("https://github.com/{n}")))
            .collect()
    }

    fn run_day(paths: &TrendPaths, ctx: RunContext, items: &[Item]) -> CycleOutcome {
        execute(
            paths,
            &CyclePlan {
                rotate: Some(scheduled_rotation(&ctx)),
                merge: Some((ctx, items)),
                renderer: &MarkdownRenderer,
                new_document_title: None,
                dry_run: false,
            },
        )
        .expect("cycle")
    }

    fn section(day: &str, name: &str) -> String {
        format!("## Trending On {day}\n\n- [{name}](https://github.com/{name})\n\n")
    }

    #[test]
    fn month_end_rotation_with_empty_items() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let jan30 = section("2024-01-30", "a/a");
        let jan31 = section("2024-01-31", "b/b");
        fs::write(&paths.document_file, format!("{jan30}{jan31}")).expect("seed");

        let out = run_day(&paths, ctx(2024, 2, 1), &[]);
        assert!(matches!(out.rotation, RotationStatus::Rotated(_)));
        assert_eq!(out.archives_written, 1);

        let archive =
            fs::read_to_string(paths.archive_file("January-2024.md")).expect("archive");
        assert_eq!(archive, format!("# January 2024\n\n{jan30}{jan31}"));

        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert_eq!(
            document,
            "## Monthly Archives\n\n- [January 2024](archives/January-2024.md)\n\n"
        );
        assert!(parse_sections(&document).is_empty());
    }

    #[test]
    fn fresh_document_has_one_section_and_no_index() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());

        let out = run_day(&paths, ctx(2024, 3, 5), &items(&["x/y"]));
        assert!(matches!(out.rotation, RotationStatus::NotScheduled));
        assert!(out.document_written);
        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert_eq!(document, section("2024-03-05", "x/y"));
        assert!(!paths.archives_dir.exists());
    }

    #[test]
    fn empty_run_on_missing_document_writes_nothing() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let out = run_day(&paths, ctx(2024, 3, 5), &[]);
        assert!(!out.document_changed);
        assert!(!paths.document_file.exists());
    }

    #[test]
    fn repeated_rotation_day_is_idempotent() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        fs::write(
            &paths.document_file,
            format!("{}{}", section("2023-12-30", "a/a"), section("2023-12-31", "b/b")),
        )
        .expect("seed");

        let list = items(&["n/y"]);
        run_day(&paths, ctx(2024, 1, 1), &list);
        let archive_1 = fs::read_to_string(paths.archive_file("December-2023.md")).expect("a1");
        let document_1 = fs::read_to_string(&paths.document_file).expect("d1");

        let second = run_day(&paths, ctx(2024, 1, 1), &list);
        assert!(matches!(second.rotation, RotationStatus::NoOp(_)));
        assert!(!second.document_written);
        let archive_2 = fs::read_to_string(paths.archive_file("December-2023.md")).expect("a2");
        let document_2 = fs::read_to_string(&paths.document_file).expect("d2");
        assert_eq!(archive_1, archive_2);
        assert_eq!(document_1, document_2);
        assert!(document_2.contains("- [December 2023](archives/December-2023.md)"));
        assert!(document_2.ends_with(&section("2024-01-01", "n/y")));
    }

    #[test]
    fn interrupted_rotation_recovers_on_retry() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let jan30 = section("2024-01-30", "a/a");
        let jan31 = section("2024-01-31", "b/b");
        // Archive already written, document never updated.
        fs::create_dir_all(&paths.archives_dir).expect("mkdir");
        fs::write(
            paths.archive_file("January-2024.md"),
            format!("# January 2024\n\n{jan30}"),
        )
        .expect("seed archive");
        fs::write(&paths.document_file, format!("{jan30}{jan31}")).expect("seed doc");

        run_day(&paths, ctx(2024, 2, 1), &[]);
        let archive =
            fs::read_to_string(paths.archive_file("January-2024.md")).expect("archive");
        assert_eq!(archive, format!("# January 2024\n\n{jan30}{jan31}"));
        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert!(parse_sections(&document).is_empty());
    }

    #[test]
    fn index_lists_archives_newest_first() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        fs::create_dir_all(&paths.archives_dir).expect("mkdir");
        for name in ["April-2023.md", "January-2024.md", "November-2023.md"] {
            fs::write(paths.archive_file(name), "# x\n").expect("seed");
        }
        fs::write(&paths.document_file, section("2024-01-31", "a/a")).expect("seed doc");

        run_day(&paths, ctx(2024, 2, 1), &items(&["f/f"]));
        let document = fs::read_to_string(&paths.document_file).expect("document");
        let expected_index = "## Monthly Archives\n\n\
            - [January 2024](archives/January-2024.md)\n\
            - [November 2023](archives/November-2023.md)\n\
            - [April 2023](archives/April-2023.md)\n\n";
        assert!(document.starts_with(expected_index));
        assert_eq!(document.matches("## Monthly Archives").count(), 1);
        assert!(document.ends_with(&section("2024-02-01", "f/f")));
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let seed = section("2024-01-31", "a/a");
        fs::write(&paths.document_file, &seed).expect("seed");

        let ctx = ctx(2024, 2, 1);
        let list = items(&["b/b"]);
        let out = execute(
            &paths,
            &CyclePlan {
                rotate: Some(scheduled_rotation(&ctx)),
                merge: Some((ctx, &list)),
                renderer: &MarkdownRenderer,
                new_document_title: None,
                dry_run: true,
            },
        )
        .expect("cycle");
        assert!(out.document_changed);
        assert!(!out.document_written);
        assert_eq!(out.archives_written, 0);
        assert_eq!(fs::read_to_string(&paths.document_file).expect("doc"), seed);
        assert!(!paths.archives_dir.exists());
        assert!(!paths.audit_log().exists());
    }

    #[test]
    fn new_document_gets_configured_title() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let ctx = ctx(2024, 3, 5);
        let list = items(&["a/a"]);
        execute(
            &paths,
            &CyclePlan {
                rotate: None,
                merge: Some((ctx, &list)),
                renderer: &MarkdownRenderer,
                new_document_title: Some("GitHub Trending"),
                dry_run: false,
            },
        )
        .expect("cycle");
        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert_eq!(
            document,
            format!("# GitHub Trending\n\n{}", section("2024-03-05", "a/a"))
        );
    }

    fn assert_only_current_month(paths: &TrendPaths, ctx: &RunContext) {
        let document = fs::read_to_string(&paths.document_file).expect("document");
        let stale = parse_sections(&document)
            .into_iter()
            .filter(|s| !ctx.current_month().contains(s.date))
            .map(|s| s.date.to_string())
            .collect::<Vec<_>>();
        assert!(stale.is_empty(), "{} left behind {stale:?}", ctx.run_date);
    }

    #[test]
    fn missed_first_of_month_is_caught_up_by_next_run() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());

        for (day, name) in [((2024, 1, 30), "a/a"), ((2024, 1, 31), "b/b")] {
            let ctx = ctx(day.0, day.1, day.2);
            run_day(&paths, ctx, &items(&[name]));
        }

        // No run lands on 2024-02-01.
        let feb2 = ctx(2024, 2, 2);
        let out = run_day(&paths, feb2, &items(&["c/c"]));
        let RotationStatus::Rotated(archives) = &out.rotation else {
            panic!("expected catch-up rotation, got {:?}", out.rotation);
        };
        assert_eq!(archives.len(), 1);
        assert_eq!(archives[0].month, YearMonth::new(2024, 1).expect("month"));
        assert_only_current_month(&paths, &feb2);

        let jan = fs::read_to_string(paths.archive_file("January-2024.md")).expect("jan");
        assert_eq!(
            jan,
            format!(
                "# January 2024\n\n{}{}",
                section("2024-01-30", "a/a"),
                section("2024-01-31", "b/b")
            )
        );

        for day in [1, 2] {
            let ctx = ctx(2024, 3, day);
            run_day(&paths, ctx, &items(&["d/d"]));
            assert_only_current_month(&paths, &ctx);
        }
        let feb = fs::read_to_string(paths.archive_file("February-2024.md")).expect("feb");
        assert_eq!(feb, format!("# February 2024\n\n{}", section("2024-02-02", "c/c")));

        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert!(document.starts_with(
            "## Monthly Archives\n\n\
             - [February 2024](archives/February-2024.md)\n\
             - [January 2024](archives/January-2024.md)\n\n"
        ));
    }

    #[test]
    fn several_stale_months_rotate_in_one_run() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let nov = section("2023-11-20", "n/n");
        let dec = section("2023-12-24", "d/d");
        fs::write(&paths.document_file, format!("{nov}{dec}")).expect("seed");

        let jan10 = ctx(2024, 1, 10);
        let out = run_day(&paths, jan10, &[]);
        let RotationStatus::Rotated(archives) = &out.rotation else {
            panic!("expected rotation, got {:?}", out.rotation);
        };
        let months = archives.iter().map(|a| a.month.to_string()).collect::<Vec<_>>();
        assert_eq!(months, vec!["2023-11", "2023-12"]);
        assert_eq!(out.archives_written, 2);
        assert_only_current_month(&paths, &jan10);
        assert!(paths.archive_file("November-2023.md").exists());
        assert!(paths.archive_file("December-2023.md").exists());
    }

    #[test]
    fn ordinary_day_without_stale_sections_does_not_rotate() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        fs::write(&paths.document_file, section("2024-05-03", "a/a")).expect("seed");

        let out = run_day(&paths, ctx(2024, 5, 4), &items(&["b/b"]));
        assert!(matches!(out.rotation, RotationStatus::NotScheduled));
        assert!(!paths.archives_dir.exists());
    }

    #[test]
    fn leap_day_rotates_with_february() {
        let tmp = tempdir().expect("tempdir");
        let paths = paths_for_home(tmp.path());
        let feb28 = section("2024-02-28", "a/a");
        let feb29 = section("2024-02-29", "b/b");
        fs::write(&paths.document_file, format!("{feb28}{feb29}")).expect("seed");

        let mar1 = ctx(2024, 3, 1);
        run_day(&paths, mar1, &items(&["m/m"]));
        let archive = fs::read_to_string(paths.archive_file("February-2024.md")).expect("feb");
        assert_eq!(archive, format!("# February 2024\n\n{feb28}{feb29}"));
        let document = fs::read_to_string(&paths.document_file).expect("document");
        assert_eq!(
            document,
            format!(
                "## Monthly Archives\n\n- [February 2024](archives/February-2024.md)\n\n{}",
                section("2024-03-01", "m/m")
            )
        );
        assert_only_current_month(&paths, &mar1);
    }
}
