use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn section(day: &str, name: &str) -> String {
    format!("## Trending On {day}\n\n- [{name}](https://github.com/{name})\n\n")
}

fn write_items(path: &Path, names: &[&str]) {
    let entries = names
        .iter()
        .map(|n| format!("{{ name: \"{n}\", url: \"https://github.com/{n}\" }}"))
        .collect::<Vec<_>>();
    fs::write(path, format!("[{}]\n", entries.join(", "))).expect("write items");
}

fn trendlog(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("trendlog");
    cmd.current_dir(home)
        .env("TRENDLOG_HOME", home)
        .env_remove("TRENDLOG_DOCUMENT")
        .env_remove("TRENDLOG_ARCHIVES_DIR")
        .env_remove("TRENDLOG_CONFIG_PATH");
    cmd
}

#[test]
fn run_creates_document_on_first_day() {
    let tmp = tempdir().expect("tempdir");
    let items = tmp.path().join("items.json5");
    write_items(&items, &["x/y"]);

    trendlog(tmp.path())
        .args(["run", "--date", "2024-03-05", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("run: ok"))
        .stdout(predicates::str::contains("merge.items=1"));

    let document = fs::read_to_string(tmp.path().join("README.md")).expect("document");
    assert_eq!(document, section("2024-03-05", "x/y"));
    assert!(!tmp.path().join("archives").exists());
}

#[test]
fn run_on_first_of_month_archives_previous_month() {
    let tmp = tempdir().expect("tempdir");
    let jan30 = section("2024-01-30", "a/a");
    let jan31 = section("2024-01-31", "b/b");
    fs::write(tmp.path().join("README.md"), format!("{jan30}{jan31}")).expect("seed");
    let items = tmp.path().join("items.json5");
    write_items(&items, &[]);

    trendlog(tmp.path())
        .args(["run", "--date", "2024-02-01", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("rotation=rotated month=2024-01"));

    let archive =
        fs::read_to_string(tmp.path().join("archives/January-2024.md")).expect("archive");
    assert_eq!(archive, format!("# January 2024\n\n{jan30}{jan31}"));
    let document = fs::read_to_string(tmp.path().join("README.md")).expect("document");
    assert_eq!(
        document,
        "## Monthly Archives\n\n- [January 2024](archives/January-2024.md)\n\n"
    );
}

#[test]
fn same_day_rerun_replaces_section() {
    let tmp = tempdir().expect("tempdir");
    let kept = section("2024-03-04", "old/old");
    fs::write(tmp.path().join("README.md"), &kept).expect("seed");
    let items = tmp.path().join("items.json5");

    write_items(&items, &["first/run"]);
    trendlog(tmp.path())
        .args(["run", "--date", "2024-03-05", "--items"])
        .arg(&items)
        .assert()
        .success();

    write_items(&items, &["second/run"]);
    trendlog(tmp.path())
        .args(["run", "--date", "2024-03-05", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("merge.replaced=1"));

    let document = fs::read_to_string(tmp.path().join("README.md")).expect("document");
    assert_eq!(document, format!("{kept}{}", section("2024-03-05", "second/run")));
    assert!(!document.contains("first/run"));

    trendlog(tmp.path())
        .args(["run", "--date", "2024-03-05", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("document.written=false"));
}

#[test]
fn fetch_failure_leaves_files_untouched() {
    let tmp = tempdir().expect("tempdir");
    let seed = section("2024-01-31", "a/a");
    fs::write(tmp.path().join("README.md"), &seed).expect("seed");

    trendlog(tmp.path())
        .args(["run", "--date", "2024-02-01", "--items", "missing.json"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("error[E001_FETCH_FAILED]"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("README.md")).expect("document"),
        seed
    );
    assert!(!tmp.path().join("archives").exists());
}

#[test]
fn dry_run_reports_without_writing() {
    let tmp = tempdir().expect("tempdir");
    let items = tmp.path().join("items.json5");
    write_items(&items, &["x/y"]);

    trendlog(tmp.path())
        .args(["--json", "run", "--dry-run", "--date", "2024-03-05", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("\"command\": \"run\""))
        .stdout(predicates::str::contains("document.changed=true"));

    assert!(!tmp.path().join("README.md").exists());
}

#[test]
fn invalid_run_date_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    trendlog(tmp.path())
        .args(["run", "--date", "2024-02-30", "--items", "missing.json"])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("error[E005_INVALID_INPUT]"));
}

#[test]
fn run_after_missed_first_archives_previous_month() {
    let tmp = tempdir().expect("tempdir");
    let jan = section("2024-01-31", "a/a");
    fs::write(tmp.path().join("README.md"), &jan).expect("seed");
    let items = tmp.path().join("items.json5");
    write_items(&items, &["f/f"]);

    trendlog(tmp.path())
        .args(["run", "--date", "2024-02-01", "--items", "missing.json"])
        .assert()
        .code(1);

    trendlog(tmp.path())
        .args(["run", "--date", "2024-02-03", "--items"])
        .arg(&items)
        .assert()
        .success()
        .stdout(predicates::str::contains("rotation=rotated month=2024-01"));

    let archive =
        fs::read_to_string(tmp.path().join("archives/January-2024.md")).expect("archive");
    assert_eq!(archive, format!("# January 2024\n\n{jan}"));
    let document = fs::read_to_string(tmp.path().join("README.md")).expect("document");
    assert_eq!(
        document,
        format!(
            "## Monthly Archives\n\n- [January 2024](archives/January-2024.md)\n\n{}",
            section("2024-02-03", "f/f")
        )
    );
}
