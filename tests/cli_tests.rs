#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use study_planner::persistence::{load_plan_from_json, load_plan_csv};
use tempfile::NamedTempFile;

const SAMPLE_TREE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_tree.json");
const TRACTATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tractates.json");

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("STUDY_PLANNER_TREE", SAMPLE_TREE)
        .env("STUDY_PLANNER_TRACTATES", TRACTATES)
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_loads_fixtures_from_environment() {
    run_cli("quit\n")
        .success()
        .stdout(str_contains("Loaded 3 top-level entries."))
        .stdout(str_contains("Loaded 3 tractate names."));
}

#[test]
fn cli_plans_at_fixed_pace() {
    run_cli("select תנ\"ך/תורה/בראשית\nmode chapters\nstart 2025-01-05\npace 5\nplan\nquit\n")
        .success()
        .stdout(str_contains("Selected: תנ\"ך / תורה / בראשית"))
        .stdout(str_contains("סדר לימוד: בראשית (50 units, 10 days)"))
        .stdout(str_contains("[בראשית.א-ה]"))
        .stdout(str_contains("Finish: 2025-01-15"));
}

#[test]
fn cli_rejects_non_positive_pace() {
    run_cli("pace 0\npace -2\nquit\n")
        .success()
        .stdout(str_contains("Pace must be a positive whole number"));
}

#[test]
fn cli_reports_unknown_paths_and_commands() {
    run_cli("select תנ\"ך/נביאים\nfrobnicate\nquit\n")
        .success()
        .stdout(str_contains("Path not found: תנ\"ך/נביאים"))
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_reports_impossible_calendar() {
    run_cli(
        "select תנ\"ך/תורה/שמות\nmode chapters\nstart 2025-01-05\npace 3\nexclude Sun Mon Tue Wed Thu Fri Sat\nplan\nquit\n",
    )
    .success()
    .stdout(str_contains("Excluded weekdays updated."))
    .stdout(str_contains(
        "Error: no study days are possible with the current exclusions",
    ));
}

#[test]
fn cli_previews_length_and_pace() {
    run_cli(
        "select משנה/זרעים/ברכות\nmodes\nmode units\nstart 2025-01-05\nend 2025-01-10\nlength\nquit\n",
    )
    .success()
    .stdout(str_contains("units (משניות)"))
    .stdout(str_contains("Total: 57 משניות"))
    .stdout(str_contains("Daily pace: 9.50"));
}

#[test]
fn cli_shows_hebrew_date_and_holiday() {
    run_cli("hebrew 2024-10-03\nquit\n")
        .success()
        .stdout(str_contains("א תשרי ה׳תשפ״ה (ראש השנה)"));
}

#[test]
fn cli_save_requires_a_plan() {
    run_cli("save json\nquit\n")
        .success()
        .stdout(str_contains("No plan yet. Use: plan"));
}

#[test]
fn cli_saves_json_and_csv() {
    let json = NamedTempFile::new().expect("create temp file");
    let csv = NamedTempFile::new().expect("create temp file");
    let json_path = json.path().to_string_lossy().to_string();
    let csv_path = csv.path().to_string_lossy().to_string();
    let script = format!(
        "select תלמוד בבלי/סדר מועד/עירובין\nmode pages\nstart 2025-01-05\npace 2\nplan\nsave json {json_path}\nsave csv {csv_path}\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("[Eruvin.2a-3b]"))
        .stdout(str_contains(format!("Saved: {json_path}")))
        .stdout(str_contains(format!("Saved: {csv_path}")));

    let snapshot = load_plan_from_json(json.path()).expect("saved plan should load");
    assert_eq!(snapshot.plan.total_units, 104);
    assert_eq!(snapshot.plan.days.len(), 52);
    assert_eq!(
        snapshot.metadata.selection,
        vec!["תלמוד בבלי / סדר מועד / עירובין"]
    );
    let rows = load_plan_csv(csv.path()).expect("saved csv should load");
    assert_eq!(rows.len(), 52);
}
