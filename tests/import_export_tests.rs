use chrono::{NaiveDate, NaiveTime, Weekday};
use std::io::Write;
use study_planner::calendar::{StudyCalendar, StudyCalendarConfig};
use study_planner::holidays::{HolidayConfig, Region};
use study_planner::persistence::bookmark::BookmarkPage;
use study_planner::persistence::ics::render_ics;
use study_planner::persistence::{
    IcsOptions, PersistenceError, PlanSnapshot, load_calendar_config, load_plan_csv,
    load_plan_from_json, load_tractate_map, load_tree_from_json, save_bookmark_html,
    save_calendar_config, save_plan_to_csv, save_plan_to_ics, save_plan_to_json,
};
use study_planner::{
    CountingMode, PlanMetadata, PlanRequest, ReferenceBuilder, StudyPlan, StudyPlanner,
};
use tempfile::NamedTempFile;

const SAMPLE_TREE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/sample_tree.json");
const TRACTATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/tractates.json");

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn selection() -> Vec<String> {
    vec!["משנה/זרעים/ברכות".to_string()]
}

/// Berakhot mishnayot at ten a day from Sunday 2025-01-05: six days.
fn build_sample_plan() -> StudyPlan {
    let tree = load_tree_from_json(SAMPLE_TREE).unwrap();
    let tractates = load_tractate_map(TRACTATES).unwrap();
    let calendar = StudyCalendar::every_day();
    let planner =
        StudyPlanner::new(&tree, &calendar).with_references(ReferenceBuilder::new(&tree, &tractates));
    planner
        .plan(&PlanRequest::fixed_pace(selection(), CountingMode::Units, d(2025, 1, 5), 10))
        .unwrap()
}

fn build_snapshot() -> PlanSnapshot {
    let plan = build_sample_plan();
    let metadata = PlanMetadata::for_plan(&plan, &selection(), "ברכות (חלקים) בשבוע");
    PlanSnapshot::new(metadata, plan)
}

#[test]
fn sample_plan_shape() {
    let plan = build_sample_plan();
    assert_eq!(plan.days.len(), 6);
    assert_eq!(plan.total_units, 57);
    assert_eq!(plan.finish, d(2025, 1, 10));
    assert_eq!(plan.days[0].references, vec!["משנה_ברכות.א.1-ב.5"]);
}

#[test]
fn json_round_trip_preserves_plan() {
    let snapshot = build_snapshot();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_json(&snapshot, file.path()).unwrap();
    let loaded = load_plan_from_json(file.path()).unwrap();

    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.metadata.study_days, 6);
    assert_eq!(loaded.metadata.mode, CountingMode::Units);
}

#[test]
fn inconsistent_snapshot_is_rejected() {
    let mut snapshot = build_snapshot();
    snapshot.plan.total_units = 99;
    let file = NamedTempFile::new().unwrap();
    let err = save_plan_to_json(&snapshot, file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));

    // Written behind the validator's back, then refused on load
    let mut snapshot = build_snapshot();
    snapshot.plan.days.swap(0, 1);
    std::fs::write(file.path(), serde_json::to_string(&snapshot).unwrap()).unwrap();
    let err = load_plan_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn csv_round_trip_preserves_rows() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();

    save_plan_to_csv(&plan, file.path()).unwrap();
    let rows = load_plan_csv(file.path()).unwrap();

    assert_eq!(rows.len(), plan.days.len());
    for (row, day) in rows.iter().zip(&plan.days) {
        assert_eq!(row.date().unwrap(), day.date);
        assert_eq!(row.description, day.description);
        assert_eq!(row.unit_count, day.units.len());
        assert_eq!(row.reference_list(), day.references);
    }
    // 2025-01-05 is 5 Tevet 5785
    assert_eq!(rows[0].hebrew_date, "ה טבת ה׳תשפ״ה");
}

#[test]
fn csv_with_bad_date_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,hebrew_date,description,unit_count,references").unwrap();
    writeln!(file, "05/01/2025,,ברכות,3,").unwrap();
    file.flush().unwrap();

    let err = load_plan_csv(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn ics_has_one_all_day_event_per_day() {
    let plan = build_sample_plan();
    let ics = render_ics(&plan, &IcsOptions::default());

    assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(ics.ends_with("END:VCALENDAR\r\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 6);
    assert!(ics.contains("DTSTART;VALUE=DATE:20250105\r\n"));
    assert!(ics.contains("DTEND;VALUE=DATE:20250106\r\n"));
    assert!(!ics.contains("BEGIN:VALARM"));
    assert!(ics.split("\r\n").all(|line| line.len() <= 75));

    let unfolded = ics.replace("\r\n ", "");
    assert!(unfolded.contains("https://www.sefaria.org/משנה_ברכות.א.1-ב.5"));
}

#[test]
fn ics_alarm_and_links_are_optional() {
    let plan = build_sample_plan();
    let options = IcsOptions {
        include_links: false,
        ..IcsOptions::default()
    }
    .with_alarm(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
    let ics = render_ics(&plan, &options);

    assert_eq!(ics.matches("BEGIN:VALARM").count(), 6);
    assert!(ics.contains("TRIGGER:PT480M\r\n"));
    assert!(!ics.replace("\r\n ", "").contains("sefaria"));

    let file = NamedTempFile::new().unwrap();
    save_plan_to_ics(&plan, file.path(), &options).unwrap();
    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), ics);
}

#[test]
fn bookmark_covers_the_month_from_sunday() {
    let plan = build_sample_plan();
    let page = BookmarkPage::from_plan(&plan);

    assert_eq!(page.months.len(), 1);
    let month = &page.months[0];
    assert_eq!(month.weeks.len(), 5);
    assert_eq!(month.weeks[0][0].date, d(2024, 12, 29));
    assert!(!month.weeks[0][0].in_month);
    assert!(month.weeks.iter().all(|week| week.len() == 7));

    let studied = &month.weeks[1][0];
    assert_eq!(studied.date, d(2025, 1, 5));
    assert_eq!(studied.weekday, "ראשון");
    assert_eq!(studied.study_portion.as_deref(), Some(plan.days[0].description.as_str()));

    let file = NamedTempFile::new().unwrap();
    save_bookmark_html(&plan, file.path()).unwrap();
    let html = std::fs::read_to_string(file.path()).unwrap();
    assert!(html.contains("dir=\"rtl\""));
    assert!(html.contains("<h1>סדר לימוד: ברכות"));
    assert!(html.contains("<th>ראשון</th>"));
    assert_eq!(html.matches("<div class=\"portion\">").count(), plan.days.len());
}

#[test]
fn calendar_config_round_trip() {
    let config = StudyCalendarConfig::new(
        [Weekday::Fri, Weekday::Sat],
        true,
        HolidayConfig {
            region: Region::Diaspora,
            include_fasts: false,
            ..HolidayConfig::default()
        },
    );
    let file = NamedTempFile::new().unwrap();

    save_calendar_config(&config, file.path()).unwrap();
    let loaded = load_calendar_config(file.path()).unwrap();
    assert_eq!(loaded, config);
    assert!(!StudyCalendar::from_config(&loaded).is_study_day(d(2025, 1, 3)));
}

#[test]
fn tractate_map_values_must_be_strings() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"ברכות": 1}}"#).unwrap();
    file.flush().unwrap();

    let err = load_tractate_map(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn missing_tree_file_is_an_io_error() {
    let err = load_tree_from_json("/nonexistent/tree.json").unwrap_err();
    assert!(matches!(err, PersistenceError::Io(_)));
}
