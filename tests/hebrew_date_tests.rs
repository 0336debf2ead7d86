use chrono::{NaiveDate, Weekday};
use study_planner::hebrew_date::{
    ADAR_II, AV, HebrewDate, HebrewDateError, IYAR, KISLEV, NISAN, TEVET, TISHREI, days_in_year,
    format_hebrew_year, is_leap_year, months_in_year,
};
use study_planner::holidays::{
    HolidayCategory, HolidayConfig, HolidayOracle, independence_day, is_holiday, jerusalem_day,
    remembrance_day,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn known_conversions() {
    let rosh_hashanah = HebrewDate::from_gregorian(d(2023, 9, 16));
    assert_eq!(
        (rosh_hashanah.year(), rosh_hashanah.month(), rosh_hashanah.day()),
        (5784, TISHREI, 1)
    );

    let millennium = HebrewDate::from_gregorian(d(2000, 1, 1));
    assert_eq!((millennium.year(), millennium.month(), millennium.day()), (5760, TEVET, 23));

    let last_of_kislev = HebrewDate::from_gregorian(d(2024, 12, 31));
    assert_eq!((last_of_kislev.month(), last_of_kislev.day()), (KISLEV, 30));
    let first_of_tevet = HebrewDate::from_gregorian(d(2025, 1, 1));
    assert_eq!((first_of_tevet.month(), first_of_tevet.day()), (TEVET, 1));
}

#[test]
fn to_gregorian_inverts_from_gregorian() {
    let date = HebrewDate::new(5785, TISHREI, 1).unwrap();
    assert_eq!(date.to_gregorian().unwrap(), d(2024, 10, 3));
    assert_eq!(date.weekday(), Weekday::Thu);

    let purim = HebrewDate::new(5784, ADAR_II, 14).unwrap();
    assert_eq!(purim.to_gregorian().unwrap(), d(2024, 3, 24));

    let mut day = d(2023, 1, 1);
    while day < d(2026, 1, 1) {
        assert_eq!(HebrewDate::from_gregorian(day).to_gregorian().unwrap(), day);
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn leap_years_and_lengths() {
    assert!(is_leap_year(5784));
    assert!(!is_leap_year(5785));
    assert!(is_leap_year(5787));
    assert_eq!(months_in_year(5784), 13);
    assert_eq!(months_in_year(5785), 12);

    assert_eq!(days_in_year(5783), 355);
    assert_eq!(days_in_year(5784), 383);
    assert_eq!(days_in_year(5785), 355);
    assert_eq!(days_in_year(5786), 354);
    assert_eq!(days_in_year(5787), 385);
}

#[test]
fn invalid_dates_are_rejected() {
    assert_eq!(
        HebrewDate::new(5785, ADAR_II, 1),
        Err(HebrewDateError::InvalidMonth { year: 5785, month: ADAR_II })
    );
    assert_eq!(
        HebrewDate::new(5785, IYAR, 30),
        Err(HebrewDateError::InvalidDay { year: 5785, month: IYAR, day: 30 })
    );
    assert_eq!(HebrewDate::new(0, NISAN, 1), Err(HebrewDateError::OutOfRange));
}

#[test]
fn month_names_follow_the_leap_cycle() {
    assert_eq!(HebrewDate::new(5784, 12, 1).unwrap().month_name(), "אדר א'");
    assert_eq!(HebrewDate::new(5784, ADAR_II, 1).unwrap().month_name(), "אדר ב'");
    assert_eq!(HebrewDate::new(5785, 12, 1).unwrap().month_name(), "אדר");
}

#[test]
fn year_formatting() {
    assert_eq!(format_hebrew_year(5785), "ה׳תשפ״ה");
    assert_eq!(format_hebrew_year(5784), "ה׳תשפ״ד");
    // A single remaining letter drops the thousands
    assert_eq!(format_hebrew_year(5001), "א");
}

#[test]
fn display_renders_day_month_year() {
    let date = HebrewDate::from_gregorian(d(2024, 5, 14));
    assert_eq!(date.to_string(), "ו אייר ה׳תשפ״ד");
}

#[test]
fn fixed_holidays_in_israel() {
    // Rosh Hashanah 5785, Yom Kippur, Pesach, Shavuot
    assert!(is_holiday(d(2024, 10, 3)));
    assert!(is_holiday(d(2024, 10, 4)));
    assert!(is_holiday(d(2024, 10, 12)));
    assert!(is_holiday(d(2024, 4, 23)));
    assert!(is_holiday(d(2025, 6, 2)));
    // Second day of Shavuot is only kept abroad
    assert!(!is_holiday(d(2025, 6, 3)));
    // Chanukah 5785 starts 2024-12-26 and crosses into Tevet
    assert!(is_holiday(d(2024, 12, 26)));
    assert!(is_holiday(d(2025, 1, 2)));
    assert!(!is_holiday(d(2025, 1, 3)));
    // Purim falls in Adar II of a leap year
    assert!(is_holiday(d(2024, 3, 24)));
    assert!(is_holiday(d(2025, 3, 14)));
    // Tisha B'Av
    assert!(is_holiday(d(2024, 8, 13)));
    assert!(is_holiday(d(2025, 8, 3)));
    // An ordinary day
    assert!(!is_holiday(d(2025, 1, 6)));
}

#[test]
fn diaspora_adds_second_days() {
    let oracle = HolidayOracle::new(HolidayConfig {
        region: study_planner::holidays::Region::Diaspora,
        ..HolidayConfig::default()
    });
    assert!(oracle.is_holiday(d(2025, 6, 3)));
    assert_eq!(oracle.holiday_on(d(2025, 4, 20)).unwrap().name, "שביעי של פסח");
}

#[test]
fn categories_can_be_switched_off() {
    let oracle = HolidayOracle::new(HolidayConfig {
        include_minor: false,
        include_national: false,
        ..HolidayConfig::default()
    });
    assert!(!oracle.is_holiday(d(2024, 12, 26)));
    assert!(!oracle.is_holiday(d(2024, 5, 14)));
    assert!(oracle.is_holiday(d(2024, 10, 3)));
    assert!(
        oracle
            .observances_in_year(5785)
            .iter()
            .all(|obs| obs.category != HolidayCategory::Minor
                && obs.category != HolidayCategory::National)
    );
}

#[test]
fn observances_are_chronological() {
    let table = HolidayOracle::default().observances_in_year(5785);
    assert!(table.windows(2).all(|pair| pair[0].date <= pair[1].date));
    assert_eq!(table.first().unwrap().date, d(2024, 10, 3));
}

#[test]
fn independence_day_shifts() {
    // 5 Iyar 5784 is a Monday, so it moves to Tuesday
    let shifted = independence_day(5784).unwrap();
    assert_eq!(shifted.to_gregorian().unwrap(), d(2024, 5, 14));
    assert_eq!(remembrance_day(5784).unwrap().to_gregorian().unwrap(), d(2024, 5, 13));

    // 5 Iyar 5785 is a Saturday, brought forward to Thursday
    assert_eq!(independence_day(5785).unwrap().to_gregorian().unwrap(), d(2025, 5, 1));
    assert_eq!(remembrance_day(5785).unwrap().to_gregorian().unwrap(), d(2025, 4, 30));

    assert_eq!(independence_day(5700), None);
}

#[test]
fn jerusalem_day_avoids_friday() {
    assert_eq!(jerusalem_day(5783).unwrap().to_gregorian().unwrap(), d(2023, 5, 18));
    assert_eq!(jerusalem_day(5784).unwrap().to_gregorian().unwrap(), d(2024, 6, 5));
    assert_eq!(jerusalem_day(5786).unwrap().to_gregorian().unwrap(), d(2026, 5, 14));
    assert_eq!(jerusalem_day(5720), None);
}

#[test]
fn tisha_bav_is_a_fast() {
    let obs = HolidayOracle::default().holiday_on(d(2024, 8, 13)).unwrap();
    assert_eq!(obs.category, HolidayCategory::Fast);
    let av = HebrewDate::from_gregorian(d(2024, 8, 13));
    assert_eq!((av.month(), av.day()), (AV, 9));
}
