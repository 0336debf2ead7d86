use crate::hebrew_date::{
    ADAR, ADAR_II, AV, HebrewDate, IYAR, KISLEV, NISAN, SIVAN, TISHREI, is_leap_year,
};
use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// First Hebrew year with Independence Day and Remembrance Day (1948).
const FIRST_INDEPENDENCE_YEAR: i32 = 5708;
/// First Hebrew year with Jerusalem Day (1968).
const FIRST_JERUSALEM_DAY_YEAR: i32 = 5728;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCategory {
    YomTov,
    CholHamoed,
    Minor,
    Fast,
    National,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    Israel,
    Diaspora,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayConfig {
    pub region: Region,
    pub include_chol_hamoed: bool,
    pub include_minor: bool,
    pub include_fasts: bool,
    pub include_national: bool,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self {
            region: Region::Israel,
            include_chol_hamoed: true,
            include_minor: true,
            include_fasts: true,
            include_national: true,
        }
    }
}

impl HolidayConfig {
    pub fn includes(&self, category: HolidayCategory) -> bool {
        match category {
            HolidayCategory::YomTov => true,
            HolidayCategory::CholHamoed => self.include_chol_hamoed,
            HolidayCategory::Minor => self.include_minor,
            HolidayCategory::Fast => self.include_fasts,
            HolidayCategory::National => self.include_national,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observance {
    pub name: &'static str,
    pub category: HolidayCategory,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayOracle {
    config: HolidayConfig,
}

impl HolidayOracle {
    pub fn new(config: HolidayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HolidayConfig {
        &self.config
    }

    /// All observances of a Hebrew year (Tishrei to Elul) enabled by the config,
    /// in chronological order.
    pub fn observances_in_year(&self, year: i32) -> Vec<Observance> {
        let mut table = fixed_observances(year, self.config.region);
        table.extend(national_observances(year));
        table.retain(|obs| self.config.includes(obs.category));
        table.sort_by_key(|obs| obs.date);
        table
    }

    pub fn holiday_on(&self, date: NaiveDate) -> Option<Observance> {
        let year = HebrewDate::from_gregorian(date).year();
        self.observances_in_year(year)
            .into_iter()
            .find(|obs| obs.date == date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_on(date).is_some()
    }
}

/// Holiday check with the default configuration.
pub fn is_holiday(date: NaiveDate) -> bool {
    HolidayOracle::default().is_holiday(date)
}

/// Independence Day: 5 Iyar, brought forward from Friday/Saturday to Thursday
/// and pushed from Monday to Tuesday.
pub fn independence_day(year: i32) -> Option<HebrewDate> {
    if year < FIRST_INDEPENDENCE_YEAR {
        return None;
    }
    let anchor = HebrewDate::new(year, IYAR, 5).ok()?;
    let day = match anchor.weekday() {
        Weekday::Fri => 4,
        Weekday::Sat => 3,
        Weekday::Mon => 6,
        _ => 5,
    };
    HebrewDate::new(year, IYAR, day).ok()
}

/// Remembrance Day: the day before Independence Day, after its shift.
pub fn remembrance_day(year: i32) -> Option<HebrewDate> {
    let independence = independence_day(year)?;
    HebrewDate::new(year, IYAR, independence.day() - 1).ok()
}

/// Jerusalem Day: 28 Iyar, moved from Friday to Thursday and from Saturday to
/// Sunday.
pub fn jerusalem_day(year: i32) -> Option<HebrewDate> {
    if year < FIRST_JERUSALEM_DAY_YEAR {
        return None;
    }
    let anchor = HebrewDate::new(year, IYAR, 28).ok()?;
    let day = match anchor.weekday() {
        Weekday::Fri => 27,
        Weekday::Sat => 29,
        _ => 28,
    };
    HebrewDate::new(year, IYAR, day).ok()
}

fn gregorian(date: HebrewDate) -> Option<NaiveDate> {
    date.to_gregorian().ok()
}

fn on(year: i32, month: u8, day: u8) -> Option<NaiveDate> {
    HebrewDate::new(year, month, day).ok().and_then(gregorian)
}

fn push_day(
    table: &mut Vec<Observance>,
    name: &'static str,
    category: HolidayCategory,
    date: Option<NaiveDate>,
) {
    if let Some(date) = date {
        table.push(Observance {
            name,
            category,
            date,
        });
    }
}

fn push_days(
    table: &mut Vec<Observance>,
    name: &'static str,
    category: HolidayCategory,
    year: i32,
    month: u8,
    days: std::ops::RangeInclusive<u8>,
) {
    for day in days {
        push_day(table, name, category, on(year, month, day));
    }
}

fn fixed_observances(year: i32, region: Region) -> Vec<Observance> {
    use HolidayCategory::*;

    let diaspora = region == Region::Diaspora;
    let mut table = Vec::new();

    push_days(&mut table, "ראש השנה", YomTov, year, TISHREI, 1..=2);
    push_day(&mut table, "יום כיפור", YomTov, on(year, TISHREI, 10));
    if diaspora {
        push_days(&mut table, "סוכות", YomTov, year, TISHREI, 15..=16);
        push_days(&mut table, "חול המועד סוכות", CholHamoed, year, TISHREI, 17..=21);
        push_day(&mut table, "שמיני עצרת", YomTov, on(year, TISHREI, 22));
        push_day(&mut table, "שמחת תורה", YomTov, on(year, TISHREI, 23));
    } else {
        push_day(&mut table, "סוכות", YomTov, on(year, TISHREI, 15));
        push_days(&mut table, "חול המועד סוכות", CholHamoed, year, TISHREI, 16..=21);
        push_day(&mut table, "שמיני עצרת", YomTov, on(year, TISHREI, 22));
    }

    // Chanukah runs eight days from 25 Kislev and may cross into Tevet when
    // Kislev is short.
    if let Some(first) = on(year, KISLEV, 25) {
        for offset in 0..8 {
            push_day(&mut table, "חנוכה", Minor, first.checked_add_days(Days::new(offset)));
        }
    }

    let purim_month = if is_leap_year(year) { ADAR_II } else { ADAR };
    push_day(&mut table, "פורים", Minor, on(year, purim_month, 14));
    push_day(&mut table, "שושן פורים", Minor, on(year, purim_month, 15));

    if diaspora {
        push_days(&mut table, "פסח", YomTov, year, NISAN, 15..=16);
        push_days(&mut table, "חול המועד פסח", CholHamoed, year, NISAN, 17..=20);
        push_days(&mut table, "שביעי של פסח", YomTov, year, NISAN, 21..=22);
        push_days(&mut table, "שבועות", YomTov, year, SIVAN, 6..=7);
    } else {
        push_day(&mut table, "פסח", YomTov, on(year, NISAN, 15));
        push_days(&mut table, "חול המועד פסח", CholHamoed, year, NISAN, 16..=20);
        push_day(&mut table, "שביעי של פסח", YomTov, on(year, NISAN, 21));
        push_day(&mut table, "שבועות", YomTov, on(year, SIVAN, 6));
    }

    // The fast is postponed to Sunday when 9 Av falls on Shabbat.
    let tisha_bav = HebrewDate::new(year, AV, 9).ok().map(|date| {
        if date.weekday() == Weekday::Sat {
            10
        } else {
            9
        }
    });
    if let Some(day) = tisha_bav {
        push_day(&mut table, "תשעה באב", Fast, on(year, AV, day));
    }

    table
}

fn national_observances(year: i32) -> Vec<Observance> {
    use HolidayCategory::National;

    let mut table = Vec::new();
    push_day(
        &mut table,
        "יום הזיכרון",
        National,
        remembrance_day(year).and_then(gregorian),
    );
    push_day(
        &mut table,
        "יום העצמאות",
        National,
        independence_day(year).and_then(gregorian),
    );
    push_day(
        &mut table,
        "יום ירושלים",
        National,
        jerusalem_day(year).and_then(gregorian),
    );
    table
}
