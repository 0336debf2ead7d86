use crate::holidays::{HolidayConfig, HolidayOracle, Observance};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Upper bound on calendar days walked when no end date is given (50 years).
pub const MAX_WALK_DAYS: i64 = 365 * 50;

/// Weekday exclusions plus optional holiday skipping.
///
/// Weekdays are `chrono::Weekday`, whose `num_days_from_monday` numbering
/// (0 = Monday .. 6 = Sunday) is the internal convention throughout the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyCalendar {
    excluded_weekdays: HashSet<Weekday>,
    skip_holidays: bool,
    holidays: HolidayOracle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyCalendarConfig {
    #[serde(default)]
    excluded_weekdays: Vec<Weekday>,
    #[serde(default)]
    skip_holidays: bool,
    #[serde(default)]
    holidays: HolidayConfig,
}

impl Default for StudyCalendar {
    fn default() -> Self {
        Self::new([Weekday::Sat], false)
    }
}

impl StudyCalendar {
    pub const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new<I>(excluded_weekdays: I, skip_holidays: bool) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        Self {
            excluded_weekdays: excluded_weekdays.into_iter().collect(),
            skip_holidays,
            holidays: HolidayOracle::default(),
        }
    }

    /// Calendar where every day is a study day.
    pub fn every_day() -> Self {
        Self::new(std::iter::empty(), false)
    }

    pub fn with_holidays(mut self, config: HolidayConfig) -> Self {
        self.holidays = HolidayOracle::new(config);
        self
    }

    pub fn from_config(config: &StudyCalendarConfig) -> Self {
        Self {
            excluded_weekdays: config.excluded_weekdays.iter().copied().collect(),
            skip_holidays: config.skip_holidays,
            holidays: HolidayOracle::new(config.holidays.clone()),
        }
    }

    pub fn to_config(&self) -> StudyCalendarConfig {
        StudyCalendarConfig::from(self)
    }

    pub fn excluded_weekdays(&self) -> &HashSet<Weekday> {
        &self.excluded_weekdays
    }

    pub fn skip_holidays(&self) -> bool {
        self.skip_holidays
    }

    pub fn holidays(&self) -> &HolidayOracle {
        &self.holidays
    }

    pub fn set_skip_holidays(&mut self, skip: bool) {
        self.skip_holidays = skip;
    }

    pub fn exclude_weekday(&mut self, weekday: Weekday) {
        self.excluded_weekdays.insert(weekday);
    }

    pub fn set_excluded_weekdays<I>(&mut self, weekdays: I)
    where
        I: IntoIterator<Item = Weekday>,
    {
        self.excluded_weekdays = weekdays.into_iter().collect();
    }

    /// False when every weekday is excluded, i.e. no date can ever be studied.
    pub fn has_study_weekdays(&self) -> bool {
        Self::ALL_WEEKDAYS
            .iter()
            .any(|day| !self.excluded_weekdays.contains(day))
    }

    /// Check if a date is a study day
    pub fn is_study_day(&self, date: NaiveDate) -> bool {
        if self.excluded_weekdays.contains(&date.weekday()) {
            return false;
        }
        !(self.skip_holidays && self.holidays.is_holiday(date))
    }

    /// The holiday that blocks `date`, if holidays are being skipped.
    pub fn blocking_holiday(&self, date: NaiveDate) -> Option<Observance> {
        if !self.skip_holidays {
            return None;
        }
        self.holidays.holiday_on(date)
    }

    /// Find the first study day on or after `from`, within the walk bound
    pub fn next_study_day(&self, from: NaiveDate) -> Option<NaiveDate> {
        if !self.has_study_weekdays() {
            return None;
        }
        let mut current = from;
        for _ in 0..MAX_WALK_DAYS {
            if self.is_study_day(current) {
                return Some(current);
            }
            current = current + Duration::days(1);
        }
        None
    }

    /// Get all study days in a date range (inclusive)
    pub fn study_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;

        while current <= end {
            if self.is_study_day(current) {
                days.push(current);
            }
            current = current + Duration::days(1);
        }
        days
    }

    /// Count study days in a date range (inclusive)
    pub fn count_study_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;

        while current <= end {
            if self.is_study_day(current) {
                count += 1;
            }
            current = current + Duration::days(1);
        }
        count
    }

    /// Study days from `start` onwards, stopping after `MAX_WALK_DAYS` calendar days.
    pub fn study_days_from(&self, start: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..MAX_WALK_DAYS)
            .map(move |offset| start + Duration::days(offset))
            .filter(move |date| self.is_study_day(*date))
    }
}

/// Count dates in `[start, end]` whose weekday is not excluded and, when
/// `skip_holidays` is set, which are not holidays under the default table.
pub fn count_study_days(
    start: NaiveDate,
    end: NaiveDate,
    excluded_weekdays: &HashSet<Weekday>,
    skip_holidays: bool,
) -> i64 {
    StudyCalendar::new(excluded_weekdays.iter().copied(), skip_holidays)
        .count_study_days(start, end)
}

/// Parse a weekday from its Hebrew name (ראשון..שבת) or English name/abbreviation.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let name = name.trim();
    let hebrew = match name {
        "ראשון" => Some(Weekday::Sun),
        "שני" => Some(Weekday::Mon),
        "שלישי" => Some(Weekday::Tue),
        "רביעי" => Some(Weekday::Wed),
        "חמישי" => Some(Weekday::Thu),
        "שישי" => Some(Weekday::Fri),
        "שבת" => Some(Weekday::Sat),
        _ => None,
    };
    hebrew.or_else(|| Weekday::from_str(name).ok())
}

impl StudyCalendarConfig {
    pub fn new<I>(excluded_weekdays: I, skip_holidays: bool, holidays: HolidayConfig) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut excluded: Vec<Weekday> = excluded_weekdays.into_iter().collect();
        excluded.sort_by_key(|wd| wd.num_days_from_monday());
        excluded.dedup();

        Self {
            excluded_weekdays: excluded,
            skip_holidays,
            holidays,
        }
    }

    pub fn excluded_weekdays(&self) -> &[Weekday] {
        &self.excluded_weekdays
    }

    pub fn skip_holidays(&self) -> bool {
        self.skip_holidays
    }

    pub fn holidays(&self) -> &HolidayConfig {
        &self.holidays
    }
}

impl Default for StudyCalendarConfig {
    fn default() -> Self {
        StudyCalendarConfig::from(&StudyCalendar::default())
    }
}

impl From<&StudyCalendar> for StudyCalendarConfig {
    fn from(calendar: &StudyCalendar) -> Self {
        StudyCalendarConfig::new(
            calendar.excluded_weekdays.iter().copied(),
            calendar.skip_holidays,
            calendar.holidays.config().clone(),
        )
    }
}
