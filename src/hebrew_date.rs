//! Civil Hebrew calendar arithmetic.
//!
//! Dates are converted through fixed day numbers (day 1 = 0001-01-01 in the
//! proleptic Gregorian calendar, which is what `chrono` calls
//! `num_days_from_ce`). Months are numbered from Nisan = 1 through Adar = 12,
//! with Adar II = 13 in leap years; the year begins at Tishrei (7).

use crate::numerals;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NISAN: u8 = 1;
pub const IYAR: u8 = 2;
pub const SIVAN: u8 = 3;
pub const AV: u8 = 5;
pub const TISHREI: u8 = 7;
pub const CHESHVAN: u8 = 8;
pub const KISLEV: u8 = 9;
pub const TEVET: u8 = 10;
pub const ADAR: u8 = 12;
pub const ADAR_II: u8 = 13;

/// Fixed day number of 1 Tishrei AM 1.
const EPOCH: i64 = -1_373_427;

const PARTS_PER_DAY: i64 = 25_920;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HebrewDateError {
    InvalidMonth { year: i32, month: u8 },
    InvalidDay { year: i32, month: u8, day: u8 },
    OutOfRange,
}

impl fmt::Display for HebrewDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HebrewDateError::InvalidMonth { year, month } => {
                write!(f, "year {year} has no month {month}")
            }
            HebrewDateError::InvalidDay { year, month, day } => {
                write!(f, "month {month} of year {year} has no day {day}")
            }
            HebrewDateError::OutOfRange => write!(f, "date is outside the supported range"),
        }
    }
}

impl std::error::Error for HebrewDateError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HebrewDate {
    year: i32,
    month: u8,
    day: u8,
}

impl HebrewDate {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, HebrewDateError> {
        if year < 1 {
            return Err(HebrewDateError::OutOfRange);
        }
        if month == 0 || month > months_in_year(year) {
            return Err(HebrewDateError::InvalidMonth { year, month });
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(HebrewDateError::InvalidDay { year, month, day });
        }
        Ok(Self { year, month, day })
    }

    pub fn from_gregorian(date: NaiveDate) -> Self {
        Self::from_fixed(i64::from(date.num_days_from_ce()))
    }

    pub fn to_gregorian(&self) -> Result<NaiveDate, HebrewDateError> {
        let fixed = self.to_fixed();
        i32::try_from(fixed)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or(HebrewDateError::OutOfRange)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.year, self.month)
    }

    /// Day of the week, computed from the fixed day number.
    pub fn weekday(&self) -> Weekday {
        // Fixed day 1 (0001-01-01) was a Monday.
        match (self.to_fixed() - 1).rem_euclid(7) {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    pub(crate) fn to_fixed(&self) -> i64 {
        let mut fixed = new_year(self.year) + i64::from(self.day) - 1;
        if self.month < TISHREI {
            for month in TISHREI..=months_in_year(self.year) {
                fixed += i64::from(days_in_month(self.year, month));
            }
            for month in NISAN..self.month {
                fixed += i64::from(days_in_month(self.year, month));
            }
        } else {
            for month in TISHREI..self.month {
                fixed += i64::from(days_in_month(self.year, month));
            }
        }
        fixed
    }

    pub(crate) fn from_fixed(fixed: i64) -> Self {
        // Mean year length is 35975351/98496 days.
        let approx = ((fixed - EPOCH) * 98_496).div_euclid(35_975_351) as i32 + 1;
        let mut year = approx - 1;
        while new_year(year + 1) <= fixed {
            year += 1;
        }

        let nisan_first = Self {
            year,
            month: NISAN,
            day: 1,
        }
        .to_fixed();
        let mut month = if fixed < nisan_first { TISHREI } else { NISAN };
        loop {
            let last = Self {
                year,
                month,
                day: days_in_month(year, month),
            }
            .to_fixed();
            if fixed <= last {
                break;
            }
            month += 1;
        }

        let first = Self {
            year,
            month,
            day: 1,
        }
        .to_fixed();
        Self {
            year,
            month,
            day: (fixed - first + 1) as u8,
        }
    }
}

impl fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            numerals::hebrew_numeral_or_decimal(u32::from(self.day), true),
            self.month_name(),
            format_hebrew_year(self.year)
        )
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

pub fn months_in_year(year: i32) -> u8 {
    if is_leap_year(year) { 13 } else { 12 }
}

pub fn days_in_year(year: i32) -> i64 {
    new_year(year + 1) - new_year(year)
}

fn has_long_cheshvan(year: i32) -> bool {
    days_in_year(year) % 10 == 5
}

fn has_short_kislev(year: i32) -> bool {
    days_in_year(year) % 10 == 3
}

pub fn days_in_month(year: i32, month: u8) -> u8 {
    let short = matches!(month, 2 | 4 | 6 | 10 | 13)
        || (month == ADAR && !is_leap_year(year))
        || (month == CHESHVAN && !has_long_cheshvan(year))
        || (month == KISLEV && has_short_kislev(year));
    if short { 29 } else { 30 }
}

/// Days from the epoch to the molad of Tishrei, after the weekday postponement.
fn elapsed_days(year: i32) -> i64 {
    let year = i64::from(year);
    let months_elapsed = (235 * year - 234).div_euclid(19);
    let parts_elapsed = 12_084 + 13_753 * months_elapsed;
    let days = 29 * months_elapsed + parts_elapsed.div_euclid(PARTS_PER_DAY);
    if (3 * (days + 1)).rem_euclid(7) < 3 {
        days + 1
    } else {
        days
    }
}

fn year_length_correction(year: i32) -> i64 {
    let ny0 = elapsed_days(year - 1);
    let ny1 = elapsed_days(year);
    let ny2 = elapsed_days(year + 1);
    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

/// Fixed day number of 1 Tishrei of `year`.
fn new_year(year: i32) -> i64 {
    EPOCH + elapsed_days(year) + year_length_correction(year)
}

pub fn month_name(year: i32, month: u8) -> &'static str {
    match month {
        1 => "ניסן",
        2 => "אייר",
        3 => "סיון",
        4 => "תמוז",
        5 => "אב",
        6 => "אלול",
        7 => "תשרי",
        8 => "מרחשון",
        9 => "כסלו",
        10 => "טבת",
        11 => "שבט",
        12 if is_leap_year(year) => "אדר א'",
        12 => "אדר",
        13 => "אדר ב'",
        _ => "",
    }
}

/// Render a year as letters, e.g. 5785 as ה׳תשפ״ה.
///
/// The thousands letter is only kept when the rest of the year needs more
/// than one letter.
pub fn format_hebrew_year(year: i32) -> String {
    let Ok(year) = u32::try_from(year) else {
        return year.to_string();
    };
    let remainder = year % 1000;
    if remainder == 0 {
        return numerals::hebrew_numeral_or_decimal(year, true);
    }
    let remainder_text = numerals::hebrew_numeral_or_decimal(remainder, false);
    if remainder_text.chars().count() > 1 {
        numerals::hebrew_numeral_or_decimal(year, true)
    } else {
        remainder_text
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "ראשון",
        Weekday::Mon => "שני",
        Weekday::Tue => "שלישי",
        Weekday::Wed => "רביעי",
        Weekday::Thu => "חמישי",
        Weekday::Fri => "שישי",
        Weekday::Sat => "שבת",
    }
}
