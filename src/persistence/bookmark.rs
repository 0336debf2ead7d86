//! Printable bookmark: a month grid of the plan, weeks starting on Sunday.

use super::PersistenceResult;
use crate::hebrew_date::{HebrewDate, format_hebrew_year, weekday_name};
use crate::numerals::hebrew_numeral_or_decimal;
use crate::schedule::StudyPlan;
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkCell {
    pub date: NaiveDate,
    pub in_month: bool,
    /// Hebrew day of month in letters, e.g. "כ״ג".
    pub hebrew_day: String,
    pub weekday: &'static str,
    pub study_portion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkMonth {
    /// Hebrew month and year at the first of the Gregorian month.
    pub month_name: String,
    pub weeks: Vec<Vec<BookmarkCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkPage {
    pub title: String,
    pub months: Vec<BookmarkMonth>,
}

impl BookmarkPage {
    /// Build month grids covering every Gregorian month from the plan's start
    /// to its finish.
    pub fn from_plan(plan: &StudyPlan) -> Self {
        let portions: HashMap<NaiveDate, &str> = plan
            .days
            .iter()
            .map(|day| (day.date, day.description.as_str()))
            .collect();

        let mut months = Vec::new();
        let mut month_start = first_of_month(plan.start);
        let last_month = first_of_month(plan.finish);
        while month_start <= last_month {
            months.push(build_month(month_start, &portions));
            match month_start.checked_add_months(chrono::Months::new(1)) {
                Some(next) => month_start = next,
                None => break,
            }
        }

        Self {
            title: plan.title.clone(),
            months,
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"he\" dir=\"rtl\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str(
            "<style>body{font-family:sans-serif}table{border-collapse:collapse;margin-bottom:1em}\
td,th{border:1px solid #999;padding:4px;vertical-align:top;width:7em}\
.out{color:#bbb}.portion{font-size:0.85em}</style>\n</head>\n<body>\n",
        );
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        for month in &self.months {
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(&month.month_name)));
            html.push_str("<table>\n<tr>");
            for weekday in WEEK {
                html.push_str(&format!("<th>{}</th>", weekday_name(weekday)));
            }
            html.push_str("</tr>\n");
            for week in &month.weeks {
                html.push_str("<tr>");
                for cell in week {
                    let class = if cell.in_month { "in" } else { "out" };
                    html.push_str(&format!(
                        "<td class=\"{class}\"><div>{} <small>{}</small></div>",
                        escape_html(&cell.hebrew_day),
                        cell.date.day()
                    ));
                    if let Some(portion) = &cell.study_portion {
                        html.push_str(&format!("<div class=\"portion\">{}</div>", escape_html(portion)));
                    }
                    html.push_str("</td>");
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</table>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

const WEEK: [chrono::Weekday; 7] = [
    chrono::Weekday::Sun,
    chrono::Weekday::Mon,
    chrono::Weekday::Tue,
    chrono::Weekday::Wed,
    chrono::Weekday::Thu,
    chrono::Weekday::Fri,
    chrono::Weekday::Sat,
];

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn build_month(month_start: NaiveDate, portions: &HashMap<NaiveDate, &str>) -> BookmarkMonth {
    let hebrew = HebrewDate::from_gregorian(month_start);
    let month_name = format!("{} {}", hebrew.month_name(), format_hebrew_year(hebrew.year()));

    let back = u64::from(month_start.weekday().num_days_from_sunday());
    let mut week_start = month_start
        .checked_sub_days(Days::new(back))
        .unwrap_or(month_start);

    let mut weeks = Vec::new();
    loop {
        let week: Vec<BookmarkCell> = (0..7)
            .filter_map(|offset| week_start.checked_add_days(Days::new(offset)))
            .map(|date| BookmarkCell {
                date,
                in_month: date.month() == month_start.month() && date.year() == month_start.year(),
                hebrew_day: hebrew_numeral_or_decimal(
                    u32::from(HebrewDate::from_gregorian(date).day()),
                    true,
                ),
                weekday: weekday_name(date.weekday()),
                study_portion: portions.get(&date).map(|portion| portion.to_string()),
            })
            .collect();
        let reaches_next_month = week.iter().any(|cell| cell.date > month_start && !cell.in_month);
        weeks.push(week);
        if reaches_next_month {
            break;
        }
        match week_start.checked_add_days(Days::new(7)) {
            Some(next) if next.month() == month_start.month() => week_start = next,
            _ => break,
        }
    }

    BookmarkMonth { month_name, weeks }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn save_bookmark_html<P: AsRef<Path>>(plan: &StudyPlan, path: P) -> PersistenceResult<()> {
    let page = BookmarkPage::from_plan(plan);
    fs::write(path.as_ref(), page.to_html())?;
    info!(path = %path.as_ref().display(), months = page.months.len(), "saved bookmark page");
    Ok(())
}
