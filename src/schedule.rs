//! Allocation of study units over calendar days.
//!
//! A plan moves through collecting the units of the selection, allocating
//! them to study days, and done. Range plans front-load the remainder onto
//! the earliest study days; fixed-pace plans walk forward until the units run
//! out or the walk bound is hit.

use crate::calendar::StudyCalendar;
use crate::mode::CountingMode;
use crate::reference::ReferenceBuilder;
use crate::summary::plan_title;
use crate::tree::ContentTree;
use crate::units::{StudyUnit, expand_to_units};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// Daily pace must be at least one unit.
    InvalidPace(i64),
    /// No date can ever be a study day, or the walk bound was exceeded.
    NoStudyDaysPossible,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidPace(pace) => {
                write!(f, "invalid pace {pace}: at least one unit per day is required")
            }
            PlanError::NoStudyDaysPossible => {
                write!(f, "no study days are possible with the current exclusions")
            }
        }
    }
}

impl std::error::Error for PlanError {}

/// Why a plan came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanNotice {
    /// The selection resolved to no units in this counting mode.
    EmptySelection,
    /// The date range contains no study day.
    NoStudyDaysInRange,
}

impl fmt::Display for PlanNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanNotice::EmptySelection => write!(f, "selection has no units in this mode"),
            PlanNotice::NoStudyDaysInRange => write!(f, "no study days in the chosen range"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSpan {
    /// Spread the units over study days up to and including this date.
    Until(NaiveDate),
    /// Fixed number of units per study day.
    FixedPace(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub selection: Vec<String>,
    pub mode: CountingMode,
    pub start: NaiveDate,
    pub span: PlanSpan,
}

impl PlanRequest {
    pub fn until<S: Into<String>>(
        selection: impl IntoIterator<Item = S>,
        mode: CountingMode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self {
            selection: selection.into_iter().map(Into::into).collect(),
            mode,
            start,
            span: PlanSpan::Until(end),
        }
    }

    pub fn fixed_pace<S: Into<String>>(
        selection: impl IntoIterator<Item = S>,
        mode: CountingMode,
        start: NaiveDate,
        units_per_day: i64,
    ) -> Self {
        Self {
            selection: selection.into_iter().map(Into::into).collect(),
            mode,
            start,
            span: PlanSpan::FixedPace(units_per_day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    pub units: Vec<StudyUnit>,
    pub description: String,
    #[serde(default)]
    pub references: Vec<String>,
}

impl ScheduleDay {
    pub fn first_unit(&self) -> Option<&StudyUnit> {
        self.units.first()
    }

    pub fn last_unit(&self) -> Option<&StudyUnit> {
        self.units.last()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    /// Calendar entry name, e.g. "סדר לימוד: ברכות".
    pub title: String,
    pub mode: CountingMode,
    pub start: NaiveDate,
    /// Date of the last populated day, or the start date for an empty plan.
    pub finish: NaiveDate,
    pub total_units: usize,
    pub days: Vec<ScheduleDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<PlanNotice>,
}

impl StudyPlan {
    fn empty(title: String, request: &PlanRequest, notice: PlanNotice) -> Self {
        Self {
            title,
            mode: request.mode,
            start: request.start,
            finish: request.start,
            total_units: 0,
            days: Vec::new(),
            notice: Some(notice),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day_on(&self, date: NaiveDate) -> Option<&ScheduleDay> {
        self.days.iter().find(|day| day.date == date)
    }
}

/// Per-day unit counts for `total` units over `study_days` days:
/// `total / study_days` each, with the first `total % study_days` days
/// taking one extra.
pub fn allocate_range(total: usize, study_days: usize) -> Vec<usize> {
    if study_days == 0 {
        return Vec::new();
    }
    let base = total / study_days;
    let remainder = total % study_days;
    (0..study_days)
        .map(|day| if day < remainder { base + 1 } else { base })
        .collect()
}

/// Description for a span from `first` to `last`.
pub fn describe_span(first: &StudyUnit, last: &StudyUnit) -> String {
    if first.book_path != last.book_path {
        return format!(
            "מ-{} {} עד {} {}",
            first.book_display_name(),
            first.unit_label,
            last.book_display_name(),
            last.unit_label
        );
    }
    if first == last {
        format!("{} – {}", first.book_display_name(), first.unit_label)
    } else {
        format!(
            "{} – {} עד {}",
            first.book_display_name(),
            first.unit_label,
            last.unit_label
        )
    }
}

/// Average units per study day needed to finish `total` by `end`.
pub fn required_daily_pace(
    total: f64,
    start: NaiveDate,
    end: NaiveDate,
    calendar: &StudyCalendar,
) -> Option<f64> {
    let days = calendar.count_study_days(start, end);
    (days > 0).then(|| total / days as f64)
}

/// Finish date for `total` units at `units_per_day`, without expanding units.
pub fn projected_finish(
    start: NaiveDate,
    total: f64,
    units_per_day: i64,
    calendar: &StudyCalendar,
) -> Result<NaiveDate, PlanError> {
    if units_per_day <= 0 {
        return Err(PlanError::InvalidPace(units_per_day));
    }
    if total <= 0.0 {
        return Ok(start);
    }
    if !calendar.has_study_weekdays() {
        return Err(PlanError::NoStudyDaysPossible);
    }
    let sessions = (total / units_per_day as f64).ceil() as usize;
    calendar
        .study_days_from(start)
        .nth(sessions.saturating_sub(1))
        .ok_or(PlanError::NoStudyDaysPossible)
}

pub struct StudyPlanner<'a> {
    tree: &'a ContentTree,
    calendar: &'a StudyCalendar,
    references: Option<ReferenceBuilder<'a>>,
}

impl<'a> StudyPlanner<'a> {
    pub fn new(tree: &'a ContentTree, calendar: &'a StudyCalendar) -> Self {
        Self {
            tree,
            calendar,
            references: None,
        }
    }

    /// Attach canonical references to every planned day.
    pub fn with_references(mut self, references: ReferenceBuilder<'a>) -> Self {
        self.references = Some(references);
        self
    }

    pub fn tree(&self) -> &ContentTree {
        self.tree
    }

    pub fn calendar(&self) -> &StudyCalendar {
        self.calendar
    }

    pub fn plan(&self, request: &PlanRequest) -> Result<StudyPlan, PlanError> {
        let title = plan_title(&request.selection);

        if let PlanSpan::FixedPace(pace) = request.span {
            if pace <= 0 {
                return Err(PlanError::InvalidPace(pace));
            }
        }

        let units = expand_to_units(self.tree, &request.selection, request.mode);
        if units.is_empty() {
            debug!(selection = ?request.selection, "selection has no units");
            return Ok(StudyPlan::empty(title, request, PlanNotice::EmptySelection));
        }

        let spans = match request.span {
            PlanSpan::Until(end) => {
                let study_days = self.calendar.study_days_in_range(request.start, end);
                if study_days.is_empty() {
                    return Ok(StudyPlan::empty(
                        title,
                        request,
                        PlanNotice::NoStudyDaysInRange,
                    ));
                }
                let counts = allocate_range(units.len(), study_days.len());
                let mut spans = Vec::new();
                let mut offset = 0;
                for (date, count) in study_days.into_iter().zip(counts) {
                    if count == 0 {
                        break;
                    }
                    spans.push((date, units[offset..offset + count].to_vec()));
                    offset += count;
                }
                spans
            }
            PlanSpan::FixedPace(pace) => {
                if !self.calendar.has_study_weekdays() {
                    return Err(PlanError::NoStudyDaysPossible);
                }
                let chunks: Vec<&[StudyUnit]> = units.chunks(pace as usize).collect();
                let spans: Vec<(NaiveDate, Vec<StudyUnit>)> = self
                    .calendar
                    .study_days_from(request.start)
                    .zip(chunks.iter())
                    .map(|(date, chunk)| (date, chunk.to_vec()))
                    .collect();
                if spans.len() < chunks.len() {
                    return Err(PlanError::NoStudyDaysPossible);
                }
                spans
            }
        };

        let days: Vec<ScheduleDay> = spans
            .into_iter()
            .map(|(date, units)| self.schedule_day(date, units, request.mode))
            .collect();
        let finish = days.last().map_or(request.start, |day| day.date);

        info!(
            title = title.as_str(),
            days = days.len(),
            units = units.len(),
            %finish,
            "plan built"
        );

        Ok(StudyPlan {
            title,
            mode: request.mode,
            start: request.start,
            finish,
            total_units: units.len(),
            days,
            notice: None,
        })
    }

    /// Plan independent requests in parallel against the shared tree.
    pub fn plan_many(&self, requests: &[PlanRequest]) -> Vec<Result<StudyPlan, PlanError>> {
        requests.par_iter().map(|request| self.plan(request)).collect()
    }

    fn schedule_day(&self, date: NaiveDate, units: Vec<StudyUnit>, mode: CountingMode) -> ScheduleDay {
        let (description, references) = match (units.first(), units.last()) {
            (Some(first), Some(last)) => {
                let references = self
                    .references
                    .as_ref()
                    .and_then(|builder| builder.build(first, last, mode))
                    .map(|reference| reference.into_vec())
                    .unwrap_or_default();
                (describe_span(first, last), references)
            }
            _ => (String::new(), Vec::new()),
        };
        ScheduleDay {
            date,
            units,
            description,
            references,
        }
    }
}
