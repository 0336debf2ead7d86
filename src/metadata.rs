use crate::mode::CountingMode;
use crate::schedule::StudyPlan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptive header stored alongside exported plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub title: String,
    /// Summary label, also the basis of output file names.
    pub label: String,
    pub mode: CountingMode,
    pub selection: Vec<String>,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    pub total_units: usize,
    pub study_days: usize,
}

impl PlanMetadata {
    pub fn for_plan(plan: &StudyPlan, selection: &[String], label: impl Into<String>) -> Self {
        Self {
            title: plan.title.clone(),
            label: label.into(),
            mode: plan.mode,
            selection: selection.to_vec(),
            start_date: plan.start,
            finish_date: plan.finish,
            total_units: plan.total_units,
            study_days: plan.days.len(),
        }
    }
}
