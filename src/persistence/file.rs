use super::{PersistenceError, PersistenceResult};
use crate::calendar::StudyCalendarConfig;
use crate::hebrew_date::HebrewDate;
use crate::metadata::PlanMetadata;
use crate::reference::TractateMap;
use crate::schedule::StudyPlan;
use crate::tree::{ContentTree, TreeSchema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

pub fn load_tree_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ContentTree> {
    load_tree_with_schema(path, TreeSchema::default())
}

pub fn load_tree_with_schema<P: AsRef<Path>>(
    path: P,
    schema: TreeSchema,
) -> PersistenceResult<ContentTree> {
    let file = File::open(path.as_ref())?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    let tree = ContentTree::from_json_value(&value, schema)?;
    info!(path = %path.as_ref().display(), entries = tree.top_level().len(), "loaded content tree");
    Ok(tree)
}

/// Load a JSON object of tractate display names to canonical keys.
pub fn load_tractate_map<P: AsRef<Path>>(path: P) -> PersistenceResult<TractateMap> {
    let file = File::open(path.as_ref())?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    let object = value.as_object().ok_or_else(|| {
        PersistenceError::InvalidData("tractate map must be a JSON object".to_string())
    })?;
    object
        .iter()
        .map(|(display, key)| {
            key.as_str()
                .map(|key| (display.clone(), key.to_string()))
                .ok_or_else(|| {
                    PersistenceError::InvalidData(format!(
                        "tractate '{display}' must map to a string key"
                    ))
                })
        })
        .collect()
}

pub fn load_calendar_config<P: AsRef<Path>>(path: P) -> PersistenceResult<StudyCalendarConfig> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn save_calendar_config<P: AsRef<Path>>(
    config: &StudyCalendarConfig,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub metadata: PlanMetadata,
    pub plan: StudyPlan,
}

impl PlanSnapshot {
    pub fn new(metadata: PlanMetadata, plan: StudyPlan) -> Self {
        Self { metadata, plan }
    }

    fn validate(&self) -> PersistenceResult<()> {
        let mut previous: Option<NaiveDate> = None;
        for day in &self.plan.days {
            if day.units.is_empty() {
                return Err(PersistenceError::InvalidData(format!(
                    "day {} has no study units",
                    day.date
                )));
            }
            if previous.is_some_and(|prev| prev >= day.date) {
                return Err(PersistenceError::InvalidData(format!(
                    "day {} is out of order",
                    day.date
                )));
            }
            previous = Some(day.date);
        }
        let assigned: usize = self.plan.days.iter().map(|day| day.units.len()).sum();
        if assigned != self.plan.total_units {
            return Err(PersistenceError::InvalidData(format!(
                "plan lists {} units but days hold {assigned}",
                self.plan.total_units
            )));
        }
        Ok(())
    }
}

pub fn save_plan_to_json<P: AsRef<Path>>(
    snapshot: &PlanSnapshot,
    path: P,
) -> PersistenceResult<()> {
    snapshot.validate()?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, snapshot)?;
    info!(path = %path.as_ref().display(), "saved plan");
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlanSnapshot> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(BufReader::new(file))?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// One schedule day as a flat CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanCsvRecord {
    pub date: String,
    pub hebrew_date: String,
    pub description: String,
    pub unit_count: usize,
    pub references: String,
}

impl PlanCsvRecord {
    pub fn date(&self) -> PersistenceResult<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|e| {
            PersistenceError::InvalidData(format!("invalid date '{}': {e}", self.date))
        })
    }

    pub fn reference_list(&self) -> Vec<String> {
        split_strings(&self.references)
    }
}

pub fn save_plan_to_csv<P: AsRef<Path>>(plan: &StudyPlan, path: P) -> PersistenceResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = csv::Writer::from_writer(file);
    for day in &plan.days {
        writer.serialize(PlanCsvRecord {
            date: day.date.format("%Y-%m-%d").to_string(),
            hebrew_date: HebrewDate::from_gregorian(day.date).to_string(),
            description: day.description.clone(),
            unit_count: day.units.len(),
            references: day.references.join(";"),
        })?;
    }
    writer.flush()?;
    info!(path = %path.as_ref().display(), rows = plan.days.len(), "saved plan csv");
    Ok(())
}

pub fn load_plan_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<PlanCsvRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize::<PlanCsvRecord>() {
        let record = record?;
        record.date()?;
        rows.push(record);
    }
    Ok(rows)
}

fn split_strings(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input.split(';').map(|s| s.trim().to_string()).collect()
}
