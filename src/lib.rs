pub mod calendar;
pub mod hebrew_date;
pub mod holidays;
pub mod metadata;
pub mod mode;
pub mod numerals;
pub mod persistence;
pub mod reference;
pub mod schedule;
pub mod summary;
pub mod tree;
pub mod units;

pub use calendar::{StudyCalendar, StudyCalendarConfig};
pub use hebrew_date::HebrewDate;
pub use holidays::{HolidayConfig, HolidayOracle};
pub use metadata::PlanMetadata;
pub use mode::CountingMode;
pub use reference::{CanonicalRef, ReferenceBuilder, TractateMap};
pub use schedule::{PlanError, PlanRequest, PlanSpan, ScheduleDay, StudyPlan, StudyPlanner};
pub use tree::{ContentNode, ContentTree, TreeSchema};
pub use units::{StudyUnit, expand_to_units};
