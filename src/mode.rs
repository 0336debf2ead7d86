use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a selection is measured and split into study units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Chapters (פרקים).
    Chapters,
    /// Mishnayot and other sub-chapter units (משניות).
    Units,
    /// Double-sided leaves (דפים).
    Pages,
    /// Single sides, twice the page count (עמודים).
    Leaves,
}

impl CountingMode {
    pub const ALL: [CountingMode; 4] = [
        CountingMode::Chapters,
        CountingMode::Units,
        CountingMode::Pages,
        CountingMode::Leaves,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CountingMode::Chapters => "chapters",
            CountingMode::Units => "units",
            CountingMode::Pages => "pages",
            CountingMode::Leaves => "leaves",
        }
    }

    pub fn hebrew_name(&self) -> &'static str {
        match self {
            CountingMode::Chapters => "פרקים",
            CountingMode::Units => "משניות",
            CountingMode::Pages => "דפים",
            CountingMode::Leaves => "עמודים",
        }
    }
}

impl fmt::Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError(pub String);

impl fmt::Display for UnknownModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown counting mode '{}' (expected chapters, units, pages or leaves)",
            self.0
        )
    }
}

impl std::error::Error for UnknownModeError {}

impl FromStr for CountingMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chapters" | "פרקים" => Ok(CountingMode::Chapters),
            "units" | "mishnayot" | "משניות" => Ok(CountingMode::Units),
            "pages" | "dapim" | "דפים" => Ok(CountingMode::Pages),
            "leaves" | "amudim" | "עמודים" => Ok(CountingMode::Leaves),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}
