use std::{collections::BTreeMap, fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bounding box enclosing every differing pixel, in comparison-resolution
/// coordinates. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffRegion {
    pub y_start: u32,
    pub y_end: u32,
    pub x_start: u32,
    pub x_end: u32,
    /// Diff percentage that triggered detection.
    pub area_percent: f64,
}

impl DiffRegion {
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start + 1
    }

    pub fn height(&self) -> u32 {
        self.y_end - self.y_start + 1
    }
}

/// Outcome of comparing one screen's captured image against its reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub mean_diff: f64,
    pub max_diff: f64,
    pub diff_percent: f64,
    pub match_score: f64,
    /// `[width, height]` the images were compared at.
    pub resolution: [u32; 2],
    pub regions: Vec<DiffRegion>,
    #[serde(rename = "unity_path")]
    pub captured_path: PathBuf,
    #[serde(rename = "figma_path")]
    pub reference_path: PathBuf,
    #[serde(rename = "unity_hash")]
    pub captured_hash: String,
    #[serde(rename = "figma_hash")]
    pub reference_hash: String,
    pub diff_image: PathBuf,
}

impl DiffResult {
    pub fn region(&self) -> Option<&DiffRegion> {
        self.regions.first()
    }
}

/// Classification band of a compared screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Passing,
    Warning,
    Failing,
}

impl MatchClass {
    pub fn glyph(self) -> &'static str {
        match self {
            MatchClass::Passing => "✅",
            MatchClass::Warning => "🟡",
            MatchClass::Failing => "🔴",
        }
    }
}

impl fmt::Display for MatchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchClass::Passing => "passing",
            MatchClass::Warning => "warning",
            MatchClass::Failing => "failing",
        };
        f.write_str(label)
    }
}

/// Per-screen state after a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ScreenRecord", from = "ScreenRecord")]
pub enum ScreenStatus {
    Compared(Box<DiffResult>),
    MissingCaptured,
    MissingReference,
    /// A source image exists but could not be decoded.
    DecodeFailed { error: String },
}

impl ScreenStatus {
    pub fn as_compared(&self) -> Option<&DiffResult> {
        match self {
            ScreenStatus::Compared(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ScreenStatus::MissingCaptured | ScreenStatus::MissingReference
        )
    }

    /// Status string written for screens that never reached the differencer.
    pub fn status_label(&self) -> Option<&'static str> {
        match self {
            ScreenStatus::Compared(_) => None,
            ScreenStatus::MissingCaptured => Some("missing_captured"),
            ScreenStatus::MissingReference => Some("missing_reference"),
            ScreenStatus::DecodeFailed { .. } => Some("decode_failed"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScreenRecord {
    Compared(Box<DiffResult>),
    Skipped {
        status: SkipReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SkipReason {
    MissingCaptured,
    MissingReference,
    DecodeFailed,
}

impl From<ScreenStatus> for ScreenRecord {
    fn from(status: ScreenStatus) -> Self {
        match status {
            ScreenStatus::Compared(result) => ScreenRecord::Compared(result),
            ScreenStatus::MissingCaptured => ScreenRecord::Skipped {
                status: SkipReason::MissingCaptured,
                error: None,
            },
            ScreenStatus::MissingReference => ScreenRecord::Skipped {
                status: SkipReason::MissingReference,
                error: None,
            },
            ScreenStatus::DecodeFailed { error } => ScreenRecord::Skipped {
                status: SkipReason::DecodeFailed,
                error: Some(error),
            },
        }
    }
}

impl From<ScreenRecord> for ScreenStatus {
    fn from(record: ScreenRecord) -> Self {
        match record {
            ScreenRecord::Compared(result) => ScreenStatus::Compared(result),
            ScreenRecord::Skipped { status, error } => match status {
                SkipReason::MissingCaptured => ScreenStatus::MissingCaptured,
                SkipReason::MissingReference => ScreenStatus::MissingReference,
                SkipReason::DecodeFailed => ScreenStatus::DecodeFailed {
                    error: error.unwrap_or_default(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passing: usize,
    pub warning: usize,
    pub failing: usize,
    pub missing: usize,
}

impl BatchSummary {
    pub fn record_class(&mut self, class: MatchClass) {
        self.total += 1;
        match class {
            MatchClass::Passing => self.passing += 1,
            MatchClass::Warning => self.warning += 1,
            MatchClass::Failing => self.failing += 1,
        }
    }

    pub fn record_missing(&mut self) {
        self.total += 1;
        self.missing += 1;
    }

    pub fn is_clean(&self) -> bool {
        self.failing == 0 && self.missing == 0
    }
}

/// Snapshot of one batch run, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub timestamp: DateTime<Utc>,
    pub screens: BTreeMap<String, ScreenStatus>,
    pub summary: BatchSummary,
}
