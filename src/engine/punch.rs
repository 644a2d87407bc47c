use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A single badge scan at a door controller.
///
/// Punches are append-only facts: the hardware feed inserts them and nothing
/// ever updates one. Timestamps are local wall-clock values; no offset is
/// applied anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub employee_id: u64,
    pub device_id: String,
    pub at: NaiveDateTime,
}

/// Punch rejected at the parse boundary. Batch callers skip these and keep
/// going; only the single punch is lost.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(fmt = "malformed punch for employee {}: bad timestamp {:?}", employee_id, raw)]
pub struct MalformedPunch {
    pub employee_id: u64,
    pub raw: String,
}

// Accept both the space and the T separator; controllers disagree.
const WIRE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl PunchEvent {
    /// Parse a punch from the wire representation the controllers push.
    pub fn parse(
        employee_id: u64,
        device_id: impl Into<String>,
        raw: &str,
    ) -> Result<Self, MalformedPunch> {
        let trimmed = raw.trim();
        for fmt in WIRE_FORMATS {
            if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(Self {
                    employee_id,
                    device_id: device_id.into(),
                    at,
                });
            }
        }
        Err(MalformedPunch {
            employee_id,
            raw: raw.to_string(),
        })
    }

    /// Calendar day the punch belongs to (local date component).
    pub fn day(&self) -> NaiveDate {
        self.at.date()
    }
}

/// Collect a batch of parse results, dropping malformed punches with a
/// warning instead of failing the whole batch.
pub fn collect_valid<I>(rows: I) -> Vec<PunchEvent>
where
    I: IntoIterator<Item = Result<PunchEvent, MalformedPunch>>,
{
    rows.into_iter()
        .filter_map(|row| match row {
            Ok(punch) => Some(punch),
            Err(bad) => {
                tracing::warn!(employee_id = bad.employee_id, raw = %bad.raw, "Dropping malformed punch");
                None
            }
        })
        .collect()
}
