use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::device::DeviceRoster;
use super::punch::PunchEvent;

// Classification thresholds, in seconds. Arrival strictly after 09:35:00 is
// a late mark, strictly after 10:00:00 is a half day; a span of at least 4h
// but under 7h is a half day regardless of arrival.
const LATE_ARRIVAL: i64 = 9 * 3600 + 35 * 60;
const HALF_DAY_ARRIVAL: i64 = 10 * 3600;
const HALF_DAY_SPAN_MIN: i64 = 4 * 3600;
const HALF_DAY_SPAN_MAX: i64 = 7 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    #[strum(serialize = "PRESENT")]
    Present,
    #[strum(serialize = "PRESENT_LATE")]
    PresentLate,
    #[strum(serialize = "HALF_DAY")]
    HalfDay,
    #[strum(serialize = "MIS_PUNCH")]
    MisPunch,
    #[strum(serialize = "ABSENT")]
    Absent,
}

impl AttendanceStatus {
    /// Statuses surfaced by the exceptions report. Everything except a plain
    /// or late presence needs a manager's eye.
    pub fn is_exception(self) -> bool {
        !matches!(self, AttendanceStatus::Present | AttendanceStatus::PresentLate)
    }
}

/// A signed duration in whole seconds, rendered clock-style as `HH:MM:SS`.
/// Hours are not wrapped at 24 and inconsistent punch sets may legitimately
/// drive the value negative; both render as computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkedDuration(i64);

impl WorkedDuration {
    pub fn from_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WorkedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, secs) = if self.0 < 0 { ("-", -self.0) } else { ("", self.0) };
        write!(
            f,
            "{}{:02}:{:02}:{:02}",
            sign,
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

impl Serialize for WorkedDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Daily attendance summary for one employee. Recomputed on every query from
/// the punch log; never stored. Manual corrections live in their own table
/// and are merged at presentation time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1042)]
    pub employee_id: u64,
    #[schema(example = "2025-02-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// Earliest scan on an in-device that day, if any.
    #[schema(example = "2025-02-10T07:55:00", value_type = Option<String>)]
    pub first_in: Option<NaiveDateTime>,
    /// Latest scan on an out-device that day, if any.
    #[schema(example = "2025-02-10T16:10:00", value_type = Option<String>)]
    pub last_out: Option<NaiveDateTime>,
    /// Innings-summed time inside.
    #[schema(example = "08:15:00", value_type = String)]
    pub total_in: WorkedDuration,
    /// Span minus time inside. Negative when the punch set is inconsistent.
    #[schema(example = "00:00:00", value_type = String)]
    pub total_out: WorkedDuration,
    /// Elapsed time between first in and last out, 0 when either is missing.
    #[schema(example = "08:15:00", value_type = String)]
    pub total_span: WorkedDuration,
    #[schema(example = "PRESENT")]
    pub status: AttendanceStatus,
}

/// Derive one attendance record per (employee, day) from a bounded batch of
/// punches. Scans on unmonitored devices are discarded up front; output is
/// ordered by (employee_id, date) ascending.
pub fn derive_attendance(punches: &[PunchEvent], roster: &DeviceRoster) -> Vec<AttendanceRecord> {
    let mut groups: BTreeMap<(u64, NaiveDate), Vec<&PunchEvent>> = BTreeMap::new();
    for punch in punches {
        if !roster.monitors(&punch.device_id) {
            continue;
        }
        groups
            .entry((punch.employee_id, punch.day()))
            .or_default()
            .push(punch);
    }

    groups
        .into_iter()
        .map(|((employee_id, date), day_punches)| {
            summarize_day(employee_id, date, day_punches, roster)
        })
        .collect()
}

/// The exceptions variant: same derivation, post-filtered to the records a
/// manager has to act on.
pub fn derive_exceptions(punches: &[PunchEvent], roster: &DeviceRoster) -> Vec<AttendanceRecord> {
    let mut records = derive_attendance(punches, roster);
    records.retain(|record| record.status.is_exception());
    records
}

fn summarize_day(
    employee_id: u64,
    date: NaiveDate,
    mut punches: Vec<&PunchEvent>,
    roster: &DeviceRoster,
) -> AttendanceRecord {
    // Stable sort: same-second scans keep their feed order.
    punches.sort_by_key(|p| p.at);

    let first_in = punches
        .iter()
        .filter(|p| roster.is_in(&p.device_id))
        .map(|p| p.at)
        .min();
    let last_out = punches
        .iter()
        .filter(|p| roster.is_out(&p.device_id))
        .map(|p| p.at)
        .max();

    // Innings pairing over ALL scans of the day, by ordinal position only:
    // the scan at odd rank k closes against the scan at k+1 regardless of
    // which side's device produced either. Alternating ranks approximate
    // in/out toggling even when device roles are noisy; a trailing unpaired
    // scan contributes nothing.
    let mut total_in = 0i64;
    for pair in punches.chunks(2) {
        if let [opened, closed] = pair {
            total_in += (closed.at - opened.at).num_seconds();
        }
    }

    let total_span = match (first_in, last_out) {
        (Some(first), Some(last)) => (last - first).num_seconds(),
        _ => 0,
    };
    let total_out = total_span - total_in;

    AttendanceRecord {
        employee_id,
        date,
        first_in,
        last_out,
        total_in: WorkedDuration::from_secs(total_in),
        total_out: WorkedDuration::from_secs(total_out),
        total_span: WorkedDuration::from_secs(total_span),
        status: classify(first_in, last_out, total_span),
    }
}

// First match wins. The time-of-day rules outrank the missing-out-punch
// rule: an in-only day starting 11:00 is a half day, an in-only day
// starting 08:00 is a mis-punch. A day with no in-scan at all is absent
// even if out-scans exist.
fn classify(
    first_in: Option<NaiveDateTime>,
    last_out: Option<NaiveDateTime>,
    span_secs: i64,
) -> AttendanceStatus {
    let Some(first_in) = first_in else {
        return AttendanceStatus::Absent;
    };

    if (HALF_DAY_SPAN_MIN..HALF_DAY_SPAN_MAX).contains(&span_secs) {
        return AttendanceStatus::HalfDay;
    }

    let arrived = i64::from(first_in.time().num_seconds_from_midnight());
    if arrived > HALF_DAY_ARRIVAL {
        return AttendanceStatus::HalfDay;
    }
    if arrived > LATE_ARRIVAL {
        return AttendanceStatus::PresentLate;
    }

    if last_out.is_none() {
        return AttendanceStatus::MisPunch;
    }

    AttendanceStatus::Present
}
