// src/engine/derive_tests.rs

#[cfg(test)]
mod tests {
    use crate::engine::derive::*;
    use crate::engine::device::DeviceRoster;
    use crate::engine::punch::{PunchEvent, collect_valid};
    use chrono::{NaiveDate, NaiveDateTime};

    const E1: u64 = 1001;
    const E2: u64 = 1002;

    fn roster() -> DeviceRoster {
        DeviceRoster::from_csv("IN-1,IN-2", "OUT-1,OUT-2").unwrap()
    }

    // Helper to build a punch on a fixed test day
    fn punch(employee_id: u64, device_id: &str, hms: &str) -> PunchEvent {
        punch_on(employee_id, device_id, "2025-02-10", hms)
    }

    fn punch_on(employee_id: u64, device_id: &str, day: &str, hms: &str) -> PunchEvent {
        PunchEvent::parse(employee_id, device_id, &format!("{} {}", day, hms))
            .expect("test punch must parse")
    }

    fn ts(day: &str, hms: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", day, hms), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn derive_one(punches: &[PunchEvent]) -> AttendanceRecord {
        let records = derive_attendance(punches, &roster());
        assert_eq!(records.len(), 1, "expected a single derived record");
        records.into_iter().next().unwrap()
    }

    #[test]
    fn test_plain_present_day() {
        let record = derive_one(&[punch(E1, "IN-1", "07:55:00"), punch(E1, "OUT-1", "16:10:00")]);

        assert_eq!(record.employee_id, E1);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert_eq!(record.first_in, Some(ts("2025-02-10", "07:55:00")));
        assert_eq!(record.last_out, Some(ts("2025-02-10", "16:10:00")));
        assert_eq!(record.total_span.as_secs(), 8 * 3600 + 15 * 60);
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_innings_pairing_sums_odd_even_pairs() {
        // Ranks 1..4: innings are (1,2) and (3,4) by ordinal position.
        let record = derive_one(&[
            punch(E1, "IN-1", "08:00:00"),
            punch(E1, "OUT-1", "13:00:00"),
            punch(E1, "IN-1", "13:30:00"),
            punch(E1, "OUT-1", "17:00:00"),
        ]);

        assert_eq!(record.total_in.as_secs(), 8 * 3600 + 30 * 60);
        assert_eq!(record.total_out.as_secs(), 30 * 60);
        assert_eq!(record.total_span.as_secs(), 9 * 3600);
    }

    #[test]
    fn test_innings_pairing_ignores_device_role_within_pairs() {
        // Two consecutive in-scans still pair by ordinal parity.
        let record = derive_one(&[
            punch(E1, "IN-1", "08:00:00"),
            punch(E1, "IN-2", "09:00:00"),
            punch(E1, "OUT-1", "17:00:00"),
        ]);

        // Only ranks (1,2) pair; the trailing rank 3 is unpaired.
        assert_eq!(record.total_in.as_secs(), 3600);
        assert_eq!(record.total_span.as_secs(), 9 * 3600);
        assert_eq!(record.total_out.as_secs(), 8 * 3600);
    }

    #[test]
    fn test_span_identity_holds() {
        let record = derive_one(&[
            punch(E1, "IN-1", "08:01:07"),
            punch(E1, "OUT-2", "12:13:59"),
            punch(E1, "IN-2", "12:47:03"),
            punch(E1, "OUT-1", "17:29:58"),
        ]);

        assert_eq!(
            record.total_span.as_secs(),
            record.total_in.as_secs() + record.total_out.as_secs()
        );
    }

    #[test]
    fn test_one_record_per_employee_day() {
        let punches = vec![
            punch(E1, "IN-1", "08:00:00"),
            punch(E1, "OUT-1", "17:00:00"),
            punch(E2, "IN-2", "08:30:00"),
            punch(E2, "OUT-2", "17:30:00"),
            punch_on(E1, "IN-1", "2025-02-11", "08:00:00"),
            punch_on(E1, "OUT-1", "2025-02-11", "17:00:00"),
        ];

        let records = derive_attendance(&punches, &roster());
        assert_eq!(records.len(), 3);

        // Deterministic (employee_id, date) ascending order.
        let keys: Vec<(u64, NaiveDate)> = records.iter().map(|r| (r.employee_id, r.date)).collect();
        assert_eq!(
            keys,
            vec![
                (E1, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()),
                (E1, NaiveDate::from_ymd_opt(2025, 2, 11).unwrap()),
                (E2, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()),
            ]
        );
    }

    #[test]
    fn test_no_in_scan_is_absent() {
        let record = derive_one(&[punch(E1, "OUT-1", "17:00:00")]);

        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.first_in, None);
        assert_eq!(record.total_span.as_secs(), 0);
    }

    #[test]
    fn test_no_in_device_scan_has_zero_total_in() {
        // A lone out-scan pairs with nothing, so total_in stays 0.
        let record = derive_one(&[punch(E1, "OUT-1", "17:00:00")]);
        assert_eq!(record.total_in.as_secs(), 0);
    }

    #[test]
    fn test_unmonitored_devices_are_discarded() {
        let punches = vec![
            punch(E1, "CANTEEN-1", "12:00:00"),
            punch(E1, "PARKING-1", "12:05:00"),
        ];
        assert!(derive_attendance(&punches, &roster()).is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(derive_attendance(&[], &roster()).is_empty());
    }

    #[test]
    fn test_late_mark_boundaries() {
        let cases = [
            ("09:35:00", AttendanceStatus::Present),
            ("09:35:01", AttendanceStatus::PresentLate),
            ("10:00:00", AttendanceStatus::PresentLate),
            ("10:00:01", AttendanceStatus::HalfDay),
        ];

        for (arrival, expected) in cases {
            let record = derive_one(&[
                punch(E1, "IN-1", arrival),
                punch(E1, "OUT-1", "17:30:00"),
            ]);
            assert_eq!(record.status, expected, "arrival at {}", arrival);
        }
    }

    #[test]
    fn test_short_span_is_half_day() {
        // 08:00 to 12:30 is 4h30m: inside the [4h, 7h) half-day band.
        let record = derive_one(&[punch(E1, "IN-1", "08:00:00"), punch(E1, "OUT-1", "12:30:00")]);
        assert_eq!(record.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_span_band_boundaries() {
        // Exactly 4h is a half day; exactly 7h is not.
        let four = derive_one(&[punch(E1, "IN-1", "08:00:00"), punch(E1, "OUT-1", "12:00:00")]);
        assert_eq!(four.status, AttendanceStatus::HalfDay);

        let seven = derive_one(&[punch(E1, "IN-1", "08:00:00"), punch(E1, "OUT-1", "15:00:00")]);
        assert_eq!(seven.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_in_only_after_ten_is_half_day() {
        // Missing out-punch, but the >10:00 arrival rule fires first.
        let record = derive_one(&[punch(E1, "IN-1", "11:00:00")]);

        assert_eq!(record.last_out, None);
        assert_eq!(record.total_span.as_secs(), 0);
        assert_eq!(record.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_in_only_on_time_is_mis_punch() {
        let record = derive_one(&[punch(E1, "IN-1", "08:00:00")]);

        assert_eq!(record.last_out, None);
        assert_eq!(record.status, AttendanceStatus::MisPunch);
    }

    #[test]
    fn test_inconsistent_scans_emit_negative_out_time() {
        // Out-scan before the in-scan. Ranks (1,2) still pair to 2h inside,
        // while first_in=09:00 and last_out=07:00 give a span of -2h. The
        // engine emits the raw values rather than clamping.
        let record = derive_one(&[punch(E1, "OUT-1", "07:00:00"), punch(E1, "IN-1", "09:00:00")]);

        assert_eq!(record.total_span.as_secs(), -2 * 3600);
        assert_eq!(record.total_in.as_secs(), 2 * 3600);
        assert_eq!(record.total_out.as_secs(), -4 * 3600);
        // Identity still holds on pathological input.
        assert_eq!(
            record.total_span.as_secs(),
            record.total_in.as_secs() + record.total_out.as_secs()
        );
    }

    #[test]
    fn test_exceptions_filter_drops_present_and_late() {
        let punches = vec![
            // E1 present
            punch(E1, "IN-1", "08:00:00"),
            punch(E1, "OUT-1", "17:00:00"),
            // E2 late but present
            punch(E2, "IN-1", "09:40:00"),
            punch(E2, "OUT-1", "18:00:00"),
            // E1 next day: in-only mis-punch
            punch_on(E1, "IN-1", "2025-02-11", "08:00:00"),
        ];

        let exceptions = derive_exceptions(&punches, &roster());
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].status, AttendanceStatus::MisPunch);
        assert_eq!(exceptions[0].date, NaiveDate::from_ymd_opt(2025, 2, 11).unwrap());
    }

    #[test]
    fn test_malformed_punches_are_dropped_not_fatal() {
        let rows = vec![
            PunchEvent::parse(E1, "IN-1", "2025-02-10 08:00:00"),
            PunchEvent::parse(E1, "OUT-1", "not-a-timestamp"),
            PunchEvent::parse(E1, "OUT-1", "2025-02-10T17:00:00"),
        ];

        let punches = collect_valid(rows);
        assert_eq!(punches.len(), 2);

        let record = derive_one(&punches);
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.total_span.as_secs(), 9 * 3600);
    }

    #[test]
    fn test_duration_formats_clock_style() {
        assert_eq!(WorkedDuration::from_secs(0).to_string(), "00:00:00");
        assert_eq!(
            WorkedDuration::from_secs(8 * 3600 + 30 * 60).to_string(),
            "08:30:00"
        );
        // Pathological punch sets may exceed a day; no wrapping.
        assert_eq!(
            WorkedDuration::from_secs(30 * 3600 + 15 * 60 + 9).to_string(),
            "30:15:09"
        );
        assert_eq!(WorkedDuration::from_secs(-3661).to_string(), "-01:01:01");
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        use std::str::FromStr;

        assert_eq!(AttendanceStatus::HalfDay.to_string(), "HALF_DAY");
        assert_eq!(
            AttendanceStatus::from_str("MIS_PUNCH").unwrap(),
            AttendanceStatus::MisPunch
        );
        assert!(AttendanceStatus::from_str("ON_LEAVE").is_err());
    }
}
