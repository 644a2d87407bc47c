// Punch-to-attendance derivation engine.
//
// Pure code: no pool, no globals, no I/O. Callers load a bounded batch of
// punches (one reporting period), hand it over together with the device
// roster, and get one AttendanceRecord per (employee, day) back.

pub mod derive;
pub mod device;
pub mod punch;

mod derive_tests;

pub use derive::{AttendanceRecord, AttendanceStatus, WorkedDuration, derive_attendance, derive_exceptions};
pub use device::{DeviceRoster, RosterError};
pub use punch::{MalformedPunch, PunchEvent, collect_valid};
