use std::collections::HashSet;

use derive_more::Display;

/// Device partition rejected at construction. This is a configuration error:
/// callers surface it at startup, not per request.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[display(fmt = "no in-devices configured")]
    NoInDevices,
    #[display(fmt = "no out-devices configured")]
    NoOutDevices,
    #[display(fmt = "devices listed on both sides: {}", "_0.join(\", \")")]
    Overlap(Vec<String>),
}

/// The monitored door controllers, partitioned into entry and exit sides.
/// Both sides must be non-empty and disjoint; a scan on a device in neither
/// set is ignored by the derivation.
#[derive(Debug, Clone)]
pub struct DeviceRoster {
    in_devices: HashSet<String>,
    out_devices: HashSet<String>,
}

impl DeviceRoster {
    pub fn new(
        in_devices: HashSet<String>,
        out_devices: HashSet<String>,
    ) -> Result<Self, RosterError> {
        if in_devices.is_empty() {
            return Err(RosterError::NoInDevices);
        }
        if out_devices.is_empty() {
            return Err(RosterError::NoOutDevices);
        }

        let mut both: Vec<String> = in_devices.intersection(&out_devices).cloned().collect();
        if !both.is_empty() {
            both.sort();
            return Err(RosterError::Overlap(both));
        }

        Ok(Self {
            in_devices,
            out_devices,
        })
    }

    /// Build a roster from comma-separated device lists, as configured in the
    /// environment. Blank entries are skipped.
    pub fn from_csv(in_list: &str, out_list: &str) -> Result<Self, RosterError> {
        Self::new(split_devices(in_list), split_devices(out_list))
    }

    pub fn is_in(&self, device_id: &str) -> bool {
        self.in_devices.contains(device_id)
    }

    pub fn is_out(&self, device_id: &str) -> bool {
        self.out_devices.contains(device_id)
    }

    /// Whether the device participates in attendance at all.
    pub fn monitors(&self, device_id: &str) -> bool {
        self.is_in(device_id) || self.is_out(device_id)
    }

    /// All monitored device ids, for query allowlists.
    pub fn all_devices(&self) -> impl Iterator<Item = &str> {
        self.in_devices
            .iter()
            .chain(self.out_devices.iter())
            .map(String::as_str)
    }
}

fn split_devices(list: &str) -> HashSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_sides() {
        assert!(matches!(
            DeviceRoster::from_csv("", "GATE-OUT-1"),
            Err(RosterError::NoInDevices)
        ));
        assert!(matches!(
            DeviceRoster::from_csv("GATE-IN-1", " , "),
            Err(RosterError::NoOutDevices)
        ));
    }

    #[test]
    fn rejects_overlapping_partition() {
        let err = DeviceRoster::from_csv("GATE-1,GATE-2", "GATE-2,GATE-3").unwrap_err();
        assert_eq!(err, RosterError::Overlap(vec!["GATE-2".to_string()]));
    }

    #[test]
    fn splits_and_trims_csv_lists() {
        let roster = DeviceRoster::from_csv(" GATE-IN-1 , GATE-IN-2", "GATE-OUT-1,").unwrap();
        assert!(roster.is_in("GATE-IN-2"));
        assert!(roster.is_out("GATE-OUT-1"));
        assert!(!roster.monitors("CANTEEN-1"));
        assert_eq!(roster.all_devices().count(), 3);
    }
}
