//! Save/Load functionality for persisting a fleet.
//!
//! Binary snapshots use bincode and carry a format version. JSON is used for
//! hand-edited fixtures such as `data/default_fleet.json`.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::store::{FleetSnapshot, StoreError};

/// Version number for snapshot format (increment when format changes)
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    fleet: FleetSnapshot,
}

/// Write a versioned binary snapshot.
pub fn save_snapshot<W: Write>(writer: W, fleet: &FleetSnapshot) -> Result<(), StoreError> {
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        fleet: fleet.clone(),
    };
    bincode::serialize_into(writer, &file)?;
    Ok(())
}

/// Read a binary snapshot, rejecting other format versions.
pub fn load_snapshot<R: Read>(reader: R) -> Result<FleetSnapshot, StoreError> {
    let file: SnapshotFile = bincode::deserialize_from(reader)?;

    if file.version != SNAPSHOT_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: SNAPSHOT_VERSION,
            found: file.version,
        });
    }

    Ok(file.fleet)
}

/// Parse a fleet fixture.
pub fn load_fleet_json(json: &str) -> Result<FleetSnapshot, StoreError> {
    Ok(serde_json::from_str(json)?)
}

/// Pretty-print a fleet as JSON.
pub fn fleet_to_json(fleet: &FleetSnapshot) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(fleet)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LoadRecord, MemoryStore, RecordStore};
    use truckload_logic::records::{DeviceId, TransporterId};

    fn sample_fleet() -> FleetSnapshot {
        let mut store = MemoryStore::new();
        crate::seed::seed_defaults(&mut store).expect("seed");
        store
            .record_load(LoadRecord {
                device: DeviceId(5),
                transporter: TransporterId(1),
                units: 157,
            })
            .expect("record");
        store.snapshot()
    }

    #[test]
    fn test_snapshot_save_load() {
        let fleet = sample_fleet();
        let mut buffer = Vec::new();
        save_snapshot(&mut buffer, &fleet).expect("Save failed");
        let loaded = load_snapshot(&buffer[..]).expect("Load failed");
        assert_eq!(loaded, fleet);
    }

    #[test]
    fn test_snapshot_version_mismatch() {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION + 1,
            fleet: FleetSnapshot::default(),
        };
        let buffer = bincode::serialize(&file).expect("serialize");
        match load_snapshot(&buffer[..]) {
            Err(StoreError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SNAPSHOT_VERSION);
                assert_eq!(found, SNAPSHOT_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_snapshot_is_an_error() {
        let mut buffer = Vec::new();
        save_snapshot(&mut buffer, &sample_fleet()).expect("Save failed");
        buffer.truncate(buffer.len() / 2);
        assert!(matches!(
            load_snapshot(&buffer[..]),
            Err(StoreError::Bincode(_))
        ));
    }

    #[test]
    fn test_json_fixture_without_audit_tables() {
        let json = r#"{
            "devices": [{"id": 1, "name": "Tablet", "units": 4, "weight_g": 1405, "benefit": 40}],
            "drivers": [{"id": 1, "weight_kg": 72.4}],
            "transporters": [{"id": 1, "capacity_kg": 1100.0}]
        }"#;
        let fleet = load_fleet_json(json).expect("parse");
        assert_eq!(fleet.devices.len(), 1);
        assert!(fleet.loads.is_empty());

        let again = load_fleet_json(&fleet_to_json(&fleet).expect("print")).expect("reparse");
        assert_eq!(again, fleet);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            load_fleet_json("{not json"),
            Err(StoreError::Json(_))
        ));
    }
}
