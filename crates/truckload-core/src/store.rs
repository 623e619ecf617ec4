//! Record store — where devices, drivers and transporters live between runs.
//!
//! The planner never touches a store directly. The [`crate::depot::Depot`]
//! reads all records at the start of a run and writes back device stock plus
//! the audit trail (which driver drove which transporter, what was loaded)
//! after a successful run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use truckload_logic::records::{Device, DeviceId, Driver, DriverId, Transporter, TransporterId};

/// Fields of a device before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDraft {
    pub name: String,
    pub units: u32,
    pub weight_g: u32,
    pub benefit: u32,
}

/// Driver-to-transporter assignment from the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub driver: DriverId,
    pub transporter: TransporterId,
}

/// One load line from the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRecord {
    pub device: DeviceId,
    pub transporter: TransporterId,
    pub units: u32,
}

/// Errors that can occur while reading or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    DeviceNotFound(DeviceId),
    #[error("{0} not found")]
    DriverNotFound(DriverId),
    #[error("{0} not found")]
    TransporterNotFound(TransporterId),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Read-all / insert / update-by-id / delete-by-id over the three record
/// tables, plus the audit tables written after each run.
///
/// Read-all returns records in id order.
pub trait RecordStore {
    fn devices(&self) -> Result<Vec<Device>, StoreError>;
    fn insert_device(&mut self, draft: DeviceDraft) -> Result<Device, StoreError>;
    fn update_device(&mut self, device: &Device) -> Result<(), StoreError>;
    fn delete_device(&mut self, id: DeviceId) -> Result<(), StoreError>;
    fn clear_devices(&mut self) -> Result<(), StoreError>;

    fn drivers(&self) -> Result<Vec<Driver>, StoreError>;
    fn insert_driver(&mut self, weight_kg: f64) -> Result<Driver, StoreError>;
    fn update_driver(&mut self, driver: &Driver) -> Result<(), StoreError>;
    fn delete_driver(&mut self, id: DriverId) -> Result<(), StoreError>;
    fn clear_drivers(&mut self) -> Result<(), StoreError>;

    fn transporters(&self) -> Result<Vec<Transporter>, StoreError>;
    fn insert_transporter(&mut self, capacity_kg: f64) -> Result<Transporter, StoreError>;
    fn update_transporter(&mut self, transporter: &Transporter) -> Result<(), StoreError>;
    fn delete_transporter(&mut self, id: TransporterId) -> Result<(), StoreError>;
    fn clear_transporters(&mut self) -> Result<(), StoreError>;

    fn assignments(&self) -> Result<Vec<Assignment>, StoreError>;
    fn loads(&self) -> Result<Vec<LoadRecord>, StoreError>;
    fn record_assignment(&mut self, assignment: Assignment) -> Result<(), StoreError>;
    fn record_load(&mut self, load: LoadRecord) -> Result<(), StoreError>;
    /// Drop the previous run's assignments and loads.
    fn clear_audit(&mut self) -> Result<(), StoreError>;

    /// Overwrite the available stock of one device.
    fn set_device_units(&mut self, id: DeviceId, units: u32) -> Result<(), StoreError> {
        let mut device = self
            .devices()?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::DeviceNotFound(id))?;
        device.units = units;
        self.update_device(&device)
    }

    /// Replace the audit trail with one run's records and write back stock.
    ///
    /// The default implementation issues one call per record and is not
    /// atomic: if a write fails part-way, earlier writes stay. Stores that
    /// can fail should override it with a transactional version.
    fn commit_run(&mut self, run: &RunRecords) -> Result<(), StoreError> {
        self.clear_audit()?;
        for assignment in &run.assignments {
            self.record_assignment(*assignment)?;
        }
        for load in &run.loads {
            self.record_load(*load)?;
        }
        for &(id, units) in &run.stock {
            self.set_device_units(id, units)?;
        }
        Ok(())
    }
}

/// Everything one successful run writes back to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRecords {
    pub assignments: Vec<Assignment>,
    pub loads: Vec<LoadRecord>,
    /// Remaining units per device.
    pub stock: Vec<(DeviceId, u32)>,
}

/// Everything a store holds, as plain data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub devices: Vec<Device>,
    pub drivers: Vec<Driver>,
    pub transporters: Vec<Transporter>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub loads: Vec<LoadRecord>,
}

/// In-memory store keyed by id. Ids start at 1 and are never reused.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    devices: BTreeMap<u32, Device>,
    drivers: BTreeMap<u32, Driver>,
    transporters: BTreeMap<u32, Transporter>,
    assignments: Vec<Assignment>,
    loads: Vec<LoadRecord>,
    next_device: u32,
    next_driver: u32,
    next_transporter: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            drivers: BTreeMap::new(),
            transporters: BTreeMap::new(),
            assignments: Vec::new(),
            loads: Vec::new(),
            next_device: 1,
            next_driver: 1,
            next_transporter: 1,
        }
    }

    /// Build a store from a snapshot, keeping the snapshot's ids.
    pub fn from_snapshot(snapshot: FleetSnapshot) -> Self {
        let mut store = Self::new();
        for d in snapshot.devices {
            store.next_device = store.next_device.max(d.id.0 + 1);
            store.devices.insert(d.id.0, d);
        }
        for e in snapshot.drivers {
            store.next_driver = store.next_driver.max(e.id.0 + 1);
            store.drivers.insert(e.id.0, e);
        }
        for t in snapshot.transporters {
            store.next_transporter = store.next_transporter.max(t.id.0 + 1);
            store.transporters.insert(t.id.0, t);
        }
        store.assignments = snapshot.assignments;
        store.loads = snapshot.loads;
        store
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            devices: self.devices.values().cloned().collect(),
            drivers: self.drivers.values().cloned().collect(),
            transporters: self.transporters.values().cloned().collect(),
            assignments: self.assignments.clone(),
            loads: self.loads.clone(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn devices(&self) -> Result<Vec<Device>, StoreError> {
        Ok(self.devices.values().cloned().collect())
    }

    fn insert_device(&mut self, draft: DeviceDraft) -> Result<Device, StoreError> {
        let device = Device {
            id: DeviceId(self.next_device),
            name: draft.name,
            units: draft.units,
            weight_g: draft.weight_g,
            benefit: draft.benefit,
        };
        self.next_device += 1;
        self.devices.insert(device.id.0, device.clone());
        Ok(device)
    }

    fn update_device(&mut self, device: &Device) -> Result<(), StoreError> {
        let slot = self
            .devices
            .get_mut(&device.id.0)
            .ok_or(StoreError::DeviceNotFound(device.id))?;
        *slot = device.clone();
        Ok(())
    }

    fn delete_device(&mut self, id: DeviceId) -> Result<(), StoreError> {
        self.devices
            .remove(&id.0)
            .map(|_| ())
            .ok_or(StoreError::DeviceNotFound(id))
    }

    fn clear_devices(&mut self) -> Result<(), StoreError> {
        self.devices.clear();
        Ok(())
    }

    fn drivers(&self) -> Result<Vec<Driver>, StoreError> {
        Ok(self.drivers.values().cloned().collect())
    }

    fn insert_driver(&mut self, weight_kg: f64) -> Result<Driver, StoreError> {
        let driver = Driver::new(self.next_driver, weight_kg);
        self.next_driver += 1;
        self.drivers.insert(driver.id.0, driver.clone());
        Ok(driver)
    }

    fn update_driver(&mut self, driver: &Driver) -> Result<(), StoreError> {
        let slot = self
            .drivers
            .get_mut(&driver.id.0)
            .ok_or(StoreError::DriverNotFound(driver.id))?;
        *slot = driver.clone();
        Ok(())
    }

    fn delete_driver(&mut self, id: DriverId) -> Result<(), StoreError> {
        self.drivers
            .remove(&id.0)
            .map(|_| ())
            .ok_or(StoreError::DriverNotFound(id))
    }

    fn clear_drivers(&mut self) -> Result<(), StoreError> {
        self.drivers.clear();
        Ok(())
    }

    fn transporters(&self) -> Result<Vec<Transporter>, StoreError> {
        Ok(self.transporters.values().cloned().collect())
    }

    fn insert_transporter(&mut self, capacity_kg: f64) -> Result<Transporter, StoreError> {
        let transporter = Transporter::new(self.next_transporter, capacity_kg);
        self.next_transporter += 1;
        self.transporters
            .insert(transporter.id.0, transporter.clone());
        Ok(transporter)
    }

    fn update_transporter(&mut self, transporter: &Transporter) -> Result<(), StoreError> {
        let slot = self
            .transporters
            .get_mut(&transporter.id.0)
            .ok_or(StoreError::TransporterNotFound(transporter.id))?;
        *slot = transporter.clone();
        Ok(())
    }

    fn delete_transporter(&mut self, id: TransporterId) -> Result<(), StoreError> {
        self.transporters
            .remove(&id.0)
            .map(|_| ())
            .ok_or(StoreError::TransporterNotFound(id))
    }

    fn clear_transporters(&mut self) -> Result<(), StoreError> {
        self.transporters.clear();
        Ok(())
    }

    fn assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        Ok(self.assignments.clone())
    }

    fn loads(&self) -> Result<Vec<LoadRecord>, StoreError> {
        Ok(self.loads.clone())
    }

    fn record_assignment(&mut self, assignment: Assignment) -> Result<(), StoreError> {
        self.assignments.push(assignment);
        Ok(())
    }

    fn record_load(&mut self, load: LoadRecord) -> Result<(), StoreError> {
        self.loads.push(load);
        Ok(())
    }

    fn clear_audit(&mut self) -> Result<(), StoreError> {
        self.assignments.clear();
        self.loads.clear();
        Ok(())
    }

    fn set_device_units(&mut self, id: DeviceId, units: u32) -> Result<(), StoreError> {
        let device = self
            .devices
            .get_mut(&id.0)
            .ok_or(StoreError::DeviceNotFound(id))?;
        device.units = units;
        Ok(())
    }

    fn commit_run(&mut self, run: &RunRecords) -> Result<(), StoreError> {
        if let Some(&(id, _)) = run
            .stock
            .iter()
            .find(|(id, _)| !self.devices.contains_key(&id.0))
        {
            return Err(StoreError::DeviceNotFound(id));
        }
        self.assignments = run.assignments.clone();
        self.loads = run.loads.clone();
        for &(id, units) in &run.stock {
            if let Some(device) = self.devices.get_mut(&id.0) {
                device.units = units;
            }
        }
        Ok(())
    }
}
