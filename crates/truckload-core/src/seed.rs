//! Stock data for a fresh depot.
//!
//! Each reset clears one table and refills it, so an operator can restore
//! devices without touching drivers, and so on.

use crate::persistence::load_fleet_json;
use crate::store::{DeviceDraft, FleetSnapshot, RecordStore, StoreError};

/// The stock fleet as a JSON fixture.
pub const STOCK_FLEET_JSON: &str = include_str!("../../../data/default_fleet.json");

/// Parse [`STOCK_FLEET_JSON`].
pub fn stock_fleet() -> Result<FleetSnapshot, StoreError> {
    load_fleet_json(STOCK_FLEET_JSON)
}

pub fn reset_devices<S: RecordStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let stock = stock_fleet()?;
    store.clear_devices()?;
    for device in stock.devices {
        store.insert_device(DeviceDraft {
            name: device.name,
            units: device.units,
            weight_g: device.weight_g,
            benefit: device.benefit,
        })?;
    }
    Ok(())
}

pub fn reset_drivers<S: RecordStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let stock = stock_fleet()?;
    store.clear_drivers()?;
    for driver in stock.drivers {
        store.insert_driver(driver.weight_kg)?;
    }
    Ok(())
}

pub fn reset_transporters<S: RecordStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    let stock = stock_fleet()?;
    store.clear_transporters()?;
    for transporter in stock.transporters {
        store.insert_transporter(transporter.capacity_kg)?;
    }
    Ok(())
}

/// Reset all three tables and drop the audit trail.
pub fn seed_defaults<S: RecordStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    reset_devices(store)?;
    reset_drivers(store)?;
    reset_transporters(store)?;
    store.clear_audit()
}
