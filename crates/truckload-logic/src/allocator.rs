//! Greedy load allocation.
//!
//! Transporters are filled one after another. Each one first takes the next
//! driver from the pool, then packs as many units as fit of every device in
//! priority order. Units packed onto one transporter are gone for the next:
//! the [`DevicePool`] is the reservation state and is threaded through every
//! step by `&mut`.
//!
//! ```
//! use truckload_logic::allocator::{allocate, DevicePool};
//! use truckload_logic::config::PackingConfig;
//! use truckload_logic::records::{Device, Driver, Transporter};
//!
//! let mut pool = DevicePool::new(vec![Device::new(1, "Tablet", 3, 1000, 50)]);
//! let plan = allocate(
//!     &mut pool,
//!     &[Transporter::new(1, 5.0)],
//!     &[Driver::new(1, 1.0)],
//!     &PackingConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(plan.loads[0].benefit_total, 150);
//! assert_eq!(plan.loads[0].remaining_capacity_g(), 1000);
//! assert_eq!(pool.devices()[0].units, 0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{DriverPolicy, PackingConfig};
use crate::priority::is_priority_ordered;
use crate::records::{Device, DeviceId, Driver, DriverId, Transporter, TransporterId};
use crate::units::units_that_fit;
use crate::validation::{validate_inputs, ValidationError};

/// Ordered devices with their remaining stock for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePool {
    devices: Vec<Device>,
}

impl DevicePool {
    /// Wrap devices that are already in packing priority order.
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Units left across all devices.
    pub fn total_units(&self) -> u64 {
        self.devices.iter().map(|d| d.units as u64).sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.devices.iter().all(|d| d.units == 0)
    }

    pub fn into_devices(self) -> Vec<Device> {
        self.devices
    }
}

/// One line of a transporter's load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadEntry {
    pub device: DeviceId,
    /// Device name at pack time, for manifests.
    pub name: String,
    pub units: u32,
    pub unit_weight_g: u32,
    pub unit_benefit: u32,
}

impl LoadEntry {
    pub fn weight_g(&self) -> u64 {
        self.unit_weight_g as u64 * self.units as u64
    }

    pub fn benefit(&self) -> u64 {
        self.unit_benefit as u64 * self.units as u64
    }
}

/// Result of loading one transporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransporterLoad {
    pub transporter: TransporterId,
    /// `None` when the driver pool was empty and the transporter was skipped.
    pub driver: Option<DriverId>,
    /// Total capacity in grams.
    pub capacity_g: i64,
    /// Capacity left after driver and cargo. Negative when the driver alone
    /// outweighs the transporter.
    pub remaining_g: i64,
    pub benefit_total: u64,
    /// Entries in pack order.
    pub entries: Vec<LoadEntry>,
}

impl TransporterLoad {
    /// An empty load for a transporter that received no driver.
    pub fn unassigned(transporter: &Transporter) -> Self {
        let capacity_g = transporter.capacity_g();
        Self {
            transporter: transporter.id,
            driver: None,
            capacity_g,
            remaining_g: capacity_g,
            benefit_total: 0,
            entries: Vec::new(),
        }
    }

    /// Free capacity in grams, never below zero.
    pub fn remaining_capacity_g(&self) -> i64 {
        self.remaining_g.max(0)
    }

    /// Mass of all packed devices in grams.
    pub fn cargo_g(&self) -> u64 {
        self.entries.iter().map(LoadEntry::weight_g).sum()
    }

    pub fn units_of(&self, device: DeviceId) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.device == device)
            .map(|e| e.units)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Non-fatal, per-transporter finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// The driver pool ran out before this transporter.
    NoDriverAvailable(TransporterId),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDriverAvailable(t) => write!(f, "no driver available for {}", t),
        }
    }
}

/// Loads for every transporter of a run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub loads: Vec<TransporterLoad>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AllocationPlan {
    pub fn total_benefit(&self) -> u64 {
        self.loads.iter().map(|l| l.benefit_total).sum()
    }

    /// Units of `device` packed across all transporters.
    pub fn units_packed(&self, device: DeviceId) -> u64 {
        self.loads.iter().map(|l| l.units_of(device) as u64).sum()
    }

    /// Transporters left without a driver.
    pub fn unfulfilled(&self) -> Vec<TransporterId> {
        self.diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::NoDriverAvailable(t) => *t,
            })
            .collect()
    }

    /// Whether every transporter received a driver.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Reasons a run does not start. Nothing is mutated when these are returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("invalid input: {}", format_errors(.0))]
    Invalid(Vec<ValidationError>),
    #[error("{drivers} drivers for {transporters} transporters")]
    DriversExhausted { transporters: usize, drivers: usize },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load one transporter with `driver`, consuming units from `pool`.
///
/// Expects input that passed [`validate_inputs`]; the benefit total
/// saturates rather than wrapping when it did not.
pub fn load_transporter(
    pool: &mut DevicePool,
    transporter: &Transporter,
    driver: &Driver,
) -> TransporterLoad {
    let capacity_g = transporter.capacity_g();
    let mut load = TransporterLoad {
        transporter: transporter.id,
        driver: Some(driver.id),
        capacity_g,
        remaining_g: capacity_g - driver.weight_g(),
        benefit_total: 0,
        entries: Vec::new(),
    };

    for device in pool.devices.iter_mut() {
        if device.units == 0 {
            continue;
        }
        let fit = units_that_fit(load.remaining_g, device.weight_g);
        let take = fit.min(device.units as u64) as u32;
        if take == 0 {
            continue;
        }

        let entry = LoadEntry {
            device: device.id,
            name: device.name.clone(),
            units: take,
            unit_weight_g: device.weight_g,
            unit_benefit: device.benefit,
        };
        load.benefit_total = load.benefit_total.saturating_add(entry.benefit());
        load.remaining_g -= entry.weight_g() as i64;
        device.take(take);
        log::debug!(
            "{}: packed {} x {} ({} g left)",
            transporter.id,
            take,
            device.name,
            load.remaining_g
        );
        load.entries.push(entry);
    }

    load
}

/// Run the greedy allocation over all transporters.
///
/// `pool` must be in packing priority order (see
/// [`crate::priority::sort_by_priority`]). Drivers are assigned one per
/// transporter in slice order. On success the pool holds whatever was not
/// packed; on error it is untouched.
pub fn allocate(
    pool: &mut DevicePool,
    transporters: &[Transporter],
    drivers: &[Driver],
    config: &PackingConfig,
) -> Result<AllocationPlan, AllocationError> {
    let errors = validate_inputs(pool.devices(), transporters, drivers);
    if !errors.is_empty() {
        return Err(AllocationError::Invalid(errors));
    }
    if config.driver_policy == DriverPolicy::Strict && drivers.len() < transporters.len() {
        return Err(AllocationError::DriversExhausted {
            transporters: transporters.len(),
            drivers: drivers.len(),
        });
    }
    if !is_priority_ordered(pool.devices()) {
        log::debug!("device pool is not in priority order; packing in given order");
    }

    let mut plan = AllocationPlan::default();
    let mut available = drivers.iter();

    for transporter in transporters {
        let Some(driver) = available.next() else {
            log::warn!("no driver available for {}", transporter.id);
            plan.diagnostics
                .push(Diagnostic::NoDriverAvailable(transporter.id));
            plan.loads.push(TransporterLoad::unassigned(transporter));
            continue;
        };
        plan.loads.push(load_transporter(pool, transporter, driver));
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::priority::sort_by_priority;

    fn run(
        devices: Vec<Device>,
        transporters: &[Transporter],
        drivers: &[Driver],
    ) -> (AllocationPlan, DevicePool) {
        let mut pool = DevicePool::new(devices);
        let plan = allocate(&mut pool, transporters, drivers, &PackingConfig::default())
            .expect("valid input");
        (plan, pool)
    }

    #[derive(Deserialize)]
    struct Fleet {
        devices: Vec<Device>,
        transporters: Vec<Transporter>,
        drivers: Vec<Driver>,
    }

    fn stock_fleet() -> (Vec<Device>, Vec<Transporter>, Vec<Driver>) {
        let fleet: Fleet =
            serde_json::from_str(include_str!("../../../data/default_fleet.json")).unwrap();
        let mut devices = fleet.devices;
        sort_by_priority(&mut devices);
        (devices, fleet.transporters, fleet.drivers)
    }

    #[test]
    fn test_single_transporter_scenario() {
        let (plan, pool) = run(
            vec![Device::new(1, "Tablet", 3, 1000, 50)],
            &[Transporter::new(1, 5.0)],
            &[Driver::new(1, 1.0)],
        );
        let load = &plan.loads[0];
        assert_eq!(load.entries.len(), 1);
        assert_eq!(load.entries[0].units, 3);
        assert_eq!(load.benefit_total, 150);
        assert_eq!(load.remaining_capacity_g(), 1000);
        assert_eq!(load.driver, Some(DriverId(1)));
        assert_eq!(pool.devices()[0].units, 0);
        assert!(plan.is_complete());
    }

    #[test]
    fn test_second_transporter_gets_remainder() {
        let (plan, pool) = run(
            vec![Device::new(1, "Tablet", 5, 1000, 10)],
            &[Transporter::new(1, 4.0), Transporter::new(2, 4.0)],
            &[Driver::new(1, 1.0), Driver::new(2, 1.0)],
        );
        assert_eq!(plan.loads[0].entries[0].units, 3);
        assert_eq!(plan.loads[0].remaining_capacity_g(), 0);
        assert_eq!(plan.loads[1].entries[0].units, 2);
        assert_eq!(plan.loads[1].benefit_total, 20);
        assert_eq!(plan.loads[1].remaining_capacity_g(), 1000);
        assert_eq!(pool.devices()[0].units, 0);
    }

    #[test]
    fn test_no_driver_skips_transporter() {
        let (plan, pool) = run(
            vec![Device::new(1, "Tablet", 10, 1000, 10)],
            &[
                Transporter::new(1, 4.0),
                Transporter::new(2, 4.0),
                Transporter::new(3, 4.0),
            ],
            &[Driver::new(1, 1.0)],
        );
        assert_eq!(plan.loads.len(), 3);
        assert_eq!(plan.loads[0].entries[0].units, 3);
        assert!(plan.loads[1].is_empty());
        assert!(plan.loads[2].is_empty());
        assert_eq!(plan.loads[1].driver, None);
        assert_eq!(plan.loads[1].remaining_capacity_g(), 4000);
        assert_eq!(
            plan.unfulfilled(),
            vec![TransporterId(2), TransporterId(3)]
        );
        assert!(!plan.is_complete());
        assert_eq!(pool.devices()[0].units, 7);
    }

    #[test]
    fn test_skip_does_not_affect_later_drivers() {
        // Drivers are consumed in order, so a skip only ever happens at the tail.
        let (plan, _) = run(
            vec![Device::new(1, "Tablet", 10, 1000, 10)],
            &[Transporter::new(1, 2.0), Transporter::new(2, 2.0)],
            &[Driver::new(7, 1.0), Driver::new(8, 1.0)],
        );
        assert_eq!(plan.loads[0].driver, Some(DriverId(7)));
        assert_eq!(plan.loads[1].driver, Some(DriverId(8)));
    }

    #[test]
    fn test_driver_heavier_than_capacity_packs_nothing() {
        let (plan, pool) = run(
            vec![Device::new(1, "Tablet", 10, 100, 10)],
            &[Transporter::new(1, 0.05)],
            &[Driver::new(1, 80.0)],
        );
        let load = &plan.loads[0];
        assert!(load.is_empty());
        assert!(load.remaining_g < 0);
        assert_eq!(load.remaining_capacity_g(), 0);
        assert_eq!(pool.devices()[0].units, 10);
    }

    #[test]
    fn test_exhausted_pool_leaves_later_transporters_empty() {
        let (plan, pool) = run(
            vec![Device::new(1, "Tablet", 2, 1000, 10)],
            &[Transporter::new(1, 10.0), Transporter::new(2, 10.0)],
            &[Driver::new(1, 1.0), Driver::new(2, 1.0)],
        );
        assert_eq!(plan.loads[0].entries[0].units, 2);
        assert!(plan.loads[1].is_empty());
        assert_eq!(plan.loads[1].driver, Some(DriverId(2)));
        assert!(pool.is_exhausted());
    }

    #[test]
    fn test_validation_aborts_without_mutation() {
        let devices = vec![
            Device::new(1, "Good", 5, 100, 10),
            Device::new(2, "Weightless", 5, 0, 10),
        ];
        let mut pool = DevicePool::new(devices.clone());
        let err = allocate(
            &mut pool,
            &[Transporter::new(1, 10.0)],
            &[Driver::new(1, 1.0)],
            &PackingConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AllocationError::Invalid(vec![ValidationError::ZeroDeviceWeight(DeviceId(2))])
        );
        assert_eq!(pool.devices(), devices.as_slice());
    }

    #[test]
    fn test_benefit_overflow_rejected_before_packing() {
        let devices = vec![
            Device::new(1, "Featherweight", u32::MAX, 1, u32::MAX),
            Device::new(2, "Featherweight", u32::MAX, 1, u32::MAX),
        ];
        let mut pool = DevicePool::new(devices.clone());
        let err = allocate(
            &mut pool,
            &[Transporter::new(1, 1e9)],
            &[Driver::new(1, 1.0)],
            &PackingConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AllocationError::Invalid(vec![ValidationError::BenefitOverflow])
        );
        assert_eq!(pool.devices(), devices.as_slice());
    }

    #[test]
    fn test_strict_policy_rejects_missing_drivers() {
        let devices = vec![Device::new(1, "Tablet", 5, 100, 10)];
        let mut pool = DevicePool::new(devices.clone());
        let config = PackingConfig {
            driver_policy: DriverPolicy::Strict,
        };
        let err = allocate(
            &mut pool,
            &[Transporter::new(1, 10.0), Transporter::new(2, 10.0)],
            &[Driver::new(1, 1.0)],
            &config,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AllocationError::DriversExhausted {
                transporters: 2,
                drivers: 1
            }
        );
        assert_eq!(pool.devices(), devices.as_slice());
    }

    #[test]
    fn test_greedy_does_not_look_ahead() {
        // The first device fills the truck even though the second is lighter.
        let (plan, _) = run(
            vec![
                Device::new(1, "big", 1, 3000, 300),
                Device::new(2, "small", 10, 500, 40),
            ],
            &[Transporter::new(1, 4.0)],
            &[Driver::new(1, 0.5)],
        );
        let load = &plan.loads[0];
        assert_eq!(load.entries[0].device, DeviceId(1));
        assert_eq!(load.entries[0].units, 1);
        assert_eq!(load.entries[1].device, DeviceId(2));
        assert_eq!(load.entries[1].units, 1);
        assert_eq!(load.remaining_capacity_g(), 0);
    }

    #[test]
    fn test_stock_fleet_conservation_and_feasibility() {
        let (devices, transporters, drivers) = stock_fleet();
        let (plan, pool) = run(devices.clone(), &transporters, &drivers);

        for d in &devices {
            let left = pool.get(d.id).map(|p| p.units).unwrap_or(0) as u64;
            assert_eq!(d.units as u64, left + plan.units_packed(d.id), "{}", d.name);
        }
        for (load, driver) in plan.loads.iter().zip(&drivers) {
            assert!(load.cargo_g() as i64 + driver.weight_g() <= load.capacity_g);
            assert_eq!(
                load.remaining_g,
                load.capacity_g - driver.weight_g() - load.cargo_g() as i64
            );
        }
        assert!(plan.total_benefit() > 0);
    }

    #[test]
    fn test_stock_fleet_packs_best_ratio_first() {
        let (devices, transporters, drivers) = stock_fleet();
        let (plan, _) = run(devices.clone(), &transporters, &drivers);
        // Mobiltelefon Outdoor (988 g / 60) has the best ratio.
        assert_eq!(plan.loads[0].entries[0].device, DeviceId(5));
        assert_eq!(plan.loads[0].entries[0].units, 157);
    }

    #[test]
    fn test_planning_is_deterministic() {
        let (devices, transporters, drivers) = stock_fleet();
        let (a, pool_a) = run(devices.clone(), &transporters, &drivers);
        let (b, pool_b) = run(devices, &transporters, &drivers);
        assert_eq!(a, b);
        assert_eq!(pool_a, pool_b);
    }

    #[test]
    fn test_load_transporter_step() {
        let mut pool = DevicePool::new(vec![
            Device::new(1, "a", 0, 100, 10),
            Device::new(2, "b", 4, 250, 10),
        ]);
        let load = load_transporter(&mut pool, &Transporter::new(3, 2.0), &Driver::new(1, 1.0));
        assert_eq!(load.entries.len(), 1);
        assert_eq!(load.units_of(DeviceId(2)), 4);
        assert_eq!(load.remaining_capacity_g(), 0);
        assert_eq!(pool.total_units(), 0);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::NoDriverAvailable(TransporterId(2));
        assert_eq!(d.to_string(), "no driver available for transporter #2");
    }
}
