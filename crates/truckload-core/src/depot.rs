//! Depot - runs allocation cycles against a record store

use thiserror::Error;

use truckload_logic::allocator::{allocate, AllocationError, AllocationPlan, DevicePool};
use truckload_logic::config::PackingConfig;
use truckload_logic::priority::sort_by_priority;
use truckload_logic::records::Device;

use crate::store::{Assignment, LoadRecord, RecordStore, RunRecords, StoreError};

/// Errors from a depot run.
#[derive(Debug, Error)]
pub enum DepotError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub plan: AllocationPlan,
    /// Devices after the run, in packing priority order.
    pub remaining: Vec<Device>,
}

/// A record store plus the settings used to plan loads from it.
pub struct Depot<S: RecordStore> {
    store: S,
    config: PackingConfig,
}

impl<S: RecordStore> Depot<S> {
    pub fn new(store: S, config: PackingConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PackingConfig) {
        self.config = config;
    }

    /// Plan loads from the current records without writing anything back.
    pub fn preview(&self) -> Result<RunReport, DepotError> {
        let mut devices = self.store.devices()?;
        let drivers = self.store.drivers()?;
        let transporters = self.store.transporters()?;
        sort_by_priority(&mut devices);

        let mut pool = DevicePool::new(devices);
        let plan = allocate(&mut pool, &transporters, &drivers, &self.config)?;
        Ok(RunReport {
            plan,
            remaining: pool.into_devices(),
        })
    }

    /// Plan loads and commit them: replace the previous audit trail, record
    /// driver assignments and load lines, and write back device stock.
    ///
    /// If planning fails the store is left as it was. Whether a failed write
    /// is rolled back depends on the store's [`RecordStore::commit_run`].
    pub fn run(&mut self) -> Result<RunReport, DepotError> {
        let report = self.preview()?;

        self.store.commit_run(&run_records(&report))?;

        log::info!(
            "Planned {} transporters ({} without driver): total benefit {}, {} units left in stock",
            report.plan.loads.len(),
            report.plan.diagnostics.len(),
            report.plan.total_benefit(),
            report.remaining.iter().map(|d| d.units as u64).sum::<u64>()
        );

        Ok(report)
    }
}

/// Collect the records a run writes back, before touching the store.
fn run_records(report: &RunReport) -> RunRecords {
    let mut records = RunRecords::default();
    for load in &report.plan.loads {
        if let Some(driver) = load.driver {
            records.assignments.push(Assignment {
                driver,
                transporter: load.transporter,
            });
        }
        records
            .loads
            .extend(load.entries.iter().map(|entry| LoadRecord {
                device: entry.device,
                transporter: load.transporter,
                units: entry.units,
            }));
    }
    records.stock = report
        .remaining
        .iter()
        .map(|device| (device.id, device.units))
        .collect();
    records
}
