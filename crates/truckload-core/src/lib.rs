//! Truckload Core - record store and allocation runs
//!
//! Holds devices, drivers and transporters between runs and drives the pure
//! planner in `truckload-logic` against them:
//! - **Store**: read-all / insert / update / delete per record type, plus the
//!   audit trail of the last run
//! - **Persistence**: versioned binary snapshots and JSON fixtures
//! - **Depot**: one allocation cycle, read → plan → write back
//!
//! # Example
//!
//! ```rust
//! use truckload_core::prelude::*;
//!
//! let mut store = MemoryStore::new();
//! seed_defaults(&mut store).unwrap();
//!
//! let mut depot = Depot::new(store, PackingConfig::default());
//! let report = depot.run().unwrap();
//! println!("{}", render_plan(&report.plan));
//! ```

pub mod depot;
pub mod forms;
pub mod persistence;
pub mod seed;
pub mod store;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::depot::{Depot, DepotError, RunReport};
    pub use crate::seed::seed_defaults;
    pub use crate::store::{MemoryStore, RecordStore, StoreError};
    pub use truckload_logic::config::PackingConfig;
    pub use truckload_logic::manifest::render_plan;
}
