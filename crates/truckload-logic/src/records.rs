//! Fleet records — devices, drivers, transporters.
//!
//! These are the rows the record store hands to the planner at the start of
//! a run. They carry no derived state; everything the planner computes lives
//! in [`crate::allocator::TransporterLoad`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::kg_to_grams;

/// Store-assigned device identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

/// Store-assigned driver identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriverId(pub u32);

/// Store-assigned transporter identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransporterId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device #{}", self.0)
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver #{}", self.0)
    }
}

impl fmt::Display for TransporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transporter #{}", self.0)
    }
}

/// Display category derived from a device's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Smartphone,
    Tablet,
    Notebook,
}

impl DeviceKind {
    /// Classify a device name. Anything not recognised is a notebook.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("mobiltelefon") || lower.contains("phone") {
            Self::Smartphone
        } else if lower.contains("tablet") {
            Self::Tablet
        } else {
            Self::Notebook
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Smartphone => "smartphone",
            Self::Tablet => "tablet",
            Self::Notebook => "notebook",
        }
    }
}

/// A device type with a stock of available units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// Units still available. Decremented as the planner packs them.
    pub units: u32,
    /// Weight of one unit in grams.
    pub weight_g: u32,
    /// Abstract utility score of one unit.
    pub benefit: u32,
}

impl Device {
    pub fn new(id: u32, name: impl Into<String>, units: u32, weight_g: u32, benefit: u32) -> Self {
        Self {
            id: DeviceId(id),
            name: name.into(),
            units,
            weight_g,
            benefit,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        DeviceKind::from_name(&self.name)
    }

    /// Remove `units` from the available stock.
    pub fn take(&mut self, units: u32) {
        self.units = self.units.saturating_sub(units);
    }
}

/// A driver who occupies part of a transporter's capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub weight_kg: f64,
}

impl Driver {
    pub fn new(id: u32, weight_kg: f64) -> Self {
        Self {
            id: DriverId(id),
            weight_kg,
        }
    }

    pub fn weight_g(&self) -> i64 {
        kg_to_grams(self.weight_kg)
    }
}

/// A vehicle with a total mass capacity (driver plus cargo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transporter {
    pub id: TransporterId,
    pub capacity_kg: f64,
}

impl Transporter {
    pub fn new(id: u32, capacity_kg: f64) -> Self {
        Self {
            id: TransporterId(id),
            capacity_kg,
        }
    }

    pub fn capacity_g(&self) -> i64 {
        kg_to_grams(self.capacity_kg)
    }
}
