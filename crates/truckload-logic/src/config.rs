//! Allocation settings.
//!
//! ```
//! use truckload_logic::config::{DriverPolicy, PackingConfig};
//!
//! let config: PackingConfig = serde_json::from_str(r#"{"driver_policy":"strict"}"#).unwrap();
//! assert_eq!(config.driver_policy, DriverPolicy::Strict);
//! ```

use serde::{Deserialize, Serialize};

/// What to do when there are fewer drivers than transporters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverPolicy {
    /// Leave driverless transporters empty and report them in the plan.
    #[default]
    SkipAndReport,
    /// Refuse to start the run.
    Strict,
}

/// Settings for one allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    pub driver_policy: DriverPolicy,
}
