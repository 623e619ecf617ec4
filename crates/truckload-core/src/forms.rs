//! Lenient parsing of operator-entered fields.
//!
//! Edit screens hand over raw text. Numbers that do not parse become 0,
//! which validation later rejects where 0 is meaningless (weights, benefit,
//! capacity). Labels have `"` replaced by `'`.

use serde::{Deserialize, Serialize};

use crate::store::DeviceDraft;

/// Parse a whole, non-negative count. Anything else is 0.
pub fn parse_count(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

/// Parse a mass in kilograms. Accepts a decimal comma. Anything
/// unparsable, negative or non-finite is 0.
pub fn parse_mass_kg(raw: &str) -> f64 {
    let value = raw.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

pub fn sanitize_label(raw: &str) -> String {
    raw.trim().replace('"', "'")
}

/// Raw text of the device edit form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceForm {
    pub name: String,
    pub units: String,
    pub weight_g: String,
    pub benefit: String,
}

impl DeviceForm {
    pub fn to_draft(&self) -> DeviceDraft {
        DeviceDraft {
            name: sanitize_label(&self.name),
            units: parse_count(&self.units),
            weight_g: parse_count(&self.weight_g),
            benefit: parse_count(&self.benefit),
        }
    }
}
