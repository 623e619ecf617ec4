//! Mass units used by the planner.
//!
//! Records are edited in kilograms (drivers, transporter capacity) and grams
//! (devices). All allocation arithmetic happens in whole grams so that
//! floor division never loses a fraction of a kilogram.

/// Grams per kilogram.
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Convert kilograms to whole grams, rounding to the nearest gram.
///
/// ```
/// use truckload_logic::units::kg_to_grams;
/// assert_eq!(kg_to_grams(72.4), 72_400);
/// assert_eq!(kg_to_grams(1100.0), 1_100_000);
/// ```
pub fn kg_to_grams(kg: f64) -> i64 {
    (kg * GRAMS_PER_KG).round() as i64
}

/// Convert grams back to kilograms for display.
pub fn grams_to_kg(grams: i64) -> f64 {
    grams as f64 / GRAMS_PER_KG
}

/// How many whole units of `unit_weight_g` fit into `remaining_g`.
///
/// A non-positive remainder fits nothing. Division truncates, so the result
/// never overloads.
pub fn units_that_fit(remaining_g: i64, unit_weight_g: u32) -> u64 {
    if remaining_g <= 0 || unit_weight_g == 0 {
        return 0;
    }
    remaining_g as u64 / unit_weight_g as u64
}
