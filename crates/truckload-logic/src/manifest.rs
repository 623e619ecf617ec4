//! Manifest rendering — loading lists as plain text.
//!
//! The planner only produces data. These helpers turn a
//! [`TransporterLoad`] into the table a dispatcher reads:
//!
//! ```text
//! TRANSPORTER NR.1 (transporter #1, driver #1)
//! +--------+-------+
//! | Device | Units |
//! +--------+-------+
//! | Tablet |     3 |
//! +--------+-------+
//! total benefit: 150
//! free capacity: 1000 g
//! ```

use std::fmt::Write;

use crate::allocator::{AllocationPlan, TransporterLoad};

const DEVICE_HEADER: &str = "Device";
const UNITS_HEADER: &str = "Units";

/// Render one transporter's manifest. `number` is its 1-based position in the run.
pub fn render_manifest(number: usize, load: &TransporterLoad) -> String {
    let mut out = String::new();

    let driver = match load.driver {
        Some(d) => d.to_string(),
        None => "no driver".to_string(),
    };
    let _ = writeln!(
        out,
        "TRANSPORTER NR.{} ({}, {})",
        number, load.transporter, driver
    );

    let rows: Vec<(String, String)> = load
        .entries
        .iter()
        .map(|e| (e.name.clone(), e.units.to_string()))
        .collect();
    let name_w = rows
        .iter()
        .map(|(n, _)| n.chars().count())
        .max()
        .unwrap_or(0)
        .max(DEVICE_HEADER.len());
    let units_w = rows
        .iter()
        .map(|(_, u)| u.len())
        .max()
        .unwrap_or(0)
        .max(UNITS_HEADER.len());

    let rule = format!("+-{}-+-{}-+", "-".repeat(name_w), "-".repeat(units_w));
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "| {:<nw$} | {:<uw$} |",
        DEVICE_HEADER,
        UNITS_HEADER,
        nw = name_w,
        uw = units_w
    );
    let _ = writeln!(out, "{}", rule);
    for (name, units) in &rows {
        let _ = writeln!(
            out,
            "| {:<nw$} | {:>uw$} |",
            name,
            units,
            nw = name_w,
            uw = units_w
        );
    }
    if !rows.is_empty() {
        let _ = writeln!(out, "{}", rule);
    }

    let _ = writeln!(out, "total benefit: {}", load.benefit_total);
    let _ = writeln!(out, "free capacity: {} g", load.remaining_capacity_g());
    out
}

/// Render every manifest of a plan, followed by its diagnostics.
pub fn render_plan(plan: &AllocationPlan) -> String {
    let mut out = String::new();
    for (i, load) in plan.loads.iter().enumerate() {
        out.push_str(&render_manifest(i + 1, load));
        out.push('\n');
    }
    for d in &plan.diagnostics {
        let _ = writeln!(out, "warning: {}", d);
    }
    out
}
