//! Packing priority — most benefit per gram first.
//!
//! The planner expects its device list already in this order. Ratios are
//! compared by cross-multiplication so no precision is lost and equal ratios
//! keep their input order.

use std::cmp::Ordering;

use crate::records::Device;

/// Compare two devices by `weight / benefit`, ascending.
///
/// Devices with zero benefit sort last; validation rejects them before a run.
pub fn compare_ratio(a: &Device, b: &Device) -> Ordering {
    match (a.benefit, b.benefit) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        _ => {
            let lhs = a.weight_g as u64 * b.benefit as u64;
            let rhs = b.weight_g as u64 * a.benefit as u64;
            lhs.cmp(&rhs)
        }
    }
}

/// Stable sort into packing priority order.
pub fn sort_by_priority(devices: &mut [Device]) {
    devices.sort_by(compare_ratio);
}

/// Whether `devices` is already in packing priority order.
pub fn is_priority_ordered(devices: &[Device]) -> bool {
    devices
        .windows(2)
        .all(|w| compare_ratio(&w[0], &w[1]) != Ordering::Greater)
}
