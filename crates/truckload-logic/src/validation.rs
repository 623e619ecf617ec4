//! Input validation for an allocation run.
//!
//! Every record is checked before the planner touches the pool, so a run
//! either starts from fully valid input or does not start at all.

use std::collections::HashSet;

use thiserror::Error;

use crate::records::{Device, DeviceId, Driver, DriverId, Transporter, TransporterId};

/// A record that cannot take part in allocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Unit weight of zero makes `units that fit` undefined.
    #[error("{0} has zero weight")]
    ZeroDeviceWeight(DeviceId),
    /// Zero benefit makes the weight/benefit ratio undefined.
    #[error("{0} has zero benefit")]
    ZeroDeviceBenefit(DeviceId),
    /// The same device id appears twice in the pool.
    #[error("{0} appears more than once")]
    DuplicateDevice(DeviceId),
    /// Capacity must be finite and at least one whole gram.
    #[error("{0} has invalid capacity {1} kg")]
    InvalidCapacity(TransporterId, f64),
    /// Driver weight must be finite and at least one whole gram.
    #[error("{0} has invalid weight {1} kg")]
    InvalidDriverWeight(DriverId, f64),
    /// Packing every unit of every device would overflow the benefit total.
    #[error("total benefit of the pool exceeds {}", u64::MAX)]
    BenefitOverflow,
}

/// Validate all inputs of a run, returning every error found.
pub fn validate_inputs(
    devices: &[Device],
    transporters: &[Transporter],
    drivers: &[Driver],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut benefit_bound = Some(0u64);

    for d in devices {
        benefit_bound =
            benefit_bound.and_then(|sum| sum.checked_add(d.units as u64 * d.benefit as u64));
        if d.weight_g == 0 {
            errors.push(ValidationError::ZeroDeviceWeight(d.id));
        }
        if d.benefit == 0 {
            errors.push(ValidationError::ZeroDeviceBenefit(d.id));
        }
        if !seen.insert(d.id) {
            errors.push(ValidationError::DuplicateDevice(d.id));
        }
    }

    if benefit_bound.is_none() {
        errors.push(ValidationError::BenefitOverflow);
    }

    // Checked in grams, the unit the planner works in.
    for t in transporters {
        if !t.capacity_kg.is_finite() || t.capacity_g() <= 0 {
            errors.push(ValidationError::InvalidCapacity(t.id, t.capacity_kg));
        }
    }

    for e in drivers {
        if !e.weight_kg.is_finite() || e.weight_g() <= 0 {
            errors.push(ValidationError::InvalidDriverWeight(e.id, e.weight_kg));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_inputs_pass() {
        let devices = vec![Device::new(1, "Tablet", 5, 1400, 40)];
        let transporters = vec![Transporter::new(1, 1100.0)];
        let drivers = vec![Driver::new(1, 72.4)];
        assert!(validate_inputs(&devices, &transporters, &drivers).is_empty());
    }

    #[test]
    fn test_empty_inputs_pass() {
        assert!(validate_inputs(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let devices = vec![
            Device::new(1, "Broken", 5, 0, 0),
            Device::new(1, "Duplicate", 5, 100, 1),
        ];
        let transporters = vec![Transporter::new(4, 0.0), Transporter::new(5, f64::NAN)];
        let drivers = vec![Driver::new(9, -3.0)];
        let errors = validate_inputs(&devices, &transporters, &drivers);
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::ZeroDeviceWeight(DeviceId(1))));
        assert!(errors.contains(&ValidationError::ZeroDeviceBenefit(DeviceId(1))));
        assert!(errors.contains(&ValidationError::DuplicateDevice(DeviceId(1))));
        assert!(errors.contains(&ValidationError::InvalidCapacity(TransporterId(4), 0.0)));
        assert!(errors.contains(&ValidationError::InvalidDriverWeight(DriverId(9), -3.0)));
    }

    #[test]
    fn test_sub_gram_masses_are_rejected() {
        let transporters = vec![Transporter::new(1, 0.0004), Transporter::new(2, 0.0006)];
        let drivers = vec![Driver::new(1, 0.0002)];
        let errors = validate_inputs(&[], &transporters, &drivers);
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidCapacity(TransporterId(1), 0.0004),
                ValidationError::InvalidDriverWeight(DriverId(1), 0.0002),
            ]
        );
    }

    #[test]
    fn test_benefit_overflow_is_rejected() {
        let devices = vec![
            Device::new(1, "Heavy hitter", u32::MAX, 1, u32::MAX),
            Device::new(2, "Heavy hitter", u32::MAX, 1, u32::MAX),
        ];
        let errors = validate_inputs(&devices, &[], &[]);
        assert_eq!(errors, vec![ValidationError::BenefitOverflow]);

        // One such device alone still fits in the total.
        assert!(validate_inputs(&devices[..1], &[], &[]).is_empty());
    }

    #[test]
    fn test_error_messages() {
        let e = ValidationError::ZeroDeviceWeight(DeviceId(2));
        assert_eq!(e.to_string(), "device #2 has zero weight");
    }
}
