//! Radio/optical link figures for a pair of tracked objects.

use serde::{Deserialize, Serialize};

use crate::geometry::distance::distance;
use crate::geometry::los::{is_clear, LosResult};
use crate::geometry::occlusion::OcclusionModel;
use crate::geometry::vector::{dot, Vector3};

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;
/// Carrier frequency used when none is configured, in MHz.
pub const DEFAULT_FREQUENCY_MHZ: f64 = 100.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    pub frequency_mhz: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinkReport {
    pub range_km: f64,
    pub los: LosResult,
    /// Free-space path loss in dB. Undefined (negative infinity) at zero range.
    pub path_loss_db: f64,
    /// One-way propagation delay in milliseconds.
    pub delay_ms: f64,
    /// Rate of change of range in km/s; positive when separating.
    pub range_rate_km_s: Option<f64>,
    pub doppler_hz: Option<f64>,
}

/// `FSPL(dB) = 32.45 + 20·log10(f_MHz) + 20·log10(d_km)`
pub fn free_space_path_loss_db(range_km: f64, frequency_mhz: f64) -> f64 {
    32.45 + 20.0 * frequency_mhz.log10() + 20.0 * range_km.log10()
}

pub fn propagation_delay_ms(range_km: f64) -> f64 {
    range_km / SPEED_OF_LIGHT_KM_S * 1000.0
}

/// Relative velocity projected onto the line from `a` to `b`.
pub fn range_rate(a: Vector3, b: Vector3, velocity_a: Vector3, velocity_b: Vector3) -> f64 {
    let los = b - a;
    let range = los.magnitude();
    if range == 0.0 {
        return 0.0;
    }
    dot(velocity_b - velocity_a, los) / range
}

/// Doppler shift in Hz; approaching objects (negative range rate) shift up.
pub fn doppler_shift_hz(range_rate_km_s: f64, frequency_mhz: f64) -> f64 {
    -frequency_mhz * 1e6 * range_rate_km_s / SPEED_OF_LIGHT_KM_S
}

pub fn analyze_link(
    a: Vector3,
    b: Vector3,
    model: &OcclusionModel,
    config: &LinkConfig,
) -> LinkReport {
    let range_km = distance(a, b);
    LinkReport {
        range_km,
        los: is_clear(a, b, model),
        path_loss_db: free_space_path_loss_db(range_km, config.frequency_mhz),
        delay_ms: propagation_delay_ms(range_km),
        range_rate_km_s: None,
        doppler_hz: None,
    }
}

pub fn analyze_link_with_velocity(
    a: Vector3,
    b: Vector3,
    velocity_a: Vector3,
    velocity_b: Vector3,
    model: &OcclusionModel,
    config: &LinkConfig,
) -> LinkReport {
    let rate = range_rate(a, b, velocity_a, velocity_b);
    LinkReport {
        range_rate_km_s: Some(rate),
        doppler_hz: Some(doppler_shift_hz(rate, config.frequency_mhz)),
        ..analyze_link(a, b, model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn path_loss_at_100_mhz() {
        // 72.45 dB + 20 log10(d)
        assert_approx_eq!(free_space_path_loss_db(1000.0, 100.0), 132.45, 1e-9);
        assert_approx_eq!(free_space_path_loss_db(1.0, 100.0), 72.45, 1e-9);
    }

    #[test]
    fn delay_of_one_light_millisecond() {
        assert_approx_eq!(propagation_delay_ms(299.792458), 1.0, 1e-12);
    }

    #[test]
    fn head_on_objects_close_and_shift_up() {
        let a = Vector3::new(7000.0, 0.0, 0.0);
        let b = Vector3::new(7000.0, 1000.0, 0.0);
        let va = Vector3::new(0.0, 3.0, 0.0);
        let vb = Vector3::new(0.0, -4.0, 0.0);
        let report = analyze_link_with_velocity(
            a,
            b,
            va,
            vb,
            &OcclusionModel::earth(),
            &LinkConfig::default(),
        );
        assert_eq!(report.los, LosResult::Clear);
        assert_approx_eq!(report.range_km, 1000.0);
        let rate = report.range_rate_km_s.unwrap();
        assert_approx_eq!(rate, -7.0);
        assert_approx_eq!(report.doppler_hz.unwrap(), 100e6 * 7.0 / SPEED_OF_LIGHT_KM_S, 1e-6);
    }

    #[test]
    fn perpendicular_motion_has_no_range_rate() {
        let a = Vector3::new(7000.0, 0.0, 0.0);
        let b = Vector3::new(-7000.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 0.0, 7.5);
        assert_eq!(range_rate(a, b, v, -v), 0.0);
    }

    #[test]
    fn zero_range_has_zero_rate() {
        let a = Vector3::new(7000.0, 0.0, 0.0);
        assert_eq!(range_rate(a, a, Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn blocked_link_still_reports_range() {
        let report = analyze_link(
            Vector3::new(10000.0, 0.0, 0.0),
            Vector3::new(-10000.0, 0.0, 0.0),
            &OcclusionModel::earth(),
            &LinkConfig::default(),
        );
        assert_eq!(report.los, LosResult::Blocked);
        assert_approx_eq!(report.range_km, 20000.0);
        assert!(report.range_rate_km_s.is_none());
    }
}
