use thiserror::Error;

use super::vector::Vector3;

/// WGS84 equatorial radius of the Earth in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.137;
/// Atmosphere band a crosslink must stay above, in kilometres.
pub const ATMOSPHERE_MARGIN_KM: f64 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum OcclusionError {
    #[error("body radius must not be negative (got {0} km)")]
    NegativeRadius(f64),
    #[error("occlusion margin must not be negative (got {0} km)")]
    NegativeMargin(f64),
    #[error("occlusion model parameters must be finite")]
    NonFinite,
}

/// Spherical occluding body: radius plus a safety margin, centred at `center`.
///
/// Fields are private so a model can only exist once validated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OcclusionModel {
    body_radius: f64,
    margin: f64,
    center: Vector3,
}

impl OcclusionModel {
    pub fn new(body_radius: f64, margin: f64) -> Result<Self, OcclusionError> {
        if !body_radius.is_finite() || !margin.is_finite() {
            return Err(OcclusionError::NonFinite);
        }
        if body_radius < 0.0 {
            return Err(OcclusionError::NegativeRadius(body_radius));
        }
        if margin < 0.0 {
            return Err(OcclusionError::NegativeMargin(margin));
        }
        Ok(OcclusionModel {
            body_radius,
            margin,
            center: Vector3::ZERO,
        })
    }

    /// Earth with the 20 km atmosphere band.
    pub fn earth() -> Self {
        OcclusionModel {
            body_radius: EARTH_RADIUS_KM,
            margin: ATMOSPHERE_MARGIN_KM,
            center: Vector3::ZERO,
        }
    }

    /// Places the body at `center` instead of the frame origin.
    pub fn with_center(self, center: Vector3) -> Result<Self, OcclusionError> {
        if !center.is_finite() {
            return Err(OcclusionError::NonFinite);
        }
        Ok(OcclusionModel { center, ..self })
    }

    pub fn body_radius(&self) -> f64 {
        self.body_radius
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub fn center(&self) -> Vector3 {
        self.center
    }

    /// `R = body_radius + margin`.
    pub fn effective_radius(&self) -> f64 {
        self.body_radius + self.margin
    }

    pub fn effective_radius_squared(&self) -> f64 {
        let r = self.effective_radius();
        r * r
    }

    /// Expresses `p` relative to the body center.
    pub fn to_body_frame(&self, p: Vector3) -> Vector3 {
        p - self.center
    }

    /// True when `p` lies strictly inside the occluding volume. Points on the
    /// surface are outside.
    pub fn is_inside(&self, p: Vector3) -> bool {
        self.to_body_frame(p).magnitude_squared() < self.effective_radius_squared()
    }
}

impl Default for OcclusionModel {
    fn default() -> Self {
        OcclusionModel::earth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn earth_effective_radius() {
        assert_approx_eq!(OcclusionModel::earth().effective_radius(), 6398.137);
    }

    #[test]
    fn rejects_negative_parameters() {
        assert_eq!(
            OcclusionModel::new(-1.0, 20.0),
            Err(OcclusionError::NegativeRadius(-1.0))
        );
        assert_eq!(
            OcclusionModel::new(6378.137, -0.5),
            Err(OcclusionError::NegativeMargin(-0.5))
        );
        assert_eq!(
            OcclusionModel::new(f64::NAN, 0.0),
            Err(OcclusionError::NonFinite)
        );
        assert_eq!(
            OcclusionModel::earth().with_center(Vector3::new(f64::INFINITY, 0.0, 0.0)),
            Err(OcclusionError::NonFinite)
        );
    }

    #[test]
    fn zero_radius_body_contains_nothing() {
        let m = OcclusionModel::new(0.0, 0.0).unwrap();
        assert!(!m.is_inside(Vector3::ZERO));
    }

    #[test]
    fn inside_predicate() {
        let m = OcclusionModel::earth();
        assert!(m.is_inside(Vector3::ZERO));
        assert!(m.is_inside(Vector3::new(6398.0, 0.0, 0.0)));
        assert!(!m.is_inside(Vector3::new(6398.2, 0.0, 0.0)));
        assert!(!m.is_inside(Vector3::new(0.0, 0.0, -7000.0)));
    }

    #[test]
    fn inside_predicate_respects_center() {
        let moon = OcclusionModel::new(1737.4, 0.0)
            .unwrap()
            .with_center(Vector3::new(384_400.0, 0.0, 0.0))
            .unwrap();
        assert!(moon.is_inside(Vector3::new(384_400.0, 1000.0, 0.0)));
        assert!(!moon.is_inside(Vector3::ZERO));
    }
}
