use super::vector::{cross, dot, magnitude, Vector3};

/// Straight-line distance between two positions.
///
/// Computes the single difference `b - a`; IEEE subtraction negates exactly,
/// so swapping the arguments yields a bitwise-identical result.
pub fn distance(a: Vector3, b: Vector3) -> f64 {
    magnitude(b - a)
}

pub fn distance_squared(a: Vector3, b: Vector3) -> f64 {
    let d = b - a;
    dot(d, d)
}

/// Angle in radians subtended at the frame origin by two position vectors.
///
/// Uses `atan2(|a×b|, a·b)`, which stays accurate for nearly parallel and
/// nearly antiparallel vectors where `acos` loses precision. Zero when either
/// vector is zero.
pub fn central_angle(a: Vector3, b: Vector3) -> f64 {
    magnitude(cross(a, b)).atan2(dot(a, b))
}

/// Great-circle distance between two sub-satellite points on a sphere.
///
/// Latitudes and longitudes are in degrees; the result is in the unit of
/// `radius`.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    2.0 * radius * h.clamp(0.0, 1.0).sqrt().asin()
}
