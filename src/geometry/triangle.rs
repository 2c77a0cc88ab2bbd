use super::distance::distance;
use super::occlusion::OcclusionModel;
use super::vector::{magnitude, Vector3};

/// Relative slack applied before trusting a Heron height, so a height within
/// this band of `R` is left to the quadratic test.
const HERON_RELATIVE_TOLERANCE: f64 = 1e-9;

/// A base shorter than this fraction of the longer radius is below the
/// rounding already carried by `|A|` and `|B|`; the filter declines it.
const SHORT_BASE_RATIO: f64 = 1e-6;

/// Height of a triangle over `side_c`, given its three side lengths.
///
/// With `side_a = |A|`, `side_b = |B|` and `side_c = |B - A|` this is the
/// distance from the body center to the infinite line through A and B. A
/// zero `side_c` leaves no base; the distance to the single point
/// (`side_a`) is returned instead.
///
/// The area uses Kahan's ordering of Heron's formula, which stays accurate
/// for needle-shaped triangles.
pub fn height_of_triangle(side_a: f64, side_b: f64, side_c: f64) -> f64 {
    if side_c == 0.0 {
        return side_a;
    }
    let mut sides = [side_a, side_b, side_c];
    sides.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = sides;
    // the brackets matter; slightly negative for collinear points after rounding
    let product = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    let area = 0.25 * product.max(0.0).sqrt();
    2.0 * area / side_c
}

/// Distance from the model's center to the infinite line through `a` and `b`.
pub fn line_height(a: Vector3, b: Vector3, model: &OcclusionModel) -> f64 {
    let a = model.to_body_frame(a);
    let b = model.to_body_frame(b);
    height_of_triangle(magnitude(a), magnitude(b), distance(a, b))
}

/// Cheap necessary-condition filter: `true` means the segment is certainly
/// clear. `false` decides nothing; the line may still miss the sphere, or
/// the closest approach may fall outside the segment.
pub fn prefilter_clear(a: Vector3, b: Vector3, model: &OcclusionModel) -> bool {
    let a = model.to_body_frame(a);
    let b = model.to_body_frame(b);
    let (side_a, side_b, side_c) = (magnitude(a), magnitude(b), distance(a, b));
    if side_c < SHORT_BASE_RATIO * side_a.max(side_b) {
        return false;
    }
    let r = model.effective_radius();
    height_of_triangle(side_a, side_b, side_c) >= r * (1.0 + HERON_RELATIVE_TOLERANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn right_triangle_height() {
        // 3-4-5 triangle: height over the hypotenuse is 12/5
        assert_approx_eq!(height_of_triangle(3.0, 4.0, 5.0), 2.4);
    }

    #[test]
    fn collinear_points_have_zero_height() {
        assert_eq!(height_of_triangle(7000.0, 9000.0, 2000.0), 0.0);
    }

    #[test]
    fn degenerate_base_returns_point_distance() {
        assert_eq!(height_of_triangle(7000.0, 7000.0, 0.0), 7000.0);
    }

    #[test]
    fn quarter_orbit_line_height() {
        let m = OcclusionModel::earth();
        let a = Vector3::new(10000.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 10000.0, 0.0);
        assert_approx_eq!(line_height(a, b, &m), 10000.0 / 2f64.sqrt(), 1e-6);
        assert!(prefilter_clear(a, b, &m));
    }

    #[test]
    fn low_line_height_is_inconclusive() {
        // The infinite line dips under R, but the perpendicular foot is far
        // outside the segment; the filter must not claim anything.
        let m = OcclusionModel::earth();
        let a = Vector3::new(7000.0, 1000.0, 0.0);
        let b = Vector3::new(9000.0, 1000.0, 0.0);
        assert_approx_eq!(line_height(a, b, &m), 1000.0, 1e-6);
        assert!(!prefilter_clear(a, b, &m));
    }

    #[test]
    fn needle_triangle_keeps_its_height() {
        // Textbook Heron loses every digit here; the true height is ~6000.
        assert_approx_eq!(height_of_triangle(6000.0, 6000.0, 1e-12), 6000.0, 1e-6);
    }

    #[test]
    fn short_segment_inside_sphere_is_not_prefiltered() {
        let m = OcclusionModel::earth();
        let a = Vector3::new(6000.0, 0.0, 0.0);
        let b = Vector3::new(6000.0, 1e-12, 0.0);
        assert!(line_height(a, b, &m) < m.effective_radius());
        assert!(!prefilter_clear(a, b, &m));
    }

    #[test]
    fn short_segment_far_out_is_not_prefiltered() {
        let m = OcclusionModel::earth();
        let a = Vector3::new(20000.0, 0.0, 0.0);
        let b = Vector3::new(20000.0, 1e-9, 0.0);
        assert!(!prefilter_clear(a, b, &m));
    }
}
