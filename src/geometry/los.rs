//! Segment/sphere occlusion test.
//!
//! The segment from A to B is `P(t) = A + t·(B − A)` for `t ∈ [0, 1]`, with
//! both endpoints expressed relative to the occluding body's center.
//! Substituting into `|P(t)|² = R²` gives `a·t² + b·t + c = 0` with
//!
//! ```text
//! a = AB·AB      b = 2·(A·AB)      c = A·A − R²
//! ```
//!
//! The line is inside the sphere for `t ∈ (t1, t2)`; the segment is blocked
//! when that interval overlaps `[0, 1]`. A line that only grazes the sphere
//! (a double root) is clear.

use serde::{Deserialize, Serialize};

use super::occlusion::OcclusionModel;
use super::triangle::prefilter_clear;
use super::vector::{dot, magnitude, Vector3};

/// Discriminants within this fraction of the quadratic's dominant term are
/// treated as a double root.
const TANGENT_RELATIVE_TOLERANCE: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LosResult {
    Clear,
    Blocked,
}

impl LosResult {
    pub fn is_clear(self) -> bool {
        matches!(self, LosResult::Clear)
    }
}

/// Outcome of a line-of-sight query together with the quantities that
/// decided it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LosAnalysis {
    pub result: LosResult,
    /// `b² − 4ac`. Zero for coincident endpoints.
    pub discriminant: f64,
    /// Parameters `(t1, t2)` along the caller's A→B where the infinite line
    /// crosses the sphere, when it does so at two distinct points.
    pub interval: Option<(f64, f64)>,
    /// Parameter along A→B of the segment point closest to the body center.
    pub closest_t: f64,
    /// Distance from the body center to the segment.
    pub closest_distance: f64,
    /// `closest_distance − R`; negative when the segment enters the sphere.
    pub clearance: f64,
}

/// Decides whether the straight path between `a` and `b` clears the
/// occluding sphere.
///
/// The endpoints are put in a canonical order first so the answer does not
/// depend on which object is passed first.
pub fn is_clear(a: Vector3, b: Vector3, model: &OcclusionModel) -> LosResult {
    analyze(a, b, model).result
}

/// Runs the triangle-height filter before the quadratic test.
pub fn is_clear_prefiltered(a: Vector3, b: Vector3, model: &OcclusionModel) -> LosResult {
    if prefilter_clear(a, b, model) {
        return LosResult::Clear;
    }
    is_clear(a, b, model)
}

/// Full line-of-sight analysis. Total over finite inputs; non-finite
/// coordinates give an unspecified result.
///
/// The decision is computed on the canonically ordered pair; `interval` and
/// `closest_t` are reported along the segment as passed in.
pub fn analyze(a: Vector3, b: Vector3, model: &OcclusionModel) -> LosAnalysis {
    let (first, second, swapped) = canonical_order(a, b);
    let report = analyze_ordered(
        model.to_body_frame(first),
        model.to_body_frame(second),
        model.effective_radius(),
    );
    if swapped {
        report.reversed()
    } else {
        report
    }
}

fn analyze_ordered(a: Vector3, b: Vector3, r: f64) -> LosAnalysis {
    let ab = b - a;
    let qa = dot(ab, ab);
    let qb = 2.0 * dot(a, ab);
    let qc = dot(a, a) - r * r;
    let discriminant = qb * qb - 4.0 * qa * qc;

    let closest_t = if qa == 0.0 {
        0.0
    } else {
        (-dot(a, ab) / qa).clamp(0.0, 1.0)
    };
    let closest_distance = magnitude(a + ab * closest_t);
    let clearance = closest_distance - r;

    if qa == 0.0 {
        // Coincident endpoints: the segment is a single point.
        let result = if qc > 0.0 {
            LosResult::Clear
        } else {
            LosResult::Blocked
        };
        return LosAnalysis {
            result,
            discriminant,
            interval: None,
            closest_t,
            closest_distance,
            clearance,
        };
    }

    let tolerance = TANGENT_RELATIVE_TOLERANCE * (qb * qb).max((4.0 * qa * qc).abs());
    if discriminant <= tolerance {
        // No crossing, or a tangent graze.
        return LosAnalysis {
            result: LosResult::Clear,
            discriminant,
            interval: None,
            closest_t,
            closest_distance,
            clearance,
        };
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-qb - sqrt_d) / (2.0 * qa);
    let t2 = (-qb + sqrt_d) / (2.0 * qa);
    let result = if t2 >= 0.0 && t1 <= 1.0 {
        LosResult::Blocked
    } else {
        LosResult::Clear
    };

    LosAnalysis {
        result,
        discriminant,
        interval: Some((t1, t2)),
        closest_t,
        closest_distance,
        clearance,
    }
}

impl LosAnalysis {
    /// The same analysis with the segment parameter running from B to A.
    fn reversed(self) -> Self {
        LosAnalysis {
            interval: self.interval.map(|(t1, t2)| (1.0 - t2, 1.0 - t1)),
            closest_t: 1.0 - self.closest_t,
            ..self
        }
    }
}

/// Orders the endpoints by `(x, y, z)` under `total_cmp`; the flag is set
/// when they were swapped.
fn canonical_order(a: Vector3, b: Vector3) -> (Vector3, Vector3, bool) {
    let ord = a
        .x
        .total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z));
    if ord.is_gt() {
        (b, a, true)
    } else {
        (a, b, false)
    }
}
