use serde::{Deserialize, Serialize};

use crate::geometry::distance::distance_squared;
use crate::geometry::Vector3;

fn component(v: &Vector3, axis: usize) -> f64 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

/// Node in a 3D k-d tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdNode {
    pub point: Vector3,
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KdNode>>,
    pub right: Option<Box<KdNode>>,
}

/// 3D k-d tree over object positions, answering "everything within range"
/// queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdTree {
    pub root: Option<Box<KdNode>>,
}

impl KdTree {
    pub fn build(points: &[Vector3]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KdTree { root }
    }

    fn build_recursive(points: &[Vector3], idx: &mut [usize], depth: usize) -> Option<Box<KdNode>> {
        if idx.is_empty() {
            return None;
        }

        let axis = depth % 3;
        idx.sort_by(|&a, &b| component(&points[a], axis).total_cmp(&component(&points[b], axis)));
        let mid = idx.len() / 2;
        let median = idx[mid];

        Some(Box::new(KdNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, &mut idx[..mid], depth + 1),
            right: Self::build_recursive(points, &mut idx[mid + 1..], depth + 1),
        }))
    }

    /// All points within `radius` of `target` (inclusive), nearest first.
    pub fn within_radius(&self, target: Vector3, radius: f64) -> Vec<(usize, f64)> {
        let mut results = Vec::new();
        let radius2 = radius * radius;
        Self::search_recursive(&self.root, target, radius2, &mut results);
        results.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        results
    }

    /// Up to `n` nearest points within `radius` of `target`.
    pub fn nearest_n_within_radius(
        &self,
        target: Vector3,
        radius: f64,
        n: usize,
    ) -> Vec<(usize, f64)> {
        let mut results = self.within_radius(target, radius);
        results.truncate(n);
        results
    }

    fn search_recursive(
        node: &Option<Box<KdNode>>,
        target: Vector3,
        radius2: f64,
        results: &mut Vec<(usize, f64)>,
    ) {
        if let Some(noderef) = node {
            let dist2 = distance_squared(noderef.point, target);
            if dist2 <= radius2 {
                results.push((noderef.index, dist2.sqrt()));
            }

            let axis = noderef.axis;
            let delta = component(&target, axis) - component(&noderef.point, axis);
            let (first, second) = if delta < 0.0 {
                (&noderef.left, &noderef.right)
            } else {
                (&noderef.right, &noderef.left)
            };

            Self::search_recursive(first, target, radius2, results);
            if delta * delta <= radius2 {
                Self::search_recursive(second, target, radius2, results);
            }
        }
    }
}
