use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::network::graph::LinkGraph;

#[derive(Clone, Debug, PartialEq)]
pub struct RelayHop {
    pub object_index: usize,
    /// Path length in kilometres from the start up to and including this hop.
    pub cumulative_km: f64,
}

/// A* over the crosslink graph.
///
/// Cost model: the sum of link lengths. The straight-line distance to the
/// goal never exceeds the remaining relay distance, so it is an admissible
/// heuristic and the first time the goal is popped the path is shortest.
pub fn shortest_relay_path(graph: &LinkGraph, start: usize, goal: usize) -> Option<Vec<RelayHop>> {
    if start >= graph.len() || goal >= graph.len() {
        return None;
    }
    if start == goal {
        return Some(vec![RelayHop {
            object_index: start,
            cumulative_km: 0.0,
        }]);
    }

    #[derive(Copy, Clone, Debug)]
    struct Node {
        idx: usize,
        f_score: f64,
    }

    impl Eq for Node {}

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.f_score.total_cmp(&other.f_score) == Ordering::Equal
        }
    }

    // min-heap on f_score
    impl Ord for Node {
        fn cmp(&self, other: &Self) -> Ordering {
            other.f_score.total_cmp(&self.f_score)
        }
    }

    impl PartialOrd for Node {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let mut open = BinaryHeap::new();
    open.push(Node {
        idx: start,
        f_score: heuristic(graph, start, goal),
    });

    let mut came_from: HashMap<usize, usize> = HashMap::new();
    let mut g_score: HashMap<usize, f64> = HashMap::new();
    g_score.insert(start, 0.0);

    while let Some(Node { idx: current, f_score }) = open.pop() {
        if current == goal {
            return Some(reconstruct_path(&came_from, &g_score, current));
        }

        let current_g = *g_score.get(&current).unwrap_or(&f64::INFINITY);
        // stale heap entry superseded by a cheaper route
        if f_score > current_g + heuristic(graph, current, goal) {
            continue;
        }

        for link in graph.neighbours(current) {
            let tentative_g = current_g + link.distance_km;
            if tentative_g < *g_score.get(&link.to).unwrap_or(&f64::INFINITY) {
                came_from.insert(link.to, current);
                g_score.insert(link.to, tentative_g);
                open.push(Node {
                    idx: link.to,
                    f_score: tentative_g + heuristic(graph, link.to, goal),
                });
            }
        }
    }

    None
}

fn heuristic(graph: &LinkGraph, from: usize, to: usize) -> f64 {
    graph.objects[from].distance(&graph.objects[to])
}

fn reconstruct_path(
    came_from: &HashMap<usize, usize>,
    g_score: &HashMap<usize, f64>,
    mut current: usize,
) -> Vec<RelayHop> {
    let mut total_path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        current = prev;
        total_path.push(current);
    }
    total_path.reverse();

    total_path
        .into_iter()
        .map(|idx| RelayHop {
            object_index: idx,
            cumulative_km: g_score.get(&idx).copied().unwrap_or(0.0),
        })
        .collect()
}
