use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::geometry::los::is_clear;
use crate::geometry::occlusion::OcclusionModel;
use crate::spatial::kd_tree::KdTree;
use crate::TrackedObject;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("unknown object id {0}")]
    UnknownObject(u32),
    #[error("duplicate object id {0}")]
    DuplicateId(u32),
}

/// Undirected crosslink between two objects with a clear line of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crosslink {
    pub to: usize,
    pub distance_km: f64,
}

/// Adjacency-list graph of the crosslinks available at one epoch.
#[derive(Clone, Debug)]
pub struct LinkGraph {
    pub objects: Vec<TrackedObject>,
    /// adjacency[i] lists the crosslinks of objects[i]
    pub adjacency: Vec<Vec<Crosslink>>,
    id_index: HashMap<u32, usize>,
}

impl LinkGraph {
    /// Connects every pair of objects whose line of sight clears `model` and,
    /// when `max_range_km` is set, whose separation is within that range.
    pub fn build(
        objects: Vec<TrackedObject>,
        model: &OcclusionModel,
        max_range_km: Option<f64>,
    ) -> Result<Self, GraphError> {
        let mut id_index = HashMap::with_capacity(objects.len());
        for (idx, object) in objects.iter().enumerate() {
            if id_index.insert(object.id, idx).is_some() {
                return Err(GraphError::DuplicateId(object.id));
            }
        }

        let mut adjacency = vec![Vec::new(); objects.len()];
        let mut candidates = 0usize;
        match max_range_km {
            Some(range) => {
                let points: Vec<_> = objects.iter().map(|o| o.pos).collect();
                let kd = KdTree::build(&points);
                for (i, object) in objects.iter().enumerate() {
                    for (j, distance_km) in kd.within_radius(object.pos, range) {
                        if j <= i {
                            continue;
                        }
                        candidates += 1;
                        connect(&objects, &mut adjacency, model, i, j, distance_km);
                    }
                }
            }
            None => {
                for i in 0..objects.len() {
                    for j in i + 1..objects.len() {
                        candidates += 1;
                        let distance_km = objects[i].distance(&objects[j]);
                        connect(&objects, &mut adjacency, model, i, j, distance_km);
                    }
                }
            }
        }

        let graph = LinkGraph {
            objects,
            adjacency,
            id_index,
        };
        debug!(
            "built crosslink graph: {} objects, {} candidate pairs, {} links",
            graph.len(),
            candidates,
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn index_of_id(&self, id: u32) -> Option<usize> {
        self.id_index.get(&id).copied()
    }

    pub fn require_id(&self, id: u32) -> Result<usize, GraphError> {
        self.index_of_id(id).ok_or(GraphError::UnknownObject(id))
    }

    pub fn neighbours(&self, idx: usize) -> &[Crosslink] {
        &self.adjacency[idx]
    }

    /// Number of undirected links.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }
}

fn connect(
    objects: &[TrackedObject],
    adjacency: &mut [Vec<Crosslink>],
    model: &OcclusionModel,
    i: usize,
    j: usize,
    distance_km: f64,
) {
    if !is_clear(objects[i].pos, objects[j].pos, model).is_clear() {
        return;
    }
    adjacency[i].push(Crosslink { to: j, distance_km });
    adjacency[j].push(Crosslink { to: i, distance_km });
}
