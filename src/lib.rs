pub mod config;
pub mod data;
pub mod geometry;
pub mod link;
pub mod network;
pub mod spatial;

use serde::{Deserialize, Serialize};

use crate::geometry::Vector3;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackedObject {
    pub id: u32,
    pub name: String,
    /// Inertial position in kilometres at the snapshot epoch.
    pub pos: Vector3,
}

impl TrackedObject {
    pub fn new(id: u32, name: impl Into<String>, pos: Vector3) -> Self {
        TrackedObject {
            id,
            name: name.into(),
            pos,
        }
    }

    pub fn distance(&self, other: &TrackedObject) -> f64 {
        geometry::distance(self.pos, other.pos)
    }
}
