pub mod distance;
pub mod los;
pub mod occlusion;
pub mod triangle;
pub mod vector;

pub use distance::{central_angle, distance, distance_squared, haversine_distance};
pub use los::{analyze, is_clear, is_clear_prefiltered, LosAnalysis, LosResult};
pub use occlusion::{OcclusionError, OcclusionModel};
pub use vector::Vector3;
