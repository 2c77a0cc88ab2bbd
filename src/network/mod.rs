pub mod graph;
pub mod router;

pub use graph::{GraphError, LinkGraph};
pub use router::{shortest_relay_path, RelayHop};
