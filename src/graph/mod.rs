mod build;
mod model;
mod synthetic;

pub use model::{Edge, NodeKind, NodeRecord, SocialGraph};
pub use synthetic::{synthetic_graph, SYNTHETIC_EDGE_PROBABILITY, SYNTHETIC_NODE_COUNT};
