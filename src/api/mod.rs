mod fetch;
mod http;
mod wire;

pub use fetch::{
    collect_social_graph, fetch_edge_records, fetch_node_census, fetch_node_records,
    fetch_node_records_lenient,
};
pub use http::build_agent;
pub use wire::{EdgeRecord, NodeSummary, WireNode, WireRelationship, NOT_SPECIFIED};
