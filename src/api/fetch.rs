use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::graph::SocialGraph;

use super::http::get_json;
use super::wire::{EdgeRecord, NodeSummary};

pub fn fetch_edge_records(agent: &ureq::Agent, base_url: &str) -> Result<Vec<EdgeRecord>> {
    get_json(agent, &format!("{base_url}/graph"))
        .with_context(|| format!("failed to fetch edge records from {base_url}/graph"))
}

pub fn fetch_node_census(agent: &ureq::Agent, base_url: &str) -> Result<Vec<NodeSummary>> {
    get_json(agent, &format!("{base_url}/nodes"))
        .with_context(|| format!("failed to fetch node census from {base_url}/nodes"))
}

pub fn fetch_node_records(
    agent: &ureq::Agent,
    base_url: &str,
    node_id: &str,
) -> Result<Vec<EdgeRecord>> {
    get_json(agent, &format!("{base_url}/nodes/{node_id}"))
        .with_context(|| format!("failed to fetch records for node {node_id}"))
}

/// Failure-tolerant variant for the inspect path: any error is logged and
/// collapses to an empty record list, never past this boundary.
pub fn fetch_node_records_lenient(
    agent: &ureq::Agent,
    base_url: &str,
    node_id: &str,
) -> Vec<EdgeRecord> {
    match fetch_node_records(agent, base_url, node_id) {
        Ok(records) => records,
        Err(error) => {
            warn!("node detail request failed: {error:#}");
            Vec::new()
        }
    }
}

/// Loads the census and the edge records, then builds the deduplicated
/// graph. The census is an enrichment (it contributes isolated nodes); its
/// failure degrades to an edge-record-only graph.
pub fn collect_social_graph(agent: &ureq::Agent, base_url: &str) -> Result<SocialGraph> {
    let records = fetch_edge_records(agent, base_url)?;

    let census = match fetch_node_census(agent, base_url) {
        Ok(census) => census,
        Err(error) => {
            warn!("node census unavailable, building from edge records only: {error:#}");
            Vec::new()
        }
    };

    let graph = SocialGraph::from_records(&records, &census);
    if graph.node_count() == 0 {
        return Err(anyhow!("the API at {base_url} returned no usable graph records"));
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded social graph from {base_url}"
    );
    Ok(graph)
}
