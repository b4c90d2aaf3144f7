use std::collections::HashMap;

use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    User,
    Group,
}

impl NodeKind {
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("user") {
            Self::User
        } else {
            Self::Group
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// Wire attributes of the first record that introduced this node.
    pub attributes: Map<String, Value>,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub kind: String,
}

/// Normalized in-memory graph; rebuilt from scratch on every load.
#[derive(Clone, Debug, Default)]
pub struct SocialGraph {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<Edge>,
    pub index_by_id: HashMap<String, usize>,
}

impl SocialGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Incident edge count per node, self-edges counted once.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source] += 1;
            if edge.target != edge.source {
                degrees[edge.target] += 1;
            }
        }
        degrees
    }

    pub fn top_by_degree(&self, limit: usize) -> Vec<(usize, usize)> {
        let degrees = self.degrees();
        let mut ranked = degrees.into_iter().enumerate().collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| self.nodes[a.0].name.cmp(&self.nodes[b.0].name))
                .then_with(|| self.nodes[a.0].id.cmp(&self.nodes[b.0].id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Neighbor indices in either direction, deduplicated and ordered.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        let mut neighbors = Vec::new();
        for edge in &self.edges {
            if edge.source == index && edge.target != index {
                neighbors.push(edge.target);
            } else if edge.target == index && edge.source != index {
                neighbors.push(edge.source);
            }
        }
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Outgoing relations in record order, duplicates preserved.
    pub fn outgoing_relations(&self, index: usize) -> Vec<(&str, usize)> {
        self.edges
            .iter()
            .filter(|edge| edge.source == index)
            .map(|edge| (edge.kind.as_str(), edge.target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_edges(node_count: usize, edges: &[(usize, usize)]) -> SocialGraph {
        let mut graph = SocialGraph::default();
        for index in 0..node_count {
            let id = index.to_string();
            graph.nodes.push(NodeRecord {
                id: id.clone(),
                name: format!("node {index}"),
                kind: NodeKind::User,
                attributes: Map::new(),
            });
            graph.index_by_id.insert(id, index);
        }
        for &(source, target) in edges {
            graph.edges.push(Edge {
                source,
                target,
                kind: "follows".to_string(),
            });
        }
        graph
    }

    #[test]
    fn degrees_count_both_endpoints() {
        let graph = graph_with_edges(3, &[(0, 1), (1, 2), (0, 1)]);
        assert_eq!(graph.degrees(), vec![2, 4, 1]);
    }

    #[test]
    fn self_edge_counts_once() {
        let graph = graph_with_edges(2, &[(0, 0), (0, 1)]);
        assert_eq!(graph.degrees(), vec![2, 1]);
    }

    #[test]
    fn top_by_degree_ranks_and_truncates() {
        let graph = graph_with_edges(4, &[(0, 1), (1, 2), (1, 3), (2, 3)]);
        let top = graph.top_by_degree(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, 1);
        assert_eq!(top[0].1, 3);
    }

    #[test]
    fn neighbors_merge_directions_and_dedup() {
        let graph = graph_with_edges(3, &[(0, 1), (1, 0), (2, 0), (0, 0)]);
        assert_eq!(graph.neighbors(0), vec![1, 2]);
    }

    #[test]
    fn outgoing_relations_preserve_duplicates() {
        let graph = graph_with_edges(2, &[(0, 1), (0, 1)]);
        assert_eq!(graph.outgoing_relations(0).len(), 2);
    }
}
