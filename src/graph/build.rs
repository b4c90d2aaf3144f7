use tracing::debug;

use crate::api::{EdgeRecord, NodeSummary, NOT_SPECIFIED};

use super::model::{Edge, NodeRecord, SocialGraph};

impl SocialGraph {
    /// Builds the graph from raw edge records plus the `/nodes` census.
    ///
    /// Nodes deduplicate by reported id; the first record wins and later
    /// duplicates are skipped outright, attributes included. Edges keep
    /// duplicates and self-references, but an edge whose endpoint never
    /// produced a node is dropped.
    pub fn from_records(records: &[EdgeRecord], census: &[NodeSummary]) -> Self {
        let mut graph = Self::default();
        let mut dropped_edges = 0usize;

        for record in records {
            let source = graph.intern_wire_node(&record.node);
            let target = graph.intern_wire_node(&record.target_node);

            match (source, target) {
                (Some(source), Some(target)) => graph.edges.push(Edge {
                    source,
                    target,
                    kind: record.relationship.label(),
                }),
                _ => dropped_edges += 1,
            }
        }

        for summary in census {
            let Some(id) = summary.id() else {
                continue;
            };
            if graph.index_by_id.contains_key(&id) {
                continue;
            }

            let index = graph.nodes.len();
            graph.nodes.push(NodeRecord {
                id: id.clone(),
                name: NOT_SPECIFIED.to_string(),
                kind: summary.kind(),
                attributes: serde_json::Map::new(),
            });
            graph.index_by_id.insert(id, index);
        }

        if dropped_edges > 0 {
            debug!(dropped_edges, "skipped edge records with unresolved endpoints");
        }

        graph
    }

    fn intern_wire_node(&mut self, node: &crate::api::WireNode) -> Option<usize> {
        let id = node.id()?;
        if let Some(&index) = self.index_by_id.get(&id) {
            return Some(index);
        }

        let index = self.nodes.len();
        self.nodes.push(NodeRecord {
            id: id.clone(),
            name: node.display_name(),
            kind: node.kind(),
            attributes: node.attributes.clone(),
        });
        self.index_by_id.insert(id, index);
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeKind;

    fn records_from_json(raw: &str) -> Vec<EdgeRecord> {
        serde_json::from_str(raw).expect("records parse")
    }

    fn follows_record(source: u64, target: u64) -> String {
        format!(
            r#"{{
                "node": {{"id": {source}, "label": ["User"], "attributes": {{"name": "u{source}"}}}},
                "relationship": {{"type": "follows"}},
                "target_node": {{"id": {target}, "label": ["User"], "attributes": {{"name": "u{target}"}}}}
            }}"#
        )
    }

    #[test]
    fn builds_reference_scenario() {
        let records = records_from_json(
            r#"[{
                "node": {"id": 1, "label": ["User"], "attributes": {"name": "A"}},
                "relationship": {"type": "follows"},
                "target_node": {"id": 2, "label": ["Group"], "attributes": {"name": "B"}}
            }]"#,
        );

        let graph = SocialGraph::from_records(&records, &[]);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[0].name, "A");
        assert_eq!(graph.nodes[0].kind, NodeKind::User);
        assert_eq!(graph.nodes[1].id, "2");
        assert_eq!(graph.nodes[1].name, "B");
        assert_eq!(graph.nodes[1].kind, NodeKind::Group);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].source, 0);
        assert_eq!(graph.edges[0].target, 1);
        assert_eq!(graph.edges[0].kind, "follows");
    }

    #[test]
    fn dedup_is_idempotent_over_repeated_references() {
        let raw = format!(
            "[{},{},{}]",
            follows_record(1, 2),
            follows_record(2, 1),
            follows_record(1, 2)
        );
        let graph = SocialGraph::from_records(&records_from_json(&raw), &[]);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn first_record_wins_and_later_attributes_are_dropped() {
        let records = records_from_json(
            r#"[
                {
                    "node": {"id": 1, "label": ["User"], "attributes": {"name": "first", "city": "Riga"}},
                    "relationship": {"type": "follows"},
                    "target_node": {"id": 2, "attributes": {"name": "B"}}
                },
                {
                    "node": {"id": 1, "label": ["Group"], "attributes": {"name": "second", "sex": "f"}},
                    "relationship": {"type": "follows"},
                    "target_node": {"id": 3, "attributes": {"name": "C"}}
                }
            ]"#,
        );

        let graph = SocialGraph::from_records(&records, &[]);
        let node = graph.node("1").expect("node 1 exists");

        assert_eq!(node.name, "first");
        assert_eq!(node.kind, NodeKind::User);
        assert!(node.attributes.contains_key("city"));
        assert!(!node.attributes.contains_key("sex"));
    }

    #[test]
    fn edge_list_is_bounded_by_record_count_with_valid_endpoints() {
        let raw = format!(
            "[{},{},{}]",
            follows_record(1, 2),
            follows_record(3, 4),
            follows_record(2, 3)
        );
        let graph = SocialGraph::from_records(&records_from_json(&raw), &[]);

        assert!(graph.edge_count() <= 3);
        for edge in &graph.edges {
            assert!(edge.source < graph.node_count());
            assert!(edge.target < graph.node_count());
        }
    }

    #[test]
    fn edges_with_unresolved_endpoints_are_dropped() {
        let records = records_from_json(
            r#"[{
                "node": {"id": 1, "attributes": {"name": "A"}},
                "relationship": {"type": "follows"},
                "target_node": {"attributes": {"name": "no id"}}
            }]"#,
        );

        let graph = SocialGraph::from_records(&records, &[]);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn self_edges_survive_the_build() {
        let raw = format!("[{}]", follows_record(1, 1));
        let graph = SocialGraph::from_records(&records_from_json(&raw), &[]);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].source, graph.edges[0].target);
    }

    #[test]
    fn census_appends_isolated_nodes_after_record_order() {
        let records = records_from_json(&format!("[{}]", follows_record(1, 2)));
        let census: Vec<NodeSummary> = serde_json::from_str(
            r#"[
                {"id": 1, "label": "User"},
                {"id": 9, "label": "Group"},
                {"id": 10}
            ]"#,
        )
        .expect("census parses");

        let graph = SocialGraph::from_records(&records, &census);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.nodes[0].id, "1");
        assert_eq!(graph.nodes[1].id, "2");
        assert_eq!(graph.nodes[2].id, "9");
        assert_eq!(graph.nodes[2].kind, NodeKind::Group);
        assert_eq!(graph.nodes[2].name, NOT_SPECIFIED);
        assert_eq!(graph.nodes[3].id, "10");
        assert_eq!(graph.degrees()[2], 0);
    }
}
