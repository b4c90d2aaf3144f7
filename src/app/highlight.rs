use std::collections::HashSet;

use super::RenderGraph;

/// Neighborhood of the selected node: every incident edge plus the nodes on
/// their far ends. Both views use it to dim the rest of the graph.
pub(in crate::app) struct SelectionHighlight {
    pub(in crate::app) nodes: HashSet<usize>,
    pub(in crate::app) edges: HashSet<(usize, usize)>,
}

pub(in crate::app) fn selection_highlight(cache: &RenderGraph, selected: usize) -> SelectionHighlight {
    let mut nodes = HashSet::new();
    let mut edges = HashSet::new();

    for &(source, target) in &cache.edges {
        if source != selected && target != selected {
            continue;
        }

        edges.insert((source, target));
        nodes.insert(source);
        nodes.insert(target);
    }
    nodes.remove(&selected);

    SelectionHighlight { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{RenderGraph, RenderNode};
    use crate::graph::NodeKind;
    use eframe::egui::Vec2;

    fn cache_with_edges(node_count: usize, edges: &[(usize, usize)]) -> RenderGraph {
        let nodes = (0..node_count)
            .map(|index| RenderNode {
                id: index.to_string(),
                name: format!("node {index}"),
                kind: NodeKind::User,
                degree: 0,
                base_radius: 10.0,
                pos2: Vec2::ZERO,
                vel2: Vec2::ZERO,
                pinned: None,
                pos3: glam::Vec3::ZERO,
            })
            .collect();
        RenderGraph::new(nodes, edges.to_vec())
    }

    #[test]
    fn collects_incident_edges_and_far_ends() {
        let cache = cache_with_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let highlight = selection_highlight(&cache, 1);

        assert_eq!(highlight.edges.len(), 2);
        assert!(highlight.edges.contains(&(0, 1)));
        assert!(highlight.edges.contains(&(1, 2)));
        assert_eq!(highlight.nodes, HashSet::from([0, 2]));
    }

    #[test]
    fn isolated_selection_highlights_nothing() {
        let cache = cache_with_edges(3, &[(0, 1)]);
        let highlight = selection_highlight(&cache, 2);

        assert!(highlight.nodes.is_empty());
        assert!(highlight.edges.is_empty());
    }
}
