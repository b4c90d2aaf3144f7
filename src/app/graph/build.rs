use std::collections::HashMap;

use eframe::egui::{vec2, Vec2};
use glam::Vec3;

use super::super::render_utils::node_radius;
use super::super::{RenderGraph, RenderNode, ViewModel};

const INITIAL_RADIUS: f32 = 10.0;
// Golden angle; consecutive nodes spiral outward without overlapping.
const INITIAL_ANGLE: f32 = 2.399_963_2;

fn phyllotaxis_position(index: usize) -> Vec2 {
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * INITIAL_ANGLE;
    vec2(radius * angle.cos(), radius * angle.sin())
}

impl ViewModel {
    /// Rebuilds the render graph from the social graph. Surviving nodes keep
    /// their simulated positions so a rebuild does not scramble the layout.
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        let degrees = self.graph.degrees();
        let max_degree = degrees.iter().copied().max().unwrap_or(0);

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let nodes = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let degree = degrees[index];
                let base_radius = node_radius(degree, max_degree);

                if let Some(mut node) = prior_nodes.remove(&record.id) {
                    node.name = record.name.clone();
                    node.kind = record.kind;
                    node.degree = degree;
                    node.base_radius = base_radius;
                    node
                } else {
                    RenderNode {
                        id: record.id.clone(),
                        name: record.name.clone(),
                        kind: record.kind,
                        degree,
                        base_radius,
                        pos2: phyllotaxis_position(index),
                        vel2: Vec2::ZERO,
                        pinned: None,
                        pos3: Vec3::ZERO,
                    }
                }
            })
            .collect::<Vec<_>>();

        let edges = self
            .graph
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect::<Vec<_>>();

        let cache = RenderGraph::new(nodes, edges);
        self.visible_node_count = cache.nodes.len();
        self.visible_edge_count = cache.edges.len();
        self.graph_cache = Some(cache);

        self.layout_applied = None;
        self.drag_index = None;
        self.simulation.reheat();
        self.graph_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::api::build_agent;
    use crate::app::{GraphSource, ViewModel};
    use crate::graph::synthetic_graph;

    fn model() -> ViewModel {
        ViewModel::new(
            synthetic_graph(5),
            GraphSource::Synthetic,
            5,
            "http://127.0.0.1:8000".to_string(),
            build_agent(),
        )
    }

    #[test]
    fn rebuild_mirrors_the_social_graph() {
        let mut model = model();
        model.rebuild_render_graph();

        let cache = model.graph_cache.as_ref().expect("cache built");
        assert_eq!(cache.nodes.len(), model.graph.node_count());
        assert_eq!(cache.edges.len(), model.graph.edge_count());
        for (index, node) in cache.nodes.iter().enumerate() {
            assert_eq!(node.id, model.graph.nodes[index].id);
        }
    }

    #[test]
    fn rebuild_preserves_existing_positions() {
        let mut model = model();
        model.rebuild_render_graph();

        let moved = eframe::egui::vec2(123.0, -77.0);
        model
            .graph_cache
            .as_mut()
            .expect("cache built")
            .nodes[0]
            .pos2 = moved;

        model.rebuild_render_graph();
        let cache = model.graph_cache.as_ref().expect("cache rebuilt");
        assert_eq!(cache.nodes[0].pos2, moved);
    }

    #[test]
    fn initial_positions_are_spread_out() {
        let mut model = model();
        model.rebuild_render_graph();

        let cache = model.graph_cache.as_ref().expect("cache built");
        for first in 0..cache.nodes.len() {
            for second in (first + 1)..cache.nodes.len() {
                assert!(
                    (cache.nodes[first].pos2 - cache.nodes[second].pos2).length() > 0.5,
                    "nodes {first} and {second} start on top of each other"
                );
            }
        }
    }
}
