use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use glam::Vec3;
use serde_json::Map;

use crate::api::{self, EdgeRecord};
use crate::graph::{synthetic_graph, NodeKind, SocialGraph};

mod graph;
mod highlight;
mod physics;
mod render_utils;
mod scene;
mod ui;

use physics::{ForceParams, Simulation};
use scene::OrbitCamera;

pub struct SociogramApp {
    api_base: String,
    agent: ureq::Agent,
    source: GraphSource,
    seed: u64,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<SocialGraph, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphSource {
    Api,
    Synthetic,
}

impl GraphSource {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Api => "live API",
            Self::Synthetic => "synthetic sample",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum ViewMode {
    Force2d,
    Sphere3d,
    Relaxed3d,
}

impl ViewMode {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Force2d => "2D force",
            Self::Sphere3d => "3D sphere",
            Self::Relaxed3d => "3D relaxed",
        }
    }

    pub(in crate::app) fn is_three_dimensional(self) -> bool {
        !matches!(self, Self::Force2d)
    }
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

pub(in crate::app) struct ViewModel {
    graph: SocialGraph,
    source: GraphSource,
    seed: u64,
    api_base: String,
    agent: ureq::Agent,

    mode: ViewMode,
    search: String,
    selected: Option<String>,

    pan: Vec2,
    zoom: f32,
    camera: OrbitCamera,
    force_params: ForceParams,
    simulation: Simulation,
    spin_enabled: bool,
    spin_last_tick_secs: Option<f64>,
    layout_seed: u64,
    layout_applied: Option<ViewMode>,
    drag_index: Option<usize>,

    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,

    detail: NodeDetailState,
    detail_rx: Option<Receiver<DetailResult>>,
    most_connected: Vec<(String, usize)>,

    show_frame_stats: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

pub(in crate::app) struct RenderGraph {
    pub(in crate::app) nodes: Vec<RenderNode>,
    pub(in crate::app) edges: Vec<(usize, usize)>,
    pub(in crate::app) index_by_id: HashMap<String, usize>,
    pub(in crate::app) max_degree: usize,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

impl RenderGraph {
    pub(in crate::app) fn new(nodes: Vec<RenderNode>, edges: Vec<(usize, usize)>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }
        let max_degree = nodes.iter().map(|node| node.degree).max().unwrap_or(0);

        Self {
            nodes,
            edges,
            index_by_id,
            max_degree,
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch::default(),
        }
    }
}

pub(in crate::app) struct RenderNode {
    pub(in crate::app) id: String,
    pub(in crate::app) name: String,
    pub(in crate::app) kind: NodeKind,
    pub(in crate::app) degree: usize,
    pub(in crate::app) base_radius: f32,
    pub(in crate::app) pos2: Vec2,
    pub(in crate::app) vel2: Vec2,
    pub(in crate::app) pinned: Option<Vec2>,
    pub(in crate::app) pos3: Vec3,
}

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    depths: Vec<f32>,
    visible_mask: Vec<bool>,
    draw_order: Vec<usize>,
    world_positions: Vec<Vec3>,
    pick_radii: Vec<f32>,
}

/// Inspect-panel detail for the selected node, assembled from `/nodes/{id}`
/// records or, for the synthetic source, from the local graph.
pub(in crate::app) struct NodeDetail {
    pub(in crate::app) name: String,
    pub(in crate::app) kind: NodeKind,
    pub(in crate::app) attributes: Map<String, serde_json::Value>,
    pub(in crate::app) relations: Vec<RelationRow>,
}

pub(in crate::app) struct RelationRow {
    pub(in crate::app) kind: String,
    pub(in crate::app) target_id: Option<String>,
    pub(in crate::app) target_name: String,
}

pub(in crate::app) enum NodeDetailState {
    Idle,
    Loading { id: String },
    Ready(NodeDetail),
    Unavailable,
}

struct DetailResult {
    id: String,
    records: Vec<EdgeRecord>,
}

impl SociogramApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        api_base: String,
        source: GraphSource,
        seed: u64,
    ) -> Self {
        let agent = api::build_agent();
        let rx = spawn_load(agent.clone(), api_base.clone(), source, seed);

        Self {
            api_base,
            agent,
            source,
            seed,
            state: AppState::Loading { rx },
            reload_rx: None,
        }
    }
}

fn spawn_load(
    agent: ureq::Agent,
    api_base: String,
    source: GraphSource,
    seed: u64,
) -> Receiver<LoadResult> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = match source {
            GraphSource::Api => {
                api::collect_social_graph(&agent, &api_base).map_err(|error| format!("{error:#}"))
            }
            GraphSource::Synthetic => Ok(synthetic_graph(seed)),
        };
        let _ = tx.send(result);
    });

    rx
}

impl eframe::App for SociogramApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                            graph,
                            self.source,
                            self.seed,
                            self.api_base.clone(),
                            self.agent.clone(),
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                } else {
                    ctx.request_repaint_after(std::time::Duration::from_millis(100));
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading social graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the social graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(AppState::Loading {
                            rx: spawn_load(
                                self.agent.clone(),
                                self.api_base.clone(),
                                self.source,
                                self.seed,
                            ),
                        });
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    // Source and seed edits live in the controls panel; pick
                    // them up before the load thread starts.
                    self.source = model.source;
                    self.seed = model.seed;
                    self.reload_rx = Some(spawn_load(
                        self.agent.clone(),
                        self.api_base.clone(),
                        self.source,
                        self.seed,
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            // A reload replaces the ViewModel wholesale, so a
                            // second load can never stack scene objects onto
                            // the first.
                            transition = Some(match result {
                                Ok(graph) => AppState::Ready(Box::new(ViewModel::new(
                                    graph,
                                    self.source,
                                    self.seed,
                                    self.api_base.clone(),
                                    self.agent.clone(),
                                ))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint_after(std::time::Duration::from_millis(100));
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        self.detail_rx = None;
        self.start_detail_lookup();
    }

    fn start_detail_lookup(&mut self) {
        let Some(id) = self.selected.clone() else {
            self.detail = NodeDetailState::Idle;
            return;
        };

        match self.source {
            GraphSource::Synthetic => {
                self.detail = match detail_from_graph(&self.graph, &id) {
                    Some(detail) => NodeDetailState::Ready(detail),
                    None => NodeDetailState::Unavailable,
                };
            }
            GraphSource::Api => {
                let (tx, rx) = mpsc::channel();
                let agent = self.agent.clone();
                let api_base = self.api_base.clone();
                let node_id = id.clone();

                thread::spawn(move || {
                    let records = api::fetch_node_records_lenient(&agent, &api_base, &node_id);
                    let _ = tx.send(DetailResult {
                        id: node_id,
                        records,
                    });
                });

                self.detail_rx = Some(rx);
                self.detail = NodeDetailState::Loading { id };
            }
        }
    }

    pub(in crate::app) fn poll_detail(&mut self) {
        let Some(rx) = self.detail_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(result) => {
                // Selection may have moved on while the request was in
                // flight; a stale answer is dropped.
                let still_wanted =
                    matches!(&self.detail, NodeDetailState::Loading { id } if *id == result.id)
                        && self.selected.as_deref() == Some(result.id.as_str());
                if !still_wanted {
                    return;
                }

                self.detail = match detail_from_records(&result.id, &result.records, &self.graph) {
                    Some(detail) => NodeDetailState::Ready(detail),
                    None => NodeDetailState::Unavailable,
                };
            }
            Err(TryRecvError::Empty) => {
                self.detail_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.detail = NodeDetailState::Unavailable;
            }
        }
    }
}

fn detail_from_records(
    node_id: &str,
    records: &[EdgeRecord],
    graph: &SocialGraph,
) -> Option<NodeDetail> {
    if records.is_empty() {
        return None;
    }

    let own_record = records
        .iter()
        .find(|record| record.node.id().as_deref() == Some(node_id))
        .map(|record| &record.node);

    let (name, kind, attributes) = match own_record {
        Some(node) => (node.display_name(), node.kind(), node.attributes.clone()),
        None => {
            let node = graph.node(node_id)?;
            (node.name.clone(), node.kind, node.attributes.clone())
        }
    };

    let relations = records
        .iter()
        .map(|record| RelationRow {
            kind: record.relationship.label(),
            target_id: record.target_node.id(),
            target_name: record.target_node.display_name(),
        })
        .collect();

    Some(NodeDetail {
        name,
        kind,
        attributes,
        relations,
    })
}

fn detail_from_graph(graph: &SocialGraph, node_id: &str) -> Option<NodeDetail> {
    let index = graph.index_of(node_id)?;
    let node = &graph.nodes[index];

    let relations = graph
        .outgoing_relations(index)
        .into_iter()
        .map(|(kind, target)| RelationRow {
            kind: kind.to_string(),
            target_id: Some(graph.nodes[target].id.clone()),
            target_name: graph.nodes[target].name.clone(),
        })
        .collect();

    Some(NodeDetail {
        name: node.name.clone(),
        kind: node.kind,
        attributes: node.attributes.clone(),
        relations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_graph() -> SocialGraph {
        let records: Vec<EdgeRecord> = serde_json::from_str(
            r#"[{
                "node": {"id": 1, "label": ["User"], "attributes": {"name": "A", "login": "a"}},
                "relationship": {"type": "follows"},
                "target_node": {"id": 2, "label": ["Group"], "attributes": {"name": "B"}}
            }]"#,
        )
        .expect("records parse");
        SocialGraph::from_records(&records, &[])
    }

    #[test]
    fn detail_from_graph_flattens_outgoing_relations() {
        let graph = scenario_graph();
        let detail = detail_from_graph(&graph, "1").expect("detail exists");

        assert_eq!(detail.name, "A");
        assert_eq!(detail.kind, NodeKind::User);
        assert_eq!(detail.relations.len(), 1);
        assert_eq!(detail.relations[0].kind, "follows");
        assert_eq!(detail.relations[0].target_name, "B");
    }

    #[test]
    fn detail_from_records_prefers_the_wire_attributes() {
        let graph = scenario_graph();
        let records: Vec<EdgeRecord> = serde_json::from_str(
            r#"[{
                "node": {"id": 1, "label": ["User"], "attributes": {"name": "A", "city": "Riga"}},
                "relationship": {"type": "follows"},
                "target_node": {"id": 2, "label": ["Group"], "attributes": {"name": "B"}}
            }]"#,
        )
        .expect("records parse");

        let detail = detail_from_records("1", &records, &graph).expect("detail exists");
        assert!(detail.attributes.contains_key("city"));
    }

    #[test]
    fn empty_detail_records_mean_unavailable() {
        let graph = scenario_graph();
        assert!(detail_from_records("1", &[], &graph).is_none());
    }

    #[test]
    fn unknown_node_has_no_local_detail() {
        let graph = scenario_graph();
        assert!(detail_from_graph(&graph, "nope").is_none());
    }
}
