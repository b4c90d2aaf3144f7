use std::collections::VecDeque;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::graph::SocialGraph;
use crate::util::truncate_middle;

use super::super::physics::{ForceParams, Simulation};
use super::super::scene::OrbitCamera;
use super::super::{GraphSource, NodeDetailState, ViewMode, ViewModel};

impl ViewModel {
    pub(in crate::app) const RANKING_LIMIT: usize = 12;

    pub(in crate::app) fn new(
        graph: SocialGraph,
        source: GraphSource,
        seed: u64,
        api_base: String,
        agent: ureq::Agent,
    ) -> Self {
        let most_connected = graph
            .top_by_degree(Self::RANKING_LIMIT)
            .into_iter()
            .map(|(index, degree)| (graph.nodes[index].id.clone(), degree))
            .collect();

        Self {
            graph,
            source,
            seed,
            api_base,
            agent,
            mode: ViewMode::Force2d,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            camera: OrbitCamera::new(),
            force_params: ForceParams::default(),
            simulation: Simulation::new(),
            spin_enabled: false,
            spin_last_tick_secs: None,
            layout_seed: seed,
            layout_applied: None,
            drag_index: None,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            detail: NodeDetailState::Idle,
            detail_rx: None,
            most_connected,
            show_frame_stats: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.update_frame_stats(ctx);
        self.poll_detail();
        if matches!(self.detail, NodeDetailState::Loading { .. }) {
            ctx.request_repaint_after(std::time::Duration::from_millis(150));
        }

        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("sociogram");
                    ui.separator();
                    ui.label(format!("source: {}", self.source.label()));
                    if self.source == GraphSource::Api {
                        ui.label(truncate_middle(&self.api_base, 36));
                    }
                    ui.label(format!("nodes: {}", self.graph.node_count()));
                    ui.label(format!("edges: {}", self.graph.edge_count()));

                    let reload_label = match self.source {
                        GraphSource::Api => "Reload graph",
                        GraphSource::Synthetic => "Regenerate graph",
                    };
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new(reload_label));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(frame_stats) = self.frame_stats_text() {
                            ui.label(frame_stats);
                        }
                        ui.label(format!(
                            "visible: {} nodes / {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(310.0)
            .show(ctx, |ui| self.draw_controls(ui, reload_requested));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_reloading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading social graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else if self.mode.is_three_dimensional() {
                self.draw_scene(ui);
            } else {
                self.draw_force(ui);
            }
        });
    }
}
