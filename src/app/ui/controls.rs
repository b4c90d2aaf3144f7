use eframe::egui::{self, Ui};

use super::super::{GraphSource, ViewMode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, reload_requested: &mut bool) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("View mode");
        ui.horizontal_wrapped(|ui| {
            for mode in [ViewMode::Force2d, ViewMode::Sphere3d, ViewMode::Relaxed3d] {
                let hover = match mode {
                    ViewMode::Force2d => "Force-directed layout with drag, zoom and pan.",
                    ViewMode::Sphere3d => "Random placement in a sphere volume, orbit camera.",
                    ViewMode::Relaxed3d => {
                        "Cube placement with one relaxation pass; camera pan is disabled."
                    }
                };
                ui.selectable_value(&mut self.mode, mode, mode.label())
                    .on_hover_text(hover);
            }
        });

        ui.separator();
        ui.label("Data source");
        ui.horizontal(|ui| {
            let was = self.source;
            ui.selectable_value(&mut self.source, GraphSource::Api, "API")
                .on_hover_text("Fetch the graph from the configured endpoint.");
            ui.selectable_value(&mut self.source, GraphSource::Synthetic, "Synthetic")
                .on_hover_text("Generate a 20-node sample graph locally.");
            if was != self.source {
                *reload_requested = true;
            }
        });
        if self.source == GraphSource::Synthetic {
            ui.horizontal(|ui| {
                ui.label("Seed");
                ui.add(egui::DragValue::new(&mut self.seed));
                if ui.button("Regenerate").clicked() {
                    *reload_requested = true;
                }
            });
        }

        ui.separator();
        ui.label("Search")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the layout.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();
        ui.label("Force layout");
        let mut force_changed = false;
        force_changed |= ui
            .add(
                egui::Slider::new(&mut self.force_params.link_distance, 30.0..=300.0)
                    .text("link distance"),
            )
            .changed();
        force_changed |= ui
            .add(
                egui::Slider::new(&mut self.force_params.charge_strength, -600.0..=0.0)
                    .text("charge"),
            )
            .changed();
        force_changed |= ui
            .add(
                egui::Slider::new(&mut self.force_params.velocity_decay, 0.05..=0.9)
                    .text("velocity decay"),
            )
            .changed();
        if force_changed {
            self.simulation.reheat();
        }

        ui.checkbox(&mut self.spin_enabled, "Spin layout (10\u{b0}/s)")
            .on_hover_text("Rotates the 2D layout around its centroid once a second.");
        if ui.button("Restart simulation").clicked() {
            self.simulation.reheat();
        }
        ui.small(format!("simulation alpha: {:.3}", self.simulation.alpha()));
        ui.checkbox(&mut self.show_frame_stats, "Show frame stats");

        ui.separator();
        ui.label("3D placement");
        if ui
            .button("Re-roll placement")
            .on_hover_text("Scatter the 3D nodes again with a fresh seed.")
            .clicked()
        {
            self.layout_seed = self.layout_seed.wrapping_add(1);
            self.layout_applied = None;
        }

        ui.separator();
        ui.label(egui::RichText::new("Most connected").strong());
        let ranking = self.most_connected.clone();
        for (id, degree) in ranking {
            let Some(node) = self.graph.node(&id) else {
                continue;
            };
            let label = format!("{}  ({degree})", node.name);
            if ui.link(label).on_hover_text(id.as_str()).clicked() {
                self.set_selected(Some(id));
            }
        }
    }
}
