use eframe::egui::{self, vec2, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::super::highlight::selection_highlight;
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, kind_color, node_radius_3d,
    EDGE_COLOR, HOVER_COLOR, LABEL_COLOR, RELATED_COLOR, SELECTED_COLOR,
};
use super::super::scene::{
    perspective_scale, pick_node, pointer_ray, project_point, relax_once, scatter_cube,
    scatter_sphere, CUBE_EXTENT, SPHERE_RADIUS,
};
use super::super::{ViewMode, ViewModel};

impl ViewModel {
    /// Applies the placement policy of the active 3D mode. Placement is
    /// recomputed only when the mode changes, the graph is rebuilt, or the
    /// layout seed is re-rolled.
    fn ensure_scene_layout(&mut self) {
        if !self.mode.is_three_dimensional() || self.layout_applied == Some(self.mode) {
            return;
        }

        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };

        let mut rng = StdRng::seed_from_u64(self.layout_seed);
        let positions = match self.mode {
            ViewMode::Sphere3d => scatter_sphere(&mut rng, cache.nodes.len(), SPHERE_RADIUS),
            ViewMode::Relaxed3d => {
                let mut positions = scatter_cube(&mut rng, cache.nodes.len(), CUBE_EXTENT);
                relax_once(&mut positions, &cache.edges);
                positions
            }
            ViewMode::Force2d => return,
        };

        for (node, position) in cache.nodes.iter_mut().zip(positions) {
            node.pos3 = position;
        }
        self.layout_applied = Some(self.mode);
    }

    pub(in crate::app) fn draw_scene(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }
        self.ensure_scene_layout();

        // The relaxed variant keeps the camera focused on the layout origin.
        self.camera.pan_enabled = self.mode != ViewMode::Relaxed3d;

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        let orbiting = response.dragged_by(egui::PointerButton::Primary);
        if orbiting {
            self.camera.orbit(response.drag_delta());
        }
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.camera.pan(response.drag_delta());
            self.camera.halt_inertia();
        }
        if response.hovered() {
            let scroll = ui.input(|input| input.raw_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                self.camera.dolly(scroll);
            }
        }

        let coasting = !orbiting && self.camera.apply_inertia(delta_seconds);
        if orbiting || coasting {
            ui.ctx().request_repaint();
        }

        let view_projection = self.camera.view_projection(rect.aspect_ratio());

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            ui.label("The graph is empty.");
            return;
        };
        let max_degree = cache.max_degree;

        {
            let (nodes, view) = (&cache.nodes, &mut cache.view_scratch);
            view.screen_positions.clear();
            view.screen_radii.clear();
            view.depths.clear();
            view.world_positions.clear();
            view.pick_radii.clear();
            view.visible_mask.clear();

            for node in nodes {
                let world_radius = node_radius_3d(node.degree, max_degree);
                view.world_positions.push(node.pos3);
                view.pick_radii.push(world_radius * 1.4);

                match project_point(&view_projection, rect, node.pos3) {
                    Some((screen, depth)) => {
                        let radius =
                            (world_radius * perspective_scale(rect, depth)).clamp(1.5, 40.0);
                        view.visible_mask.push(circle_visible(rect, screen, radius));
                        view.screen_positions.push(screen);
                        view.screen_radii.push(radius);
                        view.depths.push(depth);
                    }
                    None => {
                        view.visible_mask.push(false);
                        view.screen_positions.push(Pos2::ZERO);
                        view.screen_radii.push(0.0);
                        view.depths.push(f32::INFINITY);
                    }
                }
            }
        }
        self.visible_node_count = cache
            .view_scratch
            .visible_mask
            .iter()
            .filter(|&&visible| visible)
            .count();

        let hovered = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| {
                let ray = pointer_ray(&view_projection, rect, pointer)?;
                pick_node(
                    &ray,
                    &cache.view_scratch.world_positions,
                    &cache.view_scratch.pick_radii,
                )
            });
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        let hovered_index = hovered.map(|(index, _)| index);

        // A click that hits no sphere clears the selection, which keeps the
        // detail panel hidden.
        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(hovered_index.and_then(|index| cache.nodes.get(index).map(|node| node.id.clone())))
        } else {
            None
        };

        let selected_index = self
            .selected
            .as_deref()
            .and_then(|id| cache.index_by_id.get(id).copied());
        let highlight = selected_index.map(|index| selection_highlight(cache, index));
        let selection_active = highlight.is_some();

        let mut visible_edge_count = 0usize;
        for &(source, target) in &cache.edges {
            if source == target || source >= cache.nodes.len() || target >= cache.nodes.len() {
                continue;
            }
            if !cache.view_scratch.depths[source].is_finite()
                || !cache.view_scratch.depths[target].is_finite()
            {
                continue;
            }
            if !cache.view_scratch.visible_mask[source]
                && !cache.view_scratch.visible_mask[target]
            {
                continue;
            }

            let is_related = highlight
                .as_ref()
                .is_some_and(|state| state.edges.contains(&(source, target)));
            let (width, color) = if is_related {
                (2.2, RELATED_COLOR)
            } else if selection_active {
                (1.0, dim_color(EDGE_COLOR, 0.4))
            } else {
                (1.3, EDGE_COLOR)
            };

            painter.line_segment(
                [
                    cache.view_scratch.screen_positions[source],
                    cache.view_scratch.screen_positions[target],
                ],
                Stroke::new(width, color),
            );
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        // Painter's algorithm: sort by view depth and draw far spheres first.
        {
            let view = &mut cache.view_scratch;
            view.draw_order.clear();
            view.draw_order.extend(0..view.depths.len());
            let depths = &view.depths;
            view.draw_order
                .sort_by(|a, b| depths[*b].total_cmp(&depths[*a]));
        }

        for index in cache.view_scratch.draw_order.clone() {
            if !cache.view_scratch.visible_mask[index] {
                continue;
            }

            let node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_index == Some(index);
            let is_hovered = hovered_index == Some(index);
            let is_related = highlight
                .as_ref()
                .is_some_and(|state| state.nodes.contains(&index));

            let base_color = kind_color(node.kind);
            let color = if is_selected {
                SELECTED_COLOR
            } else if is_hovered {
                HOVER_COLOR
            } else if is_related {
                blend_color(base_color, RELATED_COLOR, 0.45)
            } else if selection_active {
                dim_color(base_color, 0.45)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            // Offset cap as a cheap sphere shading cue.
            if radius > 3.0 {
                painter.circle_filled(
                    position - vec2(radius * 0.3, radius * 0.3),
                    radius * 0.3,
                    Color32::from_rgba_unmultiplied(255, 255, 255, 36),
                );
            }
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(12, 12, 12, 190)),
            );
            if is_selected {
                painter.circle_stroke(position, radius + 3.5, Stroke::new(1.4, SELECTED_COLOR));
            }

            if is_selected || is_hovered || is_related {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.name,
                    FontId::proportional(12.0),
                    LABEL_COLOR,
                );
            }
        }

        if let Some(index) = hovered_index {
            let node = &cache.nodes[index];
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  {} connections",
                    node.name,
                    node.kind.label(),
                    node.degree
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
    }
}
