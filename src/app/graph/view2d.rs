use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::super::highlight::selection_highlight;
use super::super::physics::{rotate_about_centroid, step_simulation};
use super::super::render_utils::{
    blend_color, dim_color, draw_background, draw_grid, kind_color, screen_to_world,
    world_to_screen, EDGE_COLOR, HOVER_COLOR, LABEL_COLOR, MATCH_COLOR, RELATED_COLOR,
    SELECTED_COLOR,
};
use super::super::{SearchMatchCache, ViewModel};

const SPIN_INTERVAL_SECS: f64 = 1.0;
// 10 degrees per tick.
const SPIN_STEP_RADIANS: f32 = 0.174_532_92;

fn segment_bbox_intersects(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let min_x = start.x.min(end.x);
    let max_x = start.x.max(end.x);
    let min_y = start.y.min(end.y);
    let max_y = start.y.max(end.y);
    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selected.is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let hit = matcher
                    .fuzzy_match(&node.name, query)
                    .or_else(|| matcher.fuzzy_match(&node.id, query))
                    .is_some();
                hit.then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_force(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect);
        draw_grid(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.cached_search_matches();
        let now = ui.ctx().input(|input| input.time);
        let pan = self.pan;
        let zoom = self.zoom;

        if !self.spin_enabled {
            self.spin_last_tick_secs = None;
        }

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            ui.label("The graph is empty.");
            return;
        };

        // The spin animation runs on its own 1 Hz schedule: a rigid rotation
        // of the whole layout around its centroid, followed by a reheat so
        // the simulation re-settles from the rotated state.
        if self.spin_enabled {
            match self.spin_last_tick_secs {
                None => self.spin_last_tick_secs = Some(now),
                Some(last) if now - last >= SPIN_INTERVAL_SECS => {
                    rotate_about_centroid(cache, SPIN_STEP_RADIANS);
                    self.simulation.reheat();
                    self.spin_last_tick_secs = Some((last + SPIN_INTERVAL_SECS).max(now - SPIN_INTERVAL_SECS));
                }
                Some(_) => {}
            }
            ui.ctx().request_repaint_after(Duration::from_millis(120));
        }

        let physics_moving = step_simulation(cache, &mut self.simulation, &self.force_params);
        if physics_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        {
            let (nodes, view) = (&cache.nodes, &mut cache.view_scratch);
            view.screen_positions.clear();
            view.screen_radii.clear();
            for node in nodes {
                view.screen_positions
                    .push(world_to_screen(rect, pan, zoom, node.pos2));
                view.screen_radii
                    .push((node.base_radius * zoom.powf(0.7)).clamp(2.0, 44.0));
            }
        }

        self.visible_node_count = Self::mark_visible(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_mask,
        );

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &cache.view_scratch.visible_mask,
        );
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        let hovered_index = hovered.map(|(index, _)| index);

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
        let matches_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let zoom_sqrt = zoom.sqrt();
        let mut visible_edge_count = 0usize;
        for &(source, target) in &cache.edges {
            if source == target || source >= cache.nodes.len() || target >= cache.nodes.len() {
                continue;
            }

            let start = cache.view_scratch.screen_positions[source];
            let end = cache.view_scratch.screen_positions[target];
            let either_visible = cache.view_scratch.visible_mask[source]
                || cache.view_scratch.visible_mask[target];
            if !either_visible && !segment_bbox_intersects(rect, start, end) {
                continue;
            }

            let is_related = highlight
                .as_ref()
                .is_some_and(|state| state.edges.contains(&(source, target)));
            let (width, color) = if is_related {
                ((2.6 * zoom_sqrt).clamp(1.2, 4.2), RELATED_COLOR)
            } else if selection_active {
                ((1.4 * zoom_sqrt).clamp(0.5, 2.4), dim_color(EDGE_COLOR, 0.4))
            } else {
                ((2.0 * zoom_sqrt).clamp(0.7, 3.2), EDGE_COLOR)
            };

            painter.line_segment([start, end], Stroke::new(width, color));
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        {
            let view = &mut cache.view_scratch;
            if view.draw_order.len() != cache.nodes.len() {
                view.draw_order.clear();
                view.draw_order.extend(0..cache.nodes.len());
                let nodes = &cache.nodes;
                view.draw_order
                    .sort_by(|a, b| nodes[*a].degree.cmp(&nodes[*b].degree));
            }
        }

        let mut selection_animating = false;
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
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = kind_color(node.kind);
            let unselected_color = if is_hovered {
                HOVER_COLOR
            } else if is_related {
                blend_color(base_color, RELATED_COLOR, 0.45)
            } else if is_match {
                blend_color(base_color, MATCH_COLOR, 0.6)
            } else if selection_active {
                dim_color(base_color, 0.45)
            } else if matches_active {
                dim_color(base_color, 0.4)
            } else {
                base_color
            };

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("force-node-selection", node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            let color = blend_color(unselected_color, SELECTED_COLOR, selection_mix);
            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    1.0 + selection_mix * 1.4,
                    Color32::from_rgba_unmultiplied(12, 12, 12, 190),
                ),
            );
            if selection_mix > 0.0 {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(
                        1.4,
                        Color32::from_rgba_unmultiplied(245, 206, 93, (selection_mix * 160.0) as u8),
                    ),
                );
            }

            let labeled = is_selected
                || is_hovered
                || is_related
                || (is_match && zoom > 0.5)
                || radius > 15.0
                || zoom > 1.3;
            if labeled {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.name,
                    FontId::proportional(12.0),
                    LABEL_COLOR,
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
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

        // Node dragging pins the grabbed node to the pointer and reheats the
        // simulation toward alpha 0.3; releasing unpins and lets it cool.
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(index) = hovered_index
        {
            self.drag_index = Some(index);
            self.simulation.set_alpha_target(0.3);
        }

        if let Some(drag_index) = self.drag_index {
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
            {
                let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                if let Some(cache) = self.graph_cache.as_mut()
                    && let Some(node) = cache.nodes.get_mut(drag_index)
                {
                    node.pinned = Some(world);
                }
                ui.ctx().request_repaint();
            }

            if response.drag_stopped_by(egui::PointerButton::Primary) {
                if let Some(cache) = self.graph_cache.as_mut()
                    && let Some(node) = cache.nodes.get_mut(drag_index)
                {
                    node.pinned = None;
                }
                self.drag_index = None;
                self.simulation.set_alpha_target(0.0);
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            self.pan += response.drag_delta();
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
    }
}
