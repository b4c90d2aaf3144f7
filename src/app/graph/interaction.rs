use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_utils::{circle_visible, screen_to_world};
use super::super::ViewModel;

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 3.0;

// Screen-space slack added to a node's disc for hit testing.
const HIT_SLACK: f32 = 3.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(in crate::app) fn mark_visible(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_mask: &mut Vec<bool>,
    ) -> usize {
        visible_mask.clear();
        visible_mask.resize(screen_positions.len(), false);

        let mut visible = 0usize;
        for index in 0..screen_positions.len() {
            if circle_visible(rect, screen_positions[index], screen_radii[index]) {
                visible_mask[index] = true;
                visible += 1;
            }
        }
        visible
    }

    /// Closest visible node under the pointer, by screen distance.
    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_mask: &[bool],
    ) -> Option<(usize, f32)> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;

        (0..screen_positions.len())
            .filter(|&index| visible_mask.get(index).copied().unwrap_or(false))
            .filter_map(|index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index] + HIT_SLACK).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
