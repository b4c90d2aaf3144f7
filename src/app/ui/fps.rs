use eframe::egui::Context;

use super::super::ViewModel;

const SAMPLE_WINDOW: usize = 120;

impl ViewModel {
    pub(in crate::app) fn update_frame_stats(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn frame_stats_text(&self) -> Option<String> {
        if !self.show_frame_stats || self.fps_samples.is_empty() {
            return None;
        }

        let average = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!(
            "{:.0} fps (avg {average:.0}, {:.1} ms)",
            self.fps_current,
            1000.0 / self.fps_current.max(0.001)
        ))
    }
}
