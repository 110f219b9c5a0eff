use eframe::egui::{self, Pos2, Rect, Ui};

use crate::engine::{Action, FrameNode};
use crate::network::NodeKey;

use super::super::ViewModel;
use super::super::render_utils::{CanvasFit, circle_visible};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        now: f64,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        // Scrolling up zooms in.
        self.engine.apply(Action::Zoom(-scroll), now);
    }

    pub(in crate::app) fn handle_graph_pan(
        &mut self,
        response: &egui::Response,
        fit: CanvasFit,
        now: f64,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.drag_total = egui::Vec2::ZERO;
            self.engine.apply(Action::BeginDrag, now);
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            self.drag_total += response.drag_delta();
            let movement = fit.screen_to_canvas_delta(self.drag_total);
            self.engine.apply(Action::DragBy(movement), now);
        }

        if response.drag_stopped() {
            self.engine.apply(Action::EndDrag, now);
        }
    }

    pub(in crate::app) fn hovered_node(
        ui: &Ui,
        rect: Rect,
        nodes: &[FrameNode],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<NodeKey> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                circle_visible(rect, screen_positions[*index], screen_radii[*index])
            })
            .filter_map(|(index, node)| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((node.key, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    pub(in crate::app) fn apply_graph_hover(&mut self, hovered: Option<NodeKey>, now: f64) {
        if self.engine.hovered() != hovered {
            self.engine.apply(Action::Hover(hovered), now);
        }
    }

    pub(in crate::app) fn apply_graph_selection(&mut self, selected: Option<NodeKey>, now: f64) {
        self.engine.apply(Action::Select(selected), now);
    }
}
