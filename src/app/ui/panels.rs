use eframe::egui::{self, Align, Color32, Context, Layout, RichText};

use crate::engine::{Action, EntryStatus};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, now: f64) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("SOV Network");
                    ui.separator();
                    ui.label(format!("backend: {}", self.api_base));

                    let mut search = self.engine.search().to_owned();
                    let search_box = ui.add(
                        egui::TextEdit::singleline(&mut search)
                            .hint_text("Search nodes")
                            .desired_width(180.0),
                    );
                    if search_box.changed() {
                        self.engine.apply(Action::Search(search), now);
                    }

                    let refresh_button =
                        ui.add_enabled(!self.refresh.is_loading(), egui::Button::new("Refresh"));
                    if refresh_button.clicked() {
                        self.refresh.request_now(now);
                    }
                    if ui.button("Reset view").clicked() {
                        self.engine.apply(Action::ResetView, now);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if self.refresh.is_loading() {
                            ui.spinner();
                        }
                        ui.label(self.status_text());
                    });
                });

                if let Some(error) = self.engine.error().map(str::to_owned) {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(error).color(Color32::from_rgb(248, 113, 113)));
                        if ui.small_button("Dismiss").clicked() {
                            self.engine.apply(Action::DismissError, now);
                        }
                    });
                } else if let Some(notice) = self.engine.notice() {
                    ui.label(RichText::new(notice).color(Color32::from_rgb(134, 239, 172)));
                }
            });

        egui::SidePanel::left("organizations")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_org_list(ui, now));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_details(ui, now));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui, now));
    }

    fn status_text(&self) -> String {
        let graph = self.engine.graph();
        let queue = self.engine.scheduler().queue();
        let animating = queue
            .iter()
            .filter(|entry| entry.status == EntryStatus::Animating)
            .count();

        format!(
            "orgs {}  |  wallets {}  |  edges {}  |  queued {}  |  shown {}  |  polls {}",
            graph.orgs().len(),
            graph.users().len(),
            animating,
            queue.len() - animating,
            self.engine.scheduler().shown_count(),
            self.engine.snapshot_count()
        )
    }
}
