use eframe::egui::{self, RichText, Ui};

use crate::engine::{Action, DemoAction};
use crate::network::NodeKey;
use crate::util::{format_balance, short_address};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_org_list(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Organizations");
        ui.add_space(6.0);

        if self.engine.graph().orgs().is_empty() {
            ui.label("No organizations loaded.");
            return;
        }

        let mut pending = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("org_list_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let graph = self.engine.graph();
                for org in graph.orgs() {
                    let key = NodeKey::Org(org.id);
                    let selected = self.engine.selected() == Some(key);

                    ui.group(|ui| {
                        if ui
                            .selectable_label(selected, RichText::new(&org.name).strong())
                            .clicked()
                        {
                            pending.push(Action::Select(Some(key)));
                        }
                        ui.small(format!(
                            "#{}  |  treasury {} SOV",
                            org.id,
                            format_balance(graph.org_balance(org.id))
                        ));
                        ui.horizontal(|ui| {
                            if ui.button("Demo purchase").clicked() {
                                pending.push(Action::DemoSubmitted(DemoAction::purchase(
                                    org.id,
                                    &mut rand::rng(),
                                )));
                            }
                            if ui.button("Create user").clicked() {
                                pending.push(Action::DemoSubmitted(DemoAction::create_user(
                                    org.id,
                                    &org.credential,
                                )));
                            }
                        });
                    });
                }
            });

        for action in pending {
            if let Action::DemoSubmitted(demo) = &action {
                self.demo.submit(demo.clone());
            }
            self.engine.apply(action, now);
        }

        if self.demo.is_busy() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Running demo action...");
            });
        }
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Selection");
        ui.add_space(6.0);

        match self.engine.selected().and_then(|key| self.engine.tooltip(key)) {
            Some(lines) => {
                let mut lines = lines.into_iter();
                if let Some(title) = lines.next() {
                    ui.label(RichText::new(title).strong());
                }
                for line in lines {
                    ui.label(line);
                }
                if ui.small_button("Clear selection").clicked() {
                    self.engine.apply(Action::Select(None), now);
                }
            }
            None => {
                ui.label("Select a node from the graph or the lists.");
            }
        }

        ui.separator();
        ui.label(RichText::new("Wallets").strong());

        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("wallet_list_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, self.engine.graph().users().len(), |ui, row_range| {
                let graph = self.engine.graph();
                for user in &graph.users()[row_range] {
                    let key = NodeKey::User(user.id);
                    let label = format!(
                        "#{}  {}  {} SOV",
                        user.user_id,
                        short_address(&user.address),
                        format_balance(user.balance)
                    );
                    let response = ui
                        .selectable_label(self.engine.selected() == Some(key), label)
                        .on_hover_text(format!("{}  |  {}", user.address, graph.owner_name(user)));
                    if response.clicked() {
                        clicked = Some(key);
                    }
                }
            });

        if let Some(key) = clicked {
            self.engine.apply(Action::Select(Some(key)), now);
        }
    }
}
