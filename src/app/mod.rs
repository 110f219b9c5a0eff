use std::sync::Arc;

use eframe::egui::{self, Context, Vec2};
use tracing::warn;

use crate::api::{HttpApi, NetworkApi};
use crate::config::EngineConfig;
use crate::engine::{Action, DemoRunner, EngineState, FileShownStore, RefreshEvent, RefreshLoop};

mod graph;
mod render_utils;
mod ui;

pub struct SovNetworkApp {
    config: EngineConfig,
    state: AppState,
}

enum AppState {
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: EngineState<FileShownStore>,
    refresh: RefreshLoop,
    demo: DemoRunner,
    api_base: String,
    drag_total: Vec2,
    last_frame_secs: Option<f64>,
}

impl SovNetworkApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Self {
        let now = cc.egui_ctx.input(|input| input.time);
        let state = Self::start(&config, now);
        Self { config, state }
    }

    fn start(config: &EngineConfig, now: f64) -> AppState {
        match HttpApi::new(&config.api_base) {
            Ok(api) => AppState::Ready(Box::new(ViewModel::new(Arc::new(api), config, now))),
            Err(error) => {
                warn!(%error, "could not build HTTP client");
                AppState::Error(error.to_string())
            }
        }
    }
}

impl ViewModel {
    fn new(api: Arc<dyn NetworkApi>, config: &EngineConfig, now: f64) -> Self {
        Self {
            engine: EngineState::new(
                FileShownStore::new(config.state_file.clone()),
                config.scheduler,
                config.canvas,
            ),
            refresh: RefreshLoop::new(
                Arc::clone(&api),
                config.poll_interval_secs,
                config.transfer_limit,
                now,
            ),
            demo: DemoRunner::new(api),
            api_base: config.api_base.clone(),
            drag_total: Vec2::ZERO,
            last_frame_secs: None,
        }
    }

    // Drains worker results and advances time-based state before drawing.
    fn pump(&mut self, now: f64) -> bool {
        match self.refresh.tick(now, self.engine.animations_idle()) {
            RefreshEvent::Loaded(snapshot) => {
                self.engine.apply(Action::SnapshotLoaded(snapshot), now)
            }
            RefreshEvent::Failed(error) => self.engine.apply(Action::FetchFailed(error), now),
            RefreshEvent::Idle | RefreshEvent::Skipped | RefreshEvent::Started => {}
        }

        for outcome in self.demo.poll() {
            if outcome.result.is_ok() {
                self.refresh.request_now(now);
            }
            self.engine.apply(Action::DemoFinished(outcome), now);
        }

        let dt = self
            .last_frame_secs
            .map(|last| (now - last) as f32)
            .unwrap_or(0.0)
            .clamp(0.0, 0.1);
        self.last_frame_secs = Some(now);
        self.engine.tick(now, dt)
    }

    fn dispose(&mut self) {
        let now = self.last_frame_secs.unwrap_or_default();
        self.refresh.dispose();
        self.demo.dispose();
        self.engine.apply(Action::Dispose, now);
    }
}

impl eframe::App for SovNetworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to start the network view");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start(&self.config, now));
                    }
                });
            }
            AppState::Ready(model) => {
                let moving = model.pump(now);
                model.show(ctx, now);

                if moving {
                    ctx.request_repaint();
                } else if model.refresh.is_loading() || model.demo.is_busy() {
                    ctx.request_repaint_after(std::time::Duration::from_millis(100));
                } else {
                    let until_poll = (model.refresh.next_due() - now).max(0.05);
                    ctx.request_repaint_after(std::time::Duration::from_secs_f64(until_poll));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

impl Drop for SovNetworkApp {
    fn drop(&mut self) {
        if let AppState::Ready(model) = &mut self.state {
            model.dispose();
        }
    }
}
