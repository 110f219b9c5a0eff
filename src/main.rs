mod api;
mod app;
mod config;
mod engine;
mod network;
mod telemetry;
mod util;

#[cfg(test)]
mod test_support;

use anyhow::anyhow;
use clap::Parser;
use tracing::info;

use crate::config::{Args, EngineConfig};

fn main() -> anyhow::Result<()> {
    telemetry::setup_tracing();

    let config = EngineConfig::from_args(Args::parse())?;
    info!(
        api_base = %config.api_base,
        state_file = %config.state_file.display(),
        "starting network view"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "sov-network",
        options,
        Box::new(move |cc| Ok(Box::new(app::SovNetworkApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("window closed with error: {error}"))
}
