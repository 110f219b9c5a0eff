use std::path::PathBuf;

use anyhow::{Result, ensure};
use clap::Parser;

use crate::engine::SchedulerConfig;
use crate::network::Canvas;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the token backend.
    #[arg(long, default_value = "http://localhost:3000")]
    pub api_base: String,

    #[arg(long, default_value_t = 4000)]
    pub poll_interval_ms: u64,

    /// Number of most recent transfers requested per poll.
    #[arg(long, default_value_t = 30)]
    pub transfer_limit: usize,

    /// Maximum transfers animated from a single poll.
    #[arg(long, default_value_t = 8)]
    pub batch_cap: usize,

    #[arg(long, default_value_t = 800)]
    pub stagger_ms: u64,

    #[arg(long, default_value_t = 2000)]
    pub edge_duration_ms: u64,

    /// JSON file remembering transfers that were already animated.
    #[arg(long, default_value = ".sov-network/shown.json")]
    pub state_file: PathBuf,

    #[arg(long, default_value_t = 2000.0)]
    pub canvas_width: f32,

    #[arg(long, default_value_t = 1200.0)]
    pub canvas_height: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub api_base: String,
    pub poll_interval_secs: f64,
    pub transfer_limit: usize,
    pub scheduler: SchedulerConfig,
    pub state_file: PathBuf,
    pub canvas: Canvas,
}

impl EngineConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        ensure!(!args.api_base.trim().is_empty(), "--api-base must not be empty");
        ensure!(args.poll_interval_ms > 0, "--poll-interval-ms must be positive");
        ensure!(args.transfer_limit > 0, "--transfer-limit must be at least 1");
        ensure!(args.batch_cap > 0, "--batch-cap must be at least 1");
        ensure!(
            args.canvas_width.is_finite() && args.canvas_width > 0.0,
            "--canvas-width must be positive"
        );
        ensure!(
            args.canvas_height.is_finite() && args.canvas_height > 0.0,
            "--canvas-height must be positive"
        );

        Ok(Self {
            api_base: args.api_base,
            poll_interval_secs: millis_to_secs(args.poll_interval_ms),
            transfer_limit: args.transfer_limit,
            scheduler: SchedulerConfig {
                batch_cap: args.batch_cap,
                stagger_secs: millis_to_secs(args.stagger_ms),
                edge_duration_secs: millis_to_secs(args.edge_duration_ms),
            },
            state_file: args.state_file,
            canvas: Canvas {
                width: args.canvas_width,
                height: args.canvas_height,
            },
        })
    }
}

fn millis_to_secs(millis: u64) -> f64 {
    millis as f64 / 1000.0
}
