use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;

use crate::sim::Grid;

/// Terminal snake.
#[derive(Parser, Debug, Clone)]
#[command(name = "snake", version, about = "Grid snake in the terminal")]
pub struct Config {
    /// Board width in cells
    #[arg(long, default_value_t = 30)]
    pub width: u16,

    /// Board height in cells
    #[arg(long, default_value_t = 24)]
    pub height: u16,

    /// Milliseconds between simulation ticks
    #[arg(long, default_value_t = 200)]
    pub tick_ms: u64,

    /// Seed for food placement; random if omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width >= 2 && self.height >= 2,
            "board must be at least 2x2 cells, got {}x{}",
            self.width,
            self.height
        );
        ensure!(self.tick_ms > 0, "tick interval must be positive");
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
