mod config;
mod game;
mod sim;
mod snake;
mod term;

use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};
use log::info;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> Result<()> {
    let config = config::Config::parse();
    config.validate()?;
    init_logging(&config)?;

    info!(
        "Starting {}x{} board, {}ms per tick, seed {:?}",
        config.width, config.height, config.tick_ms, config.seed
    );

    let mut game = game::SnakeGame::new(&config)?;
    game.run()
}

fn init_logging(config: &config::Config) -> Result<()> {
    // The board owns the terminal, so stderr only gets warnings unless
    // RUST_LOG asks for more.
    let (default_filter, target) = match &config.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Error creating log file {}", path.display()))?;
            ("info", Target::Pipe(Box::new(file)))
        },
        None => ("warn", Target::Stderr),
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .target(target)
        .init();
    Ok(())
}
