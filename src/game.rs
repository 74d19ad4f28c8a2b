use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;

use crate::config::Config;
use crate::term::TermManager;
use crate::sim::{EndReason, RoundStatus, SimulationCore, TickOutcome};
use crate::snake::Heading::{self, *};

/// What a key press asks the game to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Heading),
    TogglePause,
    Restart,
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

pub struct SnakeGame {
    core: SimulationCore,
    term: TermManager,
    tick_interval: Duration,
    paused: bool,
}

impl SnakeGame {
    pub fn new(config: &Config) -> Result<Self> {
        let grid = config.grid();
        let core = match config.seed {
            Some(seed) => SimulationCore::with_seed(grid, seed),
            None => SimulationCore::new(grid),
        };
        let term = TermManager::new().context("Error reading terminal size")?;

        Ok(SnakeGame { core, term, tick_interval: config.tick_interval(), paused: false })
    }

    /// Runs until the player quits. The terminal is restored even when the
    /// game loop fails.
    pub fn run(&mut self) -> Result<()> {
        self.check_fits()?;

        self.term.setup().context("Error setting up terminal")?;
        let res = self.show_intro().and_then(|flow| match flow {
            Flow::Continue => self.play(),
            Flow::Quit => Ok(()),
        });
        self.term.restore().context("Error restoring terminal")?;

        res
    }

    fn check_fits(&self) -> Result<()> {
        let grid = self.core.snapshot().grid;
        let (need_w, need_h) = TermManager::required_size(grid);
        let (w, h) = self.term.get_terminal_size();

        if need_w > w as u32 || need_h > h as u32 {
            bail!(
                "terminal is {}x{} but a {}x{} board needs {}x{}",
                w, h, grid.width, grid.height, need_w, need_h
            );
        }
        Ok(())
    }

    fn show_intro(&mut self) -> Result<Flow> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin"
        ];

        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Flow::Quit);
        }

        self.term.hide_message()?;
        Ok(Flow::Continue)
    }

    fn play(&mut self) -> Result<()> {
        self.redraw()?;

        let mut next_tick = Instant::now() + self.tick_interval;

        loop {
            let now = Instant::now();

            if now < next_tick {
                if let Some(key_ev) = self.term.poll_key(next_tick - now)? {
                    if let Some(cmd) = key_command(&key_ev) {
                        if let Flow::Quit = self.apply(cmd)? {
                            return Ok(());
                        }
                    }
                }
                continue;
            }

            next_tick += self.tick_interval;
            if next_tick < now {
                // Fell behind (e.g. the process was suspended); don't burst.
                next_tick = now + self.tick_interval;
            }

            if self.paused || self.core.status() == RoundStatus::Over {
                continue;
            }

            let outcome = self.core.tick();
            self.term.draw_board(&self.core.snapshot())?;

            if let TickOutcome::Ended(reason) = outcome {
                self.game_over(reason)?;
            }
        }
    }

    fn apply(&mut self, cmd: Command) -> Result<Flow> {
        let over = self.core.status() == RoundStatus::Over;

        match cmd {
            Command::Quit => return Ok(Flow::Quit),
            Command::Restart if over => {
                self.core.reset();
                self.redraw()?;
            },
            Command::TogglePause if !over => self.toggle_pause()?,
            Command::Turn(heading) if !self.paused => self.core.request_direction(heading),
            _ => {}
        }

        Ok(Flow::Continue)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn redraw(&mut self) -> Result<()> {
        let snap = self.core.snapshot();

        self.term.clear()?;
        self.term.layout_board(snap.grid);
        self.term.draw_borders(snap.grid)?;
        self.term.draw_board(&snap)?;
        Ok(())
    }

    fn game_over(&mut self, reason: EndReason) -> Result<()> {
        let s = if reason == EndReason::BoardFull {"You won!"} else {"Game over!"};

        self.term.show_message(&[
            s,
            "",
            "Press Space to play again,",
            "or CTRL+C to quit."
        ])?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
        }

        self.paused = !self.paused;
        info!("Paused: {}", self.paused);
        Ok(())
    }
}

pub fn key_command(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let cmd = match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Command::Turn(Up),
        KeyCode::Char('a') | KeyCode::Left => Command::Turn(Left),
        KeyCode::Char('s') | KeyCode::Down => Command::Turn(Down),
        KeyCode::Char('d') | KeyCode::Right => Command::Turn(Right),
        KeyCode::Char(' ') | KeyCode::Enter => Command::Restart,
        KeyCode::Esc => Command::TogglePause,
        _ => return None,
    };

    Some(cmd)
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_turn() {
        assert_eq!(key_command(&key(KeyCode::Up)), Some(Command::Turn(Up)));
        assert_eq!(key_command(&key(KeyCode::Char('w'))), Some(Command::Turn(Up)));
        assert_eq!(key_command(&key(KeyCode::Left)), Some(Command::Turn(Left)));
        assert_eq!(key_command(&key(KeyCode::Char('a'))), Some(Command::Turn(Left)));
        assert_eq!(key_command(&key(KeyCode::Down)), Some(Command::Turn(Down)));
        assert_eq!(key_command(&key(KeyCode::Char('s'))), Some(Command::Turn(Down)));
        assert_eq!(key_command(&key(KeyCode::Right)), Some(Command::Turn(Right)));
        assert_eq!(key_command(&key(KeyCode::Char('d'))), Some(Command::Turn(Right)));
    }

    #[test]
    fn control_keys() {
        assert_eq!(key_command(&key(KeyCode::Esc)), Some(Command::TogglePause));
        assert_eq!(key_command(&key(KeyCode::Char(' '))), Some(Command::Restart));
        assert_eq!(key_command(&key(KeyCode::Enter)), Some(Command::Restart));
        assert_eq!(
            key_command(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn other_keys_do_nothing() {
        assert_eq!(key_command(&key(KeyCode::Char('c'))), None);
        assert_eq!(key_command(&key(KeyCode::Tab)), None);
        assert_eq!(key_command(&key(KeyCode::Char('q'))), None);
    }
}
