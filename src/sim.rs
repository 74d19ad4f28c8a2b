use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::snake::{Heading, Position, Snake};

/// Random probes tried before falling back to enumerating free cells.
const FOOD_SAMPLE_ATTEMPTS: usize = 32;

const START_HEADING: Heading = Heading::Right;

/// Board dimensions in cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: u16,
    pub height: u16,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        Grid { width, height }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    pub fn center(&self) -> Position {
        Position::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    pub fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| Position::new(x, y)))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Running,
    Over,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EndReason {
    Wall,
    SelfCollision,
    /// The body covers every cell, so no food can be placed.
    BoardFull,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The round was already over; nothing happened.
    Idle,
    Moved,
    Ate,
    Ended(EndReason),
}

/// Read-only copy of the simulation state for renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub grid: Grid,
    /// Head first.
    pub body: Vec<Position>,
    pub heading: Heading,
    pub food: Option<Position>,
    pub status: RoundStatus,
    pub end_reason: Option<EndReason>,
}

impl Snapshot {
    pub fn head(&self) -> Position {
        self.body[0]
    }
}

pub struct SimulationCore {
    grid: Grid,
    snake: Snake,
    pending: Option<Heading>,
    food: Option<Position>,
    status: RoundStatus,
    end_reason: Option<EndReason>,
    rng: Pcg32,
}

impl SimulationCore {
    pub fn new(grid: Grid) -> Self {
        SimulationCore::from_rng(grid, Pcg32::from_entropy())
    }

    pub fn with_seed(grid: Grid, seed: u64) -> Self {
        SimulationCore::from_rng(grid, Pcg32::seed_from_u64(seed))
    }

    fn from_rng(grid: Grid, rng: Pcg32) -> Self {
        let mut core = SimulationCore {
            grid,
            snake: Snake::new(grid.center(), START_HEADING),
            pending: None,
            food: None,
            status: RoundStatus::Running,
            end_reason: None,
            rng,
        };
        core.reset();
        core
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Queues a turn for the next tick. Reversals and requests made after
    /// the round ended are dropped; a later request replaces an earlier one.
    pub fn request_direction(&mut self, heading: Heading) {
        if self.status == RoundStatus::Over {
            return;
        }

        if heading.is_opposite(self.snake.heading()) {
            trace!("Ignoring reversal to {:?}", heading);
            return;
        }

        self.pending = Some(heading);
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status == RoundStatus::Over {
            return TickOutcome::Idle;
        }

        if let Some(heading) = self.pending.take() {
            self.snake.set_heading(heading);
        }

        let new_head = self.snake.next_head();

        if !self.grid.contains(new_head) {
            return self.end_round(EndReason::Wall);
        }

        // Checked against the whole body, tail included, before it moves.
        if self.snake.occupies(new_head) {
            return self.end_round(EndReason::SelfCollision);
        }

        let ate = self.food == Some(new_head);
        self.snake.advance(new_head, ate);

        if !ate {
            return TickOutcome::Moved;
        }

        self.food = self.generate_food();
        match self.food {
            Some(_) => TickOutcome::Ate,
            None => self.end_round(EndReason::BoardFull),
        }
    }

    pub fn reset(&mut self) {
        self.snake = Snake::new(self.grid.center(), START_HEADING);
        self.pending = None;
        self.status = RoundStatus::Running;
        self.end_reason = None;
        self.food = self.generate_food();

        if self.food.is_none() {
            // Only reachable on a 1x1 board.
            self.end_round(EndReason::BoardFull);
            return;
        }

        info!("New round on a {}x{} grid", self.grid.width, self.grid.height);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            body: self.snake.body().copied().collect(),
            heading: self.snake.heading(),
            food: self.food,
            status: self.status,
            end_reason: self.end_reason,
        }
    }

    /// Picks a free cell uniformly at random, or `None` if the body fills
    /// the board.
    fn generate_food(&mut self) -> Option<Position> {
        let free = self.grid.capacity().saturating_sub(self.snake.len());
        if free == 0 {
            return None;
        }

        let (w, h) = (self.grid.width as i32, self.grid.height as i32);
        for _ in 0..FOOD_SAMPLE_ATTEMPTS {
            let pos = Position::new(self.rng.gen_range(0..w), self.rng.gen_range(0..h));
            if !self.snake.occupies(pos) {
                debug!("Food placed at {:?}", pos);
                return Some(pos);
            }
        }

        let snake = &self.snake;
        let choices: Vec<Position> = self.grid.cells().filter(|pos| !snake.occupies(*pos)).collect();
        let food = choices.choose(&mut self.rng).copied();
        debug!("Food placed at {:?} after sampling {} free cells", food, choices.len());
        food
    }

    fn end_round(&mut self, reason: EndReason) -> TickOutcome {
        self.status = RoundStatus::Over;
        self.end_reason = Some(reason);
        self.pending = None;
        info!("Round over ({:?}) with length {}", reason, self.snake.len());
        TickOutcome::Ended(reason)
    }
}
