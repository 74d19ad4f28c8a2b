use crate::{TermInt, Coords};
use crate::sim::{EndReason, Grid, RoundStatus, Snapshot};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

// Each board cell is two terminal columns wide so it looks roughly square.
const EMPTY_CELL: [char; 2] = [' ', ' '];
const BODY_CELL: [char; 2] = ['█', '█'];
const FOOD_CELL: [char; 2] = ['(', ')'];
const DEAD_CELL: [char; 2] = ['X', 'X'];

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    board_origin: Coords,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, board_origin: (0, 0) })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    /// Waits up to `timeout` for a key press.
    pub fn poll_key(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if poll(timeout)? {
            if let Event::Key(ev) = read()? {
                return Ok(Some(ev));
            }
        }

        Ok(None)
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    /// Terminal size needed to show `grid` with its border.
    pub fn required_size(grid: Grid) -> (u32, u32) {
        (grid.width as u32 * 2 + 2, grid.height as u32 + 2)
    }

    /// Centers the board in the terminal. The caller must have checked that
    /// the board fits.
    pub fn layout_board(&mut self, grid: Grid) {
        let (need_w, need_h) = TermManager::required_size(grid);
        let x = (self.width as u32).saturating_sub(need_w) / 2;
        let y = (self.height as u32).saturating_sub(need_h) / 2;
        self.board_origin = (x as TermInt, y as TermInt);
    }

    pub fn draw_borders(&mut self, grid: Grid) -> Result<()> {
        let (width, height) = TermManager::required_size(grid);
        let (width, height) = (width as TermInt, height as TermInt);
        let (ox, oy) = self.board_origin;

        let end_x = ox + width - 1;
        let end_y = oy + height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == width - 1 {'+'} else {'-'};
            self.print_at((ox + x, oy), ch)?;
            self.print_at((ox + x, end_y), ch)?;
        }

        for y in 1..height - 1 {
            self.print_at((ox, oy + y), '|')?;
            self.print_at((end_x, oy + y), '|')?;
        }

        self.flush()
    }

    /// Draws every board cell whose content changed since the last draw.
    pub fn draw_board(&mut self, snap: &Snapshot) -> Result<()> {
        let grid = snap.grid;
        let mut cells = vec![EMPTY_CELL; grid.capacity()];
        let index = |x: i32, y: i32| y as usize * grid.width as usize + x as usize;

        if let Some(food) = snap.food {
            cells[index(food.x, food.y)] = FOOD_CELL;
        }

        let crashed = snap.status == RoundStatus::Over && snap.end_reason != Some(EndReason::BoardFull);
        let head = head_char(snap);

        for (i, pos) in snap.body.iter().enumerate() {
            cells[index(pos.x, pos.y)] = if crashed {
                DEAD_CELL
            } else if i == 0 {
                [head, head]
            } else {
                BODY_CELL
            };
        }

        let (ox, oy) = self.board_origin;
        for (i, cell) in cells.iter().enumerate() {
            let x = (i % grid.width as usize) as TermInt;
            let y = (i / grid.width as usize) as TermInt;
            let term_x = ox + 1 + x * 2;
            let term_y = oy + 1 + y;

            for (col, ch) in cell.iter().enumerate() {
                let pos = (term_x + col as TermInt, term_y);
                if self.screen_at(pos) != *ch {
                    self.print_at(pos, *ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let longest = lines.iter().map(|x| x.chars().count()).max().unwrap_or(0);
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (longest + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                let ch = self.screen_at(pos);
                self.print_at_no_save(pos, ch)?;
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> Result<()> {
        if let Some(i) = self.screen_index(pos) {
            self.screen[i] = ch;
        }
        self.print_at_no_save(pos, ch)
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    fn screen_index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn screen_at(&self, pos: Coords) -> char {
        self.screen_index(pos).map_or(' ', |i| self.screen[i])
    }
}

fn head_char(snap: &Snapshot) -> char {
    use crate::snake::Heading::*;

    match snap.heading {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: Coords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> Coords {
        self.top_left
    }
}
