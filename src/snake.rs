use std::collections::{HashSet, VecDeque};

use Heading::*;

/// Cell coordinates on the board. `y` grows downward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn stepped(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right
}

impl Heading {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Heading {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_opposite(self, other: Heading) -> bool {
        self.opposite() == other
    }
}

/// The actor: body cells head-first plus the set of cells they occupy.
///
/// Both collections are only mutated together in `advance`, so the set is
/// always an exact mirror of the sequence.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Position>,
    occupied: HashSet<Position>,
    heading: Heading,
}

impl Snake {
    pub fn new(head: Position, heading: Heading) -> Self {
        Snake::from_segments(vec![head], heading)
    }

    /// Builds a snake from explicit segments, head first.
    pub fn from_segments(segments: Vec<Position>, heading: Heading) -> Self {
        let occupied = segments.iter().copied().collect();
        Snake { body: segments.into(), occupied, heading }
    }

    pub fn head(&self) -> Position {
        // Never empty: every constructor gets at least one segment and
        // `advance` pushes before it pops.
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = &Position> + '_ {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn next_head(&self) -> Position {
        self.head().stepped(self.heading)
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.occupied.contains(&pos)
    }

    /// Prepends `new_head` and drops the tail unless `grow` is set.
    /// Returns the dropped tail cell.
    ///
    /// The caller must have checked that `new_head` is not already occupied.
    pub fn advance(&mut self, new_head: Position, grow: bool) -> Option<Position> {
        debug_assert!(!self.occupies(new_head));

        self.body.push_front(new_head);
        self.occupied.insert(new_head);

        if grow {
            return None;
        }

        let old_tail = self.body.pop_back();
        if let Some(tail) = old_tail {
            self.occupied.remove(&tail);
        }
        old_tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn headings_step_one_cell() {
        let origin = pos(5, 5);
        assert_eq!(origin.stepped(Up), pos(5, 4));
        assert_eq!(origin.stepped(Down), pos(5, 6));
        assert_eq!(origin.stepped(Left), pos(4, 5));
        assert_eq!(origin.stepped(Right), pos(6, 5));

        for h in [Up, Down, Left, Right].iter() {
            let (dx, dy) = h.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn opposites() {
        assert!(Right.is_opposite(Left));
        assert!(Up.is_opposite(Down));
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Right));
        assert_eq!(Down.opposite().opposite(), Down);
    }

    #[test]
    fn advance_without_growth_keeps_length() {
        let mut snake = Snake::from_segments(vec![pos(3, 1), pos(2, 1), pos(1, 1)], Right);

        let tail = snake.advance(snake.next_head(), false);

        assert_eq!(tail, Some(pos(1, 1)));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), pos(4, 1));
        assert!(snake.occupies(pos(4, 1)));
        assert!(!snake.occupies(pos(1, 1)));
    }

    #[test]
    fn advance_with_growth_keeps_tail() {
        let mut snake = Snake::new(pos(0, 0), Down);

        assert_eq!(snake.advance(snake.next_head(), true), None);

        assert_eq!(snake.len(), 2);
        let cells: Vec<_> = snake.body().copied().collect();
        assert_eq!(cells, vec![pos(0, 1), pos(0, 0)]);
        assert!(snake.occupies(pos(0, 0)));
    }
}
