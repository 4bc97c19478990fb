//! Core domain types: colors, phases, and grid coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two competing colors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// Red places vertical walls.
    Red,
    /// Blue places horizontal walls.
    Blue,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// Edge orientation this color is allowed to edit.
    pub fn wall_orientation(self) -> Orientation {
        match self {
            Color::Red => Orientation::Vertical,
            Color::Blue => Orientation::Horizontal,
        }
    }
}

/// Orientation of an edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Orientation {
    /// Odd row, even column: separates horizontally adjacent cells.
    Vertical,
    /// Even row, odd column: separates vertically adjacent cells.
    Horizontal,
}

/// Turn phase gating which operations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Walls may be toggled; movement is rejected.
    PlacingWalls,
    /// Walls are locked in; the acting color may move.
    MovingPlayer,
}

/// What a grid position denotes, derived from coordinate parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Both even. Decorative, holds no state.
    Corner,
    /// Both odd. Holds occupant markers.
    Cell,
    /// Exactly one odd. Holds a wall state.
    Edge(Orientation),
}

/// A position on the (2·height+1) × (2·width+1) grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    /// Grid row.
    pub row: u16,
    /// Grid column.
    pub col: u16,
}

impl Coord {
    /// Creates a grid coordinate.
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// Grid coordinate of the cell at `(cell_row, cell_col)` in cell units.
    pub const fn cell(cell_row: u16, cell_col: u16) -> Self {
        Self {
            row: cell_row * 2 + 1,
            col: cell_col * 2 + 1,
        }
    }

    /// Classifies this coordinate by parity.
    pub const fn kind(self) -> SlotKind {
        match (self.row % 2 == 1, self.col % 2 == 1) {
            (false, false) => SlotKind::Corner,
            (true, true) => SlotKind::Cell,
            (true, false) => SlotKind::Edge(Orientation::Vertical),
            (false, true) => SlotKind::Edge(Orientation::Horizontal),
        }
    }

    /// True for cell coordinates.
    pub const fn is_cell(self) -> bool {
        matches!(self.kind(), SlotKind::Cell)
    }

    /// Orientation if this is an edge coordinate.
    pub const fn edge_orientation(self) -> Option<Orientation> {
        match self.kind() {
            SlotKind::Edge(orientation) => Some(orientation),
            _ => None,
        }
    }

    /// Applies a signed grid offset, returning `None` on underflow.
    pub fn offset(self, d_row: i32, d_col: i32) -> Option<Self> {
        let row = i32::from(self.row).checked_add(d_row)?;
        let col = i32::from(self.col).checked_add(d_col)?;
        Some(Self {
            row: u16::try_from(row).ok()?,
            col: u16::try_from(col).ok()?,
        })
    }

    /// Destination of a one-cell hop in `direction` (two grid units).
    pub fn hop(self, direction: Direction) -> Option<Self> {
        let (d_row, d_col) = direction.delta();
        self.offset(d_row * 2, d_col * 2)
    }

    /// Edge coordinate between two orthogonally adjacent cells.
    ///
    /// Returns `None` if the cells are not exactly one hop apart.
    pub fn midpoint(self, other: Self) -> Option<Self> {
        let d_row = i32::from(other.row) - i32::from(self.row);
        let d_col = i32::from(other.col) - i32::from(self.col);
        match (d_row.abs(), d_col.abs()) {
            (2, 0) | (0, 2) => self.offset(d_row / 2, d_col / 2),
            _ => None,
        }
    }

    /// Manhattan distance in grid units.
    pub fn manhattan(self, other: Self) -> u32 {
        u32::from(self.row.abs_diff(other.row)) + u32::from(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal hop directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Toward increasing columns.
    East,
    /// Toward increasing rows.
    South,
    /// Toward decreasing columns.
    West,
}

impl Direction {
    /// All four directions in search order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit `(row, col)` step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

/// A value kept once per color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerColor<T> {
    /// Red's value.
    pub red: T,
    /// Blue's value.
    pub blue: T,
}

impl<T> PerColor<T> {
    /// Creates a pair from both values.
    pub const fn new(red: T, blue: T) -> Self {
        Self { red, blue }
    }

    /// Borrows the value for `color`.
    pub fn get(&self, color: Color) -> &T {
        match color {
            Color::Red => &self.red,
            Color::Blue => &self.blue,
        }
    }

    /// Mutably borrows the value for `color`.
    pub fn get_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::Red => &mut self.red,
            Color::Blue => &mut self.blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_classification() {
        assert_eq!(Coord::new(0, 0).kind(), SlotKind::Corner);
        assert_eq!(Coord::new(1, 1).kind(), SlotKind::Cell);
        assert_eq!(
            Coord::new(1, 2).kind(),
            SlotKind::Edge(Orientation::Vertical)
        );
        assert_eq!(
            Coord::new(2, 1).kind(),
            SlotKind::Edge(Orientation::Horizontal)
        );
    }

    #[test]
    fn test_cell_helper() {
        assert_eq!(Coord::cell(0, 0), Coord::new(1, 1));
        assert_eq!(Coord::cell(2, 1), Coord::new(5, 3));
    }

    #[test]
    fn test_hop_and_midpoint() {
        let start = Coord::new(3, 3);
        let east = start.hop(Direction::East).unwrap();
        assert_eq!(east, Coord::new(3, 5));
        assert_eq!(start.midpoint(east), Some(Coord::new(3, 4)));
        assert_eq!(start.midpoint(Coord::new(3, 7)), None);
        assert_eq!(start.midpoint(Coord::new(5, 5)), None);
    }

    #[test]
    fn test_hop_underflow() {
        assert_eq!(Coord::new(1, 1).hop(Direction::North), None);
        assert_eq!(Coord::new(1, 1).hop(Direction::West), None);
    }

    #[test]
    fn test_wall_orientation_by_color() {
        assert_eq!(Color::Red.wall_orientation(), Orientation::Vertical);
        assert_eq!(Color::Blue.wall_orientation(), Orientation::Horizontal);
        assert_eq!(Color::Red.opponent(), Color::Blue);
    }
}
