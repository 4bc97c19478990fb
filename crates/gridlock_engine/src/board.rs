//! Grid storage: cells hold occupant markers, edges hold wall states.
//!
//! The board knows nothing about turns or budgets. Slots live in one flat
//! row-major `Vec` of `Copy` values, so [`Board::copy`] is a single
//! contiguous clone with no shared state.

use crate::{Color, Coord, GameError, Orientation, Result, SlotKind};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::instrument;

/// A marker that can sit in a cell slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum Occupant {
    /// Red's pawn.
    RedPlayer,
    /// Blue's pawn.
    BluePlayer,
    /// Red's destination.
    RedGoal,
    /// Blue's destination.
    BlueGoal,
}

impl Occupant {
    /// Pawn marker for `color`.
    pub fn player(color: Color) -> Self {
        match color {
            Color::Red => Occupant::RedPlayer,
            Color::Blue => Occupant::BluePlayer,
        }
    }

    /// Goal marker for `color`.
    pub fn goal(color: Color) -> Self {
        match color {
            Color::Red => Occupant::RedGoal,
            Color::Blue => Occupant::BlueGoal,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Occupant::RedPlayer => 0b0001,
            Occupant::BluePlayer => 0b0010,
            Occupant::RedGoal => 0b0100,
            Occupant::BlueGoal => 0b1000,
        }
    }
}

/// Set of occupant markers in one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Occupants(u8);

impl Occupants {
    /// An empty cell.
    pub const EMPTY: Occupants = Occupants(0);

    /// True if `occupant` is present.
    pub fn contains(self, occupant: Occupant) -> bool {
        self.0 & occupant.bit() != 0
    }

    /// Adds a marker. Returns `false` if it was already present.
    pub fn insert(&mut self, occupant: Occupant) -> bool {
        let present = self.contains(occupant);
        self.0 |= occupant.bit();
        !present
    }

    /// Removes a marker. Returns `false` if it was absent.
    pub fn remove(&mut self, occupant: Occupant) -> bool {
        let present = self.contains(occupant);
        self.0 &= !occupant.bit();
        present
    }

    /// True when no marker is present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Markers present, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Occupant> {
        <Occupant as strum::IntoEnumIterator>::iter().filter(move |o| self.contains(*o))
    }
}

impl FromIterator<Occupant> for Occupants {
    fn from_iter<I: IntoIterator<Item = Occupant>>(iter: I) -> Self {
        let mut set = Occupants::EMPTY;
        for occupant in iter {
            set.insert(occupant);
        }
        set
    }
}

impl Serialize for Occupants {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Contents of an edge slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    /// Passable.
    #[default]
    Empty,
    /// An active, removable wall owned by a color.
    Wall(Color),
    /// A wall fixed at match creation.
    Locked,
}

impl EdgeState {
    /// True if a hop across this edge is allowed.
    pub fn is_walkable(self) -> bool {
        matches!(self, EdgeState::Empty)
    }
}

/// Contents of one grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Decorative junction between edges.
    Corner,
    /// Occupant slot.
    Cell(Occupants),
    /// Wall slot.
    Edge(EdgeState),
}

impl Slot {
    fn blank(kind: SlotKind) -> Self {
        match kind {
            SlotKind::Corner => Slot::Corner,
            SlotKind::Cell => Slot::Cell(Occupants::EMPTY),
            SlotKind::Edge(_) => Slot::Edge(EdgeState::Empty),
        }
    }

    fn kind_matches(self, kind: SlotKind) -> bool {
        matches!(
            (self, kind),
            (Slot::Corner, SlotKind::Corner)
                | (Slot::Cell(_), SlotKind::Cell)
                | (Slot::Edge(_), SlotKind::Edge(_))
        )
    }
}

/// Typed grid of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: u16,
    height: u16,
    rows: u16,
    cols: u16,
    slots: Vec<Slot>,
}

impl Board {
    /// Creates an empty board of `width` × `height` cells.
    #[instrument]
    pub fn new(width: u16, height: u16) -> Self {
        let rows = height * 2 + 1;
        let cols = width * 2 + 1;
        let slots = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Slot::blank(Coord::new(row, col).kind())))
            .collect();
        Self {
            width,
            height,
            rows,
            cols,
            slots,
        }
    }

    /// Width in cells.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of grid rows (2·height+1).
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Number of grid columns (2·width+1).
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// True if `coord` lies on the grid.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// True for edge slots that separate two cells (not on the border).
    pub fn is_interior_edge(&self, coord: Coord) -> bool {
        match coord.edge_orientation() {
            Some(Orientation::Vertical) => {
                self.contains(coord) && coord.col > 0 && coord.col < self.cols - 1
            }
            Some(Orientation::Horizontal) => {
                self.contains(coord) && coord.row > 0 && coord.row < self.rows - 1
            }
            None => false,
        }
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| usize::from(coord.row) * usize::from(self.cols) + usize::from(coord.col))
    }

    /// Reads a slot. `None` when out of bounds.
    pub fn get(&self, coord: Coord) -> Option<Slot> {
        self.index(coord).map(|idx| self.slots[idx])
    }

    /// Writes a slot.
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if `coord` is out of bounds or the slot value
    /// does not match the parity kind of `coord`.
    pub fn set(&mut self, coord: Coord, slot: Slot) -> Result<()> {
        let idx = self
            .index(coord)
            .filter(|_| slot.kind_matches(coord.kind()))
            .ok_or(GameError::InvalidCoordinate(coord))?;
        self.slots[idx] = slot;
        Ok(())
    }

    /// Edge state at `coord`, if it is an on-board edge.
    pub fn edge(&self, coord: Coord) -> Option<EdgeState> {
        match self.get(coord)? {
            Slot::Edge(state) => Some(state),
            _ => None,
        }
    }

    /// Occupants at `coord`, if it is an on-board cell.
    pub fn occupants(&self, coord: Coord) -> Option<Occupants> {
        match self.get(coord)? {
            Slot::Cell(occupants) => Some(occupants),
            _ => None,
        }
    }

    /// Writes an edge state.
    ///
    /// # Errors
    ///
    /// `InvalidCoordinate` if `coord` is not an on-board edge.
    pub fn set_edge(&mut self, coord: Coord, state: EdgeState) -> Result<()> {
        self.set(coord, Slot::Edge(state))
    }

    fn cell_mut(&mut self, coord: Coord) -> Result<&mut Occupants> {
        let idx = self.index(coord).ok_or(GameError::NotACellSlot(coord))?;
        match &mut self.slots[idx] {
            Slot::Cell(occupants) => Ok(occupants),
            _ => Err(GameError::NotACellSlot(coord)),
        }
    }

    /// Adds a marker to a cell.
    ///
    /// # Errors
    ///
    /// `NotACellSlot` if `coord` is not an on-board cell.
    pub fn add_occupant(&mut self, coord: Coord, occupant: Occupant) -> Result<()> {
        self.cell_mut(coord)?.insert(occupant);
        Ok(())
    }

    /// Removes a marker from a cell.
    ///
    /// # Errors
    ///
    /// `NotACellSlot` if `coord` is not an on-board cell.
    pub fn remove_occupant(&mut self, coord: Coord, occupant: Occupant) -> Result<()> {
        self.cell_mut(coord)?.remove(occupant);
        Ok(())
    }

    /// Independent deep copy.
    pub fn copy(&self) -> Board {
        self.clone()
    }

    /// Number of active walls owned by `color`.
    pub fn count_walls(&self, color: Color) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Edge(EdgeState::Wall(c)) if *c == color))
            .count()
    }

    /// Number of edge slots whose state differs between the two boards.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the boards differ in size.
    pub fn compare_edges(&self, other: &Board) -> Result<usize> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(GameError::DimensionMismatch);
        }
        Ok(self
            .slots
            .iter()
            .zip(&other.slots)
            .filter(|(a, b)| matches!((a, b), (Slot::Edge(x), Slot::Edge(y)) if x != y))
            .count())
    }

    /// True if a one-cell hop from `from` to `to` stays on the board and
    /// crosses an empty edge.
    pub fn can_hop(&self, from: Coord, to: Coord) -> bool {
        from.is_cell()
            && to.is_cell()
            && self.contains(from)
            && self.contains(to)
            && from
                .midpoint(to)
                .and_then(|mid| self.edge(mid))
                .is_some_and(EdgeState::is_walkable)
    }

    /// All slots with their coordinates, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Slot)> + '_ {
        let cols = usize::from(self.cols);
        self.slots.iter().enumerate().map(move |(idx, slot)| {
            // Bounded by rows * cols, both u16.
            let row = (idx / cols) as u16;
            let col = (idx % cols) as u16;
            (Coord::new(row, col), *slot)
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let coord = Coord::new(row, col);
                let symbol = match self.get(coord) {
                    Some(Slot::Corner) | None => '+',
                    Some(Slot::Cell(occupants)) => cell_symbol(occupants),
                    Some(Slot::Edge(EdgeState::Empty)) => ' ',
                    Some(Slot::Edge(EdgeState::Locked)) => '#',
                    Some(Slot::Edge(EdgeState::Wall(_))) => match coord.edge_orientation() {
                        Some(Orientation::Vertical) => '|',
                        _ => '-',
                    },
                };
                write!(f, "{symbol}")?;
            }
            if row + 1 < self.rows {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

fn cell_symbol(occupants: Occupants) -> char {
    let mut markers = occupants.iter();
    match (markers.next(), markers.next()) {
        (None, _) => '.',
        (Some(_), Some(_)) => '*',
        (Some(Occupant::RedPlayer), None) => 'R',
        (Some(Occupant::BluePlayer), None) => 'B',
        (Some(Occupant::RedGoal), None) => 'r',
        (Some(Occupant::BlueGoal), None) => 'b',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_dimensions() {
        let board = Board::new(3, 2);
        assert_eq!(board.rows(), 5);
        assert_eq!(board.cols(), 7);
        assert_eq!(board.get(Coord::new(0, 0)), Some(Slot::Corner));
        assert_eq!(board.get(Coord::new(1, 1)), Some(Slot::Cell(Occupants::EMPTY)));
        assert_eq!(board.edge(Coord::new(1, 2)), Some(EdgeState::Empty));
        assert_eq!(board.get(Coord::new(5, 0)), None);
    }

    #[test]
    fn test_add_occupant_rejects_non_cell() {
        let mut board = Board::new(3, 3);
        let result = board.add_occupant(Coord::new(1, 2), Occupant::RedPlayer);
        assert_eq!(result, Err(GameError::NotACellSlot(Coord::new(1, 2))));
        let result = board.remove_occupant(Coord::new(40, 40), Occupant::RedPlayer);
        assert_eq!(result, Err(GameError::NotACellSlot(Coord::new(40, 40))));
    }

    #[test]
    fn test_occupants_are_a_set() {
        let mut board = Board::new(3, 3);
        let cell = Coord::new(1, 1);
        board.add_occupant(cell, Occupant::RedPlayer).unwrap();
        board.add_occupant(cell, Occupant::RedPlayer).unwrap();
        board.add_occupant(cell, Occupant::BlueGoal).unwrap();

        let occupants = board.occupants(cell).unwrap();
        assert_eq!(occupants.iter().count(), 2);

        board.remove_occupant(cell, Occupant::RedPlayer).unwrap();
        let occupants = board.occupants(cell).unwrap();
        assert!(!occupants.contains(Occupant::RedPlayer));
        assert!(occupants.contains(Occupant::BlueGoal));
    }

    #[test]
    fn test_set_rejects_kind_mismatch() {
        let mut board = Board::new(3, 3);
        let result = board.set(Coord::new(1, 1), Slot::Edge(EdgeState::Locked));
        assert!(matches!(result, Err(GameError::InvalidCoordinate(_))));
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = Board::new(3, 3);
        let copy = original.copy();
        original
            .set_edge(Coord::new(1, 2), EdgeState::Wall(Color::Red))
            .unwrap();
        original
            .add_occupant(Coord::new(3, 3), Occupant::BluePlayer)
            .unwrap();

        assert_eq!(copy.edge(Coord::new(1, 2)), Some(EdgeState::Empty));
        assert_eq!(copy.occupants(Coord::new(3, 3)), Some(Occupants::EMPTY));
    }

    #[test]
    fn test_count_walls_and_compare_edges() {
        let mut board = Board::new(3, 3);
        let before = board.copy();
        board
            .set_edge(Coord::new(1, 2), EdgeState::Wall(Color::Red))
            .unwrap();
        board
            .set_edge(Coord::new(3, 4), EdgeState::Wall(Color::Red))
            .unwrap();
        board
            .set_edge(Coord::new(2, 1), EdgeState::Wall(Color::Blue))
            .unwrap();
        board
            .add_occupant(Coord::new(1, 1), Occupant::RedPlayer)
            .unwrap();

        assert_eq!(board.count_walls(Color::Red), 2);
        assert_eq!(board.count_walls(Color::Blue), 1);
        assert_eq!(board.compare_edges(&before), Ok(3));
        assert_eq!(before.compare_edges(&before), Ok(0));
    }

    #[test]
    fn test_compare_edges_dimension_mismatch() {
        let a = Board::new(3, 3);
        let b = Board::new(4, 3);
        assert_eq!(a.compare_edges(&b), Err(GameError::DimensionMismatch));
    }

    #[test]
    fn test_interior_edges() {
        let board = Board::new(3, 3);
        assert!(board.is_interior_edge(Coord::new(1, 2)));
        assert!(board.is_interior_edge(Coord::new(2, 5)));
        assert!(!board.is_interior_edge(Coord::new(1, 0)));
        assert!(!board.is_interior_edge(Coord::new(1, 6)));
        assert!(!board.is_interior_edge(Coord::new(0, 1)));
        assert!(!board.is_interior_edge(Coord::new(6, 1)));
        assert!(!board.is_interior_edge(Coord::new(1, 1)));
    }

    #[test]
    fn test_can_hop_respects_walls() {
        let mut board = Board::new(3, 3);
        assert!(board.can_hop(Coord::new(1, 1), Coord::new(1, 3)));
        board.set_edge(Coord::new(1, 2), EdgeState::Locked).unwrap();
        assert!(!board.can_hop(Coord::new(1, 1), Coord::new(1, 3)));
        assert!(!board.can_hop(Coord::new(1, 1), Coord::new(3, 3)));
        assert!(!board.can_hop(Coord::new(5, 5), Coord::new(5, 7)));
    }

    #[test]
    fn test_display_renders_walls_and_markers() {
        let mut board = Board::new(2, 1);
        board
            .add_occupant(Coord::new(1, 1), Occupant::RedPlayer)
            .unwrap();
        board
            .set_edge(Coord::new(1, 2), EdgeState::Wall(Color::Red))
            .unwrap();
        let text = board.to_string();
        assert_eq!(text, "+ + +\n R|. \n+ + +");
    }
}
