//! Stateless shortest-path search over the cell graph of a [`Board`].
//!
//! Moves are cardinal cell hops. A hop spans two grid units and is legal only
//! when the edge slot between the two cells is empty. Unreachable goals are a
//! normal `None` result.

use crate::{Board, Coord, Direction};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use tracing::{instrument, trace};

/// Dense per-slot scratch table indexed like the board grid.
struct Scratch<T> {
    cols: usize,
    values: Vec<T>,
}

impl<T: Clone> Scratch<T> {
    fn new(board: &Board, fill: T) -> Self {
        let cols = usize::from(board.cols());
        Self {
            cols,
            values: vec![fill; usize::from(board.rows()) * cols],
        }
    }

    fn get(&self, coord: Coord) -> &T {
        &self.values[usize::from(coord.row) * self.cols + usize::from(coord.col)]
    }

    fn set(&mut self, coord: Coord, value: T) {
        self.values[usize::from(coord.row) * self.cols + usize::from(coord.col)] = value;
    }
}

fn is_search_endpoint(board: &Board, coord: Coord) -> bool {
    coord.is_cell() && board.contains(coord)
}

fn neighbours(board: &Board, cell: Coord) -> impl Iterator<Item = Coord> + '_ {
    Direction::ALL
        .into_iter()
        .filter_map(move |direction| cell.hop(direction))
        .filter(move |next| board.can_hop(cell, *next))
}

fn walk_back(came_from: &Scratch<Option<Coord>>, start: Coord, end: Coord) -> Vec<Coord> {
    let mut path = vec![end];
    let mut cursor = end;
    while cursor != start {
        match *came_from.get(cursor) {
            Some(previous) => {
                path.push(previous);
                cursor = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Breadth-first shortest path from `start` to `end`, inclusive of both.
///
/// Returns `Some(vec![start])` when `start == end`, and `None` when either
/// endpoint is not an on-board cell or no path exists. Among several shortest
/// paths, the first found in north/east/south/west expansion order wins.
#[instrument(skip(board))]
pub fn shortest_path(board: &Board, start: Coord, end: Coord) -> Option<Vec<Coord>> {
    if !is_search_endpoint(board, start) || !is_search_endpoint(board, end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let mut came_from: Scratch<Option<Coord>> = Scratch::new(board, None);
    let mut visited = Scratch::new(board, false);
    let mut queue = VecDeque::from([start]);
    visited.set(start, true);

    while let Some(cell) = queue.pop_front() {
        if cell == end {
            let path = walk_back(&came_from, start, end);
            trace!(hops = path.len() - 1, "Path found");
            return Some(path);
        }
        for next in neighbours(board, cell) {
            if *visited.get(next) {
                continue;
            }
            visited.set(next, true);
            came_from.set(next, Some(cell));
            queue.push_back(next);
        }
    }

    trace!("No path");
    None
}

/// A* shortest path guided by Manhattan distance.
///
/// Same contract and same path length as [`shortest_path`]; the cells
/// visited along the way may differ.
#[instrument(skip(board))]
pub fn shortest_path_guided(board: &Board, start: Coord, end: Coord) -> Option<Vec<Coord>> {
    if !is_search_endpoint(board, start) || !is_search_endpoint(board, end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    // Hops are two grid units, so halving keeps the heuristic admissible.
    let heuristic = |cell: Coord| cell.manhattan(end) / 2;

    let mut came_from: Scratch<Option<Coord>> = Scratch::new(board, None);
    let mut cost = Scratch::new(board, u32::MAX);
    let mut open = BinaryHeap::new();
    cost.set(start, 0);
    open.push(Reverse((heuristic(start), 0u32, start)));

    while let Some(Reverse((_, g, cell))) = open.pop() {
        if cell == end {
            let path = walk_back(&came_from, start, end);
            trace!(hops = path.len() - 1, "Guided path found");
            return Some(path);
        }
        if g > *cost.get(cell) {
            continue;
        }
        for next in neighbours(board, cell) {
            let tentative = g + 1;
            if tentative < *cost.get(next) {
                cost.set(next, tentative);
                came_from.set(next, Some(cell));
                open.push(Reverse((tentative + heuristic(next), tentative, next)));
            }
        }
    }

    trace!("No guided path");
    None
}

/// True if any path connects `start` to `end`.
pub fn has_path(board: &Board, start: Coord, end: Coord) -> bool {
    shortest_path(board, start, end).is_some()
}
