//! Board model: fixed set of hex cells, each holding a stack of coloured units.

use crate::hex::Axial;
use std::collections::BTreeMap;

/// Single coloured token. `color` indexes the palette (0..palette_size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub color: u8,
}

impl Unit {
    pub const fn new(color: u8) -> Self {
        Self { color }
    }
}

/// Build a stack from colour indices, bottom to top.
pub fn units(colors: &[u8]) -> Vec<Unit> {
    colors.iter().copied().map(Unit::new).collect()
}

/// One board cell. `stack[0]` is the bottom unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub coord: Axial,
    pub stack: Vec<Unit>,
    /// Owned by an in-flight cascade step.
    pub locked: bool,
    /// Target of an in-flight drop.
    pub pending_placement: bool,
}

impl Cell {
    fn new(coord: Axial) -> Self {
        Self {
            coord,
            stack: Vec::new(),
            locked: false,
            pending_placement: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top_color(&self) -> Option<u8> {
        self.stack.last().map(|u| u.color)
    }

    /// Length of the contiguous run of `color` at the top of the stack.
    pub fn run_of(&self, color: u8) -> usize {
        run_length(&self.stack, color)
    }

    /// The top run of the current top colour, bottom to top.
    pub fn top_run(&self) -> &[Unit] {
        match self.top_color() {
            Some(c) => &self.stack[self.stack.len() - self.run_of(c)..],
            None => &[],
        }
    }

    /// Empty, unlocked and not awaiting a drop.
    pub fn accepts_placement(&self) -> bool {
        self.is_empty() && !self.locked && !self.pending_placement
    }
}

/// Count of contiguous units equal to `color` from the top of `stack`.
pub fn run_length(stack: &[Unit], color: u8) -> usize {
    stack.iter().rev().take_while(|u| u.color == color).count()
}

/// Hexagonal board of the given radius. Cells never appear or disappear after
/// construction; only stacks and flags change.
#[derive(Debug, Clone)]
pub struct Board {
    radius: u32,
    cells: BTreeMap<Axial, Cell>,
}

impl Board {
    pub fn new(radius: u32) -> Self {
        let cells = Axial::within(radius)
            .into_iter()
            .map(|c| (c, Cell::new(c)))
            .collect();
        Self { radius, cells }
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn get(&self, at: Axial) -> Option<&Cell> {
        self.cells.get(&at)
    }

    #[inline]
    pub fn get_mut(&mut self, at: Axial) -> Option<&mut Cell> {
        self.cells.get_mut(&at)
    }

    pub fn contains(&self, at: Axial) -> bool {
        self.cells.contains_key(&at)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn coords(&self) -> impl Iterator<Item = Axial> + '_ {
        self.cells.keys().copied()
    }

    /// Cells at the six direction offsets that exist on this board, in
    /// direction order.
    pub fn neighbors(&self, at: Axial) -> impl Iterator<Item = &Cell> + '_ {
        at.adjacent().into_iter().filter_map(|n| self.cells.get(&n))
    }

    /// Replace a cell's stack. Returns false when `at` is off the board.
    pub fn set_stack(&mut self, at: Axial, stack: Vec<Unit>) -> bool {
        match self.cells.get_mut(&at) {
            Some(cell) => {
                cell.stack = stack;
                true
            }
            None => false,
        }
    }

    pub fn set_locked(&mut self, at: Axial, locked: bool) {
        if let Some(cell) = self.cells.get_mut(&at) {
            cell.locked = locked;
        }
    }

    pub fn is_locked(&self, at: Axial) -> bool {
        self.get(at).is_some_and(|c| c.locked)
    }

    /// Total units on the board.
    pub fn total_units(&self) -> usize {
        self.cells.values().map(|c| c.stack.len()).sum()
    }

    /// Coordinates that currently accept a placement.
    pub fn open_cells(&self) -> Vec<Axial> {
        self.cells
            .values()
            .filter(|c| c.accepts_placement())
            .map(|c| c.coord)
            .collect()
    }

    /// Clear every stack and flag (level transition).
    pub fn reset(&mut self) {
        for cell in self.cells.values_mut() {
            cell.stack.clear();
            cell.locked = false;
            cell.pending_placement = false;
        }
    }
}
