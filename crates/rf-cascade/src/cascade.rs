//! Cascade: remove winning cells, let survivors fall, refill from the top

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::{HEIGHT, Position, SymbolGrid, WIDTH};
use crate::spin::SpinResult;
use crate::symbols::Symbol;

/// A grid after removal and gravity, holes at the top of each column.
///
/// The only place empty cells exist. Persisted between turns and turned back
/// into a [`SymbolGrid`] by [`CollapsedGrid::refill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedGrid {
    cells: [[Option<Symbol>; HEIGHT]; WIDTH],
}

impl CollapsedGrid {
    /// A collapsed grid with no holes
    pub fn from_grid(grid: &SymbolGrid) -> Self {
        let mut cells = [[None; HEIGHT]; WIDTH];
        for (x, column) in grid.columns().iter().enumerate() {
            for (y, &symbol) in column.iter().enumerate() {
                cells[x][y] = Some(symbol);
            }
        }
        Self { cells }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Symbol> {
        self.cells[x][y]
    }

    /// Empty cells in column `x` (all at the top)
    pub fn holes_in(&self, x: usize) -> usize {
        self.cells[x].iter().filter(|c| c.is_none()).count()
    }

    /// Empty cells in the whole grid
    pub fn holes(&self) -> usize {
        (0..WIDTH).map(|x| self.holes_in(x)).sum()
    }

    /// Fill every hole from `fill(column)`, top to bottom per column.
    ///
    /// `fill` is called exactly [`Self::holes`] times.
    pub fn refill(&self, mut fill: impl FnMut(usize) -> Symbol) -> SymbolGrid {
        let mut grid = SymbolGrid::default();
        for x in 0..WIDTH {
            for y in 0..HEIGHT {
                let symbol = match self.cells[x][y] {
                    Some(symbol) => symbol,
                    None => fill(x),
                };
                grid.set(x, y, symbol);
            }
        }
        grid
    }
}

/// Remove `removed` from `grid` and compact each column downward.
///
/// Survivors keep their top-to-bottom order. Duplicate positions count once,
/// positions outside the grid are ignored.
pub fn collapse(grid: &SymbolGrid, removed: &[Position]) -> CollapsedGrid {
    let removed: BTreeSet<Position> = removed.iter().copied().filter(Position::in_grid).collect();
    let mut cells = [[None; HEIGHT]; WIDTH];

    for x in 0..WIDTH {
        let survivors: Vec<Symbol> = (0..HEIGHT)
            .filter(|&y| !removed.contains(&Position::new(x, y)))
            .map(|y| grid.get(x, y))
            .collect();

        let offset = HEIGHT - survivors.len();
        for (i, symbol) in survivors.into_iter().enumerate() {
            cells[x][offset + i] = Some(symbol);
        }
    }

    CollapsedGrid { cells }
}

/// Remove, compact and refill in one step.
///
/// An empty `removed` returns `grid` unchanged without calling `refill`.
pub fn cascade(
    grid: &SymbolGrid,
    removed: &[Position],
    refill: impl FnMut(usize) -> Symbol,
) -> SymbolGrid {
    if removed.is_empty() {
        return *grid;
    }
    collapse(grid, removed).refill(refill)
}

/// Every position named by any result of the spin, deduplicated
pub fn removed_positions(result: &SpinResult) -> Vec<Position> {
    let set: BTreeSet<Position> = result
        .results
        .iter()
        .flat_map(|info| info.positions.iter().copied())
        .collect();
    set.into_iter().collect()
}
