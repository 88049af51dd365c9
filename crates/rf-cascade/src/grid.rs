//! Fixed 5×3 symbol grid

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::symbols::Symbol;

/// Number of columns (reels)
pub const WIDTH: usize = 5;
/// Number of visible rows per column
pub const HEIGHT: usize = 3;
/// Total cells in a grid
pub const GRID_SIZE: usize = WIDTH * HEIGHT;

/// A cell coordinate. `x` is the column (0 = leftmost), `y` the row (0 = top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x: x as u8,
            y: y as u8,
        }
    }

    /// Is this coordinate inside a 5×3 grid?
    pub fn in_grid(&self) -> bool {
        (self.x as usize) < WIDTH && (self.y as usize) < HEIGHT
    }

    /// Every in-grid cell of the 3×3 block centred on this position, itself included
    pub fn neighborhood(self) -> impl Iterator<Item = Position> {
        let (cx, cy) = (self.x as i32, self.y as i32);
        (cx - 1..=cx + 1)
            .flat_map(move |x| (cy - 1..=cy + 1).map(move |y| (x, y)))
            .filter(|&(x, y)| x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT)
            .map(|(x, y)| Position::new(x as usize, y as usize))
    }
}

/// Column-major 5×3 grid of symbol ids.
///
/// Every cell always holds a symbol; grids with holes only exist as
/// [`crate::cascade::CollapsedGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolGrid {
    cells: [[Symbol; HEIGHT]; WIDTH],
}

impl SymbolGrid {
    /// Grid with every cell set to `symbol`
    pub fn filled(symbol: Symbol) -> Self {
        Self {
            cells: [[symbol; HEIGHT]; WIDTH],
        }
    }

    /// Build from columns (each column listed top to bottom)
    pub fn from_columns(cells: [[Symbol; HEIGHT]; WIDTH]) -> Self {
        Self { cells }
    }

    /// Build from rows as they appear on screen (top row first)
    pub fn from_rows(rows: [[Symbol; WIDTH]; HEIGHT]) -> Self {
        let mut cells = [[0; HEIGHT]; WIDTH];
        for (y, row) in rows.iter().enumerate() {
            for (x, &symbol) in row.iter().enumerate() {
                cells[x][y] = symbol;
            }
        }
        Self { cells }
    }

    /// Symbol at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Symbol {
        self.cells[x][y]
    }

    /// Symbol at a position
    pub fn at(&self, pos: Position) -> Symbol {
        self.cells[pos.x as usize][pos.y as usize]
    }

    /// Overwrite one cell
    pub fn set(&mut self, x: usize, y: usize, symbol: Symbol) {
        self.cells[x][y] = symbol;
    }

    /// One column, top to bottom
    pub fn column(&self, x: usize) -> &[Symbol; HEIGHT] {
        &self.cells[x]
    }

    /// Replace a whole column
    pub fn set_column(&mut self, x: usize, column: [Symbol; HEIGHT]) {
        self.cells[x] = column;
    }

    /// All columns
    pub fn columns(&self) -> &[[Symbol; HEIGHT]; WIDTH] {
        &self.cells
    }

    /// Rows as displayed, top row first
    pub fn to_rows(&self) -> [[Symbol; WIDTH]; HEIGHT] {
        let mut rows = [[0; WIDTH]; HEIGHT];
        for (x, column) in self.cells.iter().enumerate() {
            for (y, &symbol) in column.iter().enumerate() {
                rows[y][x] = symbol;
            }
        }
        rows
    }

    /// Iterate `(position, symbol)` column by column
    pub fn iter(&self) -> impl Iterator<Item = (Position, Symbol)> + '_ {
        self.cells.iter().enumerate().flat_map(|(x, column)| {
            column
                .iter()
                .enumerate()
                .map(move |(y, &symbol)| (Position::new(x, y), symbol))
        })
    }

    /// Positions holding `symbol`
    pub fn positions_of(&self, symbol: Symbol) -> Vec<Position> {
        self.iter()
            .filter(|&(_, s)| s == symbol)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Occurrences of `symbol`
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().flatten().filter(|&&s| s == symbol).count()
    }

    /// Is `symbol` anywhere in the grid?
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.cells.iter().flatten().any(|&s| s == symbol)
    }

    /// Number of cells (always [`GRID_SIZE`])
    pub fn len(&self) -> usize {
        GRID_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for SymbolGrid {
    fn default() -> Self {
        Self::filled(0)
    }
}

impl fmt::Display for SymbolGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let line: Vec<String> = row.iter().map(|s| format!("{:>2}", s)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
