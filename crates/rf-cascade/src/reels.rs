//! Reel strips, the reel bank and random drawing

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::MysteryWildWeight;
use crate::grid::{HEIGHT, SymbolGrid, WIDTH};
use crate::symbols::Symbol;

/// Column redraws allowed before a max-consecutive violation is accepted
pub const MAX_REDRAW_ATTEMPTS: usize = 64;

/// Source of randomness for reel draws.
///
/// Implemented for every [`RngCore`], so a seeded `ChaCha8Rng` or the thread
/// RNG can be passed wherever a `&mut dyn RandomDraw` is expected.
pub trait RandomDraw {
    /// Uniform index in `0..len` (`len` > 0)
    fn index(&mut self, len: usize) -> usize;

    /// `true` with probability `numerator / denominator`
    fn chance(&mut self, numerator: u64, denominator: u64) -> bool;
}

impl<R: RngCore + ?Sized> RandomDraw for R {
    fn index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }

    fn chance(&mut self, numerator: u64, denominator: u64) -> bool {
        if denominator == 0 || numerator == 0 {
            return false;
        }
        self.random_range(0..denominator) < numerator
    }
}

/// Hook applied to every cell as it is filled from a strip
pub trait FillHook {
    fn on_fill(&self, symbol: Symbol, rng: &mut dyn RandomDraw) -> Symbol;
}

/// Leaves drawn symbols untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFill;

impl FillHook for NoFill {
    fn on_fill(&self, symbol: Symbol, _rng: &mut dyn RandomDraw) -> Symbol {
        symbol
    }
}

/// Turns a filled cell into a wild with the configured weight.
/// Scatters and wilds are never converted.
#[derive(Debug, Clone, Copy)]
pub struct MysteryWild {
    pub weight: MysteryWildWeight,
    pub wild: Symbol,
    pub scatter: Symbol,
}

impl FillHook for MysteryWild {
    fn on_fill(&self, symbol: Symbol, rng: &mut dyn RandomDraw) -> Symbol {
        if symbol == self.wild || symbol == self.scatter {
            return symbol;
        }
        if rng.chance(u64::from(self.weight.wild), self.weight.total()) {
            self.wild
        } else {
            symbol
        }
    }
}

/// A reel strip, read with a wrap-around cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Symbol ids in order
    pub symbols: Vec<Symbol>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> Symbol {
        self.symbols[position % self.symbols.len()]
    }

    /// The visible column when the strip stops at `stop`
    pub fn window(&self, stop: usize) -> [Symbol; HEIGHT] {
        let mut column = [0; HEIGHT];
        for (row, cell) in column.iter_mut().enumerate() {
            *cell = self.symbol_at(stop + row);
        }
        column
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Raw draw for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomResult {
    /// Drawn (or refilled) grid
    pub grid: SymbolGrid,
    /// Strip stops of a fresh draw; `None` when a carried grid was refilled
    pub stops: Option<[usize; WIDTH]>,
}

impl RandomResult {
    /// Wrap a grid that did not come from strip stops
    pub fn from_grid(grid: SymbolGrid) -> Self {
        Self { grid, stops: None }
    }

    /// Was this a fresh draw rather than a cascade refill?
    pub fn is_fresh(&self) -> bool {
        self.stops.is_some()
    }
}

/// One strip per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelBank {
    pub strips: Vec<ReelStrip>,
}

impl ReelBank {
    pub fn new(strips: Vec<ReelStrip>) -> Self {
        Self { strips }
    }

    /// The Museum free-game strips
    pub fn museum() -> Self {
        Self::new(vec![
            ReelStrip::new(vec![
                6, 7, 2, 8, 9, 10, 3, 6, 1, 7, 8, 4, 9, 10, 5, 6, 7, 8, 2, 9, 10, 3, 6, 7, 4, 8,
                9, 10, 5, 1,
            ]),
            ReelStrip::new(vec![
                7, 8, 3, 9, 10, 6, 2, 7, 0, 8, 9, 4, 10, 6, 5, 1, 7, 8, 3, 9, 10, 6, 2, 7, 4, 8,
                9, 5, 10, 6,
            ]),
            ReelStrip::new(vec![
                8, 9, 4, 10, 6, 7, 0, 3, 8, 9, 1, 10, 6, 2, 7, 8, 5, 9, 10, 6, 4, 7, 8, 3, 9, 0,
                10, 6, 5, 2,
            ]),
            ReelStrip::new(vec![
                9, 10, 5, 6, 7, 8, 2, 9, 0, 10, 6, 3, 7, 8, 1, 9, 10, 4, 6, 7, 5, 8, 9, 2, 10, 6,
                3, 7, 8, 4,
            ]),
            ReelStrip::new(vec![
                10, 6, 2, 7, 8, 9, 3, 10, 6, 4, 7, 1, 8, 9, 5, 10, 6, 2, 7, 8, 0, 9, 10, 3, 6, 7,
                4, 8, 9, 5,
            ]),
        ])
    }

    /// Draw a full grid.
    ///
    /// `max_consecutive = Some(n)` rejects a column holding a run of more than
    /// `n` identical symbols and redraws it; `None` disables the check.
    pub fn draw(&self, rng: &mut dyn RandomDraw, max_consecutive: Option<usize>) -> RandomResult {
        self.draw_with(rng, max_consecutive, &NoFill)
    }

    /// Draw a full grid, passing every cell through `hook`
    pub fn draw_with(
        &self,
        rng: &mut dyn RandomDraw,
        max_consecutive: Option<usize>,
        hook: &dyn FillHook,
    ) -> RandomResult {
        let mut grid = SymbolGrid::default();
        let mut stops = [0; WIDTH];

        for x in 0..WIDTH {
            let (stop, column) = self.draw_column(x, rng, max_consecutive);
            stops[x] = stop;

            let mut filled = column;
            for cell in filled.iter_mut() {
                *cell = hook.on_fill(*cell, rng);
            }
            grid.set_column(x, filled);
        }

        RandomResult {
            grid,
            stops: Some(stops),
        }
    }

    /// Draw one symbol for column `x` at a random stop
    pub fn draw_symbol(&self, rng: &mut dyn RandomDraw, x: usize) -> Symbol {
        let strip = &self.strips[x];
        strip.symbol_at(rng.index(strip.len()))
    }

    fn draw_column(
        &self,
        x: usize,
        rng: &mut dyn RandomDraw,
        max_consecutive: Option<usize>,
    ) -> (usize, [Symbol; HEIGHT]) {
        let strip = &self.strips[x];
        let mut attempts = 0;

        loop {
            let stop = rng.index(strip.len());
            let column = strip.window(stop);
            attempts += 1;

            let Some(limit) = max_consecutive else {
                return (stop, column);
            };
            if longest_run(&column) <= limit {
                return (stop, column);
            }
            if attempts >= MAX_REDRAW_ATTEMPTS {
                log::warn!(
                    "Column {} kept a run longer than {} after {} redraws",
                    x,
                    limit,
                    attempts
                );
                return (stop, column);
            }
        }
    }
}

impl Default for ReelBank {
    fn default() -> Self {
        Self::museum()
    }
}

/// Longest run of identical adjacent symbols in a column
pub fn longest_run(column: &[Symbol]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for &symbol in column {
        if previous == Some(symbol) {
            current += 1;
        } else {
            current = 1;
            previous = Some(symbol);
        }
        longest = longest.max(current);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SYMBOL_S, SYMBOL_W};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_reel_strip_wrap() {
        let strip = ReelStrip::new(vec![1, 2, 3, 4, 5]);
        assert_eq!(strip.symbol_at(0), 1);
        assert_eq!(strip.symbol_at(5), 1);
        assert_eq!(strip.symbol_at(7), 3);
        assert_eq!(strip.window(4), [5, 1, 2]);
    }

    #[test]
    fn test_longest_run() {
        assert_eq!(longest_run(&[1, 2, 3]), 1);
        assert_eq!(longest_run(&[1, 1, 3]), 2);
        assert_eq!(longest_run(&[4, 4, 4]), 3);
        assert_eq!(longest_run(&[]), 0);
    }

    #[test]
    fn test_draw_reads_strip_windows() {
        let bank = ReelBank::museum();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let result = bank.draw(&mut rng, None);
        let stops = result.stops.expect("fresh draw records stops");

        for x in 0..WIDTH {
            assert_eq!(result.grid.column(x), &bank.strips[x].window(stops[x]));
        }
    }

    #[test]
    fn test_max_consecutive_rejects_long_runs() {
        // Only stop 0 shows the triple
        let strip = ReelStrip::new(vec![2, 2, 2, 3, 4, 5, 6, 7, 8, 9, 10, 6]);
        let bank = ReelBank::new(vec![strip; WIDTH]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..200 {
            let result = bank.draw(&mut rng, Some(2));
            for x in 0..WIDTH {
                assert!(longest_run(result.grid.column(x)) <= 2);
            }
        }
    }

    #[test]
    fn test_disabled_constraint_allows_runs() {
        let bank = ReelBank::new(vec![ReelStrip::new(vec![6, 6, 6]); WIDTH]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = bank.draw(&mut rng, None);
        assert_eq!(result.grid, SymbolGrid::filled(6));
    }

    #[test]
    fn test_mystery_wild_weights() {
        let always = MysteryWild {
            weight: MysteryWildWeight { wild: 1, other: 0 },
            wild: SYMBOL_W,
            scatter: SYMBOL_S,
        };
        let never = MysteryWild {
            weight: MysteryWildWeight { wild: 0, other: 100 },
            ..always
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        assert_eq!(always.on_fill(6, &mut rng), SYMBOL_W);
        assert_eq!(always.on_fill(SYMBOL_S, &mut rng), SYMBOL_S);
        assert_eq!(never.on_fill(6, &mut rng), 6);

        let bank = ReelBank::museum();
        let result = bank.draw_with(&mut rng, None, &always);
        for (_, symbol) in result.grid.iter() {
            assert!(symbol == SYMBOL_W || symbol == SYMBOL_S);
        }
    }
}
