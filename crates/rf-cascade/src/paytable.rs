//! Payout evaluation: scatter, ways-pay and wild bomb
//!
//! All three evaluations read the same unmodified turn grid. They fill
//! `win` and `real_win` with the unmultiplied amount; the game module applies
//! the turn's award multiplier afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::config::ScatterMode;
use crate::grid::{HEIGHT, Position, SymbolGrid, WIDTH};
use crate::spin::{GameResultInfo, GameResultKind};
use crate::symbols::{SYMBOL_S, SYMBOL_W, Symbol, SymbolSet, SymbolType};

/// Paytable of a game: the symbol set and its pays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paytable {
    pub symbols: SymbolSet,
}

impl Paytable {
    pub fn new(symbols: SymbolSet) -> Self {
        Self { symbols }
    }

    /// The Museum paytable
    pub fn museum() -> Self {
        Self::new(SymbolSet::museum())
    }

    /// Wild symbol id
    pub fn wild(&self) -> Symbol {
        self.symbols.wild_id().unwrap_or(SYMBOL_W)
    }

    /// Scatter symbol id
    pub fn scatter(&self) -> Symbol {
        self.symbols.scatter_id().unwrap_or(SYMBOL_S)
    }

    /// Pay for `count` of `symbol` (0 when unknown or not paid)
    pub fn pay(&self, symbol: Symbol, count: usize) -> Money {
        self.symbols.get(symbol).map(|s| s.pay(count)).unwrap_or(0)
    }

    fn is_paying(&self, symbol: Symbol) -> bool {
        self.symbols
            .get(symbol)
            .is_some_and(|s| s.symbol_type == SymbolType::Regular)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SCATTER
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scatter trigger: `count >= trigger` anywhere on the grid
    pub fn evaluate_scatter(
        &self,
        grid: &SymbolGrid,
        trigger: usize,
        mode: ScatterMode,
        total_bet: Money,
    ) -> Option<GameResultInfo> {
        let scatter = self.scatter();
        let positions = grid.positions_of(scatter);
        let count = positions.len();
        if count < trigger {
            return None;
        }

        let mul = match mode {
            ScatterMode::TriggerOnly => 0,
            ScatterMode::PayAndTrigger => self.pay(scatter, count),
        };
        let win = total_bet * mul;

        Some(GameResultInfo {
            kind: GameResultKind::Scatter,
            symbol: Some(scatter),
            positions,
            count,
            ways: 1,
            mul,
            win,
            real_win: win,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WAYS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Ways-pay for every distinct paying symbol in the leftmost column.
    ///
    /// A run continues through a column while it holds the symbol or a wild;
    /// ways is the product of matching cells per column.
    pub fn evaluate_ways(&self, grid: &SymbolGrid, bet: Money) -> Vec<GameResultInfo> {
        let wild = self.wild();
        let starters: BTreeSet<Symbol> = grid
            .column(0)
            .iter()
            .copied()
            .filter(|&s| self.is_paying(s))
            .collect();

        let mut results = Vec::new();
        for symbol in starters {
            let mut positions = Vec::new();
            let mut ways: u64 = 1;
            let mut run = 0;

            for x in 0..WIDTH {
                let matching: Vec<Position> = (0..HEIGHT)
                    .filter(|&y| {
                        let s = grid.get(x, y);
                        s == symbol || s == wild
                    })
                    .map(|y| Position::new(x, y))
                    .collect();
                if matching.is_empty() {
                    break;
                }
                ways *= matching.len() as u64;
                positions.extend(matching);
                run += 1;
            }

            let mul = self.pay(symbol, run);
            if mul == 0 {
                continue;
            }
            let win = bet * mul * ways as Money;

            results.push(GameResultInfo {
                kind: GameResultKind::Ways,
                symbol: Some(symbol),
                positions,
                count: run,
                ways,
                mul,
                win,
                real_win: win,
            });
        }

        results
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WILD BOMB
    // ═══════════════════════════════════════════════════════════════════════════

    /// Pooled cells around every wild: non-wild, non-scatter cells of each
    /// wild's 3×3 neighbourhood, shared cells counted once
    pub fn wild_bomb_pool(&self, grid: &SymbolGrid) -> Vec<Position> {
        let wild = self.wild();
        let scatter = self.scatter();

        let pool: BTreeSet<Position> = grid
            .positions_of(wild)
            .into_iter()
            .flat_map(|pos| pos.neighborhood())
            .filter(|&pos| {
                let s = grid.at(pos);
                s != wild && s != scatter
            })
            .collect();
        pool.into_iter().collect()
    }

    /// Wild bomb: `bet × prize × pool size`.
    ///
    /// Positions cover the pool and the detonating wilds.
    pub fn evaluate_wild_bomb(
        &self,
        grid: &SymbolGrid,
        bet: Money,
        prize: Money,
    ) -> Option<GameResultInfo> {
        let pool = self.wild_bomb_pool(grid);
        if pool.is_empty() {
            return None;
        }

        let count = pool.len();
        let mut positions: BTreeSet<Position> = pool.into_iter().collect();
        positions.extend(grid.positions_of(self.wild()));
        let win = bet * prize * count as Money;

        Some(GameResultInfo {
            kind: GameResultKind::Special,
            symbol: None,
            positions: positions.into_iter().collect(),
            count,
            ways: 1,
            mul: prize,
            win,
            real_win: win,
        })
    }
}

impl Default for Paytable {
    fn default() -> Self {
        Self::museum()
    }
}
