//! Per-turn spin control and results

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::grid::{Position, SymbolGrid};
use crate::symbols::Symbol;

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROL
// ═══════════════════════════════════════════════════════════════════════════════

/// Bet parameters of one spin request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpinCtrl {
    /// Bet per line
    pub bet: Money,
    pub lines: u32,
    pub times: u32,
    /// `bet × lines`
    pub total_bet: Money,
    /// Amount actually charged for this spin
    pub real_bet: Money,
}

impl SpinCtrl {
    pub fn new(bet: Money, lines: u32, times: u32) -> Self {
        Self {
            bet,
            lines,
            times,
            total_bet: bet * lines as Money,
            real_bet: 0,
        }
    }
}

/// Shape of a spin request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ctrl", rename_all = "snake_case")]
pub enum GameCtrlMode {
    /// Paid base-game spin
    Spin(SpinCtrl),
    /// Free-game spin
    FreeSpin(SpinCtrl),
}

/// A spin request as reviewed by the current game module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCtrl {
    /// Server-assigned control id of this request
    pub ctrl_id: u64,
    pub mode: GameCtrlMode,
}

impl GameCtrl {
    pub fn spin(ctrl_id: u64, bet: Money, lines: u32, times: u32) -> Self {
        Self {
            ctrl_id,
            mode: GameCtrlMode::Spin(SpinCtrl::new(bet, lines, times)),
        }
    }

    pub fn free_spin(ctrl_id: u64) -> Self {
        Self {
            ctrl_id,
            mode: GameCtrlMode::FreeSpin(SpinCtrl::default()),
        }
    }

    /// Bet parameters regardless of shape
    pub fn spin_ctrl(&self) -> &SpinCtrl {
        match &self.mode {
            GameCtrlMode::Spin(ctrl) | GameCtrlMode::FreeSpin(ctrl) => ctrl,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind of win event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResultKind {
    /// Scatter trigger
    Scatter,
    /// Ways-pay run
    Ways,
    /// Pooled wild bomb
    Special,
}

/// One win event of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResultInfo {
    pub kind: GameResultKind,
    /// Paying symbol (`None` for the wild bomb)
    pub symbol: Option<Symbol>,
    /// Cells involved, removed by the cascade
    pub positions: Vec<Position>,
    /// Run length, scatter count or bomb pool size
    pub count: usize,
    /// Ways count (1 for non-ways results)
    pub ways: u64,
    /// Pay multiplier (paytable value or bonus prize)
    pub mul: Money,
    pub win: Money,
    /// Win after the turn's award multiplier
    pub real_win: Money,
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Evaluated grid, after any mystery-wild substitution
    pub grid: SymbolGrid,
    /// Win events in evaluation order
    pub results: Vec<GameResultInfo>,
    /// Scatter + ways win before multiplier
    pub win: Money,
    /// `win × award_mul + bonus_win`
    pub real_win: Money,
    pub award_mul: Money,
    /// Wild bomb win
    pub bonus_win: Money,
    /// Is the wild bomb armed this turn?
    pub special_triggered: bool,
    /// Free spins awarded this turn
    pub fg_nums: u32,
    /// Cascade turn this result belongs to
    pub turn: u32,
    pub ctrl: SpinCtrl,
}

impl SpinResult {
    /// Empty result for `grid`
    pub fn new(grid: SymbolGrid, turn: u32, ctrl: SpinCtrl) -> Self {
        Self {
            grid,
            results: Vec::new(),
            win: 0,
            real_win: 0,
            award_mul: 1,
            bonus_win: 0,
            special_triggered: false,
            fg_nums: 0,
            turn,
            ctrl,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// Results of one kind
    pub fn results_of(&self, kind: GameResultKind) -> impl Iterator<Item = &GameResultInfo> {
        self.results.iter().filter(move |r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_ctrl_total_bet() {
        let ctrl = SpinCtrl::new(100, 20, 1);
        assert_eq!(ctrl.total_bet, 2000);
        assert_eq!(ctrl.real_bet, 0);
    }

    #[test]
    fn test_game_ctrl_json_shape() {
        let ctrl = GameCtrl::spin(7, 5, 20, 1);
        let json = serde_json::to_value(ctrl).unwrap();
        assert_eq!(json["mode"]["type"], "spin");
        assert_eq!(json["mode"]["ctrl"]["total_bet"], 100);

        let back: GameCtrl = serde_json::from_value(json).unwrap();
        assert_eq!(back, ctrl);
        assert_eq!(back.spin_ctrl().bet, 5);
    }

    #[test]
    fn test_results_of_kind() {
        let mut result = SpinResult::new(SymbolGrid::default(), 0, SpinCtrl::default());
        assert!(!result.has_results());

        result.results.push(GameResultInfo {
            kind: GameResultKind::Scatter,
            symbol: Some(1),
            positions: vec![Position::new(0, 0)],
            count: 3,
            ways: 1,
            mul: 0,
            win: 0,
            real_win: 0,
        });

        assert!(result.has_results());
        assert_eq!(result.results_of(GameResultKind::Scatter).count(), 1);
        assert_eq!(result.results_of(GameResultKind::Ways).count(), 0);
    }
}
