//! Persisted per-user session state

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::cascade::CollapsedGrid;
use crate::error::{GameError, GameResult};

/// Game mode a module implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameModType {
    #[default]
    BaseGame,
    FreeGame,
}

/// Control-chain ids linking a spin to the spin that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameCtrlId {
    /// Base-game spin at the root of the chain
    pub base_id: u64,
    /// Spin that started this mode
    pub parent_id: u64,
    /// Last spin recorded in this mode
    pub ctrl_id: u64,
    pub game_mod: GameModType,
}

/// One turn of the current cascade sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub win: Money,
    pub real_win: Money,
    pub award_mul: Money,
}

/// Progress of the current cascade sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadingInfo {
    /// Turns with results so far in this sequence
    pub turn_nums: u32,
    /// Real win accumulated across the sequence
    pub turn_win: Money,
    /// Bet the sequence was started with
    pub cur_bet: Money,
    /// No sequence running
    pub is_end: bool,
    /// Per-turn history, cleared when a new sequence starts
    #[serde(default)]
    pub history: Vec<TurnRecord>,
}

impl CascadingInfo {
    /// Reset counters for a new sequence
    pub fn reset_sequence(&mut self) {
        self.turn_nums = 0;
        self.turn_win = 0;
        self.history.clear();
    }
}

impl Default for CascadingInfo {
    fn default() -> Self {
        Self {
            turn_nums: 0,
            turn_win: 0,
            cur_bet: 0,
            is_end: true,
            history: Vec::new(),
        }
    }
}

/// Free-spin allocation of a bonus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FreeInfo {
    /// Free spins remaining
    pub last_nums: u32,
    pub cur_bet: Money,
    pub cur_lines: u32,
    pub cur_times: u32,
    /// Free spins consumed
    pub cur_nums: u32,
    pub total_win: Money,
}

/// Everything a game module persists for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Schema version
    pub ver: u32,
    pub cascading: CascadingInfo,
    /// Present only in the free game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<FreeInfo>,
    /// Grid carried into the next turn while a sequence runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_block: Option<CollapsedGrid>,
    pub ctrl_id: GameCtrlId,
}

impl SessionState {
    pub fn new(ver: u32) -> Self {
        Self {
            ver,
            cascading: CascadingInfo::default(),
            free: None,
            symbol_block: None,
            ctrl_id: GameCtrlId::default(),
        }
    }

    /// Reset to a fresh state stamped with `ver`
    pub fn clear(&mut self, ver: u32) {
        *self = Self::new(ver);
    }

    /// Lazy migration: reset a state written by another schema version.
    ///
    /// Returns `true` when the state was migrated. Running it twice is a no-op.
    pub fn migrate(&mut self, current_ver: u32) -> bool {
        if self.ver == current_ver {
            return false;
        }

        log::info!(
            "Migrating session from v{} to v{}",
            self.ver,
            current_ver
        );
        self.clear(current_ver);
        self.cascading.is_end = true;
        true
    }

    /// A running sequence must carry a grid, an ended one must not
    pub fn check(&self) -> GameResult<()> {
        match (self.cascading.is_end, self.symbol_block.is_some()) {
            (false, false) => Err(GameError::InvalidCascadingFreeState(
                "sequence running without a carried grid".into(),
            )),
            (true, true) => Err(GameError::InvalidCascadingFreeState(
                "sequence ended with a carried grid".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Free spins remaining (0 outside the free game)
    pub fn last_nums(&self) -> u32 {
        self.free.map(|f| f.last_nums).unwrap_or(0)
    }

    /// Record one turn in the sequence history
    pub fn add_turn_history(&mut self, record: TurnRecord) {
        self.cascading.history.push(record);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Per-user information supplied by the session layer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: u64,
    /// RTP config name; unknown or empty falls back to the default
    #[serde(default)]
    pub config_name: String,
}

impl UserInfo {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            config_name: String::new(),
        }
    }

    pub fn with_config(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }
}
