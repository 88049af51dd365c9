//! Game configuration and turn-indexed RTP tables
//!
//! Everything here is loaded once, validated, wrapped in an `Arc` and shared
//! read-only by every game module.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::grid::{GRID_SIZE, WIDTH};
use crate::paytable::Paytable;
use crate::reels::ReelBank;
use crate::symbols::SymbolType;

/// Name of the RTP config used when a user has none or an unknown one
pub const DEFAULT_RTP_NAME: &str = "default";

/// Look up a turn-indexed table, clamping to the last entry once `turn`
/// runs past the end.
///
/// Tables are validated non-empty at load time; an empty table here is a
/// caller bug.
pub fn turn_indexed<T>(table: &[T], turn: u32) -> &T {
    assert!(!table.is_empty(), "turn-indexed table must not be empty");
    let idx = (turn as usize).min(table.len() - 1);
    &table[idx]
}

/// Odds of a filled cell turning into a wild: `wild` in `wild + other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysteryWildWeight {
    pub wild: u32,
    pub other: u32,
}

impl MysteryWildWeight {
    /// Sum of both weights, widened so untrusted configs cannot overflow
    pub fn total(&self) -> u64 {
        u64::from(self.wild) + u64::from(self.other)
    }
}

/// View over one game mode's turn-indexed tables
#[derive(Debug, Clone, Copy)]
pub struct TurnTables<'a> {
    pub mystery_wild: &'a [MysteryWildWeight],
    pub multipliers: &'a [Money],
    pub bonus_prize: &'a [Money],
}

impl TurnTables<'_> {
    pub fn mystery_wild(&self, turn: u32) -> MysteryWildWeight {
        *turn_indexed(self.mystery_wild, turn)
    }

    pub fn multiplier(&self, turn: u32) -> Money {
        *turn_indexed(self.multipliers, turn)
    }

    pub fn bonus_prize(&self, turn: u32) -> Money {
        *turn_indexed(self.bonus_prize, turn)
    }
}

/// Return-to-player tuning, indexed by cascade turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtpConfig {
    /// Free game mystery-wild weight per turn
    pub fg_mystery_wild: Vec<MysteryWildWeight>,
    /// Free game award multiplier per turn
    pub fg_multipliers: Vec<Money>,
    /// Free game wild-bomb prize multiplier per turn
    pub fg_bonus_prize: Vec<Money>,
    /// Base game mystery-wild weight per turn
    pub bg_mystery_wild: Vec<MysteryWildWeight>,
    /// Base game award multiplier per turn
    pub bg_multipliers: Vec<Money>,
    /// Base game wild-bomb prize multiplier per turn
    pub bg_bonus_prize: Vec<Money>,
}

impl RtpConfig {
    /// Museum tuning
    pub fn museum() -> Self {
        Self {
            fg_mystery_wild: vec![
                MysteryWildWeight { wild: 3, other: 97 },
                MysteryWildWeight { wild: 2, other: 98 },
                MysteryWildWeight { wild: 1, other: 99 },
                MysteryWildWeight { wild: 1, other: 149 },
                MysteryWildWeight { wild: 1, other: 199 },
            ],
            fg_multipliers: vec![1, 2, 3, 5, 8],
            fg_bonus_prize: vec![2, 3, 4, 5, 6],
            bg_mystery_wild: vec![
                MysteryWildWeight { wild: 1, other: 99 },
                MysteryWildWeight { wild: 1, other: 199 },
            ],
            bg_multipliers: vec![1, 2, 3, 5],
            bg_bonus_prize: vec![1, 2],
        }
    }

    pub fn free_game(&self) -> TurnTables<'_> {
        TurnTables {
            mystery_wild: &self.fg_mystery_wild,
            multipliers: &self.fg_multipliers,
            bonus_prize: &self.fg_bonus_prize,
        }
    }

    pub fn base_game(&self) -> TurnTables<'_> {
        TurnTables {
            mystery_wild: &self.bg_mystery_wild,
            multipliers: &self.bg_multipliers,
            bonus_prize: &self.bg_bonus_prize,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let tables = [
            ("fg_mystery_wild", self.fg_mystery_wild.len()),
            ("fg_multipliers", self.fg_multipliers.len()),
            ("fg_bonus_prize", self.fg_bonus_prize.len()),
            ("bg_mystery_wild", self.bg_mystery_wild.len()),
            ("bg_multipliers", self.bg_multipliers.len()),
            ("bg_bonus_prize", self.bg_bonus_prize.len()),
        ];
        for (table, len) in tables {
            if len == 0 {
                return Err(ConfigError::EmptyTable {
                    rtp: name.to_string(),
                    table,
                });
            }
        }

        let weights = self.fg_mystery_wild.iter().chain(&self.bg_mystery_wild);
        for weight in weights {
            if weight.total() == 0 {
                return Err(ConfigError::InvalidValue(format!(
                    "rtp '{}': mystery wild weight sums to zero",
                    name
                )));
            }
        }

        let mut amounts = self
            .fg_multipliers
            .iter()
            .chain(&self.fg_bonus_prize)
            .chain(&self.bg_multipliers)
            .chain(&self.bg_bonus_prize);
        if amounts.any(|&m| m < 0) {
            return Err(ConfigError::InvalidValue(format!(
                "rtp '{}': negative multiplier",
                name
            )));
        }

        Ok(())
    }
}

impl Default for RtpConfig {
    fn default() -> Self {
        Self::museum()
    }
}

/// How a scatter trigger is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    /// Scatter only awards free spins (win = 0)
    #[default]
    TriggerOnly,
    /// Scatter pays `total_bet × pay(count)` and awards free spins
    PayAndTrigger,
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Game name
    pub name: String,
    /// Allowed bets (per line)
    pub bets: Vec<Money>,
    /// Fixed line count used for total bet
    pub lines: u32,
    /// Fixed bet times
    pub times: u32,
    /// Free spins awarded by a scatter trigger
    pub fg_nums: u32,
    /// Scatters needed to trigger
    pub scatter_trigger: usize,
    /// Scatter payout policy
    #[serde(default)]
    pub scatter_mode: ScatterMode,
    /// Max identical symbols in a drawn column, -1 = unlimited
    pub max_consecutive: i32,
    /// Reel strips
    pub reels: ReelBank,
    /// Symbols and pays
    pub paytable: Paytable,
    /// Named RTP configs
    pub rtp: HashMap<String, RtpConfig>,
    /// RTP config used when a user's is unknown
    #[serde(default = "default_rtp_name")]
    pub default_rtp: String,
}

fn default_rtp_name() -> String {
    DEFAULT_RTP_NAME.to_string()
}

impl GameConfig {
    /// The Museum game
    pub fn museum() -> Self {
        let mut rtp = HashMap::new();
        rtp.insert(DEFAULT_RTP_NAME.to_string(), RtpConfig::museum());

        Self {
            name: "Museum".into(),
            bets: vec![1, 2, 5, 10, 20, 50, 100, 200],
            lines: 20,
            times: 1,
            fg_nums: 8,
            scatter_trigger: 3,
            scatter_mode: ScatterMode::TriggerOnly,
            max_consecutive: 2,
            reels: ReelBank::museum(),
            paytable: Paytable::museum(),
            rtp,
            default_rtp: DEFAULT_RTP_NAME.to_string(),
        }
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Column constraint as the draw expects it
    pub fn max_consecutive(&self) -> Option<usize> {
        usize::try_from(self.max_consecutive).ok()
    }

    /// Is `bet` in the allowed bet list?
    pub fn is_valid_bet(&self, bet: Money) -> bool {
        self.bets.contains(&bet)
    }

    /// RTP config for a user's config name, falling back to the default
    pub fn rtp_for(&self, name: &str) -> Result<&RtpConfig, ConfigError> {
        if let Some(rtp) = self.rtp.get(name) {
            return Ok(rtp);
        }
        if !name.is_empty() {
            log::warn!(
                "Unknown RTP config '{}', using '{}'",
                name,
                self.default_rtp
            );
        }
        self.rtp
            .get(&self.default_rtp)
            .ok_or_else(|| ConfigError::MissingRtp(self.default_rtp.clone()))
    }

    /// Check structural consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bets.is_empty() || self.bets.iter().any(|&b| b <= 0) {
            return Err(ConfigError::InvalidValue("bets must be non-empty and positive".into()));
        }
        if self.lines == 0 || self.times == 0 {
            return Err(ConfigError::InvalidValue("lines and times must be positive".into()));
        }
        if self.scatter_trigger == 0 || self.scatter_trigger > GRID_SIZE {
            return Err(ConfigError::InvalidValue(format!(
                "scatter_trigger {} outside 1..={}",
                self.scatter_trigger, GRID_SIZE
            )));
        }
        if self.max_consecutive == 0 || self.max_consecutive < -1 {
            return Err(ConfigError::InvalidValue(format!(
                "max_consecutive {} must be -1 or positive",
                self.max_consecutive
            )));
        }

        if self.reels.strips.len() != WIDTH {
            return Err(ConfigError::InvalidReels(format!(
                "expected {} strips, got {}",
                WIDTH,
                self.reels.strips.len()
            )));
        }
        for (x, strip) in self.reels.strips.iter().enumerate() {
            if strip.is_empty() {
                return Err(ConfigError::InvalidReels(format!("strip {} is empty", x)));
            }
            if let Some(&unknown) = strip
                .symbols
                .iter()
                .find(|&&s| self.paytable.symbols.get(s).is_none())
            {
                return Err(ConfigError::InvalidReels(format!(
                    "strip {} holds unknown symbol {}",
                    x, unknown
                )));
            }
        }

        let symbols = &self.paytable.symbols;
        if symbols.wild_id().is_none() {
            return Err(ConfigError::MissingSymbol(SymbolType::Wild));
        }
        if symbols.scatter_id().is_none() {
            return Err(ConfigError::MissingSymbol(SymbolType::Scatter));
        }

        if !self.rtp.contains_key(&self.default_rtp) {
            return Err(ConfigError::MissingRtp(self.default_rtp.clone()));
        }
        for (name, rtp) in &self.rtp {
            rtp.validate(name)?;
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::museum()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("RTP config '{rtp}' has an empty {table} table")]
    EmptyTable { rtp: String, table: &'static str },

    #[error("Missing RTP config: {0}")]
    MissingRtp(String),

    #[error("Paytable has no {0:?} symbol")]
    MissingSymbol(SymbolType),

    #[error("Invalid reels: {0}")]
    InvalidReels(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
