//! Game error types

use thiserror::Error;

use crate::Money;
use crate::config::ConfigError;
use crate::session::GameModType;

/// Broad class of a [`GameError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was malformed or not allowed
    Validation,
    /// The persisted session is inconsistent
    State,
    /// The loaded configuration is unusable
    Config,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid free spin count: {0}")]
    InvalidStartFreeGameNums(u32),

    #[error("Invalid lines: {got} (expected {expected})")]
    InvalidStartLines { got: u32, expected: u32 },

    #[error("Invalid times: {got} (expected {expected})")]
    InvalidStartTimes { got: u32, expected: u32 },

    #[error("Bet not allowed to start the free game: {0}")]
    InvalidStartBet(Money),

    #[error("Invalid parent ctrl id: {0}")]
    InvalidParentId(u64),

    #[error("Parent game mod must be the base game, got {0:?}")]
    InvalidParentGameMod(GameModType),

    #[error("Already in the free game")]
    AlreadyInFreeGame,

    #[error("Ctrl shape not accepted by {0:?}")]
    InvalidGameCtrlGameMod(GameModType),

    #[error("Bet not allowed: {0}")]
    InvalidBet(Money),

    #[error("Inconsistent cascading state: {0}")]
    InvalidCascadingFreeState(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCascadingFreeState(_) => ErrorKind::State,
            Self::Config(_) => ErrorKind::Config,
            _ => ErrorKind::Validation,
        }
    }

    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidStartFreeGameNums(_) => "INVALID_START_FREEGAME_NUMS",
            Self::InvalidStartLines { .. } => "INVALID_START_LINES",
            Self::InvalidStartTimes { .. } => "INVALID_START_TIMES",
            Self::InvalidStartBet(_) => "INVALID_START_BET",
            Self::InvalidParentId(_) => "INVALID_PARENTID",
            Self::InvalidParentGameMod(_) => "INVALID_PARENT_GAMEMOD",
            Self::AlreadyInFreeGame => "ALREADY_IN_FREEGAME",
            Self::InvalidGameCtrlGameMod(_) => "INVALID_GAMECTRL_GAMEMOD",
            Self::InvalidBet(_) => "INVALID_BET",
            Self::InvalidCascadingFreeState(_) => "INVALID_CASCADING_FREESTATE",
            Self::Config(_) => "INVALID_CONFIG",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_codes() {
        let err = GameError::InvalidStartFreeGameNums(0);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "INVALID_START_FREEGAME_NUMS");

        let err = GameError::InvalidCascadingFreeState("no grid".into());
        assert_eq!(err.kind(), ErrorKind::State);

        let err: GameError = ConfigError::MissingRtp("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(err.to_string(), "Config error: Missing RTP config: x");
    }
}
