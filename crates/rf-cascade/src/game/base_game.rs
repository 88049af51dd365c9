//! Base game: paid spins that can trigger the free game

use std::sync::Arc;

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::reels::{RandomDraw, RandomResult};
use crate::session::{GameModType, SessionState, UserInfo};
use crate::spin::{GameCtrl, GameCtrlMode, SpinCtrl, SpinResult};

use super::{GameModule, StartGameMod, count_turn, draw_turn, end_turn, proc_turn};

/// Base game session schema version
pub const BASE_GAME_VERSION: u32 = 1;

pub struct BaseGame {
    config: Arc<GameConfig>,
}

impl BaseGame {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }
}

impl GameModule for BaseGame {
    fn game_mod(&self) -> GameModType {
        GameModType::BaseGame
    }

    fn version(&self) -> u32 {
        BASE_GAME_VERSION
    }

    fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The base game is never entered through `start`; players are in it by default
    fn start(
        &self,
        _user: &UserInfo,
        _state: &mut SessionState,
        _start: &StartGameMod,
    ) -> GameResult<()> {
        Ok(())
    }

    /// Only a running cascade keeps the player here
    fn is_in(&self, state: &SessionState) -> bool {
        !state.cascading.is_end
    }

    fn review_game_ctrl(&self, ctrl: &mut GameCtrl, state: &SessionState) -> GameResult<()> {
        let GameCtrlMode::Spin(spin) = &mut ctrl.mode else {
            return Err(GameError::InvalidGameCtrlGameMod(GameModType::BaseGame));
        };

        if state.cascading.is_end {
            *spin = SpinCtrl::new(spin.bet, self.config.lines, self.config.times);
            spin.real_bet = spin.total_bet;
        } else {
            // Continuation replays the sequence's bet for free
            *spin = SpinCtrl::new(state.cascading.cur_bet, self.config.lines, self.config.times);
            spin.real_bet = 0;
        }

        if !self.config.is_valid_bet(spin.bet) {
            return Err(GameError::InvalidBet(spin.bet));
        }
        state.check()
    }

    fn on_spin_start(&self, _ctrl: &GameCtrl, state: &mut SessionState) {
        if state.cascading.is_end {
            state.cascading.reset_sequence();
        }
    }

    fn random_reels(
        &self,
        user: &UserInfo,
        _ctrl: &GameCtrl,
        state: &SessionState,
        rng: &mut dyn RandomDraw,
    ) -> GameResult<RandomResult> {
        let rtp = self.config.rtp_for(&user.config_name)?;
        Ok(draw_turn(&self.config, rtp.base_game(), state, rng))
    }

    fn count_spin_result(
        &self,
        user: &UserInfo,
        ctrl: &GameCtrl,
        state: &SessionState,
        random: &RandomResult,
    ) -> GameResult<SpinResult> {
        let rtp = self.config.rtp_for(&user.config_name)?;
        Ok(count_turn(
            &self.config,
            rtp.base_game(),
            random,
            state.cascading.turn_nums,
            *ctrl.spin_ctrl(),
        ))
    }

    fn proc_spin_result(&self, ctrl: &GameCtrl, state: &mut SessionState, result: &SpinResult) {
        proc_turn(ctrl.ctrl_id, state, result);
    }

    fn on_spin_end(&self, state: &mut SessionState, result: &SpinResult) {
        end_turn(state, result);
    }
}
