//! Museum free game

use std::sync::Arc;

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::reels::{RandomDraw, RandomResult};
use crate::session::{FreeInfo, GameCtrlId, GameModType, SessionState, UserInfo};
use crate::spin::{GameCtrl, GameCtrlMode, SpinCtrl, SpinResult};

use super::{GameModule, StartGameMod, count_turn, draw_turn, end_turn, proc_turn};

/// Free game session schema version
pub const FREE_GAME_VERSION: u32 = 1;

/// Bonus round: a fixed allocation of free spins, each of which may cascade
/// through several turns with rising award multipliers
pub struct FreeGame {
    config: Arc<GameConfig>,
}

impl FreeGame {
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }

    fn free_info<'a>(&self, state: &'a SessionState) -> GameResult<&'a FreeInfo> {
        state.free.as_ref().ok_or_else(|| {
            GameError::InvalidCascadingFreeState("free game state has no allocation".into())
        })
    }
}

impl GameModule for FreeGame {
    fn game_mod(&self) -> GameModType {
        GameModType::FreeGame
    }

    fn version(&self) -> u32 {
        FREE_GAME_VERSION
    }

    fn config(&self) -> &GameConfig {
        &self.config
    }

    fn start(
        &self,
        user: &UserInfo,
        state: &mut SessionState,
        start: &StartGameMod,
    ) -> GameResult<()> {
        let params = &start.free_game;
        let parent = &start.parent;

        if params.free_nums == 0 {
            return Err(GameError::InvalidStartFreeGameNums(params.free_nums));
        }
        if params.lines != self.config.lines {
            return Err(GameError::InvalidStartLines {
                got: params.lines,
                expected: self.config.lines,
            });
        }
        if params.times != self.config.times {
            return Err(GameError::InvalidStartTimes {
                got: params.times,
                expected: self.config.times,
            });
        }
        if !self.config.is_valid_bet(params.bet) {
            return Err(GameError::InvalidStartBet(params.bet));
        }
        if parent.ctrl_id == 0 {
            return Err(GameError::InvalidParentId(parent.ctrl_id));
        }
        if parent.game_mod != GameModType::BaseGame {
            return Err(GameError::InvalidParentGameMod(parent.game_mod));
        }
        if self.is_in(state) {
            return Err(GameError::AlreadyInFreeGame);
        }

        self.clear_state(state);
        state.free = Some(FreeInfo {
            last_nums: params.free_nums,
            cur_bet: params.bet,
            cur_lines: params.lines,
            cur_times: params.times,
            cur_nums: 0,
            total_win: 0,
        });
        state.cascading.is_end = true;
        state.ctrl_id = GameCtrlId {
            base_id: if parent.base_id > 0 {
                parent.base_id
            } else {
                parent.ctrl_id
            },
            parent_id: parent.ctrl_id,
            ctrl_id: 0,
            game_mod: GameModType::FreeGame,
        };

        log::info!(
            "User {} started free game: {} spins at bet {} (parent {})",
            user.user_id,
            params.free_nums,
            params.bet,
            parent.ctrl_id
        );
        Ok(())
    }

    fn is_in(&self, state: &SessionState) -> bool {
        state.last_nums() > 0 || !state.cascading.is_end
    }

    fn review_game_ctrl(&self, ctrl: &mut GameCtrl, state: &SessionState) -> GameResult<()> {
        let GameCtrlMode::FreeSpin(spin) = &mut ctrl.mode else {
            return Err(GameError::InvalidGameCtrlGameMod(GameModType::FreeGame));
        };

        let free = self.free_info(state)?;
        *spin = SpinCtrl::new(free.cur_bet, free.cur_lines, free.cur_times);
        spin.real_bet = 0;

        if !self.config.is_valid_bet(spin.bet) {
            return Err(GameError::InvalidBet(spin.bet));
        }
        state.check()
    }

    fn on_spin_start(&self, _ctrl: &GameCtrl, state: &mut SessionState) {
        let is_end = state.cascading.is_end;
        let Some(free) = state.free.as_mut() else {
            panic!("free spin started without a free game allocation");
        };
        assert!(
            free.last_nums > 0 || !is_end,
            "free spin started with no spins left"
        );

        if is_end {
            state.cascading.reset_sequence();
            free.last_nums -= 1;
            free.cur_nums += 1;
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
        Ok(draw_turn(&self.config, rtp.free_game(), state, rng))
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
            rtp.free_game(),
            random,
            state.cascading.turn_nums,
            *ctrl.spin_ctrl(),
        ))
    }

    fn proc_spin_result(&self, ctrl: &GameCtrl, state: &mut SessionState, result: &SpinResult) {
        if let Some(free) = state.free.as_mut() {
            free.last_nums += result.fg_nums;
            free.total_win += result.real_win;
            if result.fg_nums > 0 {
                log::info!("Free game retrigger: +{} spins", result.fg_nums);
            }
        }
        proc_turn(ctrl.ctrl_id, state, result);
    }

    fn on_spin_end(&self, state: &mut SessionState, result: &SpinResult) {
        end_turn(state, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::StartFreeGame;
    use crate::grid::SymbolGrid;
    use crate::spin::GameResultKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn module() -> FreeGame {
        FreeGame::new(Arc::new(GameConfig::museum()))
    }

    fn start_request(free_nums: u32) -> StartGameMod {
        StartGameMod {
            parent: GameCtrlId {
                base_id: 0,
                parent_id: 0,
                ctrl_id: 42,
                game_mod: GameModType::BaseGame,
            },
            free_game: StartFreeGame {
                free_nums,
                bet: 100,
                lines: 20,
                times: 1,
            },
        }
    }

    fn started(free_nums: u32) -> (FreeGame, SessionState) {
        let game = module();
        let mut state = SessionState::new(FREE_GAME_VERSION);
        game.start(&UserInfo::new(1), &mut state, &start_request(free_nums))
            .unwrap();
        (game, state)
    }

    #[test]
    fn test_start_sets_allocation() {
        let (game, state) = started(8);
        let free = state.free.unwrap();

        assert_eq!(free.last_nums, 8);
        assert_eq!(free.cur_bet, 100);
        assert_eq!(free.cur_nums, 0);
        assert!(state.cascading.is_end);
        assert_eq!(state.ctrl_id.parent_id, 42);
        assert_eq!(state.ctrl_id.base_id, 42);
        assert_eq!(state.ctrl_id.game_mod, GameModType::FreeGame);
        assert!(game.is_in(&state));
        assert!(!game.is_completed(&state));
    }

    #[test]
    fn test_start_validation_order() {
        let game = module();
        let user = UserInfo::new(1);
        let mut state = SessionState::new(FREE_GAME_VERSION);

        let mut req = start_request(0);
        req.free_game.lines = 10;
        let err = game.start(&user, &mut state, &req).unwrap_err();
        assert_eq!(err.code(), "INVALID_START_FREEGAME_NUMS");

        let mut req = start_request(5);
        req.free_game.lines = 10;
        req.free_game.bet = 3;
        assert_eq!(
            game.start(&user, &mut state, &req).unwrap_err().code(),
            "INVALID_START_LINES"
        );

        let mut req = start_request(5);
        req.free_game.times = 2;
        assert_eq!(
            game.start(&user, &mut state, &req).unwrap_err().code(),
            "INVALID_START_TIMES"
        );

        let mut req = start_request(5);
        req.free_game.bet = 3;
        assert_eq!(
            game.start(&user, &mut state, &req).unwrap_err().code(),
            "INVALID_START_BET"
        );

        let mut req = start_request(5);
        req.parent.ctrl_id = 0;
        req.parent.game_mod = GameModType::FreeGame;
        assert_eq!(
            game.start(&user, &mut state, &req).unwrap_err().code(),
            "INVALID_PARENTID"
        );

        let mut req = start_request(5);
        req.parent.game_mod = GameModType::FreeGame;
        assert_eq!(
            game.start(&user, &mut state, &req).unwrap_err().code(),
            "INVALID_PARENT_GAMEMOD"
        );

        assert_eq!(state, SessionState::new(FREE_GAME_VERSION));
    }

    #[test]
    fn test_start_rejected_while_in_free_game() {
        let (game, mut state) = started(3);
        let before = state.clone();

        let err = game
            .start(&UserInfo::new(1), &mut state, &start_request(5))
            .unwrap_err();
        assert!(matches!(err, GameError::AlreadyInFreeGame));
        assert_eq!(state, before);
    }

    #[test]
    fn test_review_normalizes_ctrl() {
        let (game, state) = started(3);

        let mut ctrl = GameCtrl::free_spin(7);
        game.review_game_ctrl(&mut ctrl, &state).unwrap();
        let spin = ctrl.spin_ctrl();
        assert_eq!(spin.bet, 100);
        assert_eq!(spin.lines, 20);
        assert_eq!(spin.total_bet, 2000);
        assert_eq!(spin.real_bet, 0);

        let mut paid = GameCtrl::spin(8, 100, 20, 1);
        assert!(matches!(
            game.review_game_ctrl(&mut paid, &state),
            Err(GameError::InvalidGameCtrlGameMod(GameModType::FreeGame))
        ));
    }

    #[test]
    fn test_spin_start_consumes_only_fresh_spins() {
        let (game, mut state) = started(3);
        let ctrl = GameCtrl::free_spin(7);

        game.on_spin_start(&ctrl, &mut state);
        assert_eq!(state.last_nums(), 2);
        assert_eq!(state.free.unwrap().cur_nums, 1);

        // Mid-cascade continuation
        state.cascading.is_end = false;
        game.on_spin_start(&ctrl, &mut state);
        assert_eq!(state.last_nums(), 2);
    }

    #[test]
    #[should_panic]
    fn test_spin_start_without_spins_panics() {
        let (game, mut state) = started(1);
        state.free.as_mut().unwrap().last_nums = 0;
        game.on_spin_start(&GameCtrl::free_spin(7), &mut state);
    }

    #[test]
    fn test_award_multiplier_clamps_on_late_turn() {
        let (game, mut state) = started(3);
        let user = UserInfo::new(1);
        let mut ctrl = GameCtrl::free_spin(7);
        game.review_game_ctrl(&mut ctrl, &state).unwrap();

        state.cascading.turn_nums = 10;
        let grid = SymbolGrid::from_rows([
            [2, 2, 2, 7, 8],
            [6, 7, 8, 9, 10],
            [7, 8, 9, 10, 6],
        ]);
        let result = game
            .count_spin_result(&user, &ctrl, &state, &RandomResult::from_grid(grid))
            .unwrap();

        // fg_multipliers = [1, 2, 3, 5, 8]
        assert_eq!(result.award_mul, 8);
        let ways = result.results_of(GameResultKind::Ways).next().unwrap();
        assert_eq!(ways.win, 100 * 10);
        assert_eq!(ways.real_win, 100 * 10 * 8);
        assert_eq!(result.real_win, result.win * 8 + result.bonus_win);
    }

    #[test]
    fn test_scatter_retrigger_adds_spins() {
        let (game, mut state) = started(3);
        let user = UserInfo::new(1);
        let mut ctrl = GameCtrl::free_spin(7);
        game.review_game_ctrl(&mut ctrl, &state).unwrap();
        game.on_spin_start(&ctrl, &mut state);

        let grid = SymbolGrid::from_rows([
            [1, 6, 3, 7, 4],
            [8, 4, 1, 5, 10],
            [5, 10, 2, 8, 1],
        ]);
        let random = RandomResult::from_grid(grid);
        let result = game.count_spin_result(&user, &ctrl, &state, &random).unwrap();
        assert_eq!(result.fg_nums, 8);

        game.proc_spin_result(&ctrl, &mut state, &result);
        game.on_spin_end(&mut state, &result);
        assert_eq!(state.last_nums(), 2 + 8);
        assert!(!state.cascading.is_end);
        assert_eq!(state.cascading.turn_nums, 1);
        assert_eq!(state.ctrl_id.ctrl_id, 7);
        assert!(state.symbol_block.is_some());
        assert!(state.check().is_ok());
    }

    #[test]
    fn test_full_allocation_completes() {
        let (game, mut state) = started(5);
        let user = UserInfo::new(1);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut ctrl_id = 100;

        while game.is_in(&state) {
            ctrl_id += 1;
            let mut ctrl = GameCtrl::free_spin(ctrl_id);
            game.review_game_ctrl(&mut ctrl, &state).unwrap();
            game.on_spin_start(&ctrl, &mut state);
            let random = game.random_reels(&user, &ctrl, &state, &mut rng).unwrap();
            let result = game.count_spin_result(&user, &ctrl, &state, &random).unwrap();
            game.proc_spin_result(&ctrl, &mut state, &result);
            game.on_spin_end(&mut state, &result);
            assert!(ctrl_id < 100_000, "free game never finished");
        }

        let free = state.free.unwrap();
        assert_eq!(free.last_nums, 0);
        assert!(free.cur_nums >= 5);
        assert!(game.is_completed(&state));
        assert!(state.symbol_block.is_none());
    }

    #[test]
    fn test_come_in_migrates_old_state() {
        let (game, mut state) = started(3);
        state.ver = 0;

        game.on_user_come_in(&UserInfo::new(1), &mut state).unwrap();
        assert_eq!(state.ver, FREE_GAME_VERSION);
        assert!(state.free.is_none());
        assert!(!game.is_in(&state));
    }
}
