//! GameLogic: runs the spin pipeline for a player across game modes

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::game::{
    BASE_GAME_VERSION, BaseGame, BoxedGameModule, FREE_GAME_VERSION, FreeGame, GameModule,
    StartFreeGame, StartGameMod,
};
use crate::reels::{RandomDraw, RandomResult};
use crate::session::{GameCtrlId, GameModType, SessionState, UserInfo};
use crate::spin::{GameCtrl, SpinResult};

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYER STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Spins that started a new sequence (paid or free)
    pub total_spins: u64,
    /// Turns including cascade continuations
    pub total_turns: u64,
    pub total_bet: Money,
    pub total_win: Money,
    /// Sequences that paid
    pub wins: u64,
    pub free_games_triggered: u64,
    pub free_spins_played: u64,
    /// Most turns with results in one sequence
    pub longest_cascade: u32,
    /// Biggest single-sequence win
    pub max_win: Money,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0 {
            (self.total_win as f64 / self.total_bet as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record_turn(&mut self, game_mod: GameModType, fresh: bool, result: &SpinResult) {
        self.total_turns += 1;
        self.total_win += result.real_win;
        if fresh {
            self.total_spins += 1;
            self.total_bet += result.ctrl.real_bet;
            if game_mod == GameModType::FreeGame {
                self.free_spins_played += 1;
            }
        }
    }

    fn record_sequence(&mut self, turn_win: Money, turn_nums: u32) {
        if turn_win > 0 {
            self.wins += 1;
        }
        self.longest_cascade = self.longest_cascade.max(turn_nums);
        self.max_win = self.max_win.max(turn_win);
    }
}

/// Everything the session layer persists for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub user: UserInfo,
    pub base: SessionState,
    pub free: SessionState,
    /// Next control id to hand out
    pub next_ctrl_id: u64,
    /// Free spins won in the running base sequence, awarded when it ends
    pub pending_free_nums: u32,
    /// Base spin that won the pending free spins
    #[serde(default)]
    pub pending_parent: Option<GameCtrlId>,
    #[serde(default)]
    pub stats: SessionStats,
}

impl PlayerState {
    pub fn new(user: UserInfo) -> Self {
        Self {
            user,
            base: SessionState::new(BASE_GAME_VERSION),
            free: SessionState::new(FREE_GAME_VERSION),
            next_ctrl_id: 1,
            pending_free_nums: 0,
            pending_parent: None,
            stats: SessionStats::default(),
        }
    }

    fn take_ctrl_id(&mut self) -> u64 {
        let id = self.next_ctrl_id;
        self.next_ctrl_id += 1;
        id
    }

    fn state_mut(&mut self, game_mod: GameModType) -> &mut SessionState {
        match game_mod {
            GameModType::BaseGame => &mut self.base,
            GameModType::FreeGame => &mut self.free,
        }
    }
}

/// Result of one call to [`GameLogic::spin`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// Mode the turn was played in
    pub game_mod: GameModType,
    /// Reviewed control
    pub ctrl: GameCtrl,
    pub random: RandomResult,
    pub result: SpinResult,
    /// The mode finished with this turn
    pub completed: bool,
    /// The free game was entered after this turn
    pub free_game_started: bool,
}

/// Summary of one complete free game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeGameRound {
    /// Free spins played, retriggers included
    pub spins: u32,
    pub turns: u32,
    pub total_win: Money,
    pub longest_cascade: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// GAME LOGIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Owns the shared config and one module per game mode
pub struct GameLogic {
    config: Arc<GameConfig>,
    modules: HashMap<GameModType, BoxedGameModule>,
}

impl GameLogic {
    /// Create with the base game and free game registered
    pub fn new(config: Arc<GameConfig>) -> Self {
        let mut modules: HashMap<GameModType, BoxedGameModule> = HashMap::new();
        modules.insert(
            GameModType::BaseGame,
            Box::new(BaseGame::new(Arc::clone(&config))),
        );
        modules.insert(
            GameModType::FreeGame,
            Box::new(FreeGame::new(Arc::clone(&config))),
        );

        Self { config, modules }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn module(&self, game_mod: GameModType) -> &dyn GameModule {
        self.modules[&game_mod].as_ref()
    }

    /// Mode the player's next spin is played in
    pub fn current_mod(&self, player: &PlayerState) -> GameModType {
        if self.module(GameModType::FreeGame).is_in(&player.free) {
            GameModType::FreeGame
        } else {
            GameModType::BaseGame
        }
    }

    /// Migrate and check every stored mode state
    pub fn user_come_in(&self, player: &mut PlayerState) -> GameResult<()> {
        self.module(GameModType::BaseGame)
            .on_user_come_in(&player.user, &mut player.base)?;
        self.module(GameModType::FreeGame)
            .on_user_come_in(&player.user, &mut player.free)
    }

    /// Enter the free game directly
    pub fn start_free_game(&self, player: &mut PlayerState, start: &StartGameMod) -> GameResult<()> {
        self.module(GameModType::FreeGame)
            .start(&player.user, &mut player.free, start)?;
        player.stats.free_games_triggered += 1;
        Ok(())
    }

    /// Play one turn in the player's current mode.
    ///
    /// `bet` is only read for a fresh base-game spin.
    pub fn spin(
        &self,
        player: &mut PlayerState,
        bet: Money,
        rng: &mut dyn RandomDraw,
    ) -> GameResult<SpinOutcome> {
        let game_mod = self.current_mod(player);
        let ctrl_id = player.take_ctrl_id();
        let ctrl = match game_mod {
            GameModType::BaseGame => {
                GameCtrl::spin(ctrl_id, bet, self.config.lines, self.config.times)
            }
            GameModType::FreeGame => GameCtrl::free_spin(ctrl_id),
        };
        self.spin_with_ctrl(player, game_mod, ctrl, rng)
    }

    /// Play one turn with an explicit control in mode `game_mod`
    pub fn spin_with_ctrl(
        &self,
        player: &mut PlayerState,
        game_mod: GameModType,
        mut ctrl: GameCtrl,
        rng: &mut dyn RandomDraw,
    ) -> GameResult<SpinOutcome> {
        let module = self.module(game_mod);
        let user = player.user.clone();
        let state = player.state_mut(game_mod);

        module.review_game_ctrl(&mut ctrl, state)?;
        // Resolve the RTP config before on_spin_start consumes a spin
        self.config.rtp_for(&user.config_name)?;
        let fresh = state.cascading.is_end;
        module.on_spin_start(&ctrl, state);
        let random = module.random_reels(&user, &ctrl, state, rng)?;
        let result = module.count_spin_result(&user, &ctrl, state, &random)?;
        module.proc_spin_result(&ctrl, state, &result);
        module.on_spin_end(state, &result);

        let completed = module.is_completed(state);
        let finished = state
            .cascading
            .is_end
            .then_some((state.cascading.turn_win, state.cascading.turn_nums));

        player.stats.record_turn(game_mod, fresh, &result);
        if let Some((turn_win, turn_nums)) = finished {
            player.stats.record_sequence(turn_win, turn_nums);
        }

        let mut free_game_started = false;
        match game_mod {
            GameModType::BaseGame => {
                if result.fg_nums > 0 {
                    player.pending_free_nums += result.fg_nums;
                    player.pending_parent = Some(GameCtrlId {
                        base_id: ctrl.ctrl_id,
                        parent_id: 0,
                        ctrl_id: ctrl.ctrl_id,
                        game_mod: GameModType::BaseGame,
                    });
                }
                if completed && player.pending_free_nums > 0 {
                    self.award_pending(player)?;
                    free_game_started = true;
                }
            }
            GameModType::FreeGame => {
                if completed {
                    let free = player.free.free.unwrap_or_default();
                    log::info!(
                        "User {} finished free game: {} spins, total win {}",
                        player.user.user_id,
                        free.cur_nums,
                        free.total_win
                    );
                }
            }
        }

        Ok(SpinOutcome {
            game_mod,
            ctrl,
            random,
            result,
            completed,
            free_game_started,
        })
    }

    fn award_pending(&self, player: &mut PlayerState) -> GameResult<()> {
        let parent = player
            .pending_parent
            .ok_or_else(|| GameError::InvalidParentId(0))?;
        let start = StartGameMod {
            parent,
            free_game: StartFreeGame {
                free_nums: player.pending_free_nums,
                bet: player.base.cascading.cur_bet,
                lines: self.config.lines,
                times: self.config.times,
            },
        };

        self.start_free_game(player, &start)?;
        player.pending_free_nums = 0;
        player.pending_parent = None;
        Ok(())
    }

    /// Play a whole free game of `free_nums` spins for a fresh player
    pub fn play_free_game(
        &self,
        user: UserInfo,
        free_nums: u32,
        bet: Money,
        rng: &mut dyn RandomDraw,
    ) -> GameResult<(FreeGameRound, PlayerState)> {
        let mut player = PlayerState::new(user);
        let parent_id = player.take_ctrl_id();
        let start = StartGameMod {
            parent: GameCtrlId {
                base_id: parent_id,
                parent_id: 0,
                ctrl_id: parent_id,
                game_mod: GameModType::BaseGame,
            },
            free_game: StartFreeGame {
                free_nums,
                bet,
                lines: self.config.lines,
                times: self.config.times,
            },
        };
        self.start_free_game(&mut player, &start)?;

        let mut round = FreeGameRound::default();
        loop {
            let outcome = self.spin(&mut player, bet, rng)?;
            round.turns += 1;
            round.total_win += outcome.result.real_win;
            if outcome.completed {
                break;
            }
        }

        let free = player.free.free.unwrap_or_default();
        round.spins = free.cur_nums;
        round.longest_cascade = player.stats.longest_cascade;
        Ok((round, player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn logic() -> GameLogic {
        GameLogic::new(Arc::new(GameConfig::museum()))
    }

    #[test]
    fn test_modules_registered() {
        let logic = logic();
        assert_eq!(
            logic.module(GameModType::BaseGame).game_mod(),
            GameModType::BaseGame
        );
        assert_eq!(
            logic.module(GameModType::FreeGame).game_mod(),
            GameModType::FreeGame
        );
    }

    #[test]
    fn test_base_spins_charge_bet() {
        let logic = logic();
        let mut player = PlayerState::new(UserInfo::new(9));
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outcome = logic.spin(&mut player, 10, &mut rng).unwrap();
        assert_eq!(outcome.game_mod, GameModType::BaseGame);
        assert_eq!(outcome.ctrl.spin_ctrl().real_bet, 200);
        assert_eq!(player.stats.total_bet, 200);
        assert_eq!(player.stats.total_spins, 1);
        assert_eq!(player.next_ctrl_id, 2);
    }

    #[test]
    fn test_invalid_bet_leaves_state() {
        let logic = logic();
        let mut player = PlayerState::new(UserInfo::new(9));
        let before = player.base.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let err = logic.spin(&mut player, 7, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InvalidBet(7)));
        assert_eq!(player.base, before);
    }

    #[test]
    fn test_missing_rtp_keeps_free_spin() {
        let config = GameConfig {
            default_rtp: "gone".into(),
            ..GameConfig::museum()
        };
        let logic = GameLogic::new(Arc::new(config));
        let mut player = PlayerState::new(UserInfo::new(9));
        let start = StartGameMod {
            parent: GameCtrlId {
                base_id: 0,
                parent_id: 0,
                ctrl_id: 1,
                game_mod: GameModType::BaseGame,
            },
            free_game: StartFreeGame {
                free_nums: 3,
                bet: 10,
                lines: 20,
                times: 1,
            },
        };
        logic.start_free_game(&mut player, &start).unwrap();
        let before = player.free.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let err = logic.spin(&mut player, 10, &mut rng).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        assert_eq!(player.free, before);
        assert_eq!(player.free.last_nums(), 3);
    }

    #[test]
    fn test_play_free_game() {
        let logic = logic();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        let (round, player) = logic
            .play_free_game(UserInfo::new(1), 8, 10, &mut rng)
            .unwrap();
        assert!(round.spins >= 8);
        assert!(round.turns >= round.spins);
        assert_eq!(player.stats.free_games_triggered, 1);
        assert_eq!(player.stats.free_spins_played, round.spins as u64);
        assert_eq!(player.stats.total_bet, 0);
        assert_eq!(player.free.free.unwrap().total_win, round.total_win);
        assert_eq!(logic.current_mod(&player), GameModType::BaseGame);
    }

    #[test]
    fn test_stats_rtp() {
        let stats = SessionStats {
            total_bet: 200,
            total_win: 150,
            total_spins: 4,
            wins: 1,
            ..Default::default()
        };
        assert_eq!(stats.rtp(), 75.0);
        assert_eq!(stats.hit_rate(), 25.0);
        assert_eq!(SessionStats::default().rtp(), 0.0);
    }
}
