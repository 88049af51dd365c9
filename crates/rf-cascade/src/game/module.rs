//! GameModule trait: the lifecycle shared by every game mode

use serde::{Deserialize, Serialize};

use crate::Money;
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::reels::{RandomDraw, RandomResult};
use crate::session::{GameCtrlId, GameModType, SessionState, UserInfo};
use crate::spin::{GameCtrl, SpinResult};

/// Parameters of a free-game allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartFreeGame {
    /// Free spins to award
    pub free_nums: u32,
    pub bet: Money,
    pub lines: u32,
    pub times: u32,
}

/// Request to enter a game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartGameMod {
    /// Spin that triggered the mode
    pub parent: GameCtrlId,
    pub free_game: StartFreeGame,
}

/// The interface every game mode implements.
///
/// Modules are stateless: all progress lives in the [`SessionState`] passed
/// in, so one module instance serves every user.
///
/// ## Lifecycle
///
/// 1. `start()` - Enter the mode from a triggering spin
/// 2. `on_user_come_in()` - Migrate and check a stored state
/// 3. `review_game_ctrl()` - Validate and normalize a spin request
/// 4. `on_spin_start()` .. `on_spin_end()` - One turn
/// 5. `is_completed()` - Leave the mode
pub trait GameModule: Send + Sync {
    // ═══════════════════════════════════════════════════════════════════════════
    // IDENTITY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Mode implemented by this module
    fn game_mod(&self) -> GameModType;

    /// Current session schema version
    fn version(&self) -> u32;

    /// Shared game config
    fn config(&self) -> &GameConfig;

    // ═══════════════════════════════════════════════════════════════════════════
    // SESSION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Enter the mode. No state is touched unless every check passes.
    fn start(
        &self,
        user: &UserInfo,
        state: &mut SessionState,
        start: &StartGameMod,
    ) -> GameResult<()>;

    /// Lazy migration of a stored state, then a consistency check
    fn on_user_come_in(&self, user: &UserInfo, state: &mut SessionState) -> GameResult<()> {
        if state.migrate(self.version()) {
            log::info!(
                "User {} {:?} state reset to v{}",
                user.user_id,
                self.game_mod(),
                self.version()
            );
        }
        state.check()
    }

    /// Is the user still inside this mode?
    fn is_in(&self, state: &SessionState) -> bool;

    /// Has the mode finished?
    fn is_completed(&self, state: &SessionState) -> bool {
        !self.is_in(state)
    }

    /// Reset the state for this mode
    fn clear_state(&self, state: &mut SessionState) {
        state.clear(self.version());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN PIPELINE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Validate a request and fill in the bet this mode plays with
    fn review_game_ctrl(&self, ctrl: &mut GameCtrl, state: &SessionState) -> GameResult<()>;

    /// Begin a turn; consumes a spin when no sequence is running
    fn on_spin_start(&self, ctrl: &GameCtrl, state: &mut SessionState);

    /// Draw or refill this turn's grid
    fn random_reels(
        &self,
        user: &UserInfo,
        ctrl: &GameCtrl,
        state: &SessionState,
        rng: &mut dyn RandomDraw,
    ) -> GameResult<RandomResult>;

    /// Evaluate this turn's wins
    fn count_spin_result(
        &self,
        user: &UserInfo,
        ctrl: &GameCtrl,
        state: &SessionState,
        random: &RandomResult,
    ) -> GameResult<SpinResult>;

    /// Fold the turn into the session
    fn proc_spin_result(&self, ctrl: &GameCtrl, state: &mut SessionState, result: &SpinResult);

    /// Collapse the winning cells for the next turn
    fn on_spin_end(&self, state: &mut SessionState, result: &SpinResult);
}

/// Boxed game module for dynamic dispatch
pub type BoxedGameModule = Box<dyn GameModule + 'static>;
