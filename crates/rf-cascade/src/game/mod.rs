//! Game modules: one lifecycle, one type per game mode
//!
//! Each mode implements [`GameModule`]. A spin runs the same five steps on
//! whichever module the player is currently in:
//!
//! ```text
//! review_game_ctrl
//!     │
//!     v
//! on_spin_start → random_reels → count_spin_result → proc_spin_result → on_spin_end
//! ```
//!
//! ## Modes
//!
//! - [`BaseGame`]: paid spins over the `bg_*` tables; a scatter trigger
//!   reports free spins
//! - [`FreeGame`]: the Museum bonus round over the `fg_*` tables

mod base_game;
mod free_game;
mod module;
mod turn;

pub use base_game::*;
pub use free_game::*;
pub use module::*;
pub use turn::*;
