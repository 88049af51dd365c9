//! # rf-cascade: Cascading Ways-Pay Slot Engine
//!
//! Computes the outcome of one spin of a 5×3 cascading slot: draws symbols from
//! weighted reel strips, evaluates scatter, ways-pay and wild-bomb wins, removes
//! winning symbols and lets the survivors fall, and threads the resulting turns
//! into a free-game session that a server persists between requests.
//!
//! ## Features
//!
//! - **Reel Bank**: per-column strips with a max-consecutive constraint and a
//!   mystery-wild fill hook
//! - **Turn-Indexed RTP**: multiplier, bonus prize and mystery-wild tables
//!   looked up per cascade turn, clamped to the last tier
//! - **Cascade**: remove, gravity-fall, refill with stable column order
//! - **Payouts**: scatter trigger, 243-style ways, pooled wild bomb
//! - **Game Modules**: base game and free game sharing one five-step lifecycle
//!
//! ## Architecture
//!
//! ```text
//! GameLogic (Arc<GameConfig>)
//!     │
//!     ├── BaseGame ─┐
//!     └── FreeGame ─┤  on_spin_start → random_reels → count_spin_result
//!                   │               → proc_spin_result → on_spin_end
//!                   v
//!     ReelBank ── Paytable ── RtpConfig ── cascade
//!           │
//!           v
//!     SpinResult + SessionState
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod logic;
pub mod paytable;
pub mod reels;
pub mod session;
pub mod spin;
pub mod symbols;

pub use cascade::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use grid::*;
pub use logic::*;
pub use paytable::*;
pub use reels::*;
pub use session::*;
pub use spin::*;
pub use symbols::*;

/// Integer money amount in the smallest currency unit
pub type Money = i64;
