//! Turn steps shared by the game modes

use crate::cascade::{collapse, removed_positions};
use crate::config::{GameConfig, TurnTables};
use crate::reels::{FillHook, MysteryWild, RandomDraw, RandomResult};
use crate::session::{SessionState, TurnRecord};
use crate::spin::{GameResultKind, SpinCtrl, SpinResult};

/// Draw a fresh grid, or refill the carried one, with the turn's mystery wild
pub fn draw_turn(
    config: &GameConfig,
    tables: TurnTables<'_>,
    state: &SessionState,
    rng: &mut dyn RandomDraw,
) -> RandomResult {
    let turn = state.cascading.turn_nums;
    let hook = MysteryWild {
        weight: tables.mystery_wild(turn),
        wild: config.paytable.wild(),
        scatter: config.paytable.scatter(),
    };

    match &state.symbol_block {
        Some(collapsed) => {
            let grid = collapsed.refill(|x| {
                let symbol = config.reels.draw_symbol(&mut *rng, x);
                hook.on_fill(symbol, &mut *rng)
            });
            RandomResult::from_grid(grid)
        }
        None => config
            .reels
            .draw_with(rng, config.max_consecutive(), &hook),
    }
}

/// Evaluate scatter, ways and wild bomb for one turn
pub fn count_turn(
    config: &GameConfig,
    tables: TurnTables<'_>,
    random: &RandomResult,
    turn: u32,
    ctrl: SpinCtrl,
) -> SpinResult {
    let paytable = &config.paytable;
    let grid = random.grid;
    let mut result = SpinResult::new(grid, turn, ctrl);

    if let Some(scatter) =
        paytable.evaluate_scatter(&grid, config.scatter_trigger, config.scatter_mode, ctrl.total_bet)
    {
        result.win += scatter.win;
        result.fg_nums = config.fg_nums;
        result.results.push(scatter);
    }

    for ways in paytable.evaluate_ways(&grid, ctrl.bet) {
        result.win += ways.win;
        result.results.push(ways);
    }

    // A running cascade keeps the bomb armed
    result.special_triggered = turn > 0 || grid.contains(paytable.wild());
    if result.special_triggered {
        if let Some(bomb) = paytable.evaluate_wild_bomb(&grid, ctrl.bet, tables.bonus_prize(turn)) {
            result.bonus_win = bomb.win;
            result.results.push(bomb);
        }
    }

    result.award_mul = tables.multiplier(turn);
    for info in &mut result.results {
        if info.kind != GameResultKind::Special {
            info.real_win = info.win * result.award_mul;
        }
    }
    result.real_win = result.win * result.award_mul + result.bonus_win;

    result
}

/// Update the cascading info with a turn's outcome
pub fn proc_turn(ctrl_id: u64, state: &mut SessionState, result: &SpinResult) {
    let cascading = &mut state.cascading;
    if result.has_results() {
        state.ctrl_id.ctrl_id = ctrl_id;
        cascading.turn_win += result.real_win;
        cascading.cur_bet = result.ctrl.bet;
        cascading.turn_nums += 1;
        cascading.is_end = false;
    } else {
        cascading.is_end = true;
    }

    state.add_turn_history(TurnRecord {
        win: result.win,
        real_win: result.real_win,
        award_mul: result.award_mul,
    });

    log::debug!(
        "Turn {}: win {} real {} x{} ({} results)",
        result.turn,
        result.win,
        result.real_win,
        result.award_mul,
        result.results.len()
    );
}

/// Carry the collapsed grid into the next turn, or drop it when the sequence ended
pub fn end_turn(state: &mut SessionState, result: &SpinResult) {
    state.symbol_block = if result.has_results() {
        Some(collapse(&result.grid, &removed_positions(result)))
    } else {
        None
    };
}
