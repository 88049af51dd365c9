//! End-to-end free game flows through GameLogic

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rf_cascade::{
    FREE_GAME_VERSION, GameConfig, GameCtrl, GameCtrlId, GameError, GameLogic, GameModType,
    GameModule, GameResultKind, PlayerState, RandomResult, SessionState, StartFreeGame,
    StartGameMod, SymbolGrid, UserInfo,
};

fn museum() -> Arc<GameConfig> {
    Arc::new(GameConfig::museum())
}

fn start_request(free_nums: u32, bet: i64) -> StartGameMod {
    StartGameMod {
        parent: GameCtrlId {
            base_id: 1,
            parent_id: 0,
            ctrl_id: 1,
            game_mod: GameModType::BaseGame,
        },
        free_game: StartFreeGame {
            free_nums,
            bet,
            lines: 20,
            times: 1,
        },
    }
}

#[test]
fn test_free_spins_never_go_negative() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(1));
    logic
        .start_free_game(&mut player, &start_request(10, 5))
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut previous = player.free.last_nums();
    let mut turns = 0;

    while logic.current_mod(&player) == GameModType::FreeGame {
        let outcome = logic.spin(&mut player, 0, &mut rng).unwrap();
        assert_eq!(outcome.game_mod, GameModType::FreeGame);

        let last = player.free.last_nums();
        // Only a fresh spin consumes, a retrigger can only add
        assert!(last + 1 >= previous || outcome.result.fg_nums > 0);
        assert!(player.free.check().is_ok());
        previous = last;

        turns += 1;
        assert!(turns < 100_000, "free game never finished");
    }

    let free = player.free.free.unwrap();
    assert_eq!(free.last_nums, 0);
    assert!(free.cur_nums >= 10);
    assert!(player.free.cascading.is_end);
}

#[test]
fn test_scatter_trigger_scenario() {
    let config = museum();
    let logic = GameLogic::new(Arc::clone(&config));
    let module = logic.module(GameModType::BaseGame);
    let user = UserInfo::new(1);
    let mut state = SessionState::new(1);

    let mut ctrl = GameCtrl::spin(1, 100, 20, 1);
    module.review_game_ctrl(&mut ctrl, &state).unwrap();
    module.on_spin_start(&ctrl, &mut state);

    // Three scatters, nothing else pays
    let grid = SymbolGrid::from_rows([
        [1, 6, 3, 7, 4],
        [8, 4, 1, 5, 10],
        [5, 10, 2, 8, 1],
    ]);
    let result = module
        .count_spin_result(&user, &ctrl, &state, &RandomResult::from_grid(grid))
        .unwrap();

    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].kind, GameResultKind::Scatter);
    assert_eq!(result.fg_nums, config.fg_nums);
    assert_eq!(result.win, 0);
    assert_eq!(result.real_win, 0);
}

#[test]
fn test_base_scatter_starts_free_game() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(3));
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let mut started = false;
    for _ in 0..20_000 {
        let outcome = logic.spin(&mut player, 10, &mut rng).unwrap();
        if outcome.free_game_started {
            started = true;
            break;
        }
    }
    assert!(started, "no scatter trigger in 20000 base turns");

    assert_eq!(logic.current_mod(&player), GameModType::FreeGame);
    assert_eq!(player.pending_free_nums, 0);
    let free = player.free.free.unwrap();
    assert!(free.last_nums >= 8);
    assert_eq!(free.cur_bet, player.base.cascading.cur_bet);
    assert_eq!(player.free.ctrl_id.game_mod, GameModType::FreeGame);
    assert!(player.free.ctrl_id.parent_id > 0);

    // Free spins are not charged
    let bet_before = player.stats.total_bet;
    let outcome = logic.spin(&mut player, 10, &mut rng).unwrap();
    assert_eq!(outcome.game_mod, GameModType::FreeGame);
    assert_eq!(outcome.ctrl.spin_ctrl().real_bet, 0);
    assert_eq!(player.stats.total_bet, bet_before);
}

#[test]
fn test_zero_free_spins_rejected() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(1));
    let before = player.clone();

    let err = logic
        .start_free_game(&mut player, &start_request(0, 100))
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidStartFreeGameNums(0)));
    assert_eq!(err.code(), "INVALID_START_FREEGAME_NUMS");
    assert_eq!(player, before);
}

#[test]
fn test_migration_is_idempotent() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(1));
    logic
        .start_free_game(&mut player, &start_request(4, 5))
        .unwrap();
    player.free.ver = 0;

    logic.user_come_in(&mut player).unwrap();
    assert_eq!(player.free.ver, FREE_GAME_VERSION);
    assert!(player.free.cascading.is_end);
    let migrated = player.free.clone();

    logic.user_come_in(&mut player).unwrap();
    assert_eq!(player.free, migrated);
}

#[test]
fn test_session_state_survives_persistence() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(1));
    logic
        .start_free_game(&mut player, &start_request(6, 5))
        .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for _ in 0..3 {
        logic.spin(&mut player, 0, &mut rng).unwrap();

        // Round-trip the free game state the way a server stores it
        let json = player.free.to_json().unwrap();
        player.free = SessionState::from_json(&json).unwrap();
        logic.user_come_in(&mut player).unwrap();
    }

    let module = logic.module(GameModType::FreeGame);
    assert!(module.is_in(&player.free));
}

#[test]
fn test_inconsistent_state_rejected() {
    let logic = GameLogic::new(museum());
    let mut player = PlayerState::new(UserInfo::new(1));
    logic
        .start_free_game(&mut player, &start_request(2, 5))
        .unwrap();

    // Mid-cascade with the carried grid lost
    player.free.cascading.is_end = false;
    let err = logic.user_come_in(&mut player).unwrap_err();
    assert_eq!(err.code(), "INVALID_CASCADING_FREESTATE");

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(logic.spin(&mut player, 0, &mut rng).is_err());
}

#[test]
fn test_seeded_rounds_are_reproducible() {
    let logic = GameLogic::new(museum());

    let mut a = ChaCha8Rng::seed_from_u64(31);
    let mut b = ChaCha8Rng::seed_from_u64(31);
    let (round_a, _) = logic.play_free_game(UserInfo::new(1), 8, 10, &mut a).unwrap();
    let (round_b, _) = logic.play_free_game(UserInfo::new(1), 8, 10, &mut b).unwrap();

    assert_eq!(round_a, round_b);
}
