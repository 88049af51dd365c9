//! Cascade Simulator
//!
//! Usage:
//!   cascade-sim free --rounds 10000 --free-spins 8 --bet 10   - Play free games
//!   cascade-sim base --spins 100000 --bet 10                  - Play base spins
//!   cascade-sim export-config museum.json                     - Write the built-in config

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rf_cascade::{GameConfig, GameLogic, GameModType, PlayerState, UserInfo};

use report::SimReport;

#[derive(Parser)]
#[command(name = "cascade-sim", about = "Cascading slot RTP simulator")]
struct Cli {
    /// Game config (.json, .yaml or .yml); built-in Museum config when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RTP config name
    #[arg(long, global = true, default_value = "")]
    rtp: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play complete free games
    Free {
        /// Free games to play
        #[arg(short, long, default_value_t = 10_000)]
        rounds: u64,
        /// Free spins awarded per round
        #[arg(short, long, default_value_t = 8)]
        free_spins: u32,
        /// Bet per line
        #[arg(short, long, default_value_t = 10)]
        bet: i64,
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Play base-game spins, entering free games as they trigger
    Base {
        /// Paid spins to play
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        /// Bet per line
        #[arg(short, long, default_value_t = 10)]
        bet: i64,
        /// RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Write the active config as JSON
    ExportConfig {
        /// Output file; stdout when omitted
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Arc::new(load_config(cli.config.as_deref())?);
    let user = UserInfo::new(1).with_config(cli.rtp);

    match cli.command {
        Commands::Free {
            rounds,
            free_spins,
            bet,
            seed,
        } => run_free(config, user, rounds, free_spins, bet, seed),
        Commands::Base { spins, bet, seed } => run_base(config, user, spins, bet, seed),
        Commands::ExportConfig { output } => export_config(&config, output.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => {
            let config = GameConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            log::info!("Loaded config '{}' from {}", config.name, path.display());
            Ok(config)
        }
        None => Ok(GameConfig::museum()),
    }
}

fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    }
}

fn run_free(
    config: Arc<GameConfig>,
    user: UserInfo,
    rounds: u64,
    free_spins: u32,
    bet: i64,
    seed: Option<u64>,
) -> Result<()> {
    if rounds == 0 {
        bail!("--rounds must be positive");
    }

    let logic = GameLogic::new(Arc::clone(&config));
    let mut rng = make_rng(seed);
    let mut report = SimReport::new("free", &config);
    let progress_step = (rounds / 10).max(1);

    for n in 0..rounds {
        let (round, player) = logic
            .play_free_game(user.clone(), free_spins, bet, &mut rng)
            .with_context(|| format!("Free game {} failed", n))?;
        report.add_free_round(&round, &player.stats, bet * config.lines as i64 * free_spins as i64);

        if (n + 1) % progress_step == 0 {
            log::info!("{}/{} rounds, RTP {:.2}%", n + 1, rounds, report.rtp());
        }
    }

    report.print()
}

fn run_base(
    config: Arc<GameConfig>,
    user: UserInfo,
    spins: u64,
    bet: i64,
    seed: Option<u64>,
) -> Result<()> {
    if spins == 0 {
        bail!("--spins must be positive");
    }

    let logic = GameLogic::new(Arc::clone(&config));
    let mut rng = make_rng(seed);
    let mut player = PlayerState::new(user);
    let progress_step = (spins / 10).max(1);
    let mut paid = 0;

    // Keep playing until the last paid spin's cascades and free games are done
    while paid < spins || logic.current_mod(&player) == GameModType::FreeGame
        || !player.base.cascading.is_end
    {
        let outcome = logic.spin(&mut player, bet, &mut rng)?;
        if outcome.ctrl.spin_ctrl().real_bet > 0 {
            paid += 1;
            if paid % progress_step == 0 {
                log::info!("{}/{} spins, RTP {:.2}%", paid, spins, player.stats.rtp());
            }
        }
    }

    let mut report = SimReport::new("base", &config);
    report.add_session(&player.stats);
    report.print()
}

fn export_config(config: &GameConfig, output: Option<&Path>) -> Result<()> {
    let json = config.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
