//! Simulation report

use anyhow::Result;
use serde::Serialize;

use rf_cascade::{FreeGameRound, GameConfig, Money, SessionStats};

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimReport {
    pub game: String,
    pub mode: &'static str,
    pub rounds: u64,
    pub spins: u64,
    pub turns: u64,
    pub total_bet: Money,
    pub total_win: Money,
    pub rtp: f64,
    pub hit_rate: f64,
    pub free_games_triggered: u64,
    pub longest_cascade: u32,
    pub max_round_win: Money,
    wins: u64,
}

impl SimReport {
    pub fn new(mode: &'static str, config: &GameConfig) -> Self {
        Self {
            game: config.name.clone(),
            mode,
            ..Default::default()
        }
    }

    /// Fold in one free game; `notional_bet` is what the spins would have cost
    pub fn add_free_round(&mut self, round: &FreeGameRound, stats: &SessionStats, notional_bet: Money) {
        self.rounds += 1;
        self.spins += round.spins as u64;
        self.turns += round.turns as u64;
        self.total_bet += notional_bet;
        self.total_win += round.total_win;
        self.free_games_triggered += stats.free_games_triggered;
        self.longest_cascade = self.longest_cascade.max(round.longest_cascade);
        self.max_round_win = self.max_round_win.max(round.total_win);
        self.wins += stats.wins;
        self.update_ratios();
    }

    /// Take the totals of one long base-game session
    pub fn add_session(&mut self, stats: &SessionStats) {
        self.rounds += 1;
        self.spins += stats.total_spins;
        self.turns += stats.total_turns;
        self.total_bet += stats.total_bet;
        self.total_win += stats.total_win;
        self.free_games_triggered += stats.free_games_triggered;
        self.longest_cascade = self.longest_cascade.max(stats.longest_cascade);
        self.max_round_win = self.max_round_win.max(stats.max_win);
        self.wins += stats.wins;
        self.update_ratios();
    }

    pub fn rtp(&self) -> f64 {
        self.rtp
    }

    fn update_ratios(&mut self) {
        self.rtp = if self.total_bet > 0 {
            self.total_win as f64 / self.total_bet as f64 * 100.0
        } else {
            0.0
        };
        self.hit_rate = if self.spins > 0 {
            self.wins as f64 / self.spins as f64 * 100.0
        } else {
            0.0
        };
    }

    pub fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_round_totals() {
        let config = GameConfig::museum();
        let mut report = SimReport::new("free", &config);
        let round = FreeGameRound {
            spins: 9,
            turns: 14,
            total_win: 3000,
            longest_cascade: 4,
        };
        let stats = SessionStats {
            wins: 3,
            free_games_triggered: 1,
            ..Default::default()
        };

        report.add_free_round(&round, &stats, 1600);
        report.add_free_round(&FreeGameRound { total_win: 200, ..round }, &stats, 1600);

        assert_eq!(report.rounds, 2);
        assert_eq!(report.spins, 18);
        assert_eq!(report.total_win, 3200);
        assert_eq!(report.rtp(), 100.0);
        assert_eq!(report.max_round_win, 3000);
        assert_eq!(report.free_games_triggered, 2);
    }
}
