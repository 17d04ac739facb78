//! Game Simulation
//!
//! Plays many seeded rounds straight through the outcome generators and the
//! payout calculator, without a gateway or timers, and reports the return to
//! the player.

use crate::games::draws::{DrawSource, SeededDraws};
use crate::games::outcomes::draw_outcome;
use crate::games::payout::calculate_payout;
use crate::games::types::{GameKind, GameOutcome, Wager};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Parameters for a batch of simulated rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationScenario {
    pub wager: Wager,
    pub rounds: usize,
    pub bet: u64,
    pub seed: u64,
    /// Crash only: cash out as soon as the multiplier reaches this value
    pub crash_cash_out: Option<f64>,
}

impl SimulationScenario {
    pub fn new(wager: Wager, rounds: usize, bet: u64, seed: u64) -> Self {
        Self {
            wager,
            rounds,
            bet,
            seed,
            crash_cash_out: None,
        }
    }

    pub fn with_crash_cash_out(mut self, target: f64) -> Self {
        self.crash_cash_out = Some(target);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub game: GameKind,
    pub rounds: usize,
    pub wins: usize,
    pub total_wagered: u64,
    pub total_paid: u64,
    /// Paid divided by wagered
    pub return_to_player: f64,
    pub win_rate: f64,
    pub histogram: BTreeMap<String, usize>,
    pub execution_time: Duration,
}

impl SimulationReport {
    pub fn house_edge(&self) -> f64 {
        1.0 - self.return_to_player
    }
}

pub fn run_simulation(scenario: &SimulationScenario) -> SimulationReport {
    let mut draws = SeededDraws::new(scenario.seed);
    simulate_with(scenario, &mut draws)
}

/// Same as [`run_simulation`] with a caller-provided draw source
pub fn simulate_with(scenario: &SimulationScenario, draws: &mut dyn DrawSource) -> SimulationReport {
    let start_time = Instant::now();
    let mut wins = 0;
    let mut total_wagered: u64 = 0;
    let mut total_paid: u64 = 0;
    let mut histogram = BTreeMap::new();

    for _ in 0..scenario.rounds {
        let outcome = settle_crash(draw_outcome(&scenario.wager, draws), scenario.crash_cash_out);
        let payout = calculate_payout(&scenario.wager, scenario.bet, &outcome);

        total_wagered = total_wagered.saturating_add(scenario.bet);
        total_paid = total_paid.saturating_add(payout);
        if payout > 0 {
            wins += 1;
        }
        *histogram.entry(histogram_key(&outcome)).or_insert(0) += 1;
    }

    let return_to_player = if total_wagered > 0 {
        total_paid as f64 / total_wagered as f64
    } else {
        0.0
    };
    let win_rate = if scenario.rounds > 0 {
        wins as f64 / scenario.rounds as f64
    } else {
        0.0
    };

    SimulationReport {
        game: scenario.wager.game(),
        rounds: scenario.rounds,
        wins,
        total_wagered,
        total_paid,
        return_to_player,
        win_rate,
        histogram,
        execution_time: start_time.elapsed(),
    }
}

fn settle_crash(outcome: GameOutcome, cash_out: Option<f64>) -> GameOutcome {
    match (outcome, cash_out) {
        (GameOutcome::Crash { crash_point, .. }, Some(target)) if target < crash_point => {
            GameOutcome::Crash {
                crash_point,
                cashed_out_at: Some(target),
            }
        }
        (other, _) => other,
    }
}

fn histogram_key(outcome: &GameOutcome) -> String {
    match outcome {
        GameOutcome::Dice { d1, d2 } => format!("total {:>2}", d1 + d2),
        GameOutcome::Crash {
            cashed_out_at: Some(_),
            ..
        } => "cashed out".to_string(),
        GameOutcome::Crash { crash_point, .. } => format!("crashed below {:.0}x", crash_point.ceil()),
        other => other.label(),
    }
}

/// Plain-text rendering for the CLI
pub fn format_report(report: &SimulationReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Simulation results for {}\n", report.game));
    out.push_str(&format!("{}\n", "=".repeat(40)));
    out.push_str(&format!("Rounds:           {}\n", report.rounds));
    out.push_str(&format!("Wins:             {} ({:.1}%)\n", report.wins, report.win_rate * 100.0));
    out.push_str(&format!("Wagered / paid:   {} / {}\n", report.total_wagered, report.total_paid));
    out.push_str(&format!("Return to player: {:.2}%\n", report.return_to_player * 100.0));
    out.push_str(&format!("Elapsed:          {:?}\n", report.execution_time));

    if !report.histogram.is_empty() {
        out.push_str("\nOutcomes:\n");
        for (label, count) in &report.histogram {
            let share = *count as f64 / report.rounds.max(1) as f64 * 100.0;
            out.push_str(&format!("   {:<28} {:>8} ({:.1}%)\n", label, count, share));
        }
    }

    out
}
