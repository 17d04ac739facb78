//! Nexuz command line
//!
//! Play single rounds against an in-memory balance, run seeded simulations,
//! or write a sample configuration file.

use clap::{Parser, Subcommand};
use nexuz::config::{generate_sample_config, ConfigLoader, NexuzConfig};
use nexuz::games::simulation::{format_report, run_simulation, SimulationScenario};
use nexuz::games::{DiceCall, DicePrediction, GameKind, GameRules, RoundRunner, SeededDraws, Wager};
use nexuz::hub::hub_summary;
use nexuz::{parse_bet, InMemoryGateway, Session};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nexuz")]
#[command(about = "Epic RNG World game core", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one round against an in-memory balance
    Play {
        game: GameKind,

        /// Bet amount; the wheel always costs its configured spin price
        #[arg(long, default_value = "100")]
        bet: String,

        /// Dice call: over, under or exact
        #[arg(long, default_value = "over")]
        prediction: DicePrediction,

        /// Dice target total (2-12)
        #[arg(long, default_value = "7")]
        target: u8,

        /// Crash: cash out automatically at this multiplier
        #[arg(long)]
        cash_out_at: Option<f64>,

        /// Starting balance of the demo account
        #[arg(long, default_value = "1000")]
        balance: u64,

        /// Seed for a reproducible round
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run many seeded rounds and report the return to player
    Simulate {
        game: GameKind,

        #[arg(long, default_value = "10000")]
        rounds: usize,

        #[arg(long, default_value = "100")]
        bet: u64,

        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "over")]
        prediction: DicePrediction,

        #[arg(long, default_value = "7")]
        target: u8,

        #[arg(long)]
        cash_out_at: Option<f64>,
    },
    /// Write the default configuration to a file
    SampleConfig {
        #[arg(default_value = "nexuz.toml")]
        path: String,
    },
}

fn wager_for(game: GameKind, prediction: DicePrediction, target: u8) -> Wager {
    match game {
        GameKind::Wheel => Wager::Wheel,
        GameKind::Dice => Wager::Dice(DiceCall { prediction, target }),
        GameKind::Slots => Wager::Slots,
        GameKind::Crash => Wager::Crash,
    }
}

fn init_tracing(config: &NexuzConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let config = loader.load()?;
    init_tracing(&config);

    match args.command {
        Command::Play {
            game,
            bet,
            prediction,
            target,
            cash_out_at,
            balance,
            seed,
        } => {
            let bet = match game {
                GameKind::Wheel => config.games.wheel.spin_cost,
                _ => parse_bet(&bet)?,
            };
            let gateway = Arc::new(
                InMemoryGateway::new()
                    .with_account("demo", balance)
                    .with_jackpot(250_000),
            );
            let session = Session::sign_in(gateway.as_ref(), "demo").await?;

            let summary = hub_summary(&config, &session, gateway.as_ref()).await?;
            info!(jackpot = summary.jackpot, balance = ?summary.balance, "hub loaded");

            let draws = match seed {
                Some(seed) => SeededDraws::new(seed),
                None => SeededDraws::from_entropy(),
            };
            let mut runner = RoundRunner::new(gateway.clone(), session, GameRules::from_config(&config))
                .with_draws(draws);

            let record = match game {
                GameKind::Crash => runner.play_crash(bet, cash_out_at).await?,
                _ => runner.play(wager_for(game, prediction, target), bet).await?,
            };

            println!("{} round", record.game);
            println!("   Bet:     {}", record.bet);
            println!("   Outcome: {}", record.outcome.label());
            if let Some(angle) = record.spin_angle {
                println!("   Spin:    {:.1} deg", angle);
            }
            println!("   Payout:  {}", record.payout);
            println!("   Net:     {:+}", record.net());
            println!("   Balance: {}", runner.session().balance());
        }
        Command::Simulate {
            game,
            rounds,
            bet,
            seed,
            prediction,
            target,
            cash_out_at,
        } => {
            let mut scenario = SimulationScenario::new(wager_for(game, prediction, target), rounds, bet, seed);
            if let Some(target) = cash_out_at {
                scenario = scenario.with_crash_cash_out(target);
            }
            print!("{}", format_report(&run_simulation(&scenario)));
        }
        Command::SampleConfig { path } => {
            generate_sample_config(&path)?;
            println!("Wrote default configuration to {}", path);
        }
    }

    Ok(())
}
