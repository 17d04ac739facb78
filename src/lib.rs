//! Nexuz - Epic RNG World game core
//!
//! Round state machine, outcome generators and payout rules for the wheel,
//! dice, slots and crash mini-games, settled against an external balance
//! store.

pub mod config;
pub mod errors;
pub mod games;
pub mod gateway;
pub mod hub;
pub mod session;

pub use config::{ConfigBuilder, ConfigLoader, NexuzConfig};
pub use errors::{GameError, GatewayError, NexuzError, NexuzResult};
pub use games::{GameKind, GameOutcome, GameRules, RoundRunner, Wager};
pub use gateway::{BalanceGateway, InMemoryGateway, JackpotSource};
pub use session::{parse_bet, Session};
