pub mod draws;
pub mod machine;
pub mod outcomes;
pub mod payout;
pub mod runner;
pub mod settlement;
pub mod simulation;
pub mod types;

pub use draws::{DrawSource, FixedDraws, SeededDraws};
pub use machine::{transition, Effect, GameRules, RoundEvent, RoundState, Transition};
pub use runner::RoundRunner;
pub use settlement::CreditFailurePolicy;
pub use types::*;
