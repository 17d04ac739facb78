//! Round state machine
//!
//! `transition` is pure: it takes the current state and an event and returns
//! the next state plus the effects the runner must perform. The runner only
//! adopts the next state once those effects succeed, which is what keeps a
//! failed debit in Idle.

use crate::config::NexuzConfig;
use crate::errors::GameError;
use crate::games::outcomes::crash_multiplier;
use crate::games::payout::calculate_payout;
use crate::games::settlement::CreditFailurePolicy;
use crate::games::types::{
    CreditStatus, DiceCall, GameKind, GameOutcome, Round, RoundPhase, Wager, DICE_TARGET_MAX,
    DICE_TARGET_MIN,
};
use std::time::Duration;

/// Shortest crash tick; a zero period would stall the ticker
pub const MIN_CRASH_TICK: Duration = Duration::from_millis(1);

/// Values the machine needs from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub min_bet: u64,
    pub wheel_reveal: Duration,
    pub wheel_full_turns: u32,
    pub dice_reveal: Duration,
    pub slots_reveal: Duration,
    pub crash_tick: Duration,
    pub crash_seconds_per_unit: f64,
    pub credit_policy: CreditFailurePolicy,
}

impl GameRules {
    pub fn from_config(config: &NexuzConfig) -> Self {
        let games = &config.games;
        Self {
            min_bet: games.min_bet,
            wheel_reveal: Duration::from_millis(games.wheel.reveal_ms),
            wheel_full_turns: games.wheel.full_turns,
            dice_reveal: Duration::from_millis(games.dice.reveal_ms),
            slots_reveal: Duration::from_millis(games.slots.reveal_ms),
            crash_tick: Duration::from_millis(games.crash.tick_interval_ms).max(MIN_CRASH_TICK),
            crash_seconds_per_unit: games.crash.seconds_per_unit,
            credit_policy: config.settlement.credit_failure_policy.clone(),
        }
    }

    /// Crash tick period, never below [`MIN_CRASH_TICK`]
    pub fn crash_tick_period(&self) -> Duration {
        self.crash_tick.max(MIN_CRASH_TICK)
    }

    /// Cosmetic delay before the outcome is revealed; zero for crash
    pub fn reveal_delay(&self, game: GameKind) -> Duration {
        match game {
            GameKind::Wheel => self.wheel_reveal,
            GameKind::Dice => self.dice_reveal,
            GameKind::Slots => self.slots_reveal,
            GameKind::Crash => Duration::ZERO,
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::from_config(&NexuzConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RoundState {
    #[default]
    Idle,
    Committed(Round),
    Resolving(Round),
    Resolved(Round),
}

impl RoundState {
    pub fn phase(&self) -> RoundPhase {
        match self {
            RoundState::Idle => RoundPhase::Idle,
            RoundState::Committed(_) => RoundPhase::Committed,
            RoundState::Resolving(_) => RoundPhase::Resolving,
            RoundState::Resolved(_) => RoundPhase::Resolved,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        match self {
            RoundState::Idle => None,
            RoundState::Committed(r) | RoundState::Resolving(r) | RoundState::Resolved(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    /// Player commits a bet. `balance` and `authenticated` come from the session.
    PlaceBet {
        wager: Wager,
        bet: u64,
        balance: u64,
        authenticated: bool,
    },
    /// Round begins with a pre-drawn outcome
    Start { outcome: GameOutcome },
    /// Reveal delay for wheel/dice/slots has passed
    RevealElapsed,
    /// Crash clock advanced to `elapsed` simulated time
    Tick { elapsed: Duration },
    /// Player asks to cash out at `elapsed` simulated time
    CashOut { elapsed: Duration },
    CreditApplied,
    CreditFailed { reason: String },
    /// "New round"
    Reset,
    /// Player left mid-round; the bet is forfeit
    Abandon,
}

impl RoundEvent {
    fn name(&self) -> &'static str {
        match self {
            RoundEvent::PlaceBet { .. } => "place_bet",
            RoundEvent::Start { .. } => "start",
            RoundEvent::RevealElapsed => "reveal",
            RoundEvent::Tick { .. } => "tick",
            RoundEvent::CashOut { .. } => "cash_out",
            RoundEvent::CreditApplied => "credit_applied",
            RoundEvent::CreditFailed { .. } => "credit_failed",
            RoundEvent::Reset => "reset",
            RoundEvent::Abandon => "abandon",
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Debit { amount: u64 },
    Credit { amount: u64 },
    ScheduleReveal { after: Duration },
    StartTicker { every: Duration },
    StopTicker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: RoundState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: RoundState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn with(next: RoundState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }
}

/// Check bet and wager preconditions without touching any state
pub fn validate_bet(
    wager: &Wager,
    bet: u64,
    balance: u64,
    authenticated: bool,
    rules: &GameRules,
) -> Result<(), GameError> {
    if !authenticated {
        return Err(GameError::NotAuthenticated);
    }
    if bet == 0 {
        return Err(GameError::invalid_bet("amount must be positive"));
    }
    if bet < rules.min_bet {
        return Err(GameError::invalid_bet(format!(
            "minimum bet is {}",
            rules.min_bet
        )));
    }
    if let Wager::Dice(DiceCall { target, .. }) = wager {
        if !(DICE_TARGET_MIN..=DICE_TARGET_MAX).contains(target) {
            return Err(GameError::invalid_bet(format!(
                "dice target {} outside {}..={}",
                target, DICE_TARGET_MIN, DICE_TARGET_MAX
            )));
        }
    }
    if bet > balance {
        return Err(GameError::InsufficientFunds { bet, balance });
    }
    Ok(())
}

pub fn transition(
    state: &RoundState,
    event: RoundEvent,
    rules: &GameRules,
) -> Result<Transition, GameError> {
    let rejected = |event: &RoundEvent| GameError::InvalidTransition {
        state: state.phase().as_str(),
        event: event.name(),
    };

    match (state, event) {
        (
            RoundState::Idle,
            RoundEvent::PlaceBet {
                wager,
                bet,
                balance,
                authenticated,
            },
        ) => {
            validate_bet(&wager, bet, balance, authenticated, rules)?;
            Ok(Transition::with(
                RoundState::Committed(Round::new(wager, bet)),
                vec![Effect::Debit { amount: bet }],
            ))
        }

        (RoundState::Committed(round), RoundEvent::Start { outcome }) => {
            if outcome.game() != round.game() {
                return Err(GameError::OutcomeMismatch {
                    game: round.game(),
                    outcome: outcome.game(),
                });
            }
            let mut round = round.clone();
            let outcome = match outcome {
                GameOutcome::Crash { crash_point, .. } => GameOutcome::Crash {
                    crash_point,
                    cashed_out_at: None,
                },
                other => other,
            };
            round.outcome = Some(outcome);
            let effect = match round.game() {
                GameKind::Crash => Effect::StartTicker {
                    every: rules.crash_tick_period(),
                },
                game => Effect::ScheduleReveal {
                    after: rules.reveal_delay(game),
                },
            };
            Ok(Transition::with(RoundState::Resolving(round), vec![effect]))
        }

        (RoundState::Resolving(round), RoundEvent::RevealElapsed)
            if round.game() != GameKind::Crash =>
        {
            let mut round = round.clone();
            let effects = settle(&mut round);
            Ok(Transition::with(RoundState::Resolved(round), effects))
        }

        (RoundState::Resolving(round), RoundEvent::Tick { elapsed })
            if round.game() == GameKind::Crash =>
        {
            let mut round = round.clone();
            let crash_point = crash_point_of(&round);
            let multiplier = crash_multiplier(elapsed, rules.crash_seconds_per_unit);
            if multiplier >= crash_point {
                round.multiplier = crash_point;
                let mut effects = vec![Effect::StopTicker];
                effects.extend(settle(&mut round));
                Ok(Transition::with(RoundState::Resolved(round), effects))
            } else {
                round.multiplier = multiplier;
                Ok(Transition::to(RoundState::Resolving(round)))
            }
        }

        (RoundState::Resolving(round), RoundEvent::CashOut { elapsed })
            if round.game() == GameKind::Crash =>
        {
            let mut round = round.clone();
            let crash_point = crash_point_of(&round);
            let multiplier = crash_multiplier(elapsed, rules.crash_seconds_per_unit);
            if multiplier >= crash_point {
                // The crash got there first.
                round.multiplier = crash_point;
            } else {
                round.multiplier = multiplier;
                round.outcome = Some(GameOutcome::Crash {
                    crash_point,
                    cashed_out_at: Some(multiplier),
                });
            }
            let mut effects = vec![Effect::StopTicker];
            effects.extend(settle(&mut round));
            Ok(Transition::with(RoundState::Resolved(round), effects))
        }

        // Payout is fixed once resolved; late reveals, ticks and cash-outs do nothing.
        (
            RoundState::Resolved(_),
            RoundEvent::RevealElapsed | RoundEvent::Tick { .. } | RoundEvent::CashOut { .. },
        ) => Ok(Transition::to(state.clone())),

        (RoundState::Resolved(round), RoundEvent::CreditApplied) => {
            let mut round = round.clone();
            if let Some(amount) = round.credit.outstanding() {
                round.credit = CreditStatus::Applied { amount };
            }
            Ok(Transition::to(RoundState::Resolved(round)))
        }

        (RoundState::Resolved(round), RoundEvent::CreditFailed { reason }) => {
            let mut round = round.clone();
            if let Some(amount) = round.credit.outstanding() {
                round.credit = CreditStatus::Failed { amount, reason };
            }
            Ok(Transition::to(RoundState::Resolved(round)))
        }

        (RoundState::Resolved(round), RoundEvent::Reset) => {
            match round.credit.outstanding() {
                Some(amount) if rules.credit_policy.blocks_new_round() => {
                    Err(GameError::CreditOutstanding { amount })
                }
                _ => Ok(Transition::to(RoundState::Idle)),
            }
        }

        (RoundState::Idle, RoundEvent::Reset | RoundEvent::Abandon) => {
            Ok(Transition::to(RoundState::Idle))
        }

        (RoundState::Committed(_), RoundEvent::Abandon) => Ok(Transition::to(RoundState::Idle)),

        (RoundState::Resolving(round), RoundEvent::Abandon) => {
            let effects = if round.game() == GameKind::Crash {
                vec![Effect::StopTicker]
            } else {
                Vec::new()
            };
            Ok(Transition::with(RoundState::Idle, effects))
        }

        (RoundState::Resolved(_), RoundEvent::Abandon) => transition(state, RoundEvent::Reset, rules),

        (_, event) => Err(rejected(&event)),
    }
}

fn crash_point_of(round: &Round) -> f64 {
    match round.outcome {
        Some(GameOutcome::Crash { crash_point, .. }) => crash_point,
        _ => 1.0,
    }
}

/// Fix the payout and queue its credit. Only reached on entry to Resolved.
fn settle(round: &mut Round) -> Vec<Effect> {
    let payout = round
        .outcome
        .as_ref()
        .map(|outcome| calculate_payout(&round.wager, round.bet, outcome))
        .unwrap_or(0);
    round.payout = Some(payout);
    round.credit = CreditStatus::due(payout);
    if payout > 0 {
        vec![Effect::Credit { amount: payout }]
    } else {
        Vec::new()
    }
}
