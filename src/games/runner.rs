//! Effect runner for the round state machine
//!
//! Owns one player's session and round. Feeds events to [`transition`],
//! performs the requested gateway writes and timers, and keeps the round
//! history. Dropping a future returned by this type cancels its timers.

use crate::errors::{GameError, NexuzResult};
use crate::gateway::BalanceGateway;
use crate::games::draws::{DrawSource, SeededDraws};
use crate::games::machine::{
    transition, Effect, GameRules, RoundEvent, RoundState, Transition, MIN_CRASH_TICK,
};
use crate::games::outcomes::{draw_outcome, wheel_spin_angle};
use crate::games::settlement::Settler;
use crate::games::types::{GameOutcome, Round, RoundPhase, RoundRecord, Wager};
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Rounds kept for the "last results" strip
const HISTORY_LIMIT: usize = 50;

pub struct RoundRunner<G: BalanceGateway + ?Sized> {
    gateway: Arc<G>,
    session: Session,
    rules: GameRules,
    draws: Box<dyn DrawSource>,
    state: RoundState,
    round_id: Option<Uuid>,
    pending_reveal: Option<Duration>,
    ticker: Option<Duration>,
    crash_elapsed: Duration,
    history: Vec<RoundRecord>,
}

impl<G: BalanceGateway + ?Sized> RoundRunner<G> {
    pub fn new(gateway: Arc<G>, session: Session, rules: GameRules) -> Self {
        Self {
            gateway,
            session,
            rules,
            draws: Box::new(SeededDraws::from_entropy()),
            state: RoundState::Idle,
            round_id: None,
            pending_reveal: None,
            ticker: None,
            crash_elapsed: Duration::ZERO,
            history: Vec::new(),
        }
    }

    /// Replace the random source, e.g. with a seeded one for replays
    pub fn with_draws(mut self, draws: impl DrawSource + 'static) -> Self {
        self.draws = Box::new(draws);
        self
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase()
    }

    pub fn round(&self) -> Option<&Round> {
        self.state.round()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Finished rounds, oldest first
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn last_record(&self) -> Option<&RoundRecord> {
        self.history.last()
    }

    /// Commit a bet. Wheel, dice and slots start immediately; crash waits
    /// for [`RoundRunner::start`].
    pub async fn place_bet(&mut self, wager: Wager, bet: u64) -> NexuzResult<()> {
        let event = RoundEvent::PlaceBet {
            wager,
            bet,
            balance: self.session.balance(),
            authenticated: self.session.is_authenticated(),
        };
        if let Err(e) = self.apply(event).await {
            warn!(game = %wager.game(), bet, error = %e, "bet rejected");
            return Err(e);
        }

        self.round_id = Some(Uuid::new_v4());
        info!(
            game = %wager.game(),
            bet,
            balance = self.session.balance(),
            "bet committed"
        );

        if wager.game().starts_on_commit() {
            self.start().await?;
        }
        Ok(())
    }

    /// Draw the outcome and begin resolving the committed round
    pub async fn start(&mut self) -> NexuzResult<()> {
        let wager = match &self.state {
            RoundState::Committed(round) => round.wager,
            other => {
                return Err(GameError::InvalidTransition {
                    state: other.phase().as_str(),
                    event: "start",
                }
                .into())
            }
        };
        let outcome = draw_outcome(&wager, self.draws.as_mut());
        debug!(game = %wager.game(), outcome = %outcome.label(), "outcome drawn");

        self.crash_elapsed = Duration::ZERO;
        self.apply(RoundEvent::Start { outcome }).await
    }

    /// Wait out the reveal delay and resolve. Calling it again once the round
    /// is resolved returns the same round without crediting twice.
    pub async fn reveal(&mut self) -> NexuzResult<&Round> {
        // Kept until the sleep completes; an interrupted reveal waits again.
        if let Some(after) = self.pending_reveal {
            tokio::time::sleep(after).await;
            self.pending_reveal = None;
        }
        self.apply(RoundEvent::RevealElapsed).await?;
        self.resolved_round()
    }

    /// Advance the crash clock by one tick
    pub async fn tick(&mut self) -> NexuzResult<()> {
        let every = self.tick_period();
        self.crash_elapsed += every;
        self.apply(RoundEvent::Tick {
            elapsed: self.crash_elapsed,
        })
        .await
    }

    /// Cash out at the current crash multiplier
    pub async fn cash_out(&mut self) -> NexuzResult<()> {
        self.apply(RoundEvent::CashOut {
            elapsed: self.crash_elapsed,
        })
        .await
    }

    /// Drive a crash round until it crashes or the player cashes out.
    ///
    /// `cash_out` fires a manual cash-out; `auto_cash_out` cashes out once
    /// the multiplier reaches the target. Starts the round if only committed.
    pub async fn run_crash(
        &mut self,
        cash_out: Option<oneshot::Receiver<()>>,
        auto_cash_out: Option<f64>,
    ) -> NexuzResult<&Round> {
        if self.phase() == RoundPhase::Committed {
            self.start().await?;
        }

        let mut cash_out = cash_out;
        let mut interval = tokio::time::interval(self.tick_period());
        // First tick completes immediately and marks t = 0.
        interval.tick().await;

        while self.phase() == RoundPhase::Resolving && self.ticker.is_some() {
            tokio::select! {
                biased;
                signal = async {
                    match cash_out.as_mut() {
                        Some(rx) => rx.await,
                        None => std::future::pending().await,
                    }
                } => {
                    cash_out = None;
                    if signal.is_ok() {
                        self.cash_out().await?;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await?;
                    let multiplier = self.round().map(|r| r.multiplier).unwrap_or(1.0);
                    debug!(multiplier, elapsed_ms = self.crash_elapsed.as_millis() as u64, "crash tick");
                    if let Some(target) = auto_cash_out {
                        if self.phase() == RoundPhase::Resolving && multiplier >= target {
                            self.cash_out().await?;
                        }
                    }
                }
            }
        }

        self.resolved_round()
    }

    /// Back to Idle for a new round
    pub async fn reset(&mut self) -> NexuzResult<()> {
        self.apply(RoundEvent::Reset).await
    }

    /// Leave mid-round. Timers stop and any debited bet is forfeit.
    pub async fn abandon(&mut self) -> NexuzResult<()> {
        if let Some(round) = self.state.round() {
            if matches!(self.phase(), RoundPhase::Committed | RoundPhase::Resolving) {
                warn!(game = %round.game(), bet = round.bet, "round abandoned; bet forfeited");
            }
        }
        self.apply(RoundEvent::Abandon).await
    }

    /// Try again to pay out a credit that failed
    pub async fn retry_credit(&mut self) -> NexuzResult<u64> {
        let amount = match &self.state {
            RoundState::Resolved(round) => round.credit.outstanding(),
            _ => None,
        };
        match amount {
            Some(amount) => {
                self.settle_credit(amount).await?;
                Ok(amount)
            }
            None => Ok(0),
        }
    }

    /// Commit, resolve and return the finished round's record.
    /// Crash rounds run with no cash-out and therefore always lose.
    pub async fn play(&mut self, wager: Wager, bet: u64) -> NexuzResult<RoundRecord> {
        match wager {
            Wager::Crash => self.play_crash(bet, None).await,
            _ => {
                self.place_bet(wager, bet).await?;
                self.reveal().await?;
                self.finished_record()
            }
        }
    }

    /// Commit and run a crash round, cashing out at `auto_cash_out` if given
    pub async fn play_crash(&mut self, bet: u64, auto_cash_out: Option<f64>) -> NexuzResult<RoundRecord> {
        self.place_bet(Wager::Crash, bet).await?;
        self.start().await?;
        self.run_crash(None, auto_cash_out).await?;
        self.finished_record()
    }

    async fn apply(&mut self, event: RoundEvent) -> NexuzResult<()> {
        let Transition { next, effects } = transition(&self.state, event, &self.rules)?;

        // The debit must land before the machine leaves Idle.
        for effect in &effects {
            if let Effect::Debit { amount } = effect {
                let account = self.session.require_account()?.clone();
                let balance = Settler::new(self.gateway.as_ref(), &self.rules.credit_policy)
                    .debit(&account, *amount)
                    .await?;
                self.session.set_balance(balance);
            }
        }

        let was_resolved = self.phase() == RoundPhase::Resolved;
        self.state = next;

        let mut credit_error = None;
        for effect in effects {
            match effect {
                Effect::Debit { .. } => {}
                Effect::ScheduleReveal { after } => self.pending_reveal = Some(after),
                Effect::StartTicker { every } => self.ticker = Some(every),
                Effect::StopTicker => self.ticker = None,
                Effect::Credit { amount } => {
                    if let Err(e) = self.settle_credit(amount).await {
                        credit_error = Some(e);
                    }
                }
            }
        }

        match self.phase() {
            RoundPhase::Resolved if !was_resolved => self.record_round(),
            RoundPhase::Idle => {
                self.round_id = None;
                self.pending_reveal = None;
                self.ticker = None;
            }
            _ => {}
        }

        match credit_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    async fn settle_credit(&mut self, amount: u64) -> Result<(), GameError> {
        let account = self.session.require_account()?.clone();
        let result = Settler::new(self.gateway.as_ref(), &self.rules.credit_policy)
            .credit(&account, amount)
            .await;

        let event = match &result {
            Ok(balance) => {
                self.session.set_balance(*balance);
                RoundEvent::CreditApplied
            }
            Err(e) => RoundEvent::CreditFailed {
                reason: e.to_string(),
            },
        };
        // Credit bookkeeping transitions carry no effects.
        self.state = transition(&self.state, event, &self.rules)?.next;
        if let (Some(record), Some(round)) = (self.history.last_mut(), self.state.round()) {
            if Some(record.round_id) == self.round_id {
                record.credit = round.credit.clone();
            }
        }

        result.map(|_| ())
    }

    fn record_round(&mut self) {
        let (Some(round), Some(account)) = (self.state.round(), self.session.account_id()) else {
            return;
        };
        let Some(outcome) = round.outcome else {
            return;
        };
        let record = RoundRecord {
            round_id: self.round_id.unwrap_or_else(Uuid::new_v4),
            account_id: account.clone(),
            game: round.game(),
            wager: round.wager,
            bet: round.bet,
            outcome,
            payout: round.payout.unwrap_or(0),
            credit: round.credit.clone(),
            spin_angle: match outcome {
                GameOutcome::Wheel { segment } => {
                    Some(wheel_spin_angle(segment, self.rules.wheel_full_turns))
                }
                _ => None,
            },
            finished_at: chrono::Utc::now(),
        };
        info!(
            game = %record.game,
            bet = record.bet,
            payout = record.payout,
            outcome = %record.outcome.label(),
            "round resolved"
        );
        self.round_id = Some(record.round_id);
        self.history.push(record);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
    }

    fn tick_period(&self) -> Duration {
        self.ticker
            .unwrap_or(self.rules.crash_tick)
            .max(MIN_CRASH_TICK)
    }

    fn resolved_round(&self) -> NexuzResult<&Round> {
        match &self.state {
            RoundState::Resolved(round) => Ok(round),
            other => Err(GameError::InvalidTransition {
                state: other.phase().as_str(),
                event: "reveal",
            }
            .into()),
        }
    }

    fn finished_record(&self) -> NexuzResult<RoundRecord> {
        self.resolved_round()?;
        self.last_record().cloned().ok_or_else(|| {
            GameError::InvalidTransition {
                state: "resolved",
                event: "record",
            }
            .into()
        })
    }
}
