//! Round lifecycle tests through the public API

use nexuz::config::ConfigBuilder;
use nexuz::games::{
    CreditStatus, DiceCall, DicePrediction, FixedDraws, GameOutcome, RoundPhase, SeededDraws,
};
use nexuz::hub::hub_summary;
use nexuz::{GameError, GameRules, InMemoryGateway, NexuzError, RoundRunner, Session, Wager};
use std::sync::Arc;
use std::time::Duration;

fn instant_rules() -> GameRules {
    GameRules::from_config(&ConfigBuilder::new().instant_reveals().build())
}

async fn runner_for(
    gateway: &Arc<InMemoryGateway>,
    account: &str,
    rules: GameRules,
    draws: Vec<f64>,
) -> RoundRunner<InMemoryGateway> {
    let session = Session::sign_in(gateway.as_ref(), account).await.unwrap();
    RoundRunner::new(gateway.clone(), session, rules).with_draws(FixedDraws::new(draws))
}

#[tokio::test]
async fn test_full_cycle_returns_to_idle_and_commits_again() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 1_000));
    // wheel segment 3 (1000 coins), then dice 4 + 4
    let mut runner = runner_for(&gateway, "ivy", instant_rules(), vec![0.4, 0.5, 0.5]).await;

    assert_eq!(runner.phase(), RoundPhase::Idle);
    let record = runner.play(Wager::Wheel, 100).await.unwrap();
    assert_eq!(record.outcome, GameOutcome::Wheel { segment: 3 });
    assert_eq!(record.payout, 1_000);
    assert_eq!(runner.phase(), RoundPhase::Resolved);
    assert_eq!(gateway.balance_of("ivy"), Some(1_900));

    runner.reset().await.unwrap();
    assert_eq!(runner.phase(), RoundPhase::Idle);

    let call = DiceCall {
        prediction: DicePrediction::Over,
        target: 7,
    };
    let record = runner.play(Wager::Dice(call), 100).await.unwrap();
    assert_eq!(record.outcome, GameOutcome::Dice { d1: 4, d2: 4 });
    assert_eq!(record.payout, 200);
    assert_eq!(record.credit, CreditStatus::Applied { amount: 200 });
    assert_eq!(gateway.balance_of("ivy"), Some(2_000));
    assert_eq!(runner.session().balance(), 2_000);
    assert_eq!(runner.history().len(), 2);
}

#[tokio::test]
async fn test_commit_debits_exactly_the_bet() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 750));
    let mut runner = runner_for(&gateway, "ivy", instant_rules(), vec![0.1]).await;

    runner.place_bet(Wager::Crash, 250).await.unwrap();
    assert_eq!(runner.phase(), RoundPhase::Committed);
    assert_eq!(gateway.balance_of("ivy"), Some(500));
    assert_eq!(runner.session().balance(), 500);
}

#[tokio::test]
async fn test_precondition_failures_touch_no_balance() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 300));
    let mut runner = runner_for(&gateway, "ivy", instant_rules(), vec![0.5]).await;
    let reads_after_sign_in = gateway.call_count();

    let bad_target = Wager::Dice(DiceCall {
        prediction: DicePrediction::Exact,
        target: 13,
    });
    let cases = [(Wager::Slots, 0), (Wager::Slots, 301), (bad_target, 10)];
    for (wager, bet) in cases {
        let err = runner.place_bet(wager, bet).await.unwrap_err();
        assert!(
            matches!(
                err,
                NexuzError::Game(GameError::InvalidBet { .. } | GameError::InsufficientFunds { .. })
            ),
            "unexpected error {:?}",
            err
        );
    }

    assert_eq!(gateway.call_count(), reads_after_sign_in);
    assert_eq!(gateway.balance_of("ivy"), Some(300));
    assert_eq!(runner.phase(), RoundPhase::Idle);
}

#[tokio::test]
async fn test_reset_mid_round_is_rejected() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 300));
    let mut runner = runner_for(&gateway, "ivy", instant_rules(), vec![0.5]).await;

    runner.place_bet(Wager::Crash, 100).await.unwrap();
    let err = runner.reset().await.unwrap_err();
    assert!(matches!(err, NexuzError::Game(GameError::InvalidTransition { .. })));
    assert_eq!(runner.phase(), RoundPhase::Committed);
}

#[tokio::test(start_paused = true)]
async fn test_slots_reveal_waits_for_delay() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 1_000));
    let mut runner = runner_for(&gateway, "ivy", GameRules::default(), vec![0.55]).await;

    let started = tokio::time::Instant::now();
    runner.place_bet(Wager::Slots, 100).await.unwrap();
    assert_eq!(runner.phase(), RoundPhase::Resolving);

    let round = runner.reveal().await.unwrap();
    assert_eq!(round.payout, Some(300));
    assert!(started.elapsed() >= Duration::from_millis(2_000));
}

#[tokio::test(start_paused = true)]
async fn test_crash_auto_cash_out_under_paused_clock() {
    let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 1_000));
    // selector 0.70 -> [3.00, 5.00); position 0.5 -> 4.0
    let mut runner = runner_for(&gateway, "ivy", GameRules::default(), vec![0.70, 0.5]).await;

    let record = runner.play_crash(100, Some(2.0)).await.unwrap();
    match record.outcome {
        GameOutcome::Crash {
            crash_point,
            cashed_out_at: Some(at),
        } => {
            assert_eq!(crash_point, 4.0);
            assert!(at >= 2.0 && at < crash_point);
        }
        other => panic!("expected a cash-out, got {:?}", other),
    }
    assert_eq!(record.payout, 200);
    assert_eq!(gateway.balance_of("ivy"), Some(1_100));
}

#[tokio::test]
async fn test_seeded_runners_agree() {
    let mut payouts = Vec::new();
    for _ in 0..2 {
        let gateway = Arc::new(InMemoryGateway::new().with_account("ivy", 10_000));
        let session = Session::sign_in(gateway.as_ref(), "ivy").await.unwrap();
        let mut runner = RoundRunner::new(gateway.clone(), session, instant_rules())
            .with_draws(SeededDraws::new(2024));

        let mut run = Vec::new();
        for _ in 0..5 {
            run.push(runner.play(Wager::Slots, 10).await.unwrap().payout);
            runner.reset().await.unwrap();
        }
        payouts.push(run);
    }
    assert_eq!(payouts[0], payouts[1]);
}

#[tokio::test]
async fn test_hub_shows_jackpot_and_balance() {
    let gateway = InMemoryGateway::new()
        .with_account("ivy", 420)
        .with_jackpot(99_000);
    let config = ConfigBuilder::new().build();
    let session = Session::sign_in(&gateway, "ivy").await.unwrap();

    let summary = hub_summary(&config, &session, &gateway).await.unwrap();
    assert_eq!(summary.games.len(), 4);
    assert_eq!(summary.jackpot, 99_000);
    assert_eq!(summary.balance, Some(420));
}
