//! Commit invariants over arbitrary balances and bets

use nexuz::config::ConfigBuilder;
use nexuz::games::{DiceCall, DicePrediction, RoundPhase};
use nexuz::{GameError, GameRules, InMemoryGateway, NexuzError, RoundRunner, Session, Wager};
use proptest::prelude::*;
use std::sync::Arc;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn runner(balance: u64) -> (Arc<InMemoryGateway>, RoundRunner<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::new().with_account("kai", balance));
    let rules = GameRules::from_config(&ConfigBuilder::new().instant_reveals().build());
    let runner = RoundRunner::new(gateway.clone(), Session::authenticated("kai", balance), rules);
    (gateway, runner)
}

/// Wagers that resolve without the crash clock
fn arb_revealed_wager() -> impl Strategy<Value = Wager> {
    prop_oneof![
        Just(Wager::Wheel),
        Just(Wager::Slots),
        (
            prop_oneof![
                Just(DicePrediction::Over),
                Just(DicePrediction::Under),
                Just(DicePrediction::Exact)
            ],
            2u8..=12
        )
            .prop_map(|(prediction, target)| Wager::Dice(DiceCall { prediction, target })),
    ]
}

fn arb_wager() -> impl Strategy<Value = Wager> {
    prop_oneof![Just(Wager::Crash), arb_revealed_wager()]
}

/// A balance and a bet with `0 < bet <= balance`
fn arb_affordable() -> impl Strategy<Value = (u64, u64)> {
    (1u64..=u64::MAX).prop_flat_map(|balance| (Just(balance), 1..=balance))
}

/// A balance and a bet that is zero or above the balance
fn arb_unaffordable() -> impl Strategy<Value = (u64, u64)> {
    prop_oneof![
        (0u64..=u64::MAX).prop_map(|balance| (balance, 0)),
        (0u64..u64::MAX).prop_flat_map(|balance| (Just(balance), (balance + 1)..=u64::MAX)),
    ]
}

proptest! {
    /// Property: every affordable bet commits and lowers the balance by exactly the bet.
    #[test]
    fn prop_affordable_bet_debits_exactly((balance, bet) in arb_affordable()) {
        let (gateway, mut runner) = runner(balance);
        block_on(runner.place_bet(Wager::Crash, bet)).unwrap();

        prop_assert_eq!(runner.phase(), RoundPhase::Committed);
        prop_assert_eq!(gateway.balance_of("kai"), Some(balance - bet));
        prop_assert_eq!(runner.session().balance(), balance - bet);
        prop_assert_eq!(gateway.write_count(), 1);
    }

    /// Property: a zero or unaffordable bet is refused before the gateway is touched.
    #[test]
    fn prop_refused_bet_makes_no_gateway_call(
        (balance, bet) in arb_unaffordable(),
        wager in arb_wager(),
    ) {
        let (gateway, mut runner) = runner(balance);
        let err = block_on(runner.place_bet(wager, bet)).unwrap_err();

        let expected_kind = matches!(
            err,
            NexuzError::Game(GameError::InvalidBet { .. } | GameError::InsufficientFunds { .. })
        );
        prop_assert!(expected_kind, "unexpected error {:?}", err);
        prop_assert_eq!(gateway.call_count(), 0);
        prop_assert_eq!(gateway.balance_of("kai"), Some(balance));
        prop_assert_eq!(runner.phase(), RoundPhase::Idle);
    }

    /// Property: after a full round the next commit is checked against the new balance.
    #[test]
    fn prop_second_round_rechecks_balance(
        (balance, bet) in arb_affordable(),
        wager in arb_revealed_wager(),
    ) {
        let (gateway, mut runner) = runner(balance);
        let record = block_on(runner.play(wager, bet)).unwrap();
        block_on(runner.reset()).unwrap();

        let after = (balance - bet).saturating_add(record.payout);
        prop_assert_eq!(gateway.balance_of("kai"), Some(after));

        if let Some(too_much) = after.checked_add(1) {
            prop_assert!(block_on(runner.place_bet(Wager::Slots, too_much)).is_err());
            prop_assert_eq!(runner.phase(), RoundPhase::Idle);
        }
    }
}
