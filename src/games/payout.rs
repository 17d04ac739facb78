//! Payout calculator
//!
//! Pure and total: every reachable (wager, bet, outcome) maps to a
//! non-negative amount.

use crate::games::types::{
    DiceCall, DicePrediction, GameOutcome, SlotSymbol, Wager, WheelPrize, WHEEL_SEGMENTS,
};

/// Flat wheel reward; the spin cost does not scale it.
pub fn wheel_payout(segment: usize) -> u64 {
    match WHEEL_SEGMENTS.get(segment).map(|s| s.prize) {
        Some(WheelPrize::Coins(amount)) => amount,
        Some(WheelPrize::Bankrupt) | Some(WheelPrize::LoseAll) | None => 0,
    }
}

/// Multiplier for a dice call, zero when the call loses.
/// An over call on 6 pays double: (3, 4) over 6 returns 200 on a bet of 100.
pub fn dice_multiplier(call: DiceCall, total: u8) -> f64 {
    let target = call.target;
    match call.prediction {
        DicePrediction::Over if total > target => {
            if target <= 5 {
                1.5
            } else if target <= 8 {
                2.0
            } else {
                3.0
            }
        }
        DicePrediction::Under if total < target => {
            if target >= 8 {
                1.5
            } else if target >= 6 {
                2.0
            } else {
                3.0
            }
        }
        DicePrediction::Exact if total == target => match target {
            7 => 5.0,
            6 | 8 => 6.0,
            5 | 9 => 8.0,
            _ => 10.0,
        },
        _ => 0.0,
    }
}

pub fn dice_payout(call: DiceCall, d1: u8, d2: u8, bet: u64) -> u64 {
    scale(bet, dice_multiplier(call, d1 + d2))
}

/// Three of a kind pays triple the symbol value, a pair pays the value.
pub fn slots_payout(reels: [SlotSymbol; 3]) -> u64 {
    let [a, b, c] = reels;
    if a == b && b == c {
        a.value() * 3
    } else if a == b || a == c {
        a.value()
    } else if b == c {
        b.value()
    } else {
        0
    }
}

pub fn crash_payout(bet: u64, cashed_out_at: Option<f64>) -> u64 {
    match cashed_out_at {
        Some(multiplier) => scale(bet, multiplier),
        None => 0,
    }
}

/// Settlement for a resolved outcome. A wager/outcome mismatch pays nothing.
pub fn calculate_payout(wager: &Wager, bet: u64, outcome: &GameOutcome) -> u64 {
    match (wager, outcome) {
        (Wager::Wheel, GameOutcome::Wheel { segment }) => wheel_payout(*segment),
        (Wager::Dice(call), GameOutcome::Dice { d1, d2 }) => dice_payout(*call, *d1, *d2, bet),
        (Wager::Slots, GameOutcome::Slots { reels }) => slots_payout(*reels),
        (Wager::Crash, GameOutcome::Crash { cashed_out_at, .. }) => {
            crash_payout(bet, *cashed_out_at)
        }
        _ => 0,
    }
}

fn scale(bet: u64, multiplier: f64) -> u64 {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return 0;
    }
    // `as` saturates, so an absurd product cannot wrap.
    (bet as f64 * multiplier).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(prediction: DicePrediction, target: u8) -> DiceCall {
        DiceCall { prediction, target }
    }

    #[test]
    fn test_dice_over_win() {
        assert_eq!(dice_payout(call(DicePrediction::Over, 6), 3, 4, 100), 200);
    }

    #[test]
    fn test_dice_exact_miss() {
        assert_eq!(dice_payout(call(DicePrediction::Exact, 7), 1, 1, 100), 0);
    }

    #[test]
    fn test_dice_multiplier_table() {
        // over: total must exceed the target
        assert_eq!(dice_multiplier(call(DicePrediction::Over, 4), 5), 1.5);
        assert_eq!(dice_multiplier(call(DicePrediction::Over, 8), 9), 2.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Over, 10), 11), 3.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Over, 7), 7), 0.0);

        assert_eq!(dice_multiplier(call(DicePrediction::Under, 9), 8), 1.5);
        assert_eq!(dice_multiplier(call(DicePrediction::Under, 6), 5), 2.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Under, 4), 3), 3.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Under, 4), 4), 0.0);

        assert_eq!(dice_multiplier(call(DicePrediction::Exact, 7), 7), 5.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Exact, 8), 8), 6.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Exact, 5), 5), 8.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Exact, 12), 12), 10.0);
        assert_eq!(dice_multiplier(call(DicePrediction::Exact, 2), 2), 10.0);
    }

    #[test]
    fn test_dice_payout_floors() {
        assert_eq!(dice_payout(call(DicePrediction::Over, 3), 2, 2, 3), 4);
    }

    #[test]
    fn test_slots_payouts() {
        use SlotSymbol::*;
        assert_eq!(slots_payout([Cherry, Cherry, Cherry]), 150);
        assert_eq!(slots_payout([Cherry, Cherry, Lemon]), 50);
        assert_eq!(slots_payout([Lemon, Cherry, Cherry]), 50);
        assert_eq!(slots_payout([Seven, Bar, Seven]), 500);
        assert_eq!(slots_payout([Cherry, Lemon, Orange]), 0);
        assert_eq!(slots_payout([Diamond, Diamond, Diamond]), 3000);
    }

    #[test]
    fn test_wheel_payouts() {
        let paid: Vec<u64> = (0..8).map(wheel_payout).collect();
        assert_eq!(paid, vec![100, 500, 0, 1000, 50, 2000, 0, 250]);
        assert_eq!(wheel_payout(99), 0);
    }

    #[test]
    fn test_crash_payouts() {
        assert_eq!(crash_payout(100, Some(2.456)), 245);
        assert_eq!(crash_payout(100, None), 0);
        assert_eq!(crash_payout(u64::MAX, Some(100.0)), u64::MAX);
    }

    #[test]
    fn test_mismatched_outcome_pays_nothing() {
        let outcome = GameOutcome::Wheel { segment: 5 };
        assert_eq!(calculate_payout(&Wager::Slots, 100, &outcome), 0);
        assert_eq!(calculate_payout(&Wager::Wheel, 100, &outcome), 2000);
    }
}
