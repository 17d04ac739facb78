//! Outcome generators
//!
//! Each generator is a pure function of the draws it consumes. The `draw_*`
//! helpers pull those draws from a [`DrawSource`].

use crate::games::draws::{clamp_unit, pick_index, DrawSource};
use crate::games::types::{GameOutcome, SlotSymbol, Wager, WHEEL_SEGMENTS};
use std::time::Duration;

/// Crash buckets: (upper bound on the selector draw, low, high)
pub const CRASH_BUCKETS: [(f64, f64, f64); 5] = [
    (0.33, 1.00, 1.50),
    (0.60, 1.50, 3.00),
    (0.80, 3.00, 5.00),
    (0.95, 5.00, 10.00),
    (1.00, 10.00, 100.00),
];

/// Simulated seconds for the crash multiplier to gain 1.00
pub const DEFAULT_SECONDS_PER_UNIT: f64 = 3.0;

pub fn wheel_segment(draw: f64) -> usize {
    pick_index(draw, WHEEL_SEGMENTS.len())
}

pub fn die_face(draw: f64) -> u8 {
    pick_index(draw, 6) as u8 + 1
}

pub fn slot_symbol(draw: f64) -> SlotSymbol {
    SlotSymbol::TABLE[pick_index(draw, SlotSymbol::TABLE.len())]
}

/// Map a bucket selector and an in-bucket position to a crash point.
pub fn crash_point(selector: f64, position: f64) -> f64 {
    let selector = clamp_unit(selector);
    let position = clamp_unit(position);
    let (_, low, high) = CRASH_BUCKETS
        .iter()
        .copied()
        .find(|(upper, _, _)| selector < *upper)
        .unwrap_or(CRASH_BUCKETS[CRASH_BUCKETS.len() - 1]);
    let point = low + position * (high - low);
    // Rounding up could otherwise land exactly on the next bucket's floor.
    point.min(high - 1e-9).max(low)
}

/// Rotation in degrees that leaves `segment` under the pointer after
/// `full_turns` complete revolutions. Purely cosmetic.
pub fn wheel_spin_angle(segment: usize, full_turns: u32) -> f64 {
    let slice = 360.0 / WHEEL_SEGMENTS.len() as f64;
    let centre = segment as f64 * slice + slice / 2.0;
    full_turns as f64 * 360.0 + (360.0 - centre)
}

/// Crash multiplier after `elapsed` simulated time
pub fn crash_multiplier(elapsed: Duration, seconds_per_unit: f64) -> f64 {
    1.0 + elapsed.as_secs_f64() / seconds_per_unit
}

/// Simulated time until the multiplier reaches `crash_point`
pub fn time_to_crash(crash_point: f64, seconds_per_unit: f64) -> Duration {
    Duration::from_secs_f64(((crash_point - 1.0) * seconds_per_unit).max(0.0))
}

pub fn draw_wheel(source: &mut dyn DrawSource) -> GameOutcome {
    GameOutcome::Wheel {
        segment: wheel_segment(source.next_draw()),
    }
}

pub fn draw_dice(source: &mut dyn DrawSource) -> GameOutcome {
    let d1 = die_face(source.next_draw());
    let d2 = die_face(source.next_draw());
    GameOutcome::Dice { d1, d2 }
}

pub fn draw_slots(source: &mut dyn DrawSource) -> GameOutcome {
    let reels = [
        slot_symbol(source.next_draw()),
        slot_symbol(source.next_draw()),
        slot_symbol(source.next_draw()),
    ];
    GameOutcome::Slots { reels }
}

pub fn draw_crash(source: &mut dyn DrawSource) -> GameOutcome {
    let selector = source.next_draw();
    let position = source.next_draw();
    GameOutcome::Crash {
        crash_point: crash_point(selector, position),
        cashed_out_at: None,
    }
}

/// Draw the outcome for whichever game the wager belongs to
pub fn draw_outcome(wager: &Wager, source: &mut dyn DrawSource) -> GameOutcome {
    match wager {
        Wager::Wheel => draw_wheel(source),
        Wager::Dice(_) => draw_dice(source),
        Wager::Slots => draw_slots(source),
        Wager::Crash => draw_crash(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::draws::{FixedDraws, SeededDraws};

    #[test]
    fn test_crash_low_bucket() {
        let c = crash_point(0.10, 0.10);
        assert!((1.0..1.5).contains(&c), "crash point {} outside [1.00,1.50)", c);
    }

    #[test]
    fn test_crash_bucket_boundaries() {
        assert!((1.5..3.0).contains(&crash_point(0.33, 0.0)));
        assert!((3.0..5.0).contains(&crash_point(0.60, 0.5)));
        assert!((5.0..10.0).contains(&crash_point(0.80, 0.99)));
        assert!((10.0..100.0).contains(&crash_point(0.95, 0.0)));
        assert!((10.0..100.0).contains(&crash_point(0.999, 0.999_999)));
        assert!(crash_point(0.32, 0.999_999_999_9) < 1.5);
    }

    #[test]
    fn test_crash_bucket_mixture() {
        let mut draws = SeededDraws::new(2024);
        let mut counts = [0usize; 5];
        let total = 20_000;
        for _ in 0..total {
            if let GameOutcome::Crash { crash_point, .. } = draw_crash(&mut draws) {
                let bucket = CRASH_BUCKETS
                    .iter()
                    .position(|(_, low, high)| crash_point >= *low && crash_point < *high)
                    .expect("crash point in some bucket");
                counts[bucket] += 1;
            }
        }
        let expected = [0.33, 0.27, 0.20, 0.15, 0.05];
        for (count, p) in counts.iter().zip(expected) {
            let freq = *count as f64 / total as f64;
            assert!((freq - p).abs() < 0.02, "bucket freq {} vs {}", freq, p);
        }
    }

    #[test]
    fn test_time_to_crash_monotonic() {
        let rate = DEFAULT_SECONDS_PER_UNIT;
        let c = crash_point(0.10, 0.5);
        let t = time_to_crash(c, rate);
        assert!((t.as_secs_f64() - (c - 1.0) * 3.0).abs() < 1e-9);

        let mut previous = Duration::ZERO;
        for point in [1.0, 1.2, 1.49, 2.0, 7.5, 99.0] {
            let t = time_to_crash(point, rate);
            assert!(t >= previous);
            previous = t;
        }
    }

    #[test]
    fn test_crash_multiplier_rate() {
        assert_eq!(crash_multiplier(Duration::ZERO, 3.0), 1.0);
        assert!((crash_multiplier(Duration::from_secs(3), 3.0) - 2.0).abs() < 1e-12);
        assert!((crash_multiplier(Duration::from_millis(1500), 3.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_dice_faces() {
        assert_eq!(die_face(0.0), 1);
        assert_eq!(die_face(0.5), 4);
        assert_eq!(die_face(0.999), 6);

        let mut draws = FixedDraws::new([0.4, 0.55]);
        assert_eq!(draw_dice(&mut draws), GameOutcome::Dice { d1: 3, d2: 4 });
    }

    #[test]
    fn test_slots_equal_weights() {
        let mut draws = FixedDraws::new([0.0, 0.01, 0.2]);
        assert_eq!(
            draw_slots(&mut draws),
            GameOutcome::Slots {
                reels: [SlotSymbol::Cherry, SlotSymbol::Cherry, SlotSymbol::Lemon]
            }
        );
        assert_eq!(slot_symbol(0.9), SlotSymbol::Diamond);
    }

    #[test]
    fn test_wheel_uniform_frequency() {
        let mut draws = SeededDraws::new(8000);
        let mut counts = [0usize; 8];
        for _ in 0..8000 {
            if let GameOutcome::Wheel { segment } = draw_wheel(&mut draws) {
                counts[segment] += 1;
            }
        }
        for count in counts {
            let freq = count as f64 / 8000.0;
            assert!((freq - 0.125).abs() < 0.02, "segment frequency {}", freq);
        }
    }

    #[test]
    fn test_wheel_angle_derived_from_segment() {
        assert_eq!(wheel_spin_angle(0, 0), 360.0 - 22.5);
        assert_eq!(wheel_spin_angle(7, 5), 5.0 * 360.0 + 22.5);
        let a = wheel_spin_angle(3, 4);
        assert!((a % 360.0 - (360.0 - 157.5)).abs() < 1e-9);
    }
}
