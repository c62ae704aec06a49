// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! SM-2 scheduling.

use crate::clock::Clock;
use crate::outcome::Outcome;
use crate::types::card::Card;
use crate::types::card::MAX_INTERVAL;
use crate::types::card::MIN_EASE_FACTOR;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

/// Interval after the first successful repetition, in days.
const FIRST_INTERVAL: i64 = 1;

/// Interval after the second successful repetition, in days.
const SECOND_INTERVAL: i64 = 6;

/// How much a lapse lowers the ease factor.
const LAPSE_PENALTY: f64 = 0.2;

/// The scheduling state of a card.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Schedule {
    pub repetitions: i64,
    pub interval: i64,
    pub ease_factor: f64,
    pub correct_review_streak: i64,
    pub next_review_date: Timestamp,
    pub previous_correct_review: Option<Timestamp>,
}

impl Schedule {
    pub fn of(card: &Card) -> Self {
        Self {
            repetitions: card.repetitions(),
            interval: card.interval(),
            ease_factor: card.ease_factor(),
            correct_review_streak: card.correct_review_streak(),
            next_review_date: card.next_review_date(),
            previous_correct_review: card.previous_correct_review(),
        }
    }
}

/// Compute the schedule that follows a review of the given quality at `now`.
pub fn next_schedule(current: &Schedule, quality: Quality, now: Timestamp) -> Schedule {
    if quality.is_correct() {
        let repetitions = current.repetitions + 1;
        let interval = match repetitions {
            1 => FIRST_INTERVAL,
            2 => SECOND_INTERVAL,
            _ => {
                let grown = (current.interval as f64 * current.ease_factor).round() as i64;
                grown.min(MAX_INTERVAL)
            }
        };
        let q = quality.value() as f64;
        let ease_factor =
            (current.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);
        Schedule {
            repetitions,
            interval,
            ease_factor,
            correct_review_streak: current.correct_review_streak + 1,
            next_review_date: now.plus_days(interval),
            previous_correct_review: Some(now),
        }
    } else {
        Schedule {
            repetitions: 0,
            interval: FIRST_INTERVAL,
            ease_factor: (current.ease_factor - LAPSE_PENALTY).max(MIN_EASE_FACTOR),
            correct_review_streak: 0,
            next_review_date: now.plus_days(FIRST_INTERVAL),
            // A lapse is not a correct review.
            previous_correct_review: current.previous_correct_review,
        }
    }
}

/// Applies review grades to cards.
pub struct ReviewService<C> {
    clock: C,
}

impl<C: Clock> ReviewService<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Reschedule `card` after a review graded `quality` (1 to 5).
    ///
    /// An out-of-range quality is an `InvalidArguments` failure and leaves the
    /// card untouched.
    pub fn update_review(&self, card: &mut Card, quality: i64) -> Outcome<()> {
        let quality = Quality::new(quality)?;
        self.apply(card, quality)
    }

    pub fn apply(&self, card: &mut Card, quality: Quality) -> Outcome<()> {
        let now = self.clock.now();
        let next = next_schedule(&Schedule::of(card), quality, now);
        card.set_repetitions(next.repetitions)?;
        card.set_interval(next.interval)?;
        card.set_ease_factor(next.ease_factor)?;
        card.set_correct_review_streak(next.correct_review_streak)?;
        if quality.is_correct() {
            card.set_previous_correct_review(now, &self.clock)?;
        }
        card.set_next_review_date(next.next_review_date)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::outcome::Status;
    use crate::types::card::CardFields;
    use crate::types::ids::DeckId;

    const EPSILON: f64 = 1e-9;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap())
    }

    fn new_card(clock: &FixedClock) -> Card {
        Card::create(
            CardFields::new(DeckId::generate(), "la mesa", "the table", clock.now()),
            clock,
        )
        .unwrap()
    }

    fn card_with(
        clock: &FixedClock,
        repetitions: i64,
        interval: i64,
        ease_factor: f64,
        streak: i64,
    ) -> Card {
        let mut fields = CardFields::new(DeckId::generate(), "el gato", "the cat", clock.now());
        fields.repetitions = repetitions;
        fields.interval = interval;
        fields.ease_factor = ease_factor;
        fields.correct_review_streak = streak;
        Card::rehydrate(fields, clock).unwrap()
    }

    #[test]
    fn test_correct_answers_advance_counters() -> Outcome<()> {
        for quality in 3..=5 {
            let clock = FixedClock::new(t0());
            let mut card = card_with(&clock, 4, 10, 2.0, 4);
            ReviewService::new(clock).update_review(&mut card, quality)?;
            assert_eq!(card.repetitions(), 5);
            assert_eq!(card.correct_review_streak(), 5);
            assert_eq!(card.next_review_date(), t0().plus_days(card.interval()));
            assert_eq!(card.previous_correct_review(), Some(t0()));
            assert!(card.ease_factor() >= MIN_EASE_FACTOR);
        }
        Ok(())
    }

    #[test]
    fn test_lapses_reset_schedule() -> Outcome<()> {
        for quality in 1..=2 {
            let clock = FixedClock::new(t0());
            let previous = t0().plus_days(-10);
            let mut card = card_with(&clock, 5, 20, 2.0, 5);
            card.set_previous_correct_review(previous, &clock)?;
            ReviewService::new(clock).update_review(&mut card, quality)?;
            assert_eq!(card.repetitions(), 0);
            assert_eq!(card.interval(), 1);
            assert_eq!(card.correct_review_streak(), 0);
            assert_eq!(card.next_review_date(), t0().plus_days(1));
            assert_eq!(card.previous_correct_review(), Some(previous));
        }
        Ok(())
    }

    #[test]
    fn test_lapse_scenario() -> Outcome<()> {
        let clock = FixedClock::new(t0());
        let mut card = card_with(&clock, 5, 20, 2.0, 3);
        ReviewService::new(clock).update_review(&mut card, 2)?;
        assert_eq!(card.repetitions(), 0);
        assert_eq!(card.interval(), 1);
        assert!((card.ease_factor() - 1.8).abs() < EPSILON);
        assert_eq!(card.correct_review_streak(), 0);
        assert_eq!(card.next_review_date(), t0().plus_days(1));
        Ok(())
    }

    #[test]
    fn test_three_review_scenario() -> Outcome<()> {
        let clock = FixedClock::new(t0());
        let mut card = new_card(&clock);

        ReviewService::new(clock).update_review(&mut card, 5)?;
        assert_eq!(card.repetitions(), 1);
        assert_eq!(card.interval(), 1);
        assert_eq!(card.next_review_date(), t0().plus_days(1));
        assert!((card.ease_factor() - 2.6).abs() < EPSILON);

        let clock = clock.advance_days(1);
        ReviewService::new(clock).update_review(&mut card, 4)?;
        assert_eq!(card.repetitions(), 2);
        assert_eq!(card.interval(), 6);
        assert_eq!(card.next_review_date(), t0().plus_days(7));
        let ease_after_second = card.ease_factor();
        assert!((ease_after_second - 2.6).abs() < EPSILON);

        let clock = clock.advance_days(6);
        ReviewService::new(clock).update_review(&mut card, 5)?;
        assert_eq!(card.repetitions(), 3);
        assert_eq!(card.interval(), (6.0 * ease_after_second).round() as i64);
        assert_eq!(card.interval(), 16);
        assert_eq!(card.next_review_date(), t0().plus_days(7 + 16));
        Ok(())
    }

    #[test]
    fn test_ease_factor_update_per_quality() {
        let now = t0();
        let current = Schedule {
            repetitions: 0,
            interval: 1,
            ease_factor: 2.5,
            correct_review_streak: 0,
            next_review_date: now,
            previous_correct_review: None,
        };
        let ease = |q: i64| next_schedule(&current, Quality::new(q).unwrap(), now).ease_factor;
        assert!((ease(5) - 2.6).abs() < EPSILON);
        assert!((ease(4) - 2.5).abs() < EPSILON);
        assert!((ease(3) - 2.36).abs() < EPSILON);
        assert!((ease(2) - 2.3).abs() < EPSILON);
        assert!((ease(1) - 2.3).abs() < EPSILON);
        // Worse answers never raise the ease factor more than better ones.
        for q in 1..5 {
            assert!(ease(q) <= ease(q + 1) + EPSILON);
        }
    }

    #[test]
    fn test_ease_factor_floor_under_repeated_lapses() -> Outcome<()> {
        let mut clock = FixedClock::new(t0());
        let mut card = new_card(&clock);
        for _ in 0..20 {
            ReviewService::new(clock).update_review(&mut card, 1)?;
            assert!(card.ease_factor() >= MIN_EASE_FACTOR);
            clock = clock.advance_days(1);
        }
        assert_eq!(card.ease_factor(), MIN_EASE_FACTOR);
        Ok(())
    }

    #[test]
    fn test_ease_factor_floor_under_hard_answers() -> Outcome<()> {
        let mut clock = FixedClock::new(t0());
        let mut card = new_card(&clock);
        for _ in 0..20 {
            ReviewService::new(clock).update_review(&mut card, 3)?;
            clock = clock.advance_days(card.interval());
        }
        assert_eq!(card.ease_factor(), MIN_EASE_FACTOR);
        assert_eq!(card.repetitions(), 20);
        Ok(())
    }

    #[test]
    fn test_invalid_quality_leaves_card_untouched() {
        let clock = FixedClock::new(t0());
        let card = card_with(&clock, 3, 15, 2.2, 3);
        for quality in [0, 6, -1] {
            let mut reviewed = card.clone();
            let err = ReviewService::new(clock)
                .update_review(&mut reviewed, quality)
                .unwrap_err();
            assert_eq!(err.status(), Status::InvalidArguments);
            assert_eq!(reviewed, card);
        }
    }

    #[test]
    fn test_review_of_overdue_card() -> Outcome<()> {
        let clock = FixedClock::new(t0());
        let mut fields = CardFields::new(DeckId::generate(), "el perro", "the dog", t0());
        fields.next_review_date = t0().plus_days(-5);
        let mut card = Card::rehydrate(fields, &clock)?;
        ReviewService::new(clock).update_review(&mut card, 4)?;
        assert_eq!(card.next_review_date(), t0().plus_days(1));
        Ok(())
    }

    #[test]
    fn test_interval_stops_growing_at_the_maximum() -> Outcome<()> {
        let clock = FixedClock::new(t0());
        let service = ReviewService::new(clock);
        let mut card = new_card(&clock);
        for _ in 0..30 {
            service.update_review(&mut card, 5)?;
        }
        assert_eq!(card.repetitions(), 30);
        assert_eq!(card.interval(), MAX_INTERVAL);
        assert_eq!(card.next_review_date(), t0().plus_days(MAX_INTERVAL));
        Ok(())
    }
}
