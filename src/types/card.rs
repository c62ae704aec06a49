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

use crate::clock::Clock;
use crate::outcome::Outcome;
use crate::outcome::Status;
use crate::outcome::Validation;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::timestamp::Timestamp;

/// The maximum length of either side of a card, in characters.
pub const MAX_TEXT_LENGTH: usize = 500;

/// The ease factor never drops below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// The longest interval between two reviews, in days.
pub const MAX_INTERVAL: i64 = 36500;

/// A bilingual flashcard and its scheduling state.
///
/// The scheduling fields only change through the setters, each of which
/// re-checks its own invariant.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    id: CardId,
    deck_id: DeckId,
    /// The original text.
    front: String,
    /// The translation.
    back: String,
    /// Consecutive correct reviews since the last lapse.
    correct_review_streak: i64,
    /// Consecutive reviews with quality >= 3 since the last lapse.
    repetitions: i64,
    /// Days until the next review.
    interval: i64,
    ease_factor: f64,
    next_review_date: Timestamp,
    /// `None` if the card has never been answered correctly.
    previous_correct_review: Option<Timestamp>,
}

/// Everything needed to build a [`Card`].
#[derive(Clone, Debug)]
pub struct CardFields {
    /// A fresh identifier is generated when this is `None`.
    pub id: Option<CardId>,
    pub deck_id: DeckId,
    pub front: String,
    pub back: String,
    pub correct_review_streak: i64,
    pub interval: i64,
    pub ease_factor: f64,
    pub repetitions: i64,
    pub next_review_date: Timestamp,
    pub previous_correct_review: Option<Timestamp>,
}

impl CardFields {
    /// The fields of a card that has never been reviewed, first due a day
    /// after `now`.
    pub fn new(
        deck_id: DeckId,
        front: impl Into<String>,
        back: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: None,
            deck_id,
            front: front.into(),
            back: back.into(),
            correct_review_streak: 0,
            interval: 1,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            next_review_date: now.plus_days(1),
            previous_correct_review: None,
        }
    }
}

impl Card {
    /// Create a new card. Every broken rule is reported, not just the first.
    pub fn create(fields: CardFields, clock: &impl Clock) -> Outcome<Self> {
        Self::build(fields, clock, true)
    }

    /// Rebuild a card loaded from storage. Unlike [`Card::create`], the next
    /// review date may already be in the past.
    pub fn rehydrate(fields: CardFields, clock: &impl Clock) -> Outcome<Self> {
        Self::build(fields, clock, false)
    }

    fn build(fields: CardFields, clock: &impl Clock, is_new: bool) -> Outcome<Self> {
        let now = clock.now();
        let mut v = Validation::new();
        if v.not_blank("front", &fields.front) {
            v.max_chars("front", &fields.front, MAX_TEXT_LENGTH);
        }
        if v.not_blank("back", &fields.back) {
            v.max_chars("back", &fields.back, MAX_TEXT_LENGTH);
        }
        v.not_negative("correct review streak", fields.correct_review_streak);
        v.not_negative("repetitions", fields.repetitions);
        if v.positive("interval", fields.interval) {
            v.check(fields.interval <= MAX_INTERVAL, || {
                format!("interval must be at most {MAX_INTERVAL} days, got {}.", fields.interval)
            });
        }
        v.check(fields.ease_factor.is_finite(), || {
            format!("ease factor must be a finite number, got {}.", fields.ease_factor)
        });
        if is_new {
            v.check(fields.next_review_date >= now, || {
                format!(
                    "next review date must not be in the past, got {}.",
                    fields.next_review_date
                )
            });
        }
        if let Some(previous) = fields.previous_correct_review {
            v.check(previous <= now, || {
                format!("previous correct review must not be in the future, got {previous}.")
            });
        }
        v.finish(Status::BusinessRuleViolated)?;

        Ok(Self {
            id: fields.id.unwrap_or_else(CardId::generate),
            deck_id: fields.deck_id,
            front: fields.front,
            back: fields.back,
            correct_review_streak: fields.correct_review_streak,
            repetitions: fields.repetitions,
            interval: fields.interval,
            ease_factor: fields.ease_factor.max(MIN_EASE_FACTOR),
            next_review_date: fields.next_review_date,
            previous_correct_review: fields.previous_correct_review,
        })
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn correct_review_streak(&self) -> i64 {
        self.correct_review_streak
    }

    pub fn repetitions(&self) -> i64 {
        self.repetitions
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    pub fn next_review_date(&self) -> Timestamp {
        self.next_review_date
    }

    pub fn previous_correct_review(&self) -> Option<Timestamp> {
        self.previous_correct_review
    }

    pub fn is_due(&self, at: Timestamp) -> bool {
        self.next_review_date <= at
    }

    /// The card's fields, for persisting and rebuilding it.
    pub fn to_fields(&self) -> CardFields {
        CardFields {
            id: Some(self.id),
            deck_id: self.deck_id,
            front: self.front.clone(),
            back: self.back.clone(),
            correct_review_streak: self.correct_review_streak,
            interval: self.interval,
            ease_factor: self.ease_factor,
            repetitions: self.repetitions,
            next_review_date: self.next_review_date,
            previous_correct_review: self.previous_correct_review,
        }
    }

    pub fn set_correct_review_streak(&mut self, streak: i64) -> Outcome<()> {
        let mut v = Validation::new();
        v.not_negative("correct review streak", streak);
        v.finish(Status::InvalidArguments)?;
        self.correct_review_streak = streak;
        Ok(())
    }

    pub fn set_repetitions(&mut self, repetitions: i64) -> Outcome<()> {
        let mut v = Validation::new();
        v.not_negative("repetitions", repetitions);
        v.finish(Status::InvalidArguments)?;
        self.repetitions = repetitions;
        Ok(())
    }

    pub fn set_interval(&mut self, interval: i64) -> Outcome<()> {
        let mut v = Validation::new();
        if v.positive("interval", interval) {
            v.check(interval <= MAX_INTERVAL, || {
                format!("interval must be at most {MAX_INTERVAL} days, got {interval}.")
            });
        }
        v.finish(Status::InvalidArguments)?;
        self.interval = interval;
        Ok(())
    }

    /// Values below [`MIN_EASE_FACTOR`] are raised to it.
    pub fn set_ease_factor(&mut self, ease_factor: f64) -> Outcome<()> {
        let mut v = Validation::new();
        v.check(ease_factor.is_finite(), || {
            format!("ease factor must be a finite number, got {ease_factor}.")
        });
        v.finish(Status::InvalidArguments)?;
        self.ease_factor = ease_factor.max(MIN_EASE_FACTOR);
        Ok(())
    }

    pub fn set_next_review_date(&mut self, date: Timestamp) -> Outcome<()> {
        self.next_review_date = date;
        Ok(())
    }

    pub fn set_previous_correct_review(
        &mut self,
        date: Timestamp,
        clock: &impl Clock,
    ) -> Outcome<()> {
        let now = clock.now();
        let mut v = Validation::new();
        v.check(date <= now, || {
            format!("previous correct review must not be in the future, got {date}.")
        });
        v.finish(Status::InvalidArguments)?;
        self.previous_correct_review = Some(date);
        Ok(())
    }
}
