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

//! Keyset pagination over the cards due for review.
//!
//! Pages are ordered by next review date. The first page (no cursor) also
//! reports how many cards are due in total; later pages continue strictly
//! after the cursor, which is the next review date of the last card seen.
//! Because reviewed cards move forward in time, continuing from a date
//! rather than an offset never skips or repeats a card that has not been
//! returned yet.

use crate::outcome::Outcome;
use crate::outcome::validate_positive;
use crate::types::card::Card;
use crate::types::ids::DeckId;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PageRequest {
    pub deck_id: DeckId,
    /// Only cards due at or before this instant are returned.
    pub until: Timestamp,
    pub page_size: usize,
    /// `None` requests the first page.
    pub cursor: Option<Timestamp>,
}

impl PageRequest {
    pub fn new(
        deck_id: DeckId,
        until: Timestamp,
        page_size: i64,
        cursor: Option<Timestamp>,
    ) -> Outcome<Self> {
        validate_positive("page size", page_size)?;
        Ok(Self {
            deck_id,
            until,
            page_size: page_size as usize,
            cursor,
        })
    }

    pub fn first(deck_id: DeckId, until: Timestamp, page_size: i64) -> Outcome<Self> {
        Self::new(deck_id, until, page_size, None)
    }

    pub fn is_first(&self) -> bool {
        self.cursor.is_none()
    }

    /// The request for the page after `page`, or `None` if `page` was empty.
    pub fn after(&self, page: &ReviewPage) -> Option<Self> {
        page.next_cursor().map(|cursor| Self {
            cursor: Some(cursor),
            ..*self
        })
    }

    /// Whether `card` belongs to the result set of this request, ignoring
    /// the page size.
    pub fn matches(&self, card: &Card) -> bool {
        card.deck_id() == self.deck_id
            && card.next_review_date() <= self.until
            && self
                .cursor
                .is_none_or(|cursor| card.next_review_date() > cursor)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReviewPage {
    pub cards: Vec<Card>,
    /// Total number of due cards; only computed for the first page.
    pub count: Option<usize>,
}

impl ReviewPage {
    pub fn next_cursor(&self) -> Option<Timestamp> {
        self.cards.last().map(|card| card.next_review_date())
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Select one page from cards held in storage order.
pub fn paginate<'a>(cards: impl IntoIterator<Item = &'a Card>, request: &PageRequest) -> ReviewPage {
    let mut due: Vec<&Card> = cards
        .into_iter()
        .filter(|card| {
            card.deck_id() == request.deck_id && card.next_review_date() <= request.until
        })
        .collect();
    let count = if request.is_first() {
        Some(due.len())
    } else {
        None
    };
    // Stable, so ties keep storage order.
    due.sort_by_key(|card| card.next_review_date());
    let cards = due
        .into_iter()
        .filter(|card| request.matches(card))
        .take(request.page_size)
        .cloned()
        .collect();
    ReviewPage { cards, count }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::outcome::Status;
    use crate::types::card::CardFields;

    fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap())
    }

    fn card_due(deck_id: DeckId, days: i64) -> Card {
        let clock = FixedClock::new(t0());
        let mut fields = CardFields::new(deck_id, format!("front {days}"), "back", t0());
        fields.next_review_date = t0().plus_days(days);
        Card::rehydrate(fields, &clock).unwrap()
    }

    #[test]
    fn test_page_size_must_be_positive() {
        let deck_id = DeckId::generate();
        for size in [0, -3] {
            let err = PageRequest::first(deck_id, t0(), size).unwrap_err();
            assert_eq!(err.status(), Status::InvalidArguments);
        }
    }

    #[test]
    fn test_traversal() -> Outcome<()> {
        let deck_id = DeckId::generate();
        // Insert out of order, with some cards not yet due.
        let mut cards: Vec<Card> = (0..25).rev().map(|d| card_due(deck_id, -d - 1)).collect();
        cards.push(card_due(deck_id, 3));
        cards.push(card_due(DeckId::generate(), -2));

        let first = PageRequest::first(deck_id, t0(), 10)?;
        let page1 = paginate(&cards, &first);
        assert_eq!(page1.cards.len(), 10);
        assert_eq!(page1.count, Some(25));
        assert_eq!(page1.cards[0].next_review_date(), t0().plus_days(-25));

        let second = first.after(&page1).unwrap();
        let page2 = paginate(&cards, &second);
        assert_eq!(page2.cards.len(), 10);
        assert_eq!(page2.count, None);

        let third = second.after(&page2).unwrap();
        let page3 = paginate(&cards, &third);
        assert_eq!(page3.cards.len(), 5);
        assert_eq!(page3.count, None);

        let fourth = third.after(&page3).unwrap();
        assert!(paginate(&cards, &fourth).is_empty());

        let mut seen = HashSet::new();
        for card in page1.cards.iter().chain(&page2.cards).chain(&page3.cards) {
            assert!(seen.insert(card.id()), "card returned twice");
        }
        assert_eq!(seen.len(), 25);

        let dates: Vec<Timestamp> = page1
            .cards
            .iter()
            .chain(&page2.cards)
            .chain(&page3.cards)
            .map(|c| c.next_review_date())
            .collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        Ok(())
    }

    #[test]
    fn test_until_is_inclusive() -> Outcome<()> {
        let deck_id = DeckId::generate();
        let cards = vec![card_due(deck_id, 0), card_due(deck_id, 1)];
        let page = paginate(&cards, &PageRequest::first(deck_id, t0(), 5)?);
        assert_eq!(page.count, Some(1));
        assert_eq!(page.cards[0].next_review_date(), t0());
        Ok(())
    }

    #[test]
    fn test_ties_keep_storage_order() -> Outcome<()> {
        let deck_id = DeckId::generate();
        let cards = vec![card_due(deck_id, -1), card_due(deck_id, -1), card_due(deck_id, -2)];
        let page = paginate(&cards, &PageRequest::first(deck_id, t0(), 5)?);
        let ids: Vec<_> = page.cards.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![cards[2].id(), cards[0].id(), cards[1].id()]);
        Ok(())
    }

    #[test]
    fn test_empty_deck() -> Outcome<()> {
        let page = paginate(&[], &PageRequest::first(DeckId::generate(), t0(), 5)?);
        assert!(page.is_empty());
        assert_eq!(page.count, Some(0));
        assert_eq!(page.next_cursor(), None);
        Ok(())
    }
}
