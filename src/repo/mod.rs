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

//! Storage of decks, cards, and the review log.

pub mod memory;
pub mod sqlite;

use crate::outcome::Outcome;
use crate::queue::PageRequest;
use crate::queue::ReviewPage;
use crate::types::card::Card;
use crate::types::deck::Deck;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::review::ReviewRecord;

/// Missing rows are `NotFound`, duplicates are `Conflict`, and storage
/// faults are `Unknown`.
#[allow(async_fn_in_trait)]
pub trait Repository {
    /// Fails with `Conflict` if a deck with the same id or name exists.
    async fn add_deck(&self, deck: &Deck) -> Outcome<()>;

    async fn get_deck(&self, id: DeckId) -> Outcome<Deck>;

    async fn find_deck_by_name(&self, name: &str) -> Outcome<Deck>;

    /// All decks, ordered by name.
    async fn list_decks(&self) -> Outcome<Vec<Deck>>;

    async fn get_card_by_id(&self, id: CardId) -> Outcome<Card>;

    /// Fails with `NotFound` if the card's deck does not exist, and with
    /// `Conflict` if the card id is taken.
    async fn add_card(&self, card: &Card) -> Outcome<()>;

    /// Overwrite a stored card's text and scheduling state.
    async fn update_card(&self, card: &Card) -> Outcome<()>;

    /// All cards in a deck, in insertion order.
    async fn list_cards(&self, deck_id: DeckId) -> Outcome<Vec<Card>>;

    /// One page of the review queue. See [`crate::queue`].
    async fn get_cards_to_review(&self, request: &PageRequest) -> Outcome<ReviewPage>;

    async fn record_review(&self, review: &ReviewRecord) -> Outcome<()>;

    /// The review log of one card, oldest first.
    async fn list_reviews(&self, card_id: CardId) -> Outcome<Vec<ReviewRecord>>;
}

/// Behaviour every [`Repository`] must share. Each implementation runs
/// these against a fresh, empty instance.
#[cfg(test)]
pub(crate) mod contract {
    use std::collections::HashSet;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::Clock;
    use crate::clock::FixedClock;
    use crate::outcome::Status;
    use crate::scheduler::ReviewService;
    use crate::types::card::CardFields;
    use crate::types::quality::Quality;
    use crate::types::timestamp::Timestamp;

    pub fn t0() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap())
    }

    pub fn clock() -> FixedClock {
        FixedClock::new(t0())
    }

    async fn deck(repo: &impl Repository, name: &str) -> Deck {
        let deck = Deck::create(name, "", "tester", &clock()).unwrap();
        repo.add_deck(&deck).await.unwrap();
        deck
    }

    fn card_due(deck_id: DeckId, days: i64) -> Card {
        let mut fields = CardFields::new(deck_id, format!("Wort {days}"), format!("word {days}"), t0());
        fields.next_review_date = t0().plus_days(days);
        Card::rehydrate(fields, &clock()).unwrap()
    }

    pub async fn decks(repo: impl Repository) {
        let b = deck(&repo, "Beta").await;
        let a = deck(&repo, "Alpha").await;

        assert_eq!(repo.get_deck(a.id()).await.unwrap(), a);
        assert_eq!(repo.find_deck_by_name("Beta").await.unwrap(), b);
        let names: Vec<String> = repo
            .list_decks()
            .await
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);

        let missing = repo.get_deck(DeckId::generate()).await.unwrap_err();
        assert_eq!(missing.status(), Status::NotFound);
        let missing = repo.find_deck_by_name("Gamma").await.unwrap_err();
        assert_eq!(missing.status(), Status::NotFound);

        let dup = Deck::create("Alpha", "", "tester", &clock()).unwrap();
        let err = repo.add_deck(&dup).await.unwrap_err();
        assert_eq!(err.status(), Status::Conflict);
        let err = repo.add_deck(&a).await.unwrap_err();
        assert_eq!(err.status(), Status::Conflict);
    }

    pub async fn cards(repo: impl Repository) {
        let deck = deck(&repo, "Deutsch").await;
        let card = Card::create(
            CardFields::new(deck.id(), "das Haus", "the house", t0()),
            &clock(),
        )
        .unwrap();
        repo.add_card(&card).await.unwrap();
        assert_eq!(repo.get_card_by_id(card.id()).await.unwrap(), card);

        let err = repo.add_card(&card).await.unwrap_err();
        assert_eq!(err.status(), Status::Conflict);

        let orphan = Card::create(
            CardFields::new(DeckId::generate(), "der Baum", "the tree", t0()),
            &clock(),
        )
        .unwrap();
        let err = repo.add_card(&orphan).await.unwrap_err();
        assert_eq!(err.status(), Status::NotFound);

        let err = repo.get_card_by_id(CardId::generate()).await.unwrap_err();
        assert_eq!(err.status(), Status::NotFound);
        let err = repo.update_card(&orphan).await.unwrap_err();
        assert_eq!(err.status(), Status::NotFound);

        let mut reviewed = card.clone();
        let later = clock().advance_days(1);
        ReviewService::new(later)
            .update_review(&mut reviewed, 5)
            .unwrap();
        repo.update_card(&reviewed).await.unwrap();
        let stored = repo.get_card_by_id(card.id()).await.unwrap();
        assert_eq!(stored, reviewed);
        assert_eq!(stored.previous_correct_review(), Some(later.now()));

        let listed = repo.list_cards(deck.id()).await.unwrap();
        assert_eq!(listed, vec![reviewed.clone()]);

        let record = ReviewRecord::after_review(&reviewed, Quality::new(5).unwrap(), later.now());
        repo.record_review(&record).await.unwrap();
        assert_eq!(repo.list_reviews(card.id()).await.unwrap(), vec![record]);
        assert!(repo.list_reviews(CardId::generate()).await.unwrap().is_empty());
    }

    pub async fn review_queue(repo: impl Repository) {
        let main = deck(&repo, "Français").await;
        let other = deck(&repo, "Italiano").await;
        for d in (1..=25).rev() {
            repo.add_card(&card_due(main.id(), -d)).await.unwrap();
        }
        repo.add_card(&card_due(main.id(), 2)).await.unwrap();
        repo.add_card(&card_due(other.id(), -3)).await.unwrap();

        let first = PageRequest::first(main.id(), t0(), 10).unwrap();
        let page1 = repo.get_cards_to_review(&first).await.unwrap();
        assert_eq!(page1.cards.len(), 10);
        assert_eq!(page1.count, Some(25));

        let second = first.after(&page1).unwrap();
        let page2 = repo.get_cards_to_review(&second).await.unwrap();
        assert_eq!(page2.cards.len(), 10);
        assert_eq!(page2.count, None);

        let third = second.after(&page2).unwrap();
        let page3 = repo.get_cards_to_review(&third).await.unwrap();
        assert_eq!(page3.cards.len(), 5);
        assert_eq!(page3.count, None);

        let mut seen = HashSet::new();
        let mut last = None;
        for card in page1.cards.iter().chain(&page2.cards).chain(&page3.cards) {
            assert!(seen.insert(card.id()));
            assert_eq!(card.deck_id(), main.id());
            assert!(card.next_review_date() <= t0());
            if let Some(last) = last {
                assert!(card.next_review_date() > last);
            }
            last = Some(card.next_review_date());
        }
    }

    /// Reviewing cards between pages moves them past `until`; the traversal
    /// still visits every card that was due exactly once.
    pub async fn review_queue_under_mutation(repo: impl Repository) {
        let deck = deck(&repo, "Nihongo").await;
        for d in 1..=12 {
            repo.add_card(&card_due(deck.id(), -d)).await.unwrap();
        }
        let service = ReviewService::new(clock());
        let mut seen = HashSet::new();
        let mut request = PageRequest::first(deck.id(), t0(), 5).unwrap();
        loop {
            let page = repo.get_cards_to_review(&request).await.unwrap();
            if page.is_empty() {
                break;
            }
            for card in &page.cards {
                assert!(seen.insert(card.id()));
                let mut card = card.clone();
                service.update_review(&mut card, 4).unwrap();
                repo.update_card(&card).await.unwrap();
            }
            request = request.after(&page).unwrap();
        }
        assert_eq!(seen.len(), 12);
        let fresh = PageRequest::first(deck.id(), t0(), 5).unwrap();
        let page = repo.get_cards_to_review(&fresh).await.unwrap();
        assert_eq!(page.count, Some(0));
    }
}
