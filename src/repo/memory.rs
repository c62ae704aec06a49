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

use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::outcome::Failure;
use crate::outcome::Outcome;
use crate::queue::PageRequest;
use crate::queue::ReviewPage;
use crate::queue::paginate;
use crate::repo::Repository;
use crate::types::card::Card;
use crate::types::deck::Deck;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::review::ReviewRecord;

/// A repository that keeps everything in memory, in insertion order.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    decks: Vec<Deck>,
    cards: Vec<Card>,
    reviews: Vec<ReviewRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> Outcome<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Failure::unknown("in-memory repository lock poisoned"))
    }
}

impl Repository for MemoryRepository {
    async fn add_deck(&self, deck: &Deck) -> Outcome<()> {
        let mut state = self.acquire()?;
        if state
            .decks
            .iter()
            .any(|d| d.id() == deck.id() || d.name() == deck.name())
        {
            return Err(Failure::conflict(format!(
                "a deck named '{}' already exists",
                deck.name()
            )));
        }
        state.decks.push(deck.clone());
        Ok(())
    }

    async fn get_deck(&self, id: DeckId) -> Outcome<Deck> {
        let state = self.acquire()?;
        state
            .decks
            .iter()
            .find(|d| d.id() == id)
            .cloned()
            .ok_or_else(|| Failure::not_found(format!("no deck with id {id}")))
    }

    async fn find_deck_by_name(&self, name: &str) -> Outcome<Deck> {
        let state = self.acquire()?;
        state
            .decks
            .iter()
            .find(|d| d.name() == name)
            .cloned()
            .ok_or_else(|| Failure::not_found(format!("no deck named '{name}'")))
    }

    async fn list_decks(&self) -> Outcome<Vec<Deck>> {
        let state = self.acquire()?;
        let mut decks = state.decks.clone();
        decks.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(decks)
    }

    async fn get_card_by_id(&self, id: CardId) -> Outcome<Card> {
        let state = self.acquire()?;
        state
            .cards
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or_else(|| Failure::not_found(format!("no card with id {id}")))
    }

    async fn add_card(&self, card: &Card) -> Outcome<()> {
        let mut state = self.acquire()?;
        if !state.decks.iter().any(|d| d.id() == card.deck_id()) {
            return Err(Failure::not_found(format!(
                "no deck with id {}",
                card.deck_id()
            )));
        }
        if state.cards.iter().any(|c| c.id() == card.id()) {
            return Err(Failure::conflict(format!(
                "a card with id {} already exists",
                card.id()
            )));
        }
        state.cards.push(card.clone());
        Ok(())
    }

    async fn update_card(&self, card: &Card) -> Outcome<()> {
        let mut state = self.acquire()?;
        match state.cards.iter_mut().find(|c| c.id() == card.id()) {
            Some(stored) => {
                *stored = card.clone();
                Ok(())
            }
            None => Err(Failure::not_found(format!("no card with id {}", card.id()))),
        }
    }

    async fn list_cards(&self, deck_id: DeckId) -> Outcome<Vec<Card>> {
        let state = self.acquire()?;
        Ok(state
            .cards
            .iter()
            .filter(|c| c.deck_id() == deck_id)
            .cloned()
            .collect())
    }

    async fn get_cards_to_review(&self, request: &PageRequest) -> Outcome<ReviewPage> {
        let state = self.acquire()?;
        Ok(paginate(&state.cards, request))
    }

    async fn record_review(&self, review: &ReviewRecord) -> Outcome<()> {
        let mut state = self.acquire()?;
        if !state.cards.iter().any(|c| c.id() == review.card_id) {
            return Err(Failure::not_found(format!(
                "no card with id {}",
                review.card_id
            )));
        }
        state.reviews.push(review.clone());
        Ok(())
    }

    async fn list_reviews(&self, card_id: CardId) -> Outcome<Vec<ReviewRecord>> {
        let state = self.acquire()?;
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.card_id == card_id)
            .cloned()
            .collect())
    }
}
