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

use std::io::Write;

use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::repo::Repository;
use crate::types::card::Card;
use crate::types::deck::Deck;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::review::ReviewRecord;
use crate::types::timestamp::Timestamp;

pub async fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    write_export(&coll.repo, &mut std::io::stdout()).await
}

pub async fn write_export(repo: &impl Repository, out: &mut impl Write) -> Fallible<()> {
    let export: Export = get_export(repo).await?;
    let json: String = serde_json::to_string_pretty(&export)?;
    writeln!(out, "{json}")?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    decks: Vec<DeckExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckExport {
    #[serde(flatten)]
    deck: Deck,
    cards: Vec<CardExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    id: CardId,
    deck_id: DeckId,
    front: String,
    back: String,
    correct_review_streak: i64,
    repetitions: i64,
    interval: i64,
    ease_factor: f64,
    next_review_date: Timestamp,
    previous_correct_review: Option<Timestamp>,
    reviews: Vec<ReviewRecord>,
}

impl CardExport {
    fn new(card: &Card, reviews: Vec<ReviewRecord>) -> Self {
        Self {
            id: card.id(),
            deck_id: card.deck_id(),
            front: card.front().to_string(),
            back: card.back().to_string(),
            correct_review_streak: card.correct_review_streak(),
            repetitions: card.repetitions(),
            interval: card.interval(),
            ease_factor: card.ease_factor(),
            next_review_date: card.next_review_date(),
            previous_correct_review: card.previous_correct_review(),
            reviews,
        }
    }
}

async fn get_export(repo: &impl Repository) -> Fallible<Export> {
    let mut decks: Vec<DeckExport> = Vec::new();
    for deck in repo.list_decks().await? {
        let mut cards: Vec<CardExport> = Vec::new();
        for card in repo.list_cards(deck.id()).await? {
            let reviews = repo.list_reviews(card.id()).await?;
            cards.push(CardExport::new(&card, reviews));
        }
        decks.push(DeckExport { deck, cards });
    }
    Ok(Export { decks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::repo::memory::MemoryRepository;
    use crate::study::add_card;
    use crate::study::submit_review;

    #[tokio::test]
    async fn test_export() -> Fallible<()> {
        let repo = MemoryRepository::new();
        let deck = Deck::create("Magyar", "", "tester", &SystemClock)?;
        repo.add_deck(&deck).await?;
        let card = add_card(&repo, &SystemClock, deck.id(), "alma", "apple").await?;
        submit_review(&repo, &SystemClock, card.id(), 1).await?;

        let mut out = Vec::new();
        write_export(&repo, &mut out).await?;
        let json: serde_json::Value = serde_json::from_slice(&out)?;
        let exported = &json["decks"][0];
        assert_eq!(exported["name"], "Magyar");
        assert_eq!(exported["cards"][0]["front"], "alma");
        assert_eq!(exported["cards"][0]["reviews"][0]["quality"], 1);
        assert_eq!(exported["cards"][0]["previousCorrectReview"], serde_json::Value::Null);
        Ok(())
    }
}
