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

//! Use cases built on the scheduler and a repository.

use crate::clock::Clock;
use crate::outcome::Failure;
use crate::outcome::Outcome;
use crate::repo::Repository;
use crate::scheduler::ReviewService;
use crate::types::card::Card;
use crate::types::card::CardFields;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::quality::Quality;
use crate::types::review::ReviewRecord;

/// Grade one review of a stored card, persist the new schedule, and append
/// it to the review log.
pub async fn submit_review(
    repo: &impl Repository,
    clock: &impl Clock,
    card_id: CardId,
    quality: i64,
) -> Outcome<Card> {
    let quality = Quality::new(quality)?;
    let mut card = repo.get_card_by_id(card_id).await?;
    ReviewService::new(clock).apply(&mut card, quality)?;
    repo.update_card(&card).await?;
    let record = ReviewRecord::after_review(&card, quality, clock.now());
    repo.record_review(&record).await?;
    log::debug!(
        "{} q={} n={} I={}d EF={:.2} due={}",
        card.id(),
        quality.value(),
        card.repetitions(),
        card.interval(),
        card.ease_factor(),
        card.next_review_date()
    );
    Ok(card)
}

/// Create a new card in an existing deck.
pub async fn add_card(
    repo: &impl Repository,
    clock: &impl Clock,
    deck_id: DeckId,
    front: &str,
    back: &str,
) -> Outcome<Card> {
    let deck = repo.get_deck(deck_id).await?;
    let fields = CardFields::new(deck.id(), front.trim(), back.trim(), clock.now());
    let card = Card::create(fields, clock)?;
    repo.add_card(&card).await?;
    Ok(card)
}

/// A card parsed from one line of an import file.
pub struct ImportLine {
    /// 1-based line number.
    pub line: usize,
    pub front: String,
    pub back: String,
}

/// Parse `front / back` lines. Blank lines and lines starting with `#` are
/// skipped. A line without a separator is a failure naming its line number.
pub fn parse_import(content: &str) -> (Vec<ImportLine>, Vec<Failure>) {
    let mut lines = Vec::new();
    let mut failures = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        match text.split_once(" / ") {
            Some((front, back)) => lines.push(ImportLine {
                line,
                front: front.trim().to_string(),
                back: back.trim().to_string(),
            }),
            None => failures.push(Failure::invalid_arguments(format!(
                "line {line}: expected 'front / back'"
            ))),
        }
    }
    (lines, failures)
}

/// Create one card per line of `content`. Valid lines are imported even
/// when others fail; the failures are returned merged into one.
pub async fn import_cards(
    repo: &impl Repository,
    clock: &impl Clock,
    deck_id: DeckId,
    content: &str,
) -> (Vec<Card>, Option<Failure>) {
    let (lines, mut failures) = parse_import(content);
    let mut cards = Vec::new();
    if let Err(e) = repo.get_deck(deck_id).await {
        return (cards, Some(e));
    }
    for line in lines {
        let fields = CardFields::new(deck_id, line.front, line.back, clock.now());
        let created = match Card::create(fields, clock) {
            Ok(card) => repo.add_card(&card).await.map(|_| card),
            Err(e) => Err(e),
        };
        match created {
            Ok(card) => cards.push(card),
            Err(e) => {
                let messages = e
                    .messages()
                    .iter()
                    .map(|m| format!("line {}: {m}", line.line));
                failures.push(Failure::new(e.status(), messages));
            }
        }
    }
    log::info!(
        "Imported {} cards, {} failures.",
        cards.len(),
        failures.len()
    );
    (cards, Failure::aggregate(failures))
}
