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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::repo::Repository;
use crate::types::deck::Deck;

/// Cards with an interval at least this long count as mature.
const MATURE_INTERVAL: i64 = 21;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub async fn print_deck_stats(
    directory: Option<String>,
    deck: String,
    format: StatsFormat,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = coll.deck(&deck).await?;
    let stats = deck_stats(&coll.repo, clock, &deck).await?;
    write_stats(&stats, format, &mut std::io::stdout())
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    deck_name: String,
    card_count: usize,
    due_count: usize,
    new_count: usize,
    mature_count: usize,
    review_count: usize,
    average_ease_factor: Option<f64>,
}

pub async fn deck_stats(repo: &impl Repository, clock: &impl Clock, deck: &Deck) -> Fallible<Stats> {
    let now = clock.now();
    let cards = repo.list_cards(deck.id()).await?;
    let mut review_count = 0;
    for card in &cards {
        review_count += repo.list_reviews(card.id()).await?.len();
    }
    let average_ease_factor = if cards.is_empty() {
        None
    } else {
        Some(cards.iter().map(|c| c.ease_factor()).sum::<f64>() / cards.len() as f64)
    };
    Ok(Stats {
        deck_name: deck.name().to_string(),
        card_count: cards.len(),
        due_count: cards.iter().filter(|c| c.is_due(now)).count(),
        new_count: cards
            .iter()
            .filter(|c| c.repetitions() == 0 && c.previous_correct_review().is_none())
            .count(),
        mature_count: cards
            .iter()
            .filter(|c| c.interval() >= MATURE_INTERVAL)
            .count(),
        review_count,
        average_ease_factor,
    })
}

pub fn write_stats(stats: &Stats, format: StatsFormat, out: &mut impl Write) -> Fallible<()> {
    match format {
        StatsFormat::Text => {
            writeln!(out, "Deck:        {}", stats.deck_name)?;
            writeln!(out, "Cards:       {}", stats.card_count)?;
            writeln!(out, "Due:         {}", stats.due_count)?;
            writeln!(out, "New:         {}", stats.new_count)?;
            writeln!(out, "Mature:      {}", stats.mature_count)?;
            writeln!(out, "Reviews:     {}", stats.review_count)?;
            match stats.average_ease_factor {
                Some(ease) => writeln!(out, "Avg. ease:   {ease:.2}")?,
                None => writeln!(out, "Avg. ease:   -")?,
            }
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(stats)?;
            writeln!(out, "{stats_json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::repo::memory::MemoryRepository;
    use crate::study::add_card;
    use crate::study::submit_review;
    use crate::types::timestamp::Timestamp;

    #[tokio::test]
    async fn test_stats() -> Fallible<()> {
        let clock = FixedClock::new(Timestamp::new(
            Utc.with_ymd_and_hms(2025, 10, 1, 8, 0, 0).unwrap(),
        ));
        let repo = MemoryRepository::new();
        let deck = Deck::create("Eesti", "", "tester", &clock)?;
        repo.add_deck(&deck).await?;

        let empty = deck_stats(&repo, &clock, &deck).await?;
        assert_eq!(empty.average_ease_factor, None);

        let a = add_card(&repo, &clock, deck.id(), "maja", "house").await?;
        add_card(&repo, &clock, deck.id(), "koer", "dog").await?;
        let later = clock.advance_days(1);
        submit_review(&repo, &later, a.id(), 5).await?;

        let stats = deck_stats(&repo, &later, &deck).await?;
        assert_eq!(stats.card_count, 2);
        assert_eq!(stats.due_count, 1);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.mature_count, 0);
        assert_eq!(stats.review_count, 1);
        assert!((stats.average_ease_factor.unwrap() - 2.55).abs() < 1e-9);

        let mut out = Vec::new();
        write_stats(&stats, StatsFormat::Json, &mut out)?;
        let json: serde_json::Value = serde_json::from_slice(&out)?;
        assert_eq!(json["cardCount"], 2);
        assert_eq!(json["deckName"], "Eesti");

        let mut out = Vec::new();
        write_stats(&stats, StatsFormat::Text, &mut out)?;
        assert!(String::from_utf8(out).unwrap().contains("Avg. ease:   2.55"));
        Ok(())
    }
}
