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

use std::io::BufRead;
use std::io::Write;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::outcome::Status;
use crate::queue::PageRequest;
use crate::repo::Repository;
use crate::study::submit_review;
use crate::types::deck::Deck;
use crate::types::quality::Quality;

pub async fn drill_deck(directory: Option<String>, deck: String, clock: &impl Clock) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = coll.deck(&deck).await?;
    let stdin = std::io::stdin();
    let summary = drill(
        &coll.repo,
        clock,
        &deck,
        coll.config.page_size,
        &mut stdin.lock(),
        &mut std::io::stdout(),
    )
    .await?;
    log::debug!("Session completed: {summary:?}");
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
pub struct DrillSummary {
    pub reviewed: usize,
    pub correct: usize,
}

enum Answer {
    Grade(Quality),
    Quit,
}

/// Walk the cards due at the start of the session, page by page, asking for
/// a grade for each. Stops early on `q` or end of input.
///
/// The clock must not move backwards during the session: a graded card is
/// rescheduled at least a day after `clock.now()`, which takes it out of the
/// queue.
pub async fn drill(
    repo: &impl Repository,
    clock: &impl Clock,
    deck: &Deck,
    page_size: i64,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Fallible<DrillSummary> {
    let mut summary = DrillSummary::default();
    let until = clock.now();
    let mut first = true;
    'session: loop {
        // Graded cards leave the queue, so every page is read from the head.
        let request = PageRequest::first(deck.id(), until, page_size)?;
        let page = repo.get_cards_to_review(&request).await?;
        if first {
            let count = page.count.unwrap_or(page.cards.len());
            if count == 0 {
                writeln!(out, "No cards due in '{}'.", deck.name())?;
                return Ok(summary);
            }
            writeln!(out, "{count} cards due in '{}'.", deck.name())?;
            first = false;
        }
        if page.is_empty() {
            break;
        }
        for card in &page.cards {
            writeln!(out)?;
            writeln!(out, "Q: {}", card.front())?;
            writeln!(out, "[press enter to reveal]")?;
            if read_line(input)?.is_none() {
                break 'session;
            }
            writeln!(out, "A: {}", card.back())?;
            let quality = match read_grade(input, out)? {
                Answer::Grade(q) => q,
                Answer::Quit => break 'session,
            };
            match submit_review(repo, clock, card.id(), quality.value().into()).await {
                Ok(_) => {
                    summary.reviewed += 1;
                    if quality.is_correct() {
                        summary.correct += 1;
                    }
                }
                // Removed since the page was read.
                Err(e) if e.status() == Status::NotFound => {
                    log::warn!("Skipping card {}: {e}", card.id());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    writeln!(
        out,
        "Reviewed {} cards ({} correct).",
        summary.reviewed, summary.correct
    )?;
    Ok(summary)
}

fn read_line(input: &mut impl BufRead) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn read_grade(input: &mut impl BufRead, out: &mut impl Write) -> Fallible<Answer> {
    loop {
        writeln!(out, "Grade: (1 = Blackout ... 5 = Perfect, q = Quit)")?;
        let line = match read_line(input)? {
            Some(line) => line,
            None => return Ok(Answer::Quit),
        };
        if line == "q" {
            return Ok(Answer::Quit);
        }
        match line.parse::<i64>().ok().map(Quality::new) {
            Some(Ok(quality)) => return Ok(Answer::Grade(quality)),
            _ => writeln!(out, "Invalid input. Please enter a number between 1 and 5.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;
    use crate::clock::FixedClock;
    use crate::repo::memory::MemoryRepository;
    use crate::types::card::Card;
    use crate::types::card::CardFields;
    use crate::types::timestamp::Timestamp;

    fn clock() -> FixedClock {
        FixedClock::new(Timestamp::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 18, 0, 0).unwrap(),
        ))
    }

    async fn setup(due: usize) -> (MemoryRepository, Deck) {
        let clock = clock();
        let repo = MemoryRepository::new();
        let deck = Deck::create("Norsk", "", "tester", &clock).unwrap();
        repo.add_deck(&deck).await.unwrap();
        for i in 0..due {
            let mut fields = CardFields::new(deck.id(), format!("ord {i}"), format!("word {i}"), clock.now());
            fields.next_review_date = clock.now().plus_days(-(i as i64) - 1);
            let card = Card::rehydrate(fields, &clock).unwrap();
            repo.add_card(&card).await.unwrap();
        }
        (repo, deck)
    }

    #[tokio::test]
    async fn test_drill_all_pages() -> Fallible<()> {
        let (repo, deck) = setup(3).await;
        let mut input = Cursor::new("\n5\n\nfoo\n6\n2\n\n0\n3\n");
        let mut out = Vec::new();
        let summary = drill(&repo, &clock(), &deck, 2, &mut input, &mut out).await?;
        assert_eq!(
            summary,
            DrillSummary {
                reviewed: 3,
                correct: 2
            }
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("3 cards due in 'Norsk'."));
        // The oldest card comes first.
        assert!(text.contains("Q: ord 2"));
        assert!(text.find("ord 2").unwrap() < text.find("ord 0").unwrap());
        assert_eq!(text.matches("Invalid input.").count(), 3);
        assert!(text.ends_with("Reviewed 3 cards (2 correct).\n"));

        let request = PageRequest::first(deck.id(), clock().now(), 10)?;
        let page = repo.get_cards_to_review(&request).await?;
        assert_eq!(page.count, Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_drill_quit() -> Fallible<()> {
        let (repo, deck) = setup(3).await;
        let mut input = Cursor::new("\n3\n\nq\n");
        let mut out = Vec::new();
        let summary = drill(&repo, &clock(), &deck, 10, &mut input, &mut out).await?;
        assert_eq!(
            summary,
            DrillSummary {
                reviewed: 1,
                correct: 1
            }
        );
        let request = PageRequest::first(deck.id(), clock().now(), 10)?;
        assert_eq!(repo.get_cards_to_review(&request).await?.count, Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_drill_nothing_due() -> Fallible<()> {
        let (repo, deck) = setup(0).await;
        let mut out = Vec::new();
        let summary = drill(&repo, &clock(), &deck, 10, &mut Cursor::new(""), &mut out).await?;
        assert_eq!(summary, DrillSummary::default());
        assert_eq!(String::from_utf8(out).unwrap(), "No cards due in 'Norsk'.\n");
        Ok(())
    }
}
