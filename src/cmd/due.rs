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

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::queue::PageRequest;
use crate::queue::ReviewPage;
use crate::repo::Repository;
use crate::types::deck::Deck;
use crate::types::timestamp::Timestamp;

pub async fn print_due(
    directory: Option<String>,
    deck: String,
    page_size: Option<i64>,
    after: Option<String>,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = coll.deck(&deck).await?;
    let cursor = match after {
        Some(s) => Some(Timestamp::parse(&s)?),
        None => None,
    };
    let page_size = page_size.unwrap_or(coll.config.page_size);
    let request = PageRequest::new(deck.id(), clock.now(), page_size, cursor)?;
    let page = coll.repo.get_cards_to_review(&request).await?;
    write_page(&deck, &request, &page, &mut std::io::stdout())
}

pub fn write_page(
    deck: &Deck,
    request: &PageRequest,
    page: &ReviewPage,
    out: &mut impl Write,
) -> Fallible<()> {
    if let Some(count) = page.count {
        writeln!(out, "{count} cards due in '{}'.", deck.name())?;
    }
    for card in &page.cards {
        writeln!(
            out,
            "{}  {}  {} / {}",
            card.id(),
            card.next_review_date(),
            card.front(),
            card.back()
        )?;
    }
    if page.cards.len() == request.page_size {
        if let Some(cursor) = page.next_cursor() {
            writeln!(out, "More: --after {}", cursor.to_storage_string())?;
            writeln!(
                out,
                "(--after skips any other cards due exactly at {cursor}; review this page first to see them.)"
            )?;
        }
    }
    Ok(())
}
