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
use crate::repo::Repository;
use crate::types::deck::Deck;

pub async fn new_deck(
    directory: Option<String>,
    name: String,
    description: Option<String>,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = create_deck(&coll.repo, clock, &name, description, &coll.config.owner).await?;
    println!("Created deck '{}' ({}).", deck.name(), deck.id());
    Ok(())
}

pub async fn create_deck(
    repo: &impl Repository,
    clock: &impl Clock,
    name: &str,
    description: Option<String>,
    owner: &str,
) -> Fallible<Deck> {
    let deck = Deck::create(name, description.unwrap_or_default(), owner, clock)?;
    repo.add_deck(&deck).await?;
    log::info!("Created deck {}", deck.id());
    Ok(deck)
}

pub async fn list_decks(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    write_decks(&coll.repo, &mut std::io::stdout()).await
}

pub async fn write_decks(repo: &impl Repository, out: &mut impl Write) -> Fallible<()> {
    let decks = repo.list_decks().await?;
    if decks.is_empty() {
        writeln!(out, "No decks.")?;
    }
    for deck in decks {
        let cards = repo.list_cards(deck.id()).await?;
        writeln!(out, "{} ({} cards)", deck.name(), cards.len())?;
        if !deck.description().is_empty() {
            writeln!(out, "    {}", deck.description())?;
        }
    }
    Ok(())
}
