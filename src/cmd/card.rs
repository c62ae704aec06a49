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

use std::fs::read_to_string;
use std::path::PathBuf;

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::study::add_card;
use crate::study::import_cards;

pub async fn add(
    directory: Option<String>,
    deck: String,
    front: String,
    back: String,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = coll.deck(&deck).await?;
    let card = add_card(&coll.repo, clock, deck.id(), &front, &back).await?;
    println!("Added card {} to '{}'.", card.id(), deck.name());
    Ok(())
}

pub async fn import(
    directory: Option<String>,
    deck: String,
    file: PathBuf,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let deck = coll.deck(&deck).await?;
    let content = read_to_string(&file)?;
    let (cards, failure) = import_cards(&coll.repo, clock, deck.id(), &content).await;
    println!("Imported {} cards into '{}'.", cards.len(), deck.name());
    match failure {
        None => Ok(()),
        Some(failure) => {
            for message in failure.messages() {
                eprintln!("{message}");
            }
            Err(failure.into())
        }
    }
}
