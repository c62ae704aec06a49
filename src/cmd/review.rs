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

use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::study::submit_review;
use crate::types::ids::CardId;

pub async fn review(
    directory: Option<String>,
    card_id: String,
    quality: i64,
    clock: &impl Clock,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let card_id: CardId = card_id.parse()?;
    let card = submit_review(&coll.repo, clock, card_id, quality).await?;
    println!(
        "{} / {}: next review in {} days ({}), ease {:.2}.",
        card.front(),
        card.back(),
        card.interval(),
        card.next_review_date(),
        card.ease_factor()
    );
    Ok(())
}
