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

use serde::Serialize;

use crate::types::card::Card;
use crate::types::ids::CardId;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

/// One entry in the review log: the grade given and the schedule it produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub card_id: CardId,
    pub reviewed_at: Timestamp,
    pub quality: Quality,
    pub repetitions: i64,
    pub interval: i64,
    pub ease_factor: f64,
    pub next_review_date: Timestamp,
}

impl ReviewRecord {
    /// Record the state of a card that was just reviewed.
    pub fn after_review(card: &Card, quality: Quality, reviewed_at: Timestamp) -> Self {
        Self {
            card_id: card.id(),
            reviewed_at,
            quality,
            repetitions: card.repetitions(),
            interval: card.interval(),
            ease_factor: card.ease_factor(),
            next_review_date: card.next_review_date(),
        }
    }
}
