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

use crate::clock::Clock;
use crate::outcome::Outcome;
use crate::outcome::Status;
use crate::outcome::Validation;
use crate::types::ids::DeckId;
use crate::types::timestamp::Timestamp;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A named collection of cards belonging to one user. Cards refer to their
/// deck by id.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    id: DeckId,
    name: String,
    description: String,
    owner_id: String,
    created_at: Timestamp,
}

impl Deck {
    pub fn create(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: impl Into<String>,
        clock: &impl Clock,
    ) -> Outcome<Self> {
        Self::rehydrate(
            DeckId::generate(),
            name.into(),
            description.into(),
            owner_id.into(),
            clock.now(),
        )
    }

    pub fn rehydrate(
        id: DeckId,
        name: String,
        description: String,
        owner_id: String,
        created_at: Timestamp,
    ) -> Outcome<Self> {
        let mut v = Validation::new();
        if v.not_blank("deck name", &name) {
            v.max_chars("deck name", &name, MAX_NAME_LENGTH);
        }
        v.max_chars("deck description", &description, MAX_DESCRIPTION_LENGTH);
        v.not_blank("deck owner", &owner_id);
        v.finish(Status::BusinessRuleViolated)?;
        Ok(Self {
            id,
            name: name.trim().to_string(),
            description,
            owner_id,
            created_at,
        })
    }

    pub fn id(&self) -> DeckId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
