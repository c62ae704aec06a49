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
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE: &str = "lingocards.toml";

/// Collection settings, read from `lingocards.toml` in the collection
/// directory. Every key is optional.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Database file name, relative to the collection directory.
    pub database: String,
    /// Owner recorded on new decks.
    pub owner: String,
    /// Default number of cards per page of the review queue.
    pub page_size: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: "lingocards.db".to_string(),
            owner: "local".to_string(),
            page_size: 20,
        }
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE}, using defaults.");
            return Ok(Self::default());
        }
        let content = read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        if config.page_size < 1 {
            return fail("page_size must be at least 1.");
        }
        if config.owner.trim().is_empty() {
            return fail("owner must not be empty.");
        }
        if config.database.trim().is_empty() {
            return fail("database must not be empty.");
        }
        Ok(config)
    }
}
