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

//! Bilingual flashcard decks scheduled with SM-2.

pub mod cli;
pub mod clock;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod error;
pub mod outcome;
pub mod queue;
pub mod repo;
pub mod scheduler;
pub mod study;
pub mod types;
