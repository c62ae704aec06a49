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

use std::path::PathBuf;

use clap::Parser;

use crate::clock::SystemClock;
use crate::cmd::card::add;
use crate::cmd::card::import;
use crate::cmd::deck::list_decks;
use crate::cmd::deck::new_deck;
use crate::cmd::drill::drill_deck;
use crate::cmd::due::print_due;
use crate::cmd::export::export_collection;
use crate::cmd::review::review;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_deck_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Create a new deck.
    NewDeck {
        name: String,
        /// Free-text description of the deck.
        #[arg(long)]
        description: Option<String>,
        /// Path to the collection directory. By default, the current working directory is used.
        #[arg(long)]
        directory: Option<String>,
    },
    /// List all decks.
    Decks {
        #[arg(long)]
        directory: Option<String>,
    },
    /// Add a card to a deck.
    Add {
        deck: String,
        front: String,
        back: String,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Import cards from a file with one `front / back` pair per line.
    Import {
        deck: String,
        file: PathBuf,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Show the cards due for review, one page at a time.
    Due {
        deck: String,
        /// Number of cards per page. Overrides the configured default.
        #[arg(long)]
        page_size: Option<i64>,
        /// Continue after this cursor, as printed at the end of the previous page.
        #[arg(long)]
        after: Option<String>,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Grade one review of a card, from 1 (blackout) to 5 (perfect).
    Review {
        card: String,
        #[arg(allow_negative_numbers = true)]
        quality: i64,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Drill the cards due in a deck interactively.
    Drill {
        deck: String,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Print deck statistics.
    Stats {
        deck: String,
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        #[arg(long)]
        directory: Option<String>,
    },
    /// Export the whole collection as JSON.
    Export {
        #[arg(long)]
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let clock = SystemClock;
    match cli {
        Command::NewDeck {
            name,
            description,
            directory,
        } => new_deck(directory, name, description, &clock).await,
        Command::Decks { directory } => list_decks(directory).await,
        Command::Add {
            deck,
            front,
            back,
            directory,
        } => add(directory, deck, front, back, &clock).await,
        Command::Import {
            deck,
            file,
            directory,
        } => import(directory, deck, file, &clock).await,
        Command::Due {
            deck,
            page_size,
            after,
            directory,
        } => print_due(directory, deck, page_size, after, &clock).await,
        Command::Review {
            card,
            quality,
            directory,
        } => review(directory, card, quality, &clock).await,
        Command::Drill { deck, directory } => drill_deck(directory, deck, &clock).await,
        Command::Stats {
            deck,
            format,
            directory,
        } => print_deck_stats(directory, deck, format, &clock).await,
        Command::Export { directory } => export_collection(directory).await,
    }
}
