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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::outcome::Failure;
use crate::outcome::Outcome;
use crate::queue::PageRequest;
use crate::queue::ReviewPage;
use crate::repo::Repository;
use crate::types::card::Card;
use crate::types::card::CardFields;
use crate::types::deck::Deck;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::review::ReviewRecord;
use crate::types::timestamp::Timestamp;

const CARD_COLUMNS: &str = "card_id, deck_id, front, back, correct_review_streak, repetitions, interval_days, ease_factor, next_review_date, previous_correct_review";

const DECK_COLUMNS: &str = "deck_id, name, description, owner_id, created_at";

/// A repository backed by a SQLite database. Cards read back from the
/// database are rebuilt with [`Card::rehydrate`], validated against `clock`.
#[derive(Clone)]
pub struct SqliteRepository<C = SystemClock> {
    conn: Arc<Mutex<Connection>>,
    clock: C,
}

impl<C: Clock> SqliteRepository<C> {
    pub fn open(database_path: &str, clock: C) -> Outcome<Self> {
        let conn = Connection::open(database_path)?;
        Self::init(conn, clock)
    }

    pub fn in_memory(clock: C) -> Outcome<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, clock)
    }

    fn init(mut conn: Connection, clock: C) -> Outcome<Self> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn, clock })
    }

    fn acquire(&self) -> Outcome<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Failure::unknown("database connection lock poisoned"))
    }

    fn rehydrate_all(&self, rows: Vec<CardFields>) -> Outcome<Vec<Card>> {
        rows.into_iter()
            .map(|fields| Card::rehydrate(fields, &self.clock))
            .collect()
    }
}

impl<C: Clock> Repository for SqliteRepository<C> {
    async fn add_deck(&self, deck: &Deck) -> Outcome<()> {
        log::debug!("Adding deck: {}", deck.name());
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let sql = format!("insert into decks ({DECK_COLUMNS}) values (?, ?, ?, ?, ?);");
        tx.execute(
            &sql,
            params![
                deck.id(),
                deck.name(),
                deck.description(),
                deck.owner_id(),
                deck.created_at(),
            ],
        )
        .map_err(|e| {
            Failure::from(e).with_message(format!("could not add deck '{}'", deck.name()))
        })?;
        tx.commit()?;
        Ok(())
    }

    async fn get_deck(&self, id: DeckId) -> Outcome<Deck> {
        let conn = self.acquire()?;
        let sql = format!("select {DECK_COLUMNS} from decks where deck_id = ?;");
        let row = conn.query_row(&sql, [id], read_deck_row).optional()?;
        match row {
            Some(row) => row.into_deck(),
            None => Err(Failure::not_found(format!("no deck with id {id}"))),
        }
    }

    async fn find_deck_by_name(&self, name: &str) -> Outcome<Deck> {
        let conn = self.acquire()?;
        let sql = format!("select {DECK_COLUMNS} from decks where name = ?;");
        let row = conn.query_row(&sql, [name], read_deck_row).optional()?;
        match row {
            Some(row) => row.into_deck(),
            None => Err(Failure::not_found(format!("no deck named '{name}'"))),
        }
    }

    async fn list_decks(&self) -> Outcome<Vec<Deck>> {
        let conn = self.acquire()?;
        let sql = format!("select {DECK_COLUMNS} from decks order by name;");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], read_deck_row)?;
        let mut decks = Vec::new();
        for row in rows {
            decks.push(row?.into_deck()?);
        }
        Ok(decks)
    }

    async fn get_card_by_id(&self, id: CardId) -> Outcome<Card> {
        let fields = {
            let conn = self.acquire()?;
            let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
            conn.query_row(&sql, [id], read_card_fields).optional()?
        };
        match fields {
            Some(fields) => Card::rehydrate(fields, &self.clock),
            None => Err(Failure::not_found(format!("no card with id {id}"))),
        }
    }

    async fn add_card(&self, card: &Card) -> Outcome<()> {
        log::debug!("Adding card: {}", card.id());
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        if !deck_exists(&tx, card.deck_id())? {
            return Err(Failure::not_found(format!(
                "no deck with id {}",
                card.deck_id()
            )));
        }
        let sql =
            format!("insert into cards ({CARD_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?);");
        tx.execute(
            &sql,
            params![
                card.id(),
                card.deck_id(),
                card.front(),
                card.back(),
                card.correct_review_streak(),
                card.repetitions(),
                card.interval(),
                card.ease_factor(),
                card.next_review_date(),
                card.previous_correct_review(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn update_card(&self, card: &Card) -> Outcome<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let sql = "update cards set front = ?, back = ?, correct_review_streak = ?, repetitions = ?, interval_days = ?, ease_factor = ?, next_review_date = ?, previous_correct_review = ? where card_id = ?;";
        let changed = tx.execute(
            sql,
            params![
                card.front(),
                card.back(),
                card.correct_review_streak(),
                card.repetitions(),
                card.interval(),
                card.ease_factor(),
                card.next_review_date(),
                card.previous_correct_review(),
                card.id(),
            ],
        )?;
        if changed == 0 {
            return Err(Failure::not_found(format!("no card with id {}", card.id())));
        }
        tx.commit()?;
        Ok(())
    }

    async fn list_cards(&self, deck_id: DeckId) -> Outcome<Vec<Card>> {
        let rows = {
            let conn = self.acquire()?;
            let sql = format!("select {CARD_COLUMNS} from cards where deck_id = ? order by rowid;");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([deck_id], read_card_fields)?;
            rows.collect::<rusqlite::Result<Vec<CardFields>>>()?
        };
        self.rehydrate_all(rows)
    }

    async fn get_cards_to_review(&self, request: &PageRequest) -> Outcome<ReviewPage> {
        let limit = request.page_size as i64;
        let (rows, count) = {
            let conn = self.acquire()?;
            match request.cursor {
                None => {
                    let count: i64 = conn.query_row(
                        "select count(*) from cards where deck_id = ? and next_review_date <= ?;",
                        params![request.deck_id, request.until],
                        |row| row.get(0),
                    )?;
                    let sql = format!(
                        "select {CARD_COLUMNS} from cards where deck_id = ? and next_review_date <= ? order by next_review_date, rowid limit ?;"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map(
                            params![request.deck_id, request.until, limit],
                            read_card_fields,
                        )?
                        .collect::<rusqlite::Result<Vec<CardFields>>>()?;
                    (rows, Some(count as usize))
                }
                Some(cursor) => {
                    let sql = format!(
                        "select {CARD_COLUMNS} from cards where deck_id = ? and next_review_date <= ? and next_review_date > ? order by next_review_date, rowid limit ?;"
                    );
                    let mut stmt = conn.prepare(&sql)?;
                    let rows = stmt
                        .query_map(
                            params![request.deck_id, request.until, cursor, limit],
                            read_card_fields,
                        )?
                        .collect::<rusqlite::Result<Vec<CardFields>>>()?;
                    (rows, None)
                }
            }
        };
        log::debug!(
            "Review queue page for deck {}: {} cards.",
            request.deck_id,
            rows.len()
        );
        let cards = self.rehydrate_all(rows)?;
        Ok(ReviewPage { cards, count })
    }

    async fn record_review(&self, review: &ReviewRecord) -> Outcome<()> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        if !card_exists(&tx, review.card_id)? {
            return Err(Failure::not_found(format!(
                "no card with id {}",
                review.card_id
            )));
        }
        let sql = "insert into reviews (card_id, reviewed_at, quality, repetitions, interval_days, ease_factor, next_review_date) values (?, ?, ?, ?, ?, ?, ?);";
        tx.execute(
            sql,
            params![
                review.card_id,
                review.reviewed_at,
                review.quality,
                review.repetitions,
                review.interval,
                review.ease_factor,
                review.next_review_date,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn list_reviews(&self, card_id: CardId) -> Outcome<Vec<ReviewRecord>> {
        let conn = self.acquire()?;
        let sql = "select card_id, reviewed_at, quality, repetitions, interval_days, ease_factor, next_review_date from reviews where card_id = ? order by review_id;";
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([card_id], |row| {
            Ok(ReviewRecord {
                card_id: row.get(0)?,
                reviewed_at: row.get(1)?,
                quality: row.get(2)?,
                repetitions: row.get(3)?,
                interval: row.get(4)?,
                ease_factor: row.get(5)?,
                next_review_date: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl From<rusqlite::Error> for Failure {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                Failure::conflict(format!("constraint violated: {value}"))
            }
            _ => Failure::unknown(format!("database error: {value}")),
        }
    }
}

struct DeckRow {
    id: DeckId,
    name: String,
    description: String,
    owner_id: String,
    created_at: Timestamp,
}

impl DeckRow {
    fn into_deck(self) -> Outcome<Deck> {
        Deck::rehydrate(
            self.id,
            self.name,
            self.description,
            self.owner_id,
            self.created_at,
        )
    }
}

fn read_deck_row(row: &Row) -> rusqlite::Result<DeckRow> {
    Ok(DeckRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn read_card_fields(row: &Row) -> rusqlite::Result<CardFields> {
    Ok(CardFields {
        id: Some(row.get(0)?),
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        correct_review_streak: row.get(4)?,
        repetitions: row.get(5)?,
        interval: row.get(6)?,
        ease_factor: row.get(7)?,
        next_review_date: row.get(8)?,
        previous_correct_review: row.get(9)?,
    })
}

fn deck_exists(tx: &Transaction, deck_id: DeckId) -> Outcome<bool> {
    let count: i64 = tx.query_row(
        "select count(*) from decks where deck_id = ?;",
        [deck_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn card_exists(tx: &Transaction, card_id: CardId) -> Outcome<bool> {
    let count: i64 = tx.query_row(
        "select count(*) from cards where card_id = ?;",
        [card_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn probe_schema_exists(tx: &Transaction) -> Outcome<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
