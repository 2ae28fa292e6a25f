//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine calls store methods; nothing else executes SQL.

mod invasion;
mod ladder;
mod member;

use crate::{
    error::LadderResult,
    invasion::Invasion,
    ladder::Ladder,
    member::Member,
    source::{InvasionSource, LadderSource, RosterSource},
};
use chrono::{Datelike, NaiveDate};
use rusqlite::{types::Type, Connection};
use std::fmt::Display;
use std::str::FromStr;

pub struct LadderStore {
    conn: Connection,
}

impl LadderStore {
    pub fn open(path: &str) -> LadderResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> LadderResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> LadderResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_dropped_lines.sql"))?;
        Ok(())
    }
}

// ── Column helpers ─────────────────────────────────────────────────

fn date_to_sql(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

fn date_from_sql(col: usize, value: i64) -> rusqlite::Result<NaiveDate> {
    let year = i32::try_from(value / 10_000).unwrap_or(0);
    let month = u32::try_from(value / 100 % 100).unwrap_or(0);
    let day = u32::try_from(value % 100).unwrap_or(0);
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            col,
            Type::Integer,
            format!("invalid YYYYMMDD date {value}").into(),
        )
    })
}

fn parse_column<T>(col: usize, value: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(col, Type::Text, e.to_string().into())
    })
}

// ── Collaborator traits ────────────────────────────────────────────

impl InvasionSource for LadderStore {
    fn invasion(&self, id: &str) -> LadderResult<Option<Invasion>> {
        self.get_invasion(id)
    }

    fn invasions_in_month(&self, month: u32, year: i32) -> LadderResult<Vec<Invasion>> {
        self.list_invasions_in_month(month, year)
    }
}

impl LadderSource for LadderStore {
    fn ladder(&self, invasion: &str) -> LadderResult<Option<Ladder>> {
        self.load_ladder(invasion)
    }
}

impl RosterSource for LadderStore {
    fn members(&self) -> LadderResult<Vec<Member>> {
        self.list_members()
    }
}
