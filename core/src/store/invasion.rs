//! Store methods for invasions.

use super::{date_from_sql, date_to_sql, parse_column, LadderStore};
use crate::{error::LadderResult, invasion::{Invasion, Outcome}};
use chrono::Datelike;
use rusqlite::{params, OptionalExtension, Row};

const INVASION_COLUMNS: &str = "id, date, settlement, win, notes";

fn invasion_from_row(row: &Row<'_>) -> rusqlite::Result<Invasion> {
    Ok(Invasion {
        id: row.get(0)?,
        date: date_from_sql(1, row.get(1)?)?,
        settlement: parse_column(2, &row.get::<_, String>(2)?)?,
        outcome: if row.get::<_, bool>(3)? { Outcome::Win } else { Outcome::Loss },
        notes: row.get(4)?,
    })
}

impl LadderStore {
    /// Register an invasion. Registering the same id again overwrites its
    /// details but keeps any stored ladder.
    pub fn upsert_invasion(&self, inv: &Invasion) -> LadderResult<()> {
        self.conn.execute(
            "INSERT INTO invasion (id, date, year, month, settlement, win, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (id) DO UPDATE SET
                date = excluded.date, year = excluded.year, month = excluded.month,
                settlement = excluded.settlement, win = excluded.win, notes = excluded.notes",
            params![
                inv.id,
                date_to_sql(inv.date),
                inv.date.year(),
                inv.date.month(),
                inv.settlement.code(),
                inv.outcome.is_win(),
                inv.notes,
            ],
        )?;
        Ok(())
    }

    pub fn get_invasion(&self, id: &str) -> LadderResult<Option<Invasion>> {
        let sql = format!("SELECT {INVASION_COLUMNS} FROM invasion WHERE id = ?1");
        let invasion = self
            .conn
            .query_row(&sql, params![id], invasion_from_row)
            .optional()?;
        Ok(invasion)
    }

    pub fn list_invasions_in_month(&self, month: u32, year: i32) -> LadderResult<Vec<Invasion>> {
        let sql = format!(
            "SELECT {INVASION_COLUMNS} FROM invasion
             WHERE year = ?1 AND month = ?2
             ORDER BY date ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![year, month], invasion_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete an invasion and, through the foreign key, its ladder.
    pub fn delete_invasion(&self, id: &str) -> LadderResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM invasion WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
