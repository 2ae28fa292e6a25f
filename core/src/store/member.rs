//! Store methods for the member roster.

use super::{date_from_sql, date_to_sql, parse_column, LadderStore};
use crate::{
    error::{LadderError, LadderResult},
    member::Member,
};
use rusqlite::{params, ErrorCode};

impl LadderStore {
    /// Enroll a member. Names are unique under `Member::name_key`, the same
    /// fold the roster checks, so an enrolled roster always loads.
    pub fn insert_member(&self, m: &Member) -> LadderResult<()> {
        let result = self.conn.execute(
            "INSERT INTO member (name, name_key, joined, faction, is_admin, salary, discord, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                m.canonical_name,
                Member::name_key(&m.canonical_name),
                date_to_sql(m.joined),
                m.faction.as_str(),
                m.is_admin,
                m.salary_eligible,
                m.discord,
                m.notes,
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(LadderError::DuplicateMember {
                    name: m.canonical_name.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a member on departure. Returns whether anyone was removed.
    pub fn delete_member(&self, name: &str) -> LadderResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM member WHERE name_key = ?1",
            params![Member::name_key(name)],
        )?;
        Ok(removed > 0)
    }

    /// All members in enrollment order.
    pub fn list_members(&self) -> LadderResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, joined, faction, is_admin, salary, discord, notes
             FROM member ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Member {
                canonical_name: row.get(0)?,
                joined: date_from_sql(1, row.get(1)?)?,
                faction: parse_column(2, &row.get::<_, String>(2)?)?,
                is_admin: row.get(3)?,
                salary_eligible: row.get(4)?,
                discord: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn member_count(&self) -> LadderResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM member", [], |row| row.get(0))?;
        Ok(count)
    }
}
