//! Store methods for ladders.

use super::LadderStore;
use crate::{
    error::LadderResult,
    ladder::{DroppedLine, EntrySource, Ladder, LadderEntry},
    parser::Stats,
};
use rusqlite::{params, types::Type};

fn to_sql(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn from_sql(v: i64) -> u64 {
    u64::try_from(v).unwrap_or(0)
}

impl LadderStore {
    /// Replace every stored entry and dropped line for the ladder's invasion
    /// in one transaction.
    /// Concurrent writers for the same invasion: last one wins.
    pub fn save_ladder(&self, ladder: &Ladder) -> LadderResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM ladder_entry WHERE invasion_id = ?1",
            params![ladder.invasion()],
        )?;
        tx.execute(
            "DELETE FROM ladder_dropped WHERE invasion_id = ?1",
            params![ladder.invasion()],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO ladder_entry (
                    invasion_id, rank, raw_name, matched_name, score,
                    kills, deaths, assists, heals, damage, source, adjusted
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for e in ladder.entries() {
                let s = e.stats;
                stmt.execute(params![
                    ladder.invasion(),
                    e.rank,
                    e.raw_name,
                    e.matched_name,
                    to_sql(e.score),
                    s.map(|s| to_sql(s.kills)),
                    s.map(|s| to_sql(s.deaths)),
                    s.map(|s| to_sql(s.assists)),
                    s.map(|s| to_sql(s.heals)),
                    s.map(|s| to_sql(s.damage)),
                    e.source.as_str(),
                    e.adjusted,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO ladder_dropped (invasion_id, line_no, line, reason)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for d in ladder.dropped() {
                stmt.execute(params![
                    ladder.invasion(),
                    i64::try_from(d.line_no).unwrap_or(i64::MAX),
                    d.line,
                    d.reason,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!(
            "invasion={} store: saved {} ladder entries, {} dropped lines",
            ladder.invasion(),
            ladder.count(),
            ladder.dropped().len()
        );
        Ok(())
    }

    /// `None` when nothing has been stored for the invasion.
    pub fn load_ladder(&self, invasion: &str) -> LadderResult<Option<Ladder>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, raw_name, matched_name, score,
                    kills, deaths, assists, heals, damage, source, adjusted
             FROM ladder_entry WHERE invasion_id = ?1
             ORDER BY rank ASC",
        )?;
        let entries = stmt
            .query_map(params![invasion], |row| {
                let kills: Option<i64> = row.get(4)?;
                let stats = match kills {
                    Some(kills) => Some(Stats {
                        kills: from_sql(kills),
                        deaths: from_sql(row.get(5)?),
                        assists: from_sql(row.get(6)?),
                        heals: from_sql(row.get(7)?),
                        damage: from_sql(row.get(8)?),
                    }),
                    None => None,
                };
                let source = match row.get::<_, String>(9)?.as_str() {
                    "ladder" => EntrySource::Ladder,
                    "roster" => EntrySource::Roster,
                    other => {
                        return Err(rusqlite::Error::FromSqlConversionFailure(
                            9,
                            Type::Text,
                            format!("unknown ladder entry source '{other}'").into(),
                        ))
                    }
                };
                Ok(LadderEntry {
                    rank: row.get(0)?,
                    raw_name: row.get(1)?,
                    matched_name: row.get(2)?,
                    score: from_sql(row.get(3)?),
                    stats,
                    source,
                    adjusted: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if entries.is_empty() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT line_no, line, reason FROM ladder_dropped
             WHERE invasion_id = ?1 ORDER BY line_no ASC",
        )?;
        let dropped = stmt
            .query_map(params![invasion], |row| {
                Ok(DroppedLine {
                    line_no: usize::try_from(row.get::<_, i64>(0)?).unwrap_or(0),
                    line: row.get(1)?,
                    reason: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Ladder::from_entries(invasion, entries).with_dropped(dropped)))
    }
}
