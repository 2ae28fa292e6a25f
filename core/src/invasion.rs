//! Invasion events: the unit every ladder and report is scoped to.

use crate::{
    error::{LadderError, LadderResult},
    source::InvasionSource,
    types::InvasionId,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Brightwood,
    BrimstoneSands,
    CutlassKeys,
    EbonscaleReach,
    Edengrove,
    Everfall,
    MonarchsBluff,
    Mourningdale,
    Reekwater,
    RestlessShore,
    WeaversFen,
    Windsward,
}

static SETTLEMENTS: [(Settlement, &str, &str); 12] = [
    (Settlement::Brightwood,     "bw", "Brightwood"),
    (Settlement::BrimstoneSands, "bs", "Brimstone Sands"),
    (Settlement::CutlassKeys,    "ck", "Cutlass Keys"),
    (Settlement::EbonscaleReach, "er", "Ebonscale Reach"),
    (Settlement::Edengrove,      "eg", "Edengrove"),
    (Settlement::Everfall,       "ef", "Everfall"),
    (Settlement::MonarchsBluff,  "mb", "Monarchs Bluff"),
    (Settlement::Mourningdale,   "md", "Mourningdale"),
    (Settlement::Reekwater,      "rw", "Reekwater"),
    (Settlement::RestlessShore,  "rs", "Restless Shore"),
    (Settlement::WeaversFen,     "wf", "Weavers Fen"),
    (Settlement::Windsward,      "ww", "Windsward"),
];

impl Settlement {
    fn row(&self) -> &'static (Settlement, &'static str, &'static str) {
        SETTLEMENTS
            .iter()
            .find(|(s, _, _)| s == self)
            .unwrap_or(&SETTLEMENTS[0])
    }

    /// Two-letter code used in invasion ids.
    pub fn code(&self) -> &'static str {
        self.row().1
    }

    pub fn display_name(&self) -> &'static str {
        self.row().2
    }
}

impl FromStr for Settlement {
    type Err = LadderError;

    fn from_str(code: &str) -> LadderResult<Self> {
        let code = code.trim().to_ascii_lowercase();
        SETTLEMENTS
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(s, _, _)| *s)
            .ok_or_else(|| {
                let valid: Vec<&str> = SETTLEMENTS.iter().map(|(_, c, _)| *c).collect();
                LadderError::invalid(format!(
                    "unknown settlement '{code}', valid codes: {}",
                    valid.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invasion {
    pub id:         InvasionId,
    pub date:       NaiveDate,
    pub settlement: Settlement,
    pub outcome:    Outcome,
    #[serde(default)]
    pub notes:      Option<String>,
}

impl Invasion {
    /// Create a new invasion, deriving its id from date and settlement.
    pub fn register(
        date: NaiveDate,
        settlement: Settlement,
        outcome: Outcome,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Self::id_for(date, settlement),
            date,
            settlement,
            outcome,
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }

    pub fn id_for(date: NaiveDate, settlement: Settlement) -> InvasionId {
        format!("{}-{}", date.format("%Y%m%d"), settlement.code())
    }

    /// Resolve an invasion by id, or fail with `InvasionNotFound`.
    pub fn from_table(id: &str, source: &dyn InvasionSource) -> LadderResult<Self> {
        source
            .invasion(id)?
            .ok_or_else(|| LadderError::InvasionNotFound { id: id.to_string() })
    }

    /// `YYYYMM`, used to key monthly reports.
    pub fn month_prefix(&self) -> String {
        format!("{}{:02}", self.date.year(), self.date.month())
    }

    pub fn in_month(&self, month: u32, year: i32) -> bool {
        self.date.month() == month && self.date.year() == year
    }

    pub fn markdown(&self) -> String {
        let mut msg = format!(
            "## Invasion {}\nSettlement: {}\nDate: {}\nOutcome: {}\n",
            self.id,
            self.settlement.display_name(),
            self.date,
            self.outcome
        );
        if let Some(notes) = &self.notes {
            msg.push_str(&format!("Notes: {notes}\n"));
        }
        msg
    }
}

impl fmt::Display for Invasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.id,
            self.settlement.code(),
            self.date.format("%Y%m%d"),
            self.outcome
        )?;
        if let Some(notes) = &self.notes {
            write!(f, ", {notes}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_derives_from_date_and_settlement() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let inv = Invasion::register(date, Settlement::Brightwood, Outcome::Win, None);
        assert_eq!(inv.id, "20240301-bw");
        assert_eq!(inv.month_prefix(), "202403");
        assert!(inv.in_month(3, 2024));
        assert!(!inv.in_month(4, 2024));
    }

    #[test]
    fn settlement_codes_round_trip() {
        for (s, code, _) in SETTLEMENTS {
            assert_eq!(code.parse::<Settlement>().unwrap(), s);
            assert_eq!(s.code(), code);
        }
        assert_eq!("RW".parse::<Settlement>().unwrap(), Settlement::Reekwater);
        assert!("zz".parse::<Settlement>().is_err());
    }

    #[test]
    fn blank_notes_are_dropped() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let inv = Invasion::register(date, Settlement::Everfall, Outcome::Loss, Some("  ".into()));
        assert_eq!(inv.notes, None);
        assert_eq!(inv.to_string(), "20240302-ef, ef, 20240302, loss");
        assert!(inv.markdown().contains("Settlement: Everfall"));
    }
}
