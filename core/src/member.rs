//! Company members as known to the roster.

use crate::error::{LadderError, LadderResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Covenant,
    Marauders,
    Syndicate,
}

impl Faction {
    /// Fixed listing order for roster output.
    pub const ALL: [Faction; 3] = [Faction::Covenant, Faction::Marauders, Faction::Syndicate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Covenant  => "covenant",
            Faction::Marauders => "marauders",
            Faction::Syndicate => "syndicate",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Faction {
    type Err = LadderError;

    fn from_str(s: &str) -> LadderResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "covenant"  => Ok(Faction::Covenant),
            "marauders" => Ok(Faction::Marauders),
            "syndicate" => Ok(Faction::Syndicate),
            other => Err(LadderError::invalid(format!(
                "unknown faction '{other}', expected covenant, marauders or syndicate"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub canonical_name:  String,
    pub joined:          NaiveDate,
    pub faction:         Faction,
    pub is_admin:        bool,
    pub salary_eligible: bool,
    #[serde(default)]
    pub discord:         Option<String>,
    #[serde(default)]
    pub notes:           Option<String>,
}

impl Member {
    pub fn new(canonical_name: &str, joined: NaiveDate, faction: Faction) -> LadderResult<Self> {
        let canonical_name = canonical_name.trim();
        if canonical_name.is_empty() {
            return Err(LadderError::invalid("member name cannot be empty"));
        }
        Ok(Self {
            canonical_name: canonical_name.to_string(),
            joined,
            faction,
            is_admin: false,
            salary_eligible: false,
            discord: None,
            notes: None,
        })
    }

    /// Identity key for a member name: two names with the same key are the
    /// same member. Used by both the roster and the store's UNIQUE column.
    pub fn name_key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn markdown(&self) -> String {
        let mut msg = format!(
            "## Member {}\nFaction: {}\nJoined: {}\nAdmin: {}\nEarns salary: {}\n",
            self.canonical_name, self.faction, self.joined, self.is_admin, self.salary_eligible
        );
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.is_empty()) {
            msg.push_str(&format!("Notes: {notes}\n"));
        }
        msg
    }
}
