//! The roster: known members in enrollment order, with OCR-tolerant lookup.
//!
//! RULE: Lookups never depend on hash iteration order. Ties go to the
//! earliest member in enrollment order.

use crate::{
    error::{LadderError, LadderResult},
    matcher::{is_prefix_match, NameMatcher},
    member::{Faction, Member},
};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Roster {
    members:    Vec<Member>,
    normalized: Vec<String>,
    matcher:    NameMatcher,
}

impl Roster {
    /// Build a roster. Rejects two members whose names differ only by case.
    pub fn new(members: Vec<Member>, matcher: NameMatcher) -> LadderResult<Self> {
        let mut seen = BTreeSet::new();
        for m in &members {
            if !seen.insert(Member::name_key(&m.canonical_name)) {
                return Err(LadderError::DuplicateMember {
                    name: m.canonical_name.clone(),
                });
            }
        }
        let normalized = members
            .iter()
            .map(|m| matcher.normalize(&m.canonical_name))
            .collect();
        Ok(Self { members, normalized, matcher })
    }

    /// Returns the canonical name of the member `candidate` refers to.
    ///
    /// Exact mode compares normalized forms. Partial mode first tries an
    /// exact match across the whole roster, then accepts a roster name when
    /// either normalized form is a prefix of the other (OCR truncation).
    pub fn is_member(&self, candidate: &str, partial: bool) -> Option<&str> {
        let wanted = self.matcher.normalize(candidate);
        if wanted.is_empty() {
            return None;
        }
        let exact = self.normalized.iter().position(|n| *n == wanted);
        let found = match exact {
            Some(i) => Some(i),
            None if partial => self
                .normalized
                .iter()
                .position(|n| is_prefix_match(&wanted, n)),
            None => None,
        };
        found.map(|i| self.members[i].canonical_name.as_str())
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// Look up a member by canonical name (no fuzzing).
    pub fn member(&self, canonical_name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.canonical_name == canonical_name)
    }

    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    fn by_faction(&self, faction: Option<Faction>) -> impl Iterator<Item = &Member> {
        Faction::ALL
            .into_iter()
            .filter(move |f| faction.map_or(true, |want| want == *f))
            .flat_map(move |f| self.members.iter().filter(move |m| m.faction == f))
    }

    pub fn csv(&self) -> String {
        let mut body = String::from("player,faction,start,admin,salary\n");
        for m in self.by_faction(None) {
            body.push_str(&format!(
                "{},{},{},{},{}\n",
                m.canonical_name,
                m.faction,
                m.joined.format("%Y%m%d"),
                m.is_admin,
                m.salary_eligible
            ));
        }
        body
    }

    pub fn markdown(&self, faction: Option<Faction>) -> String {
        let mut body = match faction {
            Some(f) => format!("# Member List for {f}\n"),
            None => "# Member List\n".to_string(),
        };
        let mut count = 0;
        for m in self.by_faction(faction) {
            body.push_str(&format!(
                "- {} ({}) joined {}\n",
                m.canonical_name, m.faction, m.joined
            ));
            count += 1;
        }
        body.push_str(&format!("\nCount: {count}\n"));
        body
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Roster(count={})", self.members.len())
    }
}
