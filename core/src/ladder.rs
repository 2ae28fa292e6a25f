//! One invasion's reconciled ladder.
//!
//! RULE: A Ladder is immutable once built. Entries are unique by rank and
//! kept in ascending rank order. Reprocessing an image builds a new Ladder
//! that replaces the stored one; ladders are never merged.

use crate::{
    config::LadderConfig,
    error::{LadderError, LadderResult},
    parser::{Candidate, LadderParser, MalformedLine, Stats},
    roster::Roster,
    types::{InvasionId, MemberName, Rank, Score},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Where an entry came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Scored ladder screenshot.
    Ladder,
    /// War roster screenshot: attendance only, no scores.
    Roster,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Ladder => "ladder",
            EntrySource::Roster => "roster",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LadderEntry {
    pub rank:         Rank,
    pub raw_name:     String,
    pub matched_name: Option<MemberName>,
    pub score:        Score,
    #[serde(default)]
    pub stats:        Option<Stats>,
    pub source:       EntrySource,
    /// Name needed partial matching, or the rank needed correcting.
    #[serde(default)]
    pub adjusted:     bool,
}

impl LadderEntry {
    /// Resolved name if there is one, else what OCR read.
    pub fn name(&self) -> &str {
        self.matched_name.as_deref().unwrap_or(&self.raw_name)
    }

    pub fn is_member(&self) -> bool {
        self.matched_name.is_some()
    }
}

/// A line of OCR text that looked like a player row but could not be used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DroppedLine {
    pub line_no: usize,
    pub line:    String,
    pub reason:  String,
}

impl From<MalformedLine> for DroppedLine {
    fn from(m: MalformedLine) -> Self {
        Self {
            line_no: m.line_no,
            line: m.line,
            reason: m.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ladder {
    invasion: InvasionId,
    entries:  Vec<LadderEntry>,
    #[serde(default)]
    dropped:  Vec<DroppedLine>,
}

impl Ladder {
    /// Build from a scored ladder screenshot's OCR text, resolving every
    /// name against `roster`. Unmatched names are kept.
    pub fn from_text(
        invasion: &str,
        text: &str,
        roster: &Roster,
        config: &LadderConfig,
    ) -> LadderResult<Self> {
        if text.trim().is_empty() {
            return Err(LadderError::EmptyLadder {
                invasion: invasion.to_string(),
            });
        }

        let mut entries: Vec<LadderEntry> = Vec::new();
        let mut dropped: Vec<DroppedLine> = Vec::new();
        for parsed in LadderParser::new(text).lines() {
            let candidate = match parsed {
                Ok(candidate) => candidate,
                Err(malformed) if malformed.is_noise() => {
                    log::debug!("invasion={invasion} ladder: ignoring {malformed}");
                    continue;
                }
                Err(malformed) => {
                    log::warn!("invasion={invasion} ladder: dropping {malformed}");
                    dropped.push(malformed.into());
                    continue;
                }
            };
            if config.drop_zero_scores && candidate.score == 0 {
                log::info!(
                    "invasion={invasion} ladder: skipping line {} ({}) as score is 0",
                    candidate.line_no,
                    candidate.raw_name
                );
                dropped.push(DroppedLine {
                    line_no: candidate.line_no,
                    line: candidate.line,
                    reason: "score is 0".to_string(),
                });
                continue;
            }
            let entry = resolve(invasion, &candidate, roster, config);
            if let Some(existing) = entries.iter().find(|e| e.rank == entry.rank) {
                log::warn!(
                    "invasion={invasion} ladder: duplicate rank {} for {}, keeping {}",
                    entry.rank,
                    entry.raw_name,
                    existing.raw_name
                );
                dropped.push(DroppedLine {
                    line_no: candidate.line_no,
                    line: candidate.line,
                    reason: format!("duplicate rank {}, kept {}", entry.rank, existing.name()),
                });
                continue;
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(LadderError::EmptyLadder {
                invasion: invasion.to_string(),
            });
        }

        let ladder = Self::from_entries(invasion, entries).with_dropped(dropped);
        log::info!("invasion={invasion} ladder: {ladder:#}");
        Ok(ladder)
    }

    /// Build from a war roster screenshot: one name per line, no scores.
    /// Only names that resolve to members are kept, ranked alphabetically.
    pub fn from_roster_text(invasion: &str, text: &str, roster: &Roster) -> LadderResult<Self> {
        let mut matched: BTreeSet<&str> = BTreeSet::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty()
                || line == ":"
                || line.starts_with("GROUP")
                || line.chars().all(|c| c.is_ascii_digit())
            {
                continue;
            }
            match roster.is_member(line, true) {
                Some(name) => {
                    matched.insert(name);
                }
                None => log::debug!("invasion={invasion} roster: no member matches {line:?}"),
            }
        }

        if matched.is_empty() {
            return Err(LadderError::EmptyLadder {
                invasion: invasion.to_string(),
            });
        }

        let entries = matched
            .into_iter()
            .zip(1..)
            .map(|(name, rank)| LadderEntry {
                rank,
                raw_name: name.to_string(),
                matched_name: Some(name.to_string()),
                score: 0,
                stats: None,
                source: EntrySource::Roster,
                adjusted: false,
            })
            .collect();
        Ok(Self::from_entries(invasion, entries))
    }

    /// Wrap already-resolved entries (e.g. loaded from the store).
    /// Sorts by rank; a repeated rank keeps its first entry.
    pub fn from_entries(invasion: &str, mut entries: Vec<LadderEntry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        entries.dedup_by_key(|e| e.rank);
        Self {
            invasion: invasion.to_string(),
            entries,
            dropped: Vec::new(),
        }
    }

    /// Attach the lines that were read but could not be used.
    pub fn with_dropped(mut self, mut dropped: Vec<DroppedLine>) -> Self {
        dropped.sort_by_key(|d| d.line_no);
        self.dropped = dropped;
        self
    }

    pub fn invasion(&self) -> &str {
        &self.invasion
    }

    pub fn entries(&self) -> &[LadderEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Distinct resolved members on this ladder.
    pub fn members(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.matched_name.as_deref())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// First rank missing from the run starting at 1, if any.
    pub fn first_missing_rank(&self) -> Option<Rank> {
        let mut expected: Rank = 1;
        for e in &self.entries {
            if e.rank != expected {
                return Some(expected);
            }
            expected += 1;
        }
        None
    }

    /// The first missing rank when coverage from rank 1 is broken,
    /// otherwise the entry count. Use [`Ladder::first_missing_rank`] to tell
    /// the two apart.
    pub fn contiguous_from_1_until(&self) -> Rank {
        self.first_missing_rank()
            .unwrap_or_else(|| Rank::try_from(self.entries.len()).unwrap_or(Rank::MAX))
    }

    pub fn is_contiguous(&self) -> bool {
        self.first_missing_rank().is_none()
    }

    pub fn entry(&self, rank: Rank) -> Option<&LadderEntry> {
        self.entries.iter().find(|e| e.rank == rank)
    }

    /// Entry for a member by canonical name.
    pub fn member(&self, canonical_name: &str) -> Option<&LadderEntry> {
        self.entries
            .iter()
            .find(|e| e.matched_name.as_deref() == Some(canonical_name))
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &LadderEntry> {
        self.entries.iter().filter(|e| e.matched_name.is_none())
    }

    /// Lines that looked like player rows but were dropped, in line order.
    pub fn dropped(&self) -> &[DroppedLine] {
        &self.dropped
    }

    /// Comma-separated `[rank] name` list; adjusted entries in `*italics*`.
    pub fn list(&self, members_only: bool) -> String {
        self.entries
            .iter()
            .filter(|e| !members_only || e.is_member())
            .map(|e| {
                let mark = if e.adjusted { "*" } else { "" };
                format!("{mark}[{:02}] {}{mark}", e.rank, e.name())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn csv(&self) -> String {
        let mut body = format!(
            "ladder for invasion {}\nrank,player,member,score,kills,deaths,assists,heals,damage,source,scan\n",
            self.invasion
        );
        for e in &self.entries {
            let s = e.stats.unwrap_or_default();
            body.push_str(&format!(
                "{:02},{},{},{},{},{},{},{},{},{},{}\n",
                e.rank,
                e.name(),
                e.is_member(),
                e.score,
                s.kills,
                s.deaths,
                s.assists,
                s.heals,
                s.damage,
                e.source.as_str(),
                if e.adjusted { "adjusted" } else { "ok" },
            ));
        }
        body
    }
}

fn resolve(
    invasion: &str,
    candidate: &Candidate,
    roster: &Roster,
    config: &LadderConfig,
) -> LadderEntry {
    let mut adjusted = false;

    let mut rank = candidate.rank;
    if rank > config.max_rank {
        // OCR runs the rank into the next glyph: 127 was 12.
        let mut fixed = rank;
        while fixed > config.max_rank {
            fixed /= 10;
        }
        log::info!("invasion={invasion} ladder: fixing rank {rank} to {fixed}");
        rank = fixed;
        adjusted = true;
    }

    let matched_name = roster.is_member(&candidate.raw_name, true);
    match matched_name {
        Some(name) if !roster.matcher().is_exact(&candidate.raw_name, name) => {
            log::debug!(
                "invasion={invasion} ladder: partial match {:?} -> {name}",
                candidate.raw_name
            );
            adjusted = true;
        }
        Some(_) => {}
        None => log::warn!(
            "invasion={invasion} ladder: unmatched name {:?} at rank {rank}",
            candidate.raw_name
        ),
    }

    LadderEntry {
        rank,
        raw_name: candidate.raw_name.clone(),
        matched_name: matched_name.map(str::to_string),
        score: candidate.score,
        stats: candidate.stats,
        source: EntrySource::Ladder,
        adjusted,
    }
}

impl fmt::Display for Ladder {
    /// `{}` renders one `rank name score` line per entry;
    /// `{:#}` gives a one-line summary.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return write!(
                f,
                "Ladder for invasion {} with {} rank(s) including {} member(s)",
                self.invasion,
                self.count(),
                self.members()
            );
        }
        for e in &self.entries {
            writeln!(f, "{:02}  {}  {}", e.rank, e.name(), e.score)?;
        }
        Ok(())
    }
}
