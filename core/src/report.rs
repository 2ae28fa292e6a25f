//! Per-invasion and per-month reports.
//!
//! RULE: Reports never hide a problem. Unmatched names, rank gaps, dropped
//! OCR lines and skipped invasions are carried as warnings and rendered in the output;
//! only a missing invasion or an empty ladder is a hard failure, and those
//! surface as errors before a report exists.

use crate::{
    error::{LadderError, LadderResult},
    invasion::Invasion,
    ladder::{EntrySource, Ladder},
    parser::Stats,
    roster::Roster,
    source::{InvasionSource, LadderSource},
    types::{InvasionId, MemberName, Rank, Score},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ── Per-invasion report ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// Rank coverage from 1 breaks here; a screenshot is probably missing.
    IncompleteLadder { first_missing_rank: Rank },
    /// A line that read like a player row was not used.
    DroppedLine { line_no: usize, line: String, reason: String },
    /// No roster member matches this name, even partially.
    UnmatchedName { rank: Rank, raw_name: String },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::IncompleteLadder { first_missing_rank } => write!(
                f,
                "ladder may be incomplete starting at rank {first_missing_rank}"
            ),
            ReportWarning::DroppedLine { line_no, line, reason } => {
                write!(f, "line {line_no} dropped ({reason}): '{line}'")
            }
            ReportWarning::UnmatchedName { rank, raw_name } => {
                write!(f, "rank {rank}: '{raw_name}' is not on the roster")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvasionReport {
    pub invasion:         Invasion,
    pub entries:          usize,
    pub members:          usize,
    pub contiguous_until: Rank,
    pub warnings:         Vec<ReportWarning>,
    /// `[01] name` list of the members on the ladder.
    pub roll_call:        String,
    pub body:             String,
    /// The ladder as CSV, the per-invasion export.
    pub csv:              String,
}

impl InvasionReport {
    pub fn from_invasion(invasion: &Invasion, ladder: &Ladder) -> Self {
        let mut warnings = Vec::new();
        if let Some(first_missing_rank) = ladder.first_missing_rank() {
            log::warn!(
                "invasion={} report: ladder may be incomplete starting at rank {first_missing_rank}",
                invasion.id
            );
            warnings.push(ReportWarning::IncompleteLadder { first_missing_rank });
        }
        warnings.extend(ladder.dropped().iter().map(|d| ReportWarning::DroppedLine {
            line_no: d.line_no,
            line: d.line.clone(),
            reason: d.reason.clone(),
        }));
        warnings.extend(ladder.unmatched().map(|e| ReportWarning::UnmatchedName {
            rank: e.rank,
            raw_name: e.raw_name.clone(),
        }));

        Self {
            invasion: invasion.clone(),
            entries: ladder.count(),
            members: ladder.members(),
            contiguous_until: ladder.contiguous_from_1_until(),
            warnings,
            roll_call: ladder.list(true),
            body: ladder.to_string(),
            csv: ladder.csv(),
        }
    }

    /// Successful, but an operator should look at it.
    pub fn needs_attention(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl fmt::Display for InvasionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.invasion.markdown())?;
        writeln!(f, "- Ranks: {}", self.entries)?;
        writeln!(f, "- Members: {}", self.members)?;
        writeln!(f, "- Contiguous from rank 1 until: {}", self.contiguous_until)?;
        if !self.roll_call.is_empty() {
            writeln!(f, "- Roll call: {}", self.roll_call)?;
        }
        for w in &self.warnings {
            writeln!(f, "- **Warning:** {w}")?;
        }
        writeln!(f, "```")?;
        f.write_str(&self.body)?;
        writeln!(f, "```")
    }
}

// ── Monthly report ────────────────────────────────────────────────

/// One member's month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemberMonth {
    pub salary:     bool,
    /// Invasions this member was resolved on.
    pub invasions:  u32,
    pub wins:       u32,
    /// Of those, how many came from a scored ladder screenshot.
    pub ladders:    u32,
    pub sum_score:  Score,
    pub max_score:  Score,
    /// Combat counters summed over ladder rows; rows without them add zero.
    pub sum_stats:  Stats,
    pub max_stats:  Stats,
    pub best_rank:  Option<Rank>,
    pub sum_rank:   u64,
}

impl MemberMonth {
    /// Mean of a per-ladder sum, `None` when the member has no ladder rows.
    pub fn avg(&self, sum: u64) -> Option<f64> {
        (self.ladders > 0).then(|| sum as f64 / f64::from(self.ladders))
    }

    pub fn avg_score(&self) -> Option<f64> {
        self.avg(self.sum_score)
    }

    pub fn avg_rank(&self) -> Option<f64> {
        self.avg(self.sum_rank)
    }

    /// Per-ladder means of the combat counters, in `Stats` field order.
    pub fn avg_stats(&self) -> Option<[f64; 5]> {
        let s = &self.sum_stats;
        (self.ladders > 0).then(|| {
            [s.kills, s.deaths, s.assists, s.heals, s.damage]
                .map(|v| v as f64 / f64::from(self.ladders))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedInvasion {
    pub invasion: InvasionId,
    pub reason:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub month:                u32,
    pub year:                 i32,
    /// Invasions that contributed; skipped ones are not counted.
    pub invasions:            usize,
    pub per_member:           BTreeMap<MemberName, MemberMonth>,
    /// Sum over members of the invasions they appeared in.
    pub total_participation:  u32,
    /// Sum of wins over salary-eligible members.
    pub salary_participation: u32,
    pub skipped:              Vec<SkippedInvasion>,
}

impl MonthlyReport {
    /// Aggregate every ladder of every invasion in `month`/`year`.
    /// An invasion whose ladder can't be loaded is skipped and noted.
    pub fn from_invasion_stats(
        month: u32,
        year: i32,
        invasions: &dyn InvasionSource,
        ladders: &dyn LadderSource,
        roster: &Roster,
    ) -> LadderResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(LadderError::invalid(format!("month must be 1-12, got {month}")));
        }
        log::info!("month={year}{month:02} report: aggregating");

        let in_month = invasions.invasions_in_month(month, year)?;
        if in_month.is_empty() {
            log::info!("month={year}{month:02} report: no invasions found");
        }

        let mut report = Self {
            month,
            year,
            invasions: 0,
            per_member: BTreeMap::new(),
            total_participation: 0,
            salary_participation: 0,
            skipped: Vec::new(),
        };

        for invasion in &in_month {
            let ladder = match ladders.ladder(&invasion.id) {
                Ok(Some(ladder)) => ladder,
                Ok(None) => {
                    report.skip(invasion, "no ladder stored".to_string());
                    continue;
                }
                Err(e) => {
                    report.skip(invasion, e.to_string());
                    continue;
                }
            };
            report.add(invasion, &ladder, roster);
        }

        report.total_participation = report.per_member.values().map(|m| m.invasions).sum();
        report.salary_participation = report
            .per_member
            .values()
            .filter(|m| m.salary)
            .map(|m| m.wins)
            .sum();

        log::debug!(
            "month={year}{month:02} report: {} invasions, {} members, participation {}",
            report.invasions,
            report.per_member.len(),
            report.total_participation
        );
        Ok(report)
    }

    fn skip(&mut self, invasion: &Invasion, reason: String) {
        log::warn!(
            "month={} report: skipping invasion {}: {reason}",
            invasion.month_prefix(),
            invasion.id
        );
        self.skipped.push(SkippedInvasion {
            invasion: invasion.id.clone(),
            reason,
        });
    }

    fn add(&mut self, invasion: &Invasion, ladder: &Ladder, roster: &Roster) {
        self.invasions += 1;

        let names: BTreeSet<&str> = ladder
            .entries()
            .iter()
            .filter_map(|e| e.matched_name.as_deref())
            .collect();

        for name in names {
            let Some(entry) = ladder.member(name) else {
                continue;
            };
            let stats = self
                .per_member
                .entry(name.to_string())
                .or_insert_with(|| MemberMonth {
                    salary: roster.member(name).is_some_and(|m| m.salary_eligible),
                    ..MemberMonth::default()
                });

            stats.invasions += 1;
            if invasion.outcome.is_win() {
                stats.wins += 1;
            }
            if entry.source == EntrySource::Ladder {
                stats.ladders += 1;
                stats.sum_score += entry.score;
                stats.max_score = stats.max_score.max(entry.score);
                if let Some(row) = &entry.stats {
                    stats.sum_stats.accumulate(row);
                    stats.max_stats.max_with(row);
                }
                stats.sum_rank += u64::from(entry.rank);
                stats.best_rank = Some(stats.best_rank.map_or(entry.rank, |r| r.min(entry.rank)));
            }
        }
    }

    /// Canonical name → number of invasions the member appeared in.
    pub fn per_member_participation(&self) -> BTreeMap<&str, u32> {
        self.per_member
            .iter()
            .map(|(name, m)| (name.as_str(), m.invasions))
            .collect()
    }

    /// `YYYYMM`
    pub fn month_key(&self) -> String {
        format!("{}{:02}", self.year, self.month)
    }

    pub fn csv(&self) -> String {
        let mut body = String::from(concat!(
            "month,name,salary,invasions,ladders,wins,",
            "sum_score,sum_kills,sum_deaths,sum_assists,sum_heals,sum_damage,",
            "avg_score,avg_kills,avg_deaths,avg_assists,avg_heals,avg_damage,avg_rank,",
            "max_score,max_kills,max_deaths,max_assists,max_heals,max_damage,best_rank\n",
        ));
        let month = self.month_key();
        let decimal = |v: Option<f64>| v.map_or(String::new(), |v| format!("{v:.1}"));
        for (name, m) in &self.per_member {
            let (sum, max) = (&m.sum_stats, &m.max_stats);
            let avgs: Vec<String> = match m.avg_stats() {
                Some(avgs) => avgs.iter().map(|v| format!("{v:.1}")).collect(),
                None => vec![String::new(); 5],
            };
            body.push_str(&format!(
                "{month},{name},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
                m.salary,
                m.invasions,
                m.ladders,
                m.wins,
                m.sum_score,
                sum.kills,
                sum.deaths,
                sum.assists,
                sum.heals,
                sum.damage,
                decimal(m.avg_score()),
                avgs.join(","),
                decimal(m.avg_rank()),
                m.max_score,
                max.kills,
                max.deaths,
                max.assists,
                max.heals,
                max.damage,
                m.best_rank.map_or(String::new(), |r| r.to_string()),
            ));
        }
        body
    }
}

impl fmt::Display for MonthlyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Monthly report for {}", self.month_key())?;
        writeln!(f, "- Invasions: {}", self.invasions)?;
        writeln!(f, "- Active members (1 or more invasions): {}", self.per_member.len())?;
        writeln!(
            f,
            "- Participation (member appearances across invasions): {}",
            self.total_participation
        )?;
        writeln!(
            f,
            "- Salary participation (wins by salary-eligible members): {}",
            self.salary_participation
        )?;
        for s in &self.skipped {
            writeln!(f, "- **Skipped** {}: {}", s.invasion, s.reason)?;
        }
        Ok(())
    }
}
