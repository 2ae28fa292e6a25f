//! Raw OCR text to ladder candidates.
//!
//! Each ladder row reads `rank  name  score`, optionally followed by the
//! five combat counters (`kills deaths assists heals damage`). Anything that
//! does not fit that shape comes back as a `MalformedLine`, never a hard
//! error: OCR output routinely carries headers, separators and half-read
//! glyphs. The caller decides which rejects are worth reporting.

use crate::types::{Rank, Score};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Glyphs OCR substitutes for digits in numeric columns.
const DIGIT_LOOKALIKES: [(char, char); 5] =
    [('o', '0'), ('O', '0'), ('l', '1'), ('I', '1'), ('|', '1')];

/// Number of trailing numeric columns on a full stats row.
const STATS_COLUMNS: usize = 6;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub kills:   u64,
    pub deaths:  u64,
    pub assists: u64,
    pub heals:   u64,
    pub damage:  u64,
}

impl Stats {
    pub fn accumulate(&mut self, other: &Stats) {
        self.kills += other.kills;
        self.deaths += other.deaths;
        self.assists += other.assists;
        self.heals += other.heals;
        self.damage += other.damage;
    }

    /// Field-wise maximum.
    pub fn max_with(&mut self, other: &Stats) {
        self.kills = self.kills.max(other.kills);
        self.deaths = self.deaths.max(other.deaths);
        self.assists = self.assists.max(other.assists);
        self.heals = self.heals.max(other.heals);
        self.damage = self.damage.max(other.damage);
    }
}

/// One unresolved ladder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub line_no:  usize,
    /// The trimmed source line.
    pub line:     String,
    pub rank:     Rank,
    pub raw_name: String,
    pub score:    Score,
    pub stats:    Option<Stats>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_no}: {reason}: {line:?}")]
pub struct MalformedLine {
    pub line_no: usize,
    pub line:    String,
    pub reason:  &'static str,
}

impl MalformedLine {
    /// Headers, separators and other lines with no digits at all. These are
    /// part of every screenshot and carry no player row.
    pub fn is_noise(&self) -> bool {
        !self.line.chars().any(|c| c.is_ascii_digit())
    }
}

/// Parser over one OCR text blob. Iteration is lazy and can be restarted
/// by calling [`LadderParser::lines`] again.
#[derive(Debug, Clone, Copy)]
pub struct LadderParser<'a> {
    text: &'a str,
}

impl<'a> LadderParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Every non-blank line, decoded or rejected, in input order.
    pub fn lines(&self) -> impl Iterator<Item = Result<Candidate, MalformedLine>> + 'a {
        self.text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| parse_line(i + 1, line))
    }
}

/// Recover an integer from an OCR'd numeric field: map digit look-alikes,
/// then keep only ASCII digits.
pub fn numeric(field: &str) -> Option<u64> {
    let digits: String = field
        .chars()
        .map(|c| {
            DIGIT_LOOKALIKES
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(0);
    }
    // Overflow means the field was noise, not a number.
    significant.parse().ok()
}

/// True when a token looks like a number column rather than part of a name.
fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| {
            c.is_ascii_digit()
                || c == ','
                || c == '.'
                || DIGIT_LOOKALIKES.iter().any(|(from, _)| *from == c)
        })
}

fn parse_line(line_no: usize, line: &str) -> Result<Candidate, MalformedLine> {
    let line = line.trim();
    let malformed = |reason| MalformedLine {
        line_no,
        line: line.to_string(),
        reason,
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(malformed("expected rank, name and score"));
    }

    let rank = numeric(tokens[0])
        .filter(|r| *r > 0)
        .and_then(|r| Rank::try_from(r).ok())
        .ok_or_else(|| malformed("rank is not a number"))?;

    let with_stats = tokens.len() >= STATS_COLUMNS + 2
        && tokens[tokens.len() - STATS_COLUMNS..]
            .iter()
            .all(|t| is_numeric_token(t));

    let (name_tokens, numbers) = if with_stats {
        tokens[1..].split_at(tokens.len() - 1 - STATS_COLUMNS)
    } else {
        tokens[1..].split_at(tokens.len() - 2)
    };

    let values = numbers
        .iter()
        .map(|t| numeric(t))
        .collect::<Option<Vec<u64>>>()
        .ok_or_else(|| malformed("score is not a number"))?;

    let stats = with_stats.then(|| Stats {
        kills:   values[1],
        deaths:  values[2],
        assists: values[3],
        heals:   values[4],
        damage:  values[5],
    });

    Ok(Candidate {
        line_no,
        line: line.to_string(),
        rank,
        raw_name: name_tokens.join(" "),
        score: values[0],
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(text: &str) -> Vec<Candidate> {
        LadderParser::new(text).lines().filter_map(Result::ok).collect()
    }

    #[test]
    fn numeric_recovers_ocr_noise() {
        assert_eq!(numeric("1,250"), Some(1250));
        assert_eq!(numeric("O7."), Some(7));
        assert_eq!(numeric("l2"), Some(12));
        assert_eq!(numeric("#3"), Some(3));
        assert_eq!(numeric("000"), Some(0));
        assert_eq!(numeric("Rank"), None);
        assert_eq!(numeric("99999999999999999999999"), None);
    }

    #[test]
    fn parses_simple_rows_with_multi_word_names() {
        let text = "1 Chatz01 1,200\n2  Dave the Farmer  980\n";
        let got = candidates(text);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].rank, 1);
        assert_eq!(got[0].raw_name, "Chatz01");
        assert_eq!(got[0].score, 1200);
        assert_eq!(got[1].raw_name, "Dave the Farmer");
        assert_eq!(got[1].score, 980);
        assert!(got[1].stats.is_none());
    }

    #[test]
    fn parses_full_stats_rows() {
        let text = "03 ZelOs 1,500 12 3 40 0 88,000";
        let got = candidates(text);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].raw_name, "ZelOs");
        assert_eq!(got[0].score, 1500);
        assert_eq!(
            got[0].stats,
            Some(Stats { kills: 12, deaths: 3, assists: 40, heals: 0, damage: 88000 })
        );
    }

    #[test]
    fn noise_lines_are_reported_not_fatal() {
        let text = "RANK PLAYER SCORE\n----\n\n1 fred 100\nx mary 90\n2 paul\n";
        let lines: Vec<_> = LadderParser::new(text).lines().collect();
        assert_eq!(lines.len(), 5, "blank line is skipped silently");
        let ok: Vec<_> = lines.iter().filter_map(|l| l.as_ref().ok()).collect();
        assert_eq!(ok.len(), 1);
        assert_eq!(ok[0].raw_name, "fred");
        let bad: Vec<_> = lines.iter().filter_map(|l| l.as_ref().err()).collect();
        assert_eq!(bad[0].line_no, 1);
        assert!(bad[0].is_noise());
        assert!(bad[1].is_noise());
        assert_eq!(bad[2].line_no, 5);
        assert_eq!(bad[2].reason, "rank is not a number");
        assert!(!bad[2].is_noise());
        assert!(!bad[3].is_noise());
    }

    #[test]
    fn parsing_is_restartable() {
        let parser = LadderParser::new("1 fred 100\n2 mary 90");
        let first: Vec<_> = parser.lines().collect();
        let second: Vec<_> = parser.lines().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rank_zero_is_rejected() {
        let got: Vec<_> = LadderParser::new("0 fred 100").lines().collect();
        assert!(got[0].is_err());
    }
}
