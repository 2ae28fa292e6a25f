//! Validated request and response shapes at the engine boundary.
//!
//! RULE: Payloads are checked here, before the engine sees them.
//! Unknown fields and out-of-range values are rejected with
//! `InvalidRequest`.

use crate::{
    error::{LadderError, LadderResult},
    invasion::{Invasion, Outcome, Settlement},
    member::{Faction, Member},
    report::{InvasionReport, MonthlyReport},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which kind of screenshot the OCR text came from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LadderKind {
    #[default]
    Ladder,
    Roster,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    EnrollMember(EnrollMember),
    RemoveMember(RemoveMember),
    RegisterInvasion(RegisterInvasion),
    DeleteInvasion(DeleteInvasion),
    ProcessLadder(ProcessLadder),
    InvasionReport(InvasionReportRequest),
    MonthReport(MonthReportRequest),
    Roster(RosterRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrollMember {
    pub name:    String,
    pub joined:  NaiveDate,
    pub faction: String,
    #[serde(default)]
    pub admin:   bool,
    #[serde(default)]
    pub salary:  bool,
    #[serde(default)]
    pub discord: Option<String>,
    #[serde(default)]
    pub notes:   Option<String>,
}

impl EnrollMember {
    pub fn validate(self) -> LadderResult<Member> {
        let faction: Faction = self.faction.parse()?;
        let mut member = Member::new(&self.name, self.joined, faction)?;
        member.is_admin = self.admin;
        member.salary_eligible = self.salary;
        member.discord = self.discord.filter(|d| !d.trim().is_empty());
        member.notes = self.notes.filter(|n| !n.trim().is_empty());
        Ok(member)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveMember {
    pub name: String,
}

impl RemoveMember {
    pub fn validate(self) -> LadderResult<String> {
        non_empty("name", self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterInvasion {
    pub day:        u32,
    pub month:      u32,
    pub year:       i32,
    pub settlement: String,
    pub win:        bool,
    #[serde(default)]
    pub notes:      Option<String>,
}

impl RegisterInvasion {
    pub fn validate(self) -> LadderResult<Invasion> {
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or_else(|| {
            LadderError::invalid(format!(
                "no such date {:04}-{:02}-{:02}",
                self.year, self.month, self.day
            ))
        })?;
        let settlement: Settlement = self.settlement.parse()?;
        let outcome = if self.win { Outcome::Win } else { Outcome::Loss };
        Ok(Invasion::register(date, settlement, outcome, self.notes))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteInvasion {
    pub invasion: String,
}

impl DeleteInvasion {
    pub fn validate(self) -> LadderResult<String> {
        non_empty("invasion", self.invasion)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessLadder {
    pub invasion: String,
    /// Raw OCR text. Emptiness is the engine's call (`EmptyLadder`).
    pub text:     String,
    #[serde(default)]
    pub kind:     LadderKind,
}

impl ProcessLadder {
    pub fn validate(self) -> LadderResult<Self> {
        let invasion = non_empty("invasion", self.invasion)?;
        Ok(Self { invasion, ..self })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvasionReportRequest {
    pub invasion: String,
}

impl InvasionReportRequest {
    pub fn validate(self) -> LadderResult<String> {
        non_empty("invasion", self.invasion)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonthReportRequest {
    pub month: u32,
    pub year:  i32,
}

impl MonthReportRequest {
    pub fn validate(self) -> LadderResult<(u32, i32)> {
        if !(1..=12).contains(&self.month) {
            return Err(LadderError::invalid(format!(
                "month must be 1-12, got {}",
                self.month
            )));
        }
        if !(2020..=9999).contains(&self.year) {
            return Err(LadderError::invalid(format!(
                "year must be 2020 or later, got {}",
                self.year
            )));
        }
        Ok((self.month, self.year))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterRequest {
    #[serde(default)]
    pub faction: Option<String>,
}

impl RosterRequest {
    pub fn validate(self) -> LadderResult<Option<Faction>> {
        self.faction.as_deref().map(str::parse).transpose()
    }
}

fn non_empty(field: &str, value: String) -> LadderResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LadderError::invalid(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Member(Member),
    Removed { name: String, removed: bool },
    Invasion(Invasion),
    InvasionDeleted { invasion: String, removed: bool },
    InvasionReport {
        report: InvasionReport,
        needs_attention: bool,
        text: String,
    },
    MonthReport { report: MonthlyReport, text: String },
    Roster { count: usize, text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_requests_deserialize() {
        let req: Request = serde_json::from_str(
            r#"{"type":"register_invasion","day":1,"month":3,"year":2024,"settlement":"BW","win":true}"#,
        )
        .unwrap();
        let Request::RegisterInvasion(r) = req else {
            panic!("wrong variant");
        };
        let inv = r.validate().unwrap();
        assert_eq!(inv.id, "20240301-bw");
        assert_eq!(inv.outcome, Outcome::Win);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<Request, _> = serde_json::from_str(
            r#"{"type":"month_report","month":3,"year":2024,"gold":100}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn impossible_dates_and_months_are_invalid() {
        let r = RegisterInvasion {
            day: 31,
            month: 2,
            year: 2024,
            settlement: "bw".into(),
            win: false,
            notes: None,
        };
        assert!(matches!(r.validate(), Err(LadderError::InvalidRequest { .. })));

        let m = MonthReportRequest { month: 13, year: 2024 };
        assert!(matches!(m.validate(), Err(LadderError::InvalidRequest { .. })));
    }

    #[test]
    fn enroll_member_checks_faction_and_name() {
        let json = r#"{"name":" Chatz01 ","joined":"2024-01-15","faction":"Syndicate","salary":true}"#;
        let req: EnrollMember = serde_json::from_str(json).unwrap();
        let m = req.validate().unwrap();
        assert_eq!(m.canonical_name, "Chatz01");
        assert_eq!(m.faction, Faction::Syndicate);
        assert!(m.salary_eligible);

        let bad = EnrollMember {
            name: "x".into(),
            joined: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            faction: "pirates".into(),
            admin: false,
            salary: false,
            discord: None,
            notes: None,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn blank_invasion_id_is_invalid() {
        let p = ProcessLadder {
            invasion: "  ".into(),
            text: "1 fred 10".into(),
            kind: LadderKind::Ladder,
        };
        assert!(p.validate().is_err());
    }
}
