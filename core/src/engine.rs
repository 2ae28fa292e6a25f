//! The ladder engine: entry points for every operation.
//!
//! FLOW (one request, single-threaded, no shared mutable state):
//!   1. Validate the request at the boundary (request.rs).
//!   2. Load reference data fresh from the store (roster, invasion).
//!   3. Parse, match, validate (ladder.rs).
//!   4. Persist, replacing any earlier ladder for the invasion.
//!   5. Render the report.
//!
//! RULES:
//!   - The engine owns its store and config; nothing is global.
//!   - A roster snapshot is read-only for the length of one operation.
//!   - External calls are single-shot. There is no retry loop here.

use crate::{
    config::EngineConfig,
    error::{LadderError, LadderResult},
    invasion::Invasion,
    ladder::Ladder,
    matcher::NameMatcher,
    member::Member,
    report::{InvasionReport, MonthlyReport},
    request::{LadderKind, Request, Response},
    roster::Roster,
    source::{LadderSource, RosterSource},
    store::LadderStore,
};

pub struct LadderEngine {
    pub store: LadderStore,
    config:    EngineConfig,
}

impl LadderEngine {
    pub fn new(store: LadderStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// In-memory store, migrated, default config.
    pub fn build_test() -> LadderResult<Self> {
        let store = LadderStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(store, EngineConfig::default_test()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh roster snapshot.
    pub fn roster(&self) -> LadderResult<Roster> {
        let members = self.store.members()?;
        if members.is_empty() {
            log::info!("roster: no members found");
        }
        Roster::new(members, NameMatcher::new(&self.config.matcher))
    }

    // ── Reference data ─────────────────────────────────────────────

    pub fn enroll_member(&self, member: &Member) -> LadderResult<()> {
        log::info!("roster: enrolling {}", member.canonical_name);
        self.store.insert_member(member)
    }

    pub fn remove_member(&self, name: &str) -> LadderResult<bool> {
        let removed = self.store.delete_member(name)?;
        if !removed {
            log::warn!("roster: no member named {name} to remove");
        }
        Ok(removed)
    }

    /// Register (or re-register) an invasion.
    pub fn register_invasion(&self, invasion: &Invasion) -> LadderResult<()> {
        log::info!("invasion={} registering: {invasion}", invasion.id);
        self.store.upsert_invasion(invasion)
    }

    /// Delete an invasion together with its stored ladder.
    pub fn delete_invasion(&self, invasion_id: &str) -> LadderResult<bool> {
        let removed = self.store.delete_invasion(invasion_id)?;
        if removed {
            log::info!("invasion={invasion_id} deleted with its ladder");
        } else {
            log::warn!("invasion={invasion_id} not found, nothing deleted");
        }
        Ok(removed)
    }

    // ── Ladders and reports ────────────────────────────────────────

    /// Build the invasion's ladder from OCR text, store it in place of any
    /// earlier one, and report on it.
    pub fn process_ladder(
        &self,
        invasion_id: &str,
        text: &str,
        kind: LadderKind,
    ) -> LadderResult<InvasionReport> {
        let invasion = Invasion::from_table(invasion_id, &self.store)?;
        let roster = self.roster()?;
        log::debug!("invasion={invasion_id} processing {kind:?} text against {roster}");

        let ladder = match kind {
            LadderKind::Ladder => Ladder::from_text(&invasion.id, text, &roster, &self.config.ladder)?,
            LadderKind::Roster => Ladder::from_roster_text(&invasion.id, text, &roster)?,
        };
        self.store.save_ladder(&ladder)?;

        Ok(InvasionReport::from_invasion(&invasion, &ladder))
    }

    /// Report on the stored ladder of an invasion.
    pub fn invasion_report(&self, invasion_id: &str) -> LadderResult<InvasionReport> {
        let invasion = Invasion::from_table(invasion_id, &self.store)?;
        let ladder = self.ladder(&invasion.id)?;
        Ok(InvasionReport::from_invasion(&invasion, &ladder))
    }

    /// The stored ladder of an invasion, or `LadderNotFound`.
    pub fn ladder(&self, invasion_id: &str) -> LadderResult<Ladder> {
        self.store
            .ladder(invasion_id)?
            .ok_or_else(|| LadderError::LadderNotFound {
                invasion: invasion_id.to_string(),
            })
    }

    pub fn month_report(&self, month: u32, year: i32) -> LadderResult<MonthlyReport> {
        let roster = self.roster()?;
        MonthlyReport::from_invasion_stats(month, year, &self.store, &self.store, &roster)
    }

    /// Validate a boundary request and run it.
    pub fn dispatch(&self, request: Request) -> LadderResult<Response> {
        match request {
            Request::EnrollMember(req) => {
                let member = req.validate()?;
                self.enroll_member(&member)?;
                Ok(Response::Member(member))
            }
            Request::RemoveMember(req) => {
                let name = req.validate()?;
                let removed = self.remove_member(&name)?;
                Ok(Response::Removed { name, removed })
            }
            Request::RegisterInvasion(req) => {
                let invasion = req.validate()?;
                self.register_invasion(&invasion)?;
                Ok(Response::Invasion(invasion))
            }
            Request::DeleteInvasion(req) => {
                let invasion = req.validate()?;
                let removed = self.delete_invasion(&invasion)?;
                Ok(Response::InvasionDeleted { invasion, removed })
            }
            Request::ProcessLadder(req) => {
                let req = req.validate()?;
                let report = self.process_ladder(&req.invasion, &req.text, req.kind)?;
                Ok(invasion_response(report))
            }
            Request::InvasionReport(req) => {
                let id = req.validate()?;
                Ok(invasion_response(self.invasion_report(&id)?))
            }
            Request::MonthReport(req) => {
                let (month, year) = req.validate()?;
                let report = self.month_report(month, year)?;
                let text = report.to_string();
                Ok(Response::MonthReport { report, text })
            }
            Request::Roster(req) => {
                let faction = req.validate()?;
                let roster = self.roster()?;
                Ok(Response::Roster {
                    count: roster.count(),
                    text: roster.markdown(faction),
                })
            }
        }
    }
}

fn invasion_response(report: InvasionReport) -> Response {
    Response::InvasionReport {
        needs_attention: report.needs_attention(),
        text: report.to_string(),
        report,
    }
}
