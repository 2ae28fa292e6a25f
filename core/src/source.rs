//! Reference-data collaborators the engine looks things up from.
//!
//! RULE: The engine never reaches for storage directly; it is handed
//! something implementing these traits. `LadderStore` is the SQLite one.

use crate::{error::LadderResult, invasion::Invasion, ladder::Ladder, member::Member};

pub trait InvasionSource {
    /// `Ok(None)` when no invasion has this id.
    fn invasion(&self, id: &str) -> LadderResult<Option<Invasion>>;

    /// Invasions dated in the given month, ordered by date then id.
    fn invasions_in_month(&self, month: u32, year: i32) -> LadderResult<Vec<Invasion>>;
}

pub trait LadderSource {
    /// `Ok(None)` when no ladder has been stored for the invasion.
    fn ladder(&self, invasion: &str) -> LadderResult<Option<Ladder>>;
}

pub trait RosterSource {
    /// Current members in enrollment order.
    fn members(&self) -> LadderResult<Vec<Member>>;
}
