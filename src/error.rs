use thiserror::Error;

use crate::fixture::FixtureId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeasonError {
    #[error("gameweek {gameweek} still has {unplayed} unplayed fixture(s)")]
    GameweekIncomplete { gameweek: u32, unplayed: usize },

    #[error("fixture {0} not found")]
    FixtureNotFound(FixtureId),

    #[error("fixture {0} already has a result")]
    FixtureAlreadyPlayed(FixtureId),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("team already exists: {0}")]
    DuplicateTeam(String),

    #[error("a team cannot play itself: {0}")]
    SameTeam(String),

    #[error("gameweek must be positive, got {0}")]
    InvalidGameweek(u32),

    #[error("user fixture {fixture_id} must be played before the rest of the gameweek")]
    UserMatchPending { fixture_id: FixtureId },
}

impl SeasonError {
    /// Guard violations are expected during normal play; everything else is a caller bug.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SeasonError::GameweekIncomplete { .. }
                | SeasonError::UserMatchPending { .. }
                | SeasonError::FixtureAlreadyPlayed(_)
        )
    }
}
