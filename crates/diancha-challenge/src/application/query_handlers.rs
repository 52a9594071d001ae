//! Query handlers for the Challenge context.

use diancha_session::application::query_handlers::{SessionView, session_view};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{ChallengeOrchestrator, ChallengeState};
use crate::domain::events::EndReason;
use crate::domain::scoring::Rank;

/// Read-only view of a challenge round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeView {
    /// The challenge identifier.
    pub challenge_id: Uuid,
    /// Current phase.
    pub state: ChallengeState,
    /// Seconds left.
    pub time_remaining: u32,
    /// Points so far.
    pub score: u32,
    /// Why the round ended, once over.
    pub end_reason: Option<EndReason>,
    /// Rank title, once over.
    pub rank: Option<String>,
    /// The wrapped session.
    pub session: SessionView,
}

/// Builds the view of a challenge.
#[must_use]
pub fn challenge_view(challenge: &ChallengeOrchestrator) -> ChallengeView {
    ChallengeView {
        challenge_id: challenge.id(),
        state: challenge.state(),
        time_remaining: challenge.time_remaining(),
        score: challenge.score(),
        end_reason: challenge.end_reason(),
        rank: challenge.rank().map(|rank| Rank::title(rank).to_owned()),
        session: session_view(challenge.session()),
    }
}
