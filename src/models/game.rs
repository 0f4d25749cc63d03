//! Match (game) between two teams on a court, its lifecycle and the result record.

use crate::models::team::{Team, TeamId};
use crate::models::tournament::TournamentError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a match: `R{round}M{number}`.
pub type MatchId = String;

/// Highest score accepted for one side of a match.
pub const MAX_MATCH_SCORE: u32 = 50;

/// Lifecycle of a match. `Completed` is terminal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Active,
    Paused,
    Expired,
    Completed,
}

/// Which side won a completed match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    TeamA,
    TeamB,
    Tie,
}

/// A single match: two teams, one court.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    /// 1-based position within the round.
    pub number: usize,
    pub team_a: Team,
    pub team_b: Team,
    pub court: usize,
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub status: MatchStatus,
    pub winner: Option<Winner>,
    pub duration_minutes: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Record handed to the result sink when a match is completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub round: u32,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub score_a: u32,
    pub score_b: u32,
}

/// Downstream consumer of finalized scores (league points etc. live there, not here).
pub trait MatchResultSink {
    fn record(&mut self, result: &MatchResult);
}

impl MatchResultSink for Vec<MatchResult> {
    fn record(&mut self, result: &MatchResult) {
        self.push(result.clone());
    }
}

impl GameMatch {
    pub fn new(round: u32, number: usize, team_a: Team, team_b: Team, duration_minutes: u32) -> Self {
        Self {
            id: format!("R{round}M{number}"),
            round,
            number,
            team_a,
            team_b,
            court: 0,
            score_a: None,
            score_b: None,
            status: MatchStatus::Pending,
            winner: None,
            duration_minutes,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    fn invalid(&self, action: &'static str) -> TournamentError {
        if self.status == MatchStatus::Completed {
            TournamentError::MatchAlreadyFinalized(self.id.clone())
        } else {
            TournamentError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                action,
            }
        }
    }

    /// Pending | Paused -> Active. The start time is kept across a pause.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TournamentError> {
        match self.status {
            MatchStatus::Pending => {
                self.started_at = Some(now);
            }
            MatchStatus::Paused => {}
            MatchStatus::Active | MatchStatus::Expired | MatchStatus::Completed => {
                return Err(self.invalid("start"));
            }
        }
        self.status = MatchStatus::Active;
        Ok(())
    }

    /// Active -> Paused.
    pub fn pause(&mut self) -> Result<(), TournamentError> {
        match self.status {
            MatchStatus::Active => {
                self.status = MatchStatus::Paused;
                Ok(())
            }
            _ => Err(self.invalid("pause")),
        }
    }

    /// Active -> Expired (the host's countdown ran out).
    pub fn expire(&mut self) -> Result<(), TournamentError> {
        match self.status {
            MatchStatus::Active => {
                self.status = MatchStatus::Expired;
                Ok(())
            }
            _ => Err(self.invalid("expire")),
        }
    }

    /// Active | Paused | Expired -> Pending, clearing start time and scores.
    pub fn reset(&mut self) -> Result<(), TournamentError> {
        match self.status {
            MatchStatus::Active | MatchStatus::Paused | MatchStatus::Expired => {
                self.status = MatchStatus::Pending;
                self.started_at = None;
                self.score_a = None;
                self.score_b = None;
                Ok(())
            }
            MatchStatus::Pending | MatchStatus::Completed => Err(self.invalid("reset")),
        }
    }

    /// Any non-completed status -> Completed with final scores.
    pub fn complete(
        &mut self,
        score_a: u32,
        score_b: u32,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, TournamentError> {
        if self.status == MatchStatus::Completed {
            return Err(self.invalid("complete"));
        }
        for score in [score_a, score_b] {
            if score > MAX_MATCH_SCORE {
                return Err(TournamentError::InvalidMatchScore(score));
            }
        }
        self.score_a = Some(score_a);
        self.score_b = Some(score_b);
        self.winner = Some(match score_a.cmp(&score_b) {
            std::cmp::Ordering::Greater => Winner::TeamA,
            std::cmp::Ordering::Less => Winner::TeamB,
            std::cmp::Ordering::Equal => Winner::Tie,
        });
        self.status = MatchStatus::Completed;
        self.ended_at = Some(now);
        Ok(MatchResult {
            match_id: self.id.clone(),
            round: self.round,
            team_a: self.team_a.id,
            team_b: self.team_b.id,
            score_a,
            score_b,
        })
    }
}
