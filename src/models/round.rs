//! Round: the teams drawn to play, the teams resting, and the matches.

use crate::models::game::{GameMatch, Winner};
use crate::models::player::PlayerId;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    #[default]
    Active,
    Completed,
}

/// Non-fatal conditions noticed while scheduling a round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ScheduleAnomaly {
    /// A playing team had no opponent and was left off the courts.
    UnpairedTeam { team: TeamId },
    /// The team rested in the previous round and rests again.
    ConsecutiveRest { team: TeamId },
    /// The player is in more than one playing team this round.
    PlayerDoubleBooked { player: PlayerId },
}

/// Summary computed once every match of a round is completed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStatistics {
    pub total_matches: usize,
    pub completed_matches: usize,
    pub total_points: u32,
    /// Average points per side per match, two decimals.
    pub average_score: f64,
    pub team_a_wins: usize,
    pub team_b_wins: usize,
    pub ties: usize,
}

impl RoundStatistics {
    pub fn from_matches(matches: &[GameMatch]) -> Self {
        let mut stats = Self {
            total_matches: matches.len(),
            ..Self::default()
        };
        for m in matches.iter().filter(|m| m.is_completed()) {
            stats.completed_matches += 1;
            stats.total_points += m.score_a.unwrap_or(0) + m.score_b.unwrap_or(0);
            match m.winner {
                Some(Winner::TeamA) => stats.team_a_wins += 1,
                Some(Winner::TeamB) => stats.team_b_wins += 1,
                Some(Winner::Tie) | None => stats.ties += 1,
            }
        }
        if stats.completed_matches > 0 {
            let avg = f64::from(stats.total_points) / (stats.completed_matches as f64 * 2.0);
            stats.average_score = (avg * 100.0).round() / 100.0;
        }
        stats
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub number: u32,
    /// Teams selected to play by the capacity split; `playing + resting` is the candidate list.
    /// A selected team left without an opponent is also listed in `unscheduled` and did not
    /// play. Use `teams_on_court` for the teams that actually have a match.
    pub playing: Vec<Team>,
    pub resting: Vec<Team>,
    /// Selected teams left without an opponent. Recorded as resting in the ledger.
    pub unscheduled: Vec<Team>,
    pub matches: Vec<GameMatch>,
    pub status: RoundStatus,
    pub anomalies: Vec<ScheduleAnomaly>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub statistics: Option<RoundStatistics>,
}

impl Round {
    pub fn is_completed(&self) -> bool {
        self.status == RoundStatus::Completed
    }

    /// Teams that have a match this round, in match order.
    pub fn teams_on_court(&self) -> impl Iterator<Item = &Team> {
        self.matches.iter().flat_map(|m| [&m.team_a, &m.team_b])
    }

    /// True when the round drew at least one team from the group.
    pub fn uses_group(&self, group_index: usize) -> bool {
        self.playing
            .iter()
            .chain(self.resting.iter())
            .any(|t| t.group_index() == group_index)
    }
}
