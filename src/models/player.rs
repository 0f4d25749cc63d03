//! Player, Tier and score bounds.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in teams, ledgers and lookups).
pub type PlayerId = Uuid;

/// Lowest accepted player score.
pub const SCORE_MIN: f64 = 0.5;
/// Highest accepted player score.
pub const SCORE_MAX: f64 = 5.0;

/// Skill half a player falls into when the pool is ranked.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Upper,
    Lower,
}

/// A player in the roster. Tier is not stored: it is derived from the pool ranking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Short display alias, unique within the roster (case-insensitive).
    pub alias: String,
    pub name: String,
    /// Skill score in `SCORE_MIN..=SCORE_MAX`, one decimal.
    pub score: f64,
}

impl Player {
    /// Create a player with a fresh id. Fails with `InvalidScore` outside the accepted range.
    pub fn new(
        alias: impl Into<String>,
        name: impl Into<String>,
        score: f64,
    ) -> Result<Self, TournamentError> {
        Ok(Self {
            id: Uuid::new_v4(),
            alias: alias.into().trim().to_string(),
            name: name.into().trim().to_string(),
            score: normalize_score(score)?,
        })
    }

    /// Replace the score (validated and rounded to one decimal).
    pub fn set_score(&mut self, score: f64) -> Result<(), TournamentError> {
        self.score = normalize_score(score)?;
        Ok(())
    }
}

/// Validate a score against the bounds and round it to one decimal.
pub fn normalize_score(score: f64) -> Result<f64, TournamentError> {
    if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(TournamentError::InvalidScore(score));
    }
    Ok(round_one_decimal(score))
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
