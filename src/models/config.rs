//! Tournament configuration and advisory checks.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};

/// Settings that drive group formation and round scheduling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub courts_count: usize,
    /// Planned rounds. A corrective round adds one.
    pub total_rounds: u32,
    #[serde(default = "default_match_duration")]
    pub match_duration_minutes: u32,
    /// Seed for tie-breaks. Filled from the wall clock when a tournament is created without one.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_match_duration() -> u32 {
    25
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            courts_count: 4,
            total_rounds: 3,
            match_duration_minutes: default_match_duration(),
            rng_seed: None,
        }
    }
}

/// Configuration issues that do not block play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConfigAdvisory {
    /// More courts than `players / 4` simultaneous matches can fill.
    CourtsExceedCapacity { courts: usize, max_simultaneous: usize },
    /// More rounds than distinct partners each player can have.
    RoundsExceedDistinctPartners { rounds: u32, max_rounds: u32 },
}

/// Round count bounds for a roster size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundsRecommendation {
    pub min: u32,
    pub max: u32,
    pub recommended: u32,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), TournamentError> {
        if self.courts_count == 0 {
            return Err(TournamentError::InvalidConfig("courts_count must be at least 1".into()));
        }
        if self.total_rounds == 0 {
            return Err(TournamentError::InvalidConfig("total_rounds must be at least 1".into()));
        }
        if self.match_duration_minutes == 0 {
            return Err(TournamentError::InvalidConfig(
                "match_duration_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Non-fatal checks against a roster size. Each advisory is logged as a warning.
    pub fn advisories(&self, player_count: usize) -> Vec<ConfigAdvisory> {
        let mut out = Vec::new();
        let max_simultaneous = player_count / 4;
        if self.courts_count > max_simultaneous {
            log::warn!(
                "{} courts configured but {} players only fill {} at once",
                self.courts_count,
                player_count,
                max_simultaneous
            );
            out.push(ConfigAdvisory::CourtsExceedCapacity {
                courts: self.courts_count,
                max_simultaneous,
            });
        }
        let rec = recommended_rounds(player_count);
        if self.total_rounds > rec.max {
            log::warn!(
                "{} rounds planned but {} players allow at most {} distinct partners",
                self.total_rounds,
                player_count,
                rec.max
            );
            out.push(ConfigAdvisory::RoundsExceedDistinctPartners {
                rounds: self.total_rounds,
                max_rounds: rec.max,
            });
        }
        out
    }
}

/// Recommended round count: at least one, at most `players/2 - 1` distinct partners.
pub fn recommended_rounds(player_count: usize) -> RoundsRecommendation {
    let max = ((player_count / 2).saturating_sub(1)).max(1) as u32;
    let preferred = match player_count {
        0..=8 => 2,
        9..=16 => 3,
        n => (n / 6) as u32,
    };
    RoundsRecommendation {
        min: 1,
        max,
        recommended: preferred.clamp(1, max),
    }
}
