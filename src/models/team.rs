//! Cross-tier Team and its identifier.

use crate::models::player::{round_one_decimal, Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Team identifier: group index (0-based) and team number within the group (1-based).
/// Displayed and serialized as `G{group+1}T{number}`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TeamId {
    pub group: usize,
    pub number: usize,
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}T{}", self.group + 1, self.number)
    }
}

impl FromStr for TeamId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('G').ok_or_else(|| format!("invalid team id: {s}"))?;
        let (group, number) = rest
            .split_once('T')
            .ok_or_else(|| format!("invalid team id: {s}"))?;
        let group: usize = group.parse().map_err(|_| format!("invalid team id: {s}"))?;
        let number: usize = number.parse().map_err(|_| format!("invalid team id: {s}"))?;
        if group == 0 {
            return Err(format!("invalid team id: {s}"));
        }
        Ok(Self {
            group: group - 1,
            number,
        })
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TeamId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One Upper-tier and one Lower-tier player. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub upper: Player,
    pub lower: Player,
    /// Average of the two player scores, one decimal.
    pub score: f64,
}

impl Team {
    pub fn new(id: TeamId, upper: Player, lower: Player) -> Self {
        let score = round_one_decimal((upper.score + lower.score) / 2.0);
        Self {
            id,
            upper,
            lower,
            score,
        }
    }

    pub fn group_index(&self) -> usize {
        self.id.group
    }

    /// Display name: lower alias followed by upper alias.
    pub fn name(&self) -> String {
        format!("{} {}", self.lower.alias, self.upper.alias)
    }

    pub fn player_ids(&self) -> [PlayerId; 2] {
        [self.upper.id, self.lower.id]
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.upper.id == id || self.lower.id == id
    }
}
