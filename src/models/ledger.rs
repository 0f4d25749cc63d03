//! Fairness ledgers: pairing history (anti-duplication) and rest history.

use crate::models::player::PlayerId;
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unordered pair of player ids. The smaller id is always stored first.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PairKey(PlayerId, PlayerId);

impl PairKey {
    pub fn new(a: PlayerId, b: PlayerId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn of_team(team: &Team) -> Self {
        Self::new(team.upper.id, team.lower.id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.0 == id || self.1 == id
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.0, self.1)
    }
}

impl FromStr for PairKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('+')
            .ok_or_else(|| format!("invalid pair key: {s}"))?;
        let a = Uuid::parse_str(a).map_err(|e| e.to_string())?;
        let b = Uuid::parse_str(b).map_err(|e| e.to_string())?;
        Ok(Self::new(a, b))
    }
}

impl From<PairKey> for String {
    fn from(key: PairKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PairKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Every partnership ever formed. Counted so that rolling back one group only removes that
/// group's contribution: a key reused by a later group survives the rollback of the later group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingHistory {
    counts: BTreeMap<PairKey, u32>,
}

impl PairingHistory {
    /// Number of distinct partnerships.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.counts.contains_key(key)
    }

    /// How many times this partnership has been formed.
    pub fn times_used(&self, key: &PairKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Partnerships formed more than once.
    pub fn reused(&self) -> impl Iterator<Item = &PairKey> {
        self.counts.iter().filter(|(_, n)| **n > 1).map(|(k, _)| k)
    }

    pub fn record(&mut self, key: PairKey) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn record_teams<'a>(&mut self, teams: impl IntoIterator<Item = &'a Team>) {
        for team in teams {
            self.record(PairKey::of_team(team));
        }
    }

    /// Remove one use of each team's partnership.
    pub fn rollback_teams<'a>(&mut self, teams: impl IntoIterator<Item = &'a Team>) {
        for team in teams {
            let key = PairKey::of_team(team);
            if let Some(n) = self.counts.get_mut(&key) {
                *n -= 1;
                if *n == 0 {
                    self.counts.remove(&key);
                }
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &PairKey> {
        self.counts.keys()
    }
}

/// Per-team rest summary (diagnostics).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRestStats {
    pub total_rests: usize,
    pub last_rest_round: Option<u32>,
    /// Longest run of rests in consecutive rounds.
    pub longest_streak: usize,
    pub rest_rounds: Vec<u32>,
}

/// Result of auditing team-level rest history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestAudit {
    pub has_consecutive_rests: bool,
    pub rest_distribution_delta: usize,
}

/// Rest history. Player entries hold group indices, team entries hold round numbers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RestLedger {
    pub players: BTreeMap<PlayerId, Vec<usize>>,
    pub teams: BTreeMap<TeamId, Vec<u32>>,
}

impl RestLedger {
    pub fn player_rests(&self, id: PlayerId) -> &[usize] {
        self.players.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn player_rested_in(&self, id: PlayerId, group_index: usize) -> bool {
        self.player_rests(id).contains(&group_index)
    }

    pub fn record_player_rest(&mut self, id: PlayerId, group_index: usize) {
        self.players.entry(id).or_default().push(group_index);
    }

    /// Drop every player rest recorded for a group.
    pub fn rollback_group(&mut self, group_index: usize) {
        for rests in self.players.values_mut() {
            rests.retain(|&g| g != group_index);
        }
        self.players.retain(|_, rests| !rests.is_empty());
    }

    pub fn team_rests(&self, id: TeamId) -> &[u32] {
        self.teams.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn team_rested_in(&self, id: TeamId, round: u32) -> bool {
        self.team_rests(id).contains(&round)
    }

    pub fn record_team_rest(&mut self, id: TeamId, round: u32) {
        let rests = self.teams.entry(id).or_default();
        if !rests.contains(&round) {
            rests.push(round);
        }
    }

    pub fn rest_statistics(&self) -> BTreeMap<TeamId, TeamRestStats> {
        self.teams
            .iter()
            .map(|(id, rounds)| {
                let mut sorted = rounds.clone();
                sorted.sort_unstable();
                let mut longest = 0;
                let mut run = 0;
                let mut prev: Option<u32> = None;
                for &r in &sorted {
                    run = match prev {
                        Some(p) if p + 1 == r => run + 1,
                        _ => 1,
                    };
                    longest = longest.max(run);
                    prev = Some(r);
                }
                let stats = TeamRestStats {
                    total_rests: sorted.len(),
                    last_rest_round: sorted.last().copied(),
                    longest_streak: longest,
                    rest_rounds: sorted,
                };
                (*id, stats)
            })
            .collect()
    }

    /// Consecutive-rest check and rest spread across the given teams.
    /// Teams that never rested count as zero rests.
    pub fn audit<'a>(&self, teams: impl IntoIterator<Item = &'a TeamId>) -> RestAudit {
        let stats = self.rest_statistics();
        let has_consecutive_rests = stats.values().any(|s| s.longest_streak > 1);
        let counts: Vec<usize> = teams
            .into_iter()
            .map(|id| stats.get(id).map_or(0, |s| s.total_rests))
            .collect();
        let delta = match (counts.iter().min(), counts.iter().max()) {
            (Some(min), Some(max)) => max - min,
            _ => 0,
        };
        if has_consecutive_rests {
            log::warn!("Rest audit: at least one team rested in consecutive rounds");
        }
        RestAudit {
            has_consecutive_rests,
            rest_distribution_delta: delta,
        }
    }
}
