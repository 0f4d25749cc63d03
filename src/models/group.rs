//! Group (a batch of cross-tier teams) and the append-only GroupRepository.

use crate::models::ledger::PairKey;
use crate::models::player::PlayerId;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Teams formed together in one pass, plus the players left out of that pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Position in the repository (0-based).
    pub index: usize,
    pub teams: Vec<Team>,
    /// Players not placed into a team for this group.
    pub resting: Vec<PlayerId>,
    /// Partnerships that had to be reused because no unused partner was left.
    pub reused_pairings: Vec<PairKey>,
    /// Set when the group is appended to the repository.
    pub created_at: Option<DateTime<Utc>>,
    /// Extra group synthesized to even out match counts.
    pub corrective: bool,
    /// Players a corrective group was built around.
    #[serde(default)]
    pub priority_players: Vec<PlayerId>,
    /// Bumped on every regenerate so the tie-break stream differs.
    #[serde(default)]
    pub generation: u32,
}

impl Group {
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }
}

/// Ordered history of groups. Source of truth for which teams exist.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRepository {
    groups: Vec<Group>,
}

impl GroupRepository {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Index the next appended group will receive.
    pub fn next_index(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn latest(&self) -> Option<&Group> {
        self.groups.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.groups.iter().flat_map(|g| g.teams.iter())
    }

    pub fn find_team(&self, id: TeamId) -> Option<&Team> {
        self.groups.get(id.group).and_then(|g| g.team(id))
    }

    /// True when any team in any group includes the player.
    pub fn references_player(&self, id: PlayerId) -> bool {
        self.teams().any(|t| t.has_player(id))
    }

    /// Stamp and append. The group's index must be the next free index.
    pub(crate) fn append(&mut self, mut group: Group) -> &Group {
        debug_assert_eq!(group.index, self.groups.len());
        group.created_at = Some(Utc::now());
        self.groups.push(group);
        &self.groups[self.groups.len() - 1]
    }

    /// Swap the teams of an existing group (regenerate). Returns the replaced group.
    pub(crate) fn replace(&mut self, mut group: Group) -> Option<Group> {
        let slot = self.groups.get_mut(group.index)?;
        group.created_at = Some(Utc::now());
        Some(std::mem::replace(slot, group))
    }
}
