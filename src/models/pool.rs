//! PlayerPool: the active roster and its tier ranking.

use crate::models::player::{Player, PlayerId, Tier};
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Active roster, in load order. Load order is the stable tie-break when ranking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPool {
    pub players: Vec<Player>,
}

/// Pool split into tiers after ranking. Both lists are in descending score order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RankedPool {
    pub upper: Vec<Player>,
    pub lower: Vec<Player>,
}

impl RankedPool {
    pub fn tier_of(&self, id: PlayerId) -> Option<Tier> {
        if self.upper.iter().any(|p| p.id == id) {
            Some(Tier::Upper)
        } else if self.lower.iter().any(|p| p.id == id) {
            Some(Tier::Lower)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvPlayerRow {
    alias: String,
    name: String,
    score: f64,
}

impl PlayerPool {
    /// Build a pool from a roster. Fails on an empty roster or duplicate aliases.
    pub fn load(players: Vec<Player>) -> Result<Self, TournamentError> {
        if players.is_empty() {
            return Err(TournamentError::EmptyRoster);
        }
        let mut pool = Self::default();
        for player in players {
            pool.push(player)?;
        }
        Ok(pool)
    }

    /// Read a roster from CSV with an `alias,name,score` header.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, TournamentError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut players = Vec::new();
        for row in rdr.deserialize::<CsvPlayerRow>() {
            let row = row.map_err(|e| TournamentError::RosterImport(e.to_string()))?;
            players.push(Player::new(row.alias, row.name, row.score)?);
        }
        Self::load(players)
    }

    /// Append a player. Aliases are unique (case-insensitive) and must not be blank.
    pub fn push(&mut self, player: Player) -> Result<(), TournamentError> {
        let alias = player.alias.trim();
        if alias.is_empty() {
            return Err(TournamentError::InvalidAlias);
        }
        let is_duplicate = self
            .players
            .iter()
            .any(|p| p.alias.eq_ignore_ascii_case(alias) || p.id == player.id);
        if is_duplicate {
            return Err(TournamentError::DuplicateAlias(alias.to_string()));
        }
        self.players.push(player);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Rank descending by score (stable on load order) and split at the midpoint.
    /// The upper tier takes the extra player when the roster is odd.
    pub fn rank(&self) -> RankedPool {
        let mut sorted = self.players.clone();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        let midpoint = sorted.len().div_ceil(2);
        let lower = sorted.split_off(midpoint);
        RankedPool {
            upper: sorted,
            lower,
        }
    }
}
