//! Tournament state, its error type and the serializable snapshot.

use crate::models::config::{ConfigAdvisory, TournamentConfig};
use crate::models::game::{GameMatch, MatchId, MatchStatus};
use crate::models::group::GroupRepository;
use crate::models::ledger::{PairingHistory, RestLedger};
use crate::models::player::{Player, PlayerId};
use crate::models::pool::PlayerPool;
use crate::models::round::Round;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations. Each one is local to the failing call;
/// no state is changed when an operation returns an error.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TournamentError {
    #[error("Roster is empty")]
    EmptyRoster,
    #[error("Not enough players for cross-tier teams (upper: {upper}, lower: {lower})")]
    InsufficientPlayers { upper: usize, lower: usize },
    #[error("No group available to schedule round {round}")]
    NoGroupAvailable { round: u32 },
    #[error("Tournament complete: round {requested} exceeds the {planned} planned rounds")]
    TournamentComplete { requested: u32, planned: u32 },
    #[error("Round {requested} requested but the next round is {expected}")]
    RoundOutOfSequence { expected: u32, requested: u32 },
    #[error("Group {} not found", .0 + 1)]
    GroupNotFound(usize),
    #[error("Group {} can no longer be regenerated", .0 + 1)]
    GroupLocked(usize),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Match {0} is already finalized")]
    MatchAlreadyFinalized(MatchId),
    #[error("Cannot {action} match {id} while it is {from:?}")]
    InvalidTransition {
        id: MatchId,
        from: MatchStatus,
        action: &'static str,
    },
    #[error("Match score {0} is out of range")]
    InvalidMatchScore(u32),
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("Player is already part of a team")]
    PlayerLocked(PlayerId),
    #[error("Roster cannot be replaced once groups exist")]
    RosterLocked,
    #[error("A player with alias {0} already exists")]
    DuplicateAlias(String),
    #[error("Alias must not be empty")]
    InvalidAlias,
    #[error("Score {0} is out of range")]
    InvalidScore(f64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("No players need an extra round")]
    NothingToBalance,
    #[error("Roster import failed: {0}")]
    RosterImport(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Full mutable state of one tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub pool: PlayerPool,
    pub groups: GroupRepository,
    pub rounds: Vec<Round>,
    pub pairing_history: PairingHistory,
    pub rest_ledger: RestLedger,
}

/// Everything a host needs to persist and reload a tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub players: Vec<Player>,
    pub groups: GroupRepository,
    pub rounds: Vec<Round>,
    pub pairing_history: PairingHistory,
    pub rest_ledger: RestLedger,
}

impl Tournament {
    /// Create an empty tournament. A missing seed is taken from the wall clock and kept.
    pub fn new(mut config: TournamentConfig) -> Result<Self, TournamentError> {
        config.validate()?;
        if config.rng_seed.is_none() {
            let seed = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
            config.rng_seed = Some(seed);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            config,
            pool: PlayerPool::default(),
            groups: GroupRepository::default(),
            rounds: Vec::new(),
            pairing_history: PairingHistory::default(),
            rest_ledger: RestLedger::default(),
        })
    }

    /// Create a tournament with an initial roster.
    pub fn with_players(
        players: Vec<Player>,
        config: TournamentConfig,
    ) -> Result<Self, TournamentError> {
        let mut t = Self::new(config)?;
        t.load_roster(players)?;
        Ok(t)
    }

    /// Replace the roster. Only valid before any group exists. Returns the configuration
    /// advisories for the new roster size.
    pub fn load_roster(
        &mut self,
        players: Vec<Player>,
    ) -> Result<Vec<ConfigAdvisory>, TournamentError> {
        if !self.groups.is_empty() {
            return Err(TournamentError::RosterLocked);
        }
        self.pool = PlayerPool::load(players)?;
        Ok(self.advisories())
    }

    /// Non-fatal configuration warnings for the current roster.
    pub fn advisories(&self) -> Vec<ConfigAdvisory> {
        self.config.advisories(self.pool.len())
    }

    /// Add one player to the roster.
    pub fn add_player(
        &mut self,
        alias: impl Into<String>,
        name: impl Into<String>,
        score: f64,
    ) -> Result<PlayerId, TournamentError> {
        let player = Player::new(alias, name, score)?;
        let id = player.id;
        self.pool.push(player)?;
        Ok(id)
    }

    /// Remove a player who is not yet part of any team.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), TournamentError> {
        self.ensure_editable(player_id)?;
        self.pool.players.retain(|p| p.id != player_id);
        Ok(())
    }

    pub fn update_player_score(
        &mut self,
        player_id: PlayerId,
        score: f64,
    ) -> Result<(), TournamentError> {
        self.ensure_editable(player_id)?;
        self.pool
            .get_mut(player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?
            .set_score(score)
    }

    pub fn update_player_alias(
        &mut self,
        player_id: PlayerId,
        alias: impl Into<String>,
    ) -> Result<(), TournamentError> {
        self.ensure_editable(player_id)?;
        let alias = alias.into().trim().to_string();
        if alias.is_empty() {
            return Err(TournamentError::InvalidAlias);
        }
        let taken = self
            .pool
            .players
            .iter()
            .any(|p| p.id != player_id && p.alias.eq_ignore_ascii_case(&alias));
        if taken {
            return Err(TournamentError::DuplicateAlias(alias));
        }
        self.pool
            .get_mut(player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?
            .alias = alias;
        Ok(())
    }

    fn ensure_editable(&self, player_id: PlayerId) -> Result<(), TournamentError> {
        if self.pool.get(player_id).is_none() {
            return Err(TournamentError::PlayerNotFound(player_id));
        }
        if self.groups.references_player(player_id) {
            return Err(TournamentError::PlayerLocked(player_id));
        }
        Ok(())
    }

    /// Tie-break source for one formation of a group. Same seed, index and generation always
    /// give the same sequence.
    pub fn rng_for_group(&self, group_index: usize, generation: u32) -> StdRng {
        let seed = self.config.rng_seed.unwrap_or_default();
        let stream = u64::from(generation).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        StdRng::seed_from_u64(seed.wrapping_add(group_index as u64) ^ stream)
    }

    /// Number the next scheduled round will get.
    pub fn next_round_number(&self) -> u32 {
        self.rounds.len() as u32 + 1
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn find_match(&self, match_id: &str) -> Option<&GameMatch> {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .find(|m| m.id == match_id)
    }

    /// Back to an unscheduled tournament with the same roster and configuration.
    pub fn restart(&mut self) {
        self.groups = GroupRepository::default();
        self.rounds.clear();
        self.pairing_history = PairingHistory::default();
        self.rest_ledger = RestLedger::default();
    }

    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot {
            id: self.id,
            config: self.config.clone(),
            players: self.pool.players.clone(),
            groups: self.groups.clone(),
            rounds: self.rounds.clone(),
            pairing_history: self.pairing_history.clone(),
            rest_ledger: self.rest_ledger.clone(),
        }
    }

    pub fn from_snapshot(snapshot: TournamentSnapshot) -> Self {
        Self {
            id: snapshot.id,
            config: snapshot.config,
            pool: PlayerPool {
                players: snapshot.players,
            },
            groups: snapshot.groups,
            rounds: snapshot.rounds,
            pairing_history: snapshot.pairing_history,
            rest_ledger: snapshot.rest_ledger,
        }
    }
}
