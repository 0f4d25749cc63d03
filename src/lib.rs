//! Partner tournament scheduler: library with models and scheduling logic.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    add_extra_round, complete_match, evaluate, evaluate_played, expire_match, form_group,
    form_next_group, pause_match, regenerate_group, reset_match, schedule_next_round,
    schedule_round, start_match, FairnessReport,
};
pub use models::{
    GameMatch, Group, MatchId, MatchResult, MatchResultSink, MatchStatus, PairKey,
    PairingHistory, Player, PlayerId, PlayerPool, RestLedger, Round, Team, TeamId, Tier,
    Tournament, TournamentConfig, TournamentError, TournamentId, TournamentSnapshot,
};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore, StoreError};
