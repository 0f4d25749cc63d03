//! Data structures for the partner tournament: players, teams, groups, rounds, ledgers.

mod config;
mod game;
mod group;
mod ledger;
mod player;
mod pool;
mod round;
mod team;
mod tournament;

pub use config::{recommended_rounds, ConfigAdvisory, RoundsRecommendation, TournamentConfig};
pub use game::{GameMatch, MatchId, MatchResult, MatchResultSink, MatchStatus, Winner, MAX_MATCH_SCORE};
pub use group::{Group, GroupRepository};
pub use ledger::{PairKey, PairingHistory, RestAudit, RestLedger, TeamRestStats};
pub use player::{normalize_score, Player, PlayerId, Tier, SCORE_MAX, SCORE_MIN};
pub use pool::{PlayerPool, RankedPool};
pub use round::{Round, RoundStatistics, RoundStatus, ScheduleAnomaly};
pub use team::{Team, TeamId};
pub use tournament::{Tournament, TournamentError, TournamentId, TournamentSnapshot};
