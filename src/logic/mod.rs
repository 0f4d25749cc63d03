//! Scheduling engine: group formation, round scheduling, match lifecycle, fairness.

mod fairness;
mod matches;
mod pairing;
mod rounds;

pub use fairness::{
    add_extra_round, build_corrective_group, evaluate, evaluate_played, FairnessReport,
};
pub use matches::{complete_match, expire_match, pause_match, reset_match, start_match};
pub use pairing::{
    form_group, form_next_group, order_by_rest_priority, regenerate_group, PLAYERS_PER_COURT,
};
pub use rounds::{
    assign_courts, calculate_rest_rotation, create_ranking_matches, schedule_next_round,
    schedule_round, select_teams_for_round, RestRotation, TEAMS_PER_COURT,
};
