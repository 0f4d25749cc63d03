//! Integration tests for the match lifecycle and round completion.

use partner_tournament::logic::{
    complete_match, expire_match, form_next_group, pause_match, reset_match, schedule_next_round,
    start_match,
};
use partner_tournament::models::{RoundStatus, Winner};
use partner_tournament::{
    MatchResult, MatchStatus, Player, Tournament, TournamentConfig, TournamentError,
};

fn scheduled_tournament() -> Tournament {
    let roster: Vec<Player> = (0..16)
        .map(|i| Player::new(format!("P{i}"), format!("Player {i}"), 5.0 - 0.2 * i as f64).unwrap())
        .collect();
    let config = TournamentConfig {
        courts_count: 4,
        total_rounds: 3,
        match_duration_minutes: 20,
        rng_seed: Some(7),
    };
    let mut t = Tournament::with_players(roster, config).unwrap();
    form_next_group(&mut t).unwrap();
    schedule_next_round(&mut t).unwrap();
    t
}

#[test]
fn new_matches_are_pending() {
    let t = scheduled_tournament();
    let m = t.find_match("R1M1").unwrap();
    assert_eq!(m.status, MatchStatus::Pending);
    assert_eq!(m.duration_minutes, 20);
    assert!(m.score_a.is_none() && m.started_at.is_none());
}

#[test]
fn pause_keeps_start_time() {
    let mut t = scheduled_tournament();
    start_match(&mut t, "R1M1").unwrap();
    let started = t.find_match("R1M1").unwrap().started_at;
    assert!(started.is_some());

    pause_match(&mut t, "R1M1").unwrap();
    assert_eq!(t.find_match("R1M1").unwrap().status, MatchStatus::Paused);
    start_match(&mut t, "R1M1").unwrap();
    let m = t.find_match("R1M1").unwrap();
    assert_eq!(m.status, MatchStatus::Active);
    assert_eq!(m.started_at, started);
}

#[test]
fn expired_match_can_be_reset_or_scored() {
    let mut t = scheduled_tournament();
    start_match(&mut t, "R1M1").unwrap();
    expire_match(&mut t, "R1M1").unwrap();
    assert!(matches!(
        start_match(&mut t, "R1M1"),
        Err(TournamentError::InvalidTransition {
            from: MatchStatus::Expired,
            action: "start",
            ..
        })
    ));

    reset_match(&mut t, "R1M1").unwrap();
    let m = t.find_match("R1M1").unwrap();
    assert_eq!(m.status, MatchStatus::Pending);
    assert!(m.started_at.is_none());

    start_match(&mut t, "R1M2").unwrap();
    expire_match(&mut t, "R1M2").unwrap();
    let mut results: Vec<MatchResult> = Vec::new();
    complete_match(&mut t, "R1M2", 12, 9, &mut results).unwrap();
    assert_eq!(t.find_match("R1M2").unwrap().status, MatchStatus::Completed);
}

#[test]
fn illegal_transitions_are_rejected() {
    let mut t = scheduled_tournament();
    assert!(matches!(
        pause_match(&mut t, "R1M1"),
        Err(TournamentError::InvalidTransition {
            from: MatchStatus::Pending,
            ..
        })
    ));
    assert!(matches!(
        reset_match(&mut t, "R1M1"),
        Err(TournamentError::InvalidTransition { .. })
    ));
    assert!(matches!(
        start_match(&mut t, "R9M9"),
        Err(TournamentError::MatchNotFound(_))
    ));
}

#[test]
fn completed_match_is_final_and_reaches_the_sink() {
    let mut t = scheduled_tournament();
    let mut results: Vec<MatchResult> = Vec::new();
    let result = complete_match(&mut t, "R1M1", 21, 15, &mut results).unwrap();
    assert_eq!(results, vec![result.clone()]);
    assert_eq!(result.round, 1);

    let m = t.find_match("R1M1").unwrap();
    assert_eq!(m.winner, Some(Winner::TeamA));
    assert_eq!(m.team_a.id, result.team_a);
    assert!(m.ended_at.is_some());

    assert!(matches!(
        complete_match(&mut t, "R1M1", 1, 2, &mut results),
        Err(TournamentError::MatchAlreadyFinalized(_))
    ));
    assert!(matches!(
        start_match(&mut t, "R1M1"),
        Err(TournamentError::MatchAlreadyFinalized(_))
    ));
    assert_eq!(results.len(), 1);
}

#[test]
fn scores_above_the_limit_are_rejected() {
    let mut t = scheduled_tournament();
    let mut results: Vec<MatchResult> = Vec::new();
    assert!(matches!(
        complete_match(&mut t, "R1M1", 51, 3, &mut results),
        Err(TournamentError::InvalidMatchScore(51))
    ));
    let m = t.find_match("R1M1").unwrap();
    assert_eq!(m.status, MatchStatus::Pending);
    assert!(m.score_a.is_none());
    assert!(results.is_empty());
}

#[test]
fn round_closes_when_every_match_is_completed() {
    let mut t = scheduled_tournament();
    let mut results: Vec<MatchResult> = Vec::new();
    let scores = [("R1M1", 21, 15), ("R1M2", 10, 10), ("R1M3", 5, 21), ("R1M4", 30, 28)];
    for (id, a, b) in &scores[..3] {
        complete_match(&mut t, id, *a, *b, &mut results).unwrap();
    }
    assert_eq!(t.current_round().unwrap().status, RoundStatus::Active);
    assert!(t.current_round().unwrap().statistics.is_none());

    complete_match(&mut t, "R1M4", 30, 28, &mut results).unwrap();
    let round = t.current_round().unwrap();
    assert_eq!(round.status, RoundStatus::Completed);
    assert!(round.completed_at.is_some());

    let stats = round.statistics.as_ref().unwrap();
    assert_eq!(stats.total_matches, 4);
    assert_eq!(stats.completed_matches, 4);
    assert_eq!(stats.total_points, 140);
    assert_eq!(stats.average_score, 17.5);
    assert_eq!(stats.team_a_wins, 2);
    assert_eq!(stats.team_b_wins, 1);
    assert_eq!(stats.ties, 1);
    assert_eq!(results.len(), 4);
}
