//! Integration tests for round scheduling: selection, team-level rests, ranking matches, courts.

use partner_tournament::logic::{
    add_extra_round, assign_courts, calculate_rest_rotation, create_ranking_matches, evaluate,
    form_next_group, schedule_next_round, schedule_round, select_teams_for_round,
};
use partner_tournament::models::{GameMatch, RestLedger, RoundStatus, ScheduleAnomaly};
use partner_tournament::{Player, Team, TeamId, Tournament, TournamentConfig, TournamentError};

fn players(n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| Player::new(format!("P{i}"), format!("Player {i}"), 5.0 - 0.1 * i as f64).unwrap())
        .collect()
}

fn tournament(n: usize, courts: usize, rounds: u32) -> Tournament {
    let config = TournamentConfig {
        courts_count: courts,
        total_rounds: rounds,
        match_duration_minutes: 25,
        rng_seed: Some(42),
    };
    Tournament::with_players(players(n), config).unwrap()
}

/// Stand-alone teams in group 0 with descending scores.
fn teams(n: usize) -> Vec<Team> {
    let roster = players(n * 2);
    (0..n)
        .map(|i| {
            let id = TeamId {
                group: 0,
                number: i + 1,
            };
            Team::new(id, roster[i].clone(), roster[n + i].clone())
        })
        .collect()
}

#[test]
fn first_round_plays_every_team_of_a_full_group() {
    let mut t = tournament(16, 4, 3);
    form_next_group(&mut t).unwrap();
    let round = schedule_next_round(&mut t).unwrap();
    assert_eq!(round.number, 1);
    assert_eq!(round.playing.len(), 8);
    assert!(round.resting.is_empty());
    assert!(round.unscheduled.is_empty());
    assert_eq!(round.matches.len(), 4);
    assert_eq!(round.status, RoundStatus::Active);
    let courts: Vec<usize> = round.matches.iter().map(|m| m.court).collect();
    assert_eq!(courts, vec![1, 2, 3, 4]);
    let ids: Vec<&str> = round.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["R1M1", "R1M2", "R1M3", "R1M4"]);
}

#[test]
fn matches_pair_adjacent_ranks() {
    let mut t = tournament(16, 4, 3);
    form_next_group(&mut t).unwrap();
    let round = schedule_next_round(&mut t).unwrap();
    let mut scores: Vec<f64> = round.playing.iter().map(|team| team.score).collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    for (i, m) in round.matches.iter().enumerate() {
        assert_eq!(m.team_a.score, scores[2 * i]);
        assert_eq!(m.team_b.score, scores[2 * i + 1]);
    }
}

#[test]
fn surplus_teams_rest_last_and_go_first_next_round() {
    // 20 players on 4 courts: the corrective group holds 10 teams, 8 can play.
    let mut t = tournament(20, 4, 3);
    form_next_group(&mut t).unwrap();
    let everyone = evaluate(&t.pool, 0, 4);
    let corrective = add_extra_round(&mut t, &everyone).unwrap().clone();
    assert_eq!(corrective.teams.len(), 10);
    assert_eq!(t.config.total_rounds, 4);

    schedule_next_round(&mut t).unwrap();
    let second = schedule_next_round(&mut t).unwrap().clone();
    assert_eq!(second.playing.len(), 8);
    assert_eq!(second.resting.len(), 2);
    assert_eq!(second.resting, corrective.teams[8..].to_vec());
    for team in &second.resting {
        assert_eq!(t.rest_ledger.team_rests(team.id), &[2]);
    }

    form_next_group(&mut t).unwrap();
    let candidates = select_teams_for_round(&t.groups, &t.rest_ledger, 3).unwrap();
    assert_eq!(candidates.len(), 10);
    assert_eq!(candidates[..2].to_vec(), second.resting);

    let third = schedule_next_round(&mut t).unwrap();
    for team in &second.resting {
        assert!(third.playing.iter().any(|x| x.id == team.id));
    }
    assert_eq!(third.resting.len(), 2);
    assert!(!third
        .anomalies
        .iter()
        .any(|a| matches!(a, ScheduleAnomaly::ConsecutiveRest { .. })));
}

#[test]
fn capacity_holds_across_rounds() {
    let mut t = tournament(20, 3, 5);
    for _ in 0..5 {
        form_next_group(&mut t).unwrap();
    }
    for _ in 0..5 {
        let round = schedule_next_round(&mut t).unwrap();
        assert!(round.playing.len() <= 6);
        assert!(round.matches.len() <= 3);
        for team in &round.resting {
            assert!(!round.playing.iter().any(|p| p.id == team.id));
        }
        let mut courts: Vec<usize> = round.matches.iter().map(|m| m.court).collect();
        courts.dedup();
        assert_eq!(courts.len(), round.matches.len());
    }
}

#[test]
fn rest_rotation_keeps_everyone_when_capacity_allows() {
    let rotation = calculate_rest_rotation(teams(6), 3, 1, &RestLedger::default());
    assert_eq!(rotation.playing.len(), 6);
    assert!(rotation.resting.is_empty());
}

#[test]
fn rest_rotation_rests_the_tail_and_flags_repeats() {
    let candidates = teams(5);
    let tail = candidates[4].id;
    let mut ledger = RestLedger::default();
    ledger.record_team_rest(tail, 1);

    let rotation = calculate_rest_rotation(candidates.clone(), 2, 2, &ledger);
    assert_eq!(rotation.playing, candidates[..4].to_vec());
    assert_eq!(rotation.resting.len(), 1);
    assert_eq!(rotation.consecutive, vec![tail]);
}

#[test]
fn odd_team_count_leaves_one_unpaired() {
    let (matches, leftover) = create_ranking_matches(&teams(3), 2, 1, 25);
    assert_eq!(matches.len(), 1);
    assert_eq!(leftover.len(), 1);
    assert_eq!(leftover[0].id.number, 3);
}

#[test]
fn match_count_never_exceeds_courts() {
    let (matches, leftover) = create_ranking_matches(&teams(6), 2, 1, 25);
    assert_eq!(matches.len(), 2);
    assert_eq!(leftover.len(), 2);
}

#[test]
fn courts_cycle_in_match_order() {
    let pool = teams(6);
    let mut matches: Vec<GameMatch> = pool
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| GameMatch::new(1, i + 1, pair[0].clone(), pair[1].clone(), 25))
        .collect();
    assign_courts(&mut matches, 2);
    let courts: Vec<usize> = matches.iter().map(|m| m.court).collect();
    assert_eq!(courts, vec![1, 2, 1]);
}

#[test]
fn scheduling_without_groups_fails() {
    let mut t = tournament(16, 4, 3);
    assert!(matches!(
        schedule_next_round(&mut t),
        Err(TournamentError::NoGroupAvailable { round: 1 })
    ));
}

#[test]
fn each_round_needs_its_own_group() {
    let mut t = tournament(16, 4, 3);
    form_next_group(&mut t).unwrap();
    schedule_next_round(&mut t).unwrap();
    assert!(matches!(
        schedule_next_round(&mut t),
        Err(TournamentError::NoGroupAvailable { round: 2 })
    ));
    assert_eq!(t.rounds.len(), 1);
    assert!(t.rest_ledger.teams.is_empty());

    form_next_group(&mut t).unwrap();
    let second = schedule_next_round(&mut t).unwrap();
    assert!(second.playing.iter().all(|team| team.id.group == 1));
}

#[test]
fn unpaired_team_is_selected_but_not_on_court() {
    // 6 players on 2 courts: three teams, all selected, one without an opponent.
    let mut t = tournament(6, 2, 3);
    form_next_group(&mut t).unwrap();
    let round = schedule_next_round(&mut t).unwrap().clone();
    assert_eq!(round.playing.len(), 3);
    assert!(round.resting.is_empty());
    assert_eq!(round.matches.len(), 1);
    assert_eq!(round.unscheduled.len(), 1);

    let leftover = round.unscheduled[0].id;
    assert_eq!(round.teams_on_court().count(), 2);
    assert!(!round.teams_on_court().any(|team| team.id == leftover));
    assert!(round
        .anomalies
        .contains(&ScheduleAnomaly::UnpairedTeam { team: leftover }));
    assert_eq!(t.rest_ledger.team_rests(leftover), &[1]);
}

#[test]
fn rounds_are_scheduled_in_order_up_to_the_plan() {
    let mut t = tournament(16, 4, 1);
    form_next_group(&mut t).unwrap();
    assert!(matches!(
        schedule_round(&mut t, 2),
        Err(TournamentError::TournamentComplete { requested: 2, planned: 1 })
    ));

    let mut t = tournament(16, 4, 3);
    form_next_group(&mut t).unwrap();
    assert!(matches!(
        schedule_round(&mut t, 2),
        Err(TournamentError::RoundOutOfSequence { expected: 1, requested: 2 })
    ));
    schedule_round(&mut t, 1).unwrap();
    assert_eq!(t.next_round_number(), 2);
}

#[test]
fn rest_audit_reports_spread() {
    let mut ledger = RestLedger::default();
    let ids: Vec<TeamId> = teams(3).iter().map(|t| t.id).collect();
    ledger.record_team_rest(ids[0], 1);
    ledger.record_team_rest(ids[0], 2);
    ledger.record_team_rest(ids[1], 4);

    let stats = ledger.rest_statistics();
    assert_eq!(stats[&ids[0]].longest_streak, 2);
    assert_eq!(stats[&ids[0]].last_rest_round, Some(2));
    assert_eq!(stats[&ids[1]].total_rests, 1);

    let audit = ledger.audit(&ids);
    assert!(audit.has_consecutive_rests);
    assert_eq!(audit.rest_distribution_delta, 2);
}
