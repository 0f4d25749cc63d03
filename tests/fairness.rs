//! Integration tests for the match-count projection and corrective extra rounds.

use partner_tournament::logic::{
    add_extra_round, build_corrective_group, evaluate, evaluate_played, form_next_group,
    regenerate_group, schedule_next_round,
};
use partner_tournament::models::Tier;
use partner_tournament::{
    FairnessReport, PairingHistory, Player, PlayerPool, RestLedger, Tournament, TournamentConfig,
    TournamentError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

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

#[test]
fn projection_for_eighteen_players_on_two_courts() {
    let pool = PlayerPool::load(players(18)).unwrap();
    let report = evaluate(&pool, 3, 2);
    assert_eq!(report.min_matches, 1);
    assert_eq!(report.max_matches, 2);
    assert!(!report.needs_extra_round);

    let counts: Vec<u32> = pool.players.iter().map(|p| report.per_player[&p.id]).collect();
    assert_eq!(&counts[..6], &[2u32; 6]);
    assert!(counts[6..].iter().all(|&n| n == 1));
}

#[test]
fn projection_spread_stays_within_one() {
    for (n, courts, rounds) in [(10, 2, 5), (13, 3, 4), (24, 4, 7), (7, 1, 6)] {
        let pool = PlayerPool::load(players(n)).unwrap();
        let report = evaluate(&pool, rounds, courts);
        assert!(report.max_matches - report.min_matches <= 1);
        let total: u32 = report.per_player.values().sum();
        assert_eq!(total as usize, rounds as usize * (courts * 4).min(n));
    }
}

#[test]
fn priority_players_follow_roster_order() {
    let pool = PlayerPool::load(players(18)).unwrap();
    let report = evaluate(&pool, 3, 2);
    let priority = report.priority_players(&pool);
    let expected: Vec<_> = pool.players[6..].iter().map(|p| p.id).collect();
    assert_eq!(priority, expected);
}

#[test]
fn extra_round_builds_a_corrective_group() {
    let mut t = tournament(18, 2, 3);
    for _ in 0..3 {
        form_next_group(&mut t).unwrap();
    }
    let report = evaluate(&t.pool, t.config.total_rounds, t.config.courts_count);
    let priority = report.priority_players(&t.pool);
    let history_before = t.pairing_history.len();

    let group = add_extra_round(&mut t, &report).unwrap().clone();
    assert!(group.corrective);
    assert_eq!(group.index, 3);
    assert_eq!(group.priority_players, priority);
    // 3 upper and 9 lower priority players: the upper side is padded to 9.
    assert_eq!(group.teams.len(), 9);
    assert!(group.resting.is_empty());
    assert_eq!(t.config.total_rounds, 4);
    assert!(t.pairing_history.len() >= history_before);

    let ranked = t.pool.rank();
    for id in &priority {
        assert!(group.teams.iter().any(|team| team.has_player(*id)));
    }
    for team in &group.teams {
        assert_eq!(ranked.tier_of(team.upper.id), Some(Tier::Upper));
        assert_eq!(ranked.tier_of(team.lower.id), Some(Tier::Lower));
    }
    // Corrective groups write no player rests.
    assert!(t.rest_ledger.players.values().all(|rests| !rests.contains(&3)));
}

#[test]
fn corrective_padding_takes_the_least_rested_players() {
    let pool = PlayerPool::load(players(8)).unwrap();
    let ids: Vec<_> = pool.players.iter().map(|p| p.id).collect();
    // P3 is the only upper-tier player who has rested, and it was in the group just before.
    let mut ledger = RestLedger::default();
    ledger.record_player_rest(ids[3], 0);
    let priority = ids[5..].to_vec();

    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let group =
            build_corrective_group(&priority, &pool, 1, &PairingHistory::default(), &ledger, &mut rng)
                .unwrap();
        assert_eq!(group.teams.len(), 3);
        let mut upper: Vec<_> = group.teams.iter().map(|team| team.upper.id).collect();
        upper.sort();
        let mut expected = ids[..3].to_vec();
        expected.sort();
        assert_eq!(upper, expected);
        assert!(group.resting.contains(&ids[3]));
    }
}

#[test]
fn corrective_group_is_schedulable() {
    let mut t = tournament(18, 2, 3);
    for _ in 0..3 {
        form_next_group(&mut t).unwrap();
    }
    let report = evaluate(&t.pool, 3, 2);
    add_extra_round(&mut t, &report).unwrap();
    for _ in 0..4 {
        let round = schedule_next_round(&mut t).unwrap();
        assert!(round.matches.len() <= 2);
        assert!(round.playing.len() <= 4);
    }
    assert!(matches!(
        schedule_next_round(&mut t),
        Err(TournamentError::TournamentComplete { requested: 5, planned: 4 })
    ));
}

#[test]
fn regenerated_corrective_group_stays_corrective() {
    let mut t = tournament(18, 2, 3);
    form_next_group(&mut t).unwrap();
    let report = evaluate(&t.pool, 3, 2);
    let original = add_extra_round(&mut t, &report).unwrap().clone();
    let regenerated = regenerate_group(&mut t, 1).unwrap();
    assert!(regenerated.corrective);
    assert_eq!(regenerated.generation, 1);
    assert_eq!(regenerated.priority_players, original.priority_players);
    assert_eq!(regenerated.teams.len(), original.teams.len());
    assert_eq!(t.config.total_rounds, 4);
}

#[test]
fn nothing_to_balance_without_priority_players() {
    let mut t = tournament(18, 2, 3);
    let snapshot = t.clone();
    assert!(matches!(
        add_extra_round(&mut t, &FairnessReport::default()),
        Err(TournamentError::NothingToBalance)
    ));
    assert_eq!(t, snapshot);
}

#[test]
fn played_counts_follow_scheduled_matches() {
    let mut t = tournament(20, 4, 3);
    form_next_group(&mut t).unwrap();
    let before = evaluate_played(&t);
    assert_eq!(before.max_matches, 0);

    schedule_next_round(&mut t).unwrap();
    let report = evaluate_played(&t);
    assert_eq!(report.min_matches, 0);
    assert_eq!(report.max_matches, 1);
    assert!(!report.needs_extra_round);
    assert_eq!(report.per_player.values().filter(|&&n| n == 1).count(), 16);
    assert_eq!(report.priority_players(&t.pool).len(), 4);
}
