//! Match-count fairness: projection, played-count report and corrective group synthesis.

use crate::logic::pairing::{commit_group, pair_tiers, unplaced_players, PLAYERS_PER_COURT};
use crate::models::{
    Group, PairingHistory, Player, PlayerId, PlayerPool, RestLedger, Tournament, TournamentError,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-player match counts and the spread between them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessReport {
    pub needs_extra_round: bool,
    pub min_matches: u32,
    pub max_matches: u32,
    pub per_player: BTreeMap<PlayerId, u32>,
}

impl FairnessReport {
    fn from_counts(per_player: BTreeMap<PlayerId, u32>) -> Self {
        let min_matches = per_player.values().copied().min().unwrap_or(0);
        let max_matches = per_player.values().copied().max().unwrap_or(0);
        let needs_extra_round = max_matches - min_matches > 1;
        if needs_extra_round {
            log::warn!(
                "Unbalanced match distribution: {} to {} matches per player",
                min_matches,
                max_matches
            );
        }
        Self {
            needs_extra_round,
            min_matches,
            max_matches,
            per_player,
        }
    }

    /// Players sitting at the minimum count, in the given roster order.
    pub fn priority_players(&self, pool: &PlayerPool) -> Vec<PlayerId> {
        pool.players
            .iter()
            .filter(|p| self.per_player.get(&p.id) == Some(&self.min_matches))
            .map(|p| p.id)
            .collect()
    }
}

/// Project per-player match counts over the planned rounds.
///
/// Each round the `min(courts * 4, pool size)` players with the lowest projected count (stable
/// on roster order) play once more. This does not replay the real pairing algorithm.
pub fn evaluate(pool: &PlayerPool, planned_rounds: u32, courts_count: usize) -> FairnessReport {
    let mut counts = vec![0u32; pool.len()];
    let playing = (courts_count * PLAYERS_PER_COURT).min(pool.len());
    for _ in 0..planned_rounds {
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by_key(|&i| counts[i]);
        for &i in order.iter().take(playing) {
            counts[i] += 1;
        }
    }
    let per_player = pool
        .players
        .iter()
        .zip(counts)
        .map(|(p, n)| (p.id, n))
        .collect();
    FairnessReport::from_counts(per_player)
}

/// Same report built from the matches actually scheduled so far.
pub fn evaluate_played(tournament: &Tournament) -> FairnessReport {
    let mut counts: BTreeMap<PlayerId, u32> =
        tournament.pool.players.iter().map(|p| (p.id, 0)).collect();
    for m in tournament.rounds.iter().flat_map(|r| r.matches.iter()) {
        for id in m.team_a.player_ids().into_iter().chain(m.team_b.player_ids()) {
            if let Some(n) = counts.get_mut(&id) {
                *n += 1;
            }
        }
    }
    FairnessReport::from_counts(counts)
}

/// Build a corrective group around the priority players.
///
/// The priority players are split by tier; the shorter side is padded from the rest of that
/// tier, least-rested first, until both sides match. Court count does not bound the size.
pub fn build_corrective_group<R: Rng>(
    priority: &[PlayerId],
    pool: &PlayerPool,
    group_index: usize,
    history: &PairingHistory,
    ledger: &RestLedger,
    rng: &mut R,
) -> Result<Group, TournamentError> {
    if priority.is_empty() {
        return Err(TournamentError::NothingToBalance);
    }
    let ranked = pool.rank();
    if ranked.upper.is_empty() || ranked.lower.is_empty() {
        return Err(TournamentError::InsufficientPlayers {
            upper: ranked.upper.len(),
            lower: ranked.lower.len(),
        });
    }

    let pick = |tier: &[Player]| -> Vec<Player> {
        tier.iter()
            .filter(|p| priority.contains(&p.id))
            .cloned()
            .collect()
    };
    let mut upper = pick(&ranked.upper);
    let mut lower = pick(&ranked.lower);
    let upper_pad = order_by_fewest_rests(ranked.upper, ledger, rng);
    let lower_pad = order_by_fewest_rests(ranked.lower, ledger, rng);
    pad_to(&mut upper, lower.len(), &upper_pad);
    pad_to(&mut lower, upper.len(), &lower_pad);

    let target = upper.len().min(lower.len());
    log::info!(
        "Corrective group {}: {} priority players, {} teams",
        group_index + 1,
        priority.len(),
        target
    );
    let pairing = pair_tiers(group_index, &upper, &lower, target, history);
    let resting = unplaced_players(pool, &pairing.teams);
    Ok(Group {
        index: group_index,
        teams: pairing.teams,
        resting,
        reused_pairings: pairing.reused,
        created_at: None,
        corrective: true,
        priority_players: priority.to_vec(),
        generation: 0,
    })
}

/// Least-rested first, seeded tie-break. Unlike regular formation, resting in the previous group
/// gives no precedence here.
fn order_by_fewest_rests<R: Rng>(
    players: Vec<Player>,
    ledger: &RestLedger,
    rng: &mut R,
) -> Vec<Player> {
    let mut with_tiebreak: Vec<(Player, u32)> =
        players.into_iter().map(|p| (p, rng.gen::<u32>())).collect();
    with_tiebreak.sort_by_key(|(p, t)| (ledger.player_rests(p.id).len(), *t));
    with_tiebreak.into_iter().map(|(p, _)| p).collect()
}

fn pad_to(selected: &mut Vec<Player>, target: usize, candidates: &[Player]) {
    for candidate in candidates {
        if selected.len() >= target {
            break;
        }
        if !selected.iter().any(|p| p.id == candidate.id) {
            selected.push(candidate.clone());
        }
    }
}

/// Append a corrective group built from the report's least-played players and plan one more
/// round so it can be scheduled.
pub fn add_extra_round<'a>(
    tournament: &'a mut Tournament,
    report: &FairnessReport,
) -> Result<&'a Group, TournamentError> {
    let priority = report.priority_players(&tournament.pool);
    let index = tournament.groups.next_index();
    let mut rng = tournament.rng_for_group(index, 0);
    let group = build_corrective_group(
        &priority,
        &tournament.pool,
        index,
        &tournament.pairing_history,
        &tournament.rest_ledger,
        &mut rng,
    )?;
    commit_group(
        &group,
        &mut tournament.pairing_history,
        &mut tournament.rest_ledger,
    );
    tournament.config.total_rounds += 1;
    log::info!(
        "Extra round planned: group {} with {} teams, {} rounds total",
        index + 1,
        group.teams.len(),
        tournament.config.total_rounds
    );
    Ok(tournament.groups.append(group))
}
