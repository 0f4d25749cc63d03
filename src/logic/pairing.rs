//! Group formation: tier split, player-level rest rotation and cross-tier pairing with
//! anti-duplication.

use crate::models::{
    Group, PairKey, PairingHistory, Player, PlayerId, PlayerPool, RestLedger, Team, TeamId,
    Tournament, TournamentError,
};
use rand::Rng;

/// Players per court (two teams of two).
pub const PLAYERS_PER_COURT: usize = 4;

/// Order players so the ones who most need to play come first.
///
/// 1. Rested in the immediately preceding group.
/// 2. Fewer cumulative rests.
/// 3. Seeded random tie-break.
pub fn order_by_rest_priority<R: Rng>(
    players: Vec<Player>,
    group_index: usize,
    ledger: &RestLedger,
    rng: &mut R,
) -> Vec<Player> {
    let previous = group_index.checked_sub(1);
    let mut with_tiebreak: Vec<(Player, u32)> =
        players.into_iter().map(|p| (p, rng.gen::<u32>())).collect();
    with_tiebreak.sort_by_key(|(p, t)| {
        let rested_last = previous.is_some_and(|g| ledger.player_rested_in(p.id, g));
        (!rested_last, ledger.player_rests(p.id).len(), *t)
    });
    with_tiebreak.into_iter().map(|(p, _)| p).collect()
}

/// Result of pairing two ordered tier lists.
#[derive(Debug, Default)]
pub(crate) struct Pairing {
    pub teams: Vec<Team>,
    pub reused: Vec<PairKey>,
}

/// Pair `upper[i]` with the first remaining lower candidate whose partnership is unused.
/// When every remaining candidate is a repeat, take the first remaining one and record the reuse.
pub(crate) fn pair_tiers(
    group_index: usize,
    upper: &[Player],
    lower: &[Player],
    count: usize,
    history: &PairingHistory,
) -> Pairing {
    let mut remaining: Vec<&Player> = lower.iter().collect();
    let mut pairing = Pairing::default();
    for (i, upper_player) in upper.iter().take(count).enumerate() {
        if remaining.is_empty() {
            break;
        }
        let fresh = remaining
            .iter()
            .position(|l| !history.contains(&PairKey::new(upper_player.id, l.id)));
        let pick = match fresh {
            Some(pos) => pos,
            None => {
                let key = PairKey::new(upper_player.id, remaining[0].id);
                log::warn!(
                    "Group {}: reused pairing {} + {}",
                    group_index + 1,
                    upper_player.alias,
                    remaining[0].alias
                );
                pairing.reused.push(key);
                0
            }
        };
        let lower_player = remaining.remove(pick);
        let id = TeamId {
            group: group_index,
            number: i + 1,
        };
        pairing
            .teams
            .push(Team::new(id, upper_player.clone(), lower_player.clone()));
    }
    pairing
}

/// Everyone in the pool who is not in one of the teams, upper tier first.
pub(crate) fn unplaced_players(pool: &PlayerPool, teams: &[Team]) -> Vec<PlayerId> {
    let ranked = pool.rank();
    ranked
        .upper
        .iter()
        .chain(ranked.lower.iter())
        .filter(|p| !teams.iter().any(|t| t.has_player(p.id)))
        .map(|p| p.id)
        .collect()
}

/// Form the teams for one group. Pure: the ledgers are only read.
///
/// Only `InsufficientPlayers` is fatal. Reused pairings and tier imbalance are logged and the
/// group is still produced.
pub fn form_group<R: Rng>(
    pool: &PlayerPool,
    group_index: usize,
    history: &PairingHistory,
    ledger: &RestLedger,
    courts_count: usize,
    rng: &mut R,
) -> Result<Group, TournamentError> {
    let ranked = pool.rank();
    if ranked.upper.is_empty() || ranked.lower.is_empty() {
        return Err(TournamentError::InsufficientPlayers {
            upper: ranked.upper.len(),
            lower: ranked.lower.len(),
        });
    }
    if ranked.upper.len() != ranked.lower.len() {
        log::warn!(
            "Group {}: tier imbalance ({} upper, {} lower)",
            group_index + 1,
            ranked.upper.len(),
            ranked.lower.len()
        );
    }

    let max_playing_players = courts_count * PLAYERS_PER_COURT;
    let resting_count = pool.len().saturating_sub(max_playing_players);
    log::info!(
        "Group {}: {} players, {} courts, {} expected to rest",
        group_index + 1,
        pool.len(),
        courts_count,
        resting_count
    );

    let upper = order_by_rest_priority(ranked.upper, group_index, ledger, rng);
    let lower = order_by_rest_priority(ranked.lower, group_index, ledger, rng);
    let teams_to_create = upper.len().min(lower.len()).min(max_playing_players / 2);

    let pairing = pair_tiers(group_index, &upper, &lower, teams_to_create, history);
    let resting = unplaced_players(pool, &pairing.teams);
    if resting.len() != resting_count {
        log::warn!(
            "Group {}: expected {} resting players, got {}",
            group_index + 1,
            resting_count,
            resting.len()
        );
    }

    Ok(Group {
        index: group_index,
        teams: pairing.teams,
        resting,
        reused_pairings: pairing.reused,
        created_at: None,
        corrective: false,
        priority_players: Vec::new(),
        generation: 0,
    })
}

/// Apply a formed group to the ledgers: pair keys always, player rests for regular groups only.
pub(crate) fn commit_group(group: &Group, history: &mut PairingHistory, ledger: &mut RestLedger) {
    history.record_teams(&group.teams);
    if !group.corrective {
        for &id in &group.resting {
            ledger.record_player_rest(id, group.index);
        }
    }
}

/// Undo `commit_group`.
pub(crate) fn rollback_group(group: &Group, history: &mut PairingHistory, ledger: &mut RestLedger) {
    history.rollback_teams(&group.teams);
    if !group.corrective {
        ledger.rollback_group(group.index);
    }
}

/// Form the next group from the current roster and append it.
pub fn form_next_group(tournament: &mut Tournament) -> Result<&Group, TournamentError> {
    let index = tournament.groups.next_index();
    let mut rng = tournament.rng_for_group(index, 0);
    let group = form_group(
        &tournament.pool,
        index,
        &tournament.pairing_history,
        &tournament.rest_ledger,
        tournament.config.courts_count,
        &mut rng,
    )?;
    commit_group(
        &group,
        &mut tournament.pairing_history,
        &mut tournament.rest_ledger,
    );
    log::info!(
        "Group {} formed: {} teams, {} resting, {} reused pairings",
        index + 1,
        group.teams.len(),
        group.resting.len(),
        group.reused_pairings.len()
    );
    Ok(tournament.groups.append(group))
}

/// Replace the teams of the most recent group ("shuffle").
///
/// Rollback of the group's pairings and rests and the recomputation happen on copies of the
/// ledgers; the tournament is only touched once the new group exists.
pub fn regenerate_group(
    tournament: &mut Tournament,
    group_index: usize,
) -> Result<&Group, TournamentError> {
    let old = tournament
        .groups
        .get(group_index)
        .ok_or(TournamentError::GroupNotFound(group_index))?;
    let is_latest = group_index + 1 == tournament.groups.len();
    let scheduled = tournament.rounds.iter().any(|r| r.uses_group(group_index));
    if !is_latest || scheduled {
        return Err(TournamentError::GroupLocked(group_index));
    }

    let mut history = tournament.pairing_history.clone();
    let mut ledger = tournament.rest_ledger.clone();
    rollback_group(old, &mut history, &mut ledger);

    let generation = old.generation + 1;
    let mut rng = tournament.rng_for_group(group_index, generation);
    let mut group = if old.corrective {
        crate::logic::fairness::build_corrective_group(
            &old.priority_players,
            &tournament.pool,
            group_index,
            &history,
            &ledger,
            &mut rng,
        )?
    } else {
        form_group(
            &tournament.pool,
            group_index,
            &history,
            &ledger,
            tournament.config.courts_count,
            &mut rng,
        )?
    };
    group.generation = generation;
    commit_group(&group, &mut history, &mut ledger);

    log::info!(
        "Group {} regenerated: {} teams, {} reused pairings",
        group_index + 1,
        group.teams.len(),
        group.reused_pairings.len()
    );
    tournament.pairing_history = history;
    tournament.rest_ledger = ledger;
    tournament
        .groups
        .replace(group)
        .ok_or(TournamentError::GroupNotFound(group_index))?;
    tournament
        .groups
        .get(group_index)
        .ok_or(TournamentError::GroupNotFound(group_index))
}
