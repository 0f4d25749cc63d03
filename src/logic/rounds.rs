//! Round scheduling: team selection across groups, team-level rest rotation, ranking matches
//! and court assignment.

use crate::models::{
    GameMatch, GroupRepository, PlayerId, RestLedger, Round, RoundStatus, ScheduleAnomaly, Team,
    TeamId, Tournament, TournamentError,
};
use chrono::Utc;
use std::collections::HashSet;

/// Teams per court.
pub const TEAMS_PER_COURT: usize = 2;

/// Candidate teams for a round, highest priority to play first.
///
/// Round 1 takes group 0 in full. Later rounds put the teams that rested in the previous round
/// first, then the basis group `(round - 1) mod groups` without those teams.
///
/// Round `n` needs at least `n` groups; an older group is never replayed in its place.
pub fn select_teams_for_round(
    groups: &GroupRepository,
    ledger: &RestLedger,
    round_number: u32,
) -> Result<Vec<Team>, TournamentError> {
    if groups.len() < round_number.max(1) as usize {
        log::warn!(
            "Round {}: only {} groups formed, form group {} first",
            round_number,
            groups.len(),
            round_number
        );
        return Err(TournamentError::NoGroupAvailable {
            round: round_number,
        });
    }
    if round_number <= 1 {
        let first = groups
            .get(0)
            .ok_or(TournamentError::NoGroupAvailable { round: 1 })?;
        return Ok(first.teams.clone());
    }

    let basis_index = (round_number as usize - 1) % groups.len();
    let basis = groups
        .get(basis_index)
        .ok_or(TournamentError::NoGroupAvailable {
            round: round_number,
        })?;

    let mut seen: HashSet<TeamId> = HashSet::new();
    let priority: Vec<Team> = groups
        .teams()
        .filter(|t| ledger.team_rested_in(t.id, round_number - 1))
        .filter(|t| seen.insert(t.id))
        .cloned()
        .collect();
    if !priority.is_empty() {
        log::info!(
            "Round {}: {} teams rested last round and go first",
            round_number,
            priority.len()
        );
    }

    let mut candidates = priority;
    candidates.extend(basis.teams.iter().filter(|t| !seen.contains(&t.id)).cloned());
    Ok(candidates)
}

/// Split of candidates into playing and resting teams.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestRotation {
    pub playing: Vec<Team>,
    pub resting: Vec<Team>,
    /// Resting teams that also rested in the previous round.
    pub consecutive: Vec<TeamId>,
}

/// Rest the last teams when candidates exceed `courts * 2`. Candidates are already in priority
/// order, so the tail is the lowest priority to play. Only reads the ledger.
pub fn calculate_rest_rotation(
    candidates: Vec<Team>,
    courts_count: usize,
    round_number: u32,
    ledger: &RestLedger,
) -> RestRotation {
    let max_playing_teams = courts_count * TEAMS_PER_COURT;
    if candidates.len() <= max_playing_teams {
        return RestRotation {
            playing: candidates,
            ..RestRotation::default()
        };
    }

    let mut playing = candidates;
    let resting = playing.split_off(max_playing_teams);
    let consecutive: Vec<TeamId> = resting
        .iter()
        .filter(|t| round_number > 1 && ledger.team_rested_in(t.id, round_number - 1))
        .map(|t| t.id)
        .collect();
    for id in &consecutive {
        log::warn!("Round {}: team {} rests two rounds in a row", round_number, id);
    }
    log::info!(
        "Round {}: {} playing, {} resting",
        round_number,
        playing.len(),
        resting.len()
    );
    RestRotation {
        playing,
        resting,
        consecutive,
    }
}

/// Rank by composite score (descending, ties by team id) and pair adjacent ranks, at most one
/// match per court. Returns the matches and any team left without an opponent.
pub fn create_ranking_matches(
    playing: &[Team],
    courts_count: usize,
    round_number: u32,
    match_duration_minutes: u32,
) -> (Vec<GameMatch>, Vec<Team>) {
    let mut ranked: Vec<Team> = playing.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    let mut matches = Vec::new();
    let mut leftover = Vec::new();
    let mut teams = ranked.into_iter();
    while let Some(team_a) = teams.next() {
        match teams.next() {
            Some(team_b) if matches.len() < courts_count => {
                let number = matches.len() + 1;
                matches.push(GameMatch::new(
                    round_number,
                    number,
                    team_a,
                    team_b,
                    match_duration_minutes,
                ));
            }
            Some(team_b) => {
                leftover.push(team_a);
                leftover.push(team_b);
            }
            None => leftover.push(team_a),
        }
    }
    assign_courts(&mut matches, courts_count);
    for team in &leftover {
        log::warn!("Round {}: team {} has no opponent", round_number, team.id);
    }
    (matches, leftover)
}

/// Courts cycle 1..=courts in match order.
pub fn assign_courts(matches: &mut [GameMatch], courts_count: usize) {
    for (i, m) in matches.iter_mut().enumerate() {
        m.court = i % courts_count.max(1) + 1;
    }
}

fn double_booked(playing: &[Team]) -> Vec<PlayerId> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for id in playing.iter().flat_map(|t| t.player_ids()) {
        if !seen.insert(id) && !repeated.contains(&id) {
            repeated.push(id);
        }
    }
    repeated
}

/// Schedule the given round and append it. Rounds are scheduled in order.
pub fn schedule_round(
    tournament: &mut Tournament,
    round_number: u32,
) -> Result<&Round, TournamentError> {
    let planned = tournament.config.total_rounds;
    if round_number > planned {
        return Err(TournamentError::TournamentComplete {
            requested: round_number,
            planned,
        });
    }
    let expected = tournament.next_round_number();
    if round_number != expected {
        return Err(TournamentError::RoundOutOfSequence {
            expected,
            requested: round_number,
        });
    }

    let courts = tournament.config.courts_count;
    let candidates =
        select_teams_for_round(&tournament.groups, &tournament.rest_ledger, round_number)?;
    let rotation =
        calculate_rest_rotation(candidates, courts, round_number, &tournament.rest_ledger);
    let (matches, unscheduled) = create_ranking_matches(
        &rotation.playing,
        courts,
        round_number,
        tournament.config.match_duration_minutes,
    );

    let mut anomalies: Vec<ScheduleAnomaly> = rotation
        .consecutive
        .iter()
        .map(|&team| ScheduleAnomaly::ConsecutiveRest { team })
        .collect();
    anomalies.extend(
        unscheduled
            .iter()
            .map(|t| ScheduleAnomaly::UnpairedTeam { team: t.id }),
    );
    for player in double_booked(&rotation.playing) {
        log::warn!("Round {}: player {} is in two playing teams", round_number, player);
        anomalies.push(ScheduleAnomaly::PlayerDoubleBooked { player });
    }

    // Unscheduled teams sat out, so they go first next round like resting ones.
    for team in rotation.resting.iter().chain(unscheduled.iter()) {
        tournament.rest_ledger.record_team_rest(team.id, round_number);
    }

    tournament.rounds.push(Round {
        number: round_number,
        playing: rotation.playing,
        resting: rotation.resting,
        unscheduled,
        matches,
        status: RoundStatus::Active,
        anomalies,
        created_at: Some(Utc::now()),
        completed_at: None,
        statistics: None,
    });
    let round = &tournament.rounds[tournament.rounds.len() - 1];
    log::info!(
        "Round {} scheduled: {} matches",
        round.number,
        round.matches.len()
    );
    Ok(round)
}

/// Schedule the next round in sequence.
pub fn schedule_next_round(tournament: &mut Tournament) -> Result<&Round, TournamentError> {
    let next = tournament.next_round_number();
    schedule_round(tournament, next)
}
