//! Match lifecycle on a scheduled round: start, pause, expire, reset, complete.

use crate::models::{
    GameMatch, MatchResult, MatchResultSink, Round, RoundStatistics, RoundStatus, Tournament,
    TournamentError,
};
use chrono::Utc;

fn locate(tournament: &mut Tournament, match_id: &str) -> Result<(usize, usize), TournamentError> {
    tournament
        .rounds
        .iter()
        .enumerate()
        .find_map(|(ri, r)| {
            r.matches
                .iter()
                .position(|m| m.id == match_id)
                .map(|mi| (ri, mi))
        })
        .ok_or_else(|| TournamentError::MatchNotFound(match_id.to_string()))
}

fn match_mut<'a>(
    tournament: &'a mut Tournament,
    match_id: &str,
) -> Result<&'a mut GameMatch, TournamentError> {
    let (ri, mi) = locate(tournament, match_id)?;
    Ok(&mut tournament.rounds[ri].matches[mi])
}

/// Pending | Paused -> Active.
pub fn start_match(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    match_mut(tournament, match_id)?.start(Utc::now())?;
    log::info!("Match {} started", match_id);
    Ok(())
}

/// Active -> Paused.
pub fn pause_match(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    match_mut(tournament, match_id)?.pause()?;
    log::info!("Match {} paused", match_id);
    Ok(())
}

/// Active -> Expired.
pub fn expire_match(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    match_mut(tournament, match_id)?.expire()?;
    log::info!("Match {} expired", match_id);
    Ok(())
}

/// Back to Pending with scores cleared.
pub fn reset_match(tournament: &mut Tournament, match_id: &str) -> Result<(), TournamentError> {
    match_mut(tournament, match_id)?.reset()?;
    log::info!("Match {} reset", match_id);
    Ok(())
}

/// Record final scores, hand the result to the sink and close the round once every match in it
/// is completed.
pub fn complete_match(
    tournament: &mut Tournament,
    match_id: &str,
    score_a: u32,
    score_b: u32,
    sink: &mut dyn MatchResultSink,
) -> Result<MatchResult, TournamentError> {
    let (ri, mi) = locate(tournament, match_id)?;
    let round = &mut tournament.rounds[ri];
    let result = round.matches[mi].complete(score_a, score_b, Utc::now())?;
    log::info!(
        "Match {} completed: {} - {}",
        match_id,
        result.score_a,
        result.score_b
    );
    sink.record(&result);
    close_round_if_done(round);
    Ok(result)
}

fn close_round_if_done(round: &mut Round) {
    if round.is_completed() || !round.matches.iter().all(GameMatch::is_completed) {
        return;
    }
    let stats = RoundStatistics::from_matches(&round.matches);
    log::info!(
        "Round {} completed: {} matches, {} points",
        round.number,
        stats.completed_matches,
        stats.total_points
    );
    round.status = RoundStatus::Completed;
    round.completed_at = Some(Utc::now());
    round.statistics = Some(stats);
}
