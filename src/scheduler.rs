use crate::advance::{advance, Advancement};
use crate::error::{BracketError, BracketResult};
use crate::resolver::MatchResolver;
use crate::types::*;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
  Resolved(Advancement),
  /// Grand finals already decided.
  Finished,
  /// Nothing is ready but the event is not over: the bracket is stalled.
  NoReadyMatches,
}

/// Ready matches in bracket order: winners, losers, grand finals, then
/// round and match number.
pub fn ready_matches(tournament: &Tournament) -> Vec<MatchKey> {
  let mut keys = tournament
    .matches()
    .iter()
    .filter(|m| m.is_ready())
    .map(|m| m.key)
    .collect::<Vec<_>>();
  keys.sort();
  keys
}

/// Resolves exactly one ready match.
pub fn step<R>(tournament: Tournament, resolver: &mut R) -> BracketResult<(Tournament, Step)>
where
  R: MatchResolver + ?Sized,
{
  if tournament.is_completed() {
    return Ok((tournament, Step::Finished));
  }
  let Some(key) = ready_matches(&tournament).into_iter().next() else {
    return Ok((tournament, Step::NoReadyMatches));
  };
  let result = resolve_match(&tournament, key, resolver)?;
  let next = advance(&tournament, key, result.winner, result.loser)?;
  Ok((next, Step::Resolved(result)))
}

pub fn run<R>(tournament: Tournament, resolver: &mut R) -> BracketResult<Tournament>
where
  R: MatchResolver + ?Sized,
{
  run_with(tournament, resolver, |_, _| {})
}

/// Runs passes over the ready set until grand finals is decided. The
/// observer sees every result together with the aggregate it produced.
pub fn run_with<R, F>(mut tournament: Tournament, resolver: &mut R, mut observer: F) -> BracketResult<Tournament>
where
  R: MatchResolver + ?Sized,
  F: FnMut(&Advancement, &Tournament),
{
  tournament = tournament.start();
  let mut pass = 0usize;
  loop {
    if tournament.is_completed() {
      info!("bracket settled after {pass} passes");
      return Ok(tournament);
    }
    let ready = ready_matches(&tournament);
    if ready.is_empty() {
      let pending = pending_count(&tournament);
      warn!("bracket stalled with {pending} pending matches");
      return Err(BracketError::NoReadyMatches { pending });
    }
    pass += 1;
    debug!("pass {pass}: {} ready matches", ready.len());
    for key in ready {
      let result = resolve_match(&tournament, key, resolver)?;
      tournament = advance(&tournament, key, result.winner, result.loser)?;
      observer(&result, &tournament);
      if tournament.is_completed() {
        break;
      }
    }
  }
}

fn resolve_match<R>(tournament: &Tournament, key: MatchKey, resolver: &mut R) -> BracketResult<Advancement>
where
  R: MatchResolver + ?Sized,
{
  let m = tournament
    .get(key)
    .ok_or_else(|| BracketError::consistency(key, "match does not exist"))?;
  let (Some(a_id), Some(b_id)) = (m.slot_a, m.slot_b) else {
    return Err(BracketError::consistency(key, "ready match is missing an entrant"));
  };
  let entrant = |id| {
    tournament
      .entrant(id)
      .ok_or_else(|| BracketError::consistency(key, format!("unknown entrant {id}")))
  };
  let (a, b) = (entrant(a_id)?, entrant(b_id)?);
  let (winner, loser) = match resolver.resolve(key, a, b) {
    Side::A => (a_id, b_id),
    Side::B => (b_id, a_id),
  };
  Ok(Advancement { key, winner, loser })
}

pub(crate) fn pending_count(tournament: &Tournament) -> usize {
  tournament
    .matches()
    .iter()
    .filter(|m| m.status == MatchStatus::Pending)
    .count()
}
