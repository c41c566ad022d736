use crate::error::{BracketError, BracketResult};
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// A resolved match: who won and who lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advancement {
  pub key: MatchKey,
  pub winner: EntrantId,
  pub loser: EntrantId,
}

/// Where an entrant goes after a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
  Slot(MatchKey, Side),
  /// Grand-finals reset: both entrants play again.
  Reset,
  /// The deciding grand-finals match.
  Champion,
  Eliminated,
}

/// Records the result of `key` and routes both entrants, returning the next
/// aggregate. The input is left untouched, so a failed advance never leaves
/// a half-applied bracket behind.
pub fn advance(
  tournament: &Tournament,
  key: MatchKey,
  winner: EntrantId,
  loser: EntrantId,
) -> BracketResult<Tournament> {
  let mut next = tournament.clone();
  apply(&mut next, key, winner, loser).map_err(|e| {
    error!("advance {key} rejected: {e}");
    e
  })?;
  Ok(next)
}

fn apply(t: &mut Tournament, key: MatchKey, winner: EntrantId, loser: EntrantId) -> BracketResult<()> {
  let current = t
    .get(key)
    .cloned()
    .ok_or_else(|| BracketError::consistency(key, "match does not exist"))?;

  if current.is_completed() {
    if current.winner == Some(winner) && current.loser == Some(loser) {
      debug!("{key} already recorded, ignoring repeat");
      return Ok(());
    }
    return Err(BracketError::consistency(key, "match already completed with a different result"));
  }
  if t.is_completed() {
    return Err(BracketError::consistency(key, "tournament is already completed"));
  }
  if !current.is_ready() {
    return Err(BracketError::consistency(key, "match is not ready"));
  }
  if winner == loser || current.side_of(winner).is_none() || current.side_of(loser).is_none() {
    return Err(BracketError::consistency(
      key,
      format!("result {winner} over {loser} does not match the entrants in the slots"),
    ));
  }

  let winner_route = winner_route(t, &current, winner);
  let loser_route = loser_route(key);

  if let Some(m) = t.get_mut(key) {
    m.winner = Some(winner);
    m.loser = Some(loser);
    m.status = MatchStatus::Completed;
  }
  if t.status == TournamentStatus::Registration {
    t.status = TournamentStatus::InProgress;
  }
  debug!(
    "{key}: {} beat {}",
    t.label(winner),
    t.label(loser)
  );

  match winner_route {
    Route::Slot(dest, side) => place(t, dest, side, winner)?,
    Route::Reset => {
      let reset = MatchKey::grand_finals(2);
      place(t, reset, Side::A, loser)?;
      place(t, reset, Side::B, winner)?;
      info!("grand finals reset: {} forces a second match", t.label(winner));
    }
    Route::Champion => finish(t, winner, loser),
    Route::Eliminated => {}
  }
  if let Route::Slot(dest, side) = loser_route {
    place(t, dest, side, loser)?;
  }
  Ok(())
}

/// Winner destination for a match in a bracket of 2^k entrants.
pub fn winner_route(t: &Tournament, m: &Match, winner: EntrantId) -> Route {
  let k = t.winners_rounds();
  let losers_final = t.losers_rounds();
  let MatchKey { bracket, round, number } = m.key;
  match bracket {
    Bracket::Winners if round < k => Route::Slot(
      MatchKey::winners(round + 1, number.div_ceil(2)),
      Side::for_match_number(number),
    ),
    Bracket::Winners => Route::Slot(MatchKey::grand_finals(1), Side::A),
    Bracket::Losers if round == losers_final => Route::Slot(MatchKey::grand_finals(1), Side::B),
    // Odd losers rounds feed the drop-in round of the same size.
    Bracket::Losers if round % 2 == 1 => Route::Slot(MatchKey::losers(round + 1, number), Side::A),
    Bracket::Losers => Route::Slot(
      MatchKey::losers(round + 1, number.div_ceil(2)),
      Side::for_match_number(number),
    ),
    Bracket::GrandFinals if round == 1 && t.grand_finals_reset && m.side_of(winner) == Some(Side::B) => {
      Route::Reset
    }
    Bracket::GrandFinals => Route::Champion,
  }
}

/// Drop-in mapping: where the loser of `key` continues, if anywhere.
pub fn loser_route(key: MatchKey) -> Route {
  let MatchKey { bracket, round, number } = key;
  match bracket {
    Bracket::Winners if round == 1 => Route::Slot(
      MatchKey::losers(1, number.div_ceil(2)),
      Side::for_match_number(number),
    ),
    Bracket::Winners => Route::Slot(MatchKey::losers(2 * round - 2, number), Side::B),
    // A second loss ends the run; grand-finals losers are handled by the winner route.
    Bracket::Losers | Bracket::GrandFinals => Route::Eliminated,
  }
}

fn place(t: &mut Tournament, key: MatchKey, side: Side, entrant: EntrantId) -> BracketResult<()> {
  let m = t
    .get_mut(key)
    .ok_or_else(|| BracketError::consistency(key, "destination match does not exist"))?;
  if m.is_completed() {
    return Err(BracketError::consistency(key, "destination match already completed"));
  }
  let slot = m.slot_mut(side);
  match *slot {
    Some(existing) if existing == entrant => return Ok(()),
    Some(existing) => {
      return Err(BracketError::consistency(
        key,
        format!("slot {side:?} already holds entrant {existing}, cannot place {entrant}"),
      ));
    }
    None => *slot = Some(entrant),
  }
  if m.slots_filled() && m.status == MatchStatus::Pending {
    m.status = MatchStatus::Ready;
    debug!("{key} is ready");
  }
  Ok(())
}

fn finish(t: &mut Tournament, champion: EntrantId, runner_up: EntrantId) {
  t.status = TournamentStatus::Completed;
  t.champion = Some(champion);
  t.runner_up = Some(runner_up);
  t.third_place = t.losers_finals().and_then(|m| m.loser);
  info!(
    "tournament complete: champion {}, runner-up {}",
    t.label(champion),
    t.label(runner_up)
  );
}
