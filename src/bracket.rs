use crate::error::{BracketError, BracketResult};
use crate::types::*;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateOptions {
  /// Shuffle the roster with this seed before pairing. `None` pairs in the given order.
  pub shuffle_seed: Option<u64>,
  /// Add a second grand-finals match played only if the losers-bracket champion wins the first.
  pub grand_finals_reset: bool,
}

pub fn generate(entrants: Vec<Entrant>) -> BracketResult<Tournament> {
  generate_with(entrants, &GenerateOptions::default())
}

/// Builds every match of the event. Winners round 1 is seeded and `ready`,
/// everything else is an empty `pending` shell.
pub fn generate_with(mut entrants: Vec<Entrant>, options: &GenerateOptions) -> BracketResult<Tournament> {
  let count = entrants.len();
  if count < MIN_ENTRANTS || !count.is_power_of_two() {
    return Err(BracketError::InvalidEntrantCount { count });
  }
  let mut seen = HashSet::new();
  for entrant in &entrants {
    if !seen.insert(entrant.id) {
      return Err(BracketError::DuplicateEntrant { id: entrant.id });
    }
  }

  if let Some(seed) = options.shuffle_seed {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    entrants.shuffle(&mut rng);
    debug!("shuffled {count} entrants with seed {seed}");
  }

  let rounds = winners_round_count(count);
  let mut matches = Vec::with_capacity(2 * count);

  for i in 0..count / 2 {
    let key = MatchKey::winners(1, i as u32 + 1);
    matches.push(Match::seeded(key, entrants[2 * i].id, entrants[2 * i + 1].id));
  }
  for round in 2..=rounds {
    push_round(&mut matches, Bracket::Winners, round, winners_round_size(count, round));
  }
  for round in 1..=losers_round_count(count) {
    push_round(&mut matches, Bracket::Losers, round, losers_round_size(count, round));
  }
  matches.push(Match::shell(MatchKey::grand_finals(1)));
  if options.grand_finals_reset {
    matches.push(Match::shell(MatchKey::grand_finals(2)));
  }

  info!(
    "generated double-elimination bracket: {count} entrants, {} matches, reset={}",
    matches.len(),
    options.grand_finals_reset
  );

  Ok(Tournament {
    entrants,
    matches,
    status: TournamentStatus::Registration,
    grand_finals_reset: options.grand_finals_reset,
    champion: None,
    runner_up: None,
    third_place: None,
  })
}

fn push_round(matches: &mut Vec<Match>, bracket: Bracket, round: u32, size: usize) {
  for number in 1..=size as u32 {
    matches.push(Match::shell(MatchKey::new(bracket, round, number)));
  }
}

/// k for a roster of 2^k entrants.
pub fn winners_round_count(entrants: usize) -> u32 {
  entrants.max(2).next_power_of_two().trailing_zeros()
}

pub fn losers_round_count(entrants: usize) -> u32 {
  (2 * winners_round_count(entrants)).saturating_sub(2)
}

pub fn winners_round_size(entrants: usize, round: u32) -> usize {
  entrants >> round
}

/// Losers rounds come in pairs of equal size: 2j-1 and 2j hold N / 2^(j+1) matches.
pub fn losers_round_size(entrants: usize, round: u32) -> usize {
  let pair = (round + 1) / 2;
  entrants >> (pair + 1)
}
