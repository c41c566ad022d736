use crate::types::*;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
  pub entrant_id: EntrantId,
  pub label: String,
  pub seed: u32,
  pub result: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
  pub id: String,
  pub number: u32,
  pub state: String,
  pub winner_id: Option<EntrantId>,
  pub slots: [Option<SlotView>; 2],
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
  pub bracket: Bracket,
  pub round: u32,
  pub label: String,
  pub matches: Vec<MatchView>,
}

/// Render-ready layout of a tournament, grouped by bracket and round.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
  pub status: String,
  pub size: usize,
  pub rounds: Vec<RoundView>,
  pub champion: Option<String>,
  pub runner_up: Option<String>,
  pub third_place: Option<String>,
}

impl BracketView {
  pub fn from_tournament(tournament: &Tournament) -> Self {
    let k = tournament.winners_rounds();
    let losers_rounds = tournament.losers_rounds();
    let mut rounds: Vec<RoundView> = Vec::new();

    for m in tournament.matches() {
      let view = match_view(tournament, m);
      match rounds.last_mut() {
        Some(round) if round.bracket == m.key.bracket && round.round == m.key.round => {
          round.matches.push(view);
        }
        _ => rounds.push(RoundView {
          bracket: m.key.bracket,
          round: m.key.round,
          label: round_label(m.key.bracket, m.key.round, k, losers_rounds),
          matches: vec![view],
        }),
      }
    }

    let label = |id: Option<EntrantId>| id.map(|id| tournament.label(id).to_string());
    BracketView {
      status: tournament.status().as_str().to_string(),
      size: tournament.size(),
      rounds,
      champion: label(tournament.champion()),
      runner_up: label(tournament.runner_up()),
      third_place: label(tournament.third_place()),
    }
  }
}

fn match_view(tournament: &Tournament, m: &Match) -> MatchView {
  let slot = |side: Side| {
    let id = m.slot(side)?;
    let entrant = tournament.entrant(id);
    let result = match m.winner {
      Some(winner) if winner == id => Some("win".to_string()),
      Some(_) => Some("loss".to_string()),
      None => None,
    };
    Some(SlotView {
      entrant_id: id,
      label: entrant.map(|e| e.label.clone()).unwrap_or_default(),
      seed: entrant.map(|e| e.seed).unwrap_or(0),
      result,
    })
  };
  MatchView {
    id: m.key.to_string(),
    number: m.key.number,
    state: m.status.as_str().to_string(),
    winner_id: m.winner,
    slots: [slot(Side::A), slot(Side::B)],
  }
}

/// Display name for a round given k winners rounds and the losers round count.
pub fn round_label(bracket: Bracket, round: u32, winners_rounds: u32, losers_rounds: u32) -> String {
  match bracket {
    Bracket::Winners if round == winners_rounds => "Winners Finals".to_string(),
    Bracket::Winners if round + 1 == winners_rounds && winners_rounds >= 3 => "Winners Semifinals".to_string(),
    Bracket::Winners if round + 2 == winners_rounds && winners_rounds >= 4 => {
      "Winners Quarterfinals".to_string()
    }
    Bracket::Winners => format!("Winners Round {round}"),
    Bracket::Losers if round == losers_rounds => "Losers Finals".to_string(),
    Bracket::Losers => format!("Losers Round {round}"),
    Bracket::GrandFinals if round >= 2 => "Grand Finals Reset".to_string(),
    Bracket::GrandFinals => "Grand Finals".to_string(),
  }
}
