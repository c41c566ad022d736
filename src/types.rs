use serde::{Deserialize, Serialize};
use std::fmt;

// ── Constants ──────────────────────────────────────────────────────────

/// Smallest roster the bracket generator accepts.
pub const MIN_ENTRANTS: usize = 4;
/// Roster size used by the dueling feature.
pub const DEFAULT_ENTRANTS: usize = 16;

// ── Entrants ───────────────────────────────────────────────────────────

pub type EntrantId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub id: EntrantId,
    pub label: String,
    /// Registration order, 1-based. Informational only, seeding is positional.
    pub seed: u32,
}

impl Entrant {
    pub fn new(id: EntrantId, label: impl Into<String>, seed: u32) -> Self {
        Entrant {
            id,
            label: label.into(),
            seed,
        }
    }
}

// ── Match identity ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    Winners,
    Losers,
    GrandFinals,
}

impl Bracket {
    pub fn prefix(self) -> &'static str {
        match self {
            Bracket::Winners => "W",
            Bracket::Losers => "L",
            Bracket::GrandFinals => "GF",
        }
    }
}

/// (bracket, round, match number), both numbers 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchKey {
    pub bracket: Bracket,
    pub round: u32,
    pub number: u32,
}

impl MatchKey {
    pub const fn new(bracket: Bracket, round: u32, number: u32) -> Self {
        MatchKey {
            bracket,
            round,
            number,
        }
    }

    pub const fn winners(round: u32, number: u32) -> Self {
        MatchKey::new(Bracket::Winners, round, number)
    }

    pub const fn losers(round: u32, number: u32) -> Self {
        MatchKey::new(Bracket::Losers, round, number)
    }

    pub const fn grand_finals(round: u32) -> Self {
        MatchKey::new(Bracket::GrandFinals, round, 1)
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", self.bracket.prefix(), self.round, self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Odd match numbers feed slot A of the next round, even ones slot B.
    pub fn for_match_number(number: u32) -> Side {
        if number % 2 == 1 {
            Side::A
        } else {
            Side::B
        }
    }
}

// ── Matches ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    Ready,
    Completed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Ready => "ready",
            MatchStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub key: MatchKey,
    pub slot_a: Option<EntrantId>,
    pub slot_b: Option<EntrantId>,
    pub winner: Option<EntrantId>,
    pub loser: Option<EntrantId>,
    pub status: MatchStatus,
}

impl Match {
    pub fn shell(key: MatchKey) -> Self {
        Match {
            key,
            slot_a: None,
            slot_b: None,
            winner: None,
            loser: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn seeded(key: MatchKey, slot_a: EntrantId, slot_b: EntrantId) -> Self {
        Match {
            slot_a: Some(slot_a),
            slot_b: Some(slot_b),
            status: MatchStatus::Ready,
            ..Match::shell(key)
        }
    }

    pub fn slot(&self, side: Side) -> Option<EntrantId> {
        match side {
            Side::A => self.slot_a,
            Side::B => self.slot_b,
        }
    }

    pub(crate) fn slot_mut(&mut self, side: Side) -> &mut Option<EntrantId> {
        match side {
            Side::A => &mut self.slot_a,
            Side::B => &mut self.slot_b,
        }
    }

    pub fn side_of(&self, entrant: EntrantId) -> Option<Side> {
        if self.slot_a == Some(entrant) {
            Some(Side::A)
        } else if self.slot_b == Some(entrant) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn slots_filled(&self) -> bool {
        self.slot_a.is_some() && self.slot_b.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.status == MatchStatus::Ready
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}

// ── Tournament aggregate ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Registration,
    InProgress,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Registration => "registration",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
        }
    }
}

/// Owns every match of one double-elimination event. Only the generator,
/// the advancement engine and the scheduler mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub(crate) entrants: Vec<Entrant>,
    pub(crate) matches: Vec<Match>,
    pub(crate) status: TournamentStatus,
    pub(crate) grand_finals_reset: bool,
    pub(crate) champion: Option<EntrantId>,
    pub(crate) runner_up: Option<EntrantId>,
    pub(crate) third_place: Option<EntrantId>,
}

impl Tournament {
    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn status(&self) -> TournamentStatus {
        self.status
    }

    pub fn champion(&self) -> Option<EntrantId> {
        self.champion
    }

    pub fn runner_up(&self) -> Option<EntrantId> {
        self.runner_up
    }

    pub fn third_place(&self) -> Option<EntrantId> {
        self.third_place
    }

    pub fn has_grand_finals_reset(&self) -> bool {
        self.grand_finals_reset
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    pub fn size(&self) -> usize {
        self.entrants.len()
    }

    /// k, where size = 2^k.
    pub fn winners_rounds(&self) -> u32 {
        self.size().trailing_zeros()
    }

    /// 2k - 2.
    pub fn losers_rounds(&self) -> u32 {
        2 * self.winners_rounds() - 2
    }

    pub fn get(&self, key: MatchKey) -> Option<&Match> {
        self.matches.iter().find(|m| m.key == key)
    }

    pub(crate) fn get_mut(&mut self, key: MatchKey) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.key == key)
    }

    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    pub fn label(&self, id: EntrantId) -> &str {
        self.entrant(id).map(|e| e.label.as_str()).unwrap_or("?")
    }

    pub fn matches_in(&self, bracket: Bracket) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.key.bracket == bracket)
    }

    pub fn grand_finals(&self) -> Option<&Match> {
        self.get(MatchKey::grand_finals(1))
    }

    pub fn losers_finals(&self) -> Option<&Match> {
        self.get(MatchKey::losers(self.losers_rounds(), 1))
    }

    /// Moves a freshly generated bracket into play. Idempotent once started.
    pub fn start(mut self) -> Self {
        if self.status == TournamentStatus::Registration {
            self.status = TournamentStatus::InProgress;
        }
        self
    }
}
