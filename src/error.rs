use crate::types::{EntrantId, MatchKey};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    #[error("bracket needs a power-of-two roster of at least 4 entrants, got {count}")]
    InvalidEntrantCount { count: usize },
    #[error("entrant {id} appears more than once in the roster")]
    DuplicateEntrant { id: EntrantId },
    #[error("bracket consistency violated at {key}: {detail}")]
    BracketConsistency { key: MatchKey, detail: String },
    #[error("no ready matches while {pending} matches are still pending")]
    NoReadyMatches { pending: usize },
}

impl BracketError {
    pub(crate) fn consistency(key: MatchKey, detail: impl Into<String>) -> Self {
        BracketError::BracketConsistency {
            key,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("entrant pool is full ({capacity} entrants)")]
    Full { capacity: usize },
    #[error("entrant {id} is already registered")]
    Duplicate { id: EntrantId },
    #[error("entrant {id} has an empty label")]
    EmptyLabel { id: EntrantId },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Bracket(#[from] BracketError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type BracketResult<T> = Result<T, BracketError>;
