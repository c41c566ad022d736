use crate::error::{BracketError, BracketResult};
use crate::resolver::MatchResolver;
use crate::scheduler::{pending_count, step, Step};
use crate::types::Tournament;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct PacedRun {
  pub tournament: Tournament,
  /// Set when the run stopped on a cancel signal before grand finals.
  pub cancelled: bool,
  pub resolved: usize,
}

/// Resolves one match at a time with `delay` between results. The delay is
/// presentation only; `Duration::ZERO` runs straight through. Cancelling
/// returns the aggregate as of the last completed advance.
pub async fn run_paced<R>(
  tournament: Tournament,
  resolver: &mut R,
  delay: Duration,
  mut cancel: watch::Receiver<bool>,
) -> BracketResult<PacedRun>
where
  R: MatchResolver + ?Sized,
{
  let mut tournament = tournament.start();
  let mut resolved = 0usize;
  loop {
    if *cancel.borrow() {
      info!("paced run cancelled after {resolved} matches");
      return Ok(PacedRun { tournament, cancelled: true, resolved });
    }
    let (next, outcome) = step(tournament, resolver)?;
    tournament = next;
    match outcome {
      Step::Finished => return Ok(PacedRun { tournament, cancelled: false, resolved }),
      Step::NoReadyMatches => {
        let pending = pending_count(&tournament);
        warn!("paced run stalled with {pending} pending matches");
        return Err(BracketError::NoReadyMatches { pending });
      }
      Step::Resolved(result) => {
        resolved += 1;
        info!(
          "{}: {} def. {}",
          result.key,
          tournament.label(result.winner),
          tournament.label(result.loser)
        );
        if tournament.is_completed() {
          return Ok(PacedRun { tournament, cancelled: false, resolved });
        }
        if delay.is_zero() {
          // let a current-thread runtime poll the cancel source
          tokio::task::yield_now().await;
        } else {
          pace(delay, &mut cancel).await;
        }
      }
    }
  }
}

async fn pace(delay: Duration, cancel: &mut watch::Receiver<bool>) {
  tokio::select! {
    _ = tokio::time::sleep(delay) => {}
    cancelled = cancel.wait_for(|c| *c) => {
      // sender gone: nobody can cancel any more, keep the pacing
      if cancelled.is_err() {
        tokio::time::sleep(delay).await;
      }
    }
  }
}
