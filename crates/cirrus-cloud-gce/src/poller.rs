//! Operation completion polling

use crate::api::OperationApi;
use crate::domain::Operation;
use crate::error::Result;
use cirrus_cloud::PollConfig;
use tokio::time::{Instant, sleep};

/// Terminal state of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The operation reached DONE. It may still carry an HTTP error code.
    Done(Operation),
    /// The deadline passed first; holds the last state observed
    TimedOut(Operation),
}

impl PollOutcome {
    pub fn operation(&self) -> &Operation {
        match self {
            PollOutcome::Done(op) | PollOutcome::TimedOut(op) => op,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, PollOutcome::Done(_))
    }
}

/// Re-fetch `operation` every `config.interval` until it is DONE or
/// `config.timeout` has elapsed.
///
/// Operation-level failures are not errors here; callers inspect the
/// returned operation. Only a failing status fetch is an `Err`. Timing out
/// does not cancel anything server-side.
pub async fn await_done<A>(api: &A, operation: Operation, config: &PollConfig) -> Result<PollOutcome>
where
    A: OperationApi + ?Sized,
{
    if operation.is_done() {
        return Ok(PollOutcome::Done(operation));
    }

    let started = Instant::now();
    let mut current = operation;

    loop {
        let elapsed = started.elapsed();
        if elapsed >= config.timeout {
            tracing::warn!(
                "Operation {} still {} after {:?}, giving up",
                current.name,
                current.status,
                elapsed
            );
            return Ok(PollOutcome::TimedOut(current));
        }

        sleep(config.interval.min(config.timeout - elapsed)).await;

        match api.get_operation(&current.self_link).await? {
            Some(op) => current = op,
            None => {
                tracing::warn!("Operation {} not found while polling", current.name);
            }
        }

        tracing::debug!("Operation {} is {}", current.name, current.status);

        if current.is_done() {
            return Ok(PollOutcome::Done(current));
        }
    }
}
