//! Exchange sequencing.
//!
//! The sequencer owns the transport and a framing strategy for the
//! lifetime of a session and drives ordered series of exchange steps
//! through the per-step state machine:
//!
//! ```text
//! Idle -> Sending -> Awaiting -> Classified -> (settle delay) -> Idle
//! ```
//!
//! Steps are strictly sequential: exactly one command is outstanding at a
//! time, and no step begins until the previous step's settle delay has
//! elapsed, regardless of that step's outcome.
//!
//! Two usage patterns are supported: a finite ordered list executed once
//! ([`ExchangeSequencer::run`], for initialization handshakes and message
//! submission) and an unbounded repeating single step
//! ([`ExchangeSequencer::run_repeating`], for keepalive probes), which
//! runs until an external cancellation token is observed. Cancellation is
//! checked between steps only; an in-flight read always runs to the end of
//! its window.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use atlink_core::error::Error;
use atlink_core::transport::Transport;
use atlink_core::Result;

use crate::classify::{classify, ResponseOutcome};
use crate::commands::Command;
use crate::framing::FramingStrategy;
use crate::transmit::{send_command, WriteResult};

/// One step of an exchange sequence: a command, the token its reply is
/// expected to contain (if any), and the settle delay that must elapse
/// before the next step.
#[derive(Debug, Clone)]
pub struct ExchangeStep {
    command: Command,
    expected_token: Option<String>,
    settle_delay: Duration,
}

impl ExchangeStep {
    /// A step with no reply expectation.
    ///
    /// Used for payloads the modem does not answer on their own, such as
    /// a message body awaiting its submit-control byte: a silent reply
    /// window is the normal case, not a failure.
    pub fn new(command: Command, settle_delay: Duration) -> Self {
        ExchangeStep {
            command,
            expected_token: None,
            settle_delay,
        }
    }

    /// A step whose reply is expected to contain `token`.
    pub fn expecting(command: Command, token: &str, settle_delay: Duration) -> Self {
        ExchangeStep {
            command,
            expected_token: Some(token.to_string()),
            settle_delay,
        }
    }

    /// The command transmitted by this step.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// The expected reply token, if any.
    pub fn expected_token(&self) -> Option<&str> {
        self.expected_token.as_deref()
    }

    /// The pause inserted after this step's classification.
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }
}

/// What to do when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the sequence on the first failed step.
    ///
    /// The right default for one-shot handshakes: a failed "enter text
    /// mode" step should not be followed by a payload.
    Strict,
    /// Log the failure and keep going.
    ///
    /// Matches the behavior this protocol's hosts have historically shown
    /// and fits best-effort probe loops.
    Permissive,
}

/// The recorded result of one executed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// How the transmit half went.
    pub write: WriteResult,
    /// The classified reply.
    pub response: ResponseOutcome,
}

/// Judge a step's outcome against its expectations.
///
/// A step fails on a short write, or -- only when a reply token was
/// expected -- on a timeout, a truncated reply, or a missing token. Steps
/// without an expectation tolerate silence and truncation: nothing was
/// promised about their reply.
fn failure_reason(step: &ExchangeStep, outcome: &StepOutcome) -> Option<String> {
    if let WriteResult::Partial(written) = outcome.write {
        return Some(format!(
            "short write ({written} of {} bytes)",
            step.command().len()
        ));
    }
    if step.expected_token().is_some() && !outcome.response.is_clean() {
        return Some(outcome.response.describe().to_string());
    }
    None
}

/// Drives sequences of exchange steps over an exclusively-owned transport.
///
/// The sequencer holds the transport for the whole session -- the
/// transport is a single-owner resource, and the accumulation buffer of
/// the in-flight exchange is owned by that exchange alone. Use
/// [`into_transport`](Self::into_transport) to recover the transport when
/// the session ends.
pub struct ExchangeSequencer {
    transport: Box<dyn Transport>,
    framing: Box<dyn FramingStrategy>,
}

impl ExchangeSequencer {
    /// Create a sequencer from a transport and a framing strategy.
    pub fn new(transport: Box<dyn Transport>, framing: Box<dyn FramingStrategy>) -> Self {
        ExchangeSequencer { transport, framing }
    }

    /// Execute a single step: transmit, accumulate, classify.
    ///
    /// Does not apply the settle delay; sequencing concerns (delays,
    /// failure policy) belong to [`run`](Self::run) and
    /// [`run_repeating`](Self::run_repeating).
    pub async fn execute(&mut self, step: &ExchangeStep) -> Result<StepOutcome> {
        let write = send_command(&mut *self.transport, step.command()).await?;
        let raw = self.framing.collect(&mut *self.transport).await?;
        let response = classify(&raw, step.expected_token());

        debug!(
            command = %step.command(),
            outcome = response.describe(),
            "exchange complete"
        );

        Ok(StepOutcome { write, response })
    }

    /// Execute an ordered sequence of steps.
    ///
    /// Every step's settle delay elapses after its classification, so a
    /// following step (in this sequence or a later one) never starts
    /// early. Under [`FailurePolicy::Strict`] the first failed step aborts
    /// the remainder with [`Error::StepFailed`]; under
    /// [`FailurePolicy::Permissive`] failures are logged and the sequence
    /// continues, with every outcome returned in order.
    pub async fn run(
        &mut self,
        steps: &[ExchangeStep],
        policy: FailurePolicy,
    ) -> Result<Vec<StepOutcome>> {
        let mut outcomes = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let outcome = self.execute(step).await?;
            let failure = failure_reason(step, &outcome);

            match (&failure, policy) {
                (Some(reason), FailurePolicy::Strict) => {
                    warn!(index, command = %step.command(), reason, "aborting sequence");
                    return Err(Error::StepFailed {
                        index,
                        command: step.command().label().to_string(),
                        reason: reason.clone(),
                    });
                }
                (Some(reason), FailurePolicy::Permissive) => {
                    warn!(index, command = %step.command(), reason, "continuing past failed step");
                }
                (None, _) => {}
            }

            outcomes.push(outcome);
            tokio::time::sleep(step.settle_delay()).await;
        }

        Ok(outcomes)
    }

    /// Repeat a single step until `cancel` is observed.
    ///
    /// The repeating pattern is inherently permissive: failed iterations
    /// are logged and the probing continues. Transport-level errors still
    /// propagate. Cancellation is observed between steps (it also cuts the
    /// settle delay short); an in-flight read runs to the end of its
    /// window. Returns the number of iterations completed.
    pub async fn run_repeating(
        &mut self,
        step: &ExchangeStep,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let mut iterations: u64 = 0;

        while !cancel.is_cancelled() {
            let outcome = self.execute(step).await?;
            iterations += 1;

            if let Some(reason) = failure_reason(step, &outcome) {
                warn!(command = %step.command(), reason, iterations, "probe failed; continuing");
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(step.settle_delay()) => {}
            }
        }

        info!(iterations, "repeating exchange cancelled");
        Ok(iterations)
    }

    /// Recover the transport, ending the session.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }
}
