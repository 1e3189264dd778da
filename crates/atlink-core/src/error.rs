//! Error types for atlink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer failures, protocol
//! failures, and sequencing failures are all captured here.
//!
//! Note that the soft outcomes of a single exchange (no reply within the
//! idle window, a truncated reply, a missing expected token) are *not*
//! errors: they are classification results carried by
//! `ResponseOutcome` in `atlink-modem`. They only become an [`Error`]
//! when a step sequence runs under a strict failure policy.

/// The error type for all atlink operations.
///
/// Variants cover the failure modes of talking to a modem over a serial
/// byte link: transport initialization and I/O failures, read deadlines,
/// malformed input, and aborted command sequences.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level failure (opening or configuring the serial port).
    ///
    /// Initialization failures are fatal: a session must not proceed on a
    /// transport that failed to open.
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level failure (unexpected data from a scripted transport,
    /// malformed exchange state).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The read deadline elapsed with no data available.
    ///
    /// Transports return this from `receive` when nothing arrived within
    /// the caller's timeout window. The response accumulator interprets it
    /// as the idle gap that ends a reply.
    #[error("timeout waiting for data")]
    Timeout,

    /// An invalid parameter was passed to a library operation
    /// (oversized command, malformed recipient, zero-size buffer).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection has been established, or the transport was closed.
    #[error("not connected")]
    NotConnected,

    /// The connection was lost unexpectedly mid-session.
    #[error("connection lost")]
    ConnectionLost,

    /// A step in a strictly-sequenced exchange failed, aborting the
    /// remainder of the sequence.
    #[error("step {index} ({command}) failed: {reason}")]
    StepFailed {
        /// Zero-based index of the failed step within its sequence.
        index: usize,
        /// Display label of the command that was being exchanged.
        command: String,
        /// Human-readable classification of the failure.
        reason: String,
    },

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
