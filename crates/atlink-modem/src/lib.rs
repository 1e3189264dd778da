//! AT command/response exchange engine for atlink.
//!
//! This crate implements the Hayes-style exchange protocol used to drive
//! cellular modems over a serial byte link. It provides:
//!
//! - **Command builders** ([`commands`]) -- the [`Command`](commands::Command)
//!   value type and constructors for the standard operations (probe, echo
//!   control, SMS text mode, message submission).
//! - **Transmission** ([`transmit`]) -- put a command on the transport and
//!   report complete vs. short writes.
//! - **Framing** ([`framing`]) -- accumulate the unframed reply stream
//!   under a pluggable [`FramingStrategy`](framing::FramingStrategy):
//!   idle-gap (the reference rule) or token-terminated.
//! - **Classification** ([`classify`]) -- turn an accumulated reply into a
//!   [`ResponseOutcome`](classify::ResponseOutcome): ok, timed out, or
//!   truncated, with the expected-token verdict.
//! - **Sequencing** ([`sequencer`]) -- drive ordered step lists and
//!   repeating probes over an exclusively-owned transport, with strict or
//!   permissive failure policy.
//! - **Modem driver** ([`modem`]) -- the packaged GSM session:
//!   initialization handshake, text-mode message submission, keepalive.
//! - **Builder** ([`builder`]) -- fluent construction of
//!   [`GsmModem`](modem::GsmModem) sessions.
//!
//! # Example
//!
//! ```
//! use atlink_modem::commands::cmd_probe;
//! use atlink_modem::classify::{classify, ResponseOutcome};
//! use atlink_modem::framing::RawResponse;
//!
//! // Build a probe command
//! let cmd = cmd_probe();
//! assert_eq!(cmd.bytes(), b"AT\r\n");
//!
//! // Simulate a collected reply and classify it
//! let raw = RawResponse::new(b"\r\nOK\r\n".to_vec(), 1024);
//! match classify(&raw, Some("OK")) {
//!     ResponseOutcome::Ok { token_matched, .. } => {
//!         assert_eq!(token_matched, Some(true));
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod builder;
pub mod classify;
pub mod commands;
pub mod framing;
pub mod modem;
pub mod sequencer;
pub mod transmit;

// Re-export the working set at crate root.
pub use builder::GsmModemBuilder;
pub use classify::{classify, ResponseOutcome};
pub use commands::Command;
pub use framing::{FramingStrategy, IdleGapFraming, RawResponse, TokenTerminatedFraming};
pub use modem::{GsmModem, ModemConfig};
pub use sequencer::{ExchangeSequencer, ExchangeStep, FailurePolicy, StepOutcome};
pub use transmit::{send_command, WriteResult};
