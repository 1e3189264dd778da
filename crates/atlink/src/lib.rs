//! # atlink -- Async AT-Command Modem Control
//!
//! `atlink` is an asynchronous Rust library for driving cellular modems
//! over a serial byte link using the Hayes AT command convention. It is
//! designed for hosts that need reliable one-command-at-a-time exchanges:
//! initialization handshakes, text-mode SMS submission, and long-running
//! keepalive probing.
//!
//! ## Quick Start
//!
//! Add `atlink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! atlink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a modem and send a message:
//!
//! ```no_run
//! use atlink::modem::GsmModemBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut modem = GsmModemBuilder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .baud_rate(9600)
//!         .build()
//!         .await?;
//!
//!     modem.init().await?;
//!     modem.send_text_message("+5585998219955", "Qual a senha?").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                       |
//! |-----------------------|-----------------------------------------------|
//! | `atlink-core`         | [`Transport`] trait, errors                   |
//! | `atlink-transport`    | Serial transport implementation               |
//! | `atlink-modem`        | Exchange engine and GSM driver                |
//! | `atlink-test-harness` | Mock transport for hardware-free testing      |
//! | **`atlink`**          | This facade crate -- re-exports everything    |
//!
//! ## The exchange model
//!
//! Every operation reduces to the same exchange: transmit one command,
//! accumulate the modem's unframed reply until the line goes quiet for an
//! idle window (or a pluggable
//! [`FramingStrategy`](modem::FramingStrategy) decides otherwise),
//! classify the result against an expected token such as `OK`, settle,
//! and move on. Sequences run strict (abort on the first failed step --
//! the default for handshakes) or permissive (log and continue -- the
//! keepalive behavior).
//!
//! Exactly one command is outstanding at a time; the transport is owned
//! by the session for its whole lifetime.

pub use atlink_core::*;

/// Transport implementations (serial).
///
/// Provides [`SerialTransport`](transport::SerialTransport) and
/// [`SerialConfig`](transport::SerialConfig) for modem AT ports over USB
/// virtual COM ports, UART bridges, and RS-232 links.
pub mod transport {
    pub use atlink_transport::*;
}

/// The AT exchange engine and GSM modem driver.
///
/// Provides [`GsmModem`](modem::GsmModem) and
/// [`GsmModemBuilder`](modem::GsmModemBuilder) plus the lower-level
/// exchange pieces (command builders, framing strategies, the
/// classifier, and the sequencer) for callers that drive the protocol
/// directly.
pub mod modem {
    pub use atlink_modem::*;
}
