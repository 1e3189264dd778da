//! Transport implementations for atlink.
//!
//! This crate provides the concrete implementation of the
//! [`Transport`](atlink_core::Transport) trait from `atlink-core` for
//! serial connections:
//!
//! - [`SerialTransport`]: USB virtual COM ports, UART bridges, and RS-232
//!   links to a modem's AT command port
//!
//! # Example
//!
//! ```no_run
//! use atlink_transport::SerialTransport;
//! use atlink_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> atlink_core::Result<()> {
//! // Connect to the modem's AT port
//! let mut transport = SerialTransport::open("/dev/ttyUSB0", 9600).await?;
//!
//! // Probe it
//! transport.send(b"AT\r\n").await?;
//!
//! // Collect the reply
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_millis(100)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
