//! Transport trait for modem communication.
//!
//! The [`Transport`] trait abstracts over the duplex byte channel to a
//! modem. Implementations exist for serial ports (`atlink-transport`) and
//! mock transports for testing (`atlink-test-harness`).
//!
//! The protocol engine in `atlink-modem` operates on a `Transport` rather
//! than directly on a serial port, enabling both real hardware control and
//! deterministic unit testing.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a modem.
///
/// Implementations handle the physical layer only. Protocol concerns
/// (command framing, reply accumulation, outcome classification) belong to
/// the exchange engine that consumes this trait.
///
/// The transport is a single-owner resource: exactly one exchange may be
/// in flight at a time, and no other task may use the channel concurrently
/// during a session.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the modem and return how many were accepted.
    ///
    /// Implementations write once and report the accepted count rather
    /// than looping until everything is out: a short write is a fact the
    /// caller's sequencing policy decides how to handle, not something the
    /// transport retries on its own.
    async fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Receive bytes from the modem into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Waits up to `timeout`
    /// for data to arrive and returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing was
    /// received within the deadline. A read always runs to the end of its
    /// window or until bytes arrive; there is no mid-read cancellation.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// After `close()`, subsequent `send()` and `receive()` calls should
    /// return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
