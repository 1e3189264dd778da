//! GsmModemBuilder -- fluent builder for constructing [`GsmModem`] sessions.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and session timing before the transport
//! connection is established.
//!
//! # Example
//!
//! ```no_run
//! use atlink_modem::builder::GsmModemBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> atlink_core::Result<()> {
//! let mut modem = GsmModemBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(9600)
//!     .idle_read_timeout(Duration::from_millis(100))
//!     .build()
//!     .await?;
//!
//! modem.init().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use atlink_core::error::{Error, Result};
use atlink_core::transport::Transport;
use atlink_transport::SerialTransport;

use crate::modem::{GsmModem, ModemConfig};
use crate::sequencer::FailurePolicy;

/// Fluent builder for [`GsmModem`].
///
/// All configuration has defaults proven against common GSM modules, so
/// the simplest usage is:
///
/// ```ignore
/// let modem = GsmModemBuilder::new()
///     .serial_port("/dev/ttyUSB0")
///     .build()
///     .await?;
/// ```
pub struct GsmModemBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    config: ModemConfig,
}

impl GsmModemBuilder {
    /// Create a builder with default session parameters.
    pub fn new() -> Self {
        GsmModemBuilder {
            serial_port: None,
            baud_rate: 9600,
            config: ModemConfig::default(),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default 9600 baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the per-read idle window that ends a reply (default: 100 ms).
    pub fn idle_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_read_timeout = timeout;
        self
    }

    /// Set the reply accumulation buffer size (default: 1024 bytes).
    pub fn response_capacity(mut self, capacity: usize) -> Self {
        self.config.response_capacity = capacity;
        self
    }

    /// Set the pause between protocol steps (default: 1 s).
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay = delay;
        self
    }

    /// Set the boot settle applied by `init` (default: 3 s).
    pub fn post_init_settle(mut self, delay: Duration) -> Self {
        self.config.post_init_settle = delay;
        self
    }

    /// Set the failure policy for one-shot sequences (default: strict).
    pub fn handshake_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.handshake_policy = policy;
        self
    }

    /// Build a [`GsmModem`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a
    /// `MockTransport` from `atlink-test-harness`) and for advanced use
    /// cases where the caller manages the transport lifecycle directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<GsmModem> {
        if self.config.response_capacity < 2 {
            return Err(Error::InvalidParameter(
                "response_capacity must be at least 2".into(),
            ));
        }
        if self.config.idle_read_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "idle_read_timeout must be non-zero".into(),
            ));
        }

        Ok(GsmModem::new(transport, self.config))
    }

    /// Build a [`GsmModem`] over a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    /// Serial open failures are fatal and abort the session.
    pub async fn build(self) -> Result<GsmModem> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let transport = SerialTransport::open(port, self.baud_rate).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

impl Default for GsmModemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlink_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let mock = MockTransport::new();
        let modem = GsmModemBuilder::new()
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        let config = modem.config();
        assert_eq!(config.idle_read_timeout, Duration::from_millis(100));
        assert_eq!(config.response_capacity, 1024);
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert_eq!(config.handshake_policy, FailurePolicy::Strict);
    }

    #[tokio::test]
    async fn builder_custom_settings() {
        let mock = MockTransport::new();
        let modem = GsmModemBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .baud_rate(115_200)
            .idle_read_timeout(Duration::from_millis(250))
            .response_capacity(4096)
            .settle_delay(Duration::from_millis(500))
            .post_init_settle(Duration::from_secs(1))
            .handshake_policy(FailurePolicy::Permissive)
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        let config = modem.config();
        assert_eq!(config.idle_read_timeout, Duration::from_millis(250));
        assert_eq!(config.response_capacity, 4096);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.post_init_settle, Duration::from_secs(1));
        assert_eq!(config.handshake_policy, FailurePolicy::Permissive);
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = GsmModemBuilder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_rejects_tiny_capacity() {
        let mock = MockTransport::new();
        let result = GsmModemBuilder::new()
            .response_capacity(1)
            .build_with_transport(Box::new(mock))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_rejects_zero_idle_timeout() {
        let mock = MockTransport::new();
        let result = GsmModemBuilder::new()
            .idle_read_timeout(Duration::ZERO)
            .build_with_transport(Box::new(mock))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
