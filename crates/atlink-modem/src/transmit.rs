//! Command transmission.
//!
//! One job: put a command's bytes on the transport and report whether the
//! transport accepted all of them. Short writes are reported, not retried
//! -- whether to retry or press on is sequencing policy, decided by the
//! caller.

use tracing::{debug, warn};

use atlink_core::transport::Transport;
use atlink_core::Result;

use crate::commands::Command;

/// Result of transmitting a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// The transport accepted every byte of the command.
    Complete,
    /// The transport accepted only the given number of bytes.
    Partial(usize),
}

impl WriteResult {
    /// Whether the full command went out.
    pub fn is_complete(&self) -> bool {
        matches!(self, WriteResult::Complete)
    }
}

/// Transmit `command` on `transport`.
///
/// Returns [`WriteResult::Complete`] if the transport reports exactly
/// `command.len()` bytes accepted, [`WriteResult::Partial`] otherwise.
/// Transport-level failures (closed port, I/O error) propagate as errors.
pub async fn send_command(
    transport: &mut dyn Transport,
    command: &Command,
) -> Result<WriteResult> {
    let written = transport.send(command.bytes()).await?;

    if written == command.len() {
        debug!(command = %command, bytes = written, "command sent");
        Ok(WriteResult::Complete)
    } else {
        warn!(
            command = %command,
            written,
            expected = command.len(),
            "short write"
        );
        Ok(WriteResult::Partial(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cmd_probe;
    use atlink_test_harness::MockTransport;

    #[tokio::test]
    async fn full_write_is_complete() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"OK\r\n");

        let result = send_command(&mut mock, &cmd_probe()).await.unwrap();
        assert_eq!(result, WriteResult::Complete);
        assert!(result.is_complete());
        assert_eq!(mock.sent_data(), &[b"AT\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn short_write_is_reported_not_retried() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATE0\r\n", b"");
        mock.limit_write(3);

        let cmd = crate::commands::cmd_disable_echo();
        let result = send_command(&mut mock, &cmd).await.unwrap();
        assert_eq!(result, WriteResult::Partial(3));
        assert!(!result.is_complete());

        // Exactly one send call reached the transport.
        assert_eq!(mock.sent_data().len(), 1);
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let result = send_command(&mut mock, &cmd_probe()).await;
        assert!(matches!(result, Err(atlink_core::Error::NotConnected)));
    }
}
