//! Mock transport for deterministic testing of the exchange engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs. This lets you test command encoding, reply
//! accumulation, and outcome classification without real hardware.
//!
//! Replies can be scripted as a single blob or as an ordered list of
//! chunks, where each chunk is handed out by one `receive()` call. That
//! models a modem that transmits a reply in fragments with sub-window
//! gaps -- exactly the arrival pattern idle-gap framing has to reassemble.
//!
//! # Example
//!
//! ```
//! use atlink_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the engine sends this command, reply in two fragments.
//! mock.expect_chunked(b"AT\r\n", &[b"\r\nOK", b"\r\n"]);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;

use atlink_core::error::{Error, Result};
use atlink_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// Reply fragments, one per `receive()` call. Empty means silence.
    chunks: VecDeque<Vec<u8>>,
}

/// A mock [`Transport`] for testing protocol code without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; that
/// expectation's reply chunks are then handed out by subsequent
/// `receive()` calls, one chunk per call. A drained mock times out, which
/// is how idle-gap framing sees the end of a reply.
///
/// If no expectation matches or the queue is exhausted, an error is
/// returned.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// Reply chunks pending for `receive()` calls.
    pending: VecDeque<Vec<u8>>,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
    /// When set, `send()` accepts at most this many bytes per call.
    write_limit: Option<usize>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending: VecDeque::new(),
            connected: true,
            sent_log: Vec::new(),
            write_limit: None,
        }
    }

    /// Add an expected request with a single-blob reply.
    ///
    /// The reply is still handed out in pieces no larger than the
    /// receiver's buffer. An empty `response` behaves like
    /// [`expect_silence`](Self::expect_silence).
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        let chunks = if response.is_empty() {
            VecDeque::new()
        } else {
            VecDeque::from(vec![response.to_vec()])
        };
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            chunks,
        });
    }

    /// Add an expected request whose reply arrives as the given fragments,
    /// one fragment per `receive()` call.
    pub fn expect_chunked(&mut self, request: &[u8], chunks: &[&[u8]]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        });
    }

    /// Add an expected request that the modem never answers: every
    /// `receive()` after it times out.
    pub fn expect_silence(&mut self, request: &[u8]) {
        self.expect(request, b"");
    }

    /// Make `send()` accept at most `limit` bytes per call, simulating a
    /// transport that reports short writes.
    pub fn limit_write(&mut self, limit: usize) {
        self.write_limit = Some(limit);
    }

    /// Return a reference to all data that has been sent through this
    /// transport. Each element is the byte slice one `send()` call was
    /// asked to transmit (the full slice, even under a write limit).
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls
    /// will return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // Record what was sent.
        self.sent_log.push(data.to_vec());

        // Match against the next expectation.
        let expectation = self.expectations.pop_front().ok_or_else(|| {
            Error::Protocol("no more expectations in mock transport".into())
        })?;
        if data != expectation.request.as_slice() {
            return Err(Error::Protocol(format!(
                "unexpected send data: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }

        // Any unread reply from the previous exchange is dropped, as a
        // fresh exchange would overwrite it on a real line drain.
        self.pending = expectation.chunks;

        let accepted = match self.write_limit {
            Some(limit) => limit.min(data.len()),
            None => data.len(),
        };
        Ok(accepted)
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let Some(chunk) = self.pending.pop_front() else {
            return Err(Error::Timeout);
        };

        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);

        // A fragment larger than the receive buffer stays queued.
        if n < chunk.len() {
            self.pending.push_front(chunk[n..].to_vec());
        }

        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlink_core::transport::Transport;

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"\r\nOK\r\n");

        let written = mock.send(b"AT\r\n").await.unwrap();
        assert_eq!(written, 4);

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(&buf[..n], b"\r\nOK\r\n");
    }

    #[tokio::test]
    async fn mock_transport_chunked_delivery() {
        let mut mock = MockTransport::new();
        mock.expect_chunked(b"AT\r\n", &[b"OK", b"\r\n"]);

        mock.send(b"AT\r\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"OK");

        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"\r\n");

        // Drained: further receives time out.
        let result = mock.receive(&mut buf, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn mock_transport_silence_times_out() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"AT\r\n");

        mock.send(b"AT\r\n").await.unwrap();

        let mut buf = [0u8; 64];
        let result = mock.receive(&mut buf, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    #[tokio::test]
    async fn mock_transport_partial_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"X", &[0xAA, 0xBB, 0xCC, 0xDD]);

        mock.send(b"X").await.unwrap();

        // Read with a buffer smaller than the reply.
        let mut buf = [0u8; 2];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &[0xAA, 0xBB]);

        // Read the remaining bytes.
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], &[0xCC, 0xDD]);
    }

    #[tokio::test]
    async fn mock_transport_write_limit_reports_short_writes() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATE0\r\n", b"");
        mock.limit_write(3);

        let written = mock.send(b"ATE0\r\n").await.unwrap();
        assert_eq!(written, 3);

        // The full attempted slice is still logged.
        assert_eq!(mock.sent_data(), &[b"ATE0\r\n".to_vec()]);
    }

    #[tokio::test]
    async fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"OK");
        mock.expect(&[0x1A], b"OK");

        mock.send(b"AT\r\n").await.unwrap();
        mock.send(&[0x1A]).await.unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], b"AT\r\n");
        assert_eq!(mock.sent_data()[1], &[0x1A]);
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"OK");

        let result = mock.send(b"ATE0\r\n").await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();

        let result = mock.send(b"AT\r\n").await;
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn mock_transport_remaining_expectations() {
        let mut mock = MockTransport::new();
        mock.expect(b"A", b"1");
        mock.expect(b"B", b"2");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"A").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);

        mock.send(b"B").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"AT\r\n").await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn mock_transport_set_connected() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        assert!(!mock.is_connected());

        let result = mock.send(b"AT\r\n").await;
        assert!(matches!(result, Err(Error::NotConnected)));

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }
}
