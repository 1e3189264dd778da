//! Response accumulation and framing strategies.
//!
//! AT replies are an unframed byte stream: no length prefix, no reliable
//! end marker. The boundary of a reply has to be inferred, and how it is
//! inferred is a pluggable capability -- the [`FramingStrategy`] trait --
//! so the exchange sequencer never needs to know which rule is in force.
//!
//! Two strategies are provided:
//!
//! - [`IdleGapFraming`] -- the reference rule: a reply ends when the modem
//!   has been silent for one idle-read window.
//! - [`TokenTerminatedFraming`] -- a reply ends when a known token (such
//!   as `OK`) has been seen, or an overall deadline passes.
//!
//! # The idle-gap heuristic
//!
//! Idle-gap framing is a heuristic, not a protocol guarantee. It assumes
//! that no legitimate reply pauses internally for longer than the idle
//! window, and that the host never falls more than one window behind the
//! arrival stream. A modem that thinks for longer than the window
//! mid-reply will have its reply split across two exchanges. This is the
//! single biggest correctness risk in the design; tune the window to the
//! slowest modem you talk to.

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use tracing::trace;

use atlink_core::error::Error;
use atlink_core::transport::Transport;
use atlink_core::Result;

/// Read chunk size for a single transport poll.
const READ_CHUNK: usize = 256;

/// An accumulated reply, owned by value.
///
/// The buffer is bounded: accumulation stops one byte short of the
/// capacity it was collected under, so a full buffer is distinguishable
/// from one that ended on an idle gap. `len() == capacity() - 1` therefore
/// means the reply may have been cut off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    bytes: Vec<u8>,
    capacity: usize,
}

impl RawResponse {
    /// Wrap collected bytes with the capacity they were collected under.
    ///
    /// Panics if `capacity < 2` or the bytes exceed `capacity - 1`; both
    /// are programmer errors, not runtime conditions.
    pub fn new(bytes: Vec<u8>, capacity: usize) -> Self {
        assert!(capacity >= 2, "response capacity must be at least 2");
        assert!(
            bytes.len() <= capacity - 1,
            "response length {} exceeds fill limit {}",
            bytes.len(),
            capacity - 1
        );
        RawResponse { bytes, capacity }
    }

    /// The accumulated bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes accumulated.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was ever received.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The capacity this response was collected under.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether accumulation stopped because the buffer filled up.
    pub fn is_full(&self) -> bool {
        self.bytes.len() == self.capacity - 1
    }

    /// The reply as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// A rule for deciding where a reply ends.
///
/// Strategies own their tuning (timeouts, capacity) and are handed a
/// transport per collection. The sequencer treats them as opaque.
#[async_trait]
pub trait FramingStrategy: Send + Sync {
    /// Accumulate one reply from the transport.
    ///
    /// Soft endings (silence, full buffer) produce a [`RawResponse`];
    /// only transport-level failures return an error.
    async fn collect(&self, transport: &mut dyn Transport) -> Result<RawResponse>;
}

/// Idle-gap framing: a reply ends when the line goes quiet.
///
/// Polls the transport with `idle_timeout` per read and appends whatever
/// arrives. A read window that closes empty means the modem has stopped
/// transmitting for at least that long -- end of reply. Accumulation also
/// stops when one byte of headroom remains.
#[derive(Debug, Clone)]
pub struct IdleGapFraming {
    idle_timeout: Duration,
    capacity: usize,
}

impl IdleGapFraming {
    /// Create an idle-gap strategy.
    ///
    /// Panics if `capacity < 2` (there must be room for at least one data
    /// byte plus the reserved headroom byte) -- a programmer error.
    pub fn new(idle_timeout: Duration, capacity: usize) -> Self {
        assert!(capacity >= 2, "response capacity must be at least 2");
        IdleGapFraming {
            idle_timeout,
            capacity,
        }
    }

    /// The per-read idle window.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// The accumulation buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl FramingStrategy for IdleGapFraming {
    async fn collect(&self, transport: &mut dyn Transport) -> Result<RawResponse> {
        let limit = self.capacity - 1;
        let mut bytes: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        while bytes.len() < limit {
            let want = (limit - bytes.len()).min(READ_CHUNK);
            match transport.receive(&mut chunk[..want], self.idle_timeout).await {
                Ok(0) => break,
                Ok(n) => {
                    trace!(n, total = bytes.len() + n, "reply fragment");
                    bytes.extend_from_slice(&chunk[..n]);
                }
                // The idle window closed with nothing in it: end of reply.
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(RawResponse::new(bytes, self.capacity))
    }
}

/// Token-terminated framing: a reply ends when a known token has arrived.
///
/// Accumulates until `token` appears anywhere in the collected bytes, the
/// overall deadline passes, or one byte of headroom remains. Useful when
/// the terminal token is known in advance (`OK`, `ERROR`) and the line may
/// legitimately pause mid-reply longer than an idle window would allow.
#[derive(Debug, Clone)]
pub struct TokenTerminatedFraming {
    token: Vec<u8>,
    overall_timeout: Duration,
    capacity: usize,
}

impl TokenTerminatedFraming {
    /// Create a token-terminated strategy.
    ///
    /// Panics if `capacity < 2` or the token is empty -- programmer errors.
    pub fn new(token: &[u8], overall_timeout: Duration, capacity: usize) -> Self {
        assert!(capacity >= 2, "response capacity must be at least 2");
        assert!(!token.is_empty(), "terminator token must not be empty");
        TokenTerminatedFraming {
            token: token.to_vec(),
            overall_timeout,
            capacity,
        }
    }
}

/// Byte-level substring search.
fn contains_token(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

#[async_trait]
impl FramingStrategy for TokenTerminatedFraming {
    async fn collect(&self, transport: &mut dyn Transport) -> Result<RawResponse> {
        let limit = self.capacity - 1;
        let deadline = tokio::time::Instant::now() + self.overall_timeout;
        let mut bytes: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        while bytes.len() < limit && !contains_token(&bytes, &self.token) {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                break;
            }
            let want = (limit - bytes.len()).min(READ_CHUNK);
            match transport.receive(&mut chunk[..want], deadline - now).await {
                Ok(0) => break,
                Ok(n) => {
                    trace!(n, total = bytes.len() + n, "reply fragment");
                    bytes.extend_from_slice(&chunk[..n]);
                }
                Err(Error::Timeout) => break,
                Err(e) => return Err(e),
            }
        }

        Ok(RawResponse::new(bytes, self.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlink_test_harness::MockTransport;

    const CAPACITY: usize = 1024;
    const IDLE: Duration = Duration::from_millis(100);

    async fn collect_after(mock: &mut MockTransport, request: &[u8]) -> RawResponse {
        use atlink_core::Transport;
        mock.send(request).await.unwrap();
        IdleGapFraming::new(IDLE, CAPACITY)
            .collect(mock)
            .await
            .unwrap()
    }

    // =======================================================================
    // RawResponse invariants
    // =======================================================================

    #[test]
    fn raw_response_accessors() {
        let raw = RawResponse::new(b"OK\r\n".to_vec(), 16);
        assert_eq!(raw.bytes(), b"OK\r\n");
        assert_eq!(raw.len(), 4);
        assert!(!raw.is_empty());
        assert!(!raw.is_full());
        assert_eq!(raw.capacity(), 16);
        assert_eq!(raw.text(), "OK\r\n");
    }

    #[test]
    fn raw_response_full_at_capacity_minus_one() {
        let raw = RawResponse::new(vec![b'X'; 15], 16);
        assert!(raw.is_full());
    }

    #[test]
    fn raw_response_lossy_text() {
        let raw = RawResponse::new(vec![b'O', b'K', 0xFF], 16);
        assert_eq!(raw.text(), "OK\u{FFFD}");
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 2")]
    fn raw_response_zero_capacity_panics() {
        let _ = RawResponse::new(Vec::new(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds fill limit")]
    fn raw_response_overfull_panics() {
        let _ = RawResponse::new(vec![b'X'; 16], 16);
    }

    #[test]
    #[should_panic(expected = "capacity must be at least 2")]
    fn idle_gap_zero_capacity_panics() {
        let _ = IdleGapFraming::new(IDLE, 0);
    }

    // =======================================================================
    // Idle-gap framing
    // =======================================================================

    #[tokio::test]
    async fn single_read_then_silence() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"\r\nOK\r\n");

        let raw = collect_after(&mut mock, b"AT\r\n").await;
        assert_eq!(raw.bytes(), b"\r\nOK\r\n");
        assert!(!raw.is_full());
    }

    #[tokio::test]
    async fn fragments_concatenate() {
        // Fragments arriving with sub-window gaps assemble into one reply.
        let mut mock = MockTransport::new();
        mock.expect_chunked(b"AT\r\n", &[b"OK", b"\r\n"]);

        let raw = collect_after(&mut mock, b"AT\r\n").await;
        assert_eq!(raw.bytes(), b"OK\r\n");
    }

    #[tokio::test]
    async fn many_fragments_preserve_order() {
        let mut mock = MockTransport::new();
        mock.expect_chunked(
            b"AT+CSQ\r\n",
            &[b"+CSQ:", b" 21,0", b"\r\n", b"\r\nOK\r\n"],
        );

        let raw = collect_after(&mut mock, b"AT+CSQ\r\n").await;
        assert_eq!(raw.bytes(), b"+CSQ: 21,0\r\n\r\nOK\r\n");
    }

    #[tokio::test]
    async fn silence_yields_empty_response() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"AT\r\n");

        let raw = collect_after(&mut mock, b"AT\r\n").await;
        assert!(raw.is_empty());
        assert_eq!(raw.len(), 0);
    }

    #[tokio::test]
    async fn overflow_stops_at_fill_limit() {
        // 2000 incoming bytes against a 1024-byte buffer: exactly 1023
        // are kept and the response reports itself full.
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", &vec![b'X'; 2000]);

        let raw = collect_after(&mut mock, b"AT\r\n").await;
        assert_eq!(raw.len(), CAPACITY - 1);
        assert!(raw.is_full());
        assert!(raw.bytes().iter().all(|&b| b == b'X'));
    }

    #[tokio::test]
    async fn transport_error_propagates() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let result = IdleGapFraming::new(IDLE, CAPACITY).collect(&mut mock).await;
        assert!(matches!(result, Err(Error::NotConnected)));
    }

    // =======================================================================
    // Token-terminated framing
    // =======================================================================

    #[tokio::test]
    async fn token_framing_stops_at_token() {
        use atlink_core::Transport;

        let mut mock = MockTransport::new();
        mock.expect_chunked(b"AT\r\n", &[b"\r\nOK", b"\r\n", b"stray"]);
        mock.send(b"AT\r\n").await.unwrap();

        let framing = TokenTerminatedFraming::new(b"OK", Duration::from_secs(1), CAPACITY);
        let raw = framing.collect(&mut mock).await.unwrap();

        // Collection ended as soon as the token was visible; later
        // fragments stay queued on the transport.
        assert_eq!(raw.bytes(), b"\r\nOK");
    }

    #[tokio::test]
    async fn token_framing_silence_yields_empty() {
        use atlink_core::Transport;

        let mut mock = MockTransport::new();
        mock.expect_silence(b"AT\r\n");
        mock.send(b"AT\r\n").await.unwrap();

        let framing = TokenTerminatedFraming::new(b"OK", Duration::from_millis(50), CAPACITY);
        let raw = framing.collect(&mut mock).await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn token_framing_respects_fill_limit() {
        use atlink_core::Transport;

        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", &vec![b'X'; 2000]);
        mock.send(b"AT\r\n").await.unwrap();

        let framing = TokenTerminatedFraming::new(b"OK", Duration::from_secs(1), CAPACITY);
        let raw = framing.collect(&mut mock).await.unwrap();
        assert_eq!(raw.len(), CAPACITY - 1);
        assert!(raw.is_full());
    }

    #[test]
    fn contains_token_finds_substrings() {
        assert!(contains_token(b"\r\nOK\r\n", b"OK"));
        assert!(!contains_token(b"\r\nERROR\r\n", b"OK"));
        assert!(!contains_token(b"O", b"OK"));
    }
}
