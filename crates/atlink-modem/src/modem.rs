//! GSM modem driver.
//!
//! [`GsmModem`] packages the exchange sequencer with the standard command
//! sequences a GSM modem session needs: the initialization handshake,
//! text-mode message submission, and the repeating keepalive probe. All
//! session tuning lives in [`ModemConfig`]; recipients and message bodies
//! are inputs, never constants.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use atlink_core::transport::Transport;
use atlink_core::Result;

use crate::commands::{
    cmd_disable_echo, cmd_message_body, cmd_probe, cmd_set_text_mode, cmd_start_message,
    cmd_submit,
};
use crate::framing::IdleGapFraming;
use crate::sequencer::{ExchangeSequencer, ExchangeStep, FailurePolicy, StepOutcome};

/// Session parameters for a modem connection.
///
/// The defaults are the values proven against common GSM modules; all of
/// them are configuration, not constants.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Per-read idle window; silence this long ends a reply (default 100 ms).
    pub idle_read_timeout: Duration,
    /// Reply accumulation buffer size; one byte is reserved headroom
    /// (default 1024).
    pub response_capacity: usize,
    /// Pause after each exchange before the next command (default 1 s).
    pub settle_delay: Duration,
    /// Pause after opening the transport before the first command, giving
    /// the modem time to boot (default 3 s).
    pub post_init_settle: Duration,
    /// Failure policy for the one-shot sequences (`init`,
    /// `send_text_message`). The keepalive loop is always permissive.
    pub handshake_policy: FailurePolicy,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            idle_read_timeout: Duration::from_millis(100),
            response_capacity: 1024,
            settle_delay: Duration::from_secs(1),
            post_init_settle: Duration::from_secs(3),
            handshake_policy: FailurePolicy::Strict,
        }
    }
}

/// A live modem session: an exchange sequencer plus the standard GSM
/// command sequences.
///
/// Construct through
/// [`GsmModemBuilder`](crate::builder::GsmModemBuilder).
pub struct GsmModem {
    sequencer: ExchangeSequencer,
    config: ModemConfig,
}

impl GsmModem {
    pub(crate) fn new(transport: Box<dyn Transport>, config: ModemConfig) -> Self {
        let framing = IdleGapFraming::new(config.idle_read_timeout, config.response_capacity);
        GsmModem {
            sequencer: ExchangeSequencer::new(transport, Box::new(framing)),
            config,
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Run the initialization handshake: wait out the boot settle, then
    /// disable command echo (`ATE0`) and probe the link (`AT`).
    ///
    /// Runs under the configured handshake policy -- strict by default,
    /// so a dead link is reported before anything else is attempted.
    pub async fn init(&mut self) -> Result<Vec<StepOutcome>> {
        info!(settle_ms = self.config.post_init_settle.as_millis(), "waiting for modem boot settle");
        tokio::time::sleep(self.config.post_init_settle).await;

        let steps = [
            ExchangeStep::expecting(cmd_disable_echo(), "OK", self.config.settle_delay),
            ExchangeStep::expecting(cmd_probe(), "OK", self.config.settle_delay),
        ];
        self.sequencer.run(&steps, self.config.handshake_policy).await
    }

    /// Issue a single `AT` probe and return its outcome.
    pub async fn probe(&mut self) -> Result<StepOutcome> {
        let step = ExchangeStep::expecting(cmd_probe(), "OK", self.config.settle_delay);
        self.sequencer.execute(&step).await
    }

    /// Send a text-mode message.
    ///
    /// The sequence is: select text mode (`AT+CMGF=1`), address the
    /// recipient (`AT+CMGS="..."`, answered by the modem's `>` prompt),
    /// transmit the body (no reply expected on its own), then the
    /// submit-control byte, whose reply confirms the submission.
    ///
    /// Runs under the configured handshake policy; under the strict
    /// default, a failed "enter text mode" step aborts before any payload
    /// is sent.
    pub async fn send_text_message(
        &mut self,
        recipient: &str,
        body: &str,
    ) -> Result<Vec<StepOutcome>> {
        info!(recipient, bytes = body.len(), "sending text message");

        let steps = [
            ExchangeStep::expecting(cmd_set_text_mode(), "OK", self.config.settle_delay),
            ExchangeStep::expecting(cmd_start_message(recipient)?, ">", self.config.settle_delay),
            ExchangeStep::new(cmd_message_body(body)?, self.config.settle_delay),
            ExchangeStep::expecting(cmd_submit(), "OK", self.config.settle_delay),
        ];
        self.sequencer.run(&steps, self.config.handshake_policy).await
    }

    /// Probe the link repeatedly until `cancel` is observed.
    ///
    /// Best-effort by design: failed probes are logged and the loop keeps
    /// going, which is the point of a keepalive. Returns the number of
    /// probes issued.
    pub async fn keepalive(&mut self, cancel: &CancellationToken) -> Result<u64> {
        let step = ExchangeStep::expecting(cmd_probe(), "OK", self.config.settle_delay);
        self.sequencer.run_repeating(&step, cancel).await
    }

    /// End the session and recover the transport.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.sequencer.into_transport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlink_core::Error;
    use atlink_test_harness::MockTransport;

    /// Config with the delays zeroed so tests run instantly.
    fn test_config() -> ModemConfig {
        ModemConfig {
            idle_read_timeout: Duration::from_millis(100),
            response_capacity: 1024,
            settle_delay: Duration::ZERO,
            post_init_settle: Duration::ZERO,
            handshake_policy: FailurePolicy::Strict,
        }
    }

    #[test]
    fn default_config_values() {
        let config = ModemConfig::default();
        assert_eq!(config.idle_read_timeout, Duration::from_millis(100));
        assert_eq!(config.response_capacity, 1024);
        assert_eq!(config.settle_delay, Duration::from_secs(1));
        assert_eq!(config.post_init_settle, Duration::from_secs(3));
        assert_eq!(config.handshake_policy, FailurePolicy::Strict);
    }

    #[tokio::test]
    async fn init_runs_echo_then_probe() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATE0\r\n", b"\r\nOK\r\n");
        mock.expect(b"AT\r\n", b"\r\nOK\r\n");

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        let outcomes = modem.init().await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.response.token_matched() == Some(true)));
    }

    #[tokio::test]
    async fn init_strict_aborts_on_dead_link() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"ATE0\r\n");

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        let err = modem.init().await.unwrap_err();
        assert!(matches!(err, Error::StepFailed { index: 0, .. }));
    }

    #[tokio::test]
    async fn init_permissive_reports_every_step() {
        let mut mock = MockTransport::new();
        mock.expect_silence(b"ATE0\r\n");
        mock.expect(b"AT\r\n", b"\r\nOK\r\n");

        let config = ModemConfig {
            handshake_policy: FailurePolicy::Permissive,
            ..test_config()
        };
        let mut modem = GsmModem::new(Box::new(mock), config);
        let outcomes = modem.init().await.unwrap();
        assert_eq!(outcomes.len(), 2);
    }

    #[tokio::test]
    async fn probe_single_exchange() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"\r\nOK\r\n");

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        let outcome = modem.probe().await.unwrap();
        assert!(outcome.write.is_complete());
        assert_eq!(outcome.response.token_matched(), Some(true));
    }

    #[tokio::test]
    async fn send_text_message_full_sequence() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT+CMGF=1\r\n", b"\r\nOK\r\n");
        mock.expect(b"AT+CMGS=\"+5585998219955\"\r\n", b"\r\n> ");
        mock.expect_silence(b"Qual a senha?");
        mock.expect(&[0x1A], b"\r\n+CMGS: 12\r\n\r\nOK\r\n");

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        let outcomes = modem
            .send_text_message("+5585998219955", "Qual a senha?")
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[1].response.token_matched(), Some(true));
        assert_eq!(outcomes[3].response.token_matched(), Some(true));
    }

    #[tokio::test]
    async fn send_text_message_aborts_before_payload_when_text_mode_fails() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT+CMGF=1\r\n", b"\r\nERROR\r\n");

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        let err = modem
            .send_text_message("+5585998219955", "Qual a senha?")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StepFailed { index: 0, .. }));
    }

    #[tokio::test]
    async fn send_text_message_rejects_bad_recipient_before_any_io() {
        let mock = MockTransport::new();
        let mut modem = GsmModem::new(Box::new(mock), test_config());

        let err = modem
            .send_text_message("not-a-number", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn keepalive_pre_cancelled() {
        let mock = MockTransport::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut modem = GsmModem::new(Box::new(mock), test_config());
        assert_eq!(modem.keepalive(&cancel).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn into_transport_recovers_transport() {
        let mock = MockTransport::new();
        let modem = GsmModem::new(Box::new(mock), test_config());
        assert!(modem.into_transport().is_connected());
    }
}
