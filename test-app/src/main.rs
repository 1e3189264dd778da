// atlink test application -- CLI tool for exercising the modem driver
// against real hardware or a mock transport.
//
// Usage:
//   atlink-test-app --port /dev/ttyUSB0 probe
//   atlink-test-app --port /dev/ttyUSB0 init
//   atlink-test-app --port /dev/ttyUSB0 send-sms --to +5585998219955 --message "Qual a senha?"
//   atlink-test-app --port /dev/ttyUSB0 keepalive
//   atlink-test-app --port /dev/ttyUSB0 keepalive --count 10
//   atlink-test-app --mock send-sms --to +5585998219955 --message "hello"
//
// With --mock, a scripted transport stands in for the modem and the
// session delays are shortened, so every subcommand can be exercised
// without hardware.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use atlink::modem::{FailurePolicy, GsmModem, GsmModemBuilder, StepOutcome};
use atlink_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// atlink test application -- exercises the modem driver from the command line.
#[derive(Parser)]
#[command(name = "atlink-test-app", version, about)]
struct Cli {
    /// Serial port path (e.g. /dev/ttyUSB0, COM3).
    /// Required unless --mock is used.
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for the serial port.
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Use a scripted mock transport instead of real hardware.
    #[arg(long)]
    mock: bool,

    /// Continue past failed handshake steps instead of aborting.
    #[arg(long)]
    permissive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a single AT probe and report the outcome.
    Probe,

    /// Run the initialization handshake (ATE0, AT).
    Init,

    /// Initialize, then send a text-mode SMS.
    SendSms {
        /// Recipient phone number (optional leading +, then digits).
        #[arg(long)]
        to: String,

        /// Message body.
        #[arg(long)]
        message: String,
    },

    /// Initialize, then probe the link repeatedly.
    Keepalive {
        /// Stop after this many probes (default: run until Ctrl-C).
        #[arg(long)]
        count: Option<u64>,

        /// Interval between probes, in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

// ---------------------------------------------------------------------------
// Mock transport scripting
// ---------------------------------------------------------------------------

/// Pre-load a mock transport with the replies the chosen subcommand will
/// need, fragmenting some of them to exercise idle-gap reassembly.
fn scripted_mock(command: &Command) -> MockTransport {
    let mut mock = MockTransport::new();

    match command {
        Command::Probe => {
            mock.expect_chunked(b"AT\r\n", &[b"\r\nOK", b"\r\n"]);
        }
        Command::Init => {
            mock.expect(b"ATE0\r\n", b"\r\nOK\r\n");
            mock.expect(b"AT\r\n", b"\r\nOK\r\n");
        }
        Command::SendSms { to, message } => {
            mock.expect(b"ATE0\r\n", b"\r\nOK\r\n");
            mock.expect(b"AT\r\n", b"\r\nOK\r\n");
            mock.expect(b"AT+CMGF=1\r\n", b"\r\nOK\r\n");
            mock.expect(format!("AT+CMGS=\"{to}\"\r\n").as_bytes(), b"\r\n> ");
            mock.expect_silence(message.as_bytes());
            mock.expect(&[0x1A], b"\r\n+CMGS: 1\r\n\r\nOK\r\n");
        }
        Command::Keepalive { count, .. } => {
            mock.expect(b"ATE0\r\n", b"\r\nOK\r\n");
            mock.expect(b"AT\r\n", b"\r\nOK\r\n");
            for _ in 0..count.unwrap_or(5) {
                mock.expect(b"AT\r\n", b"\r\nOK\r\n");
            }
        }
    }

    mock
}

// ---------------------------------------------------------------------------
// Session construction
// ---------------------------------------------------------------------------

async fn build_modem(cli: &Cli) -> Result<GsmModem> {
    let mut builder = GsmModemBuilder::new().baud_rate(cli.baud);

    if cli.permissive {
        builder = builder.handshake_policy(FailurePolicy::Permissive);
    }

    if cli.mock {
        // Shorten the session delays so mock runs finish promptly.
        builder = builder
            .settle_delay(Duration::from_millis(50))
            .post_init_settle(Duration::ZERO);
        let mock = scripted_mock(&cli.command);
        return builder
            .build_with_transport(Box::new(mock))
            .await
            .context("failed to build mock session");
    }

    let Some(port) = cli.port.as_deref() else {
        bail!("--port is required unless --mock is used");
    };

    builder
        .serial_port(port)
        .build()
        .await
        .with_context(|| format!("failed to open modem on {port}"))
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_outcomes(outcomes: &[StepOutcome]) {
    for (i, outcome) in outcomes.iter().enumerate() {
        let write = if outcome.write.is_complete() {
            "sent".to_string()
        } else {
            format!("short write: {:?}", outcome.write)
        };
        let reply = outcome
            .response
            .text()
            .map(|t| format!("{t:?}"))
            .unwrap_or_else(|| "<none>".to_string());
        println!(
            "step {i}: {write}, outcome: {}, reply: {reply}",
            outcome.response.describe()
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut modem = build_modem(&cli).await?;

    match &cli.command {
        Command::Probe => {
            let outcome = modem.probe().await?;
            print_outcomes(std::slice::from_ref(&outcome));
        }

        Command::Init => {
            let outcomes = modem.init().await?;
            println!("initialization handshake complete");
            print_outcomes(&outcomes);
        }

        Command::SendSms { to, message } => {
            let init_outcomes = modem.init().await?;
            println!("initialization handshake complete");
            print_outcomes(&init_outcomes);

            let outcomes = modem.send_text_message(to, message).await?;
            println!("message submitted to {to}");
            print_outcomes(&outcomes);
        }

        Command::Keepalive { count, interval_ms } => {
            modem.init().await?;
            println!("initialization handshake complete");

            // A mock transport only carries a finite script; never run
            // unbounded against it.
            let count = count.or(if cli.mock { Some(5) } else { None });

            match count {
                Some(n) => {
                    for i in 0..n {
                        let outcome = modem.probe().await?;
                        println!("probe {}: {}", i + 1, outcome.response.describe());
                        tokio::time::sleep(Duration::from_millis(*interval_ms)).await;
                    }
                }
                None => {
                    // Run until Ctrl-C.
                    let cancel = CancellationToken::new();
                    let canceller = cancel.clone();
                    tokio::spawn(async move {
                        let _ = tokio::signal::ctrl_c().await;
                        canceller.cancel();
                    });

                    println!("probing; press Ctrl-C to stop");
                    let probes = modem.keepalive(&cancel).await?;
                    println!("stopped after {probes} probes");
                }
            }
        }
    }

    Ok(())
}
