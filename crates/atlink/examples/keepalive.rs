//! Probe the modem link until interrupted.
//!
//! Demonstrates the repeating keepalive pattern: an `AT` probe issued
//! once per settle interval, best-effort, until Ctrl-C.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p atlink --example keepalive
//! ```

use std::time::Duration;

use atlink::modem::GsmModemBuilder;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let serial_port = "/dev/ttyUSB0";

    println!("Connecting to modem on {}...", serial_port);

    let mut modem = GsmModemBuilder::new()
        .serial_port(serial_port)
        .baud_rate(9600)
        .settle_delay(Duration::from_secs(1))
        .build()
        .await?;

    modem.init().await?;

    // Cancel the probe loop on Ctrl-C.
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        canceller.cancel();
    });

    println!("Probing; press Ctrl-C to stop.");
    let probes = modem.keepalive(&cancel).await?;
    println!("Stopped after {} probes.", probes);

    Ok(())
}
