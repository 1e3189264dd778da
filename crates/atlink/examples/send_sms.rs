//! Send a text-mode SMS.
//!
//! Demonstrates opening a modem session, running the initialization
//! handshake, and submitting a text message.
//!
//! # Requirements
//!
//! - A GSM modem module (SIM800L, SIM900, or similar) on a serial port
//! - The serial port path adjusted for your system (e.g., `/dev/ttyUSB0`
//!   on Linux, `COM3` on Windows)
//! - A SIM with credit for the destination number
//!
//! # Usage
//!
//! ```sh
//! cargo run -p atlink --example send_sms
//! ```

use atlink::modem::GsmModemBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Adjust these for your system and destination.
    let serial_port = "/dev/ttyUSB0";
    let recipient = "+5585998219955";
    let message = "Qual a senha?";

    println!("Connecting to modem on {}...", serial_port);

    let mut modem = GsmModemBuilder::new()
        .serial_port(serial_port)
        .baud_rate(9600)
        .build()
        .await?;

    println!("Running initialization handshake...");
    modem.init().await?;

    println!("Sending message to {}...", recipient);
    let outcomes = modem.send_text_message(recipient, message).await?;

    for (i, outcome) in outcomes.iter().enumerate() {
        println!("step {}: {}", i, outcome.response.describe());
    }

    println!("Done.");
    Ok(())
}
