//! AT command builders.
//!
//! This module provides the [`Command`] value type and functions to
//! construct the byte sequences for the Hayes-style operations the library
//! uses: link probing, echo control, SMS text mode, and text-mode message
//! submission.
//!
//! All functions are pure -- they produce byte vectors without performing
//! any I/O. The caller is responsible for sending the bytes over a
//! transport and collecting the reply.
//!
//! # Command format
//!
//! ```text
//! <ASCII line>\r\n
//! ```
//!
//! Ordinary commands are ASCII text terminated with CR-LF. Two payloads in
//! the SMS submission flow deviate from that: the message body is sent as
//! raw bytes with no terminator, and the end of the body is signalled by a
//! single control byte (Ctrl-Z, 0x1A) also sent with no terminator.

use std::fmt;

use atlink_core::{Error, Result};
use bytes::{BufMut, BytesMut};

/// The control byte that submits a text-mode message body (Ctrl-Z).
pub const SUBMIT_CONTROL: u8 = 0x1A;

/// Maximum encoded length of a formatted command line, terminator included.
///
/// Formatted commands are staged in a small fixed buffer on the kinds of
/// hosts this protocol comes from; anything longer is a caller bug.
pub const MAX_COMMAND_LEN: usize = 64;

/// Line terminator for ordinary AT commands.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// An immutable command payload ready for transmission.
///
/// A `Command` carries its exact wire bytes plus a display label used in
/// logs and error messages (raw commands may contain control bytes that
/// should not be printed verbatim).
///
/// Construct commands with [`Command::line`] (appends CR-LF) or
/// [`Command::raw`] (sends bytes exactly as given), or use the `cmd_*`
/// builders below for the standard operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    bytes: Vec<u8>,
    label: String,
}

impl Command {
    /// Build a line command: ASCII text with CR-LF appended.
    ///
    /// Rejects non-ASCII text, embedded control characters, and anything
    /// that would exceed [`MAX_COMMAND_LEN`] once terminated.
    ///
    /// # Example
    ///
    /// ```
    /// use atlink_modem::commands::Command;
    ///
    /// let cmd = Command::line("AT").unwrap();
    /// assert_eq!(cmd.bytes(), b"AT\r\n");
    /// assert_eq!(cmd.label(), "AT");
    /// ```
    pub fn line(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::InvalidParameter("empty command line".into()));
        }
        if !text.is_ascii() || text.chars().any(|c| c.is_ascii_control()) {
            return Err(Error::InvalidParameter(format!(
                "command line must be printable ASCII: {text:?}"
            )));
        }
        let encoded_len = text.len() + LINE_TERMINATOR.len();
        if encoded_len > MAX_COMMAND_LEN {
            return Err(Error::InvalidParameter(format!(
                "command line is {encoded_len} bytes, limit is {MAX_COMMAND_LEN}"
            )));
        }

        let mut buf = BytesMut::with_capacity(encoded_len);
        buf.put_slice(text.as_bytes());
        buf.put_slice(LINE_TERMINATOR);

        Ok(Command {
            bytes: buf.to_vec(),
            label: text.to_string(),
        })
    }

    /// Build a raw command: bytes sent exactly as given, no terminator.
    ///
    /// Used for the message body and the submit-control byte, which the
    /// text-mode submission flow sends without CR-LF.
    pub fn raw(bytes: &[u8], label: &str) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidParameter("empty raw command".into()));
        }
        Ok(Command {
            bytes: bytes.to_vec(),
            label: label.to_string(),
        })
    }

    /// The exact bytes that go on the wire.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Display label for logs and error messages.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the command is empty (never true for constructed commands).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Internal constructor for the fixed command set, whose text is known to
/// satisfy every `Command::line` check.
fn fixed_line(text: &'static str) -> Command {
    let mut bytes = Vec::with_capacity(text.len() + LINE_TERMINATOR.len());
    bytes.extend_from_slice(text.as_bytes());
    bytes.extend_from_slice(LINE_TERMINATOR);
    Command {
        bytes,
        label: text.to_string(),
    }
}

/// Build the link probe command (`AT\r\n`).
///
/// # Example
///
/// ```
/// use atlink_modem::commands::cmd_probe;
/// assert_eq!(cmd_probe().bytes(), b"AT\r\n");
/// ```
pub fn cmd_probe() -> Command {
    fixed_line("AT")
}

/// Build the "disable command echo" command (`ATE0\r\n`).
///
/// Sent first in the initialization handshake so later replies are not
/// polluted with echoes of the commands themselves.
pub fn cmd_disable_echo() -> Command {
    fixed_line("ATE0")
}

/// Build the "select SMS text mode" command (`AT+CMGF=1\r\n`).
pub fn cmd_set_text_mode() -> Command {
    fixed_line("AT+CMGF=1")
}

/// Build the "start text-mode message" command (`AT+CMGS="<recipient>"\r\n`).
///
/// The recipient must be a phone number: an optional leading `+` followed
/// by ASCII digits only. The modem answers this command with its `>`
/// prompt, after which the body may be sent.
///
/// # Example
///
/// ```
/// use atlink_modem::commands::cmd_start_message;
///
/// let cmd = cmd_start_message("+5585998219955").unwrap();
/// assert_eq!(cmd.bytes(), b"AT+CMGS=\"+5585998219955\"\r\n");
///
/// assert!(cmd_start_message("not-a-number").is_err());
/// ```
pub fn cmd_start_message(recipient: &str) -> Result<Command> {
    let digits = recipient.strip_prefix('+').unwrap_or(recipient);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidParameter(format!(
            "recipient must be an optional '+' followed by digits: {recipient:?}"
        )));
    }
    Command::line(&format!("AT+CMGS=\"{recipient}\""))
}

/// Build the message body payload: raw bytes, no CR-LF.
///
/// The body may contain any text except the submit-control byte itself,
/// which would end the message early.
pub fn cmd_message_body(text: &str) -> Result<Command> {
    if text.is_empty() {
        return Err(Error::InvalidParameter("empty message body".into()));
    }
    if text.bytes().any(|b| b == SUBMIT_CONTROL) {
        return Err(Error::InvalidParameter(
            "message body must not contain the submit-control byte".into(),
        ));
    }
    Command::raw(text.as_bytes(), &format!("message body ({} bytes)", text.len()))
}

/// Build the submit-control command: the single Ctrl-Z byte, no terminator.
///
/// # Example
///
/// ```
/// use atlink_modem::commands::cmd_submit;
/// assert_eq!(cmd_submit().bytes(), &[0x1A]);
/// ```
pub fn cmd_submit() -> Command {
    Command {
        bytes: vec![SUBMIT_CONTROL],
        label: "<ctrl-z>".to_string(),
    }
}
