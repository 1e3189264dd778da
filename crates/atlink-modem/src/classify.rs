//! Response classification.
//!
//! Turns an accumulated [`RawResponse`] into a [`ResponseOutcome`]: did
//! anything arrive, was the buffer cut off, and did the expected token
//! show up. Classification is pure -- no I/O, no policy. Whether a given
//! outcome is acceptable belongs to the sequencer's failure policy.
//!
//! A missing expected token is reported at warn level and carried in the
//! outcome, never raised as an error from here.

use tracing::{debug, warn};

use crate::framing::RawResponse;

/// Classified outcome of one command/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// A reply arrived and ended on an idle gap.
    Ok {
        /// The reply text (lossy UTF-8).
        text: String,
        /// Whether the expected token was found; `None` when no token was
        /// expected.
        token_matched: Option<bool>,
    },

    /// Nothing arrived within the read window.
    TimedOut,

    /// The reply filled the accumulation buffer; content past the
    /// boundary is lost, so the text may be incomplete.
    Truncated {
        /// The reply text up to the fill limit (lossy UTF-8).
        text: String,
        /// Whether the expected token was found in the retained portion;
        /// `None` when no token was expected.
        token_matched: Option<bool>,
    },
}

impl ResponseOutcome {
    /// The reply text, if any arrived.
    pub fn text(&self) -> Option<&str> {
        match self {
            ResponseOutcome::Ok { text, .. } | ResponseOutcome::Truncated { text, .. } => {
                Some(text)
            }
            ResponseOutcome::TimedOut => None,
        }
    }

    /// Whether the expected token was found (`None` when none was expected
    /// or nothing arrived).
    pub fn token_matched(&self) -> Option<bool> {
        match self {
            ResponseOutcome::Ok { token_matched, .. }
            | ResponseOutcome::Truncated { token_matched, .. } => *token_matched,
            ResponseOutcome::TimedOut => None,
        }
    }

    /// Whether this outcome is a clean, complete reply whose expected
    /// token (if any) was present.
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            ResponseOutcome::Ok {
                token_matched: None | Some(true),
                ..
            }
        )
    }

    /// Short human-readable tag for logs and step-failure messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ResponseOutcome::Ok {
                token_matched: Some(false),
                ..
            } => "expected token not found",
            ResponseOutcome::Ok { .. } => "ok",
            ResponseOutcome::TimedOut => "timed out",
            ResponseOutcome::Truncated { .. } => "truncated",
        }
    }
}

/// Classify an accumulated reply.
///
/// Rules, in order:
///
/// 1. An empty response means nothing ever arrived: [`ResponseOutcome::TimedOut`].
/// 2. The bytes are interpreted as text (lossy UTF-8).
/// 3. If `expected_token` is given, it is searched for as a case-sensitive
///    substring anywhere in the text; absence is logged at warn level.
/// 4. A response that hit its fill limit is [`ResponseOutcome::Truncated`]
///    regardless of token match, since content past the boundary is lost.
pub fn classify(raw: &RawResponse, expected_token: Option<&str>) -> ResponseOutcome {
    if raw.is_empty() {
        debug!("no response received within the read window");
        return ResponseOutcome::TimedOut;
    }

    let text = raw.text().into_owned();

    let token_matched = expected_token.map(|token| {
        let found = text.contains(token);
        if !found {
            warn!(
                token,
                response = %text.trim_end(),
                "expected token not found in response"
            );
        }
        found
    });

    if raw.is_full() {
        warn!(
            len = raw.len(),
            "response filled the buffer and may be truncated"
        );
        return ResponseOutcome::Truncated {
            text,
            token_matched,
        };
    }

    debug!(response = %text.trim_end(), "response received");
    ResponseOutcome::Ok {
        text,
        token_matched,
    }
}
