//! atlink-test-harness: Mock transports for atlink.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing
//! of the exchange engine without requiring real modem hardware. Replies
//! can be scripted as fragments to exercise idle-gap reassembly, as
//! silence to exercise timeout classification, and with write limits to
//! exercise short-write reporting.

pub mod mock_serial;

pub use mock_serial::MockTransport;
