//! atlink-core: Core trait and error definitions for atlink.
//!
//! This crate defines the transport abstraction and error taxonomy that the
//! rest of the workspace builds on. Applications normally depend on the
//! `atlink` facade crate instead of this one directly.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level duplex channel to a modem
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;

// Re-export key types at crate root for ergonomic `use atlink_core::*`.
pub use error::{Error, Result};
pub use transport::Transport;
