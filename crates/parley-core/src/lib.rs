//! Core crate for Parley: configuration, errors, and shared domain types.
//!
//! Every other crate in the workspace depends on this one. It holds nothing
//! network-bound or stateful, only the vocabulary the subsystems share.

pub mod config;
pub mod error;
pub mod types;

pub use config::ParleyConfig;
pub use error::{ParleyError, Result};
pub use types::{Intent, Language, Sender};
