//! Issue tracker domain core.
//!
//! Holds the issue record, the status enumeration and the transition
//! engine that decides which edits are legal. Storage and transport live
//! in the `issuetrack-db` and `issuetrack-api` crates.

pub mod clock;
pub mod error;
pub mod issue;
pub mod serde_util;
pub mod status;
pub mod transition;
pub mod types;
pub mod user;
