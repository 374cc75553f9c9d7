//! Cache Admission Decisions
//!
//! This crate decides whether an object fetched by a disk-based proxy cache
//! should be admitted to the cache or bypassed. The shipped policy is a
//! blacklist: URLs are normalized into object paths and tested against
//! shell-glob patterns loaded once at startup.

pub mod blacklist;
pub mod decision;
pub mod error;
pub mod ffi;
pub mod pattern;
pub mod url;

pub use blacklist::BlacklistDecision;
pub use decision::{Decision, get_decision};
pub use error::DecisionError;
pub use pattern::{LoadedPatterns, PatternEntry, PatternList};
pub use url::normalize_url;
