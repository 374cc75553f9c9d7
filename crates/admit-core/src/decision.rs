//! Admission decision interface
//!
//! The host cache manager only ever sees a `Box<dyn Decision>` produced by
//! [`get_decision`]; it never links against a concrete policy type.

use admit_storage::StorageBackend;
use tracing::Span;

use crate::blacklist::BlacklistDecision;

/// A cache admission policy
pub trait Decision: Send + Sync {
    /// Decide whether the object behind `url` should be cached.
    ///
    /// `true` admits the object, `false` bypasses the cache.
    fn decide(&self, url: &str, storage: &dyn StorageBackend) -> bool;

    /// Configure the policy from its plugin parameter.
    ///
    /// Called once at startup, before any call to [`Decision::decide`].
    fn configure(&mut self, parameter: &str) -> bool;
}

/// Create the decision object for this plugin.
///
/// `span` is the logging handle; every diagnostic of the returned object is
/// recorded inside it.
pub fn get_decision(span: Span) -> Box<dyn Decision> {
    Box::new(BlacklistDecision::new(span))
}
