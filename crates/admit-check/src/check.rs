//! Admission checks against a configured decision

use admit_core::{Decision, normalize_url};
use admit_storage::StorageBackend;
use std::fmt;
use tracing::warn;

/// Outcome of checking a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub url: String,
    pub cache: bool,
    /// Whether the object is already in storage; `None` when unknown
    pub resident: Option<bool>,
    /// Size in bytes of a resident object
    pub size: Option<u64>,
}

impl Verdict {
    pub fn action(&self) -> &'static str {
        if self.cache { "cache" } else { "bypass" }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t", self.action(), self.url)?;
        match (self.resident, self.size) {
            (Some(true), Some(size)) => write!(f, "resident ({} bytes)", size),
            (Some(true), None) => write!(f, "resident"),
            (Some(false), _) => write!(f, "absent"),
            (None, _) => write!(f, "unknown"),
        }
    }
}

/// Ask the decision about `url` and look the object up in storage
pub fn check(decision: &dyn Decision, storage: &dyn StorageBackend, url: &str) -> Verdict {
    let cache = decision.decide(url, storage);

    let Some(path) = normalize_url(url) else {
        return Verdict {
            url: url.to_string(),
            cache,
            resident: None,
            size: None,
        };
    };

    let resident = match storage.exists(path) {
        Ok(exists) => Some(exists),
        Err(e) => {
            warn!("Failed to look up {} in storage: {}", path, e);
            None
        }
    };

    let size = match resident {
        Some(true) => match storage.size(path) {
            Ok(size) => Some(size),
            Err(e) => {
                warn!("Failed to stat {} in storage: {}", path, e);
                None
            }
        },
        _ => None,
    };

    Verdict {
        url: url.to_string(),
        cache,
        resident,
        size,
    }
}
