//! Blacklist decision
//!
//! Caches every object except those whose normalized path matches an entry
//! of the configured blacklist file. Every failure is fail-open: an
//! unconfigured or misconfigured blacklist caches everything.

use admit_storage::StorageBackend;
use tracing::{Span, debug, error, info, warn};

use crate::decision::Decision;
use crate::pattern::PatternList;
use crate::url::normalize_url;

/// Decision that admits everything not matched by a blacklist
pub struct BlacklistDecision {
    blacklist: PatternList,
    span: Span,
}

impl BlacklistDecision {
    pub fn new(span: Span) -> Self {
        Self {
            blacklist: PatternList::new(),
            span,
        }
    }

    /// The registered blacklist entries
    pub fn patterns(&self) -> &PatternList {
        &self.blacklist
    }

    /// Decide on an already normalized object path
    pub fn decide_path(&self, path: &str) -> bool {
        match self.blacklist.first_match(path) {
            Some(entry) => {
                debug!(
                    "Not caching {} as it matches blacklist entry {}",
                    path,
                    entry.as_str()
                );
                false
            }
            None => {
                debug!("Caching {}", path);
                true
            }
        }
    }
}

impl Decision for BlacklistDecision {
    fn decide(&self, url: &str, _storage: &dyn StorageBackend) -> bool {
        let _enter = self.span.enter();

        match normalize_url(url) {
            Some(path) => self.decide_path(path),
            None => {
                debug!("No object path in {}, caching", url);
                true
            }
        }
    }

    fn configure(&mut self, parameter: &str) -> bool {
        let _enter = self.span.enter();

        let loaded = match PatternList::load(parameter) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("{}", e);
                return false;
            }
        };

        if let Some(e) = &loaded.read_error {
            warn!("Failed to parse blacklist {}: {}", parameter, e);
        }

        self.blacklist.append(loaded.patterns);

        for entry in &self.blacklist {
            if entry.is_valid() {
                info!("Cache is blacklisting paths matching {}", entry.as_str());
            } else {
                warn!(
                    "Cache is blacklisting paths matching {:?} (contains NUL, never matches)",
                    entry.as_str()
                );
            }
        }

        true
    }
}
