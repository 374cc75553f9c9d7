//! Blacklist pattern list
//!
//! Holds the ordered shell-glob patterns of a blacklist file and matches
//! object paths against them with the platform's `fnmatch(3)` in path
//! mode: `*`, `?` and bracket expressions never match a `/`, and a
//! backslash quotes the next character.

use std::ffi::CString;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::error::DecisionError;

/// A single blacklist entry
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pattern: String,
    /// `None` when the pattern holds a NUL byte; such entries never match
    compiled: Option<CString>,
}

impl PatternEntry {
    fn new(pattern: String) -> Self {
        let compiled = match CString::new(pattern.as_bytes()) {
            Ok(p) => Some(p),
            Err(e) => {
                debug!("Pattern {:?} is not usable ({}), it will never match", pattern, e);
                None
            }
        };
        Self { pattern, compiled }
    }

    /// The pattern text exactly as registered
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern can be handed to `fnmatch`
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    /// Check if an object path matches this entry
    pub fn matches(&self, path: &str) -> bool {
        let Some(pattern) = &self.compiled else {
            return false;
        };
        let Ok(path) = CString::new(path) else {
            return false;
        };

        // SAFETY: both arguments are valid null-terminated strings that
        // outlive the call; fnmatch does not retain them
        unsafe { libc::fnmatch(pattern.as_ptr(), path.as_ptr(), libc::FNM_PATHNAME) == 0 }
    }
}

/// Ordered list of blacklist patterns
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    entries: Vec<PatternEntry>,
}

/// Result of loading a blacklist file
#[derive(Debug)]
pub struct LoadedPatterns {
    pub patterns: PatternList,
    /// Read error that stopped parsing before end of file
    pub read_error: Option<io::Error>,
}

impl PatternList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern verbatim
    pub fn push(&mut self, pattern: impl Into<String>) {
        self.entries.push(PatternEntry::new(pattern.into()));
    }

    /// Move all entries of `other` to the end of this list
    pub fn append(&mut self, mut other: PatternList) {
        self.entries.append(&mut other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    /// Find the first entry matching an object path
    pub fn first_match(&self, path: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|entry| entry.matches(path))
    }

    /// Parse patterns from a line-oriented reader.
    ///
    /// Reading stops at the first I/O error; the patterns parsed up to that
    /// point are returned together with the error.
    pub fn from_reader<R: BufRead>(mut reader: R) -> LoadedPatterns {
        let mut patterns = Self::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    return LoadedPatterns {
                        patterns,
                        read_error: None,
                    };
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if let Some(pattern) = parse_line(&line) {
                        patterns.push(pattern);
                    }
                }
                Err(e) => {
                    return LoadedPatterns {
                        patterns,
                        read_error: Some(e),
                    };
                }
            }
        }
    }

    /// Load patterns from a blacklist file
    pub fn load(path: &str) -> Result<LoadedPatterns, DecisionError> {
        if path.is_empty() {
            return Err(DecisionError::NotSpecified);
        }

        info!("Using blacklist {}", path);

        let file = File::open(Path::new(path)).map_err(|source| DecisionError::Open {
            path: path.to_string(),
            source,
        })?;

        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<'a> IntoIterator for &'a PatternList {
    type Item = &'a PatternEntry;
    type IntoIter = std::slice::Iter<'a, PatternEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Extract a pattern from one raw line.
///
/// Leading whitespace and a single trailing newline are removed; trailing
/// spaces and carriage returns are kept.
fn parse_line(line: &str) -> Option<&str> {
    let trimmed = line.trim_start_matches(is_c_space);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.strip_suffix('\n').unwrap_or(trimmed))
}

/// Whitespace as classified by the C locale's `isspace`
fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}
