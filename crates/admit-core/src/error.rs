//! Decision error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecisionError {
    #[error("Blacklist file not specified")]
    NotSpecified,

    #[error("Failed to open blacklist {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
