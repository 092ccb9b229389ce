//! Scrape pipelines and the watch job built on top of them.

pub mod refresh;
pub mod scheduler;
pub mod watch;

use crate::globalsearch::{NavigationError, ParseError};
use crate::normalize::NormalizeError;

/// Failure of one scrape-and-persist pass.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Failed to normalize section {section}")]
    Normalize {
        section: i32,
        #[source]
        source: NormalizeError,
    },
    #[error("GlobalSearch main page listed no terms")]
    NoTerms,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ScrapeError {
    /// Whether the failure came from the local database rather than the remote site.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
