use thiserror::Error;

/// Failures of the HTTP collaborator.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid URL {url}: {reason}")]
    BadUrl { url: String, reason: String },

    #[error("Page {0} is beyond the forum's offset range")]
    PageOutOfRange(u32),

    #[error("No roster URL configured (set MISSIONS_ROSTER_URL)")]
    MissingRosterUrl,
}

/// Request-level failures surfaced to callers of the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not fetch forum page {page}: {source}")]
    PageUnavailable {
        page: u32,
        #[source]
        source: SourceError,
    },

    #[error("Page count must be at least 1, got {0}")]
    InvalidPageCount(u32),

    #[error("Page number must be at least 1, got {0}")]
    InvalidPageNumber(u32),

    #[error("Could not fetch roster: {0}")]
    RosterUnavailable(#[source] SourceError),

    #[error("Roster source has no rows")]
    EmptySource,

    #[error("Malformed roster CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Record building task failed: {0}")]
    Build(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
