//! Crate error type.
//!
//! The simulation itself never fails: losing is a game outcome, and missing
//! level lists degrade to empty ones. Errors only surface at the edges, when
//! loading levels or tuning from JSON and when writing to storage.

/// Errors raised by loaders and storage backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A level or tuning document could not be parsed.
    #[error("invalid {what} JSON: {source}")]
    Json {
        /// Which document was being read (e.g. "level", "tuning").
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A session needs at least one level to play.
    #[error("level list is empty")]
    NoLevels,

    /// The storage backend refused a write.
    #[error("storage write failed for key `{key}`: {reason}")]
    Storage { key: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn json(what: &'static str, source: serde_json::Error) -> Self {
        Error::Json { what, source }
    }
}
