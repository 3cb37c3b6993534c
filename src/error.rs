//! Error types for the pdf2quiz library.
//!
//! Only conditions that stop a document dead are errors. Everything else the
//! engine finds along the way (lines it is unsure about, option lines with
//! irregular spacing, question numbers that break the sequence) is *data*,
//! surfaced on [`crate::output::ExtractOutput`] for the caller to inspect or
//! confirm. No detector failure aborts a pass; a detector that cannot run
//! contributes an empty candidate set instead.
//!
//! The fatal set is deliberately tiny:
//!
//! * [`ExtractError::SourceUnavailable`]: the positioned-fragment layer
//!   cannot be used. Recoverable by the caller (or by [`crate::extract`]
//!   itself) via the plain-text fallback path.
//! * [`ExtractError::NoExtractableText`]: both paths produced nothing
//!   worth parsing. Terminal for that document, not retried.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2quiz library.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The rendering collaborator cannot supply positioned fragments.
    ///
    /// [`crate::extract`] reacts by switching wholesale to the plain-text
    /// fallback; this only surfaces to callers when the fallback is
    /// unavailable too.
    #[error("Page source unavailable: {detail}")]
    SourceUnavailable { detail: String },

    /// Neither the positioned path nor the plain-text fallback yielded text.
    #[error(
        "No text could be extracted from the document.\n\
         The file may be image-only, corrupt, or protected."
    )]
    NoExtractableText,

    /// A page index was requested past the end of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not write the extraction result to disk (CLI path).
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
