//! Error types for the docflow-common library.
//!
//! Two distinct error families live in one [`ConvertError`] enum:
//!
//! * **State errors** — the pipeline was driven in the wrong order (format
//!   selected before a document was loaded, output requested before a format
//!   was selected). These carry a fixed message and no cause: they are
//!   programmer mistakes the caller fixes by reordering calls, not
//!   operational failures worth retrying.
//!
//! * **Conversion errors** — an underlying load/save strategy failed
//!   (I/O error, malformed content, missing file). These carry a
//!   stage-identifying message plus the original cause via `#[source]`, so
//!   diagnostics survive the wrapping.
//!
//! The separation lets callers decide their own handling: panic on state
//! errors during development, report conversion errors to the end user.
//!
//! License initialization failures are deliberately NOT represented here.
//! [`LicenseGuard`](crate::license::LicenseGuard) absorbs them and reports
//! through its error-handler side channel; a missing license is degraded
//! operation, not an error the conversion caller sees.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used at the strategy seams.
///
/// Loader, serializer, and license strategies are caller-supplied and may
/// fail with any error type; the library wraps whatever comes back.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors returned by the conversion pipeline.
///
/// Use [`ConvertError::is_state_error`] to distinguish usage mistakes from
/// wrapped load/save failures.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── State errors (usage mistakes) ─────────────────────────────────────
    /// A format was selected or output requested before any source was bound.
    #[error("no source document set: call one of the from_* methods first")]
    NoSourceDocument,

    /// Output was requested before a target format was selected.
    #[error("no target format set: call to() or to_pdf() first")]
    NoTargetFormat,

    // ── Conversion errors (wrapped strategy failures) ─────────────────────
    /// The load-from-reader strategy failed on a caller-supplied reader.
    #[error("failed to load document")]
    LoadStream {
        #[source]
        source: BoxError,
    },

    /// The load strategy failed reading through an open file handle.
    #[error("failed to load document from file")]
    LoadFile {
        #[source]
        source: BoxError,
    },

    /// The load-from-path strategy failed.
    #[error("failed to load document from path '{path}'")]
    LoadPath {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The load strategy failed on an in-memory byte sequence.
    #[error("failed to load document from byte array")]
    LoadBytes {
        #[source]
        source: BoxError,
    },

    /// The save-to-writer strategy failed while serializing to memory.
    #[error("failed to convert document")]
    ConvertFailed {
        #[source]
        source: BoxError,
    },

    /// The save-to-path strategy failed while writing the output file.
    #[error("failed to save converted document to '{path}'")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The parent directory of the output path could not be created.
    #[error("failed to create parent directory '{path}'")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Whether this is a precondition violation rather than a wrapped
    /// load/save failure.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            ConvertError::NoSourceDocument | ConvertError::NoTargetFormat
        )
    }
}
