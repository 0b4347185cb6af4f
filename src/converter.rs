//! The generic fluent conversion pipeline.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source (reader | file | path | bytes)
//!  │
//!  ├─ 1. from_*   decode into the in-memory document
//!  ├─ 2. to/to_pdf  select the target format
//!  └─ 3. as_*     produce bytes / file / reader (repeatable)
//! ```
//!
//! A [`Converter`] is a strict stage progression: Empty → Loaded → Formatted,
//! after which any number of `as_*` calls re-serialize the same document.
//! Output production never mutates the loaded document or the selected
//! format, so `as_bytes()` twice yields byte-identical results.
//!
//! One converter serves one logical conversion on one thread; its fields are
//! deliberately unsynchronized. Run independent converters in parallel
//! instead of sharing one.

use crate::codec::DocumentCodec;
use crate::error::ConvertError;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fluent load → format → emit pipeline over a [`DocumentCodec`].
///
/// # Example
/// ```rust,no_run
/// # use docflow_common::{Converter, FnCodec};
/// # fn codec() -> FnCodec<String, i32> { unimplemented!() }
/// let pdf_bytes = Converter::new(codec())
///     .from_path("report.docx")?
///     .to_pdf()?
///     .as_bytes()?;
/// # Ok::<(), docflow_common::ConvertError>(())
/// ```
pub struct Converter<C: DocumentCodec> {
    codec: C,
    document: Option<C::Document>,
    format: Option<C::Format>,
}

impl<C: DocumentCodec> std::fmt::Debug for Converter<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("document", &self.document.is_some())
            .field("format", &self.format.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: DocumentCodec> Converter<C> {
    /// Create an empty pipeline over `codec`.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            document: None,
            format: None,
        }
    }

    // ── Stage 1: bind source ──────────────────────────────────────────────

    /// Load the source document from a readable byte stream.
    ///
    /// Calling a `from_*` method again replaces the previously loaded
    /// document; the pipeline does not guard against re-binding.
    pub fn from_reader(mut self, mut reader: impl Read) -> Result<Self, ConvertError> {
        self.document = Some(
            self.codec
                .load_from_reader(&mut reader)
                .map_err(|source| ConvertError::LoadStream { source })?,
        );
        Ok(self)
    }

    /// Load the source document through an already-open file handle.
    pub fn from_file(mut self, mut file: File) -> Result<Self, ConvertError> {
        self.document = Some(
            self.codec
                .load_from_reader(&mut file)
                .map_err(|source| ConvertError::LoadFile { source })?,
        );
        Ok(self)
    }

    /// Load the source document from a file-system path.
    pub fn from_path(mut self, path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        self.document = Some(self.codec.load_from_path(path).map_err(|source| {
            ConvertError::LoadPath {
                path: path.to_path_buf(),
                source,
            }
        })?);
        debug!("loaded document from {}", path.display());
        Ok(self)
    }

    /// Load the source document from an in-memory byte sequence.
    pub fn from_bytes(mut self, bytes: impl AsRef<[u8]>) -> Result<Self, ConvertError> {
        let mut cursor = Cursor::new(bytes.as_ref());
        self.document = Some(
            self.codec
                .load_from_reader(&mut cursor)
                .map_err(|source| ConvertError::LoadBytes { source })?,
        );
        Ok(self)
    }

    // ── Stage 2: bind target format ───────────────────────────────────────

    /// Select the target format.
    ///
    /// # Errors
    /// [`ConvertError::NoSourceDocument`] when no source has been bound yet;
    /// a format is only meaningful relative to a loaded document.
    pub fn to(mut self, format: C::Format) -> Result<Self, ConvertError> {
        if self.document.is_none() {
            return Err(ConvertError::NoSourceDocument);
        }
        self.format = Some(format);
        Ok(self)
    }

    /// Select the codec's default PDF format.
    pub fn to_pdf(self) -> Result<Self, ConvertError> {
        let format = self.codec.pdf_format();
        self.to(format)
    }

    // ── Stage 3: produce output (repeatable) ──────────────────────────────

    /// Serialize the document into an in-memory byte buffer.
    ///
    /// Idempotent: the loaded document and selected format are untouched, so
    /// repeated calls yield byte-identical output.
    pub fn as_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        let (document, format) = self.require_ready()?;
        let mut buffer = Vec::new();
        self.codec
            .save_to_writer(document, &mut buffer, format)
            .map_err(|source| ConvertError::ConvertFailed { source })?;
        Ok(buffer)
    }

    /// Serialize the document to `path`, creating missing parent directories.
    ///
    /// Returns the path the file was written to (equal to the requested
    /// path).
    pub fn as_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        let (document, format) = self.require_ready()?;
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            // `Path::parent` yields "" for bare file names; nothing to create.
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| {
                    ConvertError::CreateDirFailed {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        self.codec
            .save_to_path(document, path, format)
            .map_err(|source| ConvertError::SaveFailed {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("saved converted document to {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Serialize the document and return it as a fresh in-memory reader.
    ///
    /// The reader is freshly allocated from [`as_bytes`](Self::as_bytes)
    /// output and owned entirely by the caller.
    pub fn as_reader(&self) -> Result<Cursor<Vec<u8>>, ConvertError> {
        Ok(Cursor::new(self.as_bytes()?))
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// The loaded in-memory document, if stage 1 completed.
    pub fn document(&self) -> Option<&C::Document> {
        self.document.as_ref()
    }

    /// The selected target format, if stage 2 completed.
    pub fn target_format(&self) -> Option<&C::Format> {
        self.format.as_ref()
    }

    /// Check both output preconditions, document first.
    fn require_ready(&self) -> Result<(&C::Document, &C::Format), ConvertError> {
        let document = self.document.as_ref().ok_or(ConvertError::NoSourceDocument)?;
        let format = self.format.as_ref().ok_or(ConvertError::NoTargetFormat)?;
        Ok((document, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FnCodec;
    use std::io::Write;

    /// Codec used across the pipeline tests: documents are strings, output
    /// prepends "CONVERTED: ". Format 1 is PDF.
    fn test_codec() -> FnCodec<String, u32> {
        FnCodec::new(
            |reader: &mut dyn Read| {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                Ok(text)
            },
            |doc: &String, writer: &mut dyn Write, _format: &u32| {
                write!(writer, "CONVERTED: {doc}")?;
                Ok(())
            },
            1,
        )
    }

    fn failing_codec() -> FnCodec<String, u32> {
        FnCodec::new(
            |_reader: &mut dyn Read| Err("load rejected".into()),
            |_doc: &String, _writer: &mut dyn Write, _format: &u32| Err("save rejected".into()),
            1,
        )
    }

    #[test]
    fn to_before_from_is_a_state_error() {
        let err = Converter::new(test_codec()).to(2).expect_err("must fail");
        assert!(err.is_state_error());
        assert_eq!(
            err.to_string(),
            "no source document set: call one of the from_* methods first"
        );
    }

    #[test]
    fn as_bytes_without_format_is_a_state_error() {
        let converter = Converter::new(test_codec())
            .from_bytes("doc")
            .expect("load");
        let err = converter.as_bytes().expect_err("must fail");
        assert!(err.is_state_error());
        assert_eq!(
            err.to_string(),
            "no target format set: call to() or to_pdf() first"
        );
    }

    #[test]
    fn missing_document_is_reported_before_missing_format() {
        let err = Converter::new(test_codec())
            .as_bytes()
            .expect_err("must fail");
        assert!(matches!(err, ConvertError::NoSourceDocument));
    }

    #[test]
    fn rebinding_overwrites_the_document() {
        let converter = Converter::new(test_codec())
            .from_bytes("first")
            .expect("load")
            .from_bytes("second")
            .expect("reload");
        assert_eq!(converter.document().map(String::as_str), Some("second"));
    }

    #[test]
    fn to_pdf_selects_the_codec_default() {
        let converter = Converter::new(test_codec())
            .from_bytes("doc")
            .expect("load")
            .to_pdf()
            .expect("format");
        assert_eq!(converter.target_format(), Some(&1));
    }

    #[test]
    fn each_binding_form_fails_with_its_own_message() {
        let stream_err = Converter::new(failing_codec())
            .from_reader(Cursor::new(b"x".to_vec()))
            .expect_err("reader load must fail");
        assert_eq!(stream_err.to_string(), "failed to load document");

        let bytes_err = Converter::new(failing_codec())
            .from_bytes("x")
            .expect_err("bytes load must fail");
        assert_eq!(
            bytes_err.to_string(),
            "failed to load document from byte array"
        );

        let path_err = Converter::new(test_codec())
            .from_path("/definitely/not/here.docx")
            .expect_err("path load must fail");
        assert!(path_err
            .to_string()
            .starts_with("failed to load document from path"));
        assert!(!path_err.is_state_error());
    }

    #[test]
    fn save_failure_wraps_cause_as_conversion_error() {
        use std::error::Error;

        // Drive the state directly; the failing codec's loader would
        // otherwise reject the document before the save stage is reached.
        let converter = Converter {
            codec: failing_codec(),
            document: Some("doc".to_string()),
            format: Some(1),
        };

        let err = converter.as_bytes().expect_err("save must fail");
        assert_eq!(err.to_string(), "failed to convert document");
        assert!(err
            .source()
            .expect("cause preserved")
            .to_string()
            .contains("save rejected"));
    }

    #[test]
    fn produce_is_idempotent() {
        let converter = Converter::new(test_codec())
            .from_bytes("stable")
            .expect("load")
            .to_pdf()
            .expect("format");

        let first = converter.as_bytes().expect("first produce");
        let second = converter.as_bytes().expect("second produce");
        assert_eq!(first, second);
    }

    #[test]
    fn as_reader_owns_a_fresh_buffer() {
        let converter = Converter::new(test_codec())
            .from_bytes("doc")
            .expect("load")
            .to_pdf()
            .expect("format");

        let mut reader = converter.as_reader().expect("reader");
        let mut text = String::new();
        reader.read_to_string(&mut text).expect("read");
        assert_eq!(text, "CONVERTED: doc");
    }
}
