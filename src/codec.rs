//! Document codec strategies: how a concrete product loads and saves.
//!
//! The pipeline in [`crate::converter`] is format-agnostic; everything
//! product-specific lives behind [`DocumentCodec`]. A concrete converter is
//! configuration, not a new type: either implement the trait directly for a
//! product binding, or assemble an [`FnCodec`] from closures when the
//! product API is already function-shaped.

use crate::error::BoxError;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Load/save strategy for one concrete document type.
///
/// Strategy errors are opaque [`BoxError`]s; the pipeline wraps them into
/// stage-specific [`ConvertError`](crate::error::ConvertError) variants so
/// the original cause survives.
pub trait DocumentCodec {
    /// The in-memory decoded document (e.g. a workbook or DOM handle).
    type Document;

    /// Opaque identifier selecting the serialization target, usually a
    /// product-defined format code.
    type Format: Clone;

    /// Decode a document from a readable byte stream.
    fn load_from_reader(&self, reader: &mut dyn Read) -> Result<Self::Document, BoxError>;

    /// Decode a document from a file-system path.
    fn load_from_path(&self, path: &Path) -> Result<Self::Document, BoxError>;

    /// Serialize the document in `format` into an in-memory sink.
    fn save_to_writer(
        &self,
        document: &Self::Document,
        writer: &mut dyn Write,
        format: &Self::Format,
    ) -> Result<(), BoxError>;

    /// Serialize the document in `format` directly to a file-system path.
    fn save_to_path(
        &self,
        document: &Self::Document,
        path: &Path,
        format: &Self::Format,
    ) -> Result<(), BoxError>;

    /// The format code [`Converter::to_pdf`](crate::converter::Converter::to_pdf)
    /// selects.
    fn pdf_format(&self) -> Self::Format;
}

/// Delegation so a factory can share one codec across many converters.
impl<T: DocumentCodec> DocumentCodec for Arc<T> {
    type Document = T::Document;
    type Format = T::Format;

    fn load_from_reader(&self, reader: &mut dyn Read) -> Result<Self::Document, BoxError> {
        (**self).load_from_reader(reader)
    }

    fn load_from_path(&self, path: &Path) -> Result<Self::Document, BoxError> {
        (**self).load_from_path(path)
    }

    fn save_to_writer(
        &self,
        document: &Self::Document,
        writer: &mut dyn Write,
        format: &Self::Format,
    ) -> Result<(), BoxError> {
        (**self).save_to_writer(document, writer, format)
    }

    fn save_to_path(
        &self,
        document: &Self::Document,
        path: &Path,
        format: &Self::Format,
    ) -> Result<(), BoxError> {
        (**self).save_to_path(document, path, format)
    }

    fn pdf_format(&self) -> Self::Format {
        (**self).pdf_format()
    }
}

type LoadReaderFn<D> = Box<dyn Fn(&mut dyn Read) -> Result<D, BoxError> + Send + Sync>;
type LoadPathFn<D> = Box<dyn Fn(&Path) -> Result<D, BoxError> + Send + Sync>;
type SaveWriterFn<D, F> =
    Box<dyn Fn(&D, &mut dyn Write, &F) -> Result<(), BoxError> + Send + Sync>;
type SavePathFn<D, F> = Box<dyn Fn(&D, &Path, &F) -> Result<(), BoxError> + Send + Sync>;

/// [`DocumentCodec`] assembled from a table of closures.
///
/// The two path-based strategies are optional: by default
/// `load_from_path` opens the file and delegates to the reader strategy, and
/// `save_to_path` creates the file and delegates to the writer strategy.
/// Override them with [`with_load_path`](Self::with_load_path) /
/// [`with_save_path`](Self::with_save_path) when the product API has a
/// faster native path form (memory-mapped load, streaming save).
///
/// # Example
/// ```rust
/// use docflow_common::{Converter, FnCodec};
///
/// // A toy "codec": documents are strings, format 1 is "PDF".
/// let codec = FnCodec::new(
///     |reader: &mut dyn std::io::Read| {
///         let mut text = String::new();
///         reader.read_to_string(&mut text)?;
///         Ok(text)
///     },
///     |doc: &String, writer: &mut dyn std::io::Write, _format: &i32| {
///         writer.write_all(doc.to_uppercase().as_bytes())?;
///         Ok(())
///     },
///     1,
/// );
///
/// let bytes = Converter::new(codec)
///     .from_bytes("hello")?
///     .to_pdf()?
///     .as_bytes()?;
/// assert_eq!(bytes, b"HELLO");
/// # Ok::<(), docflow_common::ConvertError>(())
/// ```
pub struct FnCodec<D, F: Clone> {
    load_reader: LoadReaderFn<D>,
    load_path: Option<LoadPathFn<D>>,
    save_writer: SaveWriterFn<D, F>,
    save_path: Option<SavePathFn<D, F>>,
    pdf_format: F,
}

impl<D, F: Clone> FnCodec<D, F> {
    /// Assemble a codec from the two required strategies and the default
    /// PDF format code.
    pub fn new(
        load_reader: impl Fn(&mut dyn Read) -> Result<D, BoxError> + Send + Sync + 'static,
        save_writer: impl Fn(&D, &mut dyn Write, &F) -> Result<(), BoxError> + Send + Sync + 'static,
        pdf_format: F,
    ) -> Self {
        Self {
            load_reader: Box::new(load_reader),
            load_path: None,
            save_writer: Box::new(save_writer),
            save_path: None,
            pdf_format,
        }
    }

    /// Replace the derived path loader with a native one.
    pub fn with_load_path(
        mut self,
        load_path: impl Fn(&Path) -> Result<D, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.load_path = Some(Box::new(load_path));
        self
    }

    /// Replace the derived path writer with a native one.
    pub fn with_save_path(
        mut self,
        save_path: impl Fn(&D, &Path, &F) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.save_path = Some(Box::new(save_path));
        self
    }
}

impl<D, F: Clone> DocumentCodec for FnCodec<D, F> {
    type Document = D;
    type Format = F;

    fn load_from_reader(&self, reader: &mut dyn Read) -> Result<D, BoxError> {
        (self.load_reader)(reader)
    }

    fn load_from_path(&self, path: &Path) -> Result<D, BoxError> {
        match &self.load_path {
            Some(load) => load(path),
            None => {
                let mut file = File::open(path)?;
                (self.load_reader)(&mut file)
            }
        }
    }

    fn save_to_writer(&self, document: &D, writer: &mut dyn Write, format: &F) -> Result<(), BoxError> {
        (self.save_writer)(document, writer, format)
    }

    fn save_to_path(&self, document: &D, path: &Path, format: &F) -> Result<(), BoxError> {
        match &self.save_path {
            Some(save) => save(document, path, format),
            None => {
                let mut file = File::create(path)?;
                (self.save_writer)(document, &mut file, format)?;
                file.flush()?;
                Ok(())
            }
        }
    }

    fn pdf_format(&self) -> F {
        self.pdf_format.clone()
    }
}
