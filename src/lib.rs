//! # docflow-common
//!
//! Common abstractions for building licensed document-conversion factories.
//!
//! ## Why this crate?
//!
//! Product bindings for commercial document libraries all repeat the same
//! two pieces of plumbing: a process-lifetime license that must be applied
//! lazily, thread-safely, and at most once; and a load → format → emit
//! pipeline that looks identical whether the document is a spreadsheet, a
//! word-processing file, or a slide deck. This crate implements both pieces
//! once, generically, and leaves the product specifics to two small
//! strategy traits.
//!
//! ## Component Overview
//!
//! ```text
//! ConverterFactory
//!  │
//!  ├─ LicenseGuard        lazy, thread-safe, at-most-once license init
//!  │    └─ LicenseSource  strategy: stream supplier + constructor + applier
//!  │
//!  └─ Converter           fluent pipeline: from_* → to/to_pdf → as_*
//!       └─ DocumentCodec  strategy: load/save for one document type
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use docflow_common::{Converter, FnCodec};
//! use std::io::{Read, Write};
//!
//! // Concrete converters are configuration, not subclasses: supply a load
//! // and a save strategy plus the product's PDF format code.
//! let codec = FnCodec::new(
//!     |reader: &mut dyn Read| {
//!         let mut text = String::new();
//!         reader.read_to_string(&mut text)?;
//!         Ok(text)
//!     },
//!     |doc: &String, writer: &mut dyn Write, _format: &u32| {
//!         write!(writer, "CONVERTED: {doc}")?;
//!         Ok(())
//!     },
//!     1, // PDF format code
//! );
//!
//! let bytes = Converter::new(codec)
//!     .from_bytes("Test document content")?
//!     .to_pdf()?
//!     .as_bytes()?;
//! assert_eq!(bytes, b"CONVERTED: Test document content");
//! # Ok::<(), docflow_common::ConvertError>(())
//! ```
//!
//! ## Error taxonomy
//!
//! | Family | Meaning | Carries cause |
//! |--------|---------|---------------|
//! | State errors | pipeline stages called out of order | no |
//! | Conversion errors | a load/save strategy failed | yes |
//! | License failures | absorbed by the guard, reported via `on_error` only | side channel |
//!
//! A missing or failed license never fails a conversion: the guard settles
//! into evaluation mode and the underlying library degrades (watermarks,
//! size limits) rather than erroring.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod codec;
pub mod converter;
pub mod error;
pub mod factory;
pub mod license;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use codec::{DocumentCodec, FnCodec};
pub use converter::Converter;
pub use error::{BoxError, ConvertError};
pub use factory::ConverterFactory;
pub use license::{LicenseGuard, LicenseSource, LicenseStream};
