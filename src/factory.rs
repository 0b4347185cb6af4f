//! Product factory: one license guard, many converters.
//!
//! A product binding (Words, Cells, PDF, …) typically owns exactly one
//! [`LicenseGuard`] and hands out a fresh [`Converter`] per conversion.
//! [`ConverterFactory`] packages that composition: every
//! [`converter`](ConverterFactory::converter) call first consults the guard,
//! so the license is initialized lazily on the first conversion and the
//! fast path makes every later consultation free.

use crate::codec::DocumentCodec;
use crate::converter::Converter;
use crate::license::{LicenseGuard, LicenseSource};
use std::sync::Arc;

/// License-gated source of [`Converter`] instances.
///
/// Construct one per product and share it for the life of the process; the
/// codec is shared across converters through an [`Arc`], the guard is
/// consulted on every converter creation.
///
/// # Example
/// ```rust,no_run
/// # use docflow_common::{ConverterFactory, FnCodec, LicenseSource, LicenseStream, BoxError};
/// # struct WordsLicense;
/// # impl LicenseSource for WordsLicense {
/// #     type License = ();
/// #     fn license_stream(&self) -> Result<Option<LicenseStream>, BoxError> { Ok(None) }
/// #     fn create_license(&self) -> Result<(), BoxError> { Ok(()) }
/// #     fn apply_stream(&self, _: &mut (), _: LicenseStream) -> Result<(), BoxError> { Ok(()) }
/// # }
/// # fn codec() -> FnCodec<String, i32> { unimplemented!() }
/// let factory = ConverterFactory::new(WordsLicense, codec());
/// let pdf = factory
///     .converter()
///     .from_path("report.docx")?
///     .to_pdf()?
///     .as_bytes()?;
/// # Ok::<(), docflow_common::ConvertError>(())
/// ```
pub struct ConverterFactory<S: LicenseSource, C: DocumentCodec> {
    guard: LicenseGuard<S>,
    codec: Arc<C>,
}

impl<S: LicenseSource, C: DocumentCodec> ConverterFactory<S, C> {
    /// Create a factory with an uninitialized guard.
    ///
    /// The license is not touched until the first
    /// [`converter`](Self::converter) call (or an explicit
    /// [`guard`](Self::guard)`.ensure_initialized()`).
    pub fn new(source: S, codec: C) -> Self {
        Self {
            guard: LicenseGuard::new(source),
            codec: Arc::new(codec),
        }
    }

    /// Consult the license guard, then hand out a fresh empty converter.
    pub fn converter(&self) -> Converter<Arc<C>> {
        self.guard.ensure_initialized();
        Converter::new(Arc::clone(&self.codec))
    }

    /// The license guard owned by this factory.
    pub fn guard(&self) -> &LicenseGuard<S> {
        &self.guard
    }

    /// Run a computation in a license-aware context.
    ///
    /// Delegates to [`LicenseGuard::with_result`].
    pub fn with_result<T>(&self, operation: impl FnOnce() -> T) -> T {
        self.guard.with_result(operation)
    }

    /// Run an effect in a license-aware context.
    ///
    /// Delegates to [`LicenseGuard::with_effect`].
    pub fn with_effect(&self, operation: impl FnOnce()) {
        self.guard.with_effect(operation)
    }
}
