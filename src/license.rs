//! Lazy, thread-safe license initialization.
//!
//! ## Why a guard instead of a one-shot cell?
//!
//! Commercial document libraries are licensed per product: every factory in a
//! process shares one license object that must be constructed at most once,
//! from a stream the host platform supplies. A `OnceLock` cannot model this,
//! because a *failed* attempt must settle back to "absent" and be retried on
//! the next call — only a successful construction counts as initialized.
//! [`LicenseGuard`] implements the classic check / lock / re-check pattern
//! over an `RwLock`ed slot instead.
//!
//! A missing license is not an error. When the supplier yields no stream the
//! guard settles into evaluation mode (the underlying library typically
//! watermarks output) and conversion proceeds normally. Initialization
//! failures are absorbed the same way: they reach the caller only through
//! the [`LicenseSource::on_error`] side channel, never through
//! [`LicenseGuard::ensure_initialized`].

use crate::error::BoxError;
use std::io::Read;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Readable byte stream carrying license material.
///
/// Opaque to the guard; it is handed straight to
/// [`LicenseSource::apply_stream`].
pub type LicenseStream = Box<dyn Read + Send>;

/// Strategy supplying everything the guard needs to construct a license.
///
/// Implemented once per product (Words, Cells, PDF, …); the guard owns the
/// orchestration, the source owns the product specifics.
pub trait LicenseSource {
    /// The license handle this source produces.
    type License: Send + Sync;

    /// Retrieve the license material from the host platform.
    ///
    /// `Ok(None)` means no license is available — a valid outcome, the guard
    /// stays in evaluation mode. `Err` aborts the attempt.
    fn license_stream(&self) -> Result<Option<LicenseStream>, BoxError>;

    /// Construct a fresh, unconfigured license instance.
    fn create_license(&self) -> Result<Self::License, BoxError>;

    /// Apply previously retrieved license material to a fresh instance.
    fn apply_stream(
        &self,
        license: &mut Self::License,
        stream: LicenseStream,
    ) -> Result<(), BoxError>;

    /// Observability hook invoked with the cause of a failed attempt.
    ///
    /// Must not influence control flow; the guard settles to absent
    /// regardless. The default implementation logs a warning.
    fn on_error(&self, error: &BoxError) {
        warn!("license initialization failed: {error}");
    }
}

/// Thread-safe holder for a lazily constructed, process-lifetime license.
///
/// Many threads may call [`ensure_initialized`](Self::ensure_initialized)
/// concurrently; exactly one performs the construction while the rest either
/// take the fast path or briefly block on the write lock and observe the
/// same outcome. Construct one guard per product and share it (typically in
/// an `Arc` or an owning factory) for the life of the process.
pub struct LicenseGuard<S: LicenseSource> {
    source: S,
    slot: RwLock<Option<Arc<S::License>>>,
}

impl<S: LicenseSource> LicenseGuard<S> {
    /// Create a guard in the uninitialized state.
    ///
    /// No license work happens until the first
    /// [`ensure_initialized`](Self::ensure_initialized) call.
    pub fn new(source: S) -> Self {
        Self {
            source,
            slot: RwLock::new(None),
        }
    }

    /// Initialize the license if it has not been constructed yet.
    ///
    /// Idempotent and infallible from the caller's perspective:
    ///
    /// * already initialized — returns immediately via a shared read lock;
    /// * supplier yields no stream — the guard stays absent (evaluation
    ///   mode) and the next call re-attempts;
    /// * supplier, constructor, or applier fails —
    ///   [`LicenseSource::on_error`] is invoked once with the cause, the
    ///   slot settles to absent, and the next call re-attempts.
    ///
    /// Only a committed license stops further attempts. A partially-applied
    /// license is never visible: the slot is written once, after the applier
    /// succeeded, under the exclusive lock.
    pub fn ensure_initialized(&self) {
        if self.read_slot().is_some() {
            return;
        }

        let mut slot = self
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Re-check under the exclusive lock: several threads can pass the
        // fast-path check before any of them acquires the write lock.
        if slot.is_some() {
            return;
        }

        match self.try_load() {
            Ok(Some(license)) => {
                info!("license initialized");
                *slot = Some(Arc::new(license));
            }
            Ok(None) => {
                debug!("no license stream available; continuing in evaluation mode");
            }
            Err(e) => {
                self.source.on_error(&e);
                *slot = None;
            }
        }
    }

    /// One full supplier → constructor → applier attempt.
    fn try_load(&self) -> Result<Option<S::License>, BoxError> {
        let Some(stream) = self.source.license_stream()? else {
            return Ok(None);
        };
        let mut license = self.source.create_license()?;
        self.source.apply_stream(&mut license, stream)?;
        Ok(Some(license))
    }

    /// The current license handle, or `None` when uninitialized or running
    /// in evaluation mode.
    ///
    /// Never blocks beyond the shared read lock and has no side effects —
    /// in particular it does not trigger initialization.
    pub fn license(&self) -> Option<Arc<S::License>> {
        self.read_slot()
    }

    /// Run a computation that expects the license to already be initialized.
    ///
    /// Interception seam: today this invokes `operation` directly, without
    /// touching the guard, and propagates panics unchanged. Callers are
    /// expected to have called [`ensure_initialized`](Self::ensure_initialized)
    /// once at process start.
    pub fn with_result<T>(&self, operation: impl FnOnce() -> T) -> T {
        operation()
    }

    /// Effect-only counterpart of [`with_result`](Self::with_result).
    pub fn with_effect(&self, operation: impl FnOnce()) {
        operation()
    }

    /// The strategy this guard was built from.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn read_slot(&self) -> Option<Arc<S::License>> {
        // A poisoned lock only means another initializer panicked while
        // holding it; the committed-or-absent slot value is still valid.
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<S: LicenseSource> std::fmt::Debug for LicenseGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseGuard")
            .field("initialized", &self.read_slot().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scriptable source: counts every strategy invocation.
    struct ScriptedSource {
        stream: Option<&'static [u8]>,
        fail_apply: bool,
        created: AtomicUsize,
        errors: AtomicUsize,
    }

    impl ScriptedSource {
        fn with_stream() -> Self {
            Self {
                stream: Some(b"license material"),
                fail_apply: false,
                created: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
            }
        }

        fn without_stream() -> Self {
            Self {
                stream: None,
                ..Self::with_stream()
            }
        }
    }

    impl LicenseSource for ScriptedSource {
        type License = String;

        fn license_stream(&self) -> Result<Option<LicenseStream>, BoxError> {
            Ok(self
                .stream
                .map(|bytes| Box::new(Cursor::new(bytes)) as LicenseStream))
        }

        fn create_license(&self) -> Result<String, BoxError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }

        fn apply_stream(
            &self,
            license: &mut String,
            mut stream: LicenseStream,
        ) -> Result<(), BoxError> {
            if self.fail_apply {
                return Err("apply rejected".into());
            }
            let mut buf = String::new();
            stream.read_to_string(&mut buf)?;
            *license = buf;
            Ok(())
        }

        fn on_error(&self, _error: &BoxError) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn successful_initialization_commits_once() {
        let guard = LicenseGuard::new(ScriptedSource::with_stream());
        assert!(guard.license().is_none());

        guard.ensure_initialized();
        guard.ensure_initialized();

        let license = guard.license().expect("license must be committed");
        assert_eq!(*license, "license material");
        assert_eq!(guard.source().created.load(Ordering::SeqCst), 1);
        assert_eq!(guard.source().errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn absent_stream_means_evaluation_mode_not_error() {
        let guard = LicenseGuard::new(ScriptedSource::without_stream());
        guard.ensure_initialized();

        assert!(guard.license().is_none());
        assert_eq!(guard.source().created.load(Ordering::SeqCst), 0);
        assert_eq!(guard.source().errors.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_apply_reports_once_and_settles_absent() {
        let mut source = ScriptedSource::with_stream();
        source.fail_apply = true;
        let guard = LicenseGuard::new(source);

        guard.ensure_initialized();

        assert!(guard.license().is_none());
        assert_eq!(guard.source().errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_attempt_is_retried_on_next_call() {
        let mut source = ScriptedSource::with_stream();
        source.fail_apply = true;
        let guard = LicenseGuard::new(source);

        guard.ensure_initialized();
        guard.ensure_initialized();

        // Absence always re-attempts; only success is terminal.
        assert_eq!(guard.source().errors.load(Ordering::SeqCst), 2);
        assert_eq!(guard.source().created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn wrappers_pass_through_without_initializing() {
        let guard = LicenseGuard::new(ScriptedSource::with_stream());

        let value = guard.with_result(|| 42);
        assert_eq!(value, 42);

        let mut ran = false;
        guard.with_effect(|| ran = true);
        assert!(ran);

        // The wrappers are a seam, not a trigger.
        assert!(guard.license().is_none());
        assert_eq!(guard.source().created.load(Ordering::SeqCst), 0);
    }
}
