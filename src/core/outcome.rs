//! Per-task outcome wrapper holding a success value or a captured failure.

use anyhow::Error;

/// Immutable holder of exactly one of success value or captured failure.
///
/// One `Outcome` is delivered per submitted task, carrying either the value
/// its unit of work produced or, once retries are exhausted, the original
/// error it raised. [`Outcome::into_result`] is the propagation path back to
/// the caller; the error object is handed over as captured, not rewrapped.
#[derive(Debug)]
pub struct Outcome<T> {
    inner: Result<T, Error>,
}

impl<T> Outcome<T> {
    pub(crate) fn from_result(inner: Result<T, Error>) -> Self {
        Self { inner }
    }

    /// True iff the task failed.
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.inner.is_err()
    }

    /// True iff the task succeeded. Complement of [`Outcome::is_err`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }

    /// Borrow the success value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.inner.as_ref().ok()
    }

    /// Borrow the captured error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.inner.as_ref().err()
    }

    /// Return the success value, or `fallback` on failure. Never panics.
    pub fn unwrap_or(self, fallback: T) -> T {
        self.inner.unwrap_or(fallback)
    }

    /// Return the success value.
    ///
    /// # Panics
    ///
    /// Panics with the captured error on failure. Prefer
    /// [`Outcome::into_result`] or [`Outcome::unwrap_or`] outside of tests.
    #[must_use]
    pub fn unwrap(self) -> T {
        match self.inner {
            Ok(value) => value,
            Err(error) => panic!("called `Outcome::unwrap()` on a failed task: {error:#}"),
        }
    }

    /// Convert into a plain `Result`, preserving the original error object.
    #[allow(clippy::missing_errors_doc)]
    pub fn into_result(self) -> Result<T, Error> {
        self.inner
    }

    /// Consume into the success value, if any.
    #[must_use]
    pub fn ok(self) -> Option<T> {
        self.inner.ok()
    }

    /// Consume into the captured error, if any.
    #[must_use]
    pub fn err(self) -> Option<Error> {
        self.inner.err()
    }
}

impl<T> From<Result<T, Error>> for Outcome<T> {
    fn from(inner: Result<T, Error>) -> Self {
        Self::from_result(inner)
    }
}
