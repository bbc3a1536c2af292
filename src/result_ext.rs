//! Extension methods for tracing errors in `Result` position.

use crate::{
    entry::Entry,
    error::{BoxError, TracedError, trace, wrap},
};

mod sealed {
    pub trait Sealed {}
    impl<T, E> Sealed for Result<T, E> {}
}

/// Tracing and wrapping directly on `Result`.
///
/// The success path is untouched: `Ok` values pass through, nothing is
/// captured, and the `_with` closures are never invoked. Re-tracing an
/// already-traced error merges rather than capturing again, so these
/// methods are safe to sprinkle along an entire propagation path.
///
/// # Examples
///
/// ```
/// use errtrace::{ResultExt, TracedError, kv};
///
/// fn parse_count(input: &str) -> Result<i32, TracedError> {
///     input
///         .trim()
///         .parse::<i32>()
///         .wrap_err("invalid count")
///         .trace_with(|| [kv!("input" => input)])
/// }
///
/// assert_eq!(parse_count(" 7 ").unwrap(), 7);
///
/// let err = parse_count("x").unwrap_err();
/// assert!(err.to_string().starts_with("invalid count: "));
/// assert_eq!(err.extra().len(), 1);
/// ```
pub trait ResultExt<T>: sealed::Sealed {
    /// Traces the error, if any; see [`trace`].
    #[must_use]
    fn trace(self) -> Result<T, TracedError>;

    /// Traces the error, if any, and appends the entries produced by
    /// `entries`. The closure runs only on the error path.
    #[must_use]
    fn trace_with<I, F>(self, entries: F) -> Result<T, TracedError>
    where
        I: IntoIterator<Item = Entry>,
        F: FnOnce() -> I;

    /// Wraps the error, if any, with `message`; see [`wrap`].
    #[must_use]
    fn wrap_err<M: Into<String>>(self, message: M) -> Result<T, TracedError>;

    /// Wraps the error, if any, with the message produced by `message`.
    /// The closure runs only on the error path.
    #[must_use]
    fn wrap_err_with<M, F>(self, message: F) -> Result<T, TracedError>
    where
        M: Into<String>,
        F: FnOnce() -> M;
}

impl<T, E: Into<BoxError>> ResultExt<T> for Result<T, E> {
    fn trace(self) -> Result<T, TracedError> {
        self.map_err(|err| trace(err))
    }

    fn trace_with<I, F>(self, entries: F) -> Result<T, TracedError>
    where
        I: IntoIterator<Item = Entry>,
        F: FnOnce() -> I,
    {
        self.map_err(|err| trace(err).with_entries(entries()))
    }

    fn wrap_err<M: Into<String>>(self, message: M) -> Result<T, TracedError> {
        self.map_err(|err| wrap(err, message))
    }

    fn wrap_err_with<M, F>(self, message: F) -> Result<T, TracedError>
    where
        M: Into<String>,
        F: FnOnce() -> M,
    {
        self.map_err(|err| wrap(err, message()))
    }
}
