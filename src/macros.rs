//! Convenience macros.

/// Builds an [`Entry`] from a `key => value` pair.
///
/// Shorthand for [`Entry::new`]; the value may be anything serializable.
///
/// # Examples
///
/// ```
/// use errtrace::{ResultExt, kv};
///
/// let err: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
/// let traced = err
///     .trace_with(|| [kv!("attempt" => 3), kv!("endpoint" => "/health")])
///     .unwrap_err();
/// assert_eq!(traced.extra().len(), 2);
/// ```
///
/// [`Entry`]: crate::Entry
/// [`Entry::new`]: crate::Entry::new
#[macro_export]
macro_rules! kv {
    ($key:expr => $value:expr $(,)?) => {
        $crate::Entry::new($key, $value)
    };
}
