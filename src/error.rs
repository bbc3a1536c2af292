//! The traced error type and the trace/wrap entry points.

use core::fmt;
use std::error::Error;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    entry::Entry,
    frame::Frame,
    inspect::{Chain, ExternalTrace},
    stack::Stack,
};

/// A boxed error that can cross thread boundaries.
///
/// The error-chain currency of this crate: everything [`trace`] and [`wrap`]
/// accept converts into one of these, which includes every
/// `Error + Send + Sync` type as well as plain message strings.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A message layered on top of an underlying error.
///
/// Produced by [`wrap`]; displays as `message: <underlying text>`, so
/// repeated wraps chain textually (`b: a: root`). Shows up as a link when
/// walking a wrapped error's sources.
#[derive(Debug, thiserror::Error)]
#[error("{message}: {source}")]
pub struct MessageError {
    message: String,
    source: BoxError,
}

impl MessageError {
    /// Returns the message applied by this wrap layer.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error annotated with a captured call stack and diagnostic entries.
///
/// `TracedError` wraps exactly one underlying error and behaves as a
/// drop-in substitute for it: [`Display`] shows the underlying text and
/// [`Error::source`] unwraps one level into the chain. On top of that it
/// carries the [`Stack`] captured when the error was first observed and an
/// ordered, append-only list of [`Entry`] diagnostics.
///
/// At most one `TracedError` exists per error chain built through this
/// crate: [`trace`] and [`wrap`] merge into an existing instance instead of
/// nesting a second one, so the stack is captured exactly once no matter
/// how many layers of a program annotate the same failure on its way up.
///
/// Instances come from [`trace`], [`wrap`], the [`ResultExt`] methods, or
/// [`get_trace`] synthesis; there is no bare constructor.
///
/// Sharing across threads is safe (`Send + Sync`). Merging requires
/// ownership, so concurrent mutation of one instance cannot be expressed.
///
/// [`Display`]: core::fmt::Display
/// [`Error::source`]: std::error::Error::source
/// [`ResultExt`]: crate::ResultExt
/// [`get_trace`]: crate::get_trace
#[derive(Debug)]
pub struct TracedError {
    error: BoxError,
    stack: Option<Stack>,
    extra: Vec<Entry>,
}

/// Attaches a captured call stack to an error.
///
/// If the error's chain (through this crate's own wrapper shapes) already
/// contains a [`TracedError`], that same instance is returned with its
/// message, underlying error, and stack untouched — tracing is idempotent
/// and never captures twice. Otherwise a fresh `TracedError` is built
/// around `err`, with a stack that starts at `trace`'s caller.
///
/// Diagnostic entries are attached with [`TracedError::with`] and
/// accumulate across merges:
///
/// ```
/// use errtrace::kv;
///
/// let traced = errtrace::trace(std::io::Error::other("boom")).with(kv!("attempt" => 1));
/// assert_eq!(traced.extra().len(), 1);
///
/// // A second trace merges instead of re-capturing.
/// let traced = errtrace::trace(traced).with(kv!("attempt" => 2));
/// assert_eq!(traced.extra().len(), 2);
/// ```
pub fn trace<E: Into<BoxError>>(err: E) -> TracedError {
    trace_boxed(err.into())
}

#[inline(never)]
fn trace_boxed(err: BoxError) -> TracedError {
    match extract_traced(err) {
        Ok(traced) => *traced,
        Err(err) => TracedError {
            error: err,
            stack: Some(Stack::capture(0)),
            extra: Vec::new(),
        },
    }
}

/// Wraps an error with a message and attaches a captured call stack.
///
/// The resulting text is `message: <previous text>`, and wraps chain:
/// wrapping `"root"` with `"a"` and then `"b"` displays `b: a: root`.
///
/// If the chain already contains a [`TracedError`], the message is applied
/// as a textual wrap of its inner error and the existing stack is kept;
/// otherwise the message wrap is applied first and a fresh `TracedError` is
/// built around it.
///
/// # Examples
///
/// ```
/// let err = std::io::Error::other("root");
/// let wrapped = errtrace::wrap(errtrace::wrap(err, "a"), "b");
/// assert_eq!(wrapped.to_string(), "b: a: root");
/// ```
pub fn wrap<E: Into<BoxError>>(err: E, message: impl Into<String>) -> TracedError {
    wrap_boxed(err.into(), message.into())
}

#[inline(never)]
fn wrap_boxed(err: BoxError, message: String) -> TracedError {
    match extract_traced(err) {
        Ok(traced) => {
            let TracedError { error, stack, extra } = *traced;
            TracedError {
                error: Box::new(MessageError { message, source: error }),
                stack,
                extra,
            }
        }
        Err(err) => TracedError {
            error: Box::new(MessageError { message, source: err }),
            stack: Some(Stack::capture(0)),
            extra: Vec::new(),
        },
    }
}

/// Pulls an existing [`TracedError`] out of an owned chain, walking through
/// this crate's own wrapper shapes only. On failure the chain is handed
/// back unchanged.
///
/// A message layer sitting above an extracted instance is dropped: the
/// instance itself is the chain's annotation point.
fn extract_traced(err: BoxError) -> Result<Box<TracedError>, BoxError> {
    let err = match err.downcast::<TracedError>() {
        Ok(traced) => return Ok(traced),
        Err(err) => err,
    };
    match err.downcast::<MessageError>() {
        Ok(wrapped) => {
            let MessageError { message, source } = *wrapped;
            match extract_traced(source) {
                Ok(traced) => Ok(traced),
                Err(source) => Err(Box::new(MessageError { message, source })),
            }
        }
        Err(err) => Err(err),
    }
}

impl TracedError {
    /// Appends one diagnostic entry.
    ///
    /// Entries accumulate in call order, across repeated [`trace`]/[`wrap`]
    /// merges included.
    #[must_use]
    pub fn with(mut self, entry: Entry) -> TracedError {
        self.extra.push(entry);
        self
    }

    /// Appends a batch of diagnostic entries, preserving their order.
    #[must_use]
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = Entry>) -> TracedError {
        self.extra.extend(entries);
        self
    }

    /// Returns the captured stack, or `None` when nothing was captured.
    pub fn stack(&self) -> Option<&Stack> {
        self.stack.as_ref()
    }

    /// Returns the diagnostic entries in insertion order.
    pub fn extra(&self) -> &[Entry] {
        &self.extra
    }

    /// Returns `"file:line"` for the outermost captured frame, or an empty
    /// string when there is no stack or it has no frames.
    ///
    /// # Examples
    ///
    /// ```
    /// let traced = errtrace::trace(std::io::Error::other("boom"));
    /// assert!(!traced.top_line().is_empty());
    /// ```
    pub fn top_line(&self) -> String {
        let Some(stack) = &self.stack else {
            return String::new();
        };
        let Some(frame) = stack.frames().first() else {
            return String::new();
        };
        let symbol = frame.symbol();
        format!("{}:{}", symbol.file, symbol.line)
    }

    /// Reports whether `target` appears in the unwrap chain.
    ///
    /// Comparison is by address identity, not message text, and starts at
    /// the wrapped error. An error that merely displays the same text
    /// compares false.
    pub fn is(&self, target: &(dyn Error + 'static)) -> bool {
        let inner: &(dyn Error + 'static) = &*self.error;
        Chain::new(inner).any(|link| core::ptr::addr_eq(link as *const _, target as *const _))
    }

    /// Synthesizes a traced error from a foreign stack carrier, adopting
    /// its tokens without mutating it. An empty token list yields an
    /// instance with no stack at all.
    pub(crate) fn from_external(foreign: &ExternalTrace) -> TracedError {
        let stack = if foreign.frames().is_empty() {
            None
        } else {
            Some(Stack::from_frames(foreign.frames().to_vec()))
        };
        TracedError {
            error: Box::new(foreign.clone()),
            stack,
            extra: Vec::new(),
        }
    }
}

/// Shows the wrapped error's text; a `TracedError` reads exactly like the
/// error it annotates.
impl fmt::Display for TracedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl Error for TracedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let inner: &(dyn Error + 'static) = &*self.error;
        Some(inner)
    }
}

/// Serializes as `{"error", "stack", "extra"}`, with `extra` present only
/// when at least one entry exists.
impl Serialize for TracedError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = if self.extra.is_empty() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(fields))?;
        map.serialize_entry("error", &self.error.to_string())?;
        match &self.stack {
            Some(stack) => map.serialize_entry("stack", stack)?,
            None => {
                let empty: &[Frame] = &[];
                map.serialize_entry("stack", empty)?;
            }
        }
        if !self.extra.is_empty() {
            map.serialize_entry("extra", &self.extra)?;
        }
        map.end()
    }
}
