//! Walking error chains and locating captured traces.
//!
//! Everything in here is read-only: chains are walked through
//! [`Error::source`], known shapes are recognized by downcast at each step,
//! and foreign traces are adopted by synthesis rather than mutation.
//!
//! [`Error::source`]: std::error::Error::source

use std::error::Error;

use crate::{error::TracedError, frame::Frame};

/// Upper bound on chain-walk depth.
///
/// A chain longer than this is treated as ending; backstop for unwrap
/// cycles that are not simple self-references.
const MAX_CHAIN_DEPTH: usize = 256;

/// Iterator over an error chain, from an error through its sources.
///
/// Yields the starting error first. The walk is cycle-safe: an error whose
/// `source` returns itself ends the chain, and no walk visits more than a
/// fixed number of links.
///
/// # Examples
///
/// ```
/// use errtrace::Chain;
///
/// let err = errtrace::wrap(std::io::Error::other("root"), "context");
/// // TracedError -> MessageError -> io::Error
/// assert_eq!(Chain::new(&err).count(), 3);
/// ```
#[derive(Clone, Copy)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
    remaining: usize,
}

impl<'a> Chain<'a> {
    /// Starts a chain walk at `err`.
    pub fn new(err: &'a (dyn Error + 'static)) -> Chain<'a> {
        Chain {
            next: Some(err),
            remaining: MAX_CHAIN_DEPTH,
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            self.next = None;
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = match current.source() {
            // A self-referential source terminates the chain.
            Some(next) if core::ptr::addr_eq(next as *const _, current as *const _) => None,
            next => next,
        };
        Some(current)
    }
}

/// An error carrying a stack captured outside this crate.
///
/// The interop shape for foreign tracing systems: a message plus an ordered
/// sequence of raw location tokens (outermost call site first). Put one in
/// an error chain — or hand it to [`get_trace`] directly — and the foreign
/// trace becomes visible to inspection and rendering without being
/// re-captured.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ExternalTrace {
    message: String,
    frames: Vec<Frame>,
}

impl ExternalTrace {
    /// Creates an external trace from a message and raw location tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use errtrace::ExternalTrace;
    ///
    /// let foreign = ExternalTrace::new("remote failure", [0x4000, 0x4100]);
    /// assert_eq!(foreign.frames().len(), 2);
    /// ```
    pub fn new(message: impl Into<String>, tokens: impl IntoIterator<Item = usize>) -> ExternalTrace {
        ExternalTrace {
            message: message.into(),
            frames: tokens.into_iter().map(Frame::from_raw).collect(),
        }
    }

    /// Returns the carried frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// A trace located by [`get_trace`].
///
/// Either a borrowed reference to the [`TracedError`] already present in
/// the chain (identity preserved) or a fresh instance synthesized from a
/// foreign carrier. Derefs to [`TracedError`] either way.
#[derive(Debug)]
pub enum FoundTrace<'a> {
    /// The chain's own `TracedError`, returned as-is.
    Existing(&'a TracedError),
    /// A `TracedError` synthesized from an [`ExternalTrace`] in the chain;
    /// the foreign error itself is left untouched.
    Synthesized(TracedError),
}

impl std::ops::Deref for FoundTrace<'_> {
    type Target = TracedError;

    fn deref(&self) -> &TracedError {
        match self {
            FoundTrace::Existing(traced) => traced,
            FoundTrace::Synthesized(traced) => traced,
        }
    }
}

/// Reports whether `err`'s chain carries a captured trace.
///
/// True iff some chain member is a [`TracedError`] whose stack was actually
/// captured; plain errors and trace shells without a stack report false.
///
/// # Examples
///
/// ```
/// let plain = std::io::Error::other("boom");
/// assert!(!errtrace::has_trace(&plain));
///
/// let traced = errtrace::trace(plain);
/// assert!(errtrace::has_trace(&traced));
/// ```
pub fn has_trace(err: &(dyn Error + 'static)) -> bool {
    Chain::new(err).any(|link| {
        link.downcast_ref::<TracedError>()
            .is_some_and(|traced| traced.stack().is_some())
    })
}

/// Finds the trace carried anywhere in `err`'s chain.
///
/// An existing [`TracedError`] is preferred wherever it sits and is
/// returned by reference, unaffected by wrapper layers above it. Failing
/// that, the outermost [`ExternalTrace`] yields a synthesized instance that
/// adopts the foreign tokens and carries no diagnostic entries; an empty
/// token list synthesizes with no stack at all, so [`has_trace`] stays
/// false for it. Returns `None` when the chain carries no stack anywhere.
///
/// # Examples
///
/// ```
/// use errtrace::FoundTrace;
///
/// let traced = errtrace::trace(std::io::Error::other("boom"));
/// let found = errtrace::get_trace(&traced).expect("trace is present");
/// assert!(matches!(found, FoundTrace::Existing(_)));
/// ```
pub fn get_trace<'a>(err: &'a (dyn Error + 'static)) -> Option<FoundTrace<'a>> {
    let mut external: Option<&ExternalTrace> = None;
    for link in Chain::new(err) {
        if let Some(traced) = link.downcast_ref::<TracedError>() {
            return Some(FoundTrace::Existing(traced));
        }
        if external.is_none() {
            external = link.downcast_ref::<ExternalTrace>();
        }
    }
    external.map(|foreign| FoundTrace::Synthesized(TracedError::from_external(foreign)))
}
