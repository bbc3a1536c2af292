//! Single stack locations and their lazily resolved source information.
//!
//! A [`Frame`] is nothing but the raw program-counter token recorded when a
//! stack was captured. Everything human-readable about it — function name,
//! file, line — is computed on demand by [`Frame::symbol`], so that capturing
//! a stack costs almost nothing when the trace is never displayed.

use core::fmt;
use std::ffi::c_void;

use serde::Serialize;

/// Sentinel for locations that cannot be mapped to source information.
const UNKNOWN: &str = "unknown";

/// A single captured stack location.
///
/// Frames are immutable once captured and carry no resolved data; see
/// [`Frame::symbol`] for resolution. Any token value is representable —
/// resolving a dead or garbage token yields sentinel values rather than an
/// error.
///
/// # Examples
///
/// ```
/// use errtrace::Frame;
///
/// let symbol = Frame::from_raw(0).symbol();
/// assert_eq!(symbol.name, "unknown");
/// assert_eq!(symbol.file, "unknown");
/// assert_eq!(symbol.line, 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    ip: usize,
}

impl Frame {
    /// Creates a frame from a raw program-counter token.
    ///
    /// Tokens normally come out of [`Stack::capture`], but foreign tokens
    /// (see [`ExternalTrace`]) go through here too.
    ///
    /// [`Stack::capture`]: crate::Stack::capture
    /// [`ExternalTrace`]: crate::ExternalTrace
    pub fn from_raw(token: usize) -> Frame {
        Frame { ip: token }
    }

    /// Returns the raw program-counter token.
    pub fn raw(self) -> usize {
        self.ip
    }

    /// Resolves the frame to its function name, file, and line.
    ///
    /// Resolution is deterministic, side-effect-free, and uncached: every
    /// call performs the lookup again. A token that cannot be resolved
    /// yields `name = "unknown"`, `file = "unknown"`, `line = 0`; this never
    /// panics.
    pub fn symbol(self) -> FrameSymbol {
        let mut name = None;
        let mut file = None;
        let mut line = None;
        // The token is a return address; step back one byte so the lookup
        // lands inside the calling instruction.
        let addr = self.ip.wrapping_sub(1) as *mut c_void;
        backtrace::resolve(addr, |symbol| {
            // Called once per inlined level; the last call is the actual
            // function, which is the one we report.
            if let Some(n) = symbol.name() {
                name = Some(format!("{n:#}"));
            }
            if let Some(f) = symbol.filename() {
                file = Some(f.display().to_string());
            }
            if let Some(l) = symbol.lineno() {
                line = Some(l);
            }
        });
        FrameSymbol {
            name: name.unwrap_or_else(|| UNKNOWN.to_owned()),
            file: file.unwrap_or_else(|| UNKNOWN.to_owned()),
            line: line.unwrap_or(0),
        }
    }
}

/// Formats as `<name> in <file>:<line>`, resolving on the fly.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol();
        write!(f, "{} in {}:{}", symbol.name, symbol.file, symbol.line)
    }
}

/// Serializes as the resolved `{"caller", "file", "line"}` object.
impl Serialize for Frame {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.symbol().serialize(serializer)
    }
}

/// Resolved source information for a [`Frame`].
///
/// This is the structured form a logging sink sees for each frame:
/// `{"caller": …, "file": …, "line": …}`.
#[derive(Clone, Debug, Serialize)]
pub struct FrameSymbol {
    /// Demangled function name, or `"unknown"`.
    #[serde(rename = "caller")]
    pub name: String,
    /// Source file path, or `"unknown"`.
    pub file: String,
    /// Line number, or `0` when unknown.
    pub line: u32,
}
