//! Bounded capture of the current call stack.
//!
//! [`Stack::capture`] walks the live call stack and records raw
//! program-counter tokens only; nothing is resolved for the frames that are
//! kept. The walk excludes its own machinery by resolving just the leading
//! frames until the first caller frame, so the result always starts at the
//! code that asked for the capture.

use serde::Serialize;

use crate::frame::Frame;

/// Hard cap on the number of frames kept by a capture.
///
/// Frames deeper than this are silently dropped.
pub const MAX_DEPTH: usize = 32;

/// Name prefixes that belong to the capture preamble rather than user code.
const PREAMBLE_PREFIXES: &[&str] = &["backtrace::", "core::", "std::", "alloc::"];

/// An ordered sequence of captured [`Frame`]s.
///
/// Index 0 is the frame that invoked the tracing operation; callers follow
/// outward in order. A `Stack` is immutable once captured and holds at most
/// [`MAX_DEPTH`] frames.
#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    /// Captures the current call stack.
    ///
    /// The capture machinery itself — this crate's functions and the
    /// `backtrace`/`core`/`std`/`alloc` preamble above the caller — is
    /// excluded, and `skip` additional innermost caller frames are dropped
    /// after that. Kept frames are stored as raw tokens without symbol
    /// resolution; at most [`MAX_DEPTH`] of them are kept.
    ///
    /// Never fails: a context with no resolvable frames (or a `skip` larger
    /// than the stack) yields an empty stack.
    ///
    /// # Examples
    ///
    /// ```
    /// use errtrace::Stack;
    ///
    /// let stack = Stack::capture(0);
    /// assert!(stack.len() <= errtrace::MAX_DEPTH);
    /// ```
    #[inline(never)]
    pub fn capture(skip: usize) -> Stack {
        let mut frames = Vec::new();
        let mut in_preamble = true;
        let mut to_skip = skip;
        backtrace::trace(|frame| {
            if in_preamble {
                if is_capture_machinery(frame) {
                    return true;
                }
                in_preamble = false;
            }
            if to_skip > 0 {
                to_skip -= 1;
                return true;
            }
            frames.push(Frame::from_raw(frame.ip() as usize));
            frames.len() < MAX_DEPTH
        });
        Stack { frames }
    }

    /// Builds a stack from already-captured frames.
    pub(crate) fn from_frames(frames: Vec<Frame>) -> Stack {
        Stack { frames }
    }

    /// Returns the frames, capture site first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns the number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true when the capture recorded no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Renders the stack as text, one `<name> in <file>:<line>` line per
    /// frame, newline-joined.
    ///
    /// Diagnostic data is not included; this is the readable form for
    /// terminals and test output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&frame.to_string());
        }
        out
    }
}

/// Reports whether a frame belongs to the capture path itself.
///
/// Only consulted for the leading frames of a walk; everything below the
/// first caller frame stays unresolved. A frame counts as machinery when
/// every symbol it resolves to lives in this crate or in the runtime
/// preamble, so a frame that mixes inlined machinery with caller code is
/// kept.
fn is_capture_machinery(frame: &backtrace::Frame) -> bool {
    let mut resolved = false;
    let mut internal = true;
    backtrace::resolve_frame(frame, |symbol| {
        resolved = true;
        let Some(name) = symbol.name() else {
            internal = false;
            return;
        };
        let name = format!("{name:#}");
        let trimmed = name.strip_prefix('<').unwrap_or(&name);
        let machinery = trimmed.contains("errtrace::")
            || PREAMBLE_PREFIXES.iter().any(|p| trimmed.starts_with(p));
        if !machinery {
            internal = false;
        }
    });
    resolved && internal
}

#[cfg(test)]
mod tests {
    use super::*;

    // Caller-relative assertions (which function is frame 0, skip counts)
    // live in tests/integration_tests.rs: from inside this crate every
    // caller frame is itself capture machinery by name.

    #[test]
    fn capture_is_bounded() {
        let stack = Stack::capture(0);
        assert!(stack.len() <= MAX_DEPTH);
    }

    #[test]
    fn oversized_skip_yields_an_empty_stack() {
        let stack = Stack::capture(10_000);
        assert!(stack.is_empty());
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn render_joins_frames_with_newlines() {
        let stack = Stack::from_frames(vec![Frame::from_raw(0), Frame::from_raw(0)]);
        assert_eq!(stack.render(), "unknown in unknown:0\nunknown in unknown:0");
    }

    #[test]
    fn render_of_an_empty_stack_is_empty() {
        assert_eq!(Stack::from_frames(Vec::new()).render(), "");
    }

    #[test]
    fn serializes_as_a_frame_array() {
        let empty = serde_json::to_string(&Stack::from_frames(Vec::new())).unwrap();
        assert_eq!(empty, "[]");

        let value =
            serde_json::to_value(Stack::from_frames(vec![Frame::from_raw(0)])).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"caller": "unknown", "file": "unknown", "line": 0}])
        );
    }
}
