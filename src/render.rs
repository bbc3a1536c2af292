//! Text rendering of traced errors.
//!
//! Rendering is an explicit choice: callers pick a [`RenderMode`] instead of
//! relying on formatting flags, and [`TracedError::render`] hands back a
//! [`Display`] adapter for it.
//!
//! [`Display`]: core::fmt::Display

use core::fmt;
use std::error::Error;

use crate::{error::TracedError, inspect::get_trace};

/// How [`Render`] writes a traced error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// The error's message text only.
    Plain,
    /// The error's message text, quoted.
    Quoted,
    /// The cause text, then each frame on its own line: the function name
    /// followed by a tab-indented `file:line`.
    Verbose,
    /// [`RenderMode::Verbose`], then — when any diagnostic entries exist —
    /// a literal `Extra:` line followed by their JSON encoding.
    VerboseWithExtra,
}

/// Display adapter returned by [`TracedError::render`].
#[derive(Clone, Copy)]
pub struct Render<'a> {
    traced: &'a TracedError,
    mode: RenderMode,
}

impl TracedError {
    /// Returns a display adapter that renders this error in `mode`.
    ///
    /// # Examples
    ///
    /// ```
    /// use errtrace::RenderMode;
    ///
    /// let traced = errtrace::wrap(std::io::Error::other("root"), "context");
    /// assert_eq!(traced.render(RenderMode::Plain).to_string(), "context: root");
    /// assert_eq!(
    ///     traced.render(RenderMode::Quoted).to_string(),
    ///     "\"context: root\"",
    /// );
    /// ```
    pub fn render(&self, mode: RenderMode) -> Render<'_> {
        Render { traced: self, mode }
    }
}

impl fmt::Display for Render<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            RenderMode::Plain => fmt::Display::fmt(self.traced, f),
            RenderMode::Quoted => write!(f, "{:?}", self.traced.to_string()),
            RenderMode::Verbose => verbose(self.traced, f, false),
            RenderMode::VerboseWithExtra => verbose(self.traced, f, true),
        }
    }
}

fn verbose(traced: &TracedError, f: &mut fmt::Formatter<'_>, with_extra: bool) -> fmt::Result {
    fmt::Display::fmt(traced, f)?;
    if let Some(stack) = traced.stack() {
        for frame in stack.frames() {
            let symbol = frame.symbol();
            write!(f, "\n{}\n\t{}:{}", symbol.name, symbol.file, symbol.line)?;
        }
    }
    if with_extra && !traced.extra().is_empty() {
        let encoded = serde_json::to_string(traced.extra()).map_err(|_| fmt::Error)?;
        write!(f, "\nExtra:\n{encoded}\n")?;
    }
    Ok(())
}

/// Best-effort readable rendering of whatever trace `err` carries.
///
/// An error without a trace renders as its plain message; otherwise the
/// stack renders as indented structured data. Meant for test output, where
/// a failure should print something readable no matter what it is.
///
/// # Examples
///
/// ```
/// let plain = std::io::Error::other("boom");
/// assert_eq!(errtrace::trace_to_string(&plain), "boom");
/// ```
pub fn trace_to_string(err: &(dyn Error + 'static)) -> String {
    let Some(found) = get_trace(err) else {
        return err.to_string();
    };
    let Some(stack) = found.stack() else {
        return err.to_string();
    };
    serde_json::to_string_pretty(stack).unwrap_or_else(|_| err.to_string())
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{Entry, ExternalTrace, FoundTrace, get_trace, trace, wrap};

    /// A synthesized trace with fabricated tokens renders deterministically.
    fn synthesized() -> TracedError {
        let foreign = ExternalTrace::new("external failure", [1]);
        match get_trace(&foreign).expect("foreign trace found") {
            FoundTrace::Synthesized(traced) => traced,
            FoundTrace::Existing(_) => panic!("expected a synthesized trace"),
        }
    }

    #[test]
    fn plain_and_quoted_render_the_message() {
        let traced = wrap(io::Error::other("root"), "context");
        assert_eq!(traced.render(RenderMode::Plain).to_string(), "context: root");
        assert_eq!(
            traced.render(RenderMode::Quoted).to_string(),
            "\"context: root\""
        );
    }

    #[test]
    fn verbose_lists_each_frame_on_its_own_line() {
        let traced = synthesized();
        assert_eq!(
            traced.render(RenderMode::Verbose).to_string(),
            "external failure\nunknown\n\tunknown:0"
        );
    }

    #[test]
    fn verbose_with_extra_appends_the_entries() {
        let traced = synthesized().with(Entry::new("test", "val"));
        assert_eq!(
            traced.render(RenderMode::VerboseWithExtra).to_string(),
            "external failure\nunknown\n\tunknown:0\nExtra:\n[{\"test\":\"val\"}]\n"
        );
    }

    #[test]
    fn verbose_without_entries_has_no_extra_section() {
        let traced = synthesized();
        let text = traced.render(RenderMode::VerboseWithExtra).to_string();
        assert!(!text.contains("Extra:"));
    }

    #[test]
    fn trace_to_string_falls_back_to_the_message() {
        let plain = io::Error::other("boom");
        assert_eq!(trace_to_string(&plain), "boom");
    }

    #[test]
    fn trace_to_string_renders_indented_frames() {
        let foreign = ExternalTrace::new("external failure", [1]);
        let text = trace_to_string(&foreign);
        assert!(text.starts_with('['), "unexpected rendering: {text}");
        assert!(text.contains("\"caller\": \"unknown\""), "unexpected rendering: {text}");
    }

    #[test]
    fn trace_to_string_prefers_the_captured_stack() {
        let traced = trace(io::Error::other("boom"));
        let text = trace_to_string(&traced);
        assert!(text.starts_with('['), "unexpected rendering: {text}");
    }
}
