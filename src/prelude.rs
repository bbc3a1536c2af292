//! Commonly used items for convenient importing.
//!
//! Re-exports the pieces that show up at almost every call site, so one
//! `use` statement covers the usual tracing workflow.
//!
//! # Examples
//!
//! ```
//! use errtrace::prelude::*;
//!
//! fn fetch() -> Result<(), TracedError> {
//!     Err(std::io::Error::other("boom")).wrap_err("fetch failed")
//! }
//!
//! let err = fetch().unwrap_err();
//! assert!(has_trace(&err));
//! assert_eq!(err.to_string(), "fetch failed: boom");
//! ```

pub use crate::{
    Entry, RenderMode, ResultExt, TracedError, get_trace, has_trace, kv, trace, trace_to_string,
    wrap,
};
