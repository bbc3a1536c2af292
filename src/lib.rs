#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]

//! Stack-traced error annotation with structured diagnostics.
//!
//! ## Overview
//!
//! This crate wraps a failure with a human-readable message, attaches
//! key/value diagnostic data, and records the call stack at the point the
//! error was first observed — while the result stays a drop-in
//! [`std::error::Error`] that propagates through `?` like any other.
//!
//! Tracing is idempotent: annotating an error that was already traced
//! deeper in the call stack merges into the existing [`TracedError`]
//! instead of capturing a second stack or nesting a second wrapper. Capture
//! itself is cheap — frames are stored as raw program-counter tokens and
//! only resolved to names, files, and lines when something actually
//! displays or serializes them.
//!
//! ## Quick Example
//!
//! ```
//! use errtrace::{ResultExt, TracedError, kv};
//!
//! fn read_config(path: &str) -> Result<String, TracedError> {
//!     std::fs::read_to_string(path)
//!         .wrap_err("failed to read configuration")
//!         .trace_with(|| [kv!("path" => path)])
//! }
//!
//! let err = read_config("/nonexistent/app.toml").unwrap_err();
//! assert!(errtrace::has_trace(&err));
//! assert!(err.to_string().starts_with("failed to read configuration: "));
//! assert_eq!(err.extra().len(), 1);
//! ```
//!
//! ## Core Concepts
//!
//! A [`TracedError`] carries three things:
//!
//! - The **wrapped error**: reachable through [`Error::source`], displayed
//!   verbatim by the `TracedError` itself. [`wrap`] layers messages onto it
//!   (`outer: inner: root`).
//! - The **stack**: a bounded [`Stack`] of [`Frame`]s captured once, when
//!   the error was first traced.
//! - The **extra list**: ordered [`Entry`] diagnostics that accumulate
//!   across [`trace`]/[`wrap`] calls as the error propagates.
//!
//! [`has_trace`] and [`get_trace`] inspect arbitrary error chains,
//! including chains where the `TracedError` sits below wrappers from other
//! libraries; [`ExternalTrace`] lets traces captured elsewhere take part.
//!
//! For output, every piece serializes with [`serde`] into the structured
//! form consumed by logging sinks (`{"error", "stack", "extra"}`), and
//! [`RenderMode`] selects between plain, quoted, and verbose text
//! renderings.
//!
//! [`Error::source`]: std::error::Error::source

mod entry;
mod error;
mod frame;
mod inspect;
mod macros;
mod render;
mod result_ext;
mod stack;

pub mod prelude;

pub use crate::{
    entry::Entry,
    error::{BoxError, MessageError, TracedError, trace, wrap},
    frame::{Frame, FrameSymbol},
    inspect::{Chain, ExternalTrace, FoundTrace, get_trace, has_trace},
    render::{Render, RenderMode, trace_to_string},
    result_ext::ResultExt,
    stack::{MAX_DEPTH, Stack},
};
