//! End-to-end behavior of the public errtrace API: capture ordering through
//! real call chains, merge idempotence, wrap text accumulation, chain
//! inspection, and the structured serialization shape.

use std::{error::Error, fmt, io};

use errtrace::{
    Chain, Entry, ExternalTrace, FoundTrace, Frame, MAX_DEPTH, RenderMode, ResultExt, Stack,
    TracedError, get_trace, has_trace, kv, trace, trace_to_string, wrap,
};

#[inline(never)]
fn c() -> TracedError {
    trace(io::Error::other("deep failure"))
}

#[inline(never)]
fn b() -> TracedError {
    c()
}

#[inline(never)]
fn a() -> TracedError {
    b()
}

#[test]
fn capture_follows_the_call_chain() {
    let traced = a();
    let stack = traced.stack().expect("stack captured");
    assert!(stack.len() >= 3, "too few frames: {}", stack.len());

    let names: Vec<String> = stack
        .frames()
        .iter()
        .take(3)
        .map(|frame| frame.symbol().name)
        .collect();
    assert!(names[0].ends_with("::c"), "frame 0 resolved to {}", names[0]);
    assert!(names[1].ends_with("::b"), "frame 1 resolved to {}", names[1]);
    assert!(names[2].ends_with("::a"), "frame 2 resolved to {}", names[2]);
}

#[test]
fn top_line_names_the_capture_site() {
    let traced = a();
    let line = traced.top_line();
    assert!(
        line.contains("integration_tests.rs"),
        "unexpected top line: {line}"
    );
}

#[inline(never)]
fn deep(n: usize) -> Stack {
    if n == 0 { Stack::capture(0) } else { deep(n - 1) }
}

#[test]
fn deep_recursion_hits_the_frame_cap() {
    let stack = deep(40);
    assert_eq!(stack.len(), MAX_DEPTH);
}

#[inline(never)]
fn capture_with(skip: usize) -> Stack {
    Stack::capture(skip)
}

#[test]
fn skip_drops_innermost_caller_frames() {
    let full = capture_with(0);
    let skipped = capture_with(1);
    assert_eq!(skipped.len(), full.len() - 1);
    assert_eq!(
        skipped.frames()[0].symbol().name,
        full.frames()[1].symbol().name
    );
    assert!(full.frames()[0].symbol().name.ends_with("::capture_with"));
}

#[test]
fn ok_results_pass_through_untouched() {
    let ok: Result<u32, io::Error> = Ok(7);
    let traced = ok.trace_with(|| -> [Entry; 0] { panic!("entries must not be built on success") });
    assert_eq!(traced.unwrap(), 7);

    let ok: Result<u32, io::Error> = Ok(7);
    assert_eq!(ok.wrap_err("unused").unwrap(), 7);
}

#[test]
fn has_trace_distinguishes_traced_errors() {
    let plain = io::Error::other("boom");
    assert!(!has_trace(&plain));

    let traced = trace(plain);
    assert!(has_trace(&traced));

    // A synthesized shell with no frames carries no usable trace.
    let foreign = ExternalTrace::new("external failure", std::iter::empty());
    let found = get_trace(&foreign).expect("foreign trace found");
    assert!(found.stack().is_none());
    assert_eq!(found.top_line(), "");
    assert!(!has_trace(&*found));
}

#[test]
fn double_trace_is_a_single_merge() {
    let traced = trace(io::Error::other("boom")).with(kv!("first" => 1));
    let frames_ptr = traced.stack().expect("captured").frames().as_ptr();
    let line = traced.top_line();

    let traced = trace(traced).with(kv!("second" => 2));
    assert_eq!(traced.extra().len(), 2);
    assert_eq!(traced.extra()[0].key(), "first");
    assert_eq!(traced.extra()[1].key(), "second");
    assert_eq!(traced.stack().expect("kept").frames().as_ptr(), frames_ptr);
    assert_eq!(traced.top_line(), line);
}

#[test]
fn wrap_accumulates_text_and_entries() {
    let wrapped = wrap(io::Error::other("root cause"), "a").with(kv!("first" => 1));
    let frames_ptr = wrapped.stack().expect("captured").frames().as_ptr();

    let wrapped = wrap(wrapped, "b").with(kv!("second" => 2));
    assert_eq!(wrapped.to_string(), "b: a: root cause");
    assert_eq!(wrapped.extra().len(), 2);
    assert_eq!(wrapped.stack().expect("kept").frames().as_ptr(), frames_ptr);
}

#[test]
fn is_compares_by_identity() {
    let traced = wrap(io::Error::other("boom"), "context");
    let message_layer = traced.source().expect("message layer");
    let root = message_layer.source().expect("root");
    assert!(traced.is(message_layer));
    assert!(traced.is(root));

    let lookalike = io::Error::other("boom");
    assert!(!traced.is(&lookalike));
}

/// A wrapper from "some other library": not one of errtrace's own shapes.
#[derive(Debug)]
struct Outer {
    source: TracedError,
}

impl fmt::Display for Outer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "outer: {}", self.source)
    }
}

impl Error for Outer {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[test]
fn get_trace_sees_through_foreign_wrappers() {
    let outer = Outer {
        source: trace(io::Error::other("boom")),
    };
    assert!(has_trace(&outer));

    let found = get_trace(&outer).expect("trace found");
    let FoundTrace::Existing(traced) = found else {
        panic!("expected the existing instance");
    };
    assert!(std::ptr::eq(traced, &outer.source));
}

#[test]
fn external_traces_synthesize_without_mutation() {
    let foreign = ExternalTrace::new("external failure", [1, 2, 3]);
    let found = get_trace(&foreign).expect("foreign trace found");
    let FoundTrace::Synthesized(traced) = found else {
        panic!("expected a synthesized trace");
    };
    assert_eq!(traced.to_string(), "external failure");
    assert_eq!(traced.stack().expect("adopted stack").len(), 3);
    assert!(traced.extra().is_empty());
    assert_eq!(foreign.frames().len(), 3);
}

#[test]
fn chains_count_every_layer() {
    let traced = wrap(io::Error::other("root"), "context");
    assert_eq!(Chain::new(&traced).count(), 3);
}

#[test]
fn structured_form_follows_the_field_rules() {
    let traced = trace(io::Error::other("boom"));
    let value = serde_json::to_value(&traced).expect("serializes");
    assert_eq!(value["error"], "boom");
    assert!(value["stack"].is_array());
    assert!(value.get("extra").is_none());

    let traced = traced.with(kv!("test" => "val"));
    let value = serde_json::to_value(&traced).expect("serializes");
    assert_eq!(value["extra"], serde_json::json!([{"test": "val"}]));
}

#[test]
fn serialized_frames_resolve_to_the_call_chain() {
    let traced = a();
    let value = serde_json::to_value(&traced).expect("serializes");
    let first = &value["stack"][0];
    let caller = first["caller"].as_str().expect("caller is a string");
    assert!(caller.ends_with("::c"), "unexpected caller: {caller}");
    assert!(first["line"].as_u64().expect("line is a number") > 0);
}

#[test]
fn dead_tokens_resolve_to_sentinels() {
    let symbol = Frame::from_raw(0).symbol();
    assert_eq!(symbol.name, "unknown");
    assert_eq!(symbol.file, "unknown");
    assert_eq!(symbol.line, 0);
}

#[test]
fn rendering_modes_cover_the_text_contract() {
    let traced = wrap(io::Error::other("root"), "context").with(kv!("test" => "val"));
    assert_eq!(traced.render(RenderMode::Plain).to_string(), "context: root");
    assert_eq!(
        traced.render(RenderMode::Quoted).to_string(),
        "\"context: root\""
    );

    let verbose = traced.render(RenderMode::VerboseWithExtra).to_string();
    assert!(verbose.starts_with("context: root\n"));
    assert!(verbose.contains("\nExtra:\n[{\"test\":\"val\"}]"));
    assert!(!traced.render(RenderMode::Verbose).to_string().contains("Extra:"));
}

#[test]
fn stack_render_is_one_line_per_frame() {
    let traced = a();
    let rendered = traced.stack().expect("captured").render();
    let first = rendered.lines().next().expect("at least one line");
    assert!(first.contains(" in "), "unexpected line: {first}");
    assert!(
        rendered.lines().count() >= 3,
        "unexpected rendering: {rendered}"
    );
}

#[test]
fn trace_to_string_is_best_effort() {
    let plain = io::Error::other("boom");
    assert_eq!(trace_to_string(&plain), "boom");

    let traced = a();
    let text = trace_to_string(&traced);
    assert!(text.contains("\"caller\""), "unexpected rendering: {text}");
}
