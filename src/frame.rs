use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use thiserror::Error;

use crate::render::type_name_of;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("cannot walk {requested} frames back, only {available} available")]
    Underflow { requested: usize, available: usize },
    #[error("stack frames carry no symbol information")]
    Unavailable,
    #[error("no frame on the stack is executing {file}:{line}")]
    NotOnStack { file: String, line: u32 },
}

/// Name of the function `frames_back` frames above the caller of this function.
///
/// `1` (and `0`, which is coerced to `1`) names the direct caller.
#[inline(never)]
pub fn caller_name(frames_back: usize) -> Result<String, FrameError> {
    walk(frames_back, "frame::caller_name")
}

/// Like [`caller_name`], qualified with the type name of `owner`: `Owner.method`.
#[inline(never)]
pub fn method_name<T: ?Sized>(frames_back: usize, owner: &T) -> Result<String, FrameError> {
    let name = walk(frames_back, "frame::method_name")?;
    Ok(format!("{}.{}", type_name_of(owner), name))
}

/// Name of the innermost function currently executing `file:line`.
///
/// Needs line tables; builds without debug info report
/// [`FrameError::NotOnStack`] or [`FrameError::Unavailable`].
#[inline(never)]
pub fn function_at(file: &str, line: u32) -> Result<String, FrameError> {
    let frames = capture_frames();
    if frames.is_empty() {
        return Err(FrameError::Unavailable);
    }
    tracing::trace!(file, line, frames = frames.len(), "searching stack for call site");

    frames
        .iter()
        .find(|frame| {
            frame
                .location
                .as_deref()
                .is_some_and(|location| location_matches(location, file, line))
        })
        .map(|frame| bare_name(&frame.symbol))
        .ok_or_else(|| FrameError::NotOnStack {
            file: file.to_string(),
            line,
        })
}

#[inline(never)]
fn walk(frames_back: usize, entry: &str) -> Result<String, FrameError> {
    let frames_back = frames_back.max(1);
    let frames = capture_frames();
    let anchor = frames
        .iter()
        .position(|frame| frame.symbol.ends_with(entry))
        .ok_or(FrameError::Unavailable)?;
    let available = frames.len() - anchor - 1;
    tracing::trace!(frames_back, available, "walking stack frames");

    frames
        .get(anchor + frames_back)
        .map(|frame| bare_name(&frame.symbol))
        .ok_or(FrameError::Underflow {
            requested: frames_back,
            available,
        })
}

struct Frame {
    symbol: String,
    location: Option<String>,
}

fn capture_frames() -> Vec<Frame> {
    let rendered = Backtrace::force_capture().to_string();
    let mut frames: Vec<Frame> = Vec::new();
    for line in rendered.lines() {
        if let Some(symbol) = parse_frame_line(line) {
            frames.push(Frame {
                symbol,
                location: None,
            });
        } else if let Some(location) = line.trim_start().strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                frame
                    .location
                    .get_or_insert_with(|| location.trim().to_string());
            }
        }
    }
    frames
}

// Locations look like `./src/frame.rs:10:5`; the path may be relative or absolute.
fn location_matches(location: &str, file: &str, line: u32) -> bool {
    let mut parts = location.rsplitn(3, ':');
    let (Some(_column), Some(found), Some(path)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    found.parse::<u32>() == Ok(line) && Path::new(path).ends_with(file)
}

// Frame lines look like `  12: crate::module::function`; location lines start with `at`.
fn parse_frame_line(line: &str) -> Option<String> {
    let (index, symbol) = line.trim_start().split_once(": ")?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(clean_symbol(symbol.trim()))
}

fn clean_symbol(symbol: &str) -> String {
    let without_hash = match symbol.rsplit_once("::h") {
        Some((path, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            path
        }
        _ => symbol,
    };
    strip_generics(without_hash)
}

fn strip_generics(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.replace("::::", "::")
        .trim_start_matches("::")
        .trim_end_matches("::")
        .to_string()
}

/// Last path segment of a function path; closures keep their enclosing function.
pub fn bare_name(path: &str) -> String {
    let cleaned = strip_generics(path);
    let mut segments = cleaned.rsplit("::").filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or_default();
    if last == "{{closure}}" {
        match segments.next() {
            Some(parent) => format!("{}::{}", parent, last),
            None => last.to_string(),
        }
    } else {
        last.to_string()
    }
}

/// An explicit label for the place an assertion was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub label: Option<String>,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Captures the caller's location. The label comes from the libtest
    /// thread name; off a test thread it stays empty and the function
    /// executing the location is looked up when a message is rendered.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            label: test_thread_label(),
            file: location.file(),
            line: location.line(),
        }
    }

    pub fn labeled(label: impl Into<String>, file: &'static str, line: u32) -> Self {
        Self {
            label: Some(label.into()),
            file,
            line,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({}:{})", label, self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

// libtest names each test thread after the test path.
fn test_thread_label() -> Option<String> {
    let thread = std::thread::current();
    match thread.name() {
        Some("main") | None => None,
        Some(name) => Some(bare_name(name)),
    }
}

/// Expands to a [`CallSite`] labeled with the enclosing function's name.
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __here() {}
        fn __path_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let path = __path_of(__here);
        $crate::frame::CallSite::labeled(
            $crate::frame::bare_name(path.strip_suffix("::__here").unwrap_or(path)),
            file!(),
            line!(),
        )
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Widget;

    // Builds without symbols (e.g. stripped release builds) cannot name frames.
    fn walked(result: Result<String, FrameError>) -> Option<String> {
        match result {
            Err(FrameError::Unavailable) => None,
            other => Some(other.unwrap()),
        }
    }

    #[inline(never)]
    fn direct_caller(level: usize) -> Result<String, FrameError> {
        caller_name(level)
    }

    #[inline(never)]
    fn outer_caller() -> Result<String, FrameError> {
        direct_caller(2)
    }

    #[inline(never)]
    fn widget_method(widget: &Widget) -> Result<String, FrameError> {
        method_name(1, widget)
    }

    #[test]
    fn test_caller_name_direct() {
        if let Some(name) = walked(direct_caller(1)) {
            assert_eq!(name, "direct_caller");
        }
    }

    #[test]
    fn test_caller_name_zero_behaves_like_one() {
        assert_eq!(walked(direct_caller(0)), walked(direct_caller(1)));
    }

    #[test]
    fn test_caller_name_two_frames() {
        if let Some(name) = walked(outer_caller()) {
            assert_eq!(name, "outer_caller");
        }
    }

    #[test]
    fn test_method_name_uses_owner_type() {
        if let Some(name) = walked(widget_method(&Widget)) {
            assert_eq!(name, "Widget.widget_method");
        }
    }

    #[test]
    fn test_caller_name_underflow() {
        let result = direct_caller(100_000);
        if result == Err(FrameError::Unavailable) {
            return;
        }
        assert_matches!(result, Err(FrameError::Underflow { requested: 100_000, .. }));
    }

    #[test]
    fn test_location_matches() {
        assert!(location_matches("./src/frame.rs:10:5", "src/frame.rs", 10));
        assert!(location_matches("/home/me/crate/src/frame.rs:10:5", "src/frame.rs", 10));
        assert!(!location_matches("./src/frame.rs:11:5", "src/frame.rs", 10));
        assert!(!location_matches("./src/other_frame.rs:10:5", "src/frame.rs", 10));
        assert!(!location_matches("<unknown>", "src/frame.rs", 10));
    }

    #[test]
    fn test_function_at_finds_running_function() {
        let location = Location::caller();
        let result = std::thread::spawn(move || function_at(location.file(), location.line()))
            .join()
            .unwrap();
        // that line runs on this thread, not the spawned one
        assert_matches!(result, Err(FrameError::NotOnStack { .. } | FrameError::Unavailable));

        let found = function_at(file!(), line!());
        if cfg!(debug_assertions) {
            assert_eq!(found.unwrap(), "test_function_at_finds_running_function");
        }
    }

    #[test]
    fn test_unnamed_thread_has_no_label() {
        let site = std::thread::spawn(CallSite::caller).join().unwrap();
        assert_eq!(site.name(), None);
    }

    #[test]
    fn test_parse_frame_line() {
        assert_eq!(
            parse_frame_line("  12: callassert::frame::tests::outer"),
            Some("callassert::frame::tests::outer".to_string())
        );
        assert_eq!(parse_frame_line("             at ./src/frame.rs:10:5"), None);
        assert_eq!(
            parse_frame_line("   3: std::rt::lang_start::h0123456789abcdef"),
            Some("std::rt::lang_start".to_string())
        );
    }

    #[test]
    fn test_bare_name() {
        assert_eq!(bare_name("crate::tests::is_upper"), "is_upper");
        assert_eq!(bare_name("crate::tests::outer::{{closure}}"), "outer::{{closure}}");
        assert_eq!(bare_name("crate::helpers::parse<i32>"), "parse");
        assert_eq!(
            bare_name("<alloc::boxed::Box<F> as core::ops::function::FnOnce<A>>::call_once"),
            "call_once"
        );
        assert_eq!(bare_name("tests::test_assert_equal"), "test_assert_equal");
    }

    #[test]
    fn test_call_site_macro_names_enclosing_function() {
        let site = call_site!();
        assert_eq!(site.name(), Some("test_call_site_macro_names_enclosing_function"));
        assert!(site.file.ends_with("frame.rs"));
    }

    #[test]
    fn test_call_site_caller_uses_test_thread() {
        let site = CallSite::caller();
        assert_eq!(site.name(), Some("test_call_site_caller_uses_test_thread"));
        assert!(site.to_string().contains("frame.rs:"));
    }
}
