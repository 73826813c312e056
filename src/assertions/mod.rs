pub mod call;
pub mod collections;
pub mod direct;
pub mod raises;

pub use call::Check;
pub use raises::RaisesContext;

use crate::compare::equality_msg;
use crate::frame::CallSite;
use crate::render::{Render, RenderError};
use crate::signature::{self, CallSignature};
use crate::style::{ColorChoice, Styler};
use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error)]
pub enum AssertError {
    /// The assertion did not hold.
    #[error("{0}")]
    Failure(String),
    /// The assertion was called incorrectly; a bug in the test itself.
    #[error("usage error: {0}")]
    Usage(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    /// An error from the code under test that the assertion does not handle.
    #[error("{0}")]
    Unexpected(BoxError),
}

// Test functions returning `Result<(), AssertError>` print the error with
// `Debug`; keep the formatted message readable there.
impl fmt::Debug for AssertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl AssertError {
    pub fn is_failure(&self) -> bool {
        matches!(self, AssertError::Failure(_))
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, AssertError::Usage(_))
    }
}

pub trait ResultExt {
    /// Panics with the formatted message, the way libtest expects a failure.
    fn or_fail(self);
}

impl ResultExt for Result<(), AssertError> {
    #[track_caller]
    fn or_fail(self) {
        if let Err(e) = self {
            panic!("{}", e);
        }
    }
}

/// Joins the standard message with the user's, like `std : msg`.
pub fn format_message(msg: Option<&str>, standard: &str) -> String {
    match msg {
        Some(msg) if !msg.is_empty() => format!("{} : {}", standard, msg),
        _ => standard.to_string(),
    }
}

/// Entry point for the richer assertions.
#[derive(Debug, Clone, Default)]
pub struct TestCase {
    styler: Styler,
    site: Option<CallSite>,
}

impl TestCase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self::with_styler(Styler::new(choice))
    }

    pub fn with_styler(styler: Styler) -> Self {
        Self {
            styler,
            site: None,
        }
    }

    /// Labels every failure with `site` instead of the assertion's own call site.
    pub fn at(mut self, site: CallSite) -> Self {
        self.site = Some(site);
        self
    }

    pub fn styler(&self) -> &Styler {
        &self.styler
    }

    pub fn fail(&self, message: impl Into<String>) -> AssertError {
        AssertError::Failure(message.into())
    }

    /// Decorates `s` with a call signature; see [`signature::call_msg`].
    #[track_caller]
    pub fn call_msg(&self, s: &str, sig: CallSignature) -> String {
        let mut sig = sig;
        sig.fill_site(&self.site_or(CallSite::caller()));
        signature::call_msg(&self.styler, s, &sig)
    }

    fn site_or(&self, caller: CallSite) -> CallSite {
        self.site.clone().unwrap_or(caller)
    }

    fn comparison_failure<A, B>(
        &self,
        op: &str,
        actual: &A,
        expected: &B,
        note: Option<&str>,
    ) -> AssertError
    where
        A: Render + ?Sized,
        B: Render + ?Sized,
    {
        match equality_msg(&self.styler, op, actual, expected, note) {
            Ok(report) => AssertError::Failure(report),
            Err(e) => e.into(),
        }
    }

    fn call_failure<A, B>(
        &self,
        op: &str,
        actual: &A,
        expected: &B,
        note: Option<&str>,
        sig: CallSignature,
        site: &CallSite,
    ) -> AssertError
    where
        A: Render + ?Sized,
        B: Render + ?Sized,
    {
        let report = match equality_msg(&self.styler, op, actual, expected, note) {
            Ok(report) => report,
            Err(e) => return e.into(),
        };
        let mut sig = sig;
        sig.fill_site(site);
        sig.set_op(op);
        AssertError::Failure(signature::call_msg(&self.styler, &report, &sig))
    }
}
