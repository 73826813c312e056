use crate::assertions::{format_message, AssertError, BoxError, TestCase};
use crate::frame::CallSite;
use crate::render::short_type_name;
use crate::signature::{self, CallSignature};
use regex::Regex;
use std::error::Error;
use std::marker::PhantomData;

/// Expects a block to fail with an error of type `E`.
///
/// An `Ok` result fails the assertion; an error of another type is handed
/// back as [`AssertError::Unexpected`].
#[derive(Debug)]
pub struct RaisesContext<'t, E> {
    case: &'t TestCase,
    sig: CallSignature,
    site: CallSite,
    msg: Option<String>,
    pattern: Option<String>,
    expected: PhantomData<fn() -> E>,
}

impl TestCase {
    #[track_caller]
    pub fn assert_call_raises<E>(&self, sig: CallSignature, msg: Option<&str>) -> RaisesContext<'_, E>
    where
        E: Error + 'static,
    {
        RaisesContext {
            case: self,
            sig,
            site: self.site_or(CallSite::caller()),
            msg: msg.map(str::to_string),
            pattern: None,
            expected: PhantomData,
        }
    }
}

impl<E: Error + 'static> RaisesContext<'_, E> {
    /// Also requires the error's message to match `pattern`.
    pub fn matching(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn run<T, X, F>(self, block: F) -> Result<(), AssertError>
    where
        F: FnOnce() -> Result<T, X>,
        X: Into<BoxError>,
    {
        self.check(block())
    }

    pub fn check<T, X>(self, result: Result<T, X>) -> Result<(), AssertError>
    where
        X: Into<BoxError>,
    {
        let err: BoxError = match result {
            Ok(_) => {
                let expected = short_type_name(std::any::type_name::<E>());
                return Err(self.failure(&format!("{} not raised", expected)));
            }
            Err(err) => err.into(),
        };

        if err.downcast_ref::<E>().is_none() {
            return Err(AssertError::Unexpected(err));
        }

        if let Some(pattern) = &self.pattern {
            let re = Regex::new(pattern)
                .map_err(|e| AssertError::Usage(format!("Invalid regex: {}", e)))?;
            let text = err.to_string();
            if !re.is_match(&text) {
                return Err(self.failure(&format!("\"{}\" does not match \"{}\"", pattern, text)));
            }
        }
        Ok(())
    }

    fn failure(&self, standard: &str) -> AssertError {
        let text = format_message(self.msg.as_deref(), standard);
        let mut sig = self.sig.clone();
        sig.fill_site(&self.site);
        AssertError::Failure(signature::call_msg(self.case.styler(), &text, &sig))
    }
}
