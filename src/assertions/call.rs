use crate::assertions::collections::{list_difference, pretty_diff, Dict};
use crate::assertions::{format_message, AssertError, TestCase};
use crate::frame::CallSite;
use crate::render::{NotSet, Render, TypeName};
use crate::signature::{ArgList, CallSignature, Callable};
use std::any::Any;
use std::fmt::{self, Debug};

pub const MISSING_VALUE: &str = "must supply the actual value if not using a function";

/// The actual side of a call-wrapping assertion: an already computed value,
/// a function to invoke, or both (the value wins and the function is only
/// described).
pub struct Check<'a, T> {
    value: Option<T>,
    invoke: Option<Box<dyn FnOnce() -> T + 'a>>,
    sig: CallSignature,
    msg: Option<String>,
}

impl<T> Default for Check<'_, T> {
    fn default() -> Self {
        Self {
            value: None,
            invoke: None,
            sig: CallSignature::new(),
            msg: None,
        }
    }
}

impl<T: Debug> Debug for Check<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value: &dyn Debug = match &self.value {
            Some(value) => value,
            None => &NotSet,
        };
        f.debug_struct("Check")
            .field("value", value)
            .field("invoke", &self.invoke.is_some())
            .field("sig", &self.sig)
            .field("msg", &self.msg)
            .finish()
    }
}

impl<'a, T> Check<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(value: T) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Invokes `func` with `args` once, when the assertion runs.
    pub fn call<F, A>(func: F, args: A) -> Self
    where
        F: Callable<A, Output = T> + 'a,
        A: ArgList + 'a,
    {
        let sig = CallSignature::for_func(&func).args(&args);
        Self {
            value: None,
            invoke: Some(Box::new(move || func.call_with(args))),
            sig,
            msg: None,
        }
    }

    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn signature(mut self, sig: CallSignature) -> Self {
        self.sig = sig;
        self
    }

    pub fn describe(mut self, name: impl Into<String>) -> Self {
        self.sig = self.sig.with_name(name);
        self
    }

    pub fn arg(mut self, value: &dyn Debug) -> Self {
        self.sig = self.sig.arg(value);
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: &dyn Debug) -> Self {
        self.sig = self.sig.kwarg(key, value);
        self
    }

    pub fn other_arg(mut self, value: &dyn Debug) -> Self {
        self.sig = self.sig.other_arg(value);
        self
    }

    pub fn other_kwarg(mut self, key: impl Into<String>, value: &dyn Debug) -> Self {
        self.sig = self.sig.other_kwarg(key, value);
        self
    }

    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    pub(crate) fn resolve(self) -> Result<Resolved<T>, AssertError> {
        let actual = match (self.value, self.invoke) {
            (Some(value), _) => value,
            (None, Some(invoke)) => {
                tracing::debug!(
                    "invoking {} for assertion",
                    self.sig.name().unwrap_or("<anonymous>")
                );
                invoke()
            }
            (None, None) => {
                tracing::debug!(value = %NotSet, sig = ?self.sig, "nothing to assert on");
                return Err(AssertError::Usage(MISSING_VALUE.to_string()));
            }
        };
        Ok(Resolved {
            actual,
            sig: self.sig,
            msg: self.msg,
        })
    }
}

pub(crate) struct Resolved<T> {
    pub actual: T,
    pub sig: CallSignature,
    pub msg: Option<String>,
}

impl TestCase {
    /// Compares the checked value (computing it by calling the function when
    /// no value was given) with `expected`.
    #[track_caller]
    pub fn assert_call_equal<T, E>(&self, expected: &E, check: Check<'_, T>) -> Result<(), AssertError>
    where
        T: Render + PartialEq<E>,
        E: Render + ?Sized,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if actual == *expected {
            return Ok(());
        }
        Err(self.call_failure("!=", &actual, expected, msg.as_deref(), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_not_equal<T, E>(
        &self,
        expected: &E,
        check: Check<'_, T>,
    ) -> Result<(), AssertError>
    where
        T: Render + PartialEq<E>,
        E: Render + ?Sized,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if actual != *expected {
            return Ok(());
        }
        Err(self.call_failure("==", &actual, expected, msg.as_deref(), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_true(&self, check: Check<'_, bool>) -> Result<(), AssertError> {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if actual {
            return Ok(());
        }
        Err(self.call_failure("!=", &actual, &true, msg.as_deref(), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_false(&self, check: Check<'_, bool>) -> Result<(), AssertError> {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if !actual {
            return Ok(());
        }
        Err(self.call_failure("!=", &actual, &false, msg.as_deref(), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_is_instance<E, T>(&self, check: Check<'_, T>) -> Result<(), AssertError>
    where
        E: Any,
        T: Render + Any,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if (&actual as &dyn Any).is::<E>() {
            return Ok(());
        }
        let expected = TypeName::of::<E>();
        let standard = format!("{} is not an instance of {}", actual.repr(), expected.0);
        let note = format_message(msg.as_deref(), &standard);
        Err(self.call_failure("is not", &actual, &expected, Some(&note), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_list_equal<T>(
        &self,
        expected: &[T],
        check: Check<'_, Vec<T>>,
    ) -> Result<(), AssertError>
    where
        T: PartialEq + Debug,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        match list_difference("List", &actual, expected) {
            None => Ok(()),
            Some(standard) => {
                let note = format_message(msg.as_deref(), &standard);
                Err(self.call_failure("!=", &actual, expected, Some(&note), sig, &site))
            }
        }
    }

    #[track_caller]
    pub fn assert_call_tuple_equal<T>(
        &self,
        expected: &T,
        check: Check<'_, T>,
    ) -> Result<(), AssertError>
    where
        T: Render + PartialEq,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        if actual == *expected {
            return Ok(());
        }
        let standard = format!("Tuples differ\n{}", pretty_diff(&actual, expected));
        let note = format_message(msg.as_deref(), &standard);
        Err(self.call_failure("!=", &actual, expected, Some(&note), sig, &site))
    }

    #[track_caller]
    pub fn assert_call_dict_equal<M>(&self, expected: &M, check: Check<'_, M>) -> Result<(), AssertError>
    where
        M: Dict + Render,
    {
        let site = self.site_or(CallSite::caller());
        let Resolved { actual, sig, msg } = check.resolve()?;
        match actual.difference(expected) {
            None => Ok(()),
            Some(standard) => {
                let note = format_message(msg.as_deref(), &standard);
                Err(self.call_failure("!=", &actual, expected, Some(&note), sig, &site))
            }
        }
    }
}
