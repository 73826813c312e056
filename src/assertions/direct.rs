use crate::assertions::{format_message, AssertError, TestCase};
use crate::render::{Render, TypeName};
use std::any::Any;

const DEFAULT_PLACES: i32 = 7;

impl TestCase {
    pub fn assert_equal<A, B>(&self, a: &A, b: &B, msg: Option<&str>) -> Result<(), AssertError>
    where
        A: Render + PartialEq<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a == b {
            return Ok(());
        }
        Err(self.comparison_failure("!=", a, b, msg))
    }

    pub fn assert_not_equal<A, B>(&self, a: &A, b: &B, msg: Option<&str>) -> Result<(), AssertError>
    where
        A: Render + PartialEq<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a != b {
            return Ok(());
        }
        Err(self.comparison_failure("==", a, b, msg))
    }

    pub fn assert_greater<A, B>(&self, a: &A, b: &B, msg: Option<&str>) -> Result<(), AssertError>
    where
        A: Render + PartialOrd<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a > b {
            return Ok(());
        }
        Err(self.comparison_failure("<=", a, b, msg))
    }

    pub fn assert_greater_equal<A, B>(
        &self,
        a: &A,
        b: &B,
        msg: Option<&str>,
    ) -> Result<(), AssertError>
    where
        A: Render + PartialOrd<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a >= b {
            return Ok(());
        }
        Err(self.comparison_failure("<", a, b, msg))
    }

    pub fn assert_less<A, B>(&self, a: &A, b: &B, msg: Option<&str>) -> Result<(), AssertError>
    where
        A: Render + PartialOrd<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a < b {
            return Ok(());
        }
        Err(self.comparison_failure(">=", a, b, msg))
    }

    pub fn assert_less_equal<A, B>(&self, a: &A, b: &B, msg: Option<&str>) -> Result<(), AssertError>
    where
        A: Render + PartialOrd<B> + ?Sized,
        B: Render + ?Sized,
    {
        if a <= b {
            return Ok(());
        }
        Err(self.comparison_failure(">", a, b, msg))
    }

    /// Passes when `a` and `b` agree to `places` decimal places (default 7),
    /// or differ by at most `delta`. Supplying both is a usage error.
    pub fn assert_almost_equal(
        &self,
        a: f64,
        b: f64,
        places: Option<i32>,
        delta: Option<f64>,
        msg: Option<&str>,
    ) -> Result<(), AssertError> {
        if a == b {
            return Ok(());
        }
        let diff = (a - b).abs();
        let close = match (places, delta) {
            (Some(_), Some(_)) => {
                return Err(AssertError::Usage(
                    "specify delta or places not both".to_string(),
                ))
            }
            (None, Some(delta)) => diff <= delta,
            (places, None) => round_to(diff, places.unwrap_or(DEFAULT_PLACES)) == 0.0,
        };
        if close {
            return Ok(());
        }
        Err(self.comparison_failure("!~", &a, &b, msg))
    }

    pub fn assert_almost_not_equal(
        &self,
        a: f64,
        b: f64,
        places: Option<i32>,
        delta: Option<f64>,
        msg: Option<&str>,
    ) -> Result<(), AssertError> {
        let diff = (a - b).abs();
        let apart = match (places, delta) {
            (Some(_), Some(_)) => {
                return Err(AssertError::Usage(
                    "specify delta or places not both".to_string(),
                ))
            }
            (None, Some(delta)) => a != b && diff > delta,
            (places, None) => {
                a != b && round_to(diff, places.unwrap_or(DEFAULT_PLACES)) != 0.0
            }
        };
        if apart {
            return Ok(());
        }
        Err(self.comparison_failure("~", &a, &b, msg))
    }

    /// Passes when the concrete type of `obj` is `E`.
    pub fn assert_is_instance<E, T>(&self, obj: &T, msg: Option<&str>) -> Result<(), AssertError>
    where
        E: Any,
        T: Render + Any,
    {
        if (obj as &dyn Any).is::<E>() {
            return Ok(());
        }
        let expected = TypeName::of::<E>();
        let standard = format!("{} is not an instance of {}", obj.repr(), expected.0);
        let note = format_message(msg, &standard);
        Err(self.comparison_failure("is not", obj, &expected, Some(&note)))
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
