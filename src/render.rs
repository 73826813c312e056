//! Two textual forms of a value: its representation (`Debug`) and, when the
//! type has one, its plain form (`Display`).

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::{self, Debug, Display, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Actual,
    Expected,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Actual => write!(f, "A value"),
            Side::Expected => write!(f, "B value"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Display implementation returned an error ({side}) (type: {type_name}) (value: {repr})")]
    Display {
        side: Side,
        type_name: String,
        repr: String,
    },
}

pub trait Render: Debug {
    fn repr(&self) -> String {
        format!("{:?}", self)
    }

    /// `None` when the type has no plain form.
    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        None
    }
}

/// Formats through `Display` without panicking when the implementation fails.
pub fn display_form<T: Display + ?Sized>(value: &T) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", value)?;
    Ok(out)
}

pub fn short_type_name(full: &str) -> String {
    let without_generics = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

pub fn type_name_of<T: ?Sized>(value: &T) -> String {
    short_type_name(std::any::type_name_of_val(value))
}

/// Renders a type as a comparison operand, e.g. for instance checks.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TypeName(pub &'static str);

impl TypeName {
    pub fn of<T: ?Sized>() -> Self {
        TypeName(std::any::type_name::<T>())
    }
}

impl Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Render for TypeName {}

/// Marker rendered for a value that was never supplied.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct NotSet;

impl NotSet {
    pub fn is_set(&self) -> bool {
        false
    }
}

impl Display for NotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<Not Set>")
    }
}

impl Debug for NotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<Not Set>")
    }
}

impl Render for NotSet {}

macro_rules! render_with_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Render for $ty {
                fn plain(&self) -> Option<Result<String, fmt::Error>> {
                    Some(display_form(self))
                }
            }
        )*
    };
}

render_with_display!(
    str, String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

// `Display` drops the fraction of integral floats, so it never adds anything.
impl Render for f32 {}
impl Render for f64 {}

impl Render for Cow<'_, str> {
    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        Some(display_form(self))
    }
}

impl Render for Path {
    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        Some(display_form(&self.display()))
    }
}

impl Render for PathBuf {
    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        Some(display_form(&self.display()))
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn repr(&self) -> String {
        (**self).repr()
    }

    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        (**self).plain()
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn repr(&self) -> String {
        (**self).repr()
    }

    fn plain(&self) -> Option<Result<String, fmt::Error>> {
        (**self).plain()
    }
}

impl<T: Debug> Render for [T] {}
impl<T: Debug, const N: usize> Render for [T; N] {}
impl<T: Debug> Render for Vec<T> {}
impl<T: Debug> Render for VecDeque<T> {}
impl<T: Debug> Render for Option<T> {}
impl<T: Debug, E: Debug> Render for Result<T, E> {}
impl<K: Debug, V: Debug> Render for BTreeMap<K, V> {}
impl<K: Debug, V: Debug, S> Render for HashMap<K, V, S> {}
impl<T: Debug> Render for BTreeSet<T> {}
impl<T: Debug, S> Render for HashSet<T, S> {}
impl Render for () {}

macro_rules! render_tuple {
    ($($name:ident),+) => {
        impl<$($name: Debug),+> Render for ($($name,)+) {}
    };
}

render_tuple!(A);
render_tuple!(A, B);
render_tuple!(A, B, C);
render_tuple!(A, B, C, D);
render_tuple!(A, B, C, D, E);
render_tuple!(A, B, C, D, E, F);
