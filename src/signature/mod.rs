//! Rendering of call signatures such as `parse("1", radix=10)` for failure messages.

pub mod args;

pub use args::{ArgList, Callable};

use crate::frame::{bare_name, caller_name, function_at, CallSite};
use crate::style::{Styler, Tone};
use std::fmt::Debug;

pub const DEFAULT_OP: &str = "and";

/// Describes a call: who was called and with which arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallSignature {
    name: Option<String>,
    site: Option<CallSite>,
    level: usize,
    args: Vec<String>,
    kwargs: Vec<(String, String)>,
    other_args: Vec<String>,
    other_kwargs: Vec<(String, String)>,
    op: Option<String>,
}

impl CallSignature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Uses the qualified name of `func`, overriding any call-site or stack lookup.
    pub fn for_func<F>(_func: &F) -> Self {
        Self::named(qualified_name::<F>())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, site: CallSite) -> Self {
        self.site = Some(site);
        self
    }

    pub fn level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn arg(mut self, value: &dyn Debug) -> Self {
        self.args.push(format!("{:?}", value));
        self
    }

    pub fn args<A: ArgList + ?Sized>(mut self, args: &A) -> Self {
        self.args.extend(args.reprs());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: &dyn Debug) -> Self {
        self.kwargs.push((key.into(), format!("{:?}", value)));
        self
    }

    pub fn other_arg(mut self, value: &dyn Debug) -> Self {
        self.other_args.push(format!("{:?}", value));
        self
    }

    pub fn other_args<A: ArgList + ?Sized>(mut self, args: &A) -> Self {
        self.other_args.extend(args.reprs());
        self
    }

    pub fn other_kwarg(mut self, key: impl Into<String>, value: &dyn Debug) -> Self {
        self.other_kwargs.push((key.into(), format!("{:?}", value)));
        self
    }

    pub fn op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn site(&self) -> Option<&CallSite> {
        self.site.as_ref()
    }

    pub fn has_other(&self) -> bool {
        !self.other_args.is_empty() || !self.other_kwargs.is_empty()
    }

    pub(crate) fn fill_site(&mut self, site: &CallSite) {
        if self.site.is_none() {
            self.site = Some(site.clone());
        }
    }

    pub(crate) fn set_op(&mut self, op: &str) {
        self.op = Some(op.to_string());
    }
}

/// Qualified name of a callable type: module path removed, closures keep
/// their enclosing function (`outer::{{closure}}`).
pub fn qualified_name<F: ?Sized>() -> String {
    bare_name(std::any::type_name::<F>())
}

// `depth` counts the frames between the stack walk and the public entry point.
#[inline(never)]
fn resolve_name(sig: &CallSignature, depth: usize) -> String {
    if let Some(name) = &sig.name {
        return name.clone();
    }
    if let Some(site) = &sig.site {
        if let Some(label) = site.name() {
            return label.to_string();
        }
        return function_at(site.file, site.line).unwrap_or_else(|e| {
            tracing::debug!("could not resolve call site name: {}", e);
            format!("{}:{}", site.file, site.line)
        });
    }
    caller_name(depth + sig.level.max(1)).unwrap_or_else(|e| {
        tracing::debug!("could not resolve caller name: {}", e);
        "<unknown>".to_string()
    })
}

/// Renders a single signature. Without a name, the call site's label names
/// it, then the function running the call site, then the site's location.
/// With no site at all, the caller of this function (walking `level` frames)
/// names it.
#[inline(never)]
pub fn format_func_sig(styler: &Styler, sig: &CallSignature) -> String {
    let name = resolve_name(sig, 2);
    render_func_sig(styler, &name, &sig.args, &sig.kwargs)
}

/// Renders the signature, plus a second one joined by `op` when other
/// arguments are present.
#[inline(never)]
pub fn format_call_str(styler: &Styler, sig: &CallSignature) -> String {
    let name = resolve_name(sig, 2);
    render_call_str(styler, &name, sig)
}

/// Prefixes `s` with the call signature. When `s` holds exactly one `:`, the
/// part after it is highlighted as the user's message.
#[inline(never)]
pub fn call_msg(styler: &Styler, s: &str, sig: &CallSignature) -> String {
    let name = resolve_name(sig, 2);
    let funcsig = render_call_str(styler, &name, sig);
    let (stdmsg, msg) = if s.matches(':').count() == 1 {
        match s.split_once(':') {
            Some((std, user)) => (std, Some(user)),
            None => (s, None),
        }
    } else {
        (s, None)
    };

    format!(
        "{}: {}{}{}",
        funcsig,
        styler.paint(stdmsg, Tone::Operator),
        if msg.is_some_and(|m| !m.is_empty()) {
            ": "
        } else {
            ""
        },
        styler.paint(msg.unwrap_or_default(), Tone::Note)
    )
}

fn render_call_str(styler: &Styler, name: &str, sig: &CallSignature) -> String {
    let funcsig = render_func_sig(styler, name, &sig.args, &sig.kwargs);
    if !sig.has_other() {
        return funcsig;
    }
    let op = sig.op.as_deref().filter(|op| !op.is_empty()).unwrap_or(DEFAULT_OP);
    let other = render_func_sig(styler, name, &sig.other_args, &sig.other_kwargs);
    format!("{} {} {}", funcsig, op, other)
}

fn render_func_sig(
    styler: &Styler,
    name: &str,
    args: &[String],
    kwargs: &[(String, String)],
) -> String {
    let argstr = args
        .iter()
        .map(|a| styler.paint(a, Tone::Value))
        .collect::<Vec<_>>()
        .join(", ");
    let kwargstr = kwargs
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                styler.paint(k, Tone::Key),
                styler.paint(v, Tone::Value)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let argrepr = [argstr, kwargstr]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}{}",
        styler.paint(name, Tone::FuncName),
        styler.wrap(&argrepr, "(", ")", Tone::Paren)
    )
}
