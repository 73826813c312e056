pub mod assertions;
pub mod compare;
pub mod frame;
pub mod harness;
pub mod render;
pub mod signature;
pub mod style;
pub mod tool;

pub use assertions::{AssertError, Check, RaisesContext, ResultExt, TestCase};
pub use compare::equality_msg;
pub use frame::{caller_name, function_at, method_name, CallSite, FrameError};
pub use harness::{ArgMap, ByteBuffer, EntryPoint, MainExpectation, TextBuffer};
pub use render::{NotSet, Render, RenderError};
pub use signature::{call_msg, format_call_str, format_func_sig, CallSignature};
pub use style::{ColorChoice, Styler};
