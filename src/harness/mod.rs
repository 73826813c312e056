//! Runs a program's entry point against in-memory stdout/stderr sinks and
//! checks its exit status and output.

pub mod buffer;

pub use buffer::{BufferError, ByteBuffer, TextBuffer};

use crate::assertions::{AssertError, TestCase};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

/// Docopt-style argument dictionary, e.g. `{"--fore": "red", "TEXT": ["hi"]}`.
pub type ArgMap = BTreeMap<String, Value>;

pub trait EntryPoint {
    type Error: std::error::Error + Send + Sync + 'static;

    fn name(&self) -> &str;

    /// Fills in whatever the program expects but the test left out.
    fn make_argd(&self, argd: ArgMap) -> ArgMap {
        argd
    }

    /// Errors the program raises for bad input, as opposed to bugs.
    fn is_validation_error(&self, _err: &Self::Error) -> bool {
        true
    }

    fn main(
        &self,
        argd: &ArgMap,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<i32, Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MainExpectation {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub should_fail: bool,
    pub msg: Option<String>,
}

impl MainExpectation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    pub fn should_fail(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }
}

fn dump_argd(argd: &ArgMap) -> String {
    serde_json::to_string_pretty(argd).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}

impl TestCase {
    /// Runs `main` with the normalized arguments and returns its exit code.
    ///
    /// A validation error fails the test with the arguments attached, unless
    /// `should_fail` is set, in which case it is returned as
    /// [`AssertError::Unexpected`] for the caller to inspect.
    pub fn run_main_test<P: EntryPoint>(
        &self,
        program: &P,
        argd: ArgMap,
        should_fail: bool,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<i32, AssertError> {
        let argd = program.make_argd(argd);
        tracing::debug!(program = program.name(), should_fail, "running entry point");

        match program.main(&argd, stdout, stderr) {
            Ok(code) => Ok(code),
            Err(e) if program.is_validation_error(&e) && !should_fail => Err(self.fail(format!(
                "{} failed to run:\n{}\n    argd: {}",
                program.name(),
                e,
                dump_argd(&argd)
            ))),
            Err(e) => Err(AssertError::Unexpected(Box::new(e))),
        }
    }

    /// Runs `main` with fresh capture buffers: `(exit_code, stdout, stderr)`.
    pub fn run_main_output<P: EntryPoint>(
        &self,
        program: &P,
        argd: ArgMap,
        should_fail: bool,
    ) -> Result<(i32, String, String), AssertError> {
        let mut stdout = TextBuffer::new();
        let mut stderr = TextBuffer::new();
        let code = self.run_main_test(program, argd, should_fail, &mut stdout, &mut stderr)?;
        Ok((code, stdout.take(), stderr.take()))
    }

    pub fn assert_main<P: EntryPoint>(
        &self,
        program: &P,
        argd: ArgMap,
        expect: MainExpectation,
    ) -> Result<(), AssertError> {
        let (code, out, err) = self.run_main_output(program, argd, expect.should_fail)?;
        let msg = expect.msg.as_deref();

        if expect.should_fail {
            self.assert_greater(
                &code,
                &0,
                Some(msg.unwrap_or("main() returned a zero exit status.")),
            )?;
        } else {
            self.assert_equal(
                &code,
                &0,
                Some(msg.unwrap_or("main() returned a non-zero exit status.")),
            )?;
        }

        self.assert_equal(
            err.as_str(),
            expect.stderr.as_deref().unwrap_or(""),
            Some(msg.unwrap_or("main() printed something to stderr.")),
        )?;

        match expect.stdout.as_deref() {
            None => self.assert_greater(
                &out.len(),
                &0,
                Some(msg.unwrap_or("main() did not produce any stdout output.")),
            ),
            Some(expected) => self.assert_equal(
                out.as_str(),
                expected,
                Some(msg.unwrap_or("Output from main() did not match.")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Styler;
    use assert_matches::assert_matches;
    use serde_json::json;
    use thiserror::Error;

    #[derive(Error, Debug)]
    enum EchoError {
        #[error("bad word: {0}")]
        BadWord(String),
        #[error("write failed")]
        Io(#[from] std::io::Error),
    }

    struct Echo;

    impl EntryPoint for Echo {
        type Error = EchoError;

        fn name(&self) -> &str {
            "echo"
        }

        fn make_argd(&self, mut argd: ArgMap) -> ArgMap {
            argd.entry("--stderr".to_string()).or_insert(json!(false));
            argd
        }

        fn is_validation_error(&self, err: &EchoError) -> bool {
            matches!(err, EchoError::BadWord(_))
        }

        fn main(
            &self,
            argd: &ArgMap,
            stdout: &mut dyn Write,
            stderr: &mut dyn Write,
        ) -> Result<i32, EchoError> {
            let word = argd.get("WORD").and_then(Value::as_str).unwrap_or_default();
            if word == "bad" {
                return Err(EchoError::BadWord(word.to_string()));
            }
            if word == "quiet" {
                return Ok(3);
            }
            if argd.get("--stderr") == Some(&json!(true)) {
                writeln!(stderr, "{}", word)?;
                return Ok(1);
            }
            writeln!(stdout, "{}", word)?;
            Ok(0)
        }
    }

    fn case() -> TestCase {
        TestCase::with_styler(Styler::plain())
    }

    fn argd(word: &str) -> ArgMap {
        ArgMap::from([("WORD".to_string(), json!(word))])
    }

    #[test]
    fn test_run_main_output_captures_stdout() {
        let (code, out, err) = case().run_main_output(&Echo, argd("hi"), false).unwrap();
        assert_eq!(code, 0);
        assert_eq!(out, "hi\n");
        assert_eq!(err, "");
    }

    #[test]
    fn test_run_main_output_captures_stderr() {
        let mut args = argd("oops");
        args.insert("--stderr".to_string(), json!(true));
        let (code, out, err) = case().run_main_output(&Echo, args, false).unwrap();
        assert_eq!(code, 1);
        assert_eq!(out, "");
        assert_eq!(err, "oops\n");
    }

    #[test]
    fn test_validation_error_fails_with_argd() {
        let err = case().run_main_output(&Echo, argd("bad"), false).unwrap_err();
        assert!(err.is_failure());
        let text = err.to_string();
        assert!(text.starts_with("echo failed to run:\nbad word: bad\n    argd: {"));
        assert!(text.contains("\"--stderr\": false"));
        assert!(text.contains("\"WORD\": \"bad\""));
    }

    #[test]
    fn test_validation_error_propagates_when_expected() {
        let err = case().run_main_output(&Echo, argd("bad"), true).unwrap_err();
        assert_matches!(err, AssertError::Unexpected(ref e) if e.is::<EchoError>());
    }

    #[test]
    fn test_assert_main_passes() {
        let t = case();
        assert!(t.assert_main(&Echo, argd("hi"), MainExpectation::new()).is_ok());
        assert!(t
            .assert_main(&Echo, argd("hi"), MainExpectation::new().stdout("hi\n"))
            .is_ok());
    }

    #[test]
    fn test_assert_main_wrong_stdout() {
        let err = case()
            .assert_main(&Echo, argd("hi"), MainExpectation::new().stdout("bye\n"))
            .unwrap_err();
        assert!(err.to_string().contains("Output from main() did not match."));
    }

    #[test]
    fn test_assert_main_nonzero_exit() {
        let err = case()
            .assert_main(&Echo, argd("quiet"), MainExpectation::new())
            .unwrap_err();
        assert!(err.to_string().contains("main() returned a non-zero exit status."));
    }

    #[test]
    fn test_assert_main_should_fail() {
        let mut args = argd("oops");
        args.insert("--stderr".to_string(), json!(true));
        let expect = MainExpectation::new().should_fail().stderr("oops\n");
        let err = case().assert_main(&Echo, args, expect).unwrap_err();
        // stderr matched and exit code was 1, but there was no stdout
        assert!(err.to_string().contains("did not produce any stdout output"));
    }

    #[test]
    fn test_assert_main_should_fail_propagates_validation_error() {
        let expect = MainExpectation::new().should_fail();
        let err = case().assert_main(&Echo, argd("bad"), expect).unwrap_err();
        assert_matches!(err, AssertError::Unexpected(_));
    }
}
