//! In-memory sinks whose content is consumed every time it is read back.
//!
//! Converting a buffer to a string (or calling `take`) returns everything
//! written since the previous conversion and leaves the buffer empty.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Cursor};
use thiserror::Error;

const CLOSED_TEXT: &str = "I/O operation on uninitialized buffer";
const CLOSED_BYTES: &str = "I/O operation on closed buffer";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("{0}")]
    State(String),
}

impl BufferError {
    /// Writes to a buffer that was finalized elsewhere report "uninitialized".
    pub fn is_uninitialized(&self) -> bool {
        match self {
            BufferError::State(message) => message.to_lowercase().contains("uninitialized"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ByteBuffer {
    inner: RefCell<Cursor<Vec<u8>>>,
    closed: Cell<bool>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bytes(&self, bytes: &[u8]) -> Result<usize, BufferError> {
        if self.closed.get() {
            return Err(BufferError::State(CLOSED_BYTES.to_string()));
        }
        let mut cursor = self.inner.borrow_mut();
        let end = cursor.get_ref().len() as u64;
        cursor.set_position(end);
        cursor.get_mut().extend_from_slice(bytes);
        cursor.set_position(end + bytes.len() as u64);
        Ok(bytes.len())
    }

    /// Returns everything written so far and empties the buffer.
    pub fn take(&self) -> Vec<u8> {
        let mut cursor = self.inner.borrow_mut();
        cursor.set_position(0);
        let content = std::mem::take(cursor.get_mut());
        cursor.set_position(0);
        content
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().get_ref().is_empty()
    }

    pub fn close(&self) {
        self.closed.set(true);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl io::Write for ByteBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Renders as an escaped byte literal, `b"..."`, consuming the content.
impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.take().escape_ascii())
    }
}

/// A text sink that mirrors every write into its own [`ByteBuffer`].
///
/// Raw bytes reach the byte buffer untouched. The text side decodes them as
/// UTF-8, holding back a sequence cut short at the end of a write until the
/// rest of it arrives.
#[derive(Debug, Default)]
pub struct TextBuffer {
    text: RefCell<String>,
    pending: RefCell<Vec<u8>>,
    closed: Cell<bool>,
    buffer: ByteBuffer,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn write_text(&self, s: &str) -> Result<usize, BufferError> {
        self.mirror(s, s.as_bytes())?;
        Ok(s.len())
    }

    /// Writes raw bytes; invalid UTF-8 shows up as U+FFFD on the text side only.
    pub fn write_raw(&self, bytes: &[u8]) -> Result<usize, BufferError> {
        let text = self.decode(bytes);
        self.mirror(&text, bytes)?;
        Ok(bytes.len())
    }

    fn mirror(&self, text: &str, raw: &[u8]) -> Result<(), BufferError> {
        match self.store(text) {
            Ok(()) => {}
            Err(e) if e.is_uninitialized() => {
                tracing::trace!("dropping write to finalized text buffer: {}", e);
            }
            Err(e) => return Err(e),
        }
        self.buffer.write_bytes(raw)?;
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let mut pending = self.pending.borrow_mut();
        pending.extend_from_slice(bytes);

        let mut text = String::new();
        let mut rest: &[u8] = &pending;
        while !rest.is_empty() {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        // incomplete sequence at the end; wait for more bytes
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        let leftover = rest.to_vec();
        *pending = leftover;
        text
    }

    fn store(&self, s: &str) -> Result<(), BufferError> {
        if self.closed.get() {
            return Err(BufferError::State(CLOSED_TEXT.to_string()));
        }
        self.text.borrow_mut().push_str(s);
        Ok(())
    }

    pub fn take(&self) -> String {
        std::mem::take(&mut *self.text.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.text.borrow().is_empty()
    }

    /// Finalizes the text side; later writes still reach the byte buffer.
    pub fn close(&self) {
        self.closed.set(true);
    }
}

impl io::Write for TextBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_raw(buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for TextBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_text(s).map(|_| ()).map_err(|_| fmt::Error)
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.take())
    }
}
