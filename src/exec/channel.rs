// src/exec/channel.rs

//! I/O channel model for child processes.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// In-memory buffer filled asynchronously from a child's pipe.
///
/// Clones share the same storage: the executor's drain task holds one clone
/// and the owning [`Channel`] holds the other.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, chunk: &[u8]) {
        let mut bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend_from_slice(chunk);
    }

    /// Snapshot of everything captured so far.
    pub fn bytes(&self) -> Vec<u8> {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.clone()
    }

    pub fn len(&self) -> usize {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Captured bytes as lossy UTF-8 with surrounding whitespace removed.
    pub fn trimmed(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).trim().to_string()
    }
}

impl fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("len", &self.len())
            .finish()
    }
}

/// How one standard stream of a child process is wired.
#[derive(Debug, Clone, Default)]
pub enum Channel {
    /// Share the parent's stream.
    #[default]
    Inherit,
    /// Connect to the null device.
    Null,
    /// Read from (stdin) or truncate-and-write to (stdout/stderr) a file.
    File(PathBuf),
    /// Anonymous pipe. Output pipes are always drained; with a capture
    /// buffer the drained bytes are kept. An input pipe is closed right away.
    Pipe { capture: Option<CaptureBuffer> },
    /// Input only: feed these bytes to the child's stdin, then close it.
    Bytes(Vec<u8>),
}

impl Channel {
    pub fn pipe() -> Self {
        Channel::Pipe { capture: None }
    }

    pub fn capturing() -> Self {
        Channel::Pipe {
            capture: Some(CaptureBuffer::new()),
        }
    }

    pub fn capture(&self) -> Option<&CaptureBuffer> {
        match self {
            Channel::Pipe { capture } => capture.as_ref(),
            _ => None,
        }
    }
}

/// The three channel bindings of a process.
#[derive(Debug, Clone, Default)]
pub struct Io {
    pub input: Channel,
    pub output: Channel,
    pub error: Channel,
}

impl Io {
    /// Route stdout into a fresh capture buffer.
    pub fn enable_output_capturing(&mut self) {
        self.output = Channel::capturing();
    }

    /// Route stderr into a fresh capture buffer.
    pub fn enable_error_capturing(&mut self) {
        self.error = Channel::capturing();
    }

    pub fn captured_output(&self) -> Option<&CaptureBuffer> {
        self.output.capture()
    }

    pub fn captured_error(&self) -> Option<&CaptureBuffer> {
        self.error.capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_buffer() {
        let buffer = CaptureBuffer::new();
        let writer = buffer.clone();
        writer.append(b"  hello");
        writer.append(b"\n\n");

        assert_eq!(buffer.bytes(), b"  hello\n\n");
        assert_eq!(buffer.trimmed(), "hello");
    }

    #[test]
    fn capturing_is_opt_in() {
        let mut io = Io::default();
        assert!(io.captured_output().is_none());
        assert!(matches!(io.output, Channel::Inherit));

        io.enable_output_capturing();
        assert!(io.captured_output().is_some_and(|b| b.is_empty()));
        assert!(io.captured_error().is_none());
        assert!(Channel::pipe().capture().is_none());
    }
}
