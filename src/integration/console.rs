use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

pub const PROMPT: &str = "Send Message: ";

/// The terminal side of the chat.
///
/// Sender and receiver each hold a clone; every line is written and flushed
/// under the lock in one go so their output never interleaves mid-line.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(out))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn prompt(&self) {
        self.write(PROMPT);
    }

    pub fn notice(&self, text: impl Display) {
        self.write(&format!("{text}\n"));
    }

    /// Prints an inbound message and puts the prompt back.
    pub fn received(&self, text: &str) {
        self.write(&format!("\rMessage received: {text}\n{PROMPT}"));
    }

    pub fn sent(&self, text: &str) {
        self.write(&format!("\rMessage sent: {text}\n"));
    }

    pub fn send_failed(&self, err: impl Display) {
        self.write(&format!("Error sending message: {err}\n"));
    }

    /// Ends the dangling prompt line.
    pub fn finish(&self) {
        self.write("\n");
    }

    fn write(&self, s: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(s.as_bytes()).and_then(|()| out.flush()) {
            log::warn!("Failed to write to console: {e}");
        }
    }
}
