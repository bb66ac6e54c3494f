//! User-facing notifications emitted at the client boundary.

use log::warn;
use tokio::sync::mpsc;

/// Something the operator should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A request failed; the message is already human-readable.
    Error(String),
    /// The session was invalidated; the shell must return to the login view.
    SessionExpired,
}

/// Destination for notices. The console feeds these into its toast queue;
/// the CLI just logs them.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that writes every notice to the log.
pub struct LogSink;

impl NoticeSink for LogSink {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Error(message) => warn!("{message}"),
            Notice::SessionExpired => warn!("session expired, please log in again"),
        }
    }
}

impl NoticeSink for mpsc::UnboundedSender<Notice> {
    fn notify(&self, notice: Notice) {
        // A dropped receiver means the UI is gone; nothing left to tell.
        let _ = self.send(notice);
    }
}
