//! Per-connection outbound handles.
//!
//! Each accepted connection gets an unbounded mpsc queue; the write half of
//! the socket is drained by a dedicated writer task owned by the server
//! runtime. The directory stores the send side as the user's connection
//! handle, so fan-out and shutdown can reach every live peer without
//! touching a socket directly.
//!
//! Sends are best-effort: enqueueing never blocks, and a handle whose
//! receiver is gone (peer already disconnected) swallows the message
//! instead of failing the sender's fan-out.

use tokio::sync::mpsc;

/// Unique identity of a connection, stable for its lifetime.
///
/// Doubles as the user id: every live connection has exactly one directory
/// entry keyed by this value.
pub type UserId = u64;

/// A message travelling to one connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Raw text to write to the peer (already carries the prompt marker).
    Text(String),
    /// Close the connection: the writer task shuts the socket down and
    /// exits.
    Close,
}

/// Send side of one connection's outbound queue.
///
/// Cheap to clone; the directory keeps one clone per registered user and
/// the session worker keeps another for its own replies.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: UserId,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ClientHandle {
    /// Create a handle and the receiver its writer task will drain.
    pub fn new(id: UserId) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    /// Connection identity this handle belongs to.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Enqueue text for delivery. Returns whether the writer task is still
    /// alive; a failed send to one recipient never aborts delivery to the
    /// rest.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.tx.send(Outbound::Text(text.into())).is_ok()
    }

    /// Ask the writer task to close the connection.
    pub fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_reaches_receiver() {
        let (handle, mut rx) = ClientHandle::new(7);

        assert_eq!(handle.id(), 7);
        assert!(handle.send("hello"));
        assert_eq!(rx.try_recv().ok(), Some(Outbound::Text("hello".to_string())));
    }

    #[test]
    fn send_after_receiver_dropped_is_non_fatal() {
        let (handle, rx) = ClientHandle::new(1);
        drop(rx);

        assert!(!handle.send("lost"));
    }

    #[test]
    fn close_delivers_close_marker() {
        let (handle, mut rx) = ClientHandle::new(2);

        handle.close();
        assert_eq!(rx.try_recv().ok(), Some(Outbound::Close));
    }
}
