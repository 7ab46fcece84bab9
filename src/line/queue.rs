//! Line endpoint over bounded in-process queues.
//!
//! Each endpoint owns the queue it reads from and holds a non-owning
//! reference to its peer's queue, which it only appends to. The references
//! are wired once by [`line_pipe`](crate::pipe::line_pipe) and never change.
//! Dropping an endpoint drops its queue; the peer's next `send` then fails
//! with `ConnectionClosed`.

use std::collections::VecDeque;
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::LineChannel;
use crate::error::{PipeError, Result};

/// Default number of records a queue holds before sends fail.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

pub(crate) type LineQueue = Mutex<VecDeque<String>>;

fn lock(queue: &LineQueue) -> MutexGuard<'_, VecDeque<String>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Line-buffered endpoint emulated with in-process queues.
///
/// Sends are never logged: a full queue simply returns `Ok(false)`.
#[derive(Debug)]
pub struct QueueLineEndpoint {
    name: String,
    lines: Arc<LineQueue>,
    peer: Weak<LineQueue>,
    capacity: usize,
}

impl QueueLineEndpoint {
    pub(crate) fn new(
        name: String,
        lines: Arc<LineQueue>,
        peer: Weak<LineQueue>,
        capacity: usize,
    ) -> Self {
        Self {
            name,
            lines,
            peer,
            capacity,
        }
    }

    /// Records waiting to be read by this endpoint.
    pub fn pending(&self) -> usize {
        lock(&self.lines).len()
    }

    /// Maximum records the peer's queue accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl LineChannel for QueueLineEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, line: &str) -> Result<bool> {
        let peer = self.peer.upgrade().ok_or(PipeError::ConnectionClosed)?;
        let mut queue = lock(&peer);

        if queue.len() >= self.capacity {
            return Ok(false);
        }
        queue.push_back(line.to_owned());
        Ok(true)
    }

    fn readline(&mut self) -> Result<Option<String>> {
        Ok(lock(&self.lines).pop_front())
    }

    fn fileno(&self) -> Option<RawFd> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(capacity: usize) -> (QueueLineEndpoint, QueueLineEndpoint) {
        let q0 = Arc::new(LineQueue::default());
        let q1 = Arc::new(LineQueue::default());
        let w0 = Arc::downgrade(&q0);
        let w1 = Arc::downgrade(&q1);
        (
            QueueLineEndpoint::new("q[0]".to_string(), q0, w1, capacity),
            QueueLineEndpoint::new("q[1]".to_string(), q1, w0, capacity),
        )
    }

    #[test]
    fn test_send_appends_to_peer_queue() {
        let (mut a, mut b) = pair(DEFAULT_QUEUE_CAPACITY);

        assert!(a.send("hello").unwrap());
        assert_eq!(a.pending(), 0);
        assert_eq!(b.pending(), 1);

        assert_eq!(b.readline().unwrap().as_deref(), Some("hello"));
        assert_eq!(b.readline().unwrap(), None);
        assert_eq!(a.readline().unwrap(), None);
    }

    #[test]
    fn test_full_queue_rejects_without_mutation() {
        let (mut a, mut b) = pair(3);

        assert!(a.send("1").unwrap());
        assert!(a.send("2").unwrap());
        assert!(a.send("3").unwrap());
        assert!(!a.send("4").unwrap());
        assert!(!a.send("5").unwrap());
        assert_eq!(b.pending(), 3);

        // Reading one frees exactly one slot
        assert_eq!(b.readline().unwrap().as_deref(), Some("1"));
        assert!(a.send("6").unwrap());
        assert!(!a.send("7").unwrap());

        assert_eq!(b.read_available().unwrap(), vec!["2", "3", "6"]);
    }

    #[test]
    fn test_directions_are_independent() {
        let (mut a, mut b) = pair(1);

        assert!(a.send("a->b").unwrap());
        assert!(!a.send("a->b again").unwrap());
        // b's outbound direction is unaffected by a full a->b queue
        assert!(b.send("b->a").unwrap());

        assert_eq!(a.readline().unwrap().as_deref(), Some("b->a"));
        assert_eq!(b.readline().unwrap().as_deref(), Some("a->b"));
    }

    #[test]
    fn test_send_to_dropped_peer() {
        let (mut a, b) = pair(10);
        drop(b);
        assert!(matches!(a.send("anyone?"), Err(PipeError::ConnectionClosed)));
    }

    #[test]
    fn test_placeholder_fileno() {
        let (a, _b) = pair(1);
        assert_eq!(a.fileno(), None);
        assert_eq!(a.capacity(), 1);
    }
}
