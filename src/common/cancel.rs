use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation scope.
///
/// `signal()` never yields a message; it disconnects once the token is
/// cancelled, so it can sit in a `select!` next to other receivers.
/// Cancelling a token cancels every child created from it.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    children: Mutex<Vec<CancelToken>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        let mut children = self.inner.children.lock();
        if self.is_cancelled() {
            drop(children);
            child.cancel();
            return child;
        }
        children.retain(|c| !c.is_cancelled());
        children.push(child.clone());
        child
    }

    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.trigger.lock().take();
        let children = std::mem::take(&mut *self.inner.children.lock());
        for child in children {
            child.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;
    use crossbeam_channel::RecvTimeoutError;
    use std::time::Duration;

    #[test]
    fn signal_disconnects_on_cancel() {
        let token = CancelToken::new();
        assert_eq!(
            token.signal().recv_timeout(Duration::from_millis(5)),
            Err(RecvTimeoutError::Timeout)
        );
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(
            token.signal().recv_timeout(Duration::from_millis(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn cancelling_parent_cancels_children() {
        let root = CancelToken::new();
        let first = root.child();
        let second = root.child();
        root.cancel();
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn cancelling_child_leaves_parent_running() {
        let root = CancelToken::new();
        let session = root.child();
        session.cancel();
        assert!(!root.is_cancelled());
        assert!(!root.child().is_cancelled());
    }

    #[test]
    fn child_of_cancelled_parent_starts_cancelled() {
        let root = CancelToken::new();
        root.cancel();
        assert!(root.child().is_cancelled());
    }
}
