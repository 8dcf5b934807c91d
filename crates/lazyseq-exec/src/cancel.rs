//! Cooperative cancellation shared between producers and their consumers.
//!
//! A token is a flag plus the set of hand-off slots registered with it.
//! Cancelling flips the flag and wakes every publisher blocked on one of
//! those slots; consumers are not interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Something that must be woken when its token is cancelled.
pub(crate) trait CancelListener: Send + Sync {
    fn on_cancel(&self);
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    listeners: Mutex<Vec<Weak<dyn CancelListener>>>,
    children: Mutex<Vec<Weak<TokenInner>>>,
}

impl TokenInner {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // Snapshot under the lock, notify outside it: listeners take their own locks.
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_cancel();
        }
        let children: Vec<_> = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// Cloneable cancellation handle. Clones share one flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and every child derived from it. Idempotent.
    pub fn cancel(&self) {
        if self.is_cancelled() {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("cancel token fired");
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// A token cancelled when either it or `self` is cancelled.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        {
            let mut children = self
                .inner
                .children
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        if self.is_cancelled() {
            child.inner.cancel();
        }
        child
    }

    /// Register `listener`; it fires immediately if the token is already cancelled.
    pub(crate) fn register(&self, listener: Weak<dyn CancelListener>) {
        {
            let mut listeners = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.push(listener.clone());
        }
        if self.is_cancelled() {
            if let Some(listener) = listener.upgrade() {
                listener.on_cancel();
            }
        }
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
