//! Bounded hand-off between producer threads and a single consumer cursor.
//!
//! One `Slot` is shared by every `Publisher` clone and the `ChannelCursor`.
//! Producers block in `publish` while the queue is full; the consumer blocks
//! in `advance` while it is empty. Buffered items are always delivered before
//! a signaled error. Disposal of the consumer and cancellation of the token
//! both release blocked producers.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, JoinHandle};

use lazyseq_core::{Cursor, CursorError, CursorState, PipelineConfig, Result};

use crate::cancel::{CancelListener, CancelToken};
use crate::metrics;

struct SlotState<T> {
    queue: VecDeque<T>,
    capacity: usize,
    /// Pending error, taken by the consumer once the queue drains.
    error: Option<CursorError>,
    /// An error was accepted; production is over even after the consumer took it.
    errored: bool,
    complete: bool,
    /// The consumer was disposed.
    closed: bool,
    publishers: usize,
    published: u64,
}

impl<T> SlotState<T> {
    /// Why a publish must be refused, if it must.
    fn refusal(&self, token: &CancelToken) -> Option<&'static str> {
        if self.closed {
            Some("consumer disposed")
        } else if token.is_cancelled() {
            Some("cancelled")
        } else if self.errored {
            Some("error signaled")
        } else if self.complete {
            Some("completed")
        } else {
            None
        }
    }
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
    readable: Condvar,
    writable: Condvar,
    token: CancelToken,
}

impl<T> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send> CancelListener for Slot<T> {
    fn on_cancel(&self) {
        // Taking the lock orders this wake-up after any publisher that already
        // checked the flag has started waiting.
        let _state = self.lock();
        self.writable.notify_all();
    }
}

/// Producer handle. Cloneable; dropping the last clone without signaling
/// completes the stream.
pub struct Publisher<T> {
    slot: Arc<Slot<T>>,
}

/// Consumer side of a [`channel`]. Dropping it disposes it.
pub struct ChannelCursor<T> {
    slot: Arc<Slot<T>>,
    state: CursorState<T>,
    disposed: bool,
}

/// Create a bridge with room for `capacity` buffered items (0 is treated as 1).
pub fn channel<T: Send + 'static>(
    token: CancelToken,
    capacity: usize,
) -> (Publisher<T>, ChannelCursor<T>) {
    let capacity = capacity.max(1);
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            error: None,
            errored: false,
            complete: false,
            closed: false,
            publishers: 1,
            published: 0,
        }),
        readable: Condvar::new(),
        writable: Condvar::new(),
        token: token.clone(),
    });
    let listener: Weak<dyn CancelListener> = Arc::downgrade(&slot) as Weak<dyn CancelListener>;
    token.register(listener);

    #[cfg(feature = "tracing")]
    tracing::trace!(capacity, "channel opened");

    (
        Publisher {
            slot: Arc::clone(&slot),
        },
        ChannelCursor {
            slot,
            state: CursorState::NotStarted,
            disposed: false,
        },
    )
}

/// [`channel`] sized by `config.channel_capacity`.
pub fn channel_with_config<T: Send + 'static>(
    token: CancelToken,
    config: &PipelineConfig,
) -> (Publisher<T>, ChannelCursor<T>) {
    channel(token, config.channel_capacity)
}

impl<T> Publisher<T> {
    /// Enqueue `item`, blocking while the queue is full.
    ///
    /// Returns `false` (dropping the item) once the consumer is disposed, the
    /// token is cancelled, or completion or an error has been signaled.
    pub fn publish(&self, item: T) -> bool {
        let slot = &*self.slot;
        let mut state = slot.lock();
        loop {
            if let Some(_reason) = state.refusal(&slot.token) {
                #[cfg(feature = "tracing")]
                tracing::trace!(reason = _reason, "publish refused");
                return false;
            }
            if state.queue.len() < state.capacity {
                state.queue.push_back(item);
                state.published += 1;
                slot.readable.notify_one();
                return true;
            }
            state = slot
                .writable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// No more items will be published. Idempotent.
    pub fn signal_complete(&self) {
        let mut state = self.slot.lock();
        if !state.complete {
            state.complete = true;
            self.slot.readable.notify_all();
            self.slot.writable.notify_all();
        }
    }

    /// Deliver `err` to the consumer after the buffered items. Never blocks.
    ///
    /// Only the first error is kept; errors after completion or after the
    /// consumer is disposed are dropped.
    pub fn signal_error(&self, err: CursorError) {
        let mut state = self.slot.lock();
        if state.errored || state.complete || state.closed {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "error signal dropped");
            return;
        }
        state.error = Some(err);
        state.errored = true;
        self.slot.readable.notify_all();
        self.slot.writable.notify_all();
    }

    /// True once the consumer has been disposed.
    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }

    pub fn is_cancelled(&self) -> bool {
        self.slot.token.is_cancelled()
    }
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        self.slot.lock().publishers += 1;
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Drop for Publisher<T> {
    fn drop(&mut self) {
        let mut state = self.slot.lock();
        state.publishers -= 1;
        if state.publishers == 0 && !state.complete {
            state.complete = true;
            self.slot.readable.notify_all();
        }
    }
}

impl<T> Cursor for ChannelCursor<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.disposed || self.state.is_exhausted() {
            return false;
        }
        let slot = &*self.slot;
        let mut state = slot.lock();
        loop {
            if let Some(item) = state.queue.pop_front() {
                slot.writable.notify_one();
                drop(state);
                self.state = CursorState::Positioned(item);
                return true;
            }
            if let Some(err) = state.error.take() {
                drop(state);
                self.state.fail(err);
                return false;
            }
            if state.complete || state.closed {
                drop(state);
                self.state.finish();
                return false;
            }
            state = slot
                .readable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn current(&self) -> Result<&T> {
        if self.disposed {
            return Err(CursorError::Disposed);
        }
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let (dropped, published) = {
            let mut state = self.slot.lock();
            state.closed = true;
            let dropped = state.queue.len();
            state.queue.clear();
            self.slot.writable.notify_all();
            self.slot.readable.notify_all();
            (dropped, state.published)
        };
        self.state.finish();
        metrics::emit_event(
            "channel_disposed",
            &[
                ("dropped", dropped.to_string()),
                ("published", published.to_string()),
            ],
        );
    }
}

impl<T> Drop for ChannelCursor<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Run `produce` on a named thread feeding a new channel.
///
/// `Ok(())` from `produce` completes the stream; `Err(e)` is signaled as the
/// stream's error.
pub fn spawn_producer<T, P>(
    token: CancelToken,
    capacity: usize,
    name: impl Into<String>,
    produce: P,
) -> std::io::Result<(ChannelCursor<T>, JoinHandle<()>)>
where
    T: Send + 'static,
    P: FnOnce(&Publisher<T>) -> Result<()> + Send + 'static,
{
    let (publisher, cursor) = channel(token, capacity);
    let name = name.into();
    let handle = thread::Builder::new().name(name).spawn(move || {
        match produce(&publisher) {
            Ok(()) => publisher.signal_complete(),
            Err(e) => publisher.signal_error(e),
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            thread = thread::current().name().unwrap_or("producer"),
            "producer finished"
        );
    })?;
    Ok((cursor, handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_still_hands_off() {
        let (publisher, mut cursor) = channel::<u32>(CancelToken::new(), 0);
        assert!(publisher.publish(1));
        assert!(cursor.advance());
        assert_eq!(*cursor.current().unwrap(), 1);
    }

    #[test]
    fn only_first_error_is_kept() {
        let (publisher, mut cursor) = channel::<u32>(CancelToken::new(), 4);
        publisher.signal_error(CursorError::producer("first"));
        publisher.signal_error(CursorError::producer("second"));
        assert!(!publisher.publish(1));
        assert!(!cursor.advance());
        assert_eq!(cursor.error().unwrap().to_string(), "first");
    }

    #[test]
    fn current_after_dispose_reports_disposed() {
        let (publisher, mut cursor) = channel::<u32>(CancelToken::new(), 2);
        assert!(publisher.publish(5));
        assert!(cursor.advance());
        cursor.dispose();
        assert!(matches!(cursor.current(), Err(CursorError::Disposed)));
        assert!(!cursor.advance());
        assert!(publisher.is_closed());
    }
}
