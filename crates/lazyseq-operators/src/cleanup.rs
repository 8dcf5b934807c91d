//! Disposal decorator.

use lazyseq_core::{Cursor, CursorError, Result};

/// Created by [`cleanup`]. On dispose (or drop), disposes upstream and then
/// runs the callback, exactly once.
pub struct Cleanup<C: Cursor, F: FnOnce()> {
    upstream: C,
    on_dispose: Option<F>,
}

pub fn cleanup<C: Cursor, F: FnOnce()>(upstream: C, on_dispose: F) -> Cleanup<C, F> {
    Cleanup {
        upstream,
        on_dispose: Some(on_dispose),
    }
}

impl<C: Cursor, F: FnOnce()> Cursor for Cleanup<C, F> {
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        self.on_dispose.is_some() && self.upstream.advance()
    }

    fn current(&self) -> Result<&C::Item> {
        self.upstream.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.upstream.error()
    }

    fn dispose(&mut self) {
        if let Some(on_dispose) = self.on_dispose.take() {
            self.upstream.dispose();
            on_dispose();
        }
    }
}

impl<C: Cursor, F: FnOnce()> Drop for Cleanup<C, F> {
    fn drop(&mut self) {
        self.dispose();
    }
}
