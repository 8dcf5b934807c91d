//! Flattening: one inner cursor per upstream item.

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

/// Created by [`flat_map`]. Each inner cursor is disposed as soon as it is
/// exhausted; an inner error terminates the whole sequence.
pub struct FlatMap<C, F, D> {
    upstream: C,
    f: F,
    inner: Option<D>,
    state: CursorState<()>,
    disposed: bool,
}

pub fn flat_map<C, F, D>(upstream: C, f: F) -> FlatMap<C, F, D>
where
    C: Cursor,
    D: Cursor,
    F: FnMut(&C::Item) -> Result<D>,
{
    FlatMap {
        upstream,
        f,
        inner: None,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, F, D> FlatMap<C, F, D>
where
    C: Cursor,
    D: Cursor,
    F: FnMut(&C::Item) -> Result<D>,
{
    /// Dispose the current inner cursor, returning its error if it had one.
    fn retire_inner(&mut self) -> Option<CursorError> {
        let mut inner = self.inner.take()?;
        let err = inner.error().cloned();
        inner.dispose();
        err
    }
}

impl<C, F, D> Cursor for FlatMap<C, F, D>
where
    C: Cursor,
    D: Cursor,
    F: FnMut(&C::Item) -> Result<D>,
{
    type Item = D::Item;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        loop {
            if let Some(inner) = self.inner.as_mut() {
                if inner.advance() {
                    self.state = CursorState::Positioned(());
                    return true;
                }
                if let Some(e) = self.retire_inner() {
                    self.state.fail(e);
                    return false;
                }
            }

            if !self.upstream.advance() {
                self.state.finish_from(self.upstream.error());
                return false;
            }
            match self.upstream.current().and_then(|item| (self.f)(item)) {
                Ok(inner) => self.inner = Some(inner),
                Err(e) => {
                    self.state.fail(e);
                    return false;
                }
            }
        }
    }

    fn current(&self) -> Result<&D::Item> {
        self.state.current()?;
        match &self.inner {
            Some(inner) => inner.current(),
            None => Err(CursorError::Exhausted),
        }
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            if let Some(mut inner) = self.inner.take() {
                inner.dispose();
            }
            self.upstream.dispose();
        }
        self.state.finish();
    }
}
