//! Leaf sources: cursors that own their data instead of wrapping an upstream.

use std::collections::VecDeque;

use crate::cursor::{Cursor, CursorState};
use crate::error::{CursorError, Result};

/// Cursor over an owned vector.
pub struct VecSource<T> {
    items: VecDeque<T>,
    state: CursorState<T>,
}

pub fn from_vec<T>(items: Vec<T>) -> VecSource<T> {
    VecSource {
        items: items.into(),
        state: CursorState::NotStarted,
    }
}

impl<T> VecSource<T> {
    /// Items not yet yielded.
    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> Cursor for VecSource<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        match self.items.pop_front() {
            Some(item) => {
                self.state = CursorState::Positioned(item);
                true
            }
            None => {
                self.state.finish();
                false
            }
        }
    }

    fn current(&self) -> Result<&T> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        self.items.clear();
        self.state.finish();
    }
}

/// Cursor over any iterator.
pub struct IterSource<I: Iterator> {
    iter: Option<I>,
    state: CursorState<I::Item>,
}

pub fn from_iter<I: IntoIterator>(iter: I) -> IterSource<I::IntoIter> {
    IterSource {
        iter: Some(iter.into_iter()),
        state: CursorState::NotStarted,
    }
}

impl<I: Iterator> Cursor for IterSource<I> {
    type Item = I::Item;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        match self.iter.as_mut().and_then(Iterator::next) {
            Some(item) => {
                self.state = CursorState::Positioned(item);
                true
            }
            None => {
                self.iter = None;
                self.state.finish();
                false
            }
        }
    }

    fn current(&self) -> Result<&I::Item> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        self.iter = None;
        self.state.finish();
    }
}

/// `count` items produced by `factory(start)`, `factory(start + 1)`, ...
pub struct Range<T, F> {
    next: usize,
    end: usize,
    factory: F,
    state: CursorState<T>,
}

pub fn range<T, F>(start: usize, count: usize, factory: F) -> Range<T, F>
where
    F: FnMut(usize) -> T,
{
    Range {
        next: start,
        end: start.saturating_add(count),
        factory,
        state: CursorState::NotStarted,
    }
}

impl<T, F> Cursor for Range<T, F>
where
    F: FnMut(usize) -> T,
{
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        if self.next < self.end {
            let item = (self.factory)(self.next);
            self.next += 1;
            self.state = CursorState::Positioned(item);
            true
        } else {
            self.state.finish();
            false
        }
    }

    fn current(&self) -> Result<&T> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        self.next = self.end;
        self.state.finish();
    }
}

/// A cursor with no items.
pub struct Empty<T> {
    state: CursorState<T>,
}

pub fn empty<T>() -> Empty<T> {
    Empty {
        state: CursorState::NotStarted,
    }
}

impl<T> Cursor for Empty<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        self.state.finish();
        false
    }

    fn current(&self) -> Result<&T> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        None
    }

    fn dispose(&mut self) {
        self.state.finish();
    }
}

/// A cursor that is exhausted from the start with `err` latched.
pub struct Fail<T> {
    state: CursorState<T>,
}

pub fn fail<T>(err: CursorError) -> Fail<T> {
    Fail {
        state: CursorState::Exhausted(Some(err)),
    }
}

impl<T> Cursor for Fail<T> {
    type Item = T;

    fn advance(&mut self) -> bool {
        false
    }

    fn current(&self) -> Result<&T> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {}
}

/// Closure-driven source: `next` returns `Ok(Some(item))`, `Ok(None)` at the
/// end, or an error that terminates the sequence.
pub struct Generator<T, N, D = fn()>
where
    D: FnOnce(),
{
    next: N,
    on_dispose: Option<D>,
    disposed: bool,
    state: CursorState<T>,
}

pub fn generate<T, N>(next: N) -> Generator<T, N>
where
    N: FnMut() -> Result<Option<T>>,
{
    Generator {
        next,
        on_dispose: None,
        disposed: false,
        state: CursorState::NotStarted,
    }
}

/// Like [`generate`], running `on_dispose` exactly once when disposed or dropped.
pub fn generate_with_dispose<T, N, D>(next: N, on_dispose: D) -> Generator<T, N, D>
where
    N: FnMut() -> Result<Option<T>>,
    D: FnOnce(),
{
    Generator {
        next,
        on_dispose: Some(on_dispose),
        disposed: false,
        state: CursorState::NotStarted,
    }
}

impl<T, N, D> Cursor for Generator<T, N, D>
where
    N: FnMut() -> Result<Option<T>>,
    D: FnOnce(),
{
    type Item = T;

    fn advance(&mut self) -> bool {
        if self.disposed || self.state.is_exhausted() {
            return false;
        }
        match (self.next)() {
            Ok(Some(item)) => {
                self.state = CursorState::Positioned(item);
                true
            }
            Ok(None) => {
                self.state.finish();
                false
            }
            Err(e) => {
                self.state.fail(e);
                false
            }
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
        self.state.finish();
        if let Some(on_dispose) = self.on_dispose.take() {
            on_dispose();
        }
    }
}

impl<T, N, D> Drop for Generator<T, N, D>
where
    D: FnOnce(),
{
    fn drop(&mut self) {
        if let Some(on_dispose) = self.on_dispose.take() {
            on_dispose();
        }
    }
}
