//! Windowing combinators: cursors of cursors over contiguous sub-runs.
//!
//! The outer cursor owns the upstream cursor inside an `Rc<RefCell<_>>` shared
//! with the window handles it hands out. A window handle never disposes the
//! upstream; only the outer does, once, on its own disposal.
//!
//! Each outer window is identified by a generation number. Advancing the outer
//! drains whatever is left of the current generation, then bumps it; handles
//! from older generations report exhaustion without touching upstream.

pub mod chunk;
pub mod group;

pub use chunk::{chunk, chunk_by_count, Chunk, ChunkByCount, Window};
pub use group::{group_by, GroupBy, GroupWindow, Grouping};

use lazyseq_core::{Cursor, CursorError, Result};

/// One-level lookahead between adjacent windows.
#[derive(Debug)]
pub(crate) enum Lookahead<T> {
    /// Nothing read ahead; the next item comes from upstream.
    Empty,
    /// The item that closed the previous window, replayed first in the next.
    Buffering(T),
    /// Upstream ended (cleanly or with the error). No further windows.
    Closed(Option<CursorError>),
}

impl<T> Lookahead<T> {
    pub(crate) fn take(&mut self) -> Lookahead<T> {
        match self {
            Lookahead::Closed(err) => Lookahead::Closed(err.clone()),
            _ => std::mem::replace(self, Lookahead::Empty),
        }
    }

    pub(crate) fn close(&mut self, err: Option<CursorError>) {
        if !matches!(self, Lookahead::Closed(Some(_))) {
            *self = Lookahead::Closed(err);
        }
    }
}

/// Outcome of one pull from a window.
pub(crate) enum Step<T> {
    Item(T),
    End,
    Fail(CursorError),
}

impl<T> Step<T> {
    pub(crate) fn closed(err: Option<CursorError>) -> Self {
        match err {
            Some(e) => Step::Fail(e),
            None => Step::End,
        }
    }
}

/// Advance `upstream` and clone out its current item.
///
/// `Ok(None)` is a clean end, `Err` the upstream's latched error.
pub(crate) fn read_upstream<C>(upstream: &mut C) -> Result<Option<C::Item>>
where
    C: Cursor,
    C::Item: Clone,
{
    if upstream.advance() {
        upstream.current().map(|item| Some(item.clone()))
    } else {
        match upstream.error() {
            Some(e) => Err(e.clone()),
            None => Ok(None),
        }
    }
}
