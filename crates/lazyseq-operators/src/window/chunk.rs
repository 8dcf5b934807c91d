//! Size-bounded chunking.
//!
//! Splits upstream into windows whose cumulative size stays within `target`.
//! An item that would push a non-empty window past the target closes it and
//! becomes the first item of the next window. An item larger than the target
//! on its own still forms a one-item window.

use std::cell::RefCell;
use std::ops::{Add, Sub};
use std::rc::Rc;

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

use super::{read_upstream, Lookahead, Step};

/// Buffered boundary item plus its size, once computed.
struct Pending<T, S> {
    item: T,
    size: Option<S>,
}

struct ChunkShared<C: Cursor, S, F> {
    upstream: C,
    target: S,
    size_of: F,
    lookahead: Lookahead<Pending<C::Item, S>>,
    generation: u64,
    open: bool,
    cumulative: S,
    count: usize,
    /// Error that ended the current generation, replayed to every handle of it.
    failed: Option<CursorError>,
    disposed: bool,
}

impl<C, S, F> ChunkShared<C, S, F>
where
    C: Cursor,
    C::Item: Clone,
    S: Copy + PartialOrd + Add<Output = S> + Sub<Output = S> + Default,
    F: FnMut(&C::Item) -> Result<S>,
{
    fn shut(&mut self, err: Option<CursorError>) -> Step<C::Item> {
        self.open = false;
        self.lookahead.close(err.clone());
        if err.is_some() {
            self.failed = err.clone();
        }
        Step::closed(err)
    }

    /// Pull the next item of the open window.
    fn next_in_window(&mut self) -> Step<C::Item> {
        if !self.open {
            return Step::closed(self.failed.clone());
        }

        let (item, size) = match self.lookahead.take() {
            Lookahead::Buffering(p) => (p.item, p.size),
            Lookahead::Closed(err) => return self.shut(err),
            Lookahead::Empty => match read_upstream(&mut self.upstream) {
                Ok(Some(item)) => (item, None),
                Ok(None) => return self.shut(None),
                Err(e) => return self.shut(Some(e)),
            },
        };

        let size = match size {
            Some(s) => s,
            None => match (self.size_of)(&item) {
                Ok(s) => s,
                Err(e) => return self.shut(Some(e)),
            },
        };

        // The count guard keeps an oversized item from producing empty windows forever.
        // Compared against the remaining room so the sum never overflows `S`.
        if self.count > 0
            && (self.cumulative > self.target || size > self.target - self.cumulative)
        {
            self.lookahead = Lookahead::Buffering(Pending {
                item,
                size: Some(size),
            });
            self.open = false;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                generation = self.generation,
                items = self.count,
                "chunk window closed at target"
            );
            return Step::End;
        }

        self.cumulative = self.cumulative + size;
        self.count += 1;
        Step::Item(item)
    }

    fn drain_window(&mut self) {
        while let Step::Item(_) = self.next_in_window() {}
    }

    /// Start the next generation. Reads ahead one item when nothing is buffered
    /// so an exhausted upstream yields no trailing empty window.
    fn open_window(&mut self) -> Step<u64> {
        if let Lookahead::Closed(err) = &self.lookahead {
            return Step::closed(err.clone());
        }
        if matches!(self.lookahead, Lookahead::Empty) {
            match read_upstream(&mut self.upstream) {
                Ok(Some(item)) => {
                    self.lookahead = Lookahead::Buffering(Pending { item, size: None });
                }
                Ok(None) => {
                    self.lookahead.close(None);
                    return Step::End;
                }
                Err(e) => {
                    self.lookahead.close(Some(e.clone()));
                    return Step::Fail(e);
                }
            }
        }

        self.generation += 1;
        self.open = true;
        self.cumulative = S::default();
        self.count = 0;
        self.failed = None;
        #[cfg(feature = "tracing")]
        tracing::trace!(generation = self.generation, "chunk window opened");
        Step::Item(self.generation)
    }
}

/// Cursor of size-bounded windows. Created by [`chunk`].
pub struct Chunk<C: Cursor, S, F> {
    shared: Rc<RefCell<ChunkShared<C, S, F>>>,
    state: CursorState<Window<C, S, F>>,
}

/// One chunk: a cursor over a contiguous run of upstream items.
///
/// Handles are cheap to clone and share the window's progress; each handle
/// keeps its own `current` item.
pub struct Window<C: Cursor, S, F> {
    shared: Rc<RefCell<ChunkShared<C, S, F>>>,
    generation: u64,
    state: CursorState<C::Item>,
}

/// Chunk windows of at most `count` items.
pub type ChunkByCount<C> = Chunk<C, usize, fn(&<C as Cursor>::Item) -> Result<usize>>;

pub fn chunk<C, S, F>(upstream: C, target: S, size_of: F) -> Chunk<C, S, F>
where
    C: Cursor,
    C::Item: Clone,
    S: Copy + PartialOrd + Add<Output = S> + Sub<Output = S> + Default,
    F: FnMut(&C::Item) -> Result<S>,
{
    Chunk {
        shared: Rc::new(RefCell::new(ChunkShared {
            upstream,
            target,
            size_of,
            lookahead: Lookahead::Empty,
            generation: 0,
            open: false,
            cumulative: S::default(),
            count: 0,
            failed: None,
            disposed: false,
        })),
        state: CursorState::NotStarted,
    }
}

fn count_one<T>(_: &T) -> Result<usize> {
    Ok(1)
}

pub fn chunk_by_count<C>(upstream: C, count: usize) -> ChunkByCount<C>
where
    C: Cursor,
    C::Item: Clone,
{
    chunk(
        upstream,
        count,
        count_one::<C::Item> as fn(&C::Item) -> Result<usize>,
    )
}

impl<C, S, F> Cursor for Chunk<C, S, F>
where
    C: Cursor,
    C::Item: Clone,
    S: Copy + PartialOrd + Add<Output = S> + Sub<Output = S> + Default,
    F: FnMut(&C::Item) -> Result<S>,
{
    type Item = Window<C, S, F>;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }

        let step = {
            let mut shared = self.shared.borrow_mut();
            if shared.disposed {
                Step::End
            } else {
                // Skipping a window means draining it; upstream must sit on the boundary.
                shared.drain_window();
                shared.open_window()
            }
        };

        match step {
            Step::Item(generation) => {
                self.state = CursorState::Positioned(Window {
                    shared: Rc::clone(&self.shared),
                    generation,
                    state: CursorState::NotStarted,
                });
                true
            }
            Step::End => {
                self.state.finish();
                false
            }
            Step::Fail(e) => {
                self.state.fail(e);
                false
            }
        }
    }

    fn current(&self) -> Result<&Window<C, S, F>> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        {
            let mut shared = self.shared.borrow_mut();
            if !shared.disposed {
                shared.disposed = true;
                shared.open = false;
                shared.lookahead.close(None);
                shared.upstream.dispose();
            }
        }
        self.state.finish();
    }
}

impl<C, S, F> Cursor for Window<C, S, F>
where
    C: Cursor,
    C::Item: Clone,
    S: Copy + PartialOrd + Add<Output = S> + Sub<Output = S> + Default,
    F: FnMut(&C::Item) -> Result<S>,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }

        let step = {
            let mut shared = self.shared.borrow_mut();
            if shared.disposed || shared.generation != self.generation {
                Step::End
            } else {
                shared.next_in_window()
            }
        };

        match step {
            Step::Item(item) => {
                self.state = CursorState::Positioned(item);
                true
            }
            Step::End => {
                self.state.finish();
                false
            }
            Step::Fail(e) => {
                self.state.fail(e);
                false
            }
        }
    }

    fn current(&self) -> Result<&C::Item> {
        self.state.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    /// Only this handle is released; the shared upstream belongs to the outer cursor.
    fn dispose(&mut self) {
        self.state.finish();
    }
}

impl<C, S, F> Clone for Window<C, S, F>
where
    C: Cursor,
    C::Item: Clone,
{
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            generation: self.generation,
            state: self.state.clone(),
        }
    }
}

impl<C: Cursor, S, F> Window<C, S, F> {
    /// Generation number of this window (1-based, increasing per window).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
