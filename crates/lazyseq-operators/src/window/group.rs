//! Run-length grouping over pre-ordered input.
//!
//! Each group is a maximal run of adjacent items with equal keys. Equal keys
//! separated by a different key form separate groups; nothing is re-sorted.

use std::cell::RefCell;
use std::rc::Rc;

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

use super::{read_upstream, Lookahead, Step};

struct GroupShared<C: Cursor, K, F> {
    upstream: C,
    key_of: F,
    /// The first item of the next run, with its key.
    lookahead: Lookahead<(K, C::Item)>,
    generation: u64,
    open: bool,
    key: Option<K>,
    /// Error that ended the current run, replayed to every handle of it.
    failed: Option<CursorError>,
    disposed: bool,
}

impl<C, K, F> GroupShared<C, K, F>
where
    C: Cursor,
    C::Item: Clone,
    K: PartialEq + Clone,
    F: FnMut(&C::Item) -> Result<K>,
{
    fn shut(&mut self, err: Option<CursorError>) -> Step<C::Item> {
        self.open = false;
        self.lookahead.close(err.clone());
        if err.is_some() {
            self.failed = err.clone();
        }
        Step::closed(err)
    }

    /// Read the next upstream item together with its key.
    fn read_keyed(&mut self) -> Result<Option<(K, C::Item)>> {
        match read_upstream(&mut self.upstream)? {
            Some(item) => {
                let key = (self.key_of)(&item)?;
                Ok(Some((key, item)))
            }
            None => Ok(None),
        }
    }

    fn next_in_window(&mut self) -> Step<C::Item> {
        if !self.open {
            return Step::closed(self.failed.clone());
        }

        match self.lookahead.take() {
            // Only ever present as the first item of a freshly opened run.
            Lookahead::Buffering((_, item)) => Step::Item(item),
            Lookahead::Closed(err) => self.shut(err),
            Lookahead::Empty => match self.read_keyed() {
                Ok(Some((key, item))) => {
                    if self.key.as_ref() == Some(&key) {
                        Step::Item(item)
                    } else {
                        self.lookahead = Lookahead::Buffering((key, item));
                        self.open = false;
                        Step::End
                    }
                }
                Ok(None) => self.shut(None),
                Err(e) => self.shut(Some(e)),
            },
        }
    }

    fn drain_window(&mut self) {
        while let Step::Item(_) = self.next_in_window() {}
    }

    fn open_window(&mut self) -> Step<(u64, K)> {
        if let Lookahead::Closed(err) = &self.lookahead {
            return Step::closed(err.clone());
        }
        if matches!(self.lookahead, Lookahead::Empty) {
            match self.read_keyed() {
                Ok(Some(keyed)) => self.lookahead = Lookahead::Buffering(keyed),
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

        let key = match &self.lookahead {
            Lookahead::Buffering((key, _)) => key.clone(),
            _ => return Step::End,
        };
        self.generation += 1;
        self.open = true;
        self.key = Some(key.clone());
        self.failed = None;
        #[cfg(feature = "tracing")]
        tracing::trace!(generation = self.generation, "group run opened");
        Step::Item((self.generation, key))
    }
}

/// One run of equal keys.
pub struct Grouping<C: Cursor, K, F> {
    pub key: K,
    pub items: GroupWindow<C, K, F>,
}

impl<C, K, F> Clone for Grouping<C, K, F>
where
    C: Cursor,
    C::Item: Clone,
    K: Clone,
{
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            items: self.items.clone(),
        }
    }
}

/// Cursor over the items of one group.
pub struct GroupWindow<C: Cursor, K, F> {
    shared: Rc<RefCell<GroupShared<C, K, F>>>,
    generation: u64,
    state: CursorState<C::Item>,
}

impl<C, K, F> Clone for GroupWindow<C, K, F>
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

/// Cursor of groupings. Created by [`group_by`].
pub struct GroupBy<C: Cursor, K, F> {
    shared: Rc<RefCell<GroupShared<C, K, F>>>,
    state: CursorState<Grouping<C, K, F>>,
}

pub fn group_by<C, K, F>(upstream: C, key_of: F) -> GroupBy<C, K, F>
where
    C: Cursor,
    C::Item: Clone,
    K: PartialEq + Clone,
    F: FnMut(&C::Item) -> Result<K>,
{
    GroupBy {
        shared: Rc::new(RefCell::new(GroupShared {
            upstream,
            key_of,
            lookahead: Lookahead::Empty,
            generation: 0,
            open: false,
            key: None,
            failed: None,
            disposed: false,
        })),
        state: CursorState::NotStarted,
    }
}

impl<C, K, F> Cursor for GroupBy<C, K, F>
where
    C: Cursor,
    C::Item: Clone,
    K: PartialEq + Clone,
    F: FnMut(&C::Item) -> Result<K>,
{
    type Item = Grouping<C, K, F>;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }

        let step = {
            let mut shared = self.shared.borrow_mut();
            if shared.disposed {
                Step::End
            } else {
                shared.drain_window();
                shared.open_window()
            }
        };

        match step {
            Step::Item((generation, key)) => {
                self.state = CursorState::Positioned(Grouping {
                    key,
                    items: GroupWindow {
                        shared: Rc::clone(&self.shared),
                        generation,
                        state: CursorState::NotStarted,
                    },
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

    fn current(&self) -> Result<&Grouping<C, K, F>> {
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

impl<C, K, F> Cursor for GroupWindow<C, K, F>
where
    C: Cursor,
    C::Item: Clone,
    K: PartialEq + Clone,
    F: FnMut(&C::Item) -> Result<K>,
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

    fn dispose(&mut self) {
        self.state.finish();
    }
}
