//! Ordered k-way merge of key-ordered cursors.
//!
//! Precondition: every source yields items in non-decreasing key order.
//! The heap holds at most one `(key, source)` entry per live source; the item
//! itself stays as that source's current value, so nothing is cloned.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

/// Entry in the merge heap.
///
/// Ordered by `(key, source)` reversed for min-heap behavior: the smallest key
/// pops first and equal keys pop in source order.
#[derive(Debug)]
struct MergeEntry<K> {
    key: K,
    source: usize,
}

impl<K: Ord> PartialEq for MergeEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for MergeEntry<K> {}

impl<K: Ord> PartialOrd for MergeEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for MergeEntry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Merging cursor. Created by [`interleave`].
pub struct Interleave<C, K, F> {
    sources: Vec<C>,
    key_of: F,
    heap: BinaryHeap<MergeEntry<K>>,
    /// `Positioned(i)`: the output item is `sources[i].current()`.
    state: CursorState<usize>,
    disposed: bool,
}

pub fn interleave<C, K, F>(sources: Vec<C>, key_of: F) -> Interleave<C, K, F>
where
    C: Cursor,
    K: Ord,
    F: FnMut(&C::Item) -> Result<K>,
{
    let heap = BinaryHeap::with_capacity(sources.len());
    Interleave {
        sources,
        key_of,
        heap,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, K, F> Interleave<C, K, F>
where
    C: Cursor,
    K: Ord,
    F: FnMut(&C::Item) -> Result<K>,
{
    /// Advance source `index` and push its new head, if any.
    fn refill(&mut self, index: usize) -> Result<()> {
        let source = &mut self.sources[index];
        if source.advance() {
            let key = (self.key_of)(source.current()?)?;
            self.heap.push(MergeEntry { key, source: index });
            Ok(())
        } else {
            match source.error() {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    fn prime(&mut self) -> Result<()> {
        for index in 0..self.sources.len() {
            self.refill(index)?;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            sources = self.sources.len(),
            live = self.heap.len(),
            "interleave primed"
        );
        Ok(())
    }

    /// Sources with a pending head, counting the one currently being emitted.
    pub fn live_sources(&self) -> usize {
        self.heap.len() + usize::from(self.state.is_positioned())
    }
}

impl<C, K, F> Cursor for Interleave<C, K, F>
where
    C: Cursor,
    K: Ord,
    F: FnMut(&C::Item) -> Result<K>,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        // The source that produced the previous item is advanced lazily, here,
        // so its current value stays readable until the consumer moves on.
        let outcome = match &self.state {
            CursorState::Exhausted(_) => return false,
            CursorState::NotStarted => self.prime(),
            CursorState::Positioned(index) => {
                let index = *index;
                self.refill(index)
            }
        };

        if let Err(e) = outcome {
            self.heap.clear();
            self.state.fail(e);
            return false;
        }

        match self.heap.pop() {
            Some(entry) => {
                self.state = CursorState::Positioned(entry.source);
                true
            }
            None => {
                self.state.finish();
                false
            }
        }
    }

    fn current(&self) -> Result<&C::Item> {
        let index = *self.state.current()?;
        self.sources[index].current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for source in &mut self.sources {
            source.dispose();
        }
        self.heap.clear();
        self.state.finish();
    }
}
