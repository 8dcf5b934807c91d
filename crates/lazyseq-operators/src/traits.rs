//! Method-call surface for building pipelines.
//!
//! `CursorExt` is blanket-implemented for every [`Cursor`], so combinators
//! chain left to right: `source.filter(..).map(..).chunk(..)`.

use std::ops::{Add, Sub};

use lazyseq_core::{BoxCursor, Cursor, Result};

use crate::chain::{chain, Chain};
use crate::cleanup::{cleanup, Cleanup};
use crate::collect::{self, Collected};
use crate::filter::{filter, skip_if, skip_while, take_while, Filter, SkipIf, SkipWhile, TakeWhile};
use crate::flat_map::{flat_map, FlatMap};
use crate::map::{filter_map, map, FilterMap, Map};
use crate::window::{chunk, chunk_by_count, group_by, Chunk, ChunkByCount, GroupBy};

pub trait CursorExt: Cursor + Sized {
    fn map<U, F>(self, f: F) -> Map<Self, F, U>
    where
        F: FnMut(&Self::Item) -> Result<U>,
    {
        map(self, f)
    }

    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        filter(self, predicate)
    }

    fn skip_if<P>(self, predicate: P) -> SkipIf<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        skip_if(self, predicate)
    }

    fn filter_map<U, F>(self, f: F) -> FilterMap<Self, F, U>
    where
        F: FnMut(&Self::Item) -> Result<Option<U>>,
    {
        filter_map(self, f)
    }

    fn flat_map<D, F>(self, f: F) -> FlatMap<Self, F, D>
    where
        D: Cursor,
        F: FnMut(&Self::Item) -> Result<D>,
    {
        flat_map(self, f)
    }

    fn take_while<P>(self, predicate: P) -> TakeWhile<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        take_while(self, predicate)
    }

    fn skip_while<P>(self, predicate: P) -> SkipWhile<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        skip_while(self, predicate)
    }

    /// `self` followed by `next`.
    fn chain_with(self, next: Self) -> Chain<Self> {
        chain(vec![self, next])
    }

    fn chunk<S, F>(self, target: S, size_of: F) -> Chunk<Self, S, F>
    where
        Self::Item: Clone,
        S: Copy + PartialOrd + Add<Output = S> + Sub<Output = S> + Default,
        F: FnMut(&Self::Item) -> Result<S>,
    {
        chunk(self, target, size_of)
    }

    fn chunk_by_count(self, count: usize) -> ChunkByCount<Self>
    where
        Self::Item: Clone,
    {
        chunk_by_count(self, count)
    }

    fn group_by<K, F>(self, key_of: F) -> GroupBy<Self, K, F>
    where
        Self::Item: Clone,
        K: PartialEq + Clone,
        F: FnMut(&Self::Item) -> Result<K>,
    {
        group_by(self, key_of)
    }

    fn cleanup<F: FnOnce()>(self, on_dispose: F) -> Cleanup<Self, F> {
        cleanup(self, on_dispose)
    }

    fn boxed<'a>(self) -> BoxCursor<'a, Self::Item>
    where
        Self: 'a,
    {
        Box::new(self)
    }

    fn to_vec(self) -> Collected<Vec<Self::Item>>
    where
        Self::Item: Clone,
    {
        collect::to_vec(self)
    }

    fn sum_by<S, F>(self, selector: F) -> Collected<S>
    where
        S: Default + Add<Output = S>,
        F: FnMut(&Self::Item) -> S,
    {
        collect::sum(self, selector)
    }
}

impl<C: Cursor> CursorExt for C {}
