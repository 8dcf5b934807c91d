//! Reduction helpers: drain a cursor into a container or a single value.
//!
//! Every helper owns the cursor it drains, disposes it exactly once, and stops
//! at the first error. On failure the error comes back together with whatever
//! had been accumulated so far.

use std::ops::Add;

use lazyseq_core::{Cursor, CursorError};
use thiserror::Error;

use crate::window::{GroupBy, Grouping};

pub use lazyseq_core::consume;

/// A reduction that stopped at an error, with the partial result.
#[derive(Debug, Error)]
#[error("reduction stopped early: {error}")]
pub struct PartialError<T> {
    pub partial: T,
    #[source]
    pub error: CursorError,
}

impl<T> PartialError<T> {
    pub fn into_parts(self) -> (T, CursorError) {
        (self.partial, self.error)
    }
}

/// Result of a reduction helper.
pub type Collected<T> = std::result::Result<T, PartialError<T>>;

/// One group materialized by [`collect_groups`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSlice<K, T> {
    pub key: K,
    pub items: Vec<T>,
}

/// Dispose `cursor` and fold its terminal error into the result.
fn settle<C: Cursor + ?Sized, T>(cursor: &mut C, acc: T, err: Option<CursorError>) -> Collected<T> {
    let err = err.or_else(|| cursor.error().cloned());
    cursor.dispose();
    match err {
        Some(error) => Err(PartialError {
            partial: acc,
            error,
        }),
        None => Ok(acc),
    }
}

/// Drain `cursor` into a vector, cloning each item out.
pub fn to_vec<C>(mut cursor: C) -> Collected<Vec<C::Item>>
where
    C: Cursor,
    C::Item: Clone,
{
    let (acc, err) = drain_into(&mut cursor);
    settle(&mut cursor, acc, err)
}

fn drain_into<C>(cursor: &mut C) -> (Vec<C::Item>, Option<CursorError>)
where
    C: Cursor + ?Sized,
    C::Item: Clone,
{
    let mut acc = Vec::new();
    while cursor.advance() {
        match cursor.current() {
            Ok(item) => acc.push(item.clone()),
            Err(e) => return (acc, Some(e)),
        }
    }
    (acc, cursor.error().cloned())
}

/// Drain a cursor of windows into one vector per window.
///
/// A window cut short by an error contributes the items it did yield.
pub fn collect_chunks<C, W>(mut cursor: C) -> Collected<Vec<Vec<W::Item>>>
where
    C: Cursor<Item = W>,
    W: Cursor + Clone,
    W::Item: Clone,
{
    let mut acc = Vec::new();
    let mut err = None;
    while cursor.advance() {
        let mut window = match cursor.current() {
            Ok(window) => window.clone(),
            Err(e) => {
                err = Some(e);
                break;
            }
        };
        let (items, window_err) = drain_into(&mut window);
        window.dispose();
        if window_err.is_none() || !items.is_empty() {
            acc.push(items);
        }
        if window_err.is_some() {
            err = window_err;
            break;
        }
    }
    settle(&mut cursor, acc, err)
}

/// Drain a [`GroupBy`] into keyed vectors, one per run.
pub fn collect_groups<C, K, F>(mut cursor: GroupBy<C, K, F>) -> Collected<Vec<GroupSlice<K, C::Item>>>
where
    C: Cursor,
    C::Item: Clone,
    K: PartialEq + Clone,
    F: FnMut(&C::Item) -> lazyseq_core::Result<K>,
{
    let mut acc = Vec::new();
    let mut err = None;
    while cursor.advance() {
        let Grouping { key, mut items } = match cursor.current() {
            Ok(grouping) => grouping.clone(),
            Err(e) => {
                err = Some(e);
                break;
            }
        };
        let (values, group_err) = drain_into(&mut items);
        items.dispose();
        if group_err.is_none() || !values.is_empty() {
            acc.push(GroupSlice { key, items: values });
        }
        if group_err.is_some() {
            err = group_err;
            break;
        }
    }
    settle(&mut cursor, acc, err)
}

/// Sum `selector(item)` over every item.
pub fn sum<C, S, F>(mut cursor: C, mut selector: F) -> Collected<S>
where
    C: Cursor,
    S: Default + Add<Output = S>,
    F: FnMut(&C::Item) -> S,
{
    let mut total = S::default();
    let mut err = None;
    while cursor.advance() {
        match cursor.current() {
            Ok(item) => total = total + selector(item),
            Err(e) => {
                err = Some(e);
                break;
            }
        }
    }
    settle(&mut cursor, total, err)
}
