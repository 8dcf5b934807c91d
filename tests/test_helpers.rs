//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use lazyseq::lazyseq_core::source::{from_vec, generate, VecSource};
use lazyseq::{Cursor, CursorError, Result};

/// Wraps a cursor and counts `dispose` calls.
pub struct Tracked<C> {
    inner: C,
    disposals: Rc<Cell<usize>>,
}

pub fn tracked<C: Cursor>(inner: C) -> (Tracked<C>, Rc<Cell<usize>>) {
    let disposals = Rc::new(Cell::new(0));
    (
        Tracked {
            inner,
            disposals: Rc::clone(&disposals),
        },
        disposals,
    )
}

impl<C: Cursor> Cursor for Tracked<C> {
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        self.inner.advance()
    }

    fn current(&self) -> Result<&C::Item> {
        self.inner.current()
    }

    fn error(&self) -> Option<&CursorError> {
        self.inner.error()
    }

    fn dispose(&mut self) {
        self.disposals.set(self.disposals.get() + 1);
        self.inner.dispose();
    }
}

pub fn ints(values: &[i32]) -> VecSource<i32> {
    from_vec(values.to_vec())
}

pub fn identity(x: &i32) -> Result<i32> {
    Ok(*x)
}

/// Yields `items`, then fails with `message`.
pub fn fails_after(items: Vec<i32>, message: &'static str) -> impl Cursor<Item = i32> {
    let mut items = items.into_iter();
    generate(move || match items.next() {
        Some(item) => Ok(Some(item)),
        None => Err(CursorError::source(message)),
    })
}

/// Advance to exhaustion, cloning every item out. Does not dispose.
pub fn drain<C>(cursor: &mut C) -> Vec<C::Item>
where
    C: Cursor,
    C::Item: Clone,
{
    let mut out = Vec::new();
    while cursor.advance() {
        out.push(cursor.current().expect("positioned cursor has a current item").clone());
    }
    out
}
