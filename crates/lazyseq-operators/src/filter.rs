//! Predicate-driven combinators. None of them store items: `current` reads
//! through to the upstream's current value.

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

/// Advance `upstream` to the next item `accept` takes.
fn advance_where<C, P>(upstream: &mut C, state: &mut CursorState<()>, mut accept: P) -> bool
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    if state.is_exhausted() {
        return false;
    }
    while upstream.advance() {
        match upstream.current() {
            Ok(item) => {
                if accept(item) {
                    *state = CursorState::Positioned(());
                    return true;
                }
            }
            Err(e) => {
                state.fail(e);
                return false;
            }
        }
    }
    state.finish_from(upstream.error());
    false
}

fn read_through<'a, C: Cursor>(upstream: &'a C, state: &CursorState<()>) -> Result<&'a C::Item> {
    state.current()?;
    upstream.current()
}

/// Keeps items matching the predicate. Created by [`filter`].
pub struct Filter<C, P> {
    upstream: C,
    predicate: P,
    state: CursorState<()>,
    disposed: bool,
}

pub fn filter<C, P>(upstream: C, predicate: P) -> Filter<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    Filter {
        upstream,
        predicate,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, P> Cursor for Filter<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        let predicate = &mut self.predicate;
        advance_where(&mut self.upstream, &mut self.state, |item| predicate(item))
    }

    fn current(&self) -> Result<&C::Item> {
        read_through(&self.upstream, &self.state)
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.upstream.dispose();
        }
        self.state.finish();
    }
}

/// Drops items matching the predicate. Created by [`skip_if`].
pub struct SkipIf<C, P> {
    upstream: C,
    predicate: P,
    state: CursorState<()>,
    disposed: bool,
}

pub fn skip_if<C, P>(upstream: C, predicate: P) -> SkipIf<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    SkipIf {
        upstream,
        predicate,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, P> Cursor for SkipIf<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        let predicate = &mut self.predicate;
        advance_where(&mut self.upstream, &mut self.state, |item| !predicate(item))
    }

    fn current(&self) -> Result<&C::Item> {
        read_through(&self.upstream, &self.state)
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.upstream.dispose();
        }
        self.state.finish();
    }
}

/// Yields the longest prefix matching the predicate. Created by [`take_while`].
///
/// The first rejected item ends the sequence; it is consumed from upstream
/// but never yielded.
pub struct TakeWhile<C, P> {
    upstream: C,
    predicate: P,
    state: CursorState<()>,
    disposed: bool,
}

pub fn take_while<C, P>(upstream: C, predicate: P) -> TakeWhile<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    TakeWhile {
        upstream,
        predicate,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, P> Cursor for TakeWhile<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        if !self.upstream.advance() {
            self.state.finish_from(self.upstream.error());
            return false;
        }
        match self.upstream.current() {
            Ok(item) if (self.predicate)(item) => {
                self.state = CursorState::Positioned(());
                true
            }
            Ok(_) => {
                self.state.finish();
                false
            }
            Err(e) => {
                self.state.fail(e);
                false
            }
        }
    }

    fn current(&self) -> Result<&C::Item> {
        read_through(&self.upstream, &self.state)
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.upstream.dispose();
        }
        self.state.finish();
    }
}

/// Skips the longest prefix matching the predicate, then yields everything.
/// Created by [`skip_while`].
pub struct SkipWhile<C, P> {
    upstream: C,
    predicate: P,
    skipping: bool,
    state: CursorState<()>,
    disposed: bool,
}

pub fn skip_while<C, P>(upstream: C, predicate: P) -> SkipWhile<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    SkipWhile {
        upstream,
        predicate,
        skipping: true,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, P> Cursor for SkipWhile<C, P>
where
    C: Cursor,
    P: FnMut(&C::Item) -> bool,
{
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        let predicate = &mut self.predicate;
        let skipping = &mut self.skipping;
        advance_where(&mut self.upstream, &mut self.state, |item| {
            if *skipping && predicate(item) {
                return false;
            }
            *skipping = false;
            true
        })
    }

    fn current(&self) -> Result<&C::Item> {
        read_through(&self.upstream, &self.state)
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.upstream.dispose();
        }
        self.state.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyseq_core::source::{from_vec, generate};

    fn drain<C: Cursor<Item = i32>>(mut c: C) -> Vec<i32> {
        let mut out = Vec::new();
        while c.advance() {
            out.push(*c.current().unwrap());
        }
        out
    }

    #[test]
    fn take_while_stops_at_first_rejection() {
        let c = take_while(from_vec(vec![1, 2, 5, 1, 2]), |x| *x < 3);
        assert_eq!(drain(c), vec![1, 2]);
    }

    #[test]
    fn skip_while_yields_suffix_including_later_matches() {
        let c = skip_while(from_vec(vec![1, 2, 5, 1, 2]), |x| *x < 3);
        assert_eq!(drain(c), vec![5, 1, 2]);
    }

    #[test]
    fn filter_and_skip_if_partition() {
        let kept = drain(filter(from_vec(vec![1, 2, 3, 4, 5]), |x| x % 2 == 1));
        let dropped = drain(skip_if(from_vec(vec![1, 2, 3, 4, 5]), |x| x % 2 == 1));
        assert_eq!(kept, vec![1, 3, 5]);
        assert_eq!(dropped, vec![2, 4]);
    }

    #[test]
    fn filter_passes_upstream_error_through() {
        let mut n = 0;
        let source = generate(move || {
            n += 1;
            if n == 3 {
                Err(CursorError::source("disk gone"))
            } else {
                Ok(Some(n))
            }
        });
        let mut c = filter(source, |_| true);
        assert!(c.advance());
        assert!(c.advance());
        assert!(!c.advance());
        assert_eq!(c.error().unwrap().to_string(), "disk gone");
        assert_eq!(c.current().unwrap_err().to_string(), "disk gone");
    }

    #[test]
    fn current_before_advance_is_not_started() {
        let c = filter(from_vec(vec![1]), |_| true);
        assert!(matches!(c.current(), Err(CursorError::NotStarted)));
    }
}
