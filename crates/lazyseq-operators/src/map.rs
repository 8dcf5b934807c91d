//! Element-wise transforms.

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

/// Applies `f` to every upstream item. Created by [`map`].
pub struct Map<C, F, U> {
    upstream: C,
    f: F,
    state: CursorState<U>,
    disposed: bool,
}

pub fn map<C, F, U>(upstream: C, f: F) -> Map<C, F, U>
where
    C: Cursor,
    F: FnMut(&C::Item) -> Result<U>,
{
    Map {
        upstream,
        f,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, F, U> Cursor for Map<C, F, U>
where
    C: Cursor,
    F: FnMut(&C::Item) -> Result<U>,
{
    type Item = U;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        if !self.upstream.advance() {
            self.state.finish_from(self.upstream.error());
            return false;
        }
        match self.upstream.current().and_then(|item| (self.f)(item)) {
            Ok(value) => {
                self.state = CursorState::Positioned(value);
                true
            }
            Err(e) => {
                self.state.fail(e);
                false
            }
        }
    }

    fn current(&self) -> Result<&U> {
        self.state.current()
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

/// Transforms and filters in one pass: `Ok(None)` drops the item.
/// Created by [`filter_map`].
pub struct FilterMap<C, F, U> {
    upstream: C,
    f: F,
    state: CursorState<U>,
    disposed: bool,
}

pub fn filter_map<C, F, U>(upstream: C, f: F) -> FilterMap<C, F, U>
where
    C: Cursor,
    F: FnMut(&C::Item) -> Result<Option<U>>,
{
    FilterMap {
        upstream,
        f,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C, F, U> Cursor for FilterMap<C, F, U>
where
    C: Cursor,
    F: FnMut(&C::Item) -> Result<Option<U>>,
{
    type Item = U;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        while self.upstream.advance() {
            match self.upstream.current().and_then(|item| (self.f)(item)) {
                Ok(Some(value)) => {
                    self.state = CursorState::Positioned(value);
                    return true;
                }
                Ok(None) => continue,
                Err(e) => {
                    self.state.fail(e);
                    return false;
                }
            }
        }
        self.state.finish_from(self.upstream.error());
        false
    }

    fn current(&self) -> Result<&U> {
        self.state.current()
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
    use lazyseq_core::source::from_vec;

    #[test]
    fn map_error_latches_and_stops() {
        let mut m = map(from_vec(vec![1, 2, 3]), |x: &i32| {
            if *x == 2 {
                Err(CursorError::callback("bad item"))
            } else {
                Ok(x * 10)
            }
        });
        assert!(m.advance());
        assert_eq!(*m.current().unwrap(), 10);
        assert!(!m.advance());
        assert!(!m.advance());
        assert_eq!(m.error().unwrap().to_string(), "bad item");
    }

    #[test]
    fn filter_map_skips_none() {
        let mut m = filter_map(from_vec(vec![1, 2, 3, 4]), |x: &i32| {
            Ok((x % 2 == 0).then(|| x.to_string()))
        });
        let mut out = Vec::new();
        while m.advance() {
            out.push(m.current().unwrap().clone());
        }
        assert_eq!(out, vec!["2", "4"]);
        assert!(m.error().is_none());
    }
}
