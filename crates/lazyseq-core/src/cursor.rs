//! The cursor protocol shared by every source and combinator.
//!
//! A cursor is single-pass and pull-based. Its consumer calls `advance` until
//! it returns `false`, reads `current` while positioned, checks `error` after
//! exhaustion, and finally calls `dispose`, which propagates upstream.
//!
//! Invariants every implementation upholds:
//! - `current` is only valid after `advance` returned `true`; otherwise it
//!   returns a protocol error (or the latched terminal error).
//! - Once an error is latched it is sticky and `advance` returns `false` forever.
//! - `dispose` is idempotent and releases everything the cursor owns,
//!   including wrapped upstream cursors.

use crate::error::{CursorError, Result};

pub trait Cursor {
    type Item;

    /// Move to the next item. Returns `false` on clean end, error, or after disposal.
    fn advance(&mut self) -> bool;

    /// The item the cursor is positioned on.
    fn current(&self) -> Result<&Self::Item>;

    /// The terminal error, once latched.
    fn error(&self) -> Option<&CursorError>;

    /// Release this cursor and everything it owns. Idempotent.
    fn dispose(&mut self);
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> Result<&Self::Item> {
        (**self).current()
    }

    fn error(&self) -> Option<&CursorError> {
        (**self).error()
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> Result<&Self::Item> {
        (**self).current()
    }

    fn error(&self) -> Option<&CursorError> {
        (**self).error()
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}

/// Boxed, type-erased cursor for heterogeneous pipelines.
pub type BoxCursor<'a, T> = Box<dyn Cursor<Item = T> + 'a>;

/// Lifecycle of a cursor.
///
/// `Positioned` carries whatever the cursor needs to answer `current`: the
/// item itself, or `()`/an index when the item lives in an upstream cursor.
#[derive(Debug, Clone)]
pub enum CursorState<T> {
    NotStarted,
    Positioned(T),
    Exhausted(Option<CursorError>),
}

impl<T> Default for CursorState<T> {
    fn default() -> Self {
        CursorState::NotStarted
    }
}

impl<T> CursorState<T> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CursorState::Exhausted(_))
    }

    pub fn is_positioned(&self) -> bool {
        matches!(self, CursorState::Positioned(_))
    }

    /// The positioned value, or the error explaining why there is none.
    pub fn current(&self) -> Result<&T> {
        match self {
            CursorState::Positioned(v) => Ok(v),
            CursorState::NotStarted => Err(CursorError::NotStarted),
            CursorState::Exhausted(Some(e)) => Err(e.clone()),
            CursorState::Exhausted(None) => Err(CursorError::Exhausted),
        }
    }

    pub fn error(&self) -> Option<&CursorError> {
        match self {
            CursorState::Exhausted(Some(e)) => Some(e),
            _ => None,
        }
    }

    /// Latch a clean end. Keeps an error that is already latched.
    pub fn finish(&mut self) {
        if !matches!(self, CursorState::Exhausted(Some(_))) {
            *self = CursorState::Exhausted(None);
        }
    }

    /// Latch `err` unless an earlier error is already latched.
    pub fn fail(&mut self, err: CursorError) {
        if !matches!(self, CursorState::Exhausted(Some(_))) {
            *self = CursorState::Exhausted(Some(err));
        }
    }

    /// Latch the terminal state reported by an upstream cursor that stopped.
    pub fn finish_from(&mut self, upstream_error: Option<&CursorError>) {
        match upstream_error {
            Some(e) => self.fail(e.clone()),
            None => self.finish(),
        }
    }
}

/// Drain `cursor` to exhaustion, dispose it, and return its terminal error.
pub fn consume<C: Cursor + ?Sized>(cursor: &mut C) -> Result<()> {
    while cursor.advance() {}
    let outcome = match cursor.error() {
        Some(e) => Err(e.clone()),
        None => Ok(()),
    };
    cursor.dispose();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_reports_protocol_errors() {
        let state: CursorState<u32> = CursorState::NotStarted;
        assert!(matches!(state.current(), Err(CursorError::NotStarted)));

        let mut state = CursorState::Positioned(7u32);
        assert_eq!(*state.current().unwrap(), 7);

        state.finish();
        assert!(matches!(state.current(), Err(CursorError::Exhausted)));
        assert!(state.error().is_none());
    }

    #[test]
    fn first_error_is_sticky() {
        let mut state: CursorState<u32> = CursorState::NotStarted;
        state.fail(CursorError::callback("first"));
        state.fail(CursorError::callback("second"));
        state.finish();
        assert_eq!(state.error().unwrap().to_string(), "first");
        assert_eq!(state.current().unwrap_err().to_string(), "first");
    }
}
