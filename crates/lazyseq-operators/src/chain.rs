//! Concatenation of cursors with the same item type.

use lazyseq_core::{Cursor, CursorError, CursorState, Result};

/// Created by [`chain`]. Sources are drained in order; each is disposed as
/// soon as it is exhausted. The first source error ends the chain.
pub struct Chain<C> {
    sources: Vec<C>,
    /// Index of the source currently being read.
    index: usize,
    state: CursorState<()>,
    disposed: bool,
}

pub fn chain<C: Cursor>(sources: Vec<C>) -> Chain<C> {
    Chain {
        sources,
        index: 0,
        state: CursorState::NotStarted,
        disposed: false,
    }
}

impl<C: Cursor> Cursor for Chain<C> {
    type Item = C::Item;

    fn advance(&mut self) -> bool {
        if self.state.is_exhausted() {
            return false;
        }
        while let Some(source) = self.sources.get_mut(self.index) {
            if source.advance() {
                self.state = CursorState::Positioned(());
                return true;
            }
            let err = source.error().cloned();
            source.dispose();
            self.index += 1;
            if let Some(e) = err {
                self.state.fail(e);
                return false;
            }
        }
        self.state.finish();
        false
    }

    fn current(&self) -> Result<&C::Item> {
        self.state.current()?;
        match self.sources.get(self.index) {
            Some(source) => source.current(),
            None => Err(CursorError::Exhausted),
        }
    }

    fn error(&self) -> Option<&CursorError> {
        self.state.error()
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            // Sources before `index` were disposed when they ran out.
            for source in self.sources.iter_mut().skip(self.index) {
                source.dispose();
            }
            self.index = self.sources.len();
        }
        self.state.finish();
    }
}
