//! Multi-source combinators.

pub mod interleave;

pub use interleave::{interleave, Interleave};
