#![forbid(unsafe_code)]
//! lazyseq-operators: combinators over `lazyseq_core::Cursor`.
//!
//! Design intent:
//! - Everything here is single-threaded and lazy; nothing reads ahead more
//!   than one item.
//! - Every combinator owns its upstream and disposes it exactly once.
//! - Errors pass through unchanged and are latched where they surface.

pub mod chain;
pub mod cleanup;
pub mod collect;
pub mod filter;
pub mod flat_map;
pub mod map;
pub mod traits;

pub mod merge;
pub mod window;

pub use chain::{chain, Chain};
pub use cleanup::{cleanup, Cleanup};
pub use collect::{collect_chunks, collect_groups, sum, to_vec, Collected, GroupSlice, PartialError};
pub use filter::{filter, skip_if, skip_while, take_while, Filter, SkipIf, SkipWhile, TakeWhile};
pub use flat_map::{flat_map, FlatMap};
pub use map::{filter_map, map, FilterMap, Map};
pub use merge::{interleave, Interleave};
pub use traits::CursorExt;
pub use window::{
    chunk, chunk_by_count, group_by, Chunk, ChunkByCount, GroupBy, GroupWindow, Grouping, Window,
};
