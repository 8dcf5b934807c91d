#![forbid(unsafe_code)]
//! lazyseq: lazy, single-pass cursors.
//!
//! Facade over the workspace crates:
//! - `lazyseq_core`: the `Cursor` protocol, errors, configuration and leaf sources.
//! - `lazyseq_operators`: chunking, grouping, k-way merge and the stateless combinators.
//! - `lazyseq_exec`: the producer/consumer channel bridge and cancellation.

pub use lazyseq_core;
pub use lazyseq_exec;
pub use lazyseq_operators;

pub use lazyseq_core::{consume, BoxCursor, Cursor, CursorError, PipelineConfig, Result};
pub use lazyseq_exec::{channel, spawn_producer, CancelToken, ChannelCursor, Publisher};
pub use lazyseq_operators::{chunk, group_by, interleave, CursorExt};

pub mod prelude {
    pub use lazyseq_core::prelude::*;
    pub use lazyseq_exec::{channel, channel_with_config, spawn_producer, CancelToken};
    pub use lazyseq_operators::{
        chain, chunk, chunk_by_count, collect_chunks, collect_groups, group_by, interleave, sum,
        to_vec, CursorExt, PartialError,
    };
}
