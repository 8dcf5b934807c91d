#![forbid(unsafe_code)]
//! lazyseq-core: the cursor protocol, lifecycle state, error taxonomy,
//! pipeline configuration and leaf sources.
//!
//! No threads, no I/O policy here. Combinators live in `lazyseq-operators`, the
//! producer/consumer bridge in `lazyseq-exec`.

pub mod config;
pub mod cursor;
pub mod error;
pub mod prelude;
pub mod source;

pub use config::PipelineConfig;
pub use cursor::{consume, BoxCursor, Cursor, CursorState};
pub use error::{ConfigError, CursorError, Result, SharedError};
