//! Convenient re-exports for downstream crates.

pub use crate::config::PipelineConfig;
pub use crate::cursor::{consume, BoxCursor, Cursor, CursorState};
pub use crate::error::{CursorError, Result};
pub use crate::source::{empty, fail, from_iter, from_vec, generate, generate_with_dispose, range};
