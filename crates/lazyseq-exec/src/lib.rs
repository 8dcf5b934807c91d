#![forbid(unsafe_code)]
//! lazyseq-exec: the concurrency bridge and its cancellation model.
//!
//! This is the only crate in the workspace that crosses threads. Everything
//! blocks on `std::sync` primitives; there is no async runtime.

pub mod cancel;
pub mod channel;
pub mod metrics;

pub use cancel::CancelToken;
pub use channel::{channel, channel_with_config, spawn_producer, ChannelCursor, Publisher};
