//! Tracing hooks for bridge lifecycle events.
//!
//! Compiled to a no-op without the `tracing` feature; binaries decide where
//! the events go by installing a subscriber.

#[cfg(feature = "tracing")]
pub fn emit_event(event: &str, key_values: &[(&str, String)]) {
    let span = tracing::trace_span!("lazyseq", event);
    let _guard = span.enter();
    for (k, v) in key_values {
        tracing::trace!(%event, %k, %v, "metric");
    }
}

#[cfg(not(feature = "tracing"))]
pub fn emit_event(_event: &str, _key_values: &[(&str, String)]) { /* no-op */
}
