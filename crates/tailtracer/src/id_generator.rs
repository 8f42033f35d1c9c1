//! Trace and span id sources.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tailtracer_protocol::{SpanId, TraceId};

/// Interface for generating IDs
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn new_trace_id(&self) -> TraceId;

    fn new_span_id(&self) -> SpanId;
}

/// Draws every id from OS entropy.
#[derive(Clone, Debug, Default)]
pub struct RandomIdGenerator {
    _private: (),
}

impl IdGenerator for RandomIdGenerator {
    fn new_trace_id(&self) -> TraceId {
        TraceId::new()
    }

    fn new_span_id(&self) -> SpanId {
        SpanId::new()
    }
}

/// Hands out consecutive ids from a shared counter, for predictable output in tests.
#[derive(Clone, Debug)]
pub struct IncrementIdGenerator(Arc<AtomicU64>);

impl IncrementIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for IncrementIdGenerator {
    fn default() -> Self {
        Self(Arc::new(AtomicU64::new(1)))
    }
}

impl IdGenerator for IncrementIdGenerator {
    fn new_trace_id(&self) -> TraceId {
        TraceId::from(self.0.fetch_add(1, Ordering::SeqCst) as u128)
    }

    fn new_span_id(&self) -> SpanId {
        SpanId::from(self.0.fetch_add(1, Ordering::SeqCst))
    }
}
