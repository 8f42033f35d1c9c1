//! Data model for the traces emitted by tailtracer.
//!
//! This crate defines W3C Trace Context identifiers, spans, and the
//! resource grouping that trace-ingestion sinks receive.

pub mod resource;
pub mod span;
pub mod trace_context;

pub use resource::*;
pub use span::*;
pub use trace_context::*;
