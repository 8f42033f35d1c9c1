//! Synthetic distributed traces for an ATM calling a banking backend.
//!
//! # Example
//!
//! ```
//! use tailtracer::{Catalog, Generator};
//!
//! let generator = Generator::new(Catalog::atm_scenario());
//! let batch = generator.generate_batch(3).unwrap();
//!
//! for trace in batch.traces() {
//!     assert_eq!(trace.server.parent_span_id, Some(trace.client.span_id));
//!     assert_eq!(trace.server.end_time, trace.client.end_time);
//! }
//! ```

mod batch;
pub mod catalog;
mod generator;
pub mod id_generator;
pub mod lookup;
mod synthesizer;

pub use batch::{scope, Batch, SCOPE_NAME};
pub use catalog::{BackendProfile, BackendSystem, Catalog, CatalogError, DeviceProfile};
pub use generator::Generator;
pub use id_generator::{IdGenerator, IncrementIdGenerator, RandomIdGenerator};
pub use lookup::{CodeField, Recognition, UnrecognizedCode};
pub use synthesizer::*;
pub use tailtracer_protocol::*;
