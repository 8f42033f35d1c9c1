use tailtracer_protocol::{InstrumentationScope, ResourceSpans};

use crate::synthesizer::SyntheticTrace;

/// Name of the instrumentation scope every synthesized span is recorded under
pub const SCOPE_NAME: &str = "tailtracer";

/// The traces produced by one generator invocation, ready for a sink
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    traces: Vec<SyntheticTrace>,
}

impl Batch {
    pub fn new(traces: Vec<SyntheticTrace>) -> Self {
        Self { traces }
    }

    pub fn traces(&self) -> &[SyntheticTrace] {
        &self.traces
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Two spans per trace
    pub fn span_count(&self) -> usize {
        self.traces.len() * 2
    }

    /// Flatten into per-resource groupings: device then backend for each trace
    pub fn resource_spans(&self) -> Vec<ResourceSpans> {
        let scope = scope();
        self.traces
            .iter()
            .flat_map(|trace| trace.resource_spans(&scope))
            .collect()
    }
}

impl IntoIterator for Batch {
    type Item = SyntheticTrace;
    type IntoIter = std::vec::IntoIter<SyntheticTrace>;

    fn into_iter(self) -> Self::IntoIter {
        self.traces.into_iter()
    }
}

pub fn scope() -> InstrumentationScope {
    InstrumentationScope {
        name: SCOPE_NAME.to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
