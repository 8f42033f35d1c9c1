use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::span::{AttributeValue, Span};

/// Attribute keys and well-known values from the OpenTelemetry semantic
/// conventions (v1.9).
pub mod semconv {
    pub const SERVICE_NAME: &str = "service.name";
    pub const SERVICE_VERSION: &str = "service.version";
    pub const CLOUD_PROVIDER: &str = "cloud.provider";
    pub const CLOUD_REGION: &str = "cloud.region";
    pub const OS_TYPE: &str = "os.type";
    pub const OS_VERSION: &str = "os.version";

    pub const CLOUD_PROVIDER_AWS: &str = "aws";
    pub const CLOUD_PROVIDER_AZURE: &str = "azure";
    pub const CLOUD_PROVIDER_GCP: &str = "gcp";

    pub const OS_TYPE_LINUX: &str = "linux";
    pub const OS_TYPE_WINDOWS: &str = "windows";
    pub const OS_TYPE_SOLARIS: &str = "solaris";
}

/// Attributes describing the entity that produced a group of spans
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource {
    attributes: BTreeMap<String, AttributeValue>,
}

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.put(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// String attribute lookup; `None` when missing or not a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_str)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.get_str(semconv::SERVICE_NAME)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Library that recorded a group of spans
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationScope {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeSpans {
    pub scope: InstrumentationScope,
    pub spans: Vec<Span>,
}

/// Spans grouped under the resource that produced them
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpans {
    pub resource: Resource,
    pub scope_spans: Vec<ScopeSpans>,
}

impl ResourceSpans {
    /// Single-scope grouping
    pub fn new(resource: Resource, scope: InstrumentationScope, spans: Vec<Span>) -> Self {
        Self {
            resource,
            scope_spans: vec![ScopeSpans { scope, spans }],
        }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.scope_spans.iter().flat_map(|s| s.spans.iter())
    }
}
