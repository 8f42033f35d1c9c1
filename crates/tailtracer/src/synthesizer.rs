use std::sync::Arc;
use std::time::Duration;
use tailtracer_protocol::*;

use crate::catalog::{BackendProfile, DeviceProfile};
use crate::id_generator::{IdGenerator, RandomIdGenerator};
use crate::lookup::{CloudProvider, CodeField, Operation, OsType, Recognition, UnrecognizedCode};

/// How long the ATM waits for the backend to answer
pub const CLIENT_DURATION: Duration = Duration::from_secs(4);

/// Delay between the ATM sending the request and the backend picking it up
pub const SERVER_START_OFFSET: Duration = Duration::from_secs(2);

pub const ATM_ID: &str = "atm.id";
pub const ATM_STATE_ID: &str = "atm.stateid";
pub const ATM_ISP_NETWORK: &str = "atm.ispnetwork";
pub const ATM_SERIAL_NUMBER: &str = "atm.serialnumber";

/// What to do when a catalog code has no known translation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodePolicy {
    /// Emit an empty value and report the code alongside the trace
    #[default]
    Blank,
    /// Fail the synthesis
    Reject,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("{0}")]
    UnrecognizedCode(UnrecognizedCode),
}

/// One ATM call: the device's client span and the backend's server span,
/// each with the resource that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticTrace {
    pub device: Resource,
    pub backend: Resource,
    pub client: Span,
    pub server: Span,
}

impl SyntheticTrace {
    pub fn trace_id(&self) -> TraceId {
        self.client.trace_id
    }

    /// Assemble both spans into a trace view
    pub fn trace(&self) -> Option<Trace> {
        Trace::from_spans(vec![self.client.clone(), self.server.clone()])
    }

    /// The traceparent header the device sent along with its request
    pub fn traceparent(&self) -> String {
        TraceContext::root(self.client.trace_id, self.client.span_id).to_traceparent()
    }

    /// Device and backend groupings, in that order
    pub fn resource_spans(&self, scope: &InstrumentationScope) -> [ResourceSpans; 2] {
        [
            ResourceSpans::new(self.device.clone(), scope.clone(), vec![self.client.clone()]),
            ResourceSpans::new(self.backend.clone(), scope.clone(), vec![self.server.clone()]),
        ]
    }
}

/// A synthesized trace plus every code that had to be blanked out
#[derive(Clone, Debug)]
pub struct Synthesized {
    pub trace: SyntheticTrace,
    pub unrecognized: Vec<UnrecognizedCode>,
}

/// Turns a (device, backend) pair into a two-span trace
#[derive(Clone, Debug)]
pub struct Synthesizer {
    id_generator: Arc<dyn IdGenerator>,
    policy: CodePolicy,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self {
            id_generator: Arc::new(RandomIdGenerator::default()),
            policy: CodePolicy::default(),
        }
    }

    pub fn with_id_generator(mut self, id_generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Arc::new(id_generator);
        self
    }

    pub fn with_policy(mut self, policy: CodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Synthesize a call starting now
    pub fn synthesize(
        &self,
        device: &DeviceProfile,
        backend: &BackendProfile,
    ) -> Result<Synthesized, SynthesisError> {
        self.synthesize_at(device, backend, Timestamp::now())
    }

    /// Synthesize a call whose client span starts at `now`
    pub fn synthesize_at(
        &self,
        device: &DeviceProfile,
        backend: &BackendProfile,
        now: Timestamp,
    ) -> Result<Synthesized, SynthesisError> {
        let mut unrecognized = Vec::new();

        let operation = self.resolve(
            CodeField::Endpoint,
            Operation::from_endpoint(&backend.endpoint),
            |op| op.display_name(),
            &mut unrecognized,
        )?;
        let cloud_provider = self.resolve(
            CodeField::CloudProvider,
            CloudProvider::lookup(&backend.system.cloud_provider),
            |p| p.as_str(),
            &mut unrecognized,
        )?;
        let os_type = self.resolve(
            CodeField::OsType,
            OsType::lookup(&backend.system.os_type),
            |o| o.as_str(),
            &mut unrecognized,
        )?;

        let client_ctx = TraceContext::root(
            self.id_generator.new_trace_id(),
            self.id_generator.new_span_id(),
        );
        let client_end = now.add(CLIENT_DURATION);

        let client = Span {
            trace_id: client_ctx.trace_id,
            span_id: client_ctx.span_id,
            parent_span_id: None,
            name: operation.to_string(),
            kind: SpanKind::Client,
            start_time: now,
            end_time: client_end,
            attributes: Default::default(),
            status: SpanStatus::Ok,
        };

        let server_ctx = client_ctx.child(self.id_generator.new_span_id());

        // The backend answers exactly when the ATM sees the response.
        let server = Span {
            trace_id: server_ctx.trace_id,
            span_id: server_ctx.span_id,
            parent_span_id: server_ctx.parent_span_id,
            name: backend.endpoint.clone(),
            kind: SpanKind::Server,
            start_time: now.add(SERVER_START_OFFSET),
            end_time: client_end,
            attributes: Default::default(),
            status: SpanStatus::Ok,
        };

        let device_resource = Resource::new()
            .with(ATM_ID, device.id)
            .with(ATM_STATE_ID, device.state_id.as_str())
            .with(ATM_ISP_NETWORK, device.isp_network.as_str())
            .with(ATM_SERIAL_NUMBER, device.serial_number.as_str())
            .with(semconv::SERVICE_NAME, device.name.as_str())
            .with(semconv::SERVICE_VERSION, device.version.as_str());

        let system = &backend.system;
        let backend_resource = Resource::new()
            .with(semconv::CLOUD_PROVIDER, cloud_provider)
            .with(semconv::CLOUD_REGION, system.cloud_region.as_str())
            .with(semconv::OS_TYPE, os_type)
            .with(semconv::OS_VERSION, system.os_version.as_str())
            .with(semconv::SERVICE_NAME, system.process_name.as_str())
            .with(semconv::SERVICE_VERSION, system.version.as_str());

        Ok(Synthesized {
            trace: SyntheticTrace {
                device: device_resource,
                backend: backend_resource,
                client,
                server,
            },
            unrecognized,
        })
    }

    fn resolve<T>(
        &self,
        field: CodeField,
        recognition: Recognition<T>,
        render: impl FnOnce(T) -> &'static str,
        unrecognized: &mut Vec<UnrecognizedCode>,
    ) -> Result<&'static str, SynthesisError> {
        match recognition {
            Recognition::Recognized(value) => Ok(render(value)),
            Recognition::Unrecognized(code) => {
                let code = UnrecognizedCode { field, code };
                match self.policy {
                    CodePolicy::Blank => {
                        unrecognized.push(code);
                        Ok("")
                    }
                    CodePolicy::Reject => Err(SynthesisError::UnrecognizedCode(code)),
                }
            }
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}
