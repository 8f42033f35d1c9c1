//! Host for the tailtracer generator: runs it on a fixed interval and hands
//! every batch to a [`TraceSink`].

mod config;
mod sink;

pub use config::{parse_interval, ConfigError, ReceiverConfig, DEFAULT_INTERVAL};
pub use sink::{ChannelSink, JsonLinesSink, MemorySink, SinkError, TraceSink};

use std::sync::Arc;
use std::time::Duration;
use tailtracer::{Catalog, Generator, Synthesizer};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    #[error("receiver is already running")]
    AlreadyStarted,

    #[error("receiver must be started from within a tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Periodic trace producer with an explicit start/shutdown lifecycle
pub struct Receiver {
    config: ReceiverConfig,
    generator: Arc<Generator>,
    running: Option<Running>,
}

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Receiver {
    /// Receiver over the built-in ATM scenario
    pub fn new(config: ReceiverConfig) -> Result<Self, ReceiverError> {
        Self::with_catalog(config, Catalog::atm_scenario())
    }

    pub fn with_catalog(config: ReceiverConfig, catalog: Catalog) -> Result<Self, ReceiverError> {
        config.validate()?;

        let generator = match config.seed {
            Some(seed) => Generator::with_seed(catalog, seed),
            None => Generator::new(catalog),
        };
        let generator =
            generator.with_synthesizer(Synthesizer::new().with_policy(config.code_policy));

        Ok(Self {
            config,
            generator: Arc::new(generator),
            running: None,
        })
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    pub fn generator(&self) -> &Arc<Generator> {
        &self.generator
    }

    /// Started and the periodic loop has not exited
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Spawn the periodic loop on the current tokio runtime.
    ///
    /// The first batch is produced right away, then one per interval.
    pub fn start<S: TraceSink>(&mut self, sink: S) -> Result<(), ReceiverError> {
        if self.running.is_some() {
            return Err(ReceiverError::AlreadyStarted);
        }

        let handle = tokio::runtime::Handle::try_current().map_err(|_| ReceiverError::NoRuntime)?;
        let cancel = CancellationToken::new();

        let task = handle.spawn(produce(
            Arc::clone(&self.generator),
            sink,
            self.config.interval,
            self.config.traces_per_tick,
            cancel.clone(),
        ));

        tracing::info!(
            interval = ?self.config.interval,
            traces_per_tick = self.config.traces_per_tick,
            "tailtracer receiver started"
        );

        self.running = Some(Running { cancel, task });
        Ok(())
    }

    /// Cancel the loop and wait for it to finish. Does nothing when not running.
    pub async fn shutdown(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        running.cancel.cancel();
        if let Err(e) = running.task.await {
            tracing::error!("receiver task failed: {}", e);
        }

        tracing::info!("tailtracer receiver stopped");
    }
}

impl Drop for Receiver {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

async fn produce<S: TraceSink>(
    generator: Arc<Generator>,
    sink: S,
    interval: Duration,
    count: usize,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let batch = match generator.generate_batch(count) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("skipping tick, synthesis failed: {}", e);
                continue;
            }
        };

        let traces = batch.len();
        let started = batch
            .traces()
            .first()
            .and_then(|trace| trace.client.start_time.to_rfc3339());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = sink.consume(batch) => match result {
                Ok(()) => tracing::debug!(traces, started = ?started, "delivered batch"),
                Err(e) => tracing::error!("sink rejected batch: {}", e),
            },
        }
    }
}
