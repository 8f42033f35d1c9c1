use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tailtracer::{BackendSystem, Batch, Catalog, CodePolicy};
use tailtracer_receiver::*;
use tokio::time::{sleep, timeout};

fn fast_config(traces_per_tick: usize) -> ReceiverConfig {
    ReceiverConfig {
        interval: Duration::from_millis(20),
        traces_per_tick,
        seed: Some(1),
        code_policy: CodePolicy::Blank,
    }
}

#[tokio::test]
async fn delivers_batches_until_shutdown() {
    let sink = MemorySink::new();
    let mut receiver = Receiver::new(fast_config(3)).unwrap();

    receiver.start(sink.clone()).unwrap();
    assert!(receiver.is_running());

    sleep(Duration::from_millis(150)).await;
    receiver.shutdown().await;
    assert!(!receiver.is_running());

    let delivered = sink.batches();
    assert!(delivered.len() >= 2, "expected several ticks, got {}", delivered.len());
    assert!(delivered.iter().all(|b| b.len() == 3));

    // Nothing arrives once the loop is gone
    let after_shutdown = sink.batches().len();
    sleep(Duration::from_millis(80)).await;
    assert_eq!(sink.batches().len(), after_shutdown);
}

#[tokio::test]
async fn first_batch_arrives_immediately() {
    let (sink, mut rx) = ChannelSink::new(8);
    let mut receiver = Receiver::new(ReceiverConfig {
        interval: Duration::from_secs(3600),
        ..fast_config(2)
    })
    .unwrap();

    receiver.start(sink).unwrap();

    let batch = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("first tick should fire right away")
        .expect("channel open");
    assert_eq!(batch.len(), 2);

    receiver.shutdown().await;
}

#[tokio::test]
async fn second_start_is_rejected() {
    let mut receiver = Receiver::new(fast_config(1)).unwrap();
    receiver.start(MemorySink::new()).unwrap();

    assert!(matches!(
        receiver.start(MemorySink::new()),
        Err(ReceiverError::AlreadyStarted)
    ));

    receiver.shutdown().await;
    receiver.shutdown().await;

    // A stopped receiver can be started again
    receiver.start(MemorySink::new()).unwrap();
    receiver.shutdown().await;
}

/// Rejects its first batch, stores everything after
struct FlakySink {
    calls: Arc<AtomicUsize>,
    inner: MemorySink,
}

impl TraceSink for FlakySink {
    async fn consume(&self, batch: Batch) -> Result<(), SinkError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(SinkError::Closed);
        }
        self.inner.consume(batch).await
    }
}

struct PanickingSink;

impl TraceSink for PanickingSink {
    async fn consume(&self, _batch: Batch) -> Result<(), SinkError> {
        panic!("sink blew up");
    }
}

#[tokio::test]
async fn sink_error_does_not_stop_the_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let inner = MemorySink::new();
    let mut receiver = Receiver::new(fast_config(2)).unwrap();
    receiver
        .start(FlakySink {
            calls: Arc::clone(&calls),
            inner: inner.clone(),
        })
        .unwrap();

    sleep(Duration::from_millis(120)).await;
    assert!(receiver.is_running());
    receiver.shutdown().await;

    // The rejected first batch is lost, later ticks still get through
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(inner.batches().len(), calls.load(Ordering::SeqCst) - 1);
    assert!(inner.trace_count() >= 4);
}

#[tokio::test]
async fn exited_loop_is_not_running() {
    let mut receiver = Receiver::new(fast_config(1)).unwrap();
    receiver.start(PanickingSink).unwrap();

    timeout(Duration::from_secs(2), async {
        while receiver.is_running() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("loop should exit after the sink panics");

    // Already-started is still reported until the handle is reaped
    assert!(matches!(
        receiver.start(MemorySink::new()),
        Err(ReceiverError::AlreadyStarted)
    ));
    receiver.shutdown().await;
    assert!(!receiver.is_running());
}

#[tokio::test]
async fn strict_receiver_skips_failing_ticks() {
    let base = Catalog::atm_scenario();
    let catalog = Catalog::new(
        base.devices().to_vec(),
        vec![BackendSystem {
            cloud_provider: "ibm".to_string(),
            ..base.backends()[0].clone()
        }],
        base.endpoints().to_vec(),
    )
    .unwrap();

    let sink = MemorySink::new();
    let mut receiver = Receiver::with_catalog(
        ReceiverConfig {
            code_policy: CodePolicy::Reject,
            ..fast_config(1)
        },
        catalog,
    )
    .unwrap();

    receiver.start(sink.clone()).unwrap();
    sleep(Duration::from_millis(80)).await;
    receiver.shutdown().await;

    assert_eq!(sink.trace_count(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    let err = Receiver::new(ReceiverConfig {
        traces_per_tick: 0,
        ..Default::default()
    })
    .err()
    .unwrap();
    assert!(matches!(err, ReceiverError::Config(ConfigError::ZeroTraces)));
}

#[test]
fn start_outside_a_runtime_fails() {
    let mut receiver = Receiver::new(ReceiverConfig::default()).unwrap();
    assert!(matches!(
        receiver.start(MemorySink::new()),
        Err(ReceiverError::NoRuntime)
    ));
    assert!(!receiver.is_running());
}
