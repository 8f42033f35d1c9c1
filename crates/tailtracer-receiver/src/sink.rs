use parking_lot::{Mutex, MutexGuard};
use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;
use tailtracer::Batch;
use tokio::sync::mpsc;

/// Downstream consumer of generated batches
pub trait TraceSink: Send + Sync + 'static {
    fn consume(&self, batch: Batch) -> impl Future<Output = Result<(), SinkError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink receiver has been dropped")]
    Closed,

    #[error("failed to write batch: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keeps every batch in memory
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Batch>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.batches.lock().clone()
    }

    /// Total traces received across all batches
    pub fn trace_count(&self) -> usize {
        self.batches.lock().iter().map(Batch::len).sum()
    }

    pub fn reset(&self) {
        self.batches.lock().clear();
    }
}

impl TraceSink for MemorySink {
    async fn consume(&self, batch: Batch) -> Result<(), SinkError> {
        self.batches.lock().push(batch);
        Ok(())
    }
}

/// Forwards batches to a bounded tokio channel
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Batch>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Batch>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl TraceSink for ChannelSink {
    async fn consume(&self, batch: Batch) -> Result<(), SinkError> {
        self.tx.send(batch).await.map_err(|_| SinkError::Closed)
    }
}

/// Writes one JSON `ResourceSpans` object per line
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Arc<Mutex<W>>,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn writer(&self) -> MutexGuard<'_, W> {
        self.writer.lock()
    }

    fn write_batch(&self, batch: &Batch) -> Result<(), SinkError> {
        let mut writer = self.writer.lock();
        for group in batch.resource_spans() {
            serde_json::to_writer(&mut *writer, &group)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl<W> Clone for JsonLinesSink<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: Write + Send + 'static> TraceSink for JsonLinesSink<W> {
    async fn consume(&self, batch: Batch) -> Result<(), SinkError> {
        self.write_batch(&batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailtracer::{Catalog, Generator, ResourceSpans};

    fn batch(count: usize) -> Batch {
        Generator::with_seed(Catalog::atm_scenario(), 5)
            .generate_batch(count)
            .unwrap()
    }

    #[tokio::test]
    async fn memory_sink_collects_batches() {
        let sink = MemorySink::new();
        sink.consume(batch(2)).await.unwrap();
        sink.consume(batch(3)).await.unwrap();

        assert_eq!(sink.batches().len(), 2);
        assert_eq!(sink.trace_count(), 5);

        sink.reset();
        assert_eq!(sink.trace_count(), 0);
    }

    #[tokio::test]
    async fn channel_sink_reports_closed_receiver() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.consume(batch(1)).await.unwrap();
        assert_eq!(rx.recv().await.map(|b| b.len()), Some(1));

        drop(rx);
        assert!(matches!(sink.consume(batch(1)).await, Err(SinkError::Closed)));
    }

    #[tokio::test]
    async fn json_lines_sink_writes_one_group_per_line() {
        let sink = JsonLinesSink::new(Vec::new());
        let batch = batch(3);
        sink.consume(batch.clone()).await.unwrap();

        let output = String::from_utf8(sink.writer().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);

        let groups: Vec<ResourceSpans> = lines
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(groups, batch.resource_spans());

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["scope_spans"][0]["spans"][0]["kind"], "client");
        assert_eq!(first["scope_spans"][0]["spans"][0]["status"]["code"], "ok");
    }
}
