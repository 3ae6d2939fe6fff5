// Sink module: where merged worker results end up.

pub mod jsonl;
pub mod traits;

pub use jsonl::JsonlSink;
pub use traits::ResultSink;

use crate::model::{MatchResult, SinkError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Holds every result back until `finish`, then writes them ordered by product name.
pub struct SortedSink<S> {
    inner: S,
    buffered: Vec<MatchResult>,
}

impl<S: ResultSink> SortedSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffered: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl<S: ResultSink> ResultSink for SortedSink<S> {
    async fn write(&mut self, result: &MatchResult) -> Result<(), SinkError> {
        self.buffered.push(result.clone());
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.buffered.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        for result in self.buffered.drain(..) {
            self.inner.write(&result).await?;
        }
        self.inner.finish().await
    }
}

/// Drains the result stream into `sink` until every producer is gone.
/// Yields the number of listings written.
pub fn spawn_collector<S>(
    mut sink: S,
    mut results: mpsc::Receiver<MatchResult>,
) -> JoinHandle<Result<usize, SinkError>>
where
    S: ResultSink + 'static,
{
    tokio::spawn(async move {
        let mut written = 0;
        while let Some(result) = results.recv().await {
            written += result.listings.len();
            sink.write(&result).await?;
        }
        sink.finish().await?;
        debug!("Collector finished: {} listings written", written);
        Ok(written)
    })
}
