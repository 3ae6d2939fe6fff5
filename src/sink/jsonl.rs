// One serialized MatchResult per line
use crate::model::{MatchResult, SinkError};
use crate::sink::traits::ResultSink;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let file = File::create(path).await.map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

#[async_trait::async_trait]
impl ResultSink for JsonlSink {
    async fn write(&mut self, result: &MatchResult) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(result)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}
