use crate::model::{MatchResult, SinkError};

#[async_trait::async_trait]
pub trait ResultSink: Send {
    async fn write(&mut self, result: &MatchResult) -> Result<(), SinkError>;
    async fn finish(&mut self) -> Result<(), SinkError>;
}
