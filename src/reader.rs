//! Line-delimited JSON input.
//!
//! Each input file is read by its own task that parses one record per line and
//! pushes it onto a bounded channel, so products and listings load concurrently
//! while the dispatcher consumes them in file order.

use crate::model::ReadError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawns a reader for `path`. The channel closes when the file is exhausted or
/// the first error occurs; the handle yields the record count or that error.
/// A blank line is malformed like any other non-JSON line.
pub fn spawn_reader<T>(
    path: impl AsRef<Path>,
    capacity: usize,
) -> (mpsc::Receiver<T>, JoinHandle<Result<usize, ReadError>>)
where
    T: DeserializeOwned + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let path = path.as_ref().to_path_buf();
    let handle = tokio::spawn(async move { read_jsonl(path, sender).await });
    (receiver, handle)
}

async fn read_jsonl<T: DeserializeOwned>(path: PathBuf, sender: mpsc::Sender<T>) -> Result<usize, ReadError> {
    let file = File::open(&path).await.map_err(|source| ReadError::Open {
        path: path.clone(),
        source,
    })?;
    let mut lines = BufReader::new(file).lines();

    let mut line_num = 0;
    let mut records = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(source) => return Err(ReadError::Io { path, source }),
        };
        line_num += 1;

        let record = serde_json::from_str(&line).map_err(|source| ReadError::Parse {
            path: path.clone(),
            line: line_num,
            source,
        })?;
        if sender.send(record).await.is_err() {
            debug!("Reader for {} stopped: receiver dropped", path.display());
            break;
        }
        records += 1;
    }

    debug!("Read {} records from {}", records, path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Listing, Product};
    use std::fs;
    use tempfile::TempDir;

    async fn read_all<T: DeserializeOwned + Send + 'static>(path: &Path) -> (Vec<T>, Result<usize, ReadError>) {
        let (mut receiver, handle) = spawn_reader::<T>(path, 2);
        let mut records = Vec::new();
        while let Some(record) = receiver.recv().await {
            records.push(record);
        }
        (records, handle.await.unwrap())
    }

    #[tokio::test]
    async fn reads_records_in_file_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("listings.txt");
        fs::write(
            &path,
            concat!(
                r#"{"title":"one","manufacturer":"Acme","currency":"USD","price":"1.00"}"#,
                "\n",
                r#"{"title":"two","manufacturer":"Acme","currency":"CAD","price":"2.00"}"#,
                "\n",
                r#"{"title":"three","manufacturer":"Bolt","currency":"GBP","price":"3.00"}"#,
                "\n",
            ),
        )
        .unwrap();

        let (listings, count) = read_all::<Listing>(&path).await;
        assert_eq!(count.unwrap(), 3);
        let titles: Vec<_> = listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["one", "two", "three"]);
        assert_eq!(listings[1].currency, "CAD");
    }

    #[tokio::test]
    async fn malformed_line_reports_its_number() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.txt");
        fs::write(
            &path,
            concat!(
                r#"{"product_name":"A","manufacturer":"Acme","model":"A1"}"#,
                "\n",
                "{not json\n",
                r#"{"product_name":"B","manufacturer":"Acme","model":"B1"}"#,
                "\n",
            ),
        )
        .unwrap();

        let (products, result) = read_all::<Product>(&path).await;
        assert_eq!(products.len(), 1);
        match result {
            Err(ReadError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_line_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("listings.txt");
        fs::write(
            &path,
            concat!(
                r#"{"title":"one","manufacturer":"Acme","currency":"USD","price":"1.00"}"#,
                "\n   \n",
                r#"{"title":"two","manufacturer":"Acme","currency":"CAD","price":"2.00"}"#,
                "\n",
            ),
        )
        .unwrap();

        let (listings, result) = read_all::<Listing>(&path).await;
        assert_eq!(listings.len(), 1);
        assert!(matches!(result, Err(ReadError::Parse { line: 2, .. })));
    }

    #[tokio::test]
    async fn missing_file_fails_to_open() {
        let temp = TempDir::new().unwrap();
        let (products, result) = read_all::<Product>(&temp.path().join("absent.txt")).await;

        assert!(products.is_empty());
        assert!(matches!(result, Err(ReadError::Open { .. })));
    }
}
