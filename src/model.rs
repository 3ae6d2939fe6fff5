// Core structs: Listing, Product, MatchResult, RunSummary
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::JoinError;

/// A marketplace entry waiting to be grouped under a catalog product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Listing {
    pub title: String,
    pub manufacturer: String,
    pub currency: String,
    pub price: String,
}

/// A catalog row. `family` and `model` are the tokens searched for in listing titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub product_name: String,
    pub manufacturer: String,
    pub family: String,
    pub model: String,
    #[serde(rename = "announced-date")]
    pub announced_date: String,
}

/// Every listing one worker matched to a single product, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub product_name: String,
    pub listings: Vec<Listing>,
}

impl MatchResult {
    pub fn new(product_name: impl Into<String>, first: Listing) -> Self {
        Self {
            product_name: product_name.into(),
            listings: vec![first],
        }
    }
}

/// Counts reported once the whole batch has been written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listings_read: usize,
    pub unknown_manufacturer: usize,
    pub matches_written: usize,
    pub ambiguous: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} listings read.", self.listings_read)?;
        writeln!(f, "{} listings with unknown manufacturer.", self.unknown_manufacturer)?;
        write!(f, "{} matches written.", self.matches_written)
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed JSON in {} at line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot alias unknown manufacturer '{0}'")]
    UnknownManufacturer(String),

    #[error("manufacturer worker failed: {0}")]
    WorkerFailed(#[from] JoinError),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("background task failed: {0}")]
    TaskFailed(#[from] JoinError),
}
