//! Groups marketplace listings under the catalog product they name.
//!
//! Products are indexed by lowercased manufacturer; each manufacturer gets a
//! worker task that token-matches listing titles against its catalog and
//! accumulates results until its queue is closed.

pub mod config;
pub mod dispatcher;
pub mod index;
pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod reader;
pub mod sink;

pub use config::{load_config, MatcherConfig};
pub use dispatcher::{run_pipeline, Dispatcher, InputPaths, KNOWN_ALIASES};
pub use index::ManufacturerIndex;
pub use matcher::{contains, find_match, MatchOutcome, WorkerReport};
pub use model::{Listing, MatchResult, PipelineError, Product, RunSummary};
