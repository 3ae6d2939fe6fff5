// Matcher module: title token matching and the per-manufacturer worker loop.

pub mod token;
pub mod worker;

pub use token::contains;
pub use worker::{find_match, ManufacturerWorker, MatchOutcome, WorkerReport, WorkerState};
