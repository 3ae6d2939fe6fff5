use crate::matcher::token::contains;
use crate::model::{Listing, MatchResult, Product};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Result of scanning one manufacturer's catalog for a listing title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    Unique(&'a Product),
    Ambiguous(usize),
    NoMatch,
}

/// A product is a candidate when both its model and family occur as whole tokens
/// in the title. More than one candidate makes the listing ambiguous.
pub fn find_match<'a>(products: &'a [Product], listing: &Listing) -> MatchOutcome<'a> {
    let title = listing.title.to_lowercase();
    let mut candidates = products
        .iter()
        .filter(|product| contains(&title, &product.model) && contains(&title, &product.family));

    match candidates.next() {
        None => MatchOutcome::NoMatch,
        Some(first) => match candidates.count() {
            0 => MatchOutcome::Unique(first),
            rest => MatchOutcome::Ambiguous(rest + 1),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Draining,
    Done,
}

/// What a worker did over its lifetime, returned from its task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub manufacturer: String,
    pub listings_received: usize,
    pub matched: usize,
    pub ambiguous: usize,
    pub unmatched: usize,
    pub results_flushed: usize,
}

/// Matching loop for one manufacturer group, shared by all of its aliases.
pub struct ManufacturerWorker {
    manufacturer: String,
    products: Arc<RwLock<Vec<Product>>>,
    listings: mpsc::Receiver<Listing>,
    results: mpsc::Sender<MatchResult>,
    state: WorkerState,
    // product_name -> position in `accumulated`
    positions: HashMap<String, usize>,
    accumulated: Vec<MatchResult>,
    report: WorkerReport,
}

impl ManufacturerWorker {
    pub fn new(
        manufacturer: String,
        products: Arc<RwLock<Vec<Product>>>,
        listings: mpsc::Receiver<Listing>,
        results: mpsc::Sender<MatchResult>,
    ) -> Self {
        let report = WorkerReport {
            manufacturer: manufacturer.clone(),
            ..Default::default()
        };
        Self {
            manufacturer,
            products,
            listings,
            results,
            state: WorkerState::Running,
            positions: HashMap::new(),
            accumulated: Vec::new(),
            report,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Consumes the listing queue until it is closed, then flushes every
    /// accumulated result onto the shared result stream.
    pub async fn run(mut self) -> WorkerReport {
        debug!("Worker '{}' running", self.manufacturer);
        while let Some(listing) = self.listings.recv().await {
            self.process(listing).await;
        }

        self.state = WorkerState::Draining;
        debug!(
            "Worker '{}' draining {} results",
            self.manufacturer,
            self.accumulated.len()
        );
        self.flush().await;

        self.state = WorkerState::Done;
        debug!("Worker '{}' done: {:?}", self.manufacturer, self.report);
        self.report
    }

    async fn process(&mut self, listing: Listing) {
        self.report.listings_received += 1;

        let product_name = {
            let products = self.products.read().await;
            match find_match(&products, &listing) {
                MatchOutcome::Unique(product) => product.product_name.clone(),
                MatchOutcome::Ambiguous(count) => {
                    debug!(
                        "Ambiguous listing for '{}' ({} candidates): {}",
                        self.manufacturer, count, listing.title
                    );
                    self.report.ambiguous += 1;
                    return;
                }
                MatchOutcome::NoMatch => {
                    self.report.unmatched += 1;
                    return;
                }
            }
        };

        self.report.matched += 1;
        match self.positions.get(&product_name) {
            Some(&position) => self.accumulated[position].listings.push(listing),
            None => {
                self.positions.insert(product_name.clone(), self.accumulated.len());
                self.accumulated.push(MatchResult::new(product_name, listing));
            }
        }
    }

    async fn flush(&mut self) {
        self.positions.clear();
        for result in self.accumulated.drain(..) {
            if self.results.send(result).await.is_err() {
                warn!(
                    "Result stream closed before worker '{}' finished flushing",
                    self.manufacturer
                );
                return;
            }
            self.report.results_flushed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, family: &str, model: &str) -> Product {
        Product {
            product_name: name.into(),
            manufacturer: "Acme".into(),
            family: family.into(),
            model: model.into(),
            announced_date: String::new(),
        }
    }

    fn listing(title: &str) -> Listing {
        Listing {
            title: title.into(),
            manufacturer: "Acme".into(),
            currency: "USD".into(),
            price: "10.00".into(),
        }
    }

    #[test]
    fn single_candidate_is_unique_match() {
        let products = vec![product("X100", "Pro", "X100"), product("X200", "Pro", "X200")];

        match find_match(&products, &listing("Acme X100 Pro Camera")) {
            MatchOutcome::Unique(p) => assert_eq!(p.product_name, "X100"),
            other => panic!("expected unique match, got {:?}", other),
        }
    }

    #[test]
    fn family_must_match_too() {
        let products = vec![product("X100", "Pro", "X100")];

        assert_eq!(find_match(&products, &listing("Acme X100 Lite")), MatchOutcome::NoMatch);
    }

    #[test]
    fn empty_family_matches_on_model_alone() {
        let products = vec![product("X100", "", "X100")];

        assert!(matches!(
            find_match(&products, &listing("acme x100")),
            MatchOutcome::Unique(_)
        ));
    }

    #[test]
    fn two_candidates_are_ambiguous() {
        let products = vec![
            product("X100", "", "X100"),
            product("X100 Pro", "Pro", "X100"),
            product("Z9", "", "Z9"),
        ];

        assert_eq!(
            find_match(&products, &listing("Acme X100 Pro Camera")),
            MatchOutcome::Ambiguous(2)
        );
    }

    #[tokio::test]
    async fn worker_accumulates_per_product_and_flushes_on_close() {
        let products = Arc::new(RwLock::new(vec![
            product("X100", "", "X100"),
            product("Z9", "", "Z9"),
        ]));
        let (listing_tx, listing_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(4);
        let worker = ManufacturerWorker::new("acme".into(), products, listing_rx, result_tx);
        assert_eq!(worker.state(), WorkerState::Running);
        let handle = tokio::spawn(worker.run());

        for title in ["X100 first", "Z9 body", "X100 second", "nothing here"] {
            listing_tx.send(listing(title)).await.unwrap();
        }
        drop(listing_tx);

        let report = handle.await.unwrap();
        assert_eq!(report.listings_received, 4);
        assert_eq!(report.matched, 3);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.results_flushed, 2);

        let first = result_rx.recv().await.unwrap();
        assert_eq!(first.product_name, "X100");
        let titles: Vec<_> = first.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, ["X100 first", "X100 second"]);

        let second = result_rx.recv().await.unwrap();
        assert_eq!(second.product_name, "Z9");
        assert!(result_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn ambiguous_listing_produces_no_result() {
        let products = Arc::new(RwLock::new(vec![
            product("X100", "", "X100"),
            product("X100 Pro", "Pro", "X100"),
        ]));
        let (listing_tx, listing_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(4);
        let handle = tokio::spawn(
            ManufacturerWorker::new("acme".into(), products, listing_rx, result_tx).run(),
        );

        listing_tx.send(listing("Acme X100 Pro")).await.unwrap();
        drop(listing_tx);

        let report = handle.await.unwrap();
        assert_eq!(report.ambiguous, 1);
        assert_eq!(report.results_flushed, 0);
        assert!(result_rx.recv().await.is_none());
    }
}
