use crate::matcher::token::contains;
use crate::matcher::{ManufacturerWorker, WorkerReport};
use crate::model::{IndexError, Listing, MatchResult, Product};
use crate::normalizer::{listing_key, manufacturer_key, product_key};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// Product list and listing queue of one canonical manufacturer.
/// Every alias key holds a clone of the same `Arc`.
pub struct ManufacturerGroup {
    canonical: String,
    products: Arc<RwLock<Vec<Product>>>,
    listings: mpsc::Sender<Listing>,
}

impl ManufacturerGroup {
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

/// Ordered manufacturer index. Each canonical manufacturer gets one worker task
/// the first time one of its products is added.
///
/// Product lists are only written while the catalog is loaded, before the
/// first `dispatch`.
pub struct ManufacturerIndex {
    entries: BTreeMap<String, Arc<ManufacturerGroup>>,
    workers: Vec<JoinHandle<WorkerReport>>,
    results: mpsc::Sender<MatchResult>,
    listing_capacity: usize,
}

impl ManufacturerIndex {
    /// Creates an empty index and the receiving end of its shared result stream.
    pub fn new(listing_capacity: usize, result_capacity: usize) -> (Self, mpsc::Receiver<MatchResult>) {
        let (results, receiver) = mpsc::channel(result_capacity.max(1));
        let index = Self {
            entries: BTreeMap::new(),
            workers: Vec::new(),
            results,
            listing_capacity: listing_capacity.max(1),
        };
        (index, receiver)
    }

    /// Adds a product under its lowercased manufacturer, spawning that
    /// manufacturer's worker on first sight. Duplicates are skipped: same
    /// product name, or model and family both token-matching an existing row.
    pub async fn add_product(&mut self, product: Product) {
        let key = product_key(&product);

        let Some(group) = self.entries.get(&key) else {
            self.spawn_group(key, product);
            return;
        };

        let mut products = group.products.write().await;
        let duplicate = products.iter().any(|existing| {
            existing.product_name == product.product_name
                || contains(&existing.model, &product.model) && contains(&existing.family, &product.family)
        });
        if duplicate {
            debug!("Skipping duplicate product '{}' for '{}'", product.product_name, key);
            return;
        }
        products.push(product);
    }

    fn spawn_group(&mut self, key: String, product: Product) {
        let (sender, receiver) = mpsc::channel(self.listing_capacity);
        let products = Arc::new(RwLock::new(vec![product]));

        let worker = ManufacturerWorker::new(key.clone(), products.clone(), receiver, self.results.clone());
        self.workers.push(tokio::spawn(worker.run()));
        debug!("Spawned worker for '{}'", key);

        let group = ManufacturerGroup {
            canonical: key.clone(),
            products,
            listings: sender,
        };
        self.entries.insert(key, Arc::new(group));
    }

    /// Registers `alias` as another key for `canonical`'s group. No worker is spawned.
    pub fn add_alias(&mut self, canonical: &str, alias: &str) -> Result<(), IndexError> {
        let group = self
            .entries
            .get(&manufacturer_key(canonical))
            .cloned()
            .ok_or_else(|| IndexError::UnknownManufacturer(canonical.to_string()))?;
        self.entries.insert(manufacturer_key(alias), group);
        Ok(())
    }

    /// Sends the listing to every group whose key is a prefix of the listing's
    /// manufacturer, visiting keys <= that manufacturer in descending order.
    /// A group reached through several alias keys receives the listing once.
    /// Waits while a target queue is full. Returns whether any group was found.
    pub async fn dispatch(&self, listing: Listing) -> bool {
        let key = listing_key(&listing);

        let mut targets: Vec<&Arc<ManufacturerGroup>> = Vec::new();
        let upto = (Bound::Unbounded, Bound::Included(key.as_str()));
        for (entry_key, group) in self.entries.range::<str, _>(upto).rev() {
            if key.starts_with(entry_key.as_str()) && !targets.iter().any(|seen| Arc::ptr_eq(seen, group)) {
                targets.push(group);
            }
        }

        for group in &targets {
            if group.listings.send(listing.clone()).await.is_err() {
                debug!("Worker for '{}' is gone, listing dropped", group.canonical);
            }
        }
        !targets.is_empty()
    }

    /// Closes every listing queue, waits for all workers to flush, then closes
    /// the result stream. Returns one report per worker.
    pub async fn shutdown(self) -> Result<Vec<WorkerReport>, IndexError> {
        let Self {
            entries,
            workers,
            results,
            ..
        } = self;

        drop(entries);
        let mut reports = Vec::with_capacity(workers.len());
        for joined in join_all(workers).await {
            reports.push(joined?);
        }
        drop(results);
        Ok(reports)
    }

    /// Snapshot of the product list behind `manufacturer` (or one of its aliases).
    pub async fn products(&self, manufacturer: &str) -> Option<Vec<Product>> {
        let group = self.entries.get(&manufacturer_key(manufacturer))?;
        Some(group.products.read().await.clone())
    }

    /// Canonical manufacturer behind `manufacturer` (or one of its aliases).
    pub fn canonical(&self, manufacturer: &str) -> Option<&str> {
        self.entries
            .get(&manufacturer_key(manufacturer))
            .map(|group| group.canonical())
    }

    /// Test-only: a clone of the returned `Arc` would keep the listing queue
    /// open and stall `shutdown`.
    #[cfg(test)]
    fn group(&self, manufacturer: &str) -> Option<&Arc<ManufacturerGroup>> {
        self.entries.get(&manufacturer_key(manufacturer))
    }

    /// Number of keys, aliases included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}
