use crate::config::MatcherConfig;
use crate::index::ManufacturerIndex;
use crate::matcher::WorkerReport;
use crate::model::{IndexError, Listing, PipelineError, Product, RunSummary};
use crate::reader::spawn_reader;
use crate::sink::{spawn_collector, JsonlSink, SortedSink};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Manufacturer names that listings use for a catalog manufacturer, as
/// (canonical, alias). Registered after the catalog is loaded.
pub const KNOWN_ALIASES: &[(&str, &str)] = &[
    ("hp", "hewlett packard"),
    ("konica minolta", "minolta"),
    ("konica minolta", "konica"),
    ("fujifilm", "fuji"),
    ("kodak", "eastman kodak"),
];

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub listings: PathBuf,
    pub products: PathBuf,
    pub output: PathBuf,
}

/// Totals gathered once every worker has finished.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub listings_read: usize,
    pub unknown_manufacturer: usize,
    pub reports: Vec<WorkerReport>,
}

/// Sequential driver: catalog first, then aliases, then listings one at a time.
pub struct Dispatcher {
    index: ManufacturerIndex,
    listings_read: usize,
    unknown_manufacturer: usize,
}

impl Dispatcher {
    pub fn new(index: ManufacturerIndex) -> Self {
        Self {
            index,
            listings_read: 0,
            unknown_manufacturer: 0,
        }
    }

    pub fn index(&self) -> &ManufacturerIndex {
        &self.index
    }

    /// Adds every product from the channel. Returns how many were received.
    pub async fn load_products(&mut self, products: &mut mpsc::Receiver<Product>) -> usize {
        let mut received = 0;
        while let Some(product) = products.recv().await {
            self.index.add_product(product).await;
            received += 1;
        }
        received
    }

    pub fn register_aliases(&mut self, aliases: &[(&str, &str)]) -> Result<(), IndexError> {
        for (canonical, alias) in aliases {
            self.index.add_alias(canonical, alias)?;
        }
        Ok(())
    }

    pub async fn dispatch(&mut self, listing: Listing) {
        self.listings_read += 1;
        if !self.index.dispatch(listing).await {
            self.unknown_manufacturer += 1;
        }
    }

    pub async fn dispatch_all(&mut self, listings: &mut mpsc::Receiver<Listing>) {
        while let Some(listing) = listings.recv().await {
            self.dispatch(listing).await;
        }
    }

    pub async fn shutdown(self) -> Result<DispatchOutcome, IndexError> {
        let reports = self.index.shutdown().await?;
        Ok(DispatchOutcome {
            listings_read: self.listings_read,
            unknown_manufacturer: self.unknown_manufacturer,
            reports,
        })
    }
}

/// Reads both input files, matches every listing and writes the grouped results.
pub async fn run_pipeline(
    paths: &InputPaths,
    config: &MatcherConfig,
    aliases: &[(&str, &str)],
) -> Result<RunSummary, PipelineError> {
    let (mut products, product_reader) = spawn_reader::<Product>(&paths.products, config.reader_queue_capacity);
    let (mut listings, listing_reader) = spawn_reader::<Listing>(&paths.listings, config.reader_queue_capacity);

    let (index, results) = ManufacturerIndex::new(config.listing_queue_capacity, config.result_queue_capacity);
    let mut dispatcher = Dispatcher::new(index);

    info!("Loading products from {}...", paths.products.display());
    dispatcher.load_products(&mut products).await;
    product_reader.await??;
    info!(
        "Catalog loaded: {} manufacturers, {} workers",
        dispatcher.index().len(),
        dispatcher.index().worker_count()
    );

    dispatcher.register_aliases(aliases)?;
    info!("Registered {} aliases", aliases.len());

    info!("Dispatching listings from {}...", paths.listings.display());
    dispatcher.dispatch_all(&mut listings).await;
    listing_reader.await??;

    // Workers only flush on close, so nothing reaches the output before this
    // point. An early return above drops `results` and leaves no file behind.
    let sink = JsonlSink::create(&paths.output).await?;
    let collector = if config.sort_output {
        spawn_collector(SortedSink::new(sink), results)
    } else {
        spawn_collector(sink, results)
    };

    let outcome = dispatcher.shutdown().await?;
    for report in &outcome.reports {
        debug!("{:?}", report);
    }
    let matches_written = collector.await??;

    let ambiguous = outcome.reports.iter().map(|r| r.ambiguous).sum::<usize>();
    info!(
        "Finished: {} listings, {} ambiguous, {} matched",
        outcome.listings_read, ambiguous, matches_written
    );

    Ok(RunSummary {
        listings_read: outcome.listings_read,
        unknown_manufacturer: outcome.unknown_manufacturer,
        matches_written,
        ambiguous,
    })
}
