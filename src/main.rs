use clap::{CommandFactory, Parser};
use listing_matcher::{load_config, run_pipeline, InputPaths, MatcherConfig, KNOWN_ALIASES};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};

/// Match marketplace listings to catalog products, grouped by manufacturer.
#[derive(Parser, Debug)]
#[command(name = "listing-matcher")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to listings file (one JSON object per line).
    #[arg(long, value_name = "PATH")]
    listings: Option<PathBuf>,

    /// Path to products file (one JSON object per line).
    #[arg(long, value_name = "PATH")]
    products: Option<PathBuf>,

    /// Path to output file.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Optional JSON file with queue capacities.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Write results ordered by product name.
    #[arg(long)]
    sorted: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(paths) = input_paths(&cli) else {
        return ExitCode::FAILURE;
    };

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => MatcherConfig::default(),
    };
    if cli.sorted {
        config.sort_output = true;
    }

    info!("Matching listings with {:?}", config);
    match run_pipeline(&paths, &config, KNOWN_ALIASES).await {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// All three paths are required; a missing one prints usage and fails with status 1.
fn input_paths(cli: &Cli) -> Option<InputPaths> {
    let required = [
        (&cli.listings, "listings"),
        (&cli.products, "products"),
        (&cli.output, "output"),
    ];
    for (path, name) in required {
        if path.is_none() {
            eprintln!("Please provide path to {} file.", name);
            eprintln!("{}", Cli::command().render_usage());
            return None;
        }
    }

    Some(InputPaths {
        listings: cli.listings.clone()?,
        products: cli.products.clone()?,
        output: cli.output.clone()?,
    })
}
