//! nameforge-gen - band name and song title generator
//!
//! Runs one generation request and prints the response as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use nameforge_gen::config;
use nameforge_gen::{
    ContentType, FallbackManager, GenerationRequest, Orchestrator, RandomSource, SeededRandom,
    WordCount,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "nameforge-gen", version, about = "Generate band names and song titles")]
struct Cli {
    /// band or song
    #[arg(long, default_value = "band")]
    content_type: ContentType,

    /// 1..10 or "4+"
    #[arg(long, default_value = "2")]
    word_count: WordCount,

    /// Names to generate
    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long)]
    genre: Option<String>,

    #[arg(long)]
    mood: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (overrides NAMEFORGE_CONFIG)
    #[arg(long, env = "NAMEFORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Skip every external provider
    #[arg(long)]
    offline: bool,

    /// Order the output as a set list of this many songs
    #[arg(long)]
    setlist: Option<usize>,

    /// Print the pipeline snapshot after generating
    #[arg(long)]
    stats: bool,

    /// Write a default config file (to --config or the platform path) and exit
    #[arg(long)]
    write_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.write_config {
        let path = config::write_default_config(cli.config.clone())
            .context("Failed to write default config")?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = config::load(cli.config.clone());
    nameforge_common::logging::init_tracing(&config.log_level);
    info!("Starting nameforge-gen {}", env!("CARGO_PKG_VERSION"));

    let registry = config::build_registry(&config.credentials, cli.offline);
    let fallback = FallbackManager::new(registry, config.pipeline.fallback.clone());
    let rng: Arc<dyn RandomSource> = match cli.seed {
        Some(seed) => Arc::new(SeededRandom::from_seed(seed)),
        None => Arc::new(SeededRandom::from_entropy()),
    };
    let orchestrator = Orchestrator::new(fallback, config.pipeline.clone(), rng);

    let mut request = GenerationRequest::new(cli.content_type, cli.word_count, cli.count);
    request.genre = cli.genre;
    request.mood = cli.mood;

    let output = match cli.setlist {
        Some(songs) => {
            let setlist = orchestrator
                .generate_setlist(&request, songs)
                .await
                .context("Set list generation failed")?;
            serde_json::to_string_pretty(&setlist)?
        }
        None => {
            let response = orchestrator
                .generate(&request)
                .await
                .context("Generation failed")?;
            serde_json::to_string_pretty(&response)?
        }
    };
    println!("{}", output);

    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&orchestrator.snapshot())?);
    }

    orchestrator.shutdown().await;
    Ok(())
}
