//! Complaint Classifier - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use complaint_classifier::{
    cli::{Args, Commands, Config, Verbosity},
    display_mode::DisplayMode,
    execution::stream_turn,
    index::{Embedder, EmbeddingEngine, QdrantStore, VectorStore},
    ingest::{DataLoader, LoadOutcome, SpreadsheetSource},
    models::{resolve_model, OllamaModelClient},
    rag::{
        retrieval::ContextRetriever, ClassificationPipeline, CrossEncoder, RelevanceScorer,
    },
    repl::{ReplContext, ReplSession, TurnState},
    streaming::{ChatModel, OllamaClient},
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbosity());

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    match args.command() {
        Commands::Chat => run_repl(&args, &config).await?,
        Commands::Classify { query } => classify_once(&args, &config, &query).await?,
        Commands::Ingest { reset, .. } => run_ingest(&args, &config, reset).await?,
        Commands::Models => list_models(&config).await?,
        Commands::Config => show_config(&args, &config)?,
    }

    Ok(())
}

/// Logs go to stderr; RUST_LOG wins over -v/-q
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn load_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let model_id = config.models.embedding_model.clone();
    let engine = tokio::task::spawn_blocking(move || EmbeddingEngine::with_model(&model_id))
        .await?
        .context("Failed to load embedding model")?;
    Ok(Arc::new(engine))
}

/// Cross-encoder when enabled; a load failure only disables reranking
async fn load_reranker(config: &Config) -> Option<Arc<dyn RelevanceScorer>> {
    if !config.retrieval.use_reranker {
        return None;
    }

    let model_id = config.models.reranker_model.clone();
    match tokio::task::spawn_blocking(move || CrossEncoder::with_model(&model_id)).await {
        Ok(Ok(encoder)) => Some(Arc::new(encoder)),
        Ok(Err(e)) => {
            warn!(error = %format!("{:#}", e), "reranker unavailable; continuing without it");
            None
        }
        Err(e) => {
            warn!(error = %e, "reranker loader panicked; continuing without it");
            None
        }
    }
}

fn connect_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    Ok(Arc::new(QdrantStore::connect(config.store_settings())?))
}

fn build_loader(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    show_progress: bool,
) -> DataLoader {
    let source = SpreadsheetSource::new(config.ingest.dataset_path.clone());
    DataLoader::new(embedder, store, Box::new(source))
        .with_batch_size(config.ingest.batch_size)
        .with_progress(show_progress)
}

async fn build_pipeline(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
) -> Result<ClassificationPipeline> {
    let chat: Arc<dyn ChatModel> = Arc::new(OllamaClient::with_url(&config.ollama_url())?);
    let reranker = load_reranker(config).await;

    Ok(ClassificationPipeline::new(
        ContextRetriever::new(embedder, store),
        reranker,
        chat,
        config.pipeline_settings(),
    ))
}

/// Configured model if installed, else the first installed chat model
async fn pick_model(models: &OllamaModelClient, config: &Config) -> String {
    let configured = &config.ollama.default_model;
    if !models.is_available().await {
        eprintln!(
            "{} Ollama is not reachable at {}. Start it with: ollama serve",
            "Warning:".yellow().bold(),
            models.base_url()
        );
        return configured.clone();
    }

    match models.available_chat_models().await {
        Ok(available) => {
            let model = resolve_model(configured, &available);
            if &model != configured {
                warn!(configured = %configured, using = %model, "configured model not installed");
            }
            model
        }
        Err(e) => {
            warn!(error = %e, "could not list models");
            configured.clone()
        }
    }
}

async fn run_repl(args: &Args, config: &Config) -> Result<()> {
    let models = OllamaModelClient::new(Some(config.ollama_url()))?;
    let model = pick_model(&models, config).await;

    println!("{}", "Loading models...".dimmed());
    let embedder = load_embedder(config).await?;
    let store = connect_store(config)?;
    let pipeline = build_pipeline(config, embedder.clone(), store.clone()).await?;
    let loader = build_loader(config, embedder, store.clone(), args.verbosity().show_progress());

    let context = ReplContext {
        pipeline,
        models,
        loader,
        store,
        reranker_model: config.models.reranker_model.clone(),
    };

    let mut repl = ReplSession::new(context, model, Config::history_path())?;
    repl.show_welcome(env!("CARGO_PKG_VERSION")).await;
    repl.run().await
}

async fn classify_once(args: &Args, config: &Config, query: &str) -> Result<()> {
    let embedder = load_embedder(config).await?;
    let store = connect_store(config)?;
    let pipeline = build_pipeline(config, embedder, store).await?;

    let stream = pipeline.classify(&config.ollama.default_model, query).await?;
    let mut mode = DisplayMode::for_stdout();
    let turn = stream_turn(stream, &mut mode).await?;

    if args.verbosity().show_thinking() {
        for (i, thought) in turn.thinking().iter().enumerate() {
            eprintln!("{}", format!("--- model thinking {} ---", i + 1).dimmed());
            eprintln!("{}", thought.trim().dimmed());
        }
    }

    if turn.state() == TurnState::Aborted {
        anyhow::bail!("response interrupted: {}", turn.error().unwrap_or("unknown error"));
    }
    Ok(())
}

async fn run_ingest(args: &Args, config: &Config, reset: bool) -> Result<()> {
    let embedder = load_embedder(config).await?;
    let store = connect_store(config)?;

    if reset {
        info!(collection = %config.qdrant.collection, "resetting collection before ingest");
        store.reset().await?;
    }

    let loader = build_loader(config, embedder, store, args.verbosity().show_progress());
    match loader.load_data().await? {
        LoadOutcome::AlreadyLoaded { count } => {
            println!("Data already loaded in the collection ({} complaints).", count);
            println!("Use --reset to reload it.");
        }
        LoadOutcome::Loaded { ingested, count } => {
            println!(
                "{} Loaded {} complaints from {} ({} in collection)",
                "✓".green(),
                ingested,
                config.ingest.dataset_path.display(),
                count
            );
        }
    }

    Ok(())
}

async fn list_models(config: &Config) -> Result<()> {
    let client = OllamaModelClient::new(Some(config.ollama_url()))?;

    match client.list_chat_models().await {
        Ok(models) if models.is_empty() => {
            println!("No chat models installed.");
            println!("\nPull a model with:");
            println!("  ollama pull {}", config.ollama.default_model);
        }
        Ok(models) => {
            println!("Available chat models:");
            for model in models {
                let marker = if model.name == config.ollama.default_model { "*" } else { " " };
                println!("  {} {:<32} {}", marker, model.name, model.description().dimmed());
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("\nIs Ollama running? Start with: ollama serve");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match (&args.config, Config::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("{} {}", "# Configuration from".dimmed(), source.dimmed());
    println!("{}", config.to_toml()?);
    Ok(())
}
