//! docqa: ask questions about a single PDF, DOCX, PPTX or text document.
//!
//! Usage:
//!   docqa ask report.pdf "What is the warranty period?"
//!   docqa chat slides.pptx --strategy dense
//!   docqa search notes.docx "solar inverter" --limit 5

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use docqa_core::config::{resolve_with_base, Config, Settings};
use docqa_core::{cancel_pair, StrategyKind};
use docqa_rag::{AnswerOutcome, IndexedDocument, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "docqa", version, about = "Question answering over a single document")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer one question and exit
    Ask {
        file: String,
        question: String,
        /// sparse (TF-IDF) or dense (embeddings)
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
    /// Ask questions interactively until EOF or `exit`
    Chat {
        file: String,
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
    /// Show the best matching chunks without generating an answer
    Search {
        file: String,
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        strategy: Option<StrategyKind>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn load_document(
    pipeline: &Pipeline,
    base: &Path,
    file: &str,
    strategy: StrategyKind,
) -> anyhow::Result<IndexedDocument> {
    let path = resolve_with_base(base, file);
    let pb = spinner(&format!("Processing {} ({strategy})", path.display()));
    let doc = pipeline.process_file(&path, strategy).await;
    pb.finish_and_clear();
    let doc = doc?;
    eprintln!("Indexed {} chunks from {}", doc.len(), path.display());
    Ok(doc)
}

/// Ask one question; Ctrl-C cancels the in-flight request.
async fn answer(pipeline: &Pipeline, doc: &IndexedDocument, question: &str) -> AnswerOutcome {
    let (handle, token) = cancel_pair();
    let pb = spinner("Thinking");
    let ask = pipeline.ask_with_cancel(question, doc, &token);
    tokio::pin!(ask);
    let outcome = tokio::select! {
        outcome = &mut ask => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("cancelling request");
            handle.cancel();
            ask.await
        }
    };
    pb.finish_and_clear();
    outcome
}

fn render(outcome: &AnswerOutcome) {
    if outcome.is_service_failure() {
        eprintln!("⚠️  {outcome}");
    } else {
        println!("{outcome}");
    }
}

async fn chat(pipeline: &Pipeline, doc: &IndexedDocument) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        render(&answer(pipeline, doc, question).await);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings: Settings = config.settings()?;
    let pipeline = Pipeline::from_settings(&settings)?;
    let default_strategy = settings.retrieval.strategy;
    let base = config.documents_dir(&std::env::current_dir()?);

    match cli.command {
        Command::Ask { file, question, strategy } => {
            let doc = load_document(&pipeline, &base, &file, strategy.unwrap_or(default_strategy)).await?;
            let outcome = answer(&pipeline, &doc, &question).await;
            render(&outcome);
            if outcome.is_service_failure() {
                std::process::exit(2);
            }
        }
        Command::Chat { file, strategy } => {
            let doc = load_document(&pipeline, &base, &file, strategy.unwrap_or(default_strategy)).await?;
            chat(&pipeline, &doc).await?;
        }
        Command::Search { file, query, limit, strategy } => {
            let doc = load_document(&pipeline, &base, &file, strategy.unwrap_or(default_strategy)).await?;
            let result = pipeline.search(&query, &doc, limit.unwrap_or(settings.retrieval.top_k)).await;
            if result.is_empty() {
                println!("No matching chunks.");
            }
            for (rank, hit) in result.hits.iter().enumerate() {
                println!("{}. [chunk {} | score {:.4}] {}", rank + 1, hit.chunk.position, hit.score, hit.chunk.text);
            }
        }
    }
    Ok(())
}
