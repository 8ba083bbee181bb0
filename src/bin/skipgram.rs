use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rayon::ThreadPoolBuilder;
use serde_json::json;
use skipgram::{
    BatchConfig, BatchGenerator, IngestConfig, TokenId, VocabConfig, VocabularyArtifacts,
    VocabularyBuilder, Vocabulary,
};

const DEFAULT_VOCAB_SIZE: usize = 50_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Skip-gram vocabulary and batch toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a bounded vocabulary and summarise it
    Vocab(VocabArgs),
    /// Print consecutive skip-gram batches
    Batches(BatchesArgs),
}

#[derive(Args, Debug)]
struct CorpusArgs {
    /// Whitespace-delimited text files or directories to ingest
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Vocabulary size including the UNK sentinel
    #[arg(long, value_name = "SIZE", default_value_t = DEFAULT_VOCAB_SIZE)]
    vocab_size: usize,

    /// Label used for the out-of-vocabulary sentinel
    #[arg(long, value_name = "TOKEN")]
    unk_token: Option<String>,

    /// Only read the first COUNT tokens of the inputs
    #[arg(long, value_name = "COUNT")]
    max_tokens: Option<usize>,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,

    /// Disable progress logging and the spinner
    #[arg(long)]
    no_progress: bool,

    /// Limit Rayon worker threads used while counting
    #[arg(long, value_name = "N")]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct VocabArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Number of most common entries (UNK included) to show
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    top: usize,

    /// Number of leading encoded positions to show
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    sample: usize,

    /// Emit a machine-readable JSON summary
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BatchesArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Rows per batch (a multiple of 2 * skip-window)
    #[arg(long, value_name = "ROWS", default_value_t = 8)]
    batch_size: usize,

    /// Context tokens on each side of the target
    #[arg(long, value_name = "WIDTH", default_value_t = 1)]
    skip_window: usize,

    /// Number of consecutive batches to print
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    count: usize,

    /// Corpus position of the first window
    #[arg(long, value_name = "POS", default_value_t = 0)]
    start: usize,

    /// Emit one JSON object per batch
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Vocab(args) => run_vocab(args),
        Commands::Batches(args) => run_batches(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn build_artifacts(args: &CorpusArgs) -> Result<VocabularyArtifacts> {
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("unable to configure Rayon thread pool")?;
    }

    let mut cfg = VocabConfig::builder()
        .vocab_size(args.vocab_size)
        .show_progress(!args.no_progress);
    if let Some(unk) = &args.unk_token {
        cfg = cfg.unk_token(unk.clone());
    }
    let vocab_cfg = cfg.build()?;

    let ingest_cfg = IngestConfig::builder()
        .recursive(!args.no_recursive)
        .follow_symlinks(args.follow_symlinks)
        .max_tokens(args.max_tokens)
        .build();

    let tokens = skipgram::corpus::load_tokens(&args.inputs, &ingest_cfg)
        .with_context(|| "failed to load corpus")?;
    info!("loaded {} tokens", tokens.len());

    let spinner = if args.no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} building vocabulary... {elapsed}")
            .context("invalid progress template")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    };

    let artifacts = VocabularyBuilder::new(vocab_cfg).build(&tokens)?;
    drop(tokens);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    Ok(artifacts)
}

fn labelled(vocabulary: &Vocabulary, ids: &[TokenId]) -> Vec<String> {
    ids.iter()
        .map(|&id| vocabulary.token(id).unwrap_or("?").to_owned())
        .collect()
}

fn run_vocab(args: VocabArgs) -> Result<()> {
    let artifacts = build_artifacts(&args.corpus)?;
    let vocabulary = &artifacts.vocabulary;
    let frequencies = &artifacts.frequencies;
    let metrics = &artifacts.metrics;
    let sample_len = args.sample.min(artifacts.corpus.len());
    let sample_ids = &artifacts.corpus[..sample_len];

    if args.json {
        let summary = json!({
            "corpus_tokens": metrics.corpus_tokens,
            "distinct_tokens": metrics.distinct_tokens,
            "vocab_size": vocabulary.len(),
            "unk_token": vocabulary.unk_token(),
            "unk_count": frequencies.unk_count(),
            "most_common": frequencies.most_common(args.top),
            "sample_ids": sample_ids,
            "sample_tokens": labelled(vocabulary, sample_ids),
            "elapsed_secs": metrics.elapsed_total.as_secs_f64(),
            "rss_kb": metrics.rss_kb,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Corpus tokens  : {}", metrics.corpus_tokens);
    println!("Distinct tokens: {}", metrics.distinct_tokens);
    println!("Vocab size     : {}", vocabulary.len());
    println!(
        "{:<15}: {} ({:.2}%)",
        vocabulary.unk_token(),
        frequencies.unk_count(),
        metrics.unk_ratio() * 100.0
    );
    println!("Most common (+{}):", vocabulary.unk_token());
    for (id, entry) in frequencies.most_common(args.top).iter().enumerate() {
        println!("  {id:>6} {:<20} {}", entry.token, entry.count);
    }
    println!("Sample data:");
    println!(
        "  {}",
        sample_ids
            .iter()
            .map(TokenId::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!("  {}", labelled(vocabulary, sample_ids).join(" "));

    Ok(())
}

fn run_batches(args: BatchesArgs) -> Result<()> {
    let batch_cfg = BatchConfig::new(args.batch_size, args.skip_window)?;
    let artifacts = build_artifacts(&args.corpus)?;
    let vocabulary = &artifacts.vocabulary;
    let mut generator = BatchGenerator::with_cursor(artifacts.corpus.clone(), args.start)?;

    for index in 0..args.count {
        let cursor = generator.cursor();
        let batch = generator.generate_with(&batch_cfg)?;
        if args.json {
            let record = json!({
                "batch": index,
                "cursor": cursor,
                "targets": batch.targets,
                "contexts": batch.contexts,
            });
            println!("{}", serde_json::to_string(&record)?);
            continue;
        }
        println!("batch {index} (cursor {cursor}):");
        for (target, context) in batch.pairs() {
            println!(
                "  {target:>6} {:<16} -> {context:>6} {}",
                vocabulary.token(target).unwrap_or("?"),
                vocabulary.token(context).unwrap_or("?")
            );
        }
    }
    info!("next cursor {}", generator.cursor());

    Ok(())
}
