use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use wheat::config::Config;
use wheat::filter::{self, FilterCriteria, KeywordSource};
use wheat::munge::{self, SegmentBounds};
use wheat::output::subcorpus::{write_scores, write_subcorpus, SubcorpusFormat};
use wheat::output::terminal;
use wheat::topics::{
    self, MalletArtifacts, MalletConfig, MalletTrainer, Preprocessing, TopicModel, TopicTrainer,
    TrainingOptions,
};

/// Wheat: segment a corpus, model its topics, and filter it down to what matters.
#[derive(Parser)]
#[command(name = "wheat", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a file or directory into bounded-length documents and write the corpus file
    Segment {
        /// Text file, or directory of text files
        source: PathBuf,

        /// Where to write the tab-separated corpus
        #[arg(long, short)]
        output: PathBuf,

        #[command(flatten)]
        bounds: BoundsArgs,
    },

    /// Rank vocabulary terms by how strongly they point at the relevant topics
    Keywords {
        #[command(flatten)]
        model: ModelArgs,

        /// Relevant topic indices, comma-separated (e.g. 0,3,7)
        #[arg(long, value_delimiter = ',', required = true)]
        topics: Vec<usize>,

        /// Number of keywords to show
        #[arg(long, short = 'n')]
        count: Option<usize>,
    },

    /// Filter the corpus down to relevant documents
    Filter {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Where to write the subcorpus (prints a summary only when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: SubcorpusFormat,

        /// Also write the per-document score table as JSON
        #[arg(long)]
        scores: Option<PathBuf>,
    },

    /// Filter, then measure precision and recall against hand labels
    Evaluate {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// CSV with `doc_ids` and `relevant` columns
        #[arg(long)]
        labels: PathBuf,
    },
}

#[derive(Args)]
struct BoundsArgs {
    /// Minimum words per document (default: 250, or WHEAT_MIN_WORDS)
    #[arg(long)]
    min_words: Option<usize>,

    /// Maximum words per document (default: 500, or WHEAT_MAX_WORDS)
    #[arg(long)]
    max_words: Option<usize>,
}

impl BoundsArgs {
    fn resolve(&self, config: &Config) -> Result<SegmentBounds> {
        let bounds = SegmentBounds::new(
            self.min_words.unwrap_or(config.min_words),
            self.max_words.unwrap_or(config.max_words),
        )?;
        Ok(bounds)
    }
}

/// Where the topic model comes from: existing MALLET output, or a fresh run.
#[derive(Args)]
struct ModelArgs {
    /// MALLET doc-topics file (all four artifact flags go together)
    #[arg(long)]
    doc_topics: Option<PathBuf>,

    /// MALLET topic word-counts file
    #[arg(long)]
    word_counts: Option<PathBuf>,

    /// MALLET serialized instance list
    #[arg(long)]
    instances: Option<PathBuf>,

    /// Corpus file the instance list was imported from
    #[arg(long)]
    input_corpus: Option<PathBuf>,

    /// Raw text file or directory to segment and train on when no artifacts are given
    #[arg(long, conflicts_with_all = ["doc_topics", "word_counts", "instances", "input_corpus"])]
    corpus: Option<PathBuf>,

    /// Path to the mallet launcher (default: MALLET_PATH)
    #[arg(long)]
    mallet: Option<PathBuf>,

    #[command(flatten)]
    bounds: BoundsArgs,

    /// Number of topics to train
    #[arg(long, default_value = "20")]
    num_topics: usize,

    /// Training iterations
    #[arg(long, default_value = "1000")]
    iterations: usize,

    /// Random seed for training (0 seeds from the clock)
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Drop stopwords before training
    #[arg(long)]
    remove_stopwords: bool,

    /// Stopword language
    #[arg(long, default_value = "english")]
    language: String,
}

#[derive(Args)]
struct CriteriaArgs {
    /// Relevant topic indices, comma-separated (e.g. 0,3,7)
    #[arg(long, value_delimiter = ',', required = true)]
    topics: Vec<usize>,

    /// Keywords, comma-separated or @file with one per line (generated when omitted)
    #[arg(long)]
    keywords: Option<String>,

    /// Length of the generated keyword list (default: 100, or WHEAT_NUM_KEYWORDS)
    #[arg(long, conflicts_with = "keywords")]
    num_keywords: Option<usize>,

    /// Superkeywords, comma-separated or @file with one per line
    #[arg(long)]
    superkeywords: Option<String>,

    /// Keep documents whose relevant-topic proportion exceeds this (default: 0.25)
    #[arg(long)]
    topic_threshold: Option<f64>,

    /// Keep documents whose keyword ratio exceeds this (default: 0.15)
    #[arg(long)]
    keyword_threshold: Option<f64>,
}

impl CriteriaArgs {
    fn build(&self, model: &TopicModel, config: &Config) -> Result<FilterCriteria> {
        let keywords = match &self.keywords {
            Some(list) => KeywordSource::Explicit(parse_terms(list)?),
            None => KeywordSource::Generated(self.num_keywords.unwrap_or(config.num_keywords)),
        };
        let superkeywords = match &self.superkeywords {
            Some(list) => parse_terms(list)?,
            None => Vec::new(),
        };
        let criteria = FilterCriteria::new(model, &self.topics, keywords, &superkeywords)?
            .with_thresholds(
                self.topic_threshold.unwrap_or(config.topic_threshold),
                self.keyword_threshold.unwrap_or(config.keyword_threshold),
            );
        Ok(criteria)
    }
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wheat=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Segment {
            source,
            output,
            bounds,
        } => {
            let bounds = bounds.resolve(&config)?;
            let documents = munge::segment_source(&source, bounds)
                .with_context(|| format!("Failed to segment {}", source.display()))?;

            let fallback = source_name(&source);
            let names: Vec<&str> = documents
                .iter()
                .map(|doc| doc.source().unwrap_or(fallback.as_str()))
                .collect();
            let ids: Vec<usize> = (0..documents.len()).collect();
            munge::write_corpus(&documents, &ids, &names, &output)?;

            terminal::display_segments(&documents, bounds.min_words);
            println!("Corpus written to: {}", output.display());
        }

        Commands::Keywords {
            model,
            topics: relevant,
            count,
        } => {
            let snapshot = load_model(&model, &config)?;
            let n = count.unwrap_or(config.num_keywords);
            let ranked = topics::rank_keywords(
                snapshot.word_counts(),
                snapshot.vocabulary(),
                &relevant,
                n,
            )?;
            terminal::display_keywords(&ranked, &relevant);
        }

        Commands::Filter {
            model,
            criteria,
            output,
            format,
            scores,
        } => {
            let snapshot = load_model(&model, &config)?;
            let criteria = criteria.build(&snapshot, &config)?;

            let table = filter::score_documents(&snapshot, &criteria)?;
            let subcorpus = filter::subcorpus_from_scores(&snapshot, &table);
            terminal::display_filter_summary(&table, &subcorpus, &criteria, snapshot.n_docs());

            if let Some(path) = scores {
                write_scores(&table, &path)?;
                println!("Scores written to: {}", path.display());
            }
            if let Some(path) = output {
                write_subcorpus(&subcorpus, &path, format)?;
                println!("Subcorpus written to: {}", path.display());
            } else {
                println!("{}", "Pass --output to save the subcorpus.".dimmed());
            }
        }

        Commands::Evaluate {
            model,
            criteria,
            labels,
        } => {
            let snapshot = load_model(&model, &config)?;
            let criteria = criteria.build(&snapshot, &config)?;
            let labels = filter::read_labels(&labels)?;
            let labels = filter::labels_for_snapshot(labels, &snapshot);
            if labels.is_empty() {
                anyhow::bail!("None of the labeled documents are in the topic model.");
            }

            let subcorpus = filter::filter_corpus(&snapshot, &criteria)?;
            let report = filter::evaluate_subset(&subcorpus, &labels);
            terminal::display_report(&report);
        }
    }

    Ok(())
}

/// Load a snapshot from MALLET artifacts, or segment and train from raw text.
fn load_model(args: &ModelArgs, config: &Config) -> Result<TopicModel> {
    let artifacts = MalletArtifacts::from_parts(
        args.doc_topics.clone(),
        args.word_counts.clone(),
        args.instances.clone(),
        args.input_corpus.clone(),
    )?;
    let mallet = resolve_mallet(args, config)?;

    let (model, min_words) = match artifacts {
        Some(artifacts) => {
            let model = artifacts
                .load(&mallet)
                .context("Failed to load MALLET artifacts")?;
            (model, None)
        }
        None => {
            let Some(source) = &args.corpus else {
                anyhow::bail!(
                    "No topic model given. Pass --corpus to train one, or all of \
                     --doc-topics, --word-counts, --instances and --input-corpus."
                );
            };
            let bounds = args.bounds.resolve(config)?;
            let documents = munge::segment_source(source, bounds)
                .with_context(|| format!("Failed to segment {}", source.display()))?;

            let preprocessing = Preprocessing {
                remove_stopwords: args.remove_stopwords,
                language: args.language.to_lowercase(),
                ..Preprocessing::default()
            };
            let prepared = preprocessing.prepare(&documents, &source_name(source))?;

            let trainer = MalletTrainer::new(
                mallet,
                TrainingOptions {
                    num_topics: args.num_topics,
                    iterations: args.iterations,
                    random_seed: args.seed,
                    ..TrainingOptions::default()
                },
            );
            let model = with_spinner(
                format!("Training {} topics on {} documents", args.num_topics, prepared.len()),
                || trainer.train(&prepared),
            )
            .context("Topic model training failed")?;
            (model, Some(bounds.min_words))
        }
    };

    let warnings = model.quality_warnings(min_words);
    terminal::display_warnings(&warnings);
    info!(
        docs = model.n_docs(),
        topics = model.n_topics(),
        warnings = warnings.len(),
        "Topic model ready"
    );
    Ok(model)
}

/// The mallet launcher from --mallet, else MALLET_PATH.
fn resolve_mallet(args: &ModelArgs, config: &Config) -> Result<MalletConfig> {
    match &args.mallet {
        Some(path) => Ok(MalletConfig::new(path.clone())),
        None => config.require_mallet(),
    }
}

/// Run a blocking call behind a terminal spinner.
fn with_spinner<T>(message: String, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg} ({elapsed})")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Parse a term list: comma-separated, or `@path` for one term per line.
fn parse_terms(list: &str) -> Result<Vec<String>> {
    let raw = match list.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read term list {path}"))?,
        None => list.replace(',', "\n"),
    };
    Ok(raw
        .lines()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect())
}

/// File name used as the source name in the corpus file.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
