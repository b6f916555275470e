// MALLET adapter — artifact parsing and training runs.
//
// Two ways to get a snapshot:
//
// 1. Load the artifacts of an earlier run: the doc-topics table, the
//    topic word-counts table, the serialized instance list (queried through
//    `mallet info --print-instances` for the model's token sequences) and
//    the input corpus file (for raw text). All four or none.
// 2. Train: write the prepared corpus, `mallet import-file`, then
//    `mallet train-topics`, then parse what it wrote.
//
// The path to the mallet binary is always passed in explicitly.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prepare::PreparedDocument;
use super::snapshot::{TopicModel, TopicWordCounts};
use super::traits::TopicTrainer;
use crate::error::{Result, WheatError};
use crate::munge::clean::PunctuationStripper;
use crate::munge::writer::{read_corpus, write_corpus_with};

/// Token lines in `mallet info --print-instances` output look like
/// `<name> 0: token (17)` or `1: token (4)`.
static INSTANCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(": (.*?) ").expect("instance token pattern is a valid regex"));

/// Where to find the MALLET binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalletConfig {
    pub path: PathBuf,
}

impl Default for MalletConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mallet"),
        }
    }
}

impl MalletConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Check that the binary can be started. Does not run a command.
    pub fn probe(&self) -> Result<()> {
        Command::new(&self.path)
            .output()
            .map(|_| ())
            .map_err(|e| WheatError::TrainerUnavailable {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    /// Run a mallet subcommand, returning its stdout.
    fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let command = format!("{} {}", self.path.display(), args.join(" "));
        debug!(%command, "Running mallet");
        let output = Command::new(&self.path)
            .args(args)
            .output()
            .map_err(|e| WheatError::TrainerUnavailable {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(WheatError::Trainer {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// The four files of an earlier MALLET run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalletArtifacts {
    pub doc_topics: PathBuf,
    pub word_counts: PathBuf,
    pub instances: PathBuf,
    pub input_corpus: PathBuf,
}

impl MalletArtifacts {
    /// All four paths or none. `Ok(None)` means "train instead"; a partial
    /// set is a configuration error naming what is missing.
    pub fn from_parts(
        doc_topics: Option<PathBuf>,
        word_counts: Option<PathBuf>,
        instances: Option<PathBuf>,
        input_corpus: Option<PathBuf>,
    ) -> Result<Option<Self>> {
        match (doc_topics, word_counts, instances, input_corpus) {
            (None, None, None, None) => Ok(None),
            (Some(doc_topics), Some(word_counts), Some(instances), Some(input_corpus)) => {
                Ok(Some(Self {
                    doc_topics,
                    word_counts,
                    instances,
                    input_corpus,
                }))
            }
            (d, w, i, c) => {
                let missing = [
                    ("doc_topics", d.is_none()),
                    ("word_counts", w.is_none()),
                    ("instances", i.is_none()),
                    ("input_corpus", c.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(WheatError::PartialArtifacts { missing })
            }
        }
    }

    /// Load a snapshot from the artifacts.
    pub fn load(&self, config: &MalletConfig) -> Result<TopicModel> {
        let doc_topics = read_doc_topics(&self.doc_topics)?;
        let n_topics = doc_topics.first().map_or(0, |(_, row)| row.len());
        let (word_counts, vocabulary) = read_word_counts(&self.word_counts, n_topics)?;

        let listing = config.run(&[
            "info",
            "--input",
            &self.instances.to_string_lossy(),
            "--print-instances",
        ])?;
        let cleaned = parse_instance_listing(&listing[..], &self.instances)?;

        let raw: HashMap<String, String> = read_corpus(&self.input_corpus)?
            .into_iter()
            .map(|r| (r.unique_id, r.cleaned_text))
            .collect();

        let mut texts = Vec::with_capacity(cleaned.len());
        for (id, cleaned_text) in cleaned {
            let Some(raw_text) = raw.get(&id) else {
                return Err(WheatError::InconsistentModel(format!(
                    "document {id:?} is in the instance list but not in {}",
                    self.input_corpus.display()
                )));
            };
            texts.push((id, cleaned_text, raw_text.clone()));
        }

        let model = TopicModel::new(texts, doc_topics, word_counts, vocabulary)?;
        info!(
            docs = model.n_docs(),
            topics = model.n_topics(),
            vocabulary = model.n_voc_words(),
            "Loaded topic model from MALLET artifacts"
        );
        Ok(model)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| WheatError::io(path, e))
}

/// Parse a doc-topics table: `<index> <doc_id> <p_0> ... <p_k>` per line.
/// Lines starting with `#` are headers.
pub fn read_doc_topics(path: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    parse_doc_topics(open(path)?, path)
}

pub fn parse_doc_topics<R: BufRead>(reader: R, path: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    let mut rows: Vec<(String, Vec<f64>)> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| WheatError::io(path, e))?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(_index), Some(doc_id)) = (fields.next(), fields.next()) else {
            return Err(WheatError::malformed(path, i + 1, "expected <index> <doc_id> <proportions...>"));
        };
        let row = fields
            .map(|f| {
                f.parse::<f64>()
                    .map_err(|_| WheatError::malformed(path, i + 1, format!("bad proportion {f:?}")))
            })
            .collect::<Result<Vec<f64>>>()?;
        if let Some((_, first)) = rows.first() {
            if first.len() != row.len() {
                return Err(WheatError::malformed(
                    path,
                    i + 1,
                    format!("{} proportions, expected {}", row.len(), first.len()),
                ));
            }
        }
        rows.push((doc_id.to_string(), row));
    }
    Ok(rows)
}

/// Parse a topic word-counts table: `<index> <term> <topic>:<count> ...`.
/// Line order defines the vocabulary order.
pub fn read_word_counts(path: &Path, n_topics: usize) -> Result<(TopicWordCounts, Vec<String>)> {
    parse_word_counts(open(path)?, path, n_topics)
}

pub fn parse_word_counts<R: BufRead>(
    reader: R,
    path: &Path,
    n_topics: usize,
) -> Result<(TopicWordCounts, Vec<String>)> {
    let mut vocabulary = Vec::new();
    let mut entries: Vec<(usize, usize, u64)> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| WheatError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(_index), Some(term)) = (fields.next(), fields.next()) else {
            return Err(WheatError::malformed(path, i + 1, "expected <index> <term> <topic:count...>"));
        };
        let word = vocabulary.len();
        vocabulary.push(term.to_string());

        for pair in fields {
            let parsed = pair
                .split_once(':')
                .and_then(|(t, c)| Some((t.parse::<usize>().ok()?, c.parse::<u64>().ok()?)));
            let Some((topic, count)) = parsed else {
                return Err(WheatError::malformed(path, i + 1, format!("bad topic:count pair {pair:?}")));
            };
            if topic >= n_topics {
                return Err(WheatError::malformed(
                    path,
                    i + 1,
                    format!("topic {topic} outside a {n_topics}-topic model"),
                ));
            }
            entries.push((topic, word, count));
        }
    }

    let mut counts = TopicWordCounts::new(n_topics, vocabulary.len());
    for (topic, word, count) in entries {
        counts.add(topic, word, count)?;
    }
    Ok((counts, vocabulary))
}

/// Parse `mallet info --print-instances` output into `(doc_id, text)` pairs.
///
/// Each document is a block of token lines; the first token line starts
/// with the document id. A line without a token ends the block.
pub fn parse_instance_listing<R: Read>(reader: R, path: &Path) -> Result<Vec<(String, String)>> {
    let mut docs = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current: Vec<String> = Vec::new();

    for line in BufReader::new(reader).lines() {
        let line = line.map_err(|e| WheatError::io(path, e))?;
        match INSTANCE_TOKEN.captures(&line) {
            Some(caps) => {
                if current_id.is_none() {
                    current_id = line.split_whitespace().next().map(str::to_string);
                }
                current.push(caps[1].to_string());
            }
            None => {
                if let Some(id) = current_id.take() {
                    docs.push((id, current.join(" ")));
                    current.clear();
                }
            }
        }
    }
    if let Some(id) = current_id {
        docs.push((id, current.join(" ")));
    }
    Ok(docs)
}

/// Parameters forwarded to `mallet train-topics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    pub num_topics: usize,
    pub iterations: usize,
    /// 0 switches hyperparameter optimization off
    pub optimize_interval: usize,
    pub alpha: f64,
    pub workers: usize,
    /// 0 seeds from the clock
    pub random_seed: u64,
    pub topic_threshold: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            num_topics: 20,
            iterations: 1000,
            optimize_interval: 0,
            alpha: 50.0,
            workers: 4,
            random_seed: 0,
            topic_threshold: 0.0,
        }
    }
}

/// Trains a topic model by driving the MALLET command line.
#[derive(Debug, Clone, Default)]
pub struct MalletTrainer {
    pub config: MalletConfig,
    pub options: TrainingOptions,
}

impl MalletTrainer {
    pub fn new(config: MalletConfig, options: TrainingOptions) -> Self {
        Self { config, options }
    }
}

impl TopicTrainer for MalletTrainer {
    fn train(&self, documents: &[PreparedDocument]) -> Result<TopicModel> {
        self.config.probe()?;
        let work = tempfile::tempdir().map_err(|e| WheatError::io(std::env::temp_dir(), e))?;
        let input = work.path().join("corpus.txt");
        let instances = work.path().join("corpus.mallet");
        let doc_topics = work.path().join("doctopics.txt");
        let word_counts = work.path().join("wordtopiccounts.txt");

        let cleaned: Vec<&str> = documents.iter().map(|d| d.cleaned.as_str()).collect();
        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        // Already cleaned; keep underscores of phrase-joined terms intact.
        let passthrough = PunctuationStripper::default().preserving(['_']);
        write_corpus_with(&cleaned, &ids, &names, &input, &passthrough)?;

        let path_arg = |p: &Path| p.to_string_lossy().into_owned();
        self.config.run(&[
            "import-file",
            "--input",
            &path_arg(&input),
            "--output",
            &path_arg(&instances),
            "--keep-sequence",
            "--token-regex",
            "\\S+",
        ])?;

        let o = &self.options;
        info!(
            docs = documents.len(),
            topics = o.num_topics,
            iterations = o.iterations,
            "Training topic model with MALLET"
        );
        self.config.run(&[
            "train-topics",
            "--input",
            &path_arg(&instances),
            "--num-topics",
            &o.num_topics.to_string(),
            "--alpha",
            &o.alpha.to_string(),
            "--optimize-interval",
            &o.optimize_interval.to_string(),
            "--num-threads",
            &o.workers.to_string(),
            "--num-iterations",
            &o.iterations.to_string(),
            "--doc-topics-threshold",
            &o.topic_threshold.to_string(),
            "--random-seed",
            &o.random_seed.to_string(),
            "--output-doc-topics",
            &path_arg(&doc_topics),
            "--word-topic-counts-file",
            &path_arg(&word_counts),
        ])?;

        let rows = read_doc_topics(&doc_topics)?;
        let (counts, vocabulary) = read_word_counts(&word_counts, o.num_topics)?;
        let texts = documents
            .iter()
            .map(|d| (d.id.clone(), d.cleaned.clone(), d.raw.clone()))
            .collect();
        TopicModel::new(texts, rows, counts, vocabulary)
    }
}
