use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::filter::criteria::{DEFAULT_KEYWORD_THRESHOLD, DEFAULT_TOPIC_THRESHOLD};
use crate::munge::segment::{SegmentBounds, DEFAULT_MAX_WORDS, DEFAULT_MIN_WORDS};
use crate::topics::keywords::DEFAULT_KEYWORD_COUNT;
use crate::topics::mallet::MalletConfig;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override anything set here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the MALLET launcher script (MALLET_PATH)
    pub mallet_path: Option<PathBuf>,
    pub min_words: usize,
    pub max_words: usize,
    pub topic_threshold: f64,
    pub keyword_threshold: f64,
    /// Length of generated keyword lists
    pub num_keywords: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mallet_path: None,
            min_words: DEFAULT_MIN_WORDS,
            max_words: DEFAULT_MAX_WORDS,
            topic_threshold: DEFAULT_TOPIC_THRESHOLD,
            keyword_threshold: DEFAULT_KEYWORD_THRESHOLD,
            num_keywords: DEFAULT_KEYWORD_COUNT,
        }
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name}={raw:?} is not a valid value")),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the MALLET path, which is only needed
    /// when a command has to run MALLET.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            mallet_path: env::var("MALLET_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            min_words: env_or("WHEAT_MIN_WORDS", defaults.min_words)?,
            max_words: env_or("WHEAT_MAX_WORDS", defaults.max_words)?,
            topic_threshold: env_or("WHEAT_TOPIC_THRESHOLD", defaults.topic_threshold)?,
            keyword_threshold: env_or("WHEAT_KEYWORD_THRESHOLD", defaults.keyword_threshold)?,
            num_keywords: env_or("WHEAT_NUM_KEYWORDS", defaults.num_keywords)?,
        })
    }

    /// Segment bounds, validated.
    pub fn bounds(&self) -> Result<SegmentBounds> {
        Ok(SegmentBounds::new(self.min_words, self.max_words)?)
    }

    /// Check that MALLET is configured.
    /// Call this before any operation that runs MALLET.
    pub fn require_mallet(&self) -> Result<MalletConfig> {
        match &self.mallet_path {
            Some(path) => Ok(MalletConfig::new(path.clone())),
            None => anyhow::bail!(
                "MALLET_PATH not set. Add it to your .env file or pass --mallet.\n\
                 It should point at the `mallet` launcher in your MALLET install's bin/ directory."
            ),
        }
    }
}
