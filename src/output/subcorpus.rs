// Subcorpus and score-table files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WheatError};
use crate::filter::engine::{DocumentScores, Subcorpus};

/// File format for a written subcorpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum SubcorpusFormat {
    /// One JSON object: doc id -> raw text
    #[default]
    Json,
    /// `<doc_id>\t<raw_text>` per line
    Tsv,
}

/// Write a subcorpus to `path`, overwriting it.
pub fn write_subcorpus(subcorpus: &Subcorpus, path: &Path, format: SubcorpusFormat) -> Result<()> {
    let file = File::create(path).map_err(|e| WheatError::io(path, e))?;
    let mut out = BufWriter::new(file);

    match format {
        SubcorpusFormat::Json => {
            serde_json::to_writer_pretty(&mut out, subcorpus)
                .map_err(|e| WheatError::io(path, e.into()))?;
            writeln!(out).map_err(|e| WheatError::io(path, e))?;
        }
        SubcorpusFormat::Tsv => {
            for (id, raw) in subcorpus.iter() {
                // Raw text keeps its punctuation; only line structure is flattened.
                let flat = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                writeln!(out, "{id}\t{flat}").map_err(|e| WheatError::io(path, e))?;
            }
        }
    }
    out.flush().map_err(|e| WheatError::io(path, e))?;

    info!(path = %path.display(), documents = subcorpus.len(), ?format, "Wrote subcorpus");
    Ok(())
}

/// Write the per-document score table as JSON.
pub fn write_scores(scores: &[DocumentScores], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| WheatError::io(path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, scores).map_err(|e| WheatError::io(path, e.into()))?;
    out.flush().map_err(|e| WheatError::io(path, e))?;
    Ok(())
}
