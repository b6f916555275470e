// Corpus loading from a single file or a directory of files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, WheatError};

/// One raw source unit (a file) and its text.
#[derive(Debug, Clone, Serialize)]
pub struct SourceText {
    /// File name, used as the document name in the persisted corpus
    pub name: String,
    pub text: String,
}

/// An ordered collection of raw source units. Immutable once loaded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Corpus {
    sources: Vec<SourceText>,
}

impl Corpus {
    pub fn new(sources: Vec<SourceText>) -> Self {
        Self { sources }
    }

    /// Load a corpus from a file or a directory.
    ///
    /// Directories are read one level deep in file-name order. Hidden files
    /// (names starting with ".") and files that are not valid UTF-8 text are
    /// skipped; subdirectories are ignored.
    pub fn load(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| WheatError::io(path, e))?;
        if meta.is_file() {
            let text = fs::read_to_string(path).map_err(|e| WheatError::io(path, e))?;
            return Ok(Self::new(vec![SourceText {
                name: file_name(path),
                text,
            }]));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(path)
            .map_err(|e| WheatError::io(path, e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        let mut sources = Vec::new();
        for entry in entries {
            let name = file_name(&entry);
            if name.starts_with('.') {
                debug!(file = %entry.display(), "Skipping hidden file");
                continue;
            }
            let bytes = fs::read(&entry).map_err(|e| WheatError::io(&entry, e))?;
            match String::from_utf8(bytes) {
                Ok(text) => sources.push(SourceText { name, text }),
                Err(_) => debug!(file = %entry.display(), "Skipping non-text file"),
            }
        }

        info!(
            directory = %path.display(),
            files = sources.len(),
            "Loaded corpus directory"
        );
        Ok(Self::new(sources))
    }

    pub fn sources(&self) -> &[SourceText] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|s| s.text.trim().is_empty())
    }

    /// All sources concatenated into one blob, separated by newlines.
    pub fn text(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
