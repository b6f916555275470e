// Document preparation before training: clean, lowercase, drop stopwords.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

use crate::error::{Result, WheatError};
use crate::munge::clean::PunctuationStripper;
use crate::munge::segment::Document;

/// A document ready for the trainer: stable id, model text, and raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedDocument {
    pub id: String,
    /// Source name written to the trainer's input file
    pub name: String,
    pub cleaned: String,
    pub raw: String,
}

/// How documents are preprocessed for the model.
#[derive(Debug, Clone)]
pub struct Preprocessing {
    pub remove_stopwords: bool,
    /// Lowercase language name, e.g. "english"
    pub language: String,
    pub stripper: PunctuationStripper,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            remove_stopwords: false,
            language: "english".to_string(),
            stripper: PunctuationStripper::default().lowercasing(true),
        }
    }
}

/// Map a language name to the stop-words crate's enum.
fn stopword_language(name: &str) -> Result<LANGUAGE> {
    let language = match name {
        "english" => LANGUAGE::English,
        "french" => LANGUAGE::French,
        "german" => LANGUAGE::German,
        "spanish" => LANGUAGE::Spanish,
        "italian" => LANGUAGE::Italian,
        "portuguese" => LANGUAGE::Portuguese,
        "dutch" => LANGUAGE::Dutch,
        "russian" => LANGUAGE::Russian,
        other => return Err(WheatError::UnsupportedLanguage(other.to_string())),
    };
    Ok(language)
}

impl Preprocessing {
    fn stopwords(&self) -> Result<HashSet<String>> {
        if !self.remove_stopwords {
            return Ok(HashSet::new());
        }
        let words: Vec<String> = get(stopword_language(&self.language)?);
        Ok(words.into_iter().map(|w| w.to_lowercase()).collect())
    }

    /// Prepare segmented documents. Ids are `doc<i>` in corpus order.
    ///
    /// Each document keeps the file it was segmented from as its name;
    /// `name` is the fallback for documents with no recorded source.
    pub fn prepare(&self, documents: &[Document], name: &str) -> Result<Vec<PreparedDocument>> {
        let stopwords = self.stopwords()?;
        Ok(documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let cleaned = doc
                    .cleaned(&self.stripper)
                    .split_whitespace()
                    .filter(|w| !stopwords.contains(&w.to_lowercase()))
                    .collect::<Vec<_>>()
                    .join(" ");
                PreparedDocument {
                    id: format!("doc{i}"),
                    name: doc.source().unwrap_or(name).to_string(),
                    cleaned,
                    raw: doc.raw().to_string(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::munge::segment::{segment, SegmentBounds};

    #[test]
    fn lowercases_and_assigns_sequential_ids() {
        let docs = segment("The Whale swam. The Fox ran.", SegmentBounds::new(3, 10).unwrap())
            .unwrap();
        let prepared = Preprocessing::default().prepare(&docs, "tale.txt").unwrap();
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].id, "doc0");
        assert_eq!(prepared[0].cleaned, "the whale swam");
        assert_eq!(prepared[0].raw, "The Whale swam.");
        assert_eq!(prepared[1].name, "tale.txt");
    }

    #[test]
    fn removes_stopwords_when_asked() {
        let docs = segment("The whale and the fox.", SegmentBounds::new(1, 10).unwrap()).unwrap();
        let prep = Preprocessing {
            remove_stopwords: true,
            ..Preprocessing::default()
        };
        let prepared = prep.prepare(&docs, "x").unwrap();
        assert_eq!(prepared[0].cleaned, "whale fox");
    }

    #[test]
    fn unknown_language_is_a_config_error() {
        let prep = Preprocessing {
            remove_stopwords: true,
            language: "klingon".to_string(),
            ..Preprocessing::default()
        };
        assert!(prep.prepare(&[], "x").unwrap_err().is_config());
    }
}
