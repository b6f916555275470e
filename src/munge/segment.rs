// Corpus segmentation — sentence-aware chunking with hard size bounds.
//
// Sentences accumulate into a buffer until it holds at least `min_words`
// tokens, at which point the buffer becomes a document. A sentence that
// pushes the buffer past `max_words` is cut into exact `max_words` slices
// first. Leftover tokens at the end of the corpus are folded into the last
// document so nothing is dropped.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::clean::PunctuationStripper;
use super::sentences::{ends_with_terminal, SentenceSplitter};
use super::source::{Corpus, SourceText};
use crate::error::{Result, WheatError};

pub const DEFAULT_MIN_WORDS: usize = 250;
pub const DEFAULT_MAX_WORDS: usize = 500;

/// Word-count bounds for segmented documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for SegmentBounds {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl SegmentBounds {
    pub fn new(min_words: usize, max_words: usize) -> Result<Self> {
        let bounds = Self {
            min_words,
            max_words,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_words == 0 || self.min_words > self.max_words {
            return Err(WheatError::InvalidBounds {
                min_words: self.min_words,
                max_words: self.max_words,
            });
        }
        Ok(())
    }
}

/// A contiguous run of whitespace-delimited tokens.
///
/// The raw form keeps punctuation; whitespace is normalized to single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    word_count: usize,
    /// File the first token came from, when segmented from a loaded corpus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl Document {
    fn from_tokens(tokens: &[&str]) -> Self {
        Self {
            text: tokens.join(" "),
            word_count: tokens.len(),
            source: None,
        }
    }

    fn absorb(&mut self, tokens: &[&str]) {
        for token in tokens {
            self.text.push(' ');
            self.text.push_str(token);
        }
        self.word_count += tokens.len();
    }

    /// Raw text, punctuation preserved.
    pub fn raw(&self) -> &str {
        &self.text
    }

    /// Cleaned text, punctuation stripped.
    pub fn cleaned(&self, stripper: &PunctuationStripper) -> String {
        stripper.clean(&self.text)
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }

    /// Name of the source file the document starts in, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the document ends on a sentence-ending mark, allowing
    /// trailing closing quotes or brackets.
    pub fn ends_sentence(&self) -> bool {
        ends_with_terminal(&self.text)
    }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Segment a text blob into bounded-length documents.
///
/// The sentence splitter is trained on the text itself before splitting.
pub fn segment(text: &str, bounds: SegmentBounds) -> Result<Vec<Document>> {
    bounds.validate()?;
    let splitter = SentenceSplitter::train(text);
    let documents = segment_sentences(splitter.split(text), bounds);

    if let [only] = documents.as_slice() {
        if only.word_count() < bounds.min_words {
            warn!(
                words = only.word_count(),
                min_words = bounds.min_words,
                "Corpus is smaller than one document; emitting a single undersized document"
            );
        }
    }
    info!(
        documents = documents.len(),
        min_words = bounds.min_words,
        max_words = bounds.max_words,
        "Segmented corpus"
    );
    Ok(documents)
}

/// Load a file or directory and segment its concatenated text.
///
/// Documents may span file boundaries; each one records the file its first
/// token came from.
pub fn segment_source(path: &Path, bounds: SegmentBounds) -> Result<Vec<Document>> {
    bounds.validate()?;
    let corpus = Corpus::load(path)?;
    let mut documents = segment(&corpus.text(), bounds)?;
    attribute_sources(&mut documents, corpus.sources());
    Ok(documents)
}

fn attribute_sources(documents: &mut [Document], sources: &[SourceText]) {
    // Cumulative token offset at which each source ends.
    let mut ends = Vec::with_capacity(sources.len());
    let mut total = 0;
    for source in sources {
        total += source.text.split_whitespace().count();
        ends.push(total);
    }

    let mut start = 0;
    for doc in documents {
        let i = ends.partition_point(|&end| end <= start);
        doc.source = sources.get(i).map(|s| s.name.clone());
        start += doc.word_count;
    }
}

/// Accumulate pre-split sentences into documents.
///
/// Callers must pass valid bounds; `segment` checks them.
pub fn segment_sentences<'a, I>(sentences: I, bounds: SegmentBounds) -> Vec<Document>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut documents: Vec<Document> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for sentence in sentences {
        buffer.extend(sentence.split_whitespace());
        if buffer.len() < bounds.min_words {
            continue;
        }

        // Pathologically long sentences: cut exact max_words slices.
        while buffer.len() > bounds.max_words {
            let rest = buffer.split_off(bounds.max_words);
            documents.push(Document::from_tokens(&buffer));
            buffer = rest;
        }

        if buffer.len() >= bounds.min_words {
            documents.push(Document::from_tokens(&buffer));
            buffer.clear();
        }
    }

    if !buffer.is_empty() {
        match documents.last_mut() {
            Some(last) => last.absorb(&buffer),
            None => documents.push(Document::from_tokens(&buffer)),
        }
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_words: usize, max_words: usize) -> SegmentBounds {
        SegmentBounds::new(min_words, max_words).unwrap()
    }

    #[test]
    fn empty_corpus_yields_no_documents() {
        assert!(segment("", bounds(3, 5)).unwrap().is_empty());
        assert!(segment("  \n\t ", bounds(3, 5)).unwrap().is_empty());
    }

    #[test]
    fn small_corpus_yields_one_undersized_document() {
        let docs = segment("Just two. Words here.", bounds(10, 20)).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].word_count(), 4);
        assert_eq!(docs[0].raw(), "Just two. Words here.");
    }

    #[test]
    fn documents_close_at_first_sentence_end_past_minimum() {
        let sentences = ["a b.", "c d.", "e f g.", "h i."];
        let docs = segment_sentences(sentences, bounds(3, 10));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].raw(), "a b. c d.");
        assert_eq!(docs[1].raw(), "e f g. h i.");
    }

    #[test]
    fn long_sentence_is_cut_into_max_word_slices() {
        let sentences = ["w w w w w w w w w w w w."]; // 12 tokens
        let docs = segment_sentences(sentences, bounds(2, 5));
        let counts: Vec<usize> = docs.iter().map(Document::word_count).collect();
        assert_eq!(counts, vec![5, 5, 2]);
        assert!(docs[2].ends_sentence());
    }

    #[test]
    fn short_remainder_after_slicing_keeps_accumulating() {
        let sentences = ["a b c d e f g.", "h i j."];
        let docs = segment_sentences(sentences, bounds(4, 5));
        let counts: Vec<usize> = docs.iter().map(Document::word_count).collect();
        // 7 tokens -> slice of 5, remainder 2 waits for the next sentence.
        assert_eq!(counts, vec![5, 5]);
        assert_eq!(docs[1].raw(), "f g. h i j.");
    }

    #[test]
    fn quoted_sentence_ends_count_as_boundaries() {
        let docs = segment("He said, \"I am done.\" Then he left quietly.", bounds(3, 20)).unwrap();
        let raws: Vec<&str> = docs.iter().map(Document::raw).collect();
        assert_eq!(raws, vec!["He said, \"I am done.\"", "Then he left quietly."]);
        assert!(docs[0].ends_sentence());
    }

    #[test]
    fn sources_follow_token_offsets() {
        let sources = vec![
            SourceText { name: "a.txt".into(), text: "one two three".into() },
            SourceText { name: "empty.txt".into(), text: "  ".into() },
            SourceText { name: "b.txt".into(), text: "four five six".into() },
        ];
        let mut docs = vec![
            Document::from_tokens(&["one", "two"]),
            Document::from_tokens(&["three", "four"]),
            Document::from_tokens(&["five", "six"]),
        ];
        attribute_sources(&mut docs, &sources);
        let names: Vec<Option<&str>> = docs.iter().map(Document::source).collect();
        assert_eq!(names, vec![Some("a.txt"), Some("a.txt"), Some("b.txt")]);
    }

    #[test]
    fn leftover_tokens_fold_into_last_document() {
        let sentences = ["a b c.", "d."];
        let docs = segment_sentences(sentences, bounds(3, 5));
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].raw(), "a b c. d.");
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(SegmentBounds::new(0, 5).is_err());
        assert!(SegmentBounds::new(6, 5).is_err());
        assert!(SegmentBounds::new(5, 5).is_ok());
        let bad = SegmentBounds {
            min_words: 9,
            max_words: 1,
        };
        assert!(segment("text.", bad).unwrap_err().is_config());
    }

    #[test]
    fn abbreviations_do_not_end_documents() {
        let text = "Mr. Smith arrived late. Dr. Jones left early today.";
        let docs = segment(text, bounds(2, 20)).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].raw(), "Mr. Smith arrived late.");
    }
}
