// Sentence splitting with abbreviation awareness.
//
// UAX#29 gives us sentence candidates, but it breaks after "Mr. " or
// "J. " whenever an uppercase word follows. We refine those candidates with
// a small Punkt-style abbreviation model: a built-in English list, initials,
// dotted forms like "U.S.", and abbreviations learned from the text itself.
// A candidate only closes a sentence when it ends on ".", "!" or "?" (closing
// quotes and brackets after the mark are allowed) and the final token is not
// an abbreviation.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations every English splitter knows about (lowercase, no period).
const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "ft", "vs", "etc", "inc", "ltd",
    "co", "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "gen", "col", "capt", "lt", "sgt", "cpl", "rev", "hon", "fig", "al", "approx", "dept",
    "univ", "assn", "bros", "messrs", "mme", "mlle", "ave", "blvd", "rd",
];

/// Learned abbreviations must be this short (in characters, without the period).
const MAX_LEARNED_LEN: usize = 4;
/// ...seen with a trailing period at least this many times...
const MIN_LEARNED_COUNT: usize = 2;
/// ...and carry the period on at least this fraction of occurrences.
const MIN_PERIOD_RATE: f64 = 0.9;

/// True if the character ends a sentence.
pub fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_opener(c: char) -> bool {
    matches!(c, '"' | '\'' | '(' | '[' | '{' | '\u{201C}' | '\u{2018}')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}' | '\u{201D}' | '\u{2019}')
}

/// True if `text` ends on a sentence-ending mark, possibly followed by
/// closing quotes or brackets: `done.`, `"done."`, `(quietly.)`.
pub fn ends_with_terminal(text: &str) -> bool {
    text.trim_end()
        .trim_end_matches(is_closer)
        .chars()
        .next_back()
        .is_some_and(is_terminal)
}

/// Strip surrounding quotes and brackets from a token, keeping inner punctuation.
fn bare(token: &str) -> &str {
    token.trim_start_matches(is_opener).trim_end_matches(is_closer)
}

/// Sentence splitter trained on a corpus.
#[derive(Debug, Clone)]
pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::english()
    }
}

impl SentenceSplitter {
    /// A splitter that only knows the built-in English abbreviations.
    pub fn english() -> Self {
        Self {
            abbreviations: ENGLISH_ABBREVIATIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build a splitter and train its abbreviation list on `text`.
    pub fn train(text: &str) -> Self {
        let mut splitter = Self::english();
        splitter.learn(text);
        splitter
    }

    /// Learn abbreviations from raw text.
    ///
    /// A type is learned when it is short and alphabetic, almost always
    /// carries a trailing period, and at least once is followed by a
    /// lowercase word (which a real sentence end almost never is).
    pub fn learn(&mut self, text: &str) {
        #[derive(Default)]
        struct TypeStats {
            with_period: usize,
            without_period: usize,
            lowercase_follows: usize,
        }

        let mut stats: HashMap<String, TypeStats> = HashMap::new();
        let tokens: Vec<&str> = text.split_whitespace().collect();

        for (i, token) in tokens.iter().enumerate() {
            let token = bare(token);
            let (word, has_period) = match token.strip_suffix('.') {
                Some(w) => (w, true),
                None => (token, false),
            };
            if word.is_empty() || !word.chars().all(char::is_alphabetic) {
                continue;
            }
            let entry = stats.entry(word.to_lowercase()).or_default();
            if has_period {
                entry.with_period += 1;
                let next_is_lower = tokens
                    .get(i + 1)
                    .and_then(|next| bare(next).chars().next())
                    .is_some_and(char::is_lowercase);
                if next_is_lower {
                    entry.lowercase_follows += 1;
                }
            } else {
                entry.without_period += 1;
            }
        }

        let mut learned = 0;
        for (word, s) in stats {
            let total = s.with_period + s.without_period;
            let rate = s.with_period as f64 / total as f64;
            if word.chars().count() <= MAX_LEARNED_LEN
                && s.with_period >= MIN_LEARNED_COUNT
                && rate >= MIN_PERIOD_RATE
                && s.lowercase_follows > 0
                && self.abbreviations.insert(word)
            {
                learned += 1;
            }
        }
        debug!(learned, total = self.abbreviations.len(), "Trained abbreviation list");
    }

    /// Add an abbreviation by hand (case-insensitive, trailing period optional).
    pub fn add_abbreviation(&mut self, abbreviation: &str) {
        let word = abbreviation.trim_end_matches('.').to_lowercase();
        if !word.is_empty() {
            self.abbreviations.insert(word);
        }
    }

    /// Whether a period-final token is an abbreviation rather than a sentence end.
    pub fn is_abbreviation(&self, token: &str) -> bool {
        let token = bare(token);
        let Some(word) = token.strip_suffix('.') else {
            return false;
        };
        if word.is_empty() {
            return false;
        }

        // Initials: "J." but not the pronoun "I."
        let mut chars = word.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c.is_uppercase() && c != 'I';
        }

        // Dotted forms: "U.S.", "e.g.", "Ph.D."
        if word.contains('.') {
            return word.split('.').all(|part| {
                !part.is_empty() && part.chars().count() <= 3 && part.chars().all(char::is_alphabetic)
            });
        }

        self.abbreviations.contains(&word.to_lowercase())
    }

    /// Split text into sentences. Every sentence except possibly the last ends
    /// with ".", "!" or "?", optionally followed by closing quotes or
    /// brackets. Returned slices are trimmed and never empty.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let end = offset + piece.len();
            let candidate = text[start..end].trim_end();
            if self.closes_sentence(candidate) {
                let sentence = candidate.trim_start();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail);
        }
        sentences
    }

    fn closes_sentence(&self, candidate: &str) -> bool {
        if !ends_with_terminal(candidate) {
            return false;
        }
        match candidate.split_whitespace().next_back() {
            Some(last) => !self.is_abbreviation(last),
            None => false,
        }
    }
}
