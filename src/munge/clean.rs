// Punctuation stripping for the persisted corpus.
//
// Deleting punctuation outright is fine for most marks, but dashes sit
// between words ("boom\u{2014}bust", "war--and") and deleting them fuses the
// neighbours into one token. Dash variants and ASCII hyphen runs become a
// single space instead; other punctuation is removed.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Unicode dash/hyphen variants and runs of two or more ASCII hyphens.
static WORD_SEPARATING_DASHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("-{2,}|[\u{2010}-\u{2015}\u{2212}\u{2E3A}\u{2E3B}\u{FE58}\u{FE63}\u{FF0D}]")
        .expect("dash pattern is a valid regex")
});

/// Removes a configurable class of punctuation from document text.
#[derive(Debug, Clone)]
pub struct PunctuationStripper {
    /// ASCII punctuation characters that survive cleaning (e.g. `_` for
    /// phrase-joined compounds like `home_prices`).
    preserve: HashSet<char>,
    /// Extra characters to strip on top of ASCII punctuation.
    extra: HashSet<char>,
    lowercase: bool,
}

impl Default for PunctuationStripper {
    fn default() -> Self {
        Self {
            preserve: HashSet::new(),
            // Typographic quotes and ellipsis show up in most real corpora.
            extra: ['\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2026}', '\u{00AB}', '\u{00BB}']
                .into_iter()
                .collect(),
            lowercase: false,
        }
    }
}

impl PunctuationStripper {
    /// Keep these characters even though they are punctuation.
    pub fn preserving(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        for c in chars {
            self.extra.remove(&c);
            self.preserve.insert(c);
        }
        self
    }

    /// Also strip these characters.
    pub fn stripping(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        for c in chars {
            self.preserve.remove(&c);
            self.extra.insert(c);
        }
        self
    }

    /// Lowercase the cleaned text.
    pub fn lowercasing(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    fn strips(&self, c: char) -> bool {
        if self.preserve.contains(&c) {
            return false;
        }
        c.is_ascii_punctuation() || self.extra.contains(&c)
    }

    /// Clean one document. The result is a single line: whitespace of any
    /// kind (tabs and newlines included) collapses to single spaces.
    pub fn clean(&self, text: &str) -> String {
        let spaced = WORD_SEPARATING_DASHES.replace_all(text, " ");
        let stripped: String = spaced.chars().filter(|&c| !self.strips(c)).collect();
        let joined = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.lowercase {
            joined.to_lowercase()
        } else {
            joined
        }
    }
}
