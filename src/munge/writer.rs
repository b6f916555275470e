// Corpus writer — persists segmented documents as tab-separated records.
//
// Format, one document per line:
//
//   <unique_id>\t<source_name>\t<cleaned_text>\n
//
// All preconditions are checked before the destination is touched, so a
// bad call never leaves a half-written or truncated file behind.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::clean::PunctuationStripper;
use crate::error::{Result, WheatError};

/// One persisted corpus line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub unique_id: String,
    pub source_name: String,
    pub cleaned_text: String,
}

/// Check lengths and uniqueness, returning the ids as strings.
fn validate_records<I: Display, N: AsRef<str>>(
    documents_len: usize,
    unique_ids: &[I],
    names: &[N],
) -> Result<Vec<String>> {
    if documents_len != unique_ids.len() {
        return Err(WheatError::LengthMismatch {
            left_name: "documents",
            left_len: documents_len,
            right_name: "unique_ids",
            right_len: unique_ids.len(),
        });
    }
    if documents_len != names.len() {
        return Err(WheatError::LengthMismatch {
            left_name: "documents",
            left_len: documents_len,
            right_name: "names",
            right_len: names.len(),
        });
    }

    let ids: Vec<String> = unique_ids.iter().map(|id| id.to_string()).collect();
    let mut seen: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        check_field("unique_ids", i, id)?;
        if let Some(first) = seen.insert(id.as_str(), i) {
            return Err(WheatError::DuplicateId {
                id: id.clone(),
                first,
                second: i,
            });
        }
    }
    for (i, name) in names.iter().enumerate() {
        check_field("names", i, name.as_ref())?;
    }
    Ok(ids)
}

/// Ids and names become tab-separated fields, so they cannot contain
/// tabs or line breaks. Ids additionally cannot be empty.
fn check_field(field: &'static str, index: usize, value: &str) -> Result<()> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(WheatError::InvalidField {
            field,
            index,
            reason: "contains a tab or line break".to_string(),
        });
    }
    if field == "unique_ids" && value.is_empty() {
        return Err(WheatError::InvalidField {
            field,
            index,
            reason: "is empty".to_string(),
        });
    }
    Ok(())
}

/// Write documents to `destination`, overwriting it, with the default stripper.
pub fn write_corpus<D, I, N>(
    documents: &[D],
    unique_ids: &[I],
    names: &[N],
    destination: &Path,
) -> Result<()>
where
    D: AsRef<str>,
    I: Display,
    N: AsRef<str>,
{
    write_corpus_with(
        documents,
        unique_ids,
        names,
        destination,
        &PunctuationStripper::default(),
    )
}

/// Write documents with a caller-supplied punctuation stripper.
pub fn write_corpus_with<D, I, N>(
    documents: &[D],
    unique_ids: &[I],
    names: &[N],
    destination: &Path,
    stripper: &PunctuationStripper,
) -> Result<()>
where
    D: AsRef<str>,
    I: Display,
    N: AsRef<str>,
{
    let ids = validate_records(documents.len(), unique_ids, names)?;

    let file = File::create(destination).map_err(|e| WheatError::io(destination, e))?;
    let mut out = BufWriter::new(file);
    for ((doc, id), name) in documents.iter().zip(&ids).zip(names) {
        writeln!(out, "{}\t{}\t{}", id, name.as_ref(), stripper.clean(doc.as_ref()))
            .map_err(|e| WheatError::io(destination, e))?;
    }
    out.flush().map_err(|e| WheatError::io(destination, e))?;

    info!(
        path = %destination.display(),
        documents = documents.len(),
        "Wrote corpus"
    );
    Ok(())
}

/// Read a persisted corpus back into records.
///
/// The text field is everything after the second tab, so it is taken
/// verbatim even if a hand-edited file put tabs in it.
pub fn read_corpus(path: &Path) -> Result<Vec<DocumentRecord>> {
    let file = File::open(path).map_err(|e| WheatError::io(path, e))?;
    let mut records = Vec::new();

    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| WheatError::io(path, e))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.splitn(3, '\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(id), Some(name), Some(text)) => records.push(DocumentRecord {
                unique_id: id.to_string(),
                source_name: name.to_string(),
                cleaned_text: text.trim().to_string(),
            }),
            _ => {
                return Err(WheatError::malformed(
                    path,
                    i + 1,
                    "expected <unique_id>\\t<name>\\t<text>",
                ))
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_tab_separated_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        let docs = ["The whale, splashed!", "A fox."];
        write_corpus(&docs, &[10, 11], &["w0", "w1"], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "10\tw0\tThe whale splashed\n11\tw1\tA fox\n");
    }

    #[test]
    fn duplicate_ids_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        let err = write_corpus(&["a", "b", "c"], &[1, 2, 1], &["x", "y", "z"], &path).unwrap_err();

        assert!(matches!(
            err,
            WheatError::DuplicateId {
                first: 0,
                second: 2,
                ..
            }
        ));
        assert!(!path.exists());
    }

    #[test]
    fn duplicate_ids_leave_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "previous contents\n").unwrap();
        assert!(write_corpus(&["a", "b"], &["d", "d"], &["x", "y"], &path).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous contents\n");
    }

    #[test]
    fn mismatched_lengths_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        let err = write_corpus(&["a", "b"], &[1, 2], &["only one"], &path).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("names"), "{err}");
        assert!(!path.exists());
    }

    #[test]
    fn names_with_tabs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        let err = write_corpus(&["a"], &[1], &["bad\tname"], &path).unwrap_err();
        assert!(matches!(err, WheatError::InvalidField { field: "names", .. }));
    }

    #[test]
    fn read_corpus_round_trips_ids_and_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        write_corpus(&["One fish.", "Two fish."], &["d0", "d1"], &["a.txt", "b.txt"], &path)
            .unwrap();

        let records = read_corpus(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].unique_id, "d1");
        assert_eq!(records[1].source_name, "b.txt");
        assert_eq!(records[1].cleaned_text, "Two fish");
    }

    #[test]
    fn read_corpus_rejects_short_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.txt");
        std::fs::write(&path, "1\tname\ttext\nbroken line\n").unwrap();
        let err = read_corpus(&path).unwrap_err();
        assert!(err.to_string().contains(":2:"), "{err}");
    }
}
