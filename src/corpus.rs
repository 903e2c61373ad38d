//! Backing corpus of raw bibliographic records.
//!
//! The corpus is a newline-delimited JSON file where each line carries at
//! least `title`, `author`, `publisher`, and `date` fields (produced
//! upstream from bibliographic source records). [`BookCorpus`] exposes it
//! as a lazy, infinite sequence: when the file is exhausted it is reopened
//! and reading restarts from the beginning, producing repeats rather than
//! stopping.

use crate::store::Record;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Error type for corpus access.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Error opening or reading the corpus file.
    #[error("Failed to read corpus file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A corpus line was not a JSON object.
    #[error("Malformed corpus record in '{path}': {source}")]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The corpus file contains no records at all.
    #[error("Corpus file '{path}' contains no records")]
    EmptyCorpus { path: PathBuf },
}

/// Cyclic, restartable reader over the books corpus file.
#[derive(Debug)]
pub struct BookCorpus {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl BookCorpus {
    /// Open the corpus. A missing or unreadable file is fatal here rather
    /// than on first read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref().to_path_buf();
        let lines = Self::open_lines(&path)?;
        Ok(Self { path, lines })
    }

    fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>, CorpusError> {
        let file = File::open(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file).lines())
    }

    /// Next raw record, restarting from the top of the file on exhaustion.
    /// Blank lines are skipped; a corpus with no records is an error.
    pub fn next_record(&mut self) -> Result<Record, CorpusError> {
        let mut restarted = false;
        loop {
            match self.lines.next() {
                Some(line) => {
                    let line = line.map_err(|source| CorpusError::Io {
                        path: self.path.clone(),
                        source,
                    })?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    return serde_json::from_str(&line).map_err(|source| {
                        CorpusError::MalformedRecord {
                            path: self.path.clone(),
                            source,
                        }
                    });
                }
                None if restarted => {
                    return Err(CorpusError::EmptyCorpus {
                        path: self.path.clone(),
                    })
                }
                None => {
                    self.lines = Self::open_lines(&self.path)?;
                    restarted = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::str_field;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn corpus_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_records_in_file_order() {
        let file = corpus_file(&[
            r#"{"title":"First","author":"A","publisher":"P","date":"1990"}"#,
            r#"{"title":"Second","author":"B","publisher":"P","date":"1991"}"#,
        ]);
        let mut corpus = BookCorpus::open(file.path()).unwrap();

        assert_eq!(str_field(&corpus.next_record().unwrap(), "title"), "First");
        assert_eq!(str_field(&corpus.next_record().unwrap(), "title"), "Second");
    }

    #[test]
    fn test_restarts_from_beginning_on_exhaustion() {
        let file = corpus_file(&[
            r#"{"title":"Only","author":"A","publisher":"P","date":"1990"}"#,
        ]);
        let mut corpus = BookCorpus::open(file.path()).unwrap();

        for _ in 0..5 {
            assert_eq!(str_field(&corpus.next_record().unwrap(), "title"), "Only");
        }
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = corpus_file(&[
            "",
            r#"{"title":"Real","author":"A","publisher":"P","date":"1990"}"#,
            "   ",
        ]);
        let mut corpus = BookCorpus::open(file.path()).unwrap();
        assert_eq!(str_field(&corpus.next_record().unwrap(), "title"), "Real");
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let file = corpus_file(&[]);
        let mut corpus = BookCorpus::open(file.path()).unwrap();
        assert!(matches!(
            corpus.next_record(),
            Err(CorpusError::EmptyCorpus { .. })
        ));
    }

    #[test]
    fn test_malformed_line_is_an_error() {
        let file = corpus_file(&["not json"]);
        let mut corpus = BookCorpus::open(file.path()).unwrap();
        assert!(matches!(
            corpus.next_record(),
            Err(CorpusError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_missing_file_fails_at_open() {
        assert!(matches!(
            BookCorpus::open("/no/such/corpus.jsonl"),
            Err(CorpusError::Io { .. })
        ));
    }
}
