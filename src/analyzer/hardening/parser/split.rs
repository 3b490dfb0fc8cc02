//! Splitting raw manifest input into normalized JSON documents.

use crate::analyzer::hardening::logging::{FacadeLogger, emit};
use bstr::ByteSlice;
use log::{Level, Log};
use serde::Deserialize;
use serde_json::Value;

/// Document separator marker.
const SEPARATOR: &[u8] = b"---";

/// Errors produced while splitting input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    /// No usable document anywhere in the input.
    #[error("Invalid input")]
    InvalidInput,
    /// A fragment could not be converted from YAML to JSON.
    #[error("document {document}: {message}")]
    Conversion { document: usize, message: String },
}

/// One normalized manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Zero-based position among the produced documents.
    pub index: usize,
    /// Parsed form shared read-only with every predicate.
    pub value: Value,
}

impl Document {
    /// Build a document from a JSON value.
    pub fn from_value(index: usize, value: Value) -> Self {
        Self { index, value }
    }

    /// The `kind` field, if present and a string.
    pub fn kind(&self) -> Option<&str> {
        self.value.get("kind").and_then(|k| k.as_str())
    }
}

/// Whether a line, terminator included, is a bare `---` marker.
///
/// Only trailing whitespace is ignored: an indented `---` belongs to a
/// block scalar.
fn is_separator_line(line: &[u8]) -> bool {
    line.trim_end() == SEPARATOR
}

/// Cut YAML input at separator lines. LF and CRLF breaks may be mixed, and
/// the last separator does not need a line break after it.
fn split_fragments(input: &[u8]) -> Vec<&[u8]> {
    let mut fragments = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in input.lines_with_terminator() {
        let end = offset + line.len();
        if is_separator_line(line) {
            fragments.push(&input[start..offset]);
            start = end;
        }
        offset = end;
    }
    fragments.push(&input[start..]);
    fragments
}

/// Convert the first YAML document of a fragment.
fn first_yaml_document(fragment: &[u8]) -> Result<Value, String> {
    match serde_yaml::Deserializer::from_slice(fragment).next() {
        Some(document) => Value::deserialize(document).map_err(|e| e.to_string()),
        None => Ok(Value::Null),
    }
}

/// Iterator over the documents of one input buffer.
///
/// Yields documents in source order. After the first error the iterator
/// is exhausted.
pub struct DocumentSplitter<'a> {
    fragments: Vec<&'a [u8]>,
    is_json: bool,
    position: usize,
    produced: usize,
    finished: bool,
    logger: &'a dyn Log,
}

impl<'a> DocumentSplitter<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let is_json = serde_json::from_slice::<Value>(input).is_ok();
        let fragments = if is_json {
            vec![input]
        } else {
            split_fragments(input)
        };

        Self {
            fragments,
            is_json,
            position: 0,
            produced: 0,
            finished: false,
            logger: &FacadeLogger,
        }
    }

    /// Route diagnostics to an injected logger.
    pub fn with_logger(mut self, logger: &'a dyn Log) -> Self {
        self.logger = logger;
        self
    }

    fn convert(&self, fragment: &[u8]) -> Result<Value, SplitError> {
        let converted = if self.is_json {
            serde_json::from_slice(fragment).map_err(|e| e.to_string())
        } else {
            first_yaml_document(fragment)
        };
        converted.map_err(|message| SplitError::Conversion {
            document: self.produced,
            message,
        })
    }
}

impl<'a> Iterator for DocumentSplitter<'a> {
    type Item = Result<Document, SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished && self.position < self.fragments.len() {
            let raw: &'a [u8] = self.fragments[self.position];
            let fragment = raw.trim();
            self.position += 1;
            let is_last = self.position == self.fragments.len();

            if fragment.is_empty() || fragment == SEPARATOR {
                if is_last && self.produced == 0 {
                    emit(
                        self.logger,
                        Level::Debug,
                        format_args!("empty fragment and no documents, input is invalid"),
                    );
                    self.finished = true;
                    return Some(Err(SplitError::InvalidInput));
                }
                emit(
                    self.logger,
                    Level::Debug,
                    format_args!("skipping empty fragment {}", self.position - 1),
                );
                continue;
            }

            return match self.convert(fragment) {
                Ok(value) => {
                    let document = Document::from_value(self.produced, value);
                    self.produced += 1;
                    Some(Ok(document))
                }
                Err(err) => {
                    self.finished = true;
                    Some(Err(err))
                }
            };
        }
        None
    }
}

/// Split an input buffer, stopping at the first error.
pub fn split_documents(input: &[u8]) -> Result<Vec<Document>, SplitError> {
    DocumentSplitter::new(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::hardening::logging::capture::CaptureLogger;

    #[test]
    fn test_json_is_single_document() {
        let docs = split_documents(br#"{"kind": "Pod", "metadata": {"name": "a"}}"#).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].kind(), Some("Pod"));
    }

    #[test]
    fn test_two_documents_in_order() {
        let docs = split_documents(b"doc1\n---\ndoc2").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].value, serde_json::json!("doc1"));
        assert_eq!(docs[1].value, serde_json::json!("doc2"));
        assert_eq!(docs[1].index, 1);
    }

    #[test]
    fn test_separator_only_is_invalid() {
        assert_eq!(split_documents(b"---"), Err(SplitError::InvalidInput));
        assert_eq!(split_documents(b"  \n\t "), Err(SplitError::InvalidInput));
        assert_eq!(
            split_documents(b"\n---\n---\n---\n"),
            Err(SplitError::InvalidInput)
        );
    }

    #[test]
    fn test_trailing_separator_ignored() {
        assert_eq!(split_documents(b"doc1\n---\n").unwrap().len(), 1);
        assert_eq!(split_documents(b"doc1\n---").unwrap().len(), 1);

        let docs = split_documents(b"kind: Pod\nmetadata:\n  name: a\n---").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].value["metadata"]["name"], "a");
    }

    #[test]
    fn test_separator_with_trailing_spaces() {
        let docs = split_documents(b"kind: Pod\n--- \nkind: Role\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].kind(), Some("Role"));
    }

    #[test]
    fn test_leading_separator_ignored() {
        let docs = split_documents(b"---\nkind: Pod\n---\nkind: Role\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].kind(), Some("Pod"));
        assert_eq!(docs[1].kind(), Some("Role"));
    }

    #[test]
    fn test_crlf_input() {
        let docs = split_documents(b"kind: Pod\r\n---\r\nkind: Role\r\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].kind(), Some("Role"));
    }

    #[test]
    fn test_mixed_line_breaks() {
        let input = b"kind: ConfigMap\ndata:\n  note: \"a\r\n    b\"\n---\nkind: Role\n";
        let docs = split_documents(input).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].kind(), Some("ConfigMap"));
        assert_eq!(docs[1].kind(), Some("Role"));
    }

    #[test]
    fn test_indented_marker_stays_in_block_scalar() {
        let docs = split_documents(b"kind: ConfigMap\ndata:\n  script: |\n    echo a\n    ---\n    echo b\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].value["data"]["script"], "echo a\n---\necho b\n");
    }

    #[test]
    fn test_conversion_error_stops_iteration() {
        let mut splitter = DocumentSplitter::new(b"kind: Pod\n---\nkind: [unclosed\n---\nkind: Role");
        assert!(splitter.next().unwrap().is_ok());
        match splitter.next() {
            Some(Err(SplitError::Conversion { document, .. })) => assert_eq!(document, 1),
            other => panic!("expected conversion error, got {:?}", other),
        }
        assert!(splitter.next().is_none());
    }

    #[test]
    fn test_yaml_normalized_to_json() {
        let docs = split_documents(b"kind: Pod\nspec:\n  hostPID: true\n  replicas: 2\n").unwrap();
        assert_eq!(docs[0].value["spec"]["hostPID"], true);
        assert_eq!(docs[0].value["spec"]["replicas"], 2);
    }

    #[test]
    fn test_skipped_fragments_reach_injected_logger() {
        let logger = CaptureLogger::default();
        let docs: Vec<_> = DocumentSplitter::new(b"---\nkind: Pod\n")
            .with_logger(&logger)
            .collect();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            logger.messages(Level::Debug),
            vec!["skipping empty fragment 0".to_string()]
        );
    }
}
