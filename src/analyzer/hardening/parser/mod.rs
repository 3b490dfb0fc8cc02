//! Parsers for manifest input.

pub mod split;

pub use split::{Document, DocumentSplitter, SplitError, split_documents};
