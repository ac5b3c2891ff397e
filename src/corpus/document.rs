//! Document records.

use serde::{Deserialize, Serialize};

use crate::corpus::DocumentId;

/// A document in the corpus: identity plus name and path.
///
/// The full text is deliberately not part of this record. Bulk-fetching every
/// text would dwarf the rest of the cache, so the text is fetched lazily
/// through [`CorpusCache::document_text`](crate::cache::CorpusCache::document_text)
/// and retained there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier in the backing store.
    pub id: DocumentId,

    /// Display name of the document.
    pub name: String,

    /// Path of the source file the document was ingested from.
    pub path: String,
}

impl Document {
    /// Create a new document record.
    pub fn new<S: Into<String>>(id: DocumentId, name: S, path: S) -> Self {
        Document {
            id,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Collect the ids of a slice of documents, preserving order.
    pub fn ids(documents: &[Document]) -> Vec<DocumentId> {
        documents.iter().map(|d| d.id).collect()
    }
}
