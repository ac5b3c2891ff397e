//! Compact mention records and the type-code table.
//!
//! A corpus has millions of mentions, so the per-mention record stores the
//! minimum needed for location queries: ids, positions and a small integer
//! code in place of the mention-type string. The [`TypeCodeTable`] that
//! assigns those codes is owned by the cache and persisted next to the
//! mention index, never a process-wide singleton, so codes stay stable across
//! a snapshot reload and multiple caches stay independent.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{KopisError, Result};

use crate::corpus::{DocumentId, EntityId, TypeCode};

/// Partial information about a mention: enough to answer location queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionLocation {
    /// The document the mention occurs in.
    pub document_id: DocumentId,

    /// The entity the mention resolves to, or `None` if unlinked.
    pub entity_id: Option<EntityId>,

    /// 0-based sequence index of the mention within its document, in
    /// ingestion order. Monotone per document, not necessarily contiguous.
    pub index: u32,

    /// Character offset of the start of the mention text.
    pub text_start: u32,

    /// Character offset just past the end of the mention text.
    pub text_stop: u32,

    /// Mention type, interned through [`TypeCodeTable`].
    pub type_code: TypeCode,
}

/// Interns mention-type strings (e.g. `"PERSON"`) to dense small codes.
///
/// Codes are allocated one past the current maximum, starting at 0, so the
/// table is a plain vector indexed by code with a reverse map for interning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCodeTable {
    types: Vec<String>,
    codes: AHashMap<String, TypeCode>,
}

impl TypeCodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        TypeCodeTable::default()
    }

    /// Return the code for a type string, allocating a new one if unseen.
    pub fn code_for(&mut self, ty: &str) -> TypeCode {
        if let Some(&code) = self.codes.get(ty) {
            return code;
        }
        debug_assert!(
            self.types.len() <= TypeCode::MAX as usize,
            "type-code space exhausted"
        );
        let code = self.types.len() as TypeCode;
        self.types.push(ty.to_string());
        self.codes.insert(ty.to_string(), code);
        code
    }

    /// Return the type string for a code, failing if the code is unknown.
    pub fn type_for(&self, code: TypeCode) -> Result<&str> {
        self.types
            .get(code as usize)
            .map(|s| s.as_str())
            .ok_or_else(|| KopisError::lookup(format!("unknown type code: {code}")))
    }

    /// Number of distinct types seen so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no type has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
