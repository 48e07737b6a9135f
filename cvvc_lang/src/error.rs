// Errors raised while building lookup tables from grouped definitions.
//
// Only table construction can fail. Queries against built tables are plain
// `Option` lookups.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("malformed table group {0:?}: expected \"class=member1,member2\"")]
    MalformedGroup(String),
    #[error("unknown vowel class {0:?}")]
    UnknownVowelClass(String),
    #[error("invalid table definitions: {0}")]
    Json(#[from] serde_json::Error),
}
