//! Canonical lab vocabulary: the reference-range table and the alias
//! resolver built on top of it. Both are loaded once and shared read-only.

pub mod aliases;
pub mod table;

pub use aliases::*;
pub use table::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to read reference data {0}: {1}")]
    ReferenceDataLoad(String, String),

    #[error("Failed to parse reference data {0}: {1}")]
    ReferenceDataParse(String, String),

    #[error("Duplicate canonical test id: {0}")]
    DuplicateTest(String),

    #[error("Canonical test id must not be blank")]
    BlankTestId,
}
