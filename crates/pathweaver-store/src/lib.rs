//! pathweaver-store — Store implementations for the core trait seams.
//!
//! Provides [`MemoryStore`] for tests and development and [`JsonStore`]
//! for single-node deployments. Both implement every persistence seam
//! plus [`pathweaver_core::question_source::QuestionSource`], and both
//! enforce the one-result-per-student invariant atomically under their
//! own lock.

pub mod json_store;
pub mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

use thiserror::Error;

use pathweaver_core::error::EngineError;

/// Errors raised by the JSON store's file layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt collection {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::Persistence(err.to_string())
    }
}
