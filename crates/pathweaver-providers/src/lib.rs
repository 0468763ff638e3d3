//! pathweaver-providers — Text-generation provider integrations.
//!
//! Implements the core `TextGenerator` trait for Anthropic and Ollama,
//! plus configuration loading and ranker construction. The AI ranking
//! step is best-effort, so every provider failure mode here degrades to
//! "no recommendations" at the ranker boundary.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;

pub use config::{build_ranker, create_generator, load_config, PathweaverConfig, ProviderConfig};
pub use error::ProviderError;
