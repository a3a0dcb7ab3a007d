//! law-embed — Embedding Provider (C1, §4.1).
//!
//! A single trait, [`EmbeddingProvider`], with two implementations: a dependency-free
//! [`LocalHashEmbedder`] used by default and in tests, and a [`RemoteEmbedder`] for
//! OpenAI-compatible HTTP backends. Callers treat `EmbedError::Unavailable` as fatal at
//! startup and recoverable (skip the dense path) mid-request, per the contract in §4.1.
pub mod error;
pub mod local;
pub mod provider;
pub mod remote;

pub use error::EmbedError;
pub use local::LocalHashEmbedder;
pub use provider::EmbeddingProvider;
pub use remote::RemoteEmbedder;
