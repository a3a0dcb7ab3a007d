//! Coarse-grained classification for programmatic handling of errors.
//!
//! Typical mappings:
//! - Warning: non-fatal issues, the caller should degrade and continue
//! - Error: request-scoped failures that should be surfaced to the caller
//! - Fatal: the service cannot continue operating at all
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}
