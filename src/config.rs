//! Per-call policy configuration.
//!
//! Every knob that used to live in an ambient option hash is an explicit
//! immutable struct passed to the call that needs it. Nothing in this
//! crate reads global state.

use serde::{Deserialize, Serialize};

/// Policy parameters for frameshift detection.
///
/// # Example
///
/// ```
/// use ferro_coords::config::FrameshiftConfig;
///
/// let config = FrameshiftConfig::default().with_min_run_nt(10);
/// assert_eq!(config.min_run_nt, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameshiftConfig {
    /// Minimum length in nucleotides for a frameshift run to be reported.
    /// Runs shorter than this are suppressed.
    pub min_run_nt: u64,
    /// NCBI translation table identifier, carried for the downstream
    /// translation stage. Not consulted by the detector itself.
    pub translation_table: u8,
}

impl Default for FrameshiftConfig {
    fn default() -> Self {
        Self {
            min_run_nt: 6,
            translation_table: 1,
        }
    }
}

impl FrameshiftConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum reportable run length in nucleotides.
    pub fn with_min_run_nt(mut self, min_run_nt: u64) -> Self {
        self.min_run_nt = min_run_nt;
        self
    }

    /// Set the translation table identifier.
    pub fn with_translation_table(mut self, table: u8) -> Self {
        self.translation_table = table;
        self
    }
}
