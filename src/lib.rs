// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-coords: genomic coordinate algebra and alignment reconciliation
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! This crate is the coordinate layer under a viral sequence
//! annotation/validation pipeline. It translates between the coordinate
//! spaces in play during annotation — a multi-segment feature space, a
//! profile-model space, and a target-sequence space — and reconciles
//! heuristic aligner output into exact coordinate segments. Everything
//! is a pure, synchronous transformation over in-memory values; search,
//! alignment, translation, and file I/O live with external collaborators.
//!
//! # Example
//!
//! ```
//! use ferro_coords::coords::Coords;
//! use ferro_coords::diagnostic::NullSink;
//! use ferro_coords::indel::{parse_indel_tokens, reconcile};
//!
//! // A spliced CDS location, and a feature relative to its flattening.
//! let cds: Coords = "1..100:+,201..350:+".parse().unwrap();
//! let rel: Coords = "91..110:+".parse().unwrap();
//! let absolute = cds.map_relative(&rel).unwrap();
//! assert_eq!(absolute.to_string(), "91..100:+,201..210:+");
//!
//! // Expand an ungapped anchor plus its indel tokens.
//! let tokens = parse_indel_tokens("Q12:S10+3;").unwrap();
//! let (model, seq) = reconcile(
//!     "1..100:+".parse().unwrap(),
//!     "3..102:+".parse().unwrap(),
//!     &tokens,
//!     &NullSink,
//! )
//! .unwrap();
//! assert_eq!(model.to_string(), "1..10:+,11..100:+");
//! assert_eq!(seq.to_string(), "3..12:+,16..105:+");
//! ```

pub mod config;
pub mod coords;
pub mod diagnostic;
pub mod error;
pub mod frameshift;
pub mod ifile;
pub mod indel;
pub mod join;
pub mod xmap;

// Re-export commonly used types
pub use config::FrameshiftConfig;
pub use coords::{Coords, Segment, Strand};
pub use diagnostic::{DiagnosticSink, MemorySink, NullSink};
pub use error::CoordsError;
pub use frameshift::{detect, FrameTrack, FrameshiftRun, RunStatus};
pub use ifile::{InsertFile, InsertRecord};
pub use indel::{parse_indel_tokens, reconcile, IndelToken};
pub use join::{join, AlignedFragment};
pub use xmap::{Cigar, MapEntry, PositionMap};

/// Result type alias for ferro-coords operations
pub type Result<T> = std::result::Result<T, CoordsError>;
