//! Alignment joiner.
//!
//! Stitches a precomputed 5' aligned fragment, a newly computed ungapped
//! middle, and a precomputed 3' aligned fragment into one contiguous
//! (sequence, reference) aligned pair. The three pieces must abut exactly
//! in both the model and sequence coordinate spaces; no gap characters
//! are ever introduced at a join point.

use serde::{Deserialize, Serialize};

use crate::error::CoordsError;
use crate::Result;

/// Characters treated as alignment gaps.
const GAP_CHARS: [char; 2] = ['-', '.'];

/// One aligned (sequence, reference) string pair with its coordinate
/// extents in both spaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedFragment {
    /// Aligned sequence row; may contain gap characters.
    pub seq_aln: String,
    /// Aligned reference row; may contain gap characters.
    pub ref_aln: String,
    /// Inclusive model-space extent (start, end).
    pub model_span: (u64, u64),
    /// Inclusive sequence-space extent (start, end).
    pub seq_span: (u64, u64),
}

impl AlignedFragment {
    /// Create a fragment, validating that both rows have equal length.
    pub fn new(
        seq_aln: impl Into<String>,
        ref_aln: impl Into<String>,
        model_span: (u64, u64),
        seq_span: (u64, u64),
    ) -> Result<Self> {
        let seq_aln = seq_aln.into();
        let ref_aln = ref_aln.into();
        if seq_aln.chars().count() != ref_aln.chars().count() {
            return Err(CoordsError::consistency(format!(
                "aligned rows differ in length: sequence {} vs reference {}",
                seq_aln.chars().count(),
                ref_aln.chars().count()
            )));
        }
        if model_span.0 > model_span.1 {
            return Err(CoordsError::consistency(format!(
                "model span {}..{} has end before start",
                model_span.0, model_span.1
            )));
        }
        if seq_span.0 > seq_span.1 {
            return Err(CoordsError::consistency(format!(
                "sequence span {}..{} has end before start",
                seq_span.0, seq_span.1
            )));
        }
        Ok(Self {
            seq_aln,
            ref_aln,
            model_span,
            seq_span,
        })
    }

    /// Number of alignment columns.
    pub fn aln_len(&self) -> usize {
        self.seq_aln.chars().count()
    }

    /// True when neither row contains a gap character.
    pub fn is_ungapped(&self) -> bool {
        !self.seq_aln.contains(GAP_CHARS) && !self.ref_aln.contains(GAP_CHARS)
    }
}

/// Join a 5' fragment, an ungapped middle, and a 3' fragment.
///
/// The middle must be gap-free and its column count must equal its model
/// and sequence span lengths (one reference character is inserted per
/// middle model position). Adjacency is validated in both spaces:
/// each earlier piece's coordinate end + 1 must equal the next piece's
/// start. The result's column count is the sum of the three inputs'.
pub fn join(
    five_prime: &AlignedFragment,
    middle: &AlignedFragment,
    three_prime: &AlignedFragment,
) -> Result<AlignedFragment> {
    if !middle.is_ungapped() {
        return Err(CoordsError::consistency(
            "middle fragment must be ungapped".to_string(),
        ));
    }
    let mid_model_len = span_len(middle.model_span, "model")?;
    let mid_seq_len = span_len(middle.seq_span, "sequence")?;
    if middle.aln_len() as u64 != mid_model_len || middle.aln_len() as u64 != mid_seq_len {
        return Err(CoordsError::consistency(format!(
            "ungapped middle has {} columns but spans {} model / {} sequence positions",
            middle.aln_len(),
            mid_model_len,
            mid_seq_len
        )));
    }

    check_adjacent("5' fragment", five_prime, "middle", middle)?;
    check_adjacent("middle", middle, "3' fragment", three_prime)?;

    let mut seq_aln =
        String::with_capacity(five_prime.seq_aln.len() + middle.seq_aln.len() + three_prime.seq_aln.len());
    seq_aln.push_str(&five_prime.seq_aln);
    seq_aln.push_str(&middle.seq_aln);
    seq_aln.push_str(&three_prime.seq_aln);

    let mut ref_aln =
        String::with_capacity(five_prime.ref_aln.len() + middle.ref_aln.len() + three_prime.ref_aln.len());
    ref_aln.push_str(&five_prime.ref_aln);
    ref_aln.push_str(&middle.ref_aln);
    ref_aln.push_str(&three_prime.ref_aln);

    AlignedFragment::new(
        seq_aln,
        ref_aln,
        (five_prime.model_span.0, three_prime.model_span.1),
        (five_prime.seq_span.0, three_prime.seq_span.1),
    )
}

/// Inclusive length of a span, rejecting end-before-start.
fn span_len(span: (u64, u64), space: &str) -> Result<u64> {
    if span.0 > span.1 {
        return Err(CoordsError::consistency(format!(
            "{} span {}..{} has end before start",
            space, span.0, span.1
        )));
    }
    Ok(span.1 - span.0 + 1)
}

/// Validate that `right` starts exactly one past `left`'s end in both
/// coordinate spaces.
fn check_adjacent(
    left_name: &str,
    left: &AlignedFragment,
    right_name: &str,
    right: &AlignedFragment,
) -> Result<()> {
    if left.model_span.1 + 1 != right.model_span.0 {
        return Err(CoordsError::consistency(format!(
            "{} model end {} not adjacent to {} model start {}",
            left_name, left.model_span.1, right_name, right.model_span.0
        )));
    }
    if left.seq_span.1 + 1 != right.seq_span.0 {
        return Err(CoordsError::consistency(format!(
            "{} sequence end {} not adjacent to {} sequence start {}",
            left_name, left.seq_span.1, right_name, right.seq_span.0
        )));
    }
    Ok(())
}
