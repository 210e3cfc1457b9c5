//! Relative-to-absolute projection.
//!
//! A feature annotated against the flattened numbering `1..len(A)` of a
//! multi-segment absolute space `A` is projected back onto `A`'s native
//! coordinates here. This is block-walking in the same spirit as
//! exon-aware transcript mapping: accumulate a running relative offset
//! over `A`'s segments and clip each relative span against every segment
//! it crosses.

use super::{Coords, Segment, Strand};
use crate::error::CoordsError;
use crate::Result;

impl Coords {
    /// Project `rel`, expressed relative to the flattened numbering
    /// `1..self.len()`, onto this coords' absolute positions.
    ///
    /// One output segment is emitted per (relative span, crossed
    /// absolute segment) pair, in 5'→3' order of `rel`. Each output
    /// segment's strand follows the covering absolute segment, flipped
    /// when the relative span itself is on the reverse strand of the
    /// flattened numbering. Length is always preserved:
    /// `result.len() == rel.len()`.
    ///
    /// Fails with a range error if `rel` extends past `self.len()`.
    pub fn map_relative(&self, rel: &Coords) -> Result<Coords> {
        let mut out: Vec<Segment> = Vec::new();
        for rseg in rel.segments() {
            match rseg.strand() {
                Strand::Forward => {
                    out.extend(self.map_forward_span(rseg.start(), rseg.stop())?);
                }
                Strand::Reverse => {
                    // Traversal from rseg.start down to rseg.stop: project
                    // the ascending span, then reverse and flip each piece.
                    let pieces = self.map_forward_span(rseg.stop(), rseg.start())?;
                    for piece in pieces.into_iter().rev() {
                        out.push(Segment::new(
                            piece.stop(),
                            piece.start(),
                            piece.strand().flip(),
                        )?);
                    }
                }
            }
        }
        Coords::from_segments(out)
    }

    /// Project the ascending relative span `[lo, hi]` onto absolute
    /// segments, emitting one clipped piece per crossed segment.
    fn map_forward_span(&self, lo: u64, hi: u64) -> Result<Vec<Segment>> {
        debug_assert!(lo <= hi);
        let total = self.len();
        if lo == 0 || hi > total {
            return Err(CoordsError::range(format!(
                "relative span {}..{} outside flattened space 1..{}",
                lo, hi, total
            )));
        }

        let mut pieces = Vec::new();
        let mut covered = 0u64; // relative positions consumed so far
        for seg in self.segments() {
            let seg_lo = covered + 1;
            let seg_hi = covered + seg.len();
            covered = seg_hi;

            let clip_lo = lo.max(seg_lo);
            let clip_hi = hi.min(seg_hi);
            if clip_lo > clip_hi {
                // No overlap with this segment; exact-boundary landings
                // never produce an empty piece.
                continue;
            }
            let abs_start = seg.walk(clip_lo - seg_lo);
            let abs_stop = seg.walk(clip_hi - seg_lo);
            pieces.push(Segment::new(abs_start, abs_stop, seg.strand())?);
        }
        Ok(pieces)
    }
}
