//! Cross-model position mapping.
//!
//! Two profile models covering the same sequence family are related by a
//! pairwise alignment summarized as a CIGAR run list. This module builds
//! a dense position-translation table from that CIGAR and re-projects
//! already-computed coordinate spans from one model's frame to the
//! other's.
//!
//! Positions that fall in a gap of the destination model do not vanish:
//! they carry the nearest flanking destination position, tagged as
//! [`MapEntry::NearGap`] so callers can distinguish exact from
//! approximate translations. (An earlier incarnation sign-encoded the
//! gap case into a packed integer; the tagged form preserves the same
//! nearest-position recovery without the decoding trap.)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::coords::{Coords, Segment};
use crate::error::CoordsError;
use crate::Result;

/// One CIGAR operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CigarOp {
    /// Aligned in both models (`M`).
    Match,
    /// Extra positions in the "from" model (`I`).
    Insert,
    /// Extra positions in the "to" model (`D`).
    Delete,
}

impl CigarOp {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'M' => Some(CigarOp::Match),
            'I' => Some(CigarOp::Insert),
            'D' => Some(CigarOp::Delete),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::Insert => 'I',
            CigarOp::Delete => 'D',
        }
    }
}

/// One (count, op) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CigarRun {
    /// Run length; always >= 1.
    pub len: u64,
    /// Operation.
    pub op: CigarOp,
}

/// An ordered CIGAR run list, e.g. `100M3I22M5D7M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cigar(Vec<CigarRun>);

impl Cigar {
    /// The runs, in order.
    pub fn runs(&self) -> &[CigarRun] {
        &self.0
    }

    /// Total positions consumed in the "from" model (M + I).
    pub fn from_len(&self) -> u64 {
        self.0
            .iter()
            .filter(|r| matches!(r.op, CigarOp::Match | CigarOp::Insert))
            .map(|r| r.len)
            .sum()
    }

    /// Total positions consumed in the "to" model (M + D).
    pub fn to_len(&self) -> u64 {
        self.0
            .iter()
            .filter(|r| matches!(r.op, CigarOp::Match | CigarOp::Delete))
            .map(|r| r.len)
            .sum()
    }
}

impl FromStr for Cigar {
    type Err = CoordsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(CoordsError::format(s, "empty CIGAR string"));
        }
        let mut runs = Vec::new();
        let mut count: u64 = 0;
        let mut have_digits = false;
        for c in s.chars() {
            if let Some(d) = c.to_digit(10) {
                count = count
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(d as u64))
                    .ok_or_else(|| CoordsError::format(s, "CIGAR run length overflows"))?;
                have_digits = true;
            } else if let Some(op) = CigarOp::from_char(c) {
                if !have_digits || count == 0 {
                    return Err(CoordsError::format(
                        s,
                        format!("CIGAR op '{}' without a positive run length", c),
                    ));
                }
                runs.push(CigarRun { len: count, op });
                count = 0;
                have_digits = false;
            } else {
                return Err(CoordsError::format(
                    s,
                    format!("unexpected character '{}' in CIGAR", c),
                ));
            }
        }
        if have_digits {
            return Err(CoordsError::format(s, "CIGAR ends with a dangling run length"));
        }
        Ok(Cigar(runs))
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.0 {
            write!(f, "{}{}", run.len, run.op.as_char())?;
        }
        Ok(())
    }
}

/// Translation of one "from" position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEntry {
    /// Exactly aligned to this "to" position.
    Aligned(u64),
    /// Falls in a gap of the "to" model; carries the nearest flanking
    /// "to" position.
    NearGap(u64),
}

impl MapEntry {
    /// The carried "to" position, exact or nearest-flanking.
    pub fn position(self) -> u64 {
        match self {
            MapEntry::Aligned(p) | MapEntry::NearGap(p) => p,
        }
    }

    /// True for exactly aligned entries.
    pub fn is_aligned(self) -> bool {
        matches!(self, MapEntry::Aligned(_))
    }
}

/// Dense map from every position of one model to the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMap {
    entries: Vec<MapEntry>,
    len_from: u64,
    len_to: u64,
}

impl PositionMap {
    /// Build the map from a CIGAR describing the from→to alignment.
    ///
    /// The CIGAR's run totals must account for both models exactly.
    pub fn from_cigar(cigar: &Cigar, len_from: u64, len_to: u64) -> Result<Self> {
        if cigar.from_len() != len_from || cigar.to_len() != len_to {
            return Err(CoordsError::consistency(format!(
                "CIGAR {} covers {}/{} positions but models span {}/{}",
                cigar,
                cigar.from_len(),
                cigar.to_len(),
                len_from,
                len_to
            )));
        }

        let mut entries = Vec::with_capacity(len_from as usize);
        let mut pos_to: u64 = 1;
        for run in cigar.runs() {
            match run.op {
                CigarOp::Match => {
                    for i in 0..run.len {
                        entries.push(MapEntry::Aligned(pos_to + i));
                    }
                    pos_to += run.len;
                }
                CigarOp::Insert => {
                    // Gap in the "to" model; nearest flank is the position
                    // just before the gap, or 1 when the gap is leading.
                    let nearest = if pos_to > 1 { pos_to - 1 } else { 1 };
                    for _ in 0..run.len {
                        entries.push(MapEntry::NearGap(nearest));
                    }
                }
                CigarOp::Delete => {
                    pos_to += run.len;
                }
            }
        }

        Ok(Self {
            entries,
            len_from,
            len_to,
        })
    }

    /// Length of the "from" model.
    pub fn len_from(&self) -> u64 {
        self.len_from
    }

    /// Length of the "to" model.
    pub fn len_to(&self) -> u64 {
        self.len_to
    }

    /// Translate one 1-based "from" position.
    pub fn lookup(&self, pos_from: u64) -> Result<MapEntry> {
        if pos_from == 0 || pos_from > self.len_from {
            return Err(CoordsError::range(format!(
                "position {} outside model space 1..{}",
                pos_from, self.len_from
            )));
        }
        Ok(self.entries[(pos_from - 1) as usize])
    }

    /// Re-project a coordinate span from the "from" model's frame to the
    /// "to" model's, splitting at every aligned/near-gap transition and
    /// at every break in destination contiguity — the same splitting
    /// discipline as relative-to-absolute projection.
    ///
    /// Near-gap stretches collapse to single-position segments at their
    /// nearest flanking destination position.
    pub fn project(&self, coords: &Coords) -> Result<Coords> {
        let mut out: Vec<Segment> = Vec::new();
        for seg in coords.segments() {
            let step = seg.strand().step();
            let mut open: Option<(MapEntry, u64, u64)> = None; // (kind@open, to_start, to_last)
            for offset in 0..seg.len() {
                let entry = self.lookup(seg.walk(offset))?;
                let to_pos = entry.position();
                open = match open {
                    Some((first, to_start, to_last)) => {
                        let contiguous = match (first.is_aligned(), entry.is_aligned()) {
                            (true, true) => to_pos as i64 == to_last as i64 + step,
                            (false, false) => to_pos == to_last,
                            _ => false,
                        };
                        if contiguous {
                            Some((first, to_start, to_pos))
                        } else {
                            out.push(Segment::new(to_start, to_last, seg.strand())?);
                            Some((entry, to_pos, to_pos))
                        }
                    }
                    None => Some((entry, to_pos, to_pos)),
                };
            }
            if let Some((_, to_start, to_last)) = open {
                out.push(Segment::new(to_start, to_last, seg.strand())?);
            }
        }
        Coords::from_segments(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cigar(s: &str) -> Cigar {
        s.parse().unwrap()
    }

    #[test]
    fn test_cigar_parse_and_display() {
        for s in ["100M", "100M3I22M", "5M2D5M", "7567M", "10M3I4D10M"] {
            assert_eq!(cigar(s).to_string(), s);
        }
    }

    #[test]
    fn test_cigar_parse_rejects_malformed() {
        for s in ["", "M", "10X", "10M3", "0M", "10m"] {
            assert!(
                matches!(s.parse::<Cigar>(), Err(CoordsError::Format { .. })),
                "expected format error for '{}'",
                s
            );
        }
    }

    #[test]
    fn test_cigar_lengths() {
        let c = cigar("10M3I4D10M");
        assert_eq!(c.from_len(), 23);
        assert_eq!(c.to_len(), 24);
    }

    #[test]
    fn test_map_all_match() {
        let map = PositionMap::from_cigar(&cigar("10M"), 10, 10).unwrap();
        for p in 1..=10 {
            assert_eq!(map.lookup(p).unwrap(), MapEntry::Aligned(p));
        }
    }

    #[test]
    fn test_map_insert_run_near_gap() {
        // from: 1..11, to: 1..8; from positions 4..6 are extra.
        let map = PositionMap::from_cigar(&cigar("3M3I5M"), 11, 8).unwrap();
        assert_eq!(map.lookup(3).unwrap(), MapEntry::Aligned(3));
        assert_eq!(map.lookup(4).unwrap(), MapEntry::NearGap(3));
        assert_eq!(map.lookup(5).unwrap(), MapEntry::NearGap(3));
        assert_eq!(map.lookup(6).unwrap(), MapEntry::NearGap(3));
        assert_eq!(map.lookup(7).unwrap(), MapEntry::Aligned(4));
    }

    #[test]
    fn test_map_delete_run_shifts_to() {
        // to model has 3 extra positions after from position 3.
        let map = PositionMap::from_cigar(&cigar("3M3D5M"), 8, 11).unwrap();
        assert_eq!(map.lookup(3).unwrap(), MapEntry::Aligned(3));
        assert_eq!(map.lookup(4).unwrap(), MapEntry::Aligned(7));
        assert_eq!(map.lookup(8).unwrap(), MapEntry::Aligned(11));
    }

    #[test]
    fn test_map_leading_insert_points_at_one() {
        let map = PositionMap::from_cigar(&cigar("2I5M"), 7, 5).unwrap();
        assert_eq!(map.lookup(1).unwrap(), MapEntry::NearGap(1));
        assert_eq!(map.lookup(2).unwrap(), MapEntry::NearGap(1));
        assert_eq!(map.lookup(3).unwrap(), MapEntry::Aligned(1));
    }

    #[test]
    fn test_map_rejects_length_mismatch() {
        assert!(matches!(
            PositionMap::from_cigar(&cigar("10M"), 11, 10),
            Err(CoordsError::Consistency { .. })
        ));
        assert!(matches!(
            PositionMap::from_cigar(&cigar("10M"), 10, 9),
            Err(CoordsError::Consistency { .. })
        ));
    }

    #[test]
    fn test_lookup_out_of_range() {
        let map = PositionMap::from_cigar(&cigar("10M"), 10, 10).unwrap();
        assert!(matches!(map.lookup(0), Err(CoordsError::Range { .. })));
        assert!(matches!(map.lookup(11), Err(CoordsError::Range { .. })));
    }

    #[test]
    fn test_project_identity() {
        let map = PositionMap::from_cigar(&cigar("100M"), 100, 100).unwrap();
        let coords: Coords = "5..20:+".parse().unwrap();
        assert_eq!(map.project(&coords).unwrap().to_string(), "5..20:+");
    }

    #[test]
    fn test_project_span_across_delete() {
        // to model gains 3 positions inside the span: output splits.
        let map = PositionMap::from_cigar(&cigar("5M3D5M"), 10, 13).unwrap();
        let coords: Coords = "3..8:+".parse().unwrap();
        assert_eq!(map.project(&coords).unwrap().to_string(), "3..5:+,9..11:+");
    }

    #[test]
    fn test_project_span_across_insert() {
        // from positions 4..6 fall in a destination gap: the near-gap
        // stretch collapses to a single-position piece.
        let map = PositionMap::from_cigar(&cigar("3M3I5M"), 11, 8).unwrap();
        let coords: Coords = "2..8:+".parse().unwrap();
        assert_eq!(
            map.project(&coords).unwrap().to_string(),
            "2..3:+,3..3:+,4..5:+"
        );
    }

    #[test]
    fn test_project_reverse_strand_span() {
        let map = PositionMap::from_cigar(&cigar("5M3D5M"), 10, 13).unwrap();
        let coords: Coords = "8..3:-".parse().unwrap();
        assert_eq!(map.project(&coords).unwrap().to_string(), "11..9:-,5..3:-");
    }

    #[test]
    fn test_project_preserves_multi_segment_order() {
        let map = PositionMap::from_cigar(&cigar("20M"), 20, 20).unwrap();
        let coords: Coords = "1..5:+,11..15:+".parse().unwrap();
        assert_eq!(
            map.project(&coords).unwrap().to_string(),
            "1..5:+,11..15:+"
        );
    }
}
