//! Segmented coordinate model and algebra.
//!
//! A feature's location is a list of [`Segment`]s in biological 5'→3'
//! order, serialized as `start..stop:strand[,start..stop:strand...]`.
//! Segments are 1-based and inclusive at both ends; a spliced or
//! otherwise disjoint feature simply carries more than one segment, and
//! the segments need not be in ascending numeric order.
//!
//! | Strand | Invariant | Traversal |
//! |--------|-----------|-----------|
//! | `+` | start <= stop | ascending |
//! | `-` | start >= stop | descending |
//!
//! Parsing and serialization are exact inverses: `parse(serialize(x)) == x`
//! and `serialize(parse(s)) == s` for all well-formed inputs.
//!
//! # Examples
//!
//! ```
//! use ferro_coords::coords::Coords;
//!
//! let coords: Coords = "1..300:+,400..651:+".parse().unwrap();
//! assert_eq!(coords.len(), 552);
//! assert_eq!(coords.to_string(), "1..300:+,400..651:+");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoordsError;
use crate::Result;

mod project;

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    /// Plus/forward strand (`+`)
    Forward,
    /// Minus/reverse strand (`-`)
    Reverse,
}

impl Strand {
    /// The opposite strand.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// Step direction when walking positions 5'→3' on this strand.
    #[inline]
    pub(crate) fn step(self) -> i64 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

impl FromStr for Strand {
    type Err = CoordsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(CoordsError::format(s, "strand must be '+' or '-'")),
        }
    }
}

/// One contiguous (start, stop, strand) run within a coords string.
///
/// Positions are 1-based and inclusive. On the forward strand
/// `start <= stop`; on the reverse strand `start >= stop` (the segment is
/// traversed from `start` down to `stop`). Both orderings denote
/// `|stop - start| + 1` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    start: u64,
    stop: u64,
    strand: Strand,
}

impl Segment {
    /// Create a segment, validating the strand/order invariant.
    pub fn new(start: u64, stop: u64, strand: Strand) -> Result<Self> {
        if start == 0 || stop == 0 {
            return Err(CoordsError::format(
                format!("{}..{}:{}", start, stop, strand),
                "positions are 1-based; zero is not a valid position",
            ));
        }
        match strand {
            Strand::Forward if start > stop => Err(CoordsError::format(
                format!("{}..{}:{}", start, stop, strand),
                "forward-strand segment requires start <= stop",
            )),
            Strand::Reverse if start < stop => Err(CoordsError::format(
                format!("{}..{}:{}", start, stop, strand),
                "reverse-strand segment requires start >= stop",
            )),
            _ => Ok(Self {
                start,
                stop,
                strand,
            }),
        }
    }

    /// 5' position of the segment (first position traversed).
    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 3' position of the segment (last position traversed).
    #[inline]
    pub fn stop(&self) -> u64 {
        self.stop
    }

    /// Strand orientation.
    #[inline]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Number of positions covered.
    #[inline]
    pub fn len(&self) -> u64 {
        self.start.abs_diff(self.stop) + 1
    }

    /// Lowest numeric position covered.
    #[inline]
    pub fn low(&self) -> u64 {
        self.start.min(self.stop)
    }

    /// Highest numeric position covered.
    #[inline]
    pub fn high(&self) -> u64 {
        self.start.max(self.stop)
    }

    /// Whether `pos` falls within this segment.
    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.low() && pos <= self.high()
    }

    /// Position reached after walking `offset` steps from the 5' end in
    /// the strand's traversal direction. `offset` must be `< len()`.
    pub(crate) fn walk(&self, offset: u64) -> u64 {
        debug_assert!(offset < self.len());
        match self.strand {
            Strand::Forward => self.start + offset,
            Strand::Reverse => self.start - offset,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}:{}", self.start, self.stop, self.strand)
    }
}

impl FromStr for Segment {
    type Err = CoordsError;

    fn from_str(s: &str) -> Result<Self> {
        let (span, strand_str) = s
            .rsplit_once(':')
            .ok_or_else(|| CoordsError::format(s, "expected 'start..stop:strand'"))?;
        let (start_str, stop_str) = span
            .split_once("..")
            .ok_or_else(|| CoordsError::format(s, "expected 'start..stop' span"))?;
        let start: u64 = start_str
            .parse()
            .map_err(|_| CoordsError::format(s, "start is not a valid position"))?;
        let stop: u64 = stop_str
            .parse()
            .map_err(|_| CoordsError::format(s, "stop is not a valid position"))?;
        let strand: Strand = strand_str
            .parse()
            .map_err(|_| CoordsError::format(s, "strand must be '+' or '-'"))?;
        Segment::new(start, stop, strand)
    }
}

/// An ordered list of segments locating one feature.
///
/// Segment order is biological 5'→3' order, which for spliced or
/// origin-spanning features is not necessarily ascending numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords(Vec<Segment>);

impl Coords {
    /// Build from a non-empty segment list.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(CoordsError::format(
                "",
                "coords must contain at least one segment",
            ));
        }
        Ok(Self(segments))
    }

    /// A single-segment coords.
    pub fn from_segment(segment: Segment) -> Self {
        Self(vec![segment])
    }

    /// The segments, in 5'→3' order.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.0.len()
    }

    /// Total number of positions covered, summed over segments.
    pub fn len(&self) -> u64 {
        self.0.iter().map(Segment::len).sum()
    }

    /// True when there are no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment in 5'→3' order.
    pub fn first(&self) -> &Segment {
        &self.0[0]
    }

    /// Last segment in 5'→3' order.
    pub fn last(&self) -> &Segment {
        &self.0[self.0.len() - 1]
    }

    /// Reverse complement of this coords over a source sequence of
    /// `total_len` positions: segment order is reversed, every position
    /// `p` maps to `total_len - p + 1`, and every strand flips.
    ///
    /// Applying this twice with the same `total_len` is the identity.
    pub fn reverse_complement(&self, total_len: u64) -> Result<Coords> {
        let mut out = Vec::with_capacity(self.0.len());
        for seg in self.0.iter().rev() {
            if seg.high() > total_len {
                return Err(CoordsError::range(format!(
                    "segment {} exceeds sequence length {}",
                    seg, total_len
                )));
            }
            out.push(Segment::new(
                total_len - seg.start + 1,
                total_len - seg.stop + 1,
                seg.strand.flip(),
            )?);
        }
        Coords::from_segments(out)
    }

    /// The segment of greatest length; ties broken by first occurrence.
    pub fn max_length_segment(&self) -> Segment {
        let mut best = self.0[0];
        for seg in &self.0[1..] {
            if seg.len() > best.len() {
                best = *seg;
            }
        }
        best
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for Coords {
    type Err = CoordsError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(CoordsError::format(s, "empty coords string"));
        }
        let segments = s
            .split(',')
            .map(Segment::from_str)
            .collect::<Result<Vec<_>>>()?;
        Coords::from_segments(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(s: &str) -> Coords {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_single_forward() {
        let c = coords("1..300:+");
        assert_eq!(c.segment_count(), 1);
        assert_eq!(c.first().start(), 1);
        assert_eq!(c.first().stop(), 300);
        assert_eq!(c.first().strand(), Strand::Forward);
    }

    #[test]
    fn test_parse_single_reverse() {
        let c = coords("300..1:-");
        assert_eq!(c.first().start(), 300);
        assert_eq!(c.first().stop(), 1);
        assert_eq!(c.first().strand(), Strand::Reverse);
        assert_eq!(c.len(), 300);
    }

    #[test]
    fn test_parse_spliced() {
        let c = coords("1..100:+,200..350:+");
        assert_eq!(c.segment_count(), 2);
        assert_eq!(c.len(), 100 + 151);
    }

    #[test]
    fn test_roundtrip_serialize_parse() {
        for s in [
            "1..300:+",
            "300..1:-",
            "1..100:+,200..350:+",
            "7..7:+",
            "6161..7000:+,1..120:+",
            "500..301:-,100..1:-",
        ] {
            assert_eq!(coords(s).to_string(), s);
        }
    }

    #[test]
    fn test_roundtrip_parse_serialize() {
        let c = coords("1..100:+,200..350:+");
        let reparsed: Coords = c.to_string().parse().unwrap();
        assert_eq!(reparsed, c);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in [
            "",
            "1..300",
            "1..300:*",
            "1-300:+",
            "x..300:+",
            "1..y:+",
            "1..300:+,",
            "0..10:+",
            "10..0:-",
        ] {
            assert!(
                matches!(s.parse::<Coords>(), Err(CoordsError::Format { .. })),
                "expected format error for '{}'",
                s
            );
        }
    }

    #[test]
    fn test_parse_rejects_strand_order_mismatch() {
        assert!("300..1:+".parse::<Coords>().is_err());
        assert!("1..300:-".parse::<Coords>().is_err());
    }

    #[test]
    fn test_single_position_segment_valid_either_strand() {
        assert!("7..7:+".parse::<Coords>().is_ok());
        assert!("7..7:-".parse::<Coords>().is_ok());
    }

    #[test]
    fn test_length() {
        assert_eq!(coords("1..300:+").len(), 300);
        assert_eq!(coords("300..1:-").len(), 300);
        assert_eq!(coords("1..3:+,4..6:+,20..21:+").len(), 8);
        assert_eq!(coords("5..5:+").len(), 1);
        assert!(!coords("5..5:+").is_empty());
    }

    #[test]
    fn test_reverse_complement_single() {
        // 1..3:+ over a 6nt sequence becomes 6..4:-
        let rc = coords("1..3:+").reverse_complement(6).unwrap();
        assert_eq!(rc.to_string(), "6..4:-");
    }

    #[test]
    fn test_reverse_complement_multi() {
        let rc = coords("1..3:+,4..6:+").reverse_complement(6).unwrap();
        assert_eq!(rc.to_string(), "3..1:-,6..4:-");
    }

    #[test]
    fn test_reverse_complement_involutive() {
        for s in ["1..300:+", "300..1:-", "1..100:+,200..350:+", "7..7:+"] {
            let c = coords(s);
            let twice = c
                .reverse_complement(400)
                .unwrap()
                .reverse_complement(400)
                .unwrap();
            assert_eq!(twice, c, "involution failed for '{}'", s);
        }
    }

    #[test]
    fn test_reverse_complement_preserves_length() {
        let c = coords("1..3:+,4..6:+,20..21:+");
        let rc = c.reverse_complement(21).unwrap();
        assert_eq!(rc.len(), c.len());
    }

    #[test]
    fn test_reverse_complement_out_of_range() {
        let c = coords("1..3:+,4..6:+,20..21:+");
        assert!(matches!(
            c.reverse_complement(10),
            Err(CoordsError::Range { .. })
        ));
    }

    #[test]
    fn test_max_length_segment_first_occurrence_stable() {
        // 1..3 and 4..6 tie at length 3; the first wins.
        let c = coords("1..3:+,4..6:+,20..21:+");
        assert_eq!(c.max_length_segment().to_string(), "1..3:+");
    }

    #[test]
    fn test_max_length_segment_consistent_under_reverse_complement() {
        // The reverse complement of the max segment is the max segment of
        // the reverse complement of a single-segment coords.
        let max = coords("1..3:+,4..6:+,20..21:+").max_length_segment();
        let rc = Coords::from_segment(max).reverse_complement(6).unwrap();
        assert_eq!(rc.max_length_segment().to_string(), "6..4:-");
    }

    #[test]
    fn test_max_length_segment_strict_max() {
        let c = coords("1..2:+,10..40:+,50..52:+");
        assert_eq!(c.max_length_segment().to_string(), "10..40:+");
    }

    #[test]
    fn test_segment_contains() {
        let seg: Segment = "300..100:-".parse().unwrap();
        assert!(seg.contains(100));
        assert!(seg.contains(300));
        assert!(seg.contains(200));
        assert!(!seg.contains(99));
        assert!(!seg.contains(301));
    }

    #[test]
    fn test_segment_walk() {
        let fwd: Segment = "10..20:+".parse().unwrap();
        assert_eq!(fwd.walk(0), 10);
        assert_eq!(fwd.walk(10), 20);

        let rev: Segment = "20..10:-".parse().unwrap();
        assert_eq!(rev.walk(0), 20);
        assert_eq!(rev.walk(10), 10);
    }
}
