//! Cross-model mapping tests: alert spans computed against one model
//! re-projected into another model's frame.

use ferro_coords::xmap::{Cigar, MapEntry, PositionMap};
use ferro_coords::{Coords, CoordsError};

fn map(cigar: &str, len_from: u64, len_to: u64) -> PositionMap {
    let cigar: Cigar = cigar.parse().unwrap();
    PositionMap::from_cigar(&cigar, len_from, len_to).unwrap()
}

fn coords(s: &str) -> Coords {
    s.parse().unwrap()
}

#[test]
fn full_length_identity_between_equal_models() {
    let m = map("7567M", 7567, 7567);
    assert_eq!(m.lookup(1).unwrap(), MapEntry::Aligned(1));
    assert_eq!(m.lookup(7567).unwrap(), MapEntry::Aligned(7567));
}

#[test]
fn model_with_extra_leader_shifts_everything() {
    // "to" model carries a 48 nt leader absent from "from".
    let m = map("48D7519M", 7519, 7567);
    assert_eq!(m.lookup(1).unwrap(), MapEntry::Aligned(49));
    assert_eq!(m.lookup(7519).unwrap(), MapEntry::Aligned(7567));
}

#[test]
fn alert_span_projection_across_internal_gap() {
    // A 1000 nt "from" model whose positions 501..510 are absent in "to".
    let m = map("500M10I490M", 1000, 990);

    // A span strictly before the gap translates exactly.
    assert_eq!(
        m.project(&coords("100..200:+")).unwrap().to_string(),
        "100..200:+"
    );

    // A span crossing the gap splits: exact, near-gap collapse, exact.
    assert_eq!(
        m.project(&coords("495..520:+")).unwrap().to_string(),
        "495..500:+,500..500:+,501..510:+"
    );
}

#[test]
fn near_gap_lookup_recovers_nearest_position() {
    let m = map("500M10I490M", 1000, 990);
    for p in 501..=510 {
        let entry = m.lookup(p).unwrap();
        assert!(!entry.is_aligned());
        assert_eq!(entry.position(), 500);
    }
    assert_eq!(m.lookup(511).unwrap(), MapEntry::Aligned(501));
}

#[test]
fn projection_preserves_strand() {
    let m = map("100M", 100, 100);
    assert_eq!(
        m.project(&coords("60..41:-")).unwrap().to_string(),
        "60..41:-"
    );
}

#[test]
fn mismatched_model_lengths_rejected() {
    let cigar: Cigar = "100M".parse().unwrap();
    assert!(matches!(
        PositionMap::from_cigar(&cigar, 100, 101),
        Err(CoordsError::Consistency { .. })
    ));
}

#[test]
fn projection_out_of_bounds_is_range_error() {
    let m = map("100M", 100, 100);
    assert!(matches!(
        m.project(&coords("95..105:+")),
        Err(CoordsError::Range { .. })
    ));
}

#[test]
fn cigar_round_trip() {
    for s in ["7567M", "48D7519M", "500M10I490M", "1M1I1D1M"] {
        let c: Cigar = s.parse().unwrap();
        assert_eq!(c.to_string(), s);
    }
}
