//! Indel tokens and anchor reconciliation.
//!
//! A heuristic pairwise aligner reports each hit as one ungapped anchor
//! (an equal-length model segment / sequence segment pair) plus a token
//! list describing the insertions and deletions it smoothed over. This
//! module parses those tokens and expands anchor + tokens into exact
//! paired coordinate segments.
//!
//! # Token syntax
//!
//! Two syntaxes for the same token coexist upstream (a format version
//! skew): `Q<qpos>:S<spos><±len>` and `Q<qpos>:S<spos>:<±len>`. Both are
//! accepted; serialization emits the colon-free form. `Q` is the
//! sequence-space anchor position and `S` the model-space anchor
//! position, each the last aligned position before the indel. A positive
//! length is an insertion (extra sequence nucleotides), negative a
//! deletion (model positions absent from the sequence). The literal
//! `BLANK` means "no indels" and parses to an empty token list.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coords::{Coords, Segment, Strand};
use crate::diagnostic::DiagnosticSink;
use crate::error::CoordsError;
use crate::Result;

/// Upstream sentinel for "no indels". Parsed into an empty token list;
/// never stored.
pub const NO_INDELS: &str = "BLANK";

/// One insertion or deletion reported against an ungapped anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndelToken {
    /// Sequence-space position of the last aligned nucleotide before the
    /// indel (`Q` field).
    pub seq_pos: u64,
    /// Model-space position of the last aligned position before the
    /// indel (`S` field).
    pub model_pos: u64,
    /// Signed length: positive = insertion, negative = deletion. Never
    /// zero.
    pub len: i64,
}

impl fmt::Display for IndelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}:S{}{:+}", self.seq_pos, self.model_pos, self.len)
    }
}

/// Parse a `;`-separated indel token list, or the [`NO_INDELS`] sentinel.
///
/// # Examples
///
/// ```
/// use ferro_coords::indel::parse_indel_tokens;
///
/// let tokens = parse_indel_tokens("Q12:S10+3;Q40:S41:-2;").unwrap();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].len, 3);
/// assert_eq!(tokens[1].len, -2);
///
/// assert!(parse_indel_tokens("BLANK").unwrap().is_empty());
/// ```
pub fn parse_indel_tokens(s: &str) -> Result<Vec<IndelToken>> {
    let s = s.trim();
    if s == NO_INDELS {
        return Ok(Vec::new());
    }
    if s.is_empty() {
        return Err(CoordsError::format(s, "empty indel token string"));
    }
    s.split(';')
        .filter(|tok| !tok.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(tok: &str) -> Result<IndelToken> {
    let err = |msg: &str| CoordsError::format(tok, msg);

    let rest = tok
        .strip_prefix('Q')
        .ok_or_else(|| err("token must start with 'Q'"))?;
    let (q_str, rest) = rest
        .split_once(':')
        .ok_or_else(|| err("missing ':' after Q position"))?;
    let rest = rest
        .strip_prefix('S')
        .ok_or_else(|| err("expected 'S' after ':'"))?;
    let sign_idx = rest
        .find(['+', '-'])
        .ok_or_else(|| err("missing signed indel length"))?;
    let (s_part, len_str) = rest.split_at(sign_idx);
    // Older emitters write Q..:S..+N, newer ones Q..:S..:+N.
    let s_str = s_part.strip_suffix(':').unwrap_or(s_part);

    let seq_pos: u64 = q_str
        .parse()
        .map_err(|_| err("Q position is not a valid number"))?;
    let model_pos: u64 = s_str
        .parse()
        .map_err(|_| err("S position is not a valid number"))?;
    let len: i64 = len_str
        .parse()
        .map_err(|_| err("indel length is not a valid signed number"))?;

    if seq_pos == 0 || model_pos == 0 {
        return Err(err("positions are 1-based; zero is not valid"));
    }
    if len == 0 {
        return Err(err("indel length must be nonzero"));
    }
    Ok(IndelToken {
        seq_pos,
        model_pos,
        len,
    })
}

/// Serialize a token list back to the `;`-separated wire form, or
/// [`NO_INDELS`] when empty.
pub fn serialize_indel_tokens(tokens: &[IndelToken]) -> String {
    if tokens.is_empty() {
        return NO_INDELS.to_string();
    }
    let mut out = String::new();
    for tok in tokens {
        out.push_str(&tok.to_string());
        out.push(';');
    }
    out
}

/// Expand one ungapped anchor plus its indel tokens into exact paired
/// model/sequence coordinate segments.
///
/// The model anchor must be forward-strand (model space has no reverse
/// orientation); the sequence anchor may be on either strand, in which
/// case the sequence cursor walks downward. Tokens must be ordered by
/// increasing model anchor position.
///
/// The output lists always carry equal segment counts, and the spanned
/// sequence extent minus the model extent equals the net signed indel
/// length.
pub fn reconcile(
    anchor_model: Segment,
    anchor_seq: Segment,
    tokens: &[IndelToken],
    sink: &dyn DiagnosticSink,
) -> Result<(Coords, Coords)> {
    if anchor_model.strand() != Strand::Forward {
        return Err(CoordsError::consistency(format!(
            "model anchor {} must be forward-strand",
            anchor_model
        )));
    }
    if anchor_model.len() != anchor_seq.len() {
        return Err(CoordsError::consistency(format!(
            "anchor lengths differ: model {} spans {} nt, sequence {} spans {} nt",
            anchor_model,
            anchor_model.len(),
            anchor_seq,
            anchor_seq.len()
        )));
    }

    if tokens.is_empty() {
        return Ok((
            Coords::from_segment(anchor_model),
            Coords::from_segment(anchor_seq),
        ));
    }

    let strand = anchor_seq.strand();
    let dir = strand.step();
    let mut mdl_cur = anchor_model.start();
    let mut seq_cur = anchor_seq.start() as i64;
    let mut mdl_segs: Vec<Segment> = Vec::with_capacity(tokens.len() + 1);
    let mut seq_segs: Vec<Segment> = Vec::with_capacity(tokens.len() + 1);
    let mut prev_model_pos = 0u64;
    let mut net: i64 = 0;

    for tok in tokens {
        if tok.model_pos < prev_model_pos {
            return Err(CoordsError::format(
                tok.to_string(),
                "indel tokens out of order by model position",
            ));
        }
        prev_model_pos = tok.model_pos;

        if tok.model_pos < mdl_cur || tok.model_pos > anchor_model.stop() {
            return Err(CoordsError::format(
                tok.to_string(),
                format!(
                    "model anchor position outside open segment {}..{}",
                    mdl_cur,
                    anchor_model.stop()
                ),
            ));
        }

        // Close the open pair just before the indel.
        let mdl_seg = Segment::new(mdl_cur, tok.model_pos, Strand::Forward)?;
        let seq_seg = close_seq_segment(seq_cur, tok.seq_pos as i64, strand, tok)?;
        if mdl_seg.len() != seq_seg.len() {
            return Err(CoordsError::consistency(format!(
                "token {} closes unequal pair: model {} ({} nt) vs sequence {} ({} nt)",
                tok,
                mdl_seg,
                mdl_seg.len(),
                seq_seg,
                seq_seg.len()
            )));
        }
        sink.event(
            "reconcile",
            &format!("closed pair {} / {} at {}", mdl_seg, seq_seg, tok),
        );
        mdl_segs.push(mdl_seg);
        seq_segs.push(seq_seg);

        // Skip the indel and reopen immediately after.
        if tok.len > 0 {
            // Insertion: only the sequence cursor jumps.
            mdl_cur = tok.model_pos + 1;
            seq_cur = tok.seq_pos as i64 + dir * (tok.len + 1);
        } else {
            // Deletion: only the model cursor jumps.
            mdl_cur = tok.model_pos + 1 + tok.len.unsigned_abs();
            seq_cur = tok.seq_pos as i64 + dir;
        }
        net += tok.len;
    }

    // Close the final pair at the anchor's model end; the sequence stop
    // follows from the model length plus accumulated indels.
    if mdl_cur > anchor_model.stop() {
        return Err(CoordsError::consistency(format!(
            "indels consumed the model anchor: cursor {} past end {}",
            mdl_cur,
            anchor_model.stop()
        )));
    }
    let final_mdl = Segment::new(mdl_cur, anchor_model.stop(), Strand::Forward)?;
    let final_stop = seq_cur + dir * (final_mdl.len() as i64 - 1);
    if seq_cur <= 0 || final_stop <= 0 {
        return Err(CoordsError::range(format!(
            "sequence cursor left 1-based space (open {}, stop {})",
            seq_cur, final_stop
        )));
    }
    let final_seq = Segment::new(seq_cur as u64, final_stop as u64, strand)?;
    mdl_segs.push(final_mdl);
    seq_segs.push(final_seq);

    // Spanned-extent invariant: sequence extent - model extent = net indels.
    let mdl_extent = anchor_model.len() as i64;
    let seq_extent =
        (seq_segs[0].start() as i64 - final_stop).abs() + 1;
    if seq_extent - mdl_extent != net {
        return Err(CoordsError::consistency(format!(
            "indel bookkeeping disagrees: sequence extent {} - model extent {} != net {}",
            seq_extent, mdl_extent, net
        )));
    }

    Ok((
        Coords::from_segments(mdl_segs)?,
        Coords::from_segments(seq_segs)?,
    ))
}

/// Close the open sequence segment at the token's Q position, walking in
/// the sequence anchor's strand direction.
fn close_seq_segment(open: i64, close: i64, strand: Strand, tok: &IndelToken) -> Result<Segment> {
    let ordered = match strand {
        Strand::Forward => open <= close,
        Strand::Reverse => open >= close,
    };
    if open <= 0 || close <= 0 || !ordered {
        return Err(CoordsError::format(
            tok.to_string(),
            format!(
                "sequence anchor position closes segment opened at {} against the strand",
                open
            ),
        ));
    }
    Segment::new(open as u64, close as u64, strand)
}
