//! Frameshift detection.
//!
//! Given a per-column implied-frame track for one aligned CDS, finds the
//! maximal contiguous column runs whose frame disagrees with the CDS's
//! dominant frame. Each indel in the sequence shifts the implied frame of
//! every following column until a compensating indel restores it; a
//! shifted run that is never restored reaches the end of the CDS and is
//! reported as unrestored.

use serde::{Deserialize, Serialize};

use crate::config::FrameshiftConfig;
use crate::coords::Strand;
use crate::diagnostic::DiagnosticSink;
use crate::error::CoordsError;
use crate::Result;

/// Implied frame of one aligned column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameValue {
    /// Codon start 1, 2, or 3.
    Codon(u8),
    /// Insertion column: a sequence nucleotide with no model position.
    Insert,
    /// Deletion column: a model position with no sequence nucleotide.
    Delete,
}

/// One aligned column of a CDS.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameColumn {
    /// Implied frame.
    pub frame: FrameValue,
    /// Sequence position, absent for deletion columns.
    pub seq_pos: Option<u64>,
    /// Model position, absent for insertion columns.
    pub model_pos: Option<u64>,
    /// Per-column posterior confidence in [0, 1].
    pub confidence: f64,
}

/// Per-column implied-frame track for one CDS, possibly spanning
/// multiple coordinate segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTrack {
    strand: Strand,
    columns: Vec<FrameColumn>,
}

impl FrameTrack {
    /// Build a track, validating codon values.
    pub fn new(strand: Strand, columns: Vec<FrameColumn>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if let FrameValue::Codon(f) = col.frame {
                if !(1..=3).contains(&f) {
                    return Err(CoordsError::format(
                        f.to_string(),
                        format!("column {}: codon start must be 1, 2, or 3", i + 1),
                    ));
                }
            }
            match col.frame {
                FrameValue::Insert if col.model_pos.is_some() => {
                    return Err(CoordsError::consistency(format!(
                        "column {}: insertion column carries a model position",
                        i + 1
                    )));
                }
                FrameValue::Delete if col.seq_pos.is_some() => {
                    return Err(CoordsError::consistency(format!(
                        "column {}: deletion column carries a sequence position",
                        i + 1
                    )));
                }
                _ => {}
            }
        }
        Ok(Self { strand, columns })
    }

    /// Strand the CDS lies on.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The columns, in 5'→3' order.
    pub fn columns(&self) -> &[FrameColumn] {
        &self.columns
    }

    /// The most frequent codon-start value across the track; ties broken
    /// by first occurrence. `None` when the track has no codon columns.
    pub fn dominant_frame(&self) -> Option<u8> {
        let mut counts = [0u64; 3];
        let mut first_seen = [usize::MAX; 3];
        for (i, col) in self.columns.iter().enumerate() {
            if let FrameValue::Codon(f) = col.frame {
                let idx = (f - 1) as usize;
                counts[idx] += 1;
                if first_seen[idx] == usize::MAX {
                    first_seen[idx] = i;
                }
            }
        }
        let mut best: Option<usize> = None;
        for idx in 0..3 {
            if counts[idx] == 0 {
                continue;
            }
            best = match best {
                None => Some(idx),
                Some(b) => {
                    if counts[idx] > counts[b]
                        || (counts[idx] == counts[b] && first_seen[idx] < first_seen[b])
                    {
                        Some(idx)
                    } else {
                        Some(b)
                    }
                }
            };
        }
        best.map(|idx| idx as u8 + 1)
    }
}

/// Whether the dominant frame was restored after a shifted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// A later column restored the dominant frame before the CDS ended.
    Fixed,
    /// The run was still open at the CDS's terminal column.
    NotFixed,
}

/// One maximal contiguous frame-inconsistent column run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameshiftRun {
    /// Sequence-space extent (5'→3' on the CDS's strand).
    pub seq_span: (u64, u64),
    /// Strand of the CDS.
    pub strand: Strand,
    /// Model-space extent (ascending).
    pub model_span: (u64, u64),
    /// Net inserted (+) / deleted (−) nucleotide count within the run.
    pub net_indel: i64,
    /// Mean per-column confidence over the run.
    pub mean_confidence: f64,
    /// Whether a compensating indel restored the dominant frame.
    pub status: RunStatus,
}

/// Find frame-inconsistent runs in `track`.
///
/// Two-state scan: in-dominant-frame until a column disagrees with the
/// dominant frame, then in-shifted-run until a column agrees again
/// (closing the run as [`RunStatus::Fixed`]) or the track ends (closing
/// it as [`RunStatus::NotFixed`]). Insertion and deletion columns never
/// restore the dominant frame. Runs spanning fewer than
/// `config.min_run_nt` nucleotides are suppressed.
pub fn detect(
    track: &FrameTrack,
    config: &FrameshiftConfig,
    sink: &dyn DiagnosticSink,
) -> Vec<FrameshiftRun> {
    let dominant = match track.dominant_frame() {
        Some(f) => f,
        None => return Vec::new(),
    };
    sink.event("frameshift", &format!("dominant frame {}", dominant));

    let columns = track.columns();
    let mut runs = Vec::new();
    let mut open_at: Option<usize> = None;
    for (i, col) in columns.iter().enumerate() {
        let matches_dominant = col.frame == FrameValue::Codon(dominant);
        match (open_at, matches_dominant) {
            (None, false) => open_at = Some(i),
            (Some(start), true) => {
                push_run(track, start, i, RunStatus::Fixed, config, sink, &mut runs);
                open_at = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open_at {
        push_run(
            track,
            start,
            columns.len(),
            RunStatus::NotFixed,
            config,
            sink,
            &mut runs,
        );
    }
    runs
}

/// Materialize the run over columns `[start, end)`, applying the minimum
/// length policy.
fn push_run(
    track: &FrameTrack,
    start: usize,
    end: usize,
    status: RunStatus,
    config: &FrameshiftConfig,
    sink: &dyn DiagnosticSink,
    runs: &mut Vec<FrameshiftRun>,
) {
    let columns = &track.columns()[start..end];

    let seq_positions: Vec<u64> = columns.iter().filter_map(|c| c.seq_pos).collect();
    let model_positions: Vec<u64> = columns.iter().filter_map(|c| c.model_pos).collect();

    let seq_span = span_or_flank(&seq_positions, track, start, end, |c| c.seq_pos);
    let model_span = span_or_flank(&model_positions, track, start, end, |c| c.model_pos);

    // Run length policy is measured on the sequence; a pure-deletion run
    // falls back to its model extent.
    let run_nt = if seq_positions.is_empty() {
        model_span.1 - model_span.0 + 1
    } else {
        seq_positions.iter().max().unwrap() - seq_positions.iter().min().unwrap() + 1
    };
    if run_nt < config.min_run_nt {
        sink.event(
            "frameshift",
            &format!("suppressed {} nt run at columns {}..{}", run_nt, start + 1, end),
        );
        return;
    }

    let net_indel = columns
        .iter()
        .map(|c| match c.frame {
            FrameValue::Insert => 1i64,
            FrameValue::Delete => -1i64,
            FrameValue::Codon(_) => 0,
        })
        .sum();
    let mean_confidence =
        columns.iter().map(|c| c.confidence).sum::<f64>() / columns.len() as f64;

    // Orient the sequence span 5'→3' on the CDS's strand.
    let seq_span = match track.strand() {
        Strand::Forward => seq_span,
        Strand::Reverse => (seq_span.1, seq_span.0),
    };

    sink.event(
        "frameshift",
        &format!(
            "run seq {}..{} model {}..{} net {:+} ({:?})",
            seq_span.0, seq_span.1, model_span.0, model_span.1, net_indel, status
        ),
    );
    runs.push(FrameshiftRun {
        seq_span,
        strand: track.strand(),
        model_span,
        net_indel,
        mean_confidence,
        status,
    });
}

/// (min, max) of the run's own positions, or the nearest flanking
/// position outside the run when the run has none in that space.
fn span_or_flank(
    positions: &[u64],
    track: &FrameTrack,
    start: usize,
    end: usize,
    get: impl Fn(&FrameColumn) -> Option<u64>,
) -> (u64, u64) {
    if !positions.is_empty() {
        let min = *positions.iter().min().unwrap();
        let max = *positions.iter().max().unwrap();
        return (min, max);
    }
    let columns = track.columns();
    let before = columns[..start].iter().rev().find_map(&get);
    let after = columns[end..].iter().find_map(&get);
    // A track with no positions anywhere in this space (every column an
    // indel against it) leaves nothing to flank; clamp to position 1.
    let p = before.or(after).unwrap_or(1);
    (p, p)
}
