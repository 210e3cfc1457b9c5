//! Insert-file codec.
//!
//! The profile aligner emits a per-sequence insertion ledger alongside
//! each alignment: for every model, a header line naming the model and
//! its length, then one line per sequence recording the sequence length,
//! the alignment extent (`spos`/`epos`), and the ordered
//! `modelPos:seqPos:length` insertion triples. A `//` line closes each
//! model block.
//!
//! ```text
//! NC_039477 7567
//! JQ911595.1 7511 3 7513  2560:2553:3;2583:2579:3;
//! //
//! ```
//!
//! `parse → write → parse` yields field-identical records; ordering
//! across models follows insertion order rather than any byte-identical
//! guarantee.

use serde::{Deserialize, Serialize};

use crate::error::CoordsError;
use crate::Result;

/// One insertion: `len` sequence nucleotides after model position
/// `model_pos`, starting at sequence position `seq_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertPoint {
    /// Model position the insertion follows.
    pub model_pos: u64,
    /// Sequence position of the first inserted nucleotide.
    pub seq_pos: u64,
    /// Number of inserted nucleotides.
    pub len: u64,
}

/// Per-sequence ledger entry under one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRecord {
    /// Sequence name.
    pub seq_name: String,
    /// Full sequence length.
    pub seq_len: u64,
    /// First aligned model position.
    pub spos: u64,
    /// Last aligned model position.
    pub epos: u64,
    /// Insertions, ordered by model position.
    pub inserts: Vec<InsertPoint>,
}

/// All ledger entries for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInserts {
    /// Model name.
    pub name: String,
    /// Model consensus length.
    pub model_len: u64,
    /// Per-sequence records, in file order.
    pub records: Vec<InsertRecord>,
}

/// An entire parsed insert file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsertFile {
    /// Per-model blocks, in file order.
    pub models: Vec<ModelInserts>,
}

impl InsertFile {
    /// Parse ledger text. `file_name` is used only for error reporting.
    pub fn parse(text: &str, file_name: &str) -> Result<Self> {
        let mut models: Vec<ModelInserts> = Vec::new();
        let mut current: Option<ModelInserts> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line == "//" {
                if let Some(model) = current.take() {
                    models.push(model);
                }
                continue;
            }

            match current.as_mut() {
                None => {
                    // Header line: model name + model length.
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() != 2 {
                        return Err(CoordsError::format_at(
                            raw_line,
                            format!("expected 'model modelLen' header, found {} fields", fields.len()),
                            file_name,
                            line_num,
                        ));
                    }
                    let model_len = parse_u64(fields[1], raw_line, file_name, line_num, "model length")?;
                    let name = fields[0].to_string();
                    if models.iter().any(|m| m.name == name) {
                        return Err(CoordsError::format_at(
                            raw_line,
                            format!("duplicate model block '{}'", name),
                            file_name,
                            line_num,
                        ));
                    }
                    current = Some(ModelInserts {
                        name,
                        model_len,
                        records: Vec::new(),
                    });
                }
                Some(model) => {
                    model
                        .records
                        .push(parse_record(raw_line, line, file_name, line_num)?);
                }
            }
        }
        if let Some(model) = current.take() {
            models.push(model);
        }
        Ok(InsertFile { models })
    }

    /// Serialize back to ledger text, grouped by model in stored order.
    pub fn write(&self) -> String {
        let mut out = String::new();
        for model in &self.models {
            out.push_str(&format!("{} {}\n", model.name, model.model_len));
            for rec in &model.records {
                out.push_str(&format!(
                    "{} {} {} {}",
                    rec.seq_name, rec.seq_len, rec.spos, rec.epos
                ));
                if !rec.inserts.is_empty() {
                    out.push_str("  ");
                    for ins in &rec.inserts {
                        out.push_str(&format!("{}:{}:{};", ins.model_pos, ins.seq_pos, ins.len));
                    }
                }
                out.push('\n');
            }
            out.push_str("//\n");
        }
        out
    }

    /// Look up one model's block by name.
    pub fn model(&self, name: &str) -> Option<&ModelInserts> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Look up one sequence's record under one model.
    pub fn record(&self, model: &str, seq_name: &str) -> Option<&InsertRecord> {
        self.model(model)?
            .records
            .iter()
            .find(|r| r.seq_name == seq_name)
    }
}

fn parse_u64(s: &str, line: &str, file: &str, line_num: usize, what: &str) -> Result<u64> {
    s.parse().map_err(|_| {
        CoordsError::format_at(
            line,
            format!("{} '{}' is not a valid number", what, s),
            file,
            line_num,
        )
    })
}

fn parse_record(raw_line: &str, line: &str, file: &str, line_num: usize) -> Result<InsertRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 4 && fields.len() != 5 {
        return Err(CoordsError::format_at(
            raw_line,
            format!(
                "expected 'seq seqLen spos epos [inserts]', found {} fields",
                fields.len()
            ),
            file,
            line_num,
        ));
    }

    let seq_len = parse_u64(fields[1], raw_line, file, line_num, "sequence length")?;
    let spos = parse_u64(fields[2], raw_line, file, line_num, "spos")?;
    let epos = parse_u64(fields[3], raw_line, file, line_num, "epos")?;

    let mut inserts = Vec::new();
    if fields.len() == 5 {
        for triple in fields[4].split(';').filter(|t| !t.is_empty()) {
            let parts: Vec<&str> = triple.split(':').collect();
            if parts.len() != 3 {
                return Err(CoordsError::format_at(
                    raw_line,
                    format!("insertion triple '{}' is not modelPos:seqPos:len", triple),
                    file,
                    line_num,
                ));
            }
            inserts.push(InsertPoint {
                model_pos: parse_u64(parts[0], raw_line, file, line_num, "insertion model position")?,
                seq_pos: parse_u64(parts[1], raw_line, file, line_num, "insertion sequence position")?,
                len: parse_u64(parts[2], raw_line, file, line_num, "insertion length")?,
            });
        }
    }

    Ok(InsertRecord {
        seq_name: fields[0].to_string(),
        seq_len,
        spos,
        epos,
        inserts,
    })
}
