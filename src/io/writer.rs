use crate::analysis::network::InteractionNetwork;
use crate::analysis::report::{ChainPair, ChainUnit, ContactSpan};
use crate::error::{ContactError, Result};
use crate::symmetry::{Operator, SymmetryGroup};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ContactError::io(path, e))
}

/// Wraps a block of `writeln!` calls so I/O failures carry the file name.
fn emit<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut out = create(path)?;
    body(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| ContactError::io(path, e))
}

// ============================================================================
// CHAIN PAIRS
// ============================================================================

/// Writes the chain-pair summary: one line per pair, then the interaction
/// clusters with the contact atoms of each chain in parentheses.
pub fn write_chain_pairs(
    path: &Path,
    pairs: &[ChainPair],
    network: &InteractionNetwork,
) -> Result<()> {
    let clusters = network.clusters();
    emit(path, |out| {
        writeln!(out, "# Chain pairs in contact ({})", pairs.len())?;
        writeln!(out, "{:>5}  {:<24} {:<24} {:>6}", "index", "chain 1", "chain 2", "atoms")?;
        for (i, p) in pairs.iter().enumerate() {
            writeln!(
                out,
                "{:>5}  {:<24} {:<24} {:>6}",
                i + 1,
                p.first.to_string(),
                p.second.to_string(),
                p.atoms
            )?;
        }

        writeln!(out)?;
        writeln!(out, "# Interaction clusters ({})", clusters.len())?;
        for (i, members) in clusters.iter().enumerate() {
            let names: Vec<String> = members
                .iter()
                .map(|u| format!("{} ({})", u, network.contact_load(u)))
                .collect();
            writeln!(out, "{:>5}  {}", i + 1, names.join(", "))?;
        }
        Ok(())
    })
}

// ============================================================================
// RESIDUE SPANS
// ============================================================================

/// File name of the span report for `pair`, e.g. `interactions_1_h1_A__2.3_h1_B.txt`.
pub fn pair_report_name(pair: &ChainPair) -> String {
    let unit = |u: &ChainUnit| {
        format!("{}_{}_{}", u.model_id, u.prot_id, u.chain_id)
            .trim_start_matches('#')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
            .collect::<String>()
    };
    format!("interactions_{}__{}.txt", unit(&pair.first), unit(&pair.second))
}

pub fn write_spans(
    path: &Path,
    pair: &ChainPair,
    spans: &[ContactSpan],
    threshold: u32,
) -> Result<()> {
    emit(path, |out| {
        writeln!(out, "# {}  <->  {}", pair.first, pair.second)?;
        writeln!(out, "# atoms in contact: {}", pair.atoms)?;
        writeln!(out, "# largest residue gap inside a span: {}", threshold)?;
        writeln!(
            out,
            "{:<24} {:<24} {:>6} {:>9} {:>9}",
            "residues 1", "residues 2", "atoms", "min dist", "max over"
        )?;
        for s in spans {
            writeln!(
                out,
                "{:<24} {:<24} {:>6} {:>9.3} {:>9.3}",
                s.label_1(),
                s.label_2(),
                s.atoms,
                s.min_distance,
                s.max_overlap
            )?;
        }
        Ok(())
    })
}

// ============================================================================
// OPERATORS
// ============================================================================

/// Lists the operator that places each copy `#2.k`.
pub fn write_operator_table(path: &Path, group: &SymmetryGroup, ops: &[Operator]) -> Result<()> {
    emit(path, |out| {
        writeln!(out, "# {} ({} copies)", group, ops.len())?;
        for (k, op) in ops.iter().enumerate() {
            let m = op.row_major_3x4();
            writeln!(out, "#2.{}", k + 1)?;
            for row in m.chunks(4) {
                writeln!(
                    out,
                    "  {:>10.6} {:>10.6} {:>10.6} {:>12.6}",
                    row[0], row[1], row[2], row[3]
                )?;
            }
        }
        Ok(())
    })
}
