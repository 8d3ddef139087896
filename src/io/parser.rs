use crate::core::chain_map::ChainGroupMap;
use crate::core::record::{title_case, AtomSite, ContactRecord};
use crate::error::{ContactError, Result};
use glob::glob;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Lines of preamble (cutoffs, counts, column titles) before the first contact.
pub const HEADER_LINES: usize = 8;

// ============================================================================
// LAYOUT
// ============================================================================

/// Column layout of a report, fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLayout {
    /// `AA1 num1.chain1 atom1 AA2 num2.chain2 atom2 overlap distance`;
    /// both atoms belong to `model_id`.
    Plain { model_id: String },
    /// Same as `Plain` with a `#model` token in front of each side.
    Symmetric,
}

/// Raw tokens of one side of a contact line.
struct SideTokens<'a> {
    model_id: &'a str,
    aa_name: &'a str,
    residue: &'a str,
    atom_id: &'a str,
}

impl ReportLayout {
    fn token_count(&self) -> usize {
        match self {
            Self::Plain { .. } => 8,
            Self::Symmetric => 10,
        }
    }

    /// Splits a data line into its two sides plus overlap and distance.
    fn split<'a>(
        &'a self,
        tokens: &[&'a str],
    ) -> (SideTokens<'a>, SideTokens<'a>, &'a str, &'a str) {
        match self {
            Self::Plain { model_id } => (
                SideTokens {
                    model_id,
                    aa_name: tokens[0],
                    residue: tokens[1],
                    atom_id: tokens[2],
                },
                SideTokens {
                    model_id,
                    aa_name: tokens[3],
                    residue: tokens[4],
                    atom_id: tokens[5],
                },
                tokens[6],
                tokens[7],
            ),
            Self::Symmetric => (
                SideTokens {
                    model_id: tokens[0],
                    aa_name: tokens[1],
                    residue: tokens[2],
                    atom_id: tokens[3],
                },
                SideTokens {
                    model_id: tokens[4],
                    aa_name: tokens[5],
                    residue: tokens[6],
                    atom_id: tokens[7],
                },
                tokens[8],
                tokens[9],
            ),
        }
    }
}

// ============================================================================
// LINE PARSING
// ============================================================================

struct LineContext<'a> {
    file: &'a Path,
    line: usize,
    chain_map: &'a ChainGroupMap,
}

impl LineContext<'_> {
    fn error(&self, details: impl Into<String>) -> ContactError {
        ContactError::parse(self.file, self.line, details)
    }

    fn site(&self, side: SideTokens<'_>) -> Result<AtomSite> {
        if !side.model_id.starts_with('#') {
            return Err(self.error(format!("expected a model id, found '{}'", side.model_id)));
        }
        let (number, chain) = side
            .residue
            .split_once('.')
            .ok_or_else(|| self.error(format!("malformed residue '{}'", side.residue)))?;
        let aa_number: u32 = number
            .parse()
            .map_err(|_| {
                self.error(format!("residue number '{}' is not a non-negative integer", number))
            })?;
        let prot_id = self
            .chain_map
            .group_of(chain)
            .ok_or_else(|| ContactError::UnknownChain {
                chain: chain.to_string(),
                file: self.file.to_path_buf(),
                line: self.line,
            })?;

        Ok(AtomSite {
            model_id: side.model_id.to_string(),
            prot_id: prot_id.to_string(),
            chain_id: chain.to_string(),
            aa_name: title_case(side.aa_name),
            aa_number,
            atom_id: side.atom_id.to_string(),
        })
    }

    fn finite(&self, token: &str, what: &str) -> Result<f64> {
        match token.parse::<f64>() {
            // -0.0 is stored as 0.0 so duplicates compare equal everywhere.
            Ok(v) if v.is_finite() => Ok(v + 0.0),
            _ => Err(self.error(format!("{} '{}' is not a finite number", what, token))),
        }
    }
}

fn parse_line(text: &str, layout: &ReportLayout, ctx: &LineContext<'_>) -> Result<ContactRecord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != layout.token_count() {
        return Err(ctx.error(format!(
            "expected {} columns, found {}",
            layout.token_count(),
            tokens.len()
        )));
    }
    let (a, b, overlap, distance) = layout.split(&tokens);
    let first = ctx.site(a)?;
    let second = ctx.site(b)?;
    let overlap = ctx.finite(overlap, "overlap")?;
    let distance = ctx.finite(distance, "distance")?;

    Ok(ContactRecord::new(first, second, overlap, distance))
}

/// Reads every contact of one report. The header is skipped and blank lines ignored.
pub fn read_report<R: BufRead>(
    reader: R,
    file: &Path,
    layout: &ReportLayout,
    chain_map: &ChainGroupMap,
) -> Result<Vec<ContactRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ContactError::io(file, e))?;
        if idx < HEADER_LINES || line.trim().is_empty() {
            continue;
        }
        let ctx = LineContext {
            file,
            line: idx + 1,
            chain_map,
        };
        records.push(parse_line(&line, layout, &ctx)?);
    }
    Ok(records)
}

// ============================================================================
// MULTI-FILE PARSING
// ============================================================================

/// Result of parsing the reports of one run.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<ContactRecord>,
    /// Reports that contributed at least one row.
    pub files_with_rows: Vec<PathBuf>,
    /// Reports that were missing or had no data rows.
    pub files_skipped: Vec<PathBuf>,
}

impl ParseOutcome {
    pub fn produced_rows(&self) -> bool {
        !self.files_with_rows.is_empty()
    }
}

/// Parses a set of reports. Missing and empty reports are skipped; any other
/// failure aborts.
pub fn parse_reports(
    paths: &[PathBuf],
    layout: &ReportLayout,
    chain_map: &ChainGroupMap,
) -> Result<ParseOutcome> {
    let mut outcome = ParseOutcome::default();

    for path in paths {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Report {} was not produced, skipping", path.display());
                outcome.files_skipped.push(path.clone());
                continue;
            }
            Err(e) => return Err(ContactError::io(path, e)),
        };

        let records = read_report(BufReader::new(file), path, layout, chain_map)?;
        if records.is_empty() {
            info!("Report {} has no contacts", path.display());
            outcome.files_skipped.push(path.clone());
            continue;
        }
        debug!("{}: {} contacts", path.display(), records.len());
        outcome.records.extend(records);
        outcome.files_with_rows.push(path.clone());
    }

    Ok(outcome)
}

/// All `*.over` reports in `dir`, sorted by name.
pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(format!("*.{}", crate::config::REPORT_EXTENSION));
    let pattern = pattern.to_string_lossy();
    let entries = glob(&pattern).map_err(|e| {
        ContactError::io(dir, io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => warn!("Cannot read {}: {}", e.path().display(), e.error()),
        }
    }
    paths.sort();
    Ok(paths)
}

// ============================================================================
// NEIGHBOR LISTING
// ============================================================================

/// Copy ids listed in the viewer's neighbor file, without the identity copy.
///
/// Returns `None` when the file was never written.
pub fn read_neighbors(path: &Path) -> Result<Option<Vec<String>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ContactError::io(path, e)),
    };

    let copy_prefix = "#2.";
    let mut ids: Vec<String> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| t.starts_with(copy_prefix) && *t != crate::config::PRIMARY_COPY)
        .filter(|t| t[copy_prefix.len()..].chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .collect();
    ids.sort_by_key(|id| id[copy_prefix.len()..].parse::<u32>().unwrap_or(u32::MAX));
    ids.dedup();
    Ok(Some(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Allowed overlap: -0.4\n\
        H-bond overlap reduction: 0\n\
        Ignore contacts between atoms separated by 4 bonds or less\n\
        Detect intra-residue contacts: False\n\
        Detect intra-molecule contacts: False\n\
        \n\
        2 contacts\n\
        atom1  atom2  overlap  distance\n";

    fn map() -> ChainGroupMap {
        ChainGroupMap::from_pairs([("A", "h1"), ("B", "h1"), ("C", "h2")])
    }

    fn plain() -> ReportLayout {
        ReportLayout::Plain {
            model_id: "#1".into(),
        }
    }

    fn read(body: &str, layout: &ReportLayout) -> Result<Vec<ContactRecord>> {
        let text = format!("{}{}", HEADER, body);
        read_report(Cursor::new(text), Path::new("h1.over"), layout, &map())
    }

    #[test]
    fn parses_plain_lines_into_canonical_records() {
        let rows = read(
            "GLU 200.C OE2 ARG 80.A NH1 0.123 2.845\nleu 12.B CD1 ILE 7.C CG2 -0.31 3.60\n",
            &plain(),
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].first.prot_id, "h1");
        assert_eq!(rows[0].first.aa_name, "Arg");
        assert_eq!(rows[0].first.aa_number, 80);
        assert_eq!(rows[0].second.chain_id, "C");
        assert_eq!(rows[0].first.model_id, "#1");
        assert_eq!(rows[1].first.aa_name, "Leu");
        assert!((rows[1].overlap + 0.31).abs() < 1e-12);
    }

    #[test]
    fn parses_symmetric_lines_with_model_tokens() {
        let rows = read(
            "#2.3 ARG 80.A NH1 #2.1 GLU 200.C OE2 0.10 2.9\n",
            &ReportLayout::Symmetric,
        )
        .unwrap();
        assert_eq!(rows[0].first.model_id, "#2.1");
        assert_eq!(rows[0].first.chain_id, "C");
        assert_eq!(rows[0].second.model_id, "#2.3");
    }

    #[test]
    fn header_only_report_has_no_rows() {
        assert!(read("", &plain()).unwrap().is_empty());
    }

    #[test]
    fn unmapped_chain_is_an_error() {
        let err = read("ARG 80.Z NH1 GLU 200.C OE2 0.1 2.9\n", &plain()).unwrap_err();
        match err {
            ContactError::UnknownChain { chain, line, .. } => {
                assert_eq!(chain, "Z");
                assert_eq!(line, 9);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn wrong_layout_is_reported_with_line_number() {
        let err = read("ARG 80.A NH1 GLU 200.C OE2 0.1 2.9\n", &ReportLayout::Symmetric).unwrap_err();
        assert!(matches!(err, ContactError::Parse { line: 9, .. }));
    }

    #[test]
    fn neighbor_listing_skips_identity_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neighbors.txt");
        assert_eq!(read_neighbors(&path).unwrap(), None);

        std::fs::write(
            &path,
            "model id #2.1 type AtomicStructure name copy1\n\
             model id #2.10 type AtomicStructure name copy10\n\
             model id #2.3 type AtomicStructure name copy3\n",
        )
        .unwrap();
        assert_eq!(
            read_neighbors(&path).unwrap(),
            Some(vec!["#2.3".to_string(), "#2.10".to_string()])
        );
    }

    #[test]
    fn rejects_negative_residue_numbers_and_nan() {
        assert!(read("ARG -3.A NH1 GLU 200.C OE2 0.1 2.9\n", &plain()).is_err());
        assert!(read("ARG 3.A NH1 GLU 200.C OE2 NaN 2.9\n", &plain()).is_err());
    }
}
