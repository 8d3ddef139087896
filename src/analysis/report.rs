use crate::error::Result;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// CHAIN PAIRS
// ============================================================================

/// A chain of one model, addressed the way contacts are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainUnit {
    pub model_id: String,
    pub prot_id: String,
    pub chain_id: String,
}

impl fmt::Display for ChainUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.model_id, self.prot_id, self.chain_id)
    }
}

/// Two chains in contact and the number of non-redundant atom contacts between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPair {
    pub first: ChainUnit,
    pub second: ChainUnit,
    pub atoms: usize,
}

// A pair is dropped when its mirror (sides swapped, model ids free) has the
// same count and a smaller key. Mirrors with different counts are both listed.
const CHAIN_PAIRS_SQL: &str = "
WITH pairs AS (
    SELECT modelId_1, protId_1, chainId_1, modelId_2, protId_2, chainId_2,
           COUNT(*) AS atoms
    FROM view_ND_2
    GROUP BY modelId_1, protId_1, chainId_1, modelId_2, protId_2, chainId_2
)
SELECT * FROM pairs
EXCEPT
SELECT a.* FROM pairs AS a
JOIN pairs AS b
  ON  a.protId_1 = b.protId_2 AND a.chainId_1 = b.chainId_2
  AND a.protId_2 = b.protId_1 AND a.chainId_2 = b.chainId_1
  AND a.atoms = b.atoms
WHERE (b.modelId_1, b.modelId_2, b.protId_1, b.chainId_1, b.protId_2, b.chainId_2)
    < (a.modelId_1, a.modelId_2, a.protId_1, a.chainId_1, a.protId_2, a.chainId_2)
ORDER BY 7 DESC, 2, 1, 3, 5, 4, 6
";

/// Every unordered chain pair with at least one contact, most contacts first.
pub fn chain_pairs(conn: &Connection) -> Result<Vec<ChainPair>> {
    let mut stmt = conn.prepare(CHAIN_PAIRS_SQL)?;
    let rows = stmt.query_map([], |row| {
        let atoms: i64 = row.get(6)?;
        Ok(ChainPair {
            first: ChainUnit {
                model_id: row.get(0)?,
                prot_id: row.get(1)?,
                chain_id: row.get(2)?,
            },
            second: ChainUnit {
                model_id: row.get(3)?,
                prot_id: row.get(4)?,
                chain_id: row.get(5)?,
            },
            atoms: atoms as usize,
        })
    })?;
    let pairs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(pairs)
}

// ============================================================================
// RESIDUE CONTACTS
// ============================================================================

/// All atom contacts between one residue on each side of a chain pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueContact {
    pub aa_name_1: String,
    pub aa_number_1: u32,
    pub aa_name_2: String,
    pub aa_number_2: u32,
    pub atoms: usize,
    pub min_distance: f64,
    pub max_overlap: f64,
}

const RESIDUE_CONTACTS_SQL: &str = "
SELECT aaName_1, aaNumber_1, aaName_2, aaNumber_2,
       COUNT(*), MIN(distance), MAX(overlap)
FROM view_ND_2
WHERE modelId_1 = ?1 AND protId_1 = ?2 AND chainId_1 = ?3
  AND modelId_2 = ?4 AND protId_2 = ?5 AND chainId_2 = ?6
GROUP BY aaNumber_1, aaName_1, aaNumber_2, aaName_2
ORDER BY aaNumber_1, aaNumber_2
";

/// Residue-level contacts of `pair`, ordered by residue number on each side.
pub fn residue_contacts(conn: &Connection, pair: &ChainPair) -> Result<Vec<ResidueContact>> {
    let mut stmt = conn.prepare(RESIDUE_CONTACTS_SQL)?;
    let rows = stmt.query_map(
        params![
            pair.first.model_id,
            pair.first.prot_id,
            pair.first.chain_id,
            pair.second.model_id,
            pair.second.prot_id,
            pair.second.chain_id,
        ],
        |row| {
            let atoms: i64 = row.get(4)?;
            Ok(ResidueContact {
                aa_name_1: row.get(0)?,
                aa_number_1: row.get(1)?,
                aa_name_2: row.get(2)?,
                aa_number_2: row.get(3)?,
                atoms: atoms as usize,
                min_distance: row.get(5)?,
                max_overlap: row.get(6)?,
            })
        },
    )?;
    let contacts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(contacts)
}

// ============================================================================
// CONTACT SPANS
// ============================================================================

/// A run of nearby residues on one side facing a run of nearby residues on the other.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSpan {
    /// Residue number -> name, side 1.
    pub residues_1: BTreeMap<u32, String>,
    /// Residue number -> name, side 2.
    pub residues_2: BTreeMap<u32, String>,
    pub atoms: usize,
    pub min_distance: f64,
    pub max_overlap: f64,
}

impl ContactSpan {
    fn open(c: &ResidueContact) -> Self {
        Self {
            residues_1: BTreeMap::from([(c.aa_number_1, c.aa_name_1.clone())]),
            residues_2: BTreeMap::from([(c.aa_number_2, c.aa_name_2.clone())]),
            atoms: c.atoms,
            min_distance: c.min_distance,
            max_overlap: c.max_overlap,
        }
    }

    fn absorb(&mut self, c: &ResidueContact) {
        self.residues_1.insert(c.aa_number_1, c.aa_name_1.clone());
        self.residues_2.insert(c.aa_number_2, c.aa_name_2.clone());
        self.atoms += c.atoms;
        self.min_distance = self.min_distance.min(c.min_distance);
        self.max_overlap = self.max_overlap.max(c.max_overlap);
    }

    fn accepts(&self, c: &ResidueContact, threshold: u32) -> bool {
        let (_, end_1) = self.range_1();
        let (start_2, end_2) = self.range_2();
        c.aa_number_1.saturating_sub(end_1) <= threshold
            && c.aa_number_2.saturating_add(threshold) >= start_2
            && c.aa_number_2 <= end_2.saturating_add(threshold)
    }

    pub fn range_1(&self) -> (u32, u32) {
        bounds(&self.residues_1)
    }

    pub fn range_2(&self) -> (u32, u32) {
        bounds(&self.residues_2)
    }

    /// `Arg80-Lys85`, or `Arg80` for a single residue.
    pub fn label_1(&self) -> String {
        label(&self.residues_1)
    }

    pub fn label_2(&self) -> String {
        label(&self.residues_2)
    }
}

fn bounds(residues: &BTreeMap<u32, String>) -> (u32, u32) {
    let first = residues.keys().next().copied().unwrap_or(0);
    let last = residues.keys().next_back().copied().unwrap_or(first);
    (first, last)
}

fn label(residues: &BTreeMap<u32, String>) -> String {
    match (residues.iter().next(), residues.iter().next_back()) {
        (Some((a, an)), Some((b, bn))) if a != b => format!("{}{}-{}{}", an, a, bn, b),
        (Some((a, an)), _) => format!("{}{}", an, a),
        _ => String::new(),
    }
}

/// Merges residue contacts into spans.
///
/// `contacts` must be sorted by side-1 residue number. A contact joins an open
/// span when its side-1 residue is at most `threshold` past the span's end and
/// its side-2 residue lies within `threshold` of the span's side-2 range.
pub fn group_spans(contacts: &[ResidueContact], threshold: u32) -> Vec<ContactSpan> {
    let mut open: Vec<ContactSpan> = Vec::new();
    let mut closed: Vec<ContactSpan> = Vec::new();

    for c in contacts {
        // Spans left too far behind can no longer grow.
        let (stale, live): (Vec<_>, Vec<_>) = open
            .into_iter()
            .partition(|s| c.aa_number_1.saturating_sub(s.range_1().1) > threshold);
        closed.extend(stale);
        open = live;

        match open.iter_mut().find(|s| s.accepts(c, threshold)) {
            Some(span) => span.absorb(c),
            None => open.push(ContactSpan::open(c)),
        }
    }
    closed.extend(open);
    closed.sort_by_key(|s| (s.range_1(), s.range_2()));
    closed
}
