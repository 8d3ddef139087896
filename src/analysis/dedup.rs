use crate::core::record::ContactRecord;
use rusqlite::Connection;
use std::collections::HashSet;

/// Distinct rows of `contacts`.
pub const DISTINCT_VIEW: &str = "view_ND_1";
/// Distinct rows without symmetry mirrors.
pub const NON_REDUNDANT_VIEW: &str = "view_ND_2";

const CREATE_DISTINCT_VIEW: &str = "
CREATE VIEW view_ND_1 AS
SELECT DISTINCT
    modelId_1, protId_1, chainId_1, aaName_1, aaNumber_1, atomId_1,
    modelId_2, protId_2, chainId_2, aaName_2, aaNumber_2, atomId_2,
    overlap, distance
FROM contacts;
";

// A row is dropped when its atoms are listed in the larger identity order
// and a mirror row (sides swapped, model ids free) lists them in the smaller
// one. Which orientation survives depends only on the two atom identities.
const CREATE_NON_REDUNDANT_VIEW: &str = "
CREATE VIEW view_ND_2 AS
SELECT * FROM view_ND_1 AS a
WHERE (a.protId_1, a.chainId_1, a.aaNumber_1, a.atomId_1)
   <= (a.protId_2, a.chainId_2, a.aaNumber_2, a.atomId_2)
   OR NOT EXISTS (
       SELECT 1 FROM view_ND_1 AS b
       WHERE b.protId_1 = a.protId_2 AND b.chainId_1 = a.chainId_2
         AND b.aaNumber_1 = a.aaNumber_2 AND b.atomId_1 = a.atomId_2
         AND b.protId_2 = a.protId_1 AND b.chainId_2 = a.chainId_1
         AND b.aaNumber_2 = a.aaNumber_1 AND b.atomId_2 = a.atomId_1
   );
";

pub fn drop_views(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "DROP VIEW IF EXISTS view_ND_2;
         DROP VIEW IF EXISTS view_ND_1;",
    )
}

/// Defines both views on top of the `contacts` table.
pub fn create_views(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_DISTINCT_VIEW)?;
    conn.execute_batch(CREATE_NON_REDUNDANT_VIEW)
}

// ============================================================================
// IN-MEMORY EQUIVALENT
// ============================================================================

type Identity = (String, String, u32, String);

fn identities(r: &ContactRecord) -> (Identity, Identity) {
    let own = |s: &crate::core::record::AtomSite| {
        (s.prot_id.clone(), s.chain_id.clone(), s.aa_number, s.atom_id.clone())
    };
    (own(&r.first), own(&r.second))
}

/// Set-based version of the two views, sorted in canonical order.
pub fn dedup_records(records: &[ContactRecord]) -> Vec<ContactRecord> {
    // Stage 1: exact duplicates.
    let mut distinct = records.to_vec();
    distinct.sort_by(|a, b| {
        a.canonical_cmp(b)
            .then_with(|| a.first.aa_name.cmp(&b.first.aa_name))
            .then_with(|| a.second.aa_name.cmp(&b.second.aa_name))
    });
    distinct.dedup();

    // Stage 2: mirrors. Only rows listed in the larger orientation can go.
    let present: HashSet<(Identity, Identity)> = distinct.iter().map(identities).collect();

    distinct
        .iter()
        .filter(|r| {
            let (one, two) = identities(r);
            one <= two || !present.contains(&(two, one))
        })
        .cloned()
        .collect()
}
