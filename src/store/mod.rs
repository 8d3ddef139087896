use crate::analysis::dedup::{self, DISTINCT_VIEW, NON_REDUNDANT_VIEW};
use crate::core::record::{AtomSite, ContactRecord};
use crate::error::Result;
use log::debug;
use rusqlite::{params, Connection, Row};
use std::path::Path;

const CREATE_CONTACTS: &str = "
CREATE TABLE contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    modelId_1  TEXT    NOT NULL,
    protId_1   TEXT    NOT NULL,
    chainId_1  TEXT    NOT NULL,
    aaName_1   TEXT    NOT NULL,
    aaNumber_1 INTEGER NOT NULL,
    atomId_1   TEXT    NOT NULL,
    modelId_2  TEXT    NOT NULL,
    protId_2   TEXT    NOT NULL,
    chainId_2  TEXT    NOT NULL,
    aaName_2   TEXT    NOT NULL,
    aaNumber_2 INTEGER NOT NULL,
    atomId_2   TEXT    NOT NULL,
    overlap    REAL    NOT NULL,
    distance   REAL    NOT NULL
);
";

const INSERT_CONTACT: &str = "
INSERT INTO contacts (
    modelId_1, protId_1, chainId_1, aaName_1, aaNumber_1, atomId_1,
    modelId_2, protId_2, chainId_2, aaName_2, aaNumber_2, atomId_2,
    overlap, distance
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
";

/// Column list shared by every query that rebuilds a [`ContactRecord`].
pub const RECORD_COLUMNS: &str = "modelId_1, protId_1, chainId_1, aaName_1, aaNumber_1, atomId_1, \
     modelId_2, protId_2, chainId_2, aaName_2, aaNumber_2, atomId_2, overlap, distance";

/// Canonical row order; matches [`ContactRecord::canonical_cmp`].
pub const CANONICAL_ORDER: &str = "modelId_1, modelId_2, protId_1, chainId_1, aaNumber_1, atomId_1, \
     protId_2, chainId_2, aaNumber_2, atomId_2, overlap, distance";

/// SQLite file holding the `contacts` table of one run and its two views.
pub struct ContactStore {
    conn: Connection,
}

impl ContactStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Drops and recreates the table and views. Previous rows are discarded.
    pub fn reset(&self) -> Result<()> {
        dedup::drop_views(&self.conn)?;
        self.conn.execute_batch("DROP TABLE IF EXISTS contacts;")?;
        self.conn.execute_batch(CREATE_CONTACTS)?;
        dedup::create_views(&self.conn)?;
        Ok(())
    }

    /// Bulk insert in a single transaction.
    pub fn insert(&mut self, records: &[ContactRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_CONTACT)?;
            for r in records {
                stmt.execute(params![
                    r.first.model_id,
                    r.first.prot_id,
                    r.first.chain_id,
                    r.first.aa_name,
                    r.first.aa_number,
                    r.first.atom_id,
                    r.second.model_id,
                    r.second.prot_id,
                    r.second.chain_id,
                    r.second.aa_name,
                    r.second.aa_number,
                    r.second.atom_id,
                    r.overlap,
                    r.distance,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} contact rows", records.len());
        Ok(records.len())
    }

    fn count(&self, relation: &str) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", relation), [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn raw_count(&self) -> Result<usize> {
        self.count("contacts")
    }

    pub fn distinct_count(&self) -> Result<usize> {
        self.count(DISTINCT_VIEW)
    }

    pub fn non_redundant_count(&self) -> Result<usize> {
        self.count(NON_REDUNDANT_VIEW)
    }

    /// Rows of `view_ND_2` in canonical order.
    pub fn non_redundant_rows(&self) -> Result<Vec<ContactRecord>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            RECORD_COLUMNS, NON_REDUNDANT_VIEW, CANONICAL_ORDER
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], record_from_row)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Reads the fourteen [`RECORD_COLUMNS`] starting at column 0.
pub fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ContactRecord> {
    Ok(ContactRecord {
        first: AtomSite {
            model_id: row.get(0)?,
            prot_id: row.get(1)?,
            chain_id: row.get(2)?,
            aa_name: row.get(3)?,
            aa_number: row.get(4)?,
            atom_id: row.get(5)?,
        },
        second: AtomSite {
            model_id: row.get(6)?,
            prot_id: row.get(7)?,
            chain_id: row.get(8)?,
            aa_name: row.get(9)?,
            aa_number: row.get(10)?,
            atom_id: row.get(11)?,
        },
        overlap: row.get(12)?,
        distance: row.get(13)?,
    })
}
