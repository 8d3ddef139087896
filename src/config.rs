use crate::core::chain_map::ChainGroupMap;
use crate::error::{ContactError, Result};
use crate::io::parser::ReportLayout;
use crate::symmetry::{SymmetryGroup, SymmetrySettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// FILE NAMES INSIDE A RUN DIRECTORY
// ============================================================================

pub const SCRIPT_FILE: &str = "contacts.cxc";
pub const DATABASE_FILE: &str = "overlaps.sqlite";
pub const NEIGHBORS_FILE: &str = "neighbors.txt";
pub const OPERATORS_FILE: &str = "symmetry_operators.txt";
pub const CHAIN_PAIRS_FILE: &str = "chain_pairs.txt";
pub const RUN_CONFIG_FILE: &str = "run_config.json";
pub const REPORT_EXTENSION: &str = "over";

/// Model id of the structure in runs without symmetry.
pub const PRIMARY_MODEL: &str = "#1";
/// Model id of the identity copy in symmetric runs.
pub const PRIMARY_COPY: &str = "#2.1";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Parameters of one contact computation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Atomic structure handed to the viewer.
    pub structure: PathBuf,
    /// Directory owning every file of the run (script, reports, store, summaries).
    pub output_dir: PathBuf,
    pub chain_map: ChainGroupMap,
    pub symmetry: Option<SymmetrySettings>,
    /// Point the symmetry operators rotate about.
    pub symmetry_center: [f64; 3],
    /// Van der Waals overlap at or above which a pair is reported (Å).
    pub overlap_cutoff: f64,
    /// Overlap reduction for hydrogen-bonded pairs (Å).
    pub allowance: f64,
    /// Copies with any atom this close to the identity copy are neighbors (Å).
    pub neighbor_distance: f64,
    /// Largest residue-number gap merged into one contact span.
    pub span_threshold: u32,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            structure: PathBuf::new(),
            output_dir: PathBuf::from("."),
            chain_map: ChainGroupMap::default(),
            symmetry: None,
            symmetry_center: [0.0; 3],
            overlap_cutoff: -0.4,
            allowance: 0.0,
            neighbor_distance: 4.0,
            span_threshold: 4,
        }
    }
}

impl ContactsConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ContactError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| ContactError::Config(vec![format!("{}: {}", path.display(), e)]))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| ContactError::Config(vec![e.to_string()]))?;
        fs::write(path, text).map_err(|e| ContactError::io(path, e))
    }

    /// Checks every constraint and returns the resolved symmetry group.
    ///
    /// All violations are collected into one [`ContactError::Config`].
    pub fn validate(&self) -> Result<Option<SymmetryGroup>> {
        let mut violations = Vec::new();

        let group = match &self.symmetry {
            Some(settings) => match SymmetryGroup::resolve(settings) {
                Ok(g) => Some(g),
                Err(mut errs) => {
                    violations.append(&mut errs);
                    None
                }
            },
            None => None,
        };

        if self.chain_map.is_empty() {
            violations.push("chain map must assign at least one chain to a group".to_string());
        } else if self.symmetry.is_none() && self.chain_map.labels().len() < 2 {
            violations.push(
                "without symmetry the chain map needs at least two groups to compare".to_string(),
            );
        }
        if !self.overlap_cutoff.is_finite() {
            violations.push(format!("overlap cutoff must be finite (got {})", self.overlap_cutoff));
        }
        if !self.allowance.is_finite() || self.allowance < 0.0 {
            violations.push(format!(
                "allowance must be a non-negative number (got {})",
                self.allowance
            ));
        }
        if !self.neighbor_distance.is_finite() || self.neighbor_distance <= 0.0 {
            violations.push(format!(
                "neighbor distance must be positive (got {})",
                self.neighbor_distance
            ));
        }
        if self.symmetry_center.iter().any(|c| !c.is_finite()) {
            violations.push("symmetry center must have finite coordinates".to_string());
        }

        if violations.is_empty() {
            Ok(group)
        } else {
            Err(ContactError::Config(violations))
        }
    }

    /// Report layout implied by the symmetry settings.
    pub fn layout(&self) -> ReportLayout {
        if self.symmetry.is_some() {
            ReportLayout::Symmetric
        } else {
            ReportLayout::Plain {
                model_id: PRIMARY_MODEL.to_string(),
            }
        }
    }

    pub fn report_path(&self, label: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", label, REPORT_EXTENSION))
    }

    pub fn database_path(&self) -> PathBuf {
        self.output_dir.join(DATABASE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::SymmetryKind;

    fn two_groups() -> ChainGroupMap {
        ChainGroupMap::from_pairs([("A", "h1"), ("B", "h2")])
    }

    #[test]
    fn defaults_match_viewer_defaults() {
        let c = ContactsConfig::default();
        assert_eq!(c.overlap_cutoff, -0.4);
        assert_eq!(c.allowance, 0.0);
    }

    #[test]
    fn cyclic_order_zero_is_a_configuration_error() {
        let c = ContactsConfig {
            chain_map: two_groups(),
            symmetry: Some(SymmetrySettings {
                kind: SymmetryKind::Cyclic,
                order: Some(0),
                orientation: None,
            }),
            ..Default::default()
        };
        match c.validate() {
            Err(ContactError::Config(v)) => assert!(v[0].contains("symmetry order")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn cyclic_without_order_is_a_configuration_error() {
        let c = ContactsConfig {
            chain_map: two_groups(),
            symmetry: Some(SymmetrySettings {
                kind: SymmetryKind::Cyclic,
                order: None,
                orientation: None,
            }),
            ..Default::default()
        };
        match c.validate() {
            Err(ContactError::Config(v)) => assert!(v[0].contains("symmetry order is required")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn every_violation_is_listed() {
        let c = ContactsConfig {
            allowance: -1.0,
            neighbor_distance: 0.0,
            ..Default::default()
        };
        match c.validate() {
            Err(ContactError::Config(v)) => assert_eq!(v.len(), 3),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn single_group_needs_symmetry() {
        let single = ChainGroupMap::from_pairs([("A", "h1"), ("B", "h1")]);
        let plain = ContactsConfig {
            chain_map: single.clone(),
            ..Default::default()
        };
        assert!(plain.validate().is_err());

        let symmetric = ContactsConfig {
            chain_map: single,
            symmetry: Some(SymmetrySettings {
                kind: SymmetryKind::Cyclic,
                order: Some(4),
                orientation: None,
            }),
            ..Default::default()
        };
        assert_eq!(symmetric.validate().unwrap(), Some(SymmetryGroup::Cyclic(4)));
        assert_eq!(symmetric.layout(), ReportLayout::Symmetric);
    }
}
