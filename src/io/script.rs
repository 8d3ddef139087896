use crate::config::{ContactsConfig, NEIGHBORS_FILE, PRIMARY_COPY, PRIMARY_MODEL};
use crate::error::{ContactError, Result};
use crate::symmetry::{operators, Operator, SymmetryGroup};
use nalgebra::Vector3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Command script for the structure viewer.
///
/// Opens the structure, builds symmetry copies when requested, computes the
/// contacts of every group against the rest and saves one report per group.
#[derive(Debug, Clone, Default)]
pub struct ContactScript {
    lines: Vec<String>,
}

impl ContactScript {
    pub fn build(config: &ContactsConfig, group: Option<&SymmetryGroup>) -> Self {
        let mut script = Self::default();
        script.push(format!("open {}", config.structure.display()));

        match group {
            None => script.plain_contacts(config),
            Some(g) => {
                script.symmetry_copies(config, g);
                script.neighbor_listing(config);
                script.symmetric_contacts(config);
            }
        }

        script.push("exit".to_string());
        script
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn contacts_command(
        &mut self,
        config: &ContactsConfig,
        label: &str,
        atoms: &str,
        restrict: &str,
    ) {
        self.push(format!(
            "contacts {} restrict {} intraMol false overlapCutoff {} hbondAllowance {} \
             saveFile {} namingStyle simple reveal false log false",
            atoms,
            restrict,
            config.overlap_cutoff,
            config.allowance,
            config.report_path(label).display()
        ));
    }

    fn plain_contacts(&mut self, config: &ContactsConfig) {
        let map = &config.chain_map;
        for label in map.labels() {
            let own = chain_spec(PRIMARY_MODEL, &map.chains_of(label));
            let others = chain_spec(PRIMARY_MODEL, &map.chains_outside(label));
            self.contacts_command(config, label, &own, &others);
        }
    }

    fn symmetry_copies(&mut self, config: &ContactsConfig, group: &SymmetryGroup) {
        let [x, y, z] = config.symmetry_center;
        let center = Vector3::new(x, y, z);

        match operators::for_group_about(group, &center) {
            Some(ops) => {
                self.push(format!("# {} copies of {}", ops.len(), group));
                for (k, op) in ops.iter().enumerate() {
                    let id = format!("#2.{}", k + 1);
                    self.push(format!(
                        "combine {} modelId {} name copy{}",
                        PRIMARY_MODEL,
                        id,
                        k + 1
                    ));
                    if !op.is_identity() {
                        self.push(format!("view matrix models {},{}", id, matrix_args(op)));
                    }
                }
            }
            None => {
                self.push(format!(
                    "sym {} {} center {},{},{} copies true newModel true",
                    PRIMARY_MODEL, group, x, y, z
                ));
            }
        }
        self.push(format!("close {}", PRIMARY_MODEL));
    }

    fn neighbor_listing(&mut self, config: &ContactsConfig) {
        self.push(format!(
            "select ({} @<{}) & #2 & ~{}",
            PRIMARY_COPY, config.neighbor_distance, PRIMARY_COPY
        ));
        self.push(format!(
            "info models sel saveFile {}",
            config.output_dir.join(NEIGHBORS_FILE).display()
        ));
        self.push("select clear".to_string());
    }

    fn symmetric_contacts(&mut self, config: &ContactsConfig) {
        let map = &config.chain_map;
        for label in map.labels() {
            let own = chain_spec(PRIMARY_COPY, &map.chains_of(label));
            let outside = map.chains_outside(label);
            let restrict = if outside.is_empty() {
                format!("(#2 & ~{})", PRIMARY_COPY)
            } else {
                format!(
                    "(#2 & ~{}) | {}",
                    PRIMARY_COPY,
                    chain_spec(PRIMARY_COPY, &outside)
                )
            };
            self.contacts_command(config, label, &own, &restrict);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        let mut out = String::from("# contact computation script\n");
        for line in &self.lines {
            let _ = writeln!(out, "{}", line);
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|e| ContactError::io(path, e))
    }
}

/// `#1/A,B,C`
fn chain_spec(model: &str, chains: &[&str]) -> String {
    format!("{}/{}", model, chains.join(","))
}

fn matrix_args(op: &Operator) -> String {
    op.row_major_3x4()
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(",")
}
