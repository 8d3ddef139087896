// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod store;
pub mod symmetry;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::analysis::dedup::dedup_records;
pub use crate::analysis::network::InteractionNetwork;
pub use crate::analysis::report::{ChainPair, ChainUnit, ContactSpan, ResidueContact};
pub use crate::config::ContactsConfig;
pub use crate::core::chain_map::ChainGroupMap;
pub use crate::core::record::{AtomSite, ContactRecord};
pub use crate::error::ContactError;
pub use crate::io::parser::ReportLayout;
pub use crate::io::script::ContactScript;
pub use crate::io::{parser, writer};
pub use crate::store::ContactStore;
pub use crate::symmetry::{SymmetryGroup, SymmetryKind, SymmetrySettings};

use anyhow::Context;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

// ============================================================================
// RUN PREPARATION
// ============================================================================

/// Files written before the viewer is started.
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub script: PathBuf,
    pub group: Option<SymmetryGroup>,
    /// Operator table, when the group has one.
    pub operators: Option<PathBuf>,
    pub run_config: PathBuf,
}

/// Validates `config` and writes the viewer script into the output directory.
pub fn prepare_run(config: &ContactsConfig) -> anyhow::Result<PreparedRun> {
    let group = config.validate()?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Cannot create {}", config.output_dir.display()))?;

    // 1. Script
    let script_path = config.output_dir.join(config::SCRIPT_FILE);
    ContactScript::build(config, group.as_ref()).write(&script_path)?;
    info!("Wrote viewer script {}", script_path.display());

    // 2. Operator table
    let mut operators = None;
    if let Some(g) = &group {
        let [x, y, z] = config.symmetry_center;
        match symmetry::operators::for_group_about(g, &nalgebra::Vector3::new(x, y, z)) {
            Some(ops) => {
                let path = config.output_dir.join(config::OPERATORS_FILE);
                writer::write_operator_table(&path, g, &ops)?;
                info!("{}: {} operators written to {}", g, ops.len(), path.display());
                operators = Some(path);
            }
            None => info!("{}: copies are generated by the viewer", g),
        }
    }

    // 3. Parameters, so later stages can be rerun
    let run_config = config.output_dir.join(config::RUN_CONFIG_FILE);
    config.save(&run_config)?;

    Ok(PreparedRun {
        script: script_path,
        group,
        operators,
        run_config,
    })
}

// ============================================================================
// LOADING
// ============================================================================

/// How symmetry was taken into account when loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymmetryStatus {
    NotRequested,
    /// Copies in contact with the identity copy were found.
    Applied {
        group: SymmetryGroup,
        neighbors: Vec<String>,
    },
    /// No neighbor copy was listed, only contacts inside the identity copy are kept.
    FallbackAsymmetric { group: SymmetryGroup },
}

#[derive(Debug, Clone)]
pub struct LoadSummary {
    pub status: SymmetryStatus,
    pub raw_rows: usize,
    pub distinct_rows: usize,
    pub non_redundant_rows: usize,
    pub files_with_rows: Vec<PathBuf>,
    pub files_skipped: Vec<PathBuf>,
}

/// Reports expected for `config`, one per group label.
pub fn expected_reports(config: &ContactsConfig) -> Vec<PathBuf> {
    config
        .chain_map
        .labels()
        .into_iter()
        .map(|label| config.report_path(label))
        .collect()
}

fn symmetry_status(
    config: &ContactsConfig,
    group: Option<SymmetryGroup>,
) -> error::Result<SymmetryStatus> {
    let Some(group) = group else {
        return Ok(SymmetryStatus::NotRequested);
    };
    let listing = config.output_dir.join(config::NEIGHBORS_FILE);
    match parser::read_neighbors(&listing)? {
        Some(neighbors) if !neighbors.is_empty() => {
            info!("{}: {} neighbor copies", group, neighbors.len());
            Ok(SymmetryStatus::Applied { group, neighbors })
        }
        _ => {
            warn!(
                "{}: no copy lies within {} A of {}; the symmetry center ({}, {}, {}) may not \
                 match the coordinate origin. Contacts are computed without symmetry.",
                group,
                config.neighbor_distance,
                config::PRIMARY_COPY,
                config.symmetry_center[0],
                config.symmetry_center[1],
                config.symmetry_center[2]
            );
            Ok(SymmetryStatus::FallbackAsymmetric { group })
        }
    }
}

/// Parses the expected reports and loads them into a fresh store.
pub fn load_contacts(config: &ContactsConfig) -> error::Result<(ContactStore, LoadSummary)> {
    let reports = expected_reports(config);
    load_contacts_from(config, &reports)
}

/// Parses `reports` and loads them into a fresh store in the output directory.
///
/// The configuration is checked first; an invalid one leaves no store behind.
pub fn load_contacts_from(
    config: &ContactsConfig,
    reports: &[PathBuf],
) -> error::Result<(ContactStore, LoadSummary)> {
    let group = config.validate()?;
    let status = symmetry_status(config, group)?;

    // 1. Parsing
    let mut outcome = parser::parse_reports(reports, &config.layout(), &config.chain_map)?;
    if !outcome.produced_rows() {
        return Err(ContactError::NoResults);
    }
    if let SymmetryStatus::FallbackAsymmetric { .. } = status {
        let before = outcome.records.len();
        outcome.records.retain(|r| {
            r.first.model_id == config::PRIMARY_COPY && r.second.model_id == config::PRIMARY_COPY
        });
        info!("Dropped {} contacts with other copies", before - outcome.records.len());
        if outcome.records.is_empty() {
            return Err(ContactError::NoResults);
        }
    }

    // 2. Store
    let mut store = ContactStore::open(&config.database_path())?;
    store.reset()?;
    let raw_rows = store.insert(&outcome.records)?;

    // 3. Deduplication
    let summary = LoadSummary {
        status,
        raw_rows,
        distinct_rows: store.distinct_count()?,
        non_redundant_rows: store.non_redundant_count()?,
        files_with_rows: outcome.files_with_rows,
        files_skipped: outcome.files_skipped,
    };
    info!(
        "Loaded {} rows: {} distinct, {} non-redundant",
        summary.raw_rows, summary.distinct_rows, summary.non_redundant_rows
    );
    Ok((store, summary))
}

// ============================================================================
// REPORTS
// ============================================================================

/// Opens the store of a previous run without touching its rows.
pub fn open_results(config: &ContactsConfig) -> error::Result<ContactStore> {
    let path = config.database_path();
    if !path.is_file() {
        return Err(ContactError::io(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "no contact store, run `load` first"),
        ));
    }
    ContactStore::open(&path)
}

/// Writes the chain-pair summary and returns the pairs in file order.
pub fn write_pair_summary(
    config: &ContactsConfig,
    store: &ContactStore,
) -> error::Result<Vec<ChainPair>> {
    let pairs = analysis::report::chain_pairs(store.connection())?;
    let network = InteractionNetwork::from_pairs(&pairs);
    let clusters = network.clusters();
    let path = config.output_dir.join(config::CHAIN_PAIRS_FILE);
    writer::write_chain_pairs(&path, &pairs, &network)?;
    info!(
        "{} chain pairs in {} clusters written to {}",
        pairs.len(),
        clusters.len(),
        path.display()
    );
    Ok(pairs)
}

/// Groups the residue contacts of `pair` into spans and writes them next to the store.
pub fn write_pair_report(
    config: &ContactsConfig,
    store: &ContactStore,
    pair: &ChainPair,
) -> error::Result<(PathBuf, Vec<ContactSpan>)> {
    let contacts = analysis::report::residue_contacts(store.connection(), pair)?;
    let spans = analysis::report::group_spans(&contacts, config.span_threshold);
    let path = config.output_dir.join(writer::pair_report_name(pair));
    writer::write_spans(&path, pair, &spans, config.span_threshold)?;
    info!("{} <-> {}: {} spans", pair.first, pair.second, spans.len());
    Ok((path, spans))
}

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub load: LoadSummary,
    pub pairs: Vec<ChainPair>,
    pub chain_pairs_file: PathBuf,
}

/// The master pipeline: validate, parse, load, deduplicate, summarize.
///
/// Expects the viewer to have already written the reports of `config`.
pub fn run_contacts(config: &ContactsConfig) -> anyhow::Result<RunSummary> {
    let (store, load) = load_contacts(config).context("Loading contact reports failed")?;
    let pairs = write_pair_summary(config, &store).context("Writing chain-pair summary failed")?;

    Ok(RunSummary {
        load,
        pairs,
        chain_pairs_file: config.output_dir.join(config::CHAIN_PAIRS_FILE),
    })
}
