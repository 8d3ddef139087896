use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use symcontacts::{
    dedup_records, load_contacts, parser, prepare_run, run_contacts, write_pair_report,
    ChainGroupMap, ContactError, ContactStore, ContactsConfig, SymmetryGroup, SymmetryKind,
    SymmetrySettings, SymmetryStatus,
};
use tempfile::TempDir;

const HEADER: &str = "\
Allowed overlap: -0.4
H-bond overlap reduction: 0
Ignore contacts between atoms separated by 4 bonds or less
Detect intra-residue contacts: False
Detect intra-molecule contacts: False

N contacts
atom1  atom2  overlap  distance
";

fn write_report(dir: &Path, label: &str, body: &str) {
    fs::write(dir.join(format!("{}.over", label)), format!("{}{}", HEADER, body)).unwrap();
}

fn plain_config(dir: &TempDir) -> ContactsConfig {
    ContactsConfig {
        structure: dir.path().join("model.cif"),
        output_dir: dir.path().to_path_buf(),
        chain_map: ChainGroupMap::from_pairs([("A", "h1"), ("B", "h1"), ("C", "h2")]),
        ..Default::default()
    }
}

fn cyclic_config(dir: &TempDir, order: i64) -> ContactsConfig {
    ContactsConfig {
        structure: dir.path().join("cell.cif"),
        output_dir: dir.path().to_path_buf(),
        chain_map: ChainGroupMap::from_pairs([("A", "h1"), ("C", "h2")]),
        symmetry: Some(SymmetrySettings {
            kind: SymmetryKind::Cyclic,
            order: Some(order),
            orientation: None,
        }),
        ..Default::default()
    }
}

// Both reports of a plain run: every contact is seen once from each side.
fn write_plain_reports(dir: &Path) {
    write_report(
        dir,
        "h1",
        "ARG 80.A NH1 GLU 200.C OE2 0.123 2.845\n\
         ARG 81.A NE GLU 201.C OE1 -0.2 3.1\n\
         LYS 82.B NZ ASP 203.C OD1 -0.1 3.0\n",
    );
    write_report(
        dir,
        "h2",
        "GLU 200.C OE2 ARG 80.A NH1 0.123 2.845\n\
         GLU 201.C OE1 ARG 81.A NE -0.2 3.1\n\
         ASP 203.C OD1 LYS 82.B NZ -0.1 3.0\n",
    );
}

#[test]
fn plain_run_collapses_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    let config = plain_config(&dir);
    write_plain_reports(dir.path());

    let summary = run_contacts(&config).expect("run failed");

    assert_eq!(summary.load.status, SymmetryStatus::NotRequested);
    assert_eq!(summary.load.raw_rows, 6);
    assert_eq!(summary.load.distinct_rows, 3);
    assert_eq!(summary.load.non_redundant_rows, 3);

    let pairs: Vec<(String, String, usize)> = summary
        .pairs
        .iter()
        .map(|p| (p.first.to_string(), p.second.to_string(), p.atoms))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("#1 h1/A".to_string(), "#1 h2/C".to_string(), 2),
            ("#1 h1/B".to_string(), "#1 h2/C".to_string(), 1),
        ]
    );

    let text = fs::read_to_string(&summary.chain_pairs_file).unwrap();
    assert!(text.contains("#1 h1/A (2), #1 h1/B (1), #1 h2/C (3)"));
    assert!(config.database_path().is_file());
}

#[test]
fn pair_report_merges_neighboring_residues() {
    let dir = tempfile::tempdir().unwrap();
    let config = plain_config(&dir);
    write_plain_reports(dir.path());
    let summary = run_contacts(&config).unwrap();

    let store = ContactStore::open(&config.database_path()).unwrap();
    let (path, spans) = write_pair_report(&config, &store, &summary.pairs[0]).unwrap();

    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].label_1(), "Arg80-Arg81");
    assert_eq!(spans[0].label_2(), "Glu200-Glu201");
    assert_eq!(spans[0].atoms, 2);
    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("Arg80-Arg81"));
}

#[test]
fn zero_order_is_rejected_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let config = cyclic_config(&dir, 0);
    write_report(dir.path(), "h1", "#2.1 ARG 80.A NH1 #2.2 GLU 200.C OE2 0.1 2.9\n");

    match load_contacts(&config) {
        Err(ContactError::Config(violations)) => {
            assert!(violations.iter().any(|v| v.contains("symmetry order")));
        }
        Err(other) => panic!("expected configuration error, got {}", other),
        Ok(_) => panic!("expected configuration error"),
    }
    assert!(prepare_run(&config).is_err());
    assert!(!config.database_path().exists());
}

#[test]
fn header_only_and_missing_reports_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = plain_config(&dir);
    config.chain_map = ChainGroupMap::from_pairs([("A", "h1"), ("B", "h2"), ("C", "h3")]);
    write_report(dir.path(), "h1", "ARG 80.A NH1 GLU 200.C OE2 0.1 2.9\n");
    write_report(dir.path(), "h2", "");

    let (_, summary) = load_contacts(&config).unwrap();

    assert_eq!(summary.raw_rows, 1);
    assert_eq!(summary.files_with_rows, vec![config.report_path("h1")]);
    assert_eq!(
        summary.files_skipped,
        vec![config.report_path("h2"), config.report_path("h3")]
    );
}

#[test]
fn no_rows_anywhere_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = plain_config(&dir);
    write_report(dir.path(), "h1", "");

    let err = load_contacts(&config).err().expect("expected an error");
    assert!(matches!(err, ContactError::NoResults));
}

#[test]
fn unknown_chain_aborts_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = plain_config(&dir);
    write_report(dir.path(), "h1", "ARG 80.A NH1 GLU 200.Q OE2 0.1 2.9\n");

    let err = load_contacts(&config).err().expect("expected an error");
    assert!(matches!(err, ContactError::UnknownChain { ref chain, .. } if chain == "Q"));
}

#[test]
fn symmetric_run_removes_mirror_contacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = cyclic_config(&dir, 4);
    fs::write(
        dir.path().join("neighbors.txt"),
        "model id #2.2 type AtomicStructure name copy2\n\
         model id #2.4 type AtomicStructure name copy4\n",
    )
    .unwrap();
    write_report(
        dir.path(),
        "h1",
        "#2.1 THR 5.A OG1 #2.2 SER 40.A OG -0.1 3.0\n\
         #2.4 THR 5.A OG1 #2.1 SER 40.A OG -0.1 3.0\n\
         #2.1 THR 5.A OG1 #2.2 SER 40.A OG -0.1 3.0\n",
    );

    let summary = run_contacts(&config).unwrap();

    assert_eq!(
        summary.load.status,
        SymmetryStatus::Applied {
            group: SymmetryGroup::Cyclic(4),
            neighbors: vec!["#2.2".to_string(), "#2.4".to_string()],
        }
    );
    assert_eq!(summary.load.raw_rows, 3);
    assert_eq!(summary.load.distinct_rows, 2);
    assert_eq!(summary.load.non_redundant_rows, 1);
    assert_eq!(summary.pairs.len(), 1);
    assert_eq!(summary.pairs[0].second.model_id, "#2.2");
}

#[test]
fn missing_neighbor_listing_falls_back_to_asymmetric() {
    let dir = tempfile::tempdir().unwrap();
    let config = cyclic_config(&dir, 3);
    write_report(
        dir.path(),
        "h1",
        "#2.1 ARG 80.A NH1 #2.1 GLU 200.C OE2 0.1 2.9\n\
         #2.1 ARG 81.A NE #2.3 GLU 200.C OE2 -0.2 3.2\n",
    );

    let (_, summary) = load_contacts(&config).unwrap();

    assert_eq!(
        summary.status,
        SymmetryStatus::FallbackAsymmetric {
            group: SymmetryGroup::Cyclic(3)
        }
    );
    assert_eq!(summary.non_redundant_rows, 1);
}

#[test]
fn fallback_without_contacts_inside_the_identity_copy_has_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = cyclic_config(&dir, 4);
    config.chain_map = ChainGroupMap::from_pairs([("A", "h1")]);
    write_report(dir.path(), "h1", "#2.1 ARG 80.A NH1 #2.2 GLU 12.A OE2 0.1 2.9\n");

    let err = load_contacts(&config).err().expect("expected an error");
    assert!(matches!(err, ContactError::NoResults));
    assert!(!config.database_path().exists());
}

#[test]
fn store_dedup_matches_in_memory_dedup_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = cyclic_config(&dir, 2);
    fs::write(dir.path().join("neighbors.txt"), "#2.2\n").unwrap();
    write_report(
        dir.path(),
        "h1",
        "#2.1 THR 5.A OG1 #2.2 SER 40.A OG -0.1 3.0\n\
         #2.2 THR 5.A OG1 #2.1 SER 40.A OG -0.1 3.0\n\
         #2.1 ALA 7.A CB #2.2 ALA 7.A CB 0.2 3.4\n\
         #2.1 ARG 80.A NH1 #2.1 GLU 200.C OE2 0.1 2.9\n",
    );
    write_report(dir.path(), "h2", "#2.1 GLU 200.C OE2 #2.1 ARG 80.A NH1 0.1 2.9\n");

    let (store, summary) = load_contacts(&config).unwrap();
    let kept = store.non_redundant_rows().unwrap();
    assert_eq!(kept.len(), summary.non_redundant_rows);
    assert_eq!(kept.len(), 3);

    let parsed = parser::parse_reports(
        &[config.report_path("h1"), config.report_path("h2")],
        &config.layout(),
        &config.chain_map,
    )
    .unwrap();
    assert_eq!(kept, dedup_records(&parsed.records));

    let mut again = ContactStore::in_memory().unwrap();
    again.reset().unwrap();
    again.insert(&kept).unwrap();
    assert_eq!(again.non_redundant_rows().unwrap(), kept);
}

#[test]
fn prepare_run_writes_script_operators_and_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let config = cyclic_config(&dir, 3);

    let prepared = prepare_run(&config).unwrap();

    let script = fs::read_to_string(&prepared.script).unwrap();
    assert!(script.contains("open "));
    assert!(script.contains("combine #1 modelId #2.3 name copy3"));
    assert!(script.trim_end().ends_with("exit"));
    assert!(prepared.operators.as_ref().map_or(false, |p| p.is_file()));

    let reloaded = ContactsConfig::load(&prepared.run_config).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn plain_script_has_no_operator_table() {
    let dir = tempfile::tempdir().unwrap();
    let prepared = prepare_run(&plain_config(&dir)).unwrap();
    assert_eq!(prepared.group, None);
    assert!(prepared.operators.is_none());
}
