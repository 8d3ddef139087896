use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

use symcontacts::{
    load_contacts, load_contacts_from, open_results, parser, prepare_run, run_contacts,
    write_pair_report, write_pair_summary, ChainGroupMap, ContactsConfig, SymmetryKind,
    SymmetrySettings, SymmetryStatus,
};

#[derive(Parser)]
#[command(author, version, about = "Inter-chain contact reports for symmetric assemblies")]
struct Cli {
    /// Print debug messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Writes the viewer script that computes the contact reports.
    Script {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Parses the reports of a run into the contact store.
    Load {
        #[command(flatten)]
        run: RunArgs,

        /// Load every *.over file in the output directory, not only one per group.
        #[arg(long)]
        all_reports: bool,
    },
    /// Writes the residue spans of one chain pair of a loaded run.
    Report {
        #[command(flatten)]
        run: RunArgs,

        /// 1-based index of the pair in chain_pairs.txt. All pairs when omitted.
        #[arg(long)]
        pair: Option<usize>,
    },
    /// Loads the reports and writes the chain-pair summary.
    Run {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON file with saved run parameters. Flags given here override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Atomic structure to open in the viewer.
    #[arg(short, long)]
    structure: Option<PathBuf>,

    /// Directory holding the script, reports and store of the run.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Chain to group mapping: a JSON file or inline JSON such as '{"A":"h1","B":"h2"}'.
    #[arg(short, long)]
    chain_map: Option<String>,

    /// Symmetry family: c, d, dy, t, o or i.
    #[arg(long)]
    symmetry: Option<SymmetryKind>,

    /// Order of a cyclic or dihedral group.
    #[arg(long, allow_hyphen_values = true)]
    sym_order: Option<i64>,

    /// Orientation of T (222, z3) or I (222, 222r, n25, ...).
    #[arg(long)]
    orientation: Option<String>,

    /// Symmetry center as x,y,z.
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
    center: Option<Vec<f64>>,

    #[arg(long, allow_hyphen_values = true)]
    overlap_cutoff: Option<f64>,

    #[arg(long)]
    allowance: Option<f64>,

    #[arg(long)]
    neighbor_distance: Option<f64>,

    /// Largest residue-number gap merged into one span.
    #[arg(long)]
    span_threshold: Option<u32>,
}

impl RunArgs {
    fn into_config(self) -> Result<ContactsConfig> {
        let mut config = match &self.config {
            Some(path) => ContactsConfig::load(path)?,
            None => ContactsConfig::default(),
        };

        if let Some(s) = self.structure {
            config.structure = s;
        }
        if let Some(d) = self.output_dir {
            config.output_dir = d;
        }
        if let Some(m) = &self.chain_map {
            config.chain_map = read_chain_map(m)?;
        }
        if let Some(kind) = self.symmetry {
            config.symmetry = Some(SymmetrySettings {
                kind,
                order: self.sym_order,
                orientation: self.orientation,
            });
        } else if self.sym_order.is_some() {
            anyhow::bail!("--sym-order requires --symmetry");
        }
        if let Some(c) = self.center {
            config.symmetry_center = [c[0], c[1], c[2]];
        }
        if let Some(v) = self.overlap_cutoff {
            config.overlap_cutoff = v;
        }
        if let Some(v) = self.allowance {
            config.allowance = v;
        }
        if let Some(v) = self.neighbor_distance {
            config.neighbor_distance = v;
        }
        if let Some(v) = self.span_threshold {
            config.span_threshold = v;
        }
        Ok(config)
    }
}

fn read_chain_map(arg: &str) -> Result<ChainGroupMap> {
    let path = Path::new(arg);
    let map = if path.is_file() {
        ChainGroupMap::from_file(path)?
    } else {
        ChainGroupMap::parse(arg).context("--chain-map is neither a file nor inline JSON")?
    };
    Ok(map)
}

fn describe(status: &SymmetryStatus) -> String {
    match status {
        SymmetryStatus::NotRequested => "none".to_string(),
        SymmetryStatus::Applied { group, neighbors } => {
            format!("{} ({} neighbor copies: {})", group, neighbors.len(), neighbors.join(" "))
        }
        SymmetryStatus::FallbackAsymmetric { group } => {
            format!("{} requested, no neighbor copies, computed without symmetry", group)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    let start_time = Instant::now();

    match cli.command {
        Commands::Script { run } => {
            let config = run.into_config()?;
            let prepared = prepare_run(&config)?;
            println!("Script:     {}", prepared.script.display());
            if let Some(ops) = &prepared.operators {
                println!("Operators:  {}", ops.display());
            }
            println!("Parameters: {}", prepared.run_config.display());
        }

        Commands::Load { run, all_reports } => {
            let config = run.into_config()?;
            let (_, summary) = if all_reports {
                let reports = parser::discover_reports(&config.output_dir)?;
                info!("Found {} report files", reports.len());
                load_contacts_from(&config, &reports)?
            } else {
                load_contacts(&config)?
            };
            println!("Symmetry:       {}", describe(&summary.status));
            println!("Rows:           {}", summary.raw_rows);
            println!("Distinct:       {}", summary.distinct_rows);
            println!("Non-redundant:  {}", summary.non_redundant_rows);
            println!("Store:          {}", config.database_path().display());
        }

        Commands::Report { run, pair } => {
            let config = run.into_config()?;
            let store = open_results(&config)?;
            let pairs = write_pair_summary(&config, &store)?;

            let selected = match pair {
                Some(i) => {
                    let p = i
                        .checked_sub(1)
                        .and_then(|idx| pairs.get(idx))
                        .with_context(|| {
                            format!("Pair {} does not exist ({} pairs)", i, pairs.len())
                        })?;
                    vec![p.clone()]
                }
                None => pairs,
            };
            for p in &selected {
                let (path, spans) = write_pair_report(&config, &store, p)?;
                let name = format!("{} <-> {}", p.first, p.second);
                println!("{:<40} {:>4} spans  {}", name, spans.len(), path.display());
            }
        }

        Commands::Run { run } => {
            let config = run.into_config()?;
            let summary = run_contacts(&config)?;
            println!("Symmetry:       {}", describe(&summary.load.status));
            println!("Non-redundant:  {}", summary.load.non_redundant_rows);
            println!("Chain pairs:    {}", summary.pairs.len());
            for p in summary.pairs.iter().take(10) {
                println!("  {} <-> {}  {}", p.first, p.second, p.atoms);
            }
            println!("Summary:        {}", summary.chain_pairs_file.display());
        }
    }

    info!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}
