use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank all teams in a round, corrected for judge bias
    Rank {
        /// Round snapshot file (.yaml/.yml or .json)
        round_file: PathBuf,
    },
    /// Compute which teams advance to the next round
    Select {
        /// Round snapshot file (.yaml/.yml or .json)
        round_file: PathBuf,

        /// Target round id; with --json, emits promotion records for it
        #[arg(long)]
        to_round: Option<String>,
    },
    /// Show each judge's scoring center and spread per criterion
    Judges {
        /// Round snapshot file (.yaml/.yml or .json)
        round_file: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "fairrank")]
#[command(about = "Fair rankings for judged competitions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/fairrank/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Write the full derived result set as JSON to this file
    /// (atomic full replace, never a partial update)
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.clone().map(PathBuf::from);
    let config = match fairrank::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.effective_scoring();
    if let Err(errors) = fairrank::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!("Method: {:?}", scoring.method);
        if !scoring.judge_weights.is_empty() {
            eprintln!("Judge weights: {} configured", scoring.judge_weights.len());
        }
    }

    let round_file = match &cli.command {
        Commands::Rank { round_file }
        | Commands::Select { round_file, .. }
        | Commands::Judges { round_file } => round_file.clone(),
    };

    let snapshot = match fairrank::round::load_snapshot(&round_file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Round file error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded round '{}': {} criteria, {} judges, {} evaluations",
            snapshot.round_id,
            snapshot.criteria.len(),
            snapshot.judges.len(),
            snapshot.evaluations.len()
        );
    }

    let computation = match fairrank::scoring::compute_round(&snapshot, &scoring) {
        Ok(c) => c,
        Err(errors) => {
            eprintln!("Input validation errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(EXIT_VALIDATION);
        }
    };

    // Persist the full derived set if requested. Full replace: the file is
    // swapped atomically, never patched in place.
    if let Some(out_path) = &cli.out {
        let json = serde_json::to_vec_pretty(&computation).expect("serialize results");
        if let Err(e) = write_atomic(out_path, &json) {
            eprintln!("Failed to write {}: {}", out_path.display(), e);
            std::process::exit(EXIT_INPUT);
        }
        if cli.verbose {
            eprintln!("Wrote derived rows to {}", out_path.display());
        }
    }

    let use_colors = fairrank::output::should_use_colors();

    match &cli.command {
        Commands::Rank { .. } => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&computation).expect("serialize results")
                );
            } else if cli.verbose {
                for result in &computation.ranked {
                    println!(
                        "{}",
                        fairrank::output::format_ranked_detail(result, use_colors)
                    );
                    println!();
                }
            } else {
                println!(
                    "{}",
                    fairrank::output::format_ranked_table(&computation.ranked, use_colors)
                );
            }
        }
        Commands::Select { to_round, .. } => {
            let Some(selection_config) = &config.selection else {
                eprintln!("No selection configured in config file.");
                eprintln!("Add a selection section to ~/.config/fairrank/config.yaml:");
                eprintln!("  selection:");
                eprintln!("    mode: PER_JUDGE_TOP_N");
                eprintln!("    top_n: 5");
                std::process::exit(EXIT_CONFIG);
            };
            let selection = match fairrank::scoring::execute_selection(
                &snapshot,
                &computation.normalized,
                &computation.ranked,
                selection_config,
            ) {
                Ok(s) => s,
                Err(errors) => {
                    eprintln!("Selection config errors:");
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                    std::process::exit(EXIT_CONFIG);
                }
            };

            if cli.json {
                match to_round {
                    Some(to_round) if !selection.stop => {
                        let records = fairrank::scoring::promotion_records(
                            &selection,
                            &snapshot.round_id,
                            to_round,
                        );
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&records).expect("serialize results")
                        );
                    }
                    _ => println!(
                        "{}",
                        serde_json::to_string_pretty(&selection).expect("serialize results")
                    ),
                }
            } else {
                println!(
                    "{}",
                    fairrank::output::format_selection(&selection, use_colors)
                );
            }
        }
        Commands::Judges { .. } => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&computation.statistics)
                        .expect("serialize results")
                );
            } else {
                println!(
                    "{}",
                    fairrank::output::format_judge_table(&computation.statistics, use_colors)
                );
            }
        }
    }

    if cli.verbose {
        eprintln!();
        eprintln!(
            "Computed {} teams in {:?}",
            computation.ranked.len(),
            start_time.elapsed()
        );
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Write bytes to a temp file and rename over the target, so readers never
/// observe a half-written result set.
fn write_atomic(path: &PathBuf, bytes: &[u8]) -> anyhow::Result<()> {
    let mut file = atomic_write_file::AtomicWriteFile::open(path)?;
    file.write_all(bytes)?;
    file.commit()?;
    Ok(())
}
