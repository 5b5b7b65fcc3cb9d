use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use crossfill::{
    find_fill_with_config, render_grid, ArcConsistencyMode, Error, FillFailure, GridConfig,
    GridStructure, SolverConfig, ValueOrdering, WordList,
};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// crossfill: fill a crossword grid from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the structure file, with _ (or .) for open cells and anything else for blocks
    structure: PathBuf,

    /// Path to the word list, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// TOML file with solver options; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to order candidate words
    #[arg(long, value_enum)]
    value_order: Option<ValueOrderArg>,

    /// Re-run arc consistency after every choice
    #[arg(long)]
    maintain_arc_consistency: bool,

    /// Give up after this many search states
    #[arg(long)]
    max_states: Option<u64>,

    /// Print up to this many distinct fills
    #[arg(long)]
    solutions: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ValueOrderArg {
    Lcv,
    Domain,
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn solver_config(args: &Args) -> Result<SolverConfig, Error> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::new(),
    };

    if let Some(value_order) = args.value_order {
        config = config.with_value_ordering(match value_order {
            ValueOrderArg::Lcv => ValueOrdering::LeastConstraining,
            ValueOrderArg::Domain => ValueOrdering::DomainOrder,
        });
    }
    if args.maintain_arc_consistency {
        config = config.with_arc_consistency(ArcConsistencyMode::Maintain);
    }
    if let Some(max_states) = args.max_states {
        config = config.with_max_states(max_states);
    }
    if let Some(solutions) = args.solutions {
        config.all_solutions = false;
        config = config.with_solution_limit(solutions);
    }

    Ok(config)
}

/// Returns whether a fill was found.
fn run(args: &Args) -> Result<bool, Error> {
    let fill_config = solver_config(args)?.to_fill_config()?;
    let grid_config = GridConfig::new(GridStructure::from_file(&args.structure)?);
    let word_list = WordList::from_file(&args.words)?;

    let result = match find_fill_with_config(&grid_config, &word_list, &fill_config) {
        Ok(result) => result,
        Err(failure) => {
            if failure == FillFailure::ExhaustedBudget {
                eprintln!("Gave up after {} states.", fill_config.max_states.unwrap_or(0));
            }
            println!("No solution.");
            return Ok(false);
        }
    };

    let rendered: Vec<String> = result
        .solutions
        .iter()
        .map(|solution| render_grid(&grid_config, &word_list, solution.choices()))
        .collect();
    let rendered = rendered.join("\n\n");

    println!("{rendered}");

    if let Some(path) = &args.output {
        fs::write(path, format!("{rendered}\n")).map_err(|source| Error::Output {
            path: path.clone(),
            source,
        })?;
    }

    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}
