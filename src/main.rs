use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossfill::backtracking_search::DEFAULT_PROGRESS_INTERVAL;
use crossfill::{find_fill, render_grid, FillOptions, Grid, WordList, WordOrder};
use env_logger::Env;
use instant::Duration;
use log::{error, info};

/// Fill a crossword pattern with words from one or more word lists.
#[derive(Debug, Parser)]
#[command(version)]
struct Opts {
    /// Pattern file: `#` for blocks, `.` for open cells, letters for pre-filled cells.
    #[arg(short, long)]
    pattern: PathBuf,

    /// Word list files, one entry per line. Words from earlier files are tried first, and no
    /// word may be longer than both the width and height of the pattern.
    #[arg(short, long, required = true, num_args = 1..)]
    words: Vec<PathBuf>,

    /// Seed for shuffling the word lists. A random seed is used (and logged) if not given.
    #[arg(short, long, conflicts_with = "in_order")]
    seed: Option<u64>,

    /// Keep words in file order instead of shuffling.
    #[arg(long)]
    in_order: bool,

    /// Log the grid every N search states (0 to disable).
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: usize,

    /// Give up after this many backtracks.
    #[arg(long)]
    max_backtracks: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Also write the filled grid to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    let order = if opts.in_order {
        WordOrder::Given
    } else {
        let seed = opts.seed.unwrap_or_else(rand::random);
        info!("Shuffling word lists with seed {}", seed);
        WordOrder::Shuffled(seed)
    };

    let grid = match Grid::from_file(&opts.pattern) {
        Ok(grid) => grid,
        Err(err) => {
            error!("Failed to load pattern {:?}: {}", opts.pattern, err);
            return ExitCode::FAILURE;
        }
    };

    let word_list = match WordList::load(opts.words.as_slice(), order) {
        Ok(word_list) => word_list,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    info!("Loaded {} words ({} skipped)", word_list.len(), word_list.rejected_count());

    let options = FillOptions {
        progress_interval: Some(opts.progress_interval).filter(|&interval| interval > 0),
        max_backtracks: opts.max_backtracks,
        timeout: opts.timeout_secs.map(Duration::from_secs),
    };

    let result = match find_fill(grid, &word_list, &options) {
        Ok(result) => result,
        Err(failure) => {
            error!("{}", failure);
            return ExitCode::FAILURE;
        }
    };

    let display_grid = render_grid(&result.grid);

    println!("{:?}", result.statistics);
    println!("{}", display_grid);

    if let Some(output) = &opts.output {
        if let Err(err) = fs::write(output, format!("{}\n", display_grid)) {
            error!("Unable to write {:?}: {}", output, err);
            return ExitCode::FAILURE;
        }
        info!("Wrote grid to {:?}", output);
    }

    ExitCode::SUCCESS
}
