use std::collections::HashSet;

use instant::{Duration, Instant};
use log::{debug, info, trace};
use thiserror::Error;

use crate::grid::{Cell, Grid, GridCoord};
use crate::history::{History, HistoryEntry};
use crate::slot::{all_slots, locate_best_slot, AttemptKey, Direction, Slot};
use crate::word_list::{WordId, WordList};

/// How many states we go through between checks of the deadline.
pub const INTERRUPT_FREQUENCY: usize = 10;

/// How many states go by between progress snapshots, unless configured otherwise.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 4000;

/// Signals that no unused word in a slot's bin is compatible with the letters already in the
/// grid. Only ever handled by backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoFit;

/// Problems with the pattern or word list that make a search pointless, found before starting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("pattern has no open cells")]
    NoOpenCells,
    #[error("open cell at row {row}, column {col} is not part of any slot")]
    UncoveredCell { row: usize, col: usize },
    #[error("word list has no words of length {0}")]
    NoWordsOfLength(usize),
    #[error("word list has a word of length {length}, longer than the grid is wide or tall")]
    WordTooLong { length: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("no fill can be found for this pattern and word list")]
    Unsolvable,
    #[error("search ran out of slots with {blank_cells} blank cells left")]
    Incomplete { blank_cells: usize },
    #[error("gave up after {0} backtracks")]
    ExceededBacktrackLimit(usize),
    #[error("gave up after reaching the time limit")]
    Timeout,
}

/// Settings for a fill attempt that don't affect which fill is found.
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Log a rendering of the grid every N states.
    pub progress_interval: Option<usize>,
    pub max_backtracks: Option<usize>,
    pub timeout: Option<Duration>,
}

impl Default for FillOptions {
    fn default() -> FillOptions {
        FillOptions {
            progress_interval: Some(DEFAULT_PROGRESS_INTERVAL),
            max_backtracks: None,
            timeout: None,
        }
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub placements: usize,
    pub backtracks: usize,
    pub duration: Duration,
}

/// A struct recording a slot assignment in a finished fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub anchor: GridCoord,
    pub direction: Direction,
    pub word: String,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub grid: Grid,
    pub choices: Vec<Choice>,
}

/// The outcome of a single search step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A word was placed in a slot.
    Placed(Choice),
    /// The most recent placement was undone.
    Backtracked,
    /// Every slot has been filled and no blank cells remain.
    Done,
    /// Every option for the first slot has been exhausted.
    Unsolvable,
    /// There are no slots left to fill, but some cells are still blank.
    Stalled,
}

/// What `Filler::backtrack` managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktrackOutcome {
    /// The newest placement was undone and the grid rebuilt without it.
    Rewound,
    /// There was nothing left to undo.
    Exhausted,
}

/// Where to resume scanning the bin of a slot whose last word was just undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resume {
    key: AttemptKey,
    skip_before: WordId,
}

/// Does `word` agree with every letter already present along `slot`? Blank cells accept anything;
/// letter cells (including separators) must match exactly.
pub fn fits(word: &str, slot: &Slot, grid: &Grid) -> bool {
    word.len() == slot.length
        && slot.cells().iter().zip(word.bytes()).all(|(&loc, byte)| match grid.get(loc) {
            Cell::Blank => true,
            Cell::Letter(existing) => existing == byte,
            Cell::Blocked => false,
        })
}

/// Find the first word in the slot's length bin, starting at `skip_before`, that isn't already in
/// use and fits the letters in the grid.
pub fn choose_word(
    slot: &Slot,
    grid: &Grid,
    word_list: &WordList,
    used: &HashSet<&str>,
    skip_before: WordId,
) -> Result<WordId, NoFit> {
    word_list
        .bin(slot.length)
        .iter()
        .enumerate()
        .skip(skip_before)
        .find(|(_, word)| !used.contains(word.as_str()) && fits(word, slot, grid))
        .map(|(word_id, _)| word_id)
        .ok_or(NoFit)
}

/// Write a word's letters into the grid along a slot.
pub fn write_word(grid: &mut Grid, slot: &Slot, word: &str) {
    debug_assert_eq!(word.len(), slot.length);
    for (loc, byte) in slot.cells().into_iter().zip(word.bytes()) {
        grid.set(loc, Cell::Letter(byte));
    }
}

/// Check that a search on this grid and word list could possibly succeed.
pub fn check_input(grid: &Grid, word_list: &WordList) -> Result<(), InputError> {
    if grid.open_cell_count() == 0 {
        return Err(InputError::NoOpenCells);
    }

    let slots = all_slots(grid);

    // Every open cell has to be covered by some slot, otherwise running out of slots wouldn't mean
    // the grid is full.
    let mut covered = vec![false; grid.stride() * (grid.height() + 2)];
    for slot in &slots {
        for (row, col) in slot.cells() {
            covered[row * grid.stride() + col] = true;
        }
    }
    if let Some((row, col)) = grid
        .interior_coords()
        .find(|&(row, col)| !grid.get((row, col)).is_blocked() && !covered[row * grid.stride() + col])
    {
        return Err(InputError::UncoveredCell { row: row - 1, col: col - 1 });
    }

    let longest = word_list.max_length();
    if longest > grid.width().max(grid.height()) {
        return Err(InputError::WordTooLong { length: longest });
    }

    if let Some(slot) = slots.iter().find(|slot| word_list.bin(slot.length).is_empty()) {
        return Err(InputError::NoWordsOfLength(slot.length));
    }

    Ok(())
}

/// The state of one fill attempt. Each `Filler` owns its grid, history and set of used words, so
/// separate attempts never share anything but the (immutable) word list.
pub struct Filler<'a> {
    word_list: &'a WordList,
    grid: Grid,
    history: History,
    used: HashSet<&'a str>,
    resume: Option<Resume>,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    /// Set up a fill attempt, rejecting inputs that can't be filled.
    pub fn new(grid: Grid, word_list: &'a WordList) -> Result<Filler<'a>, InputError> {
        check_input(&grid, word_list)?;

        let history = History::new(&grid);

        Ok(Filler {
            word_list,
            grid,
            history,
            used: HashSet::new(),
            resume: None,
            statistics: Statistics::default(),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// The bin index the given slot's next search has to start from.
    pub fn skip_before(&self, slot: &Slot) -> WordId {
        match self.resume {
            Some(resume) if resume.key == slot.key(&self.grid) => resume.skip_before,
            _ => 0,
        }
    }

    fn word_for(&self, entry: &HistoryEntry, length: usize) -> &'a str {
        let word_list: &'a WordList = self.word_list;
        word_list.word(length, entry.word_id)
    }

    /// Place a word in a slot and record the choice.
    fn commit(&mut self, slot: &Slot, word_id: WordId) -> Choice {
        let word_list: &'a WordList = self.word_list;
        let word = word_list.word(slot.length, word_id);
        write_word(&mut self.grid, slot, word);

        self.history.push(
            &self.grid,
            HistoryEntry { anchor: slot.anchor, direction: slot.direction, word_id },
        );
        self.used.insert(word);
        self.resume = None;
        self.statistics.placements += 1;

        trace!("Placed {} at {:?} {:?}", word, slot.anchor, slot.direction);

        Choice { anchor: slot.anchor, direction: slot.direction, word: word.to_string() }
    }

    /// Undo the most recent placement. The grid is wiped back to the pattern and every earlier
    /// placement is written again in order, which leaves the grid exactly as it was before the
    /// undone slot was chosen. That slot is no longer attempted, and its next search skips every
    /// word up to and including the one just removed.
    pub fn backtrack(&mut self) -> BacktrackOutcome {
        let last = match self.history.pop() {
            Some(entry) => entry,
            None => return BacktrackOutcome::Exhausted,
        };

        self.grid.reset();
        for entry in self.history.iter() {
            let slot = Slot::at(&self.grid, entry.anchor, entry.direction)
                .expect("history entry no longer anchors a slot");
            write_word(&mut self.grid, &slot, self.word_list.word(slot.length, entry.word_id));
        }

        let slot = Slot::at(&self.grid, last.anchor, last.direction)
            .expect("undone history entry no longer anchors a slot");
        let word = self.word_for(&last, slot.length);
        self.used.remove(word);
        self.resume = Some(Resume { key: slot.key(&self.grid), skip_before: last.word_id + 1 });
        self.statistics.backtracks += 1;

        debug!(
            "Backtracked from {} at {:?} {:?} (depth {})",
            word,
            last.anchor,
            last.direction,
            self.history.len(),
        );

        BacktrackOutcome::Rewound
    }

    /// Advance the search by one state: pick a slot, then either fill it or backtrack.
    pub fn step(&mut self) -> Step {
        self.statistics.states += 1;

        let slot = match locate_best_slot(&self.grid, self.history.attempted()) {
            Some(slot) => slot,
            None => {
                return if self.grid.is_complete() { Step::Done } else { Step::Stalled };
            }
        };

        let skip_before = self.skip_before(&slot);
        match choose_word(&slot, &self.grid, self.word_list, &self.used, skip_before) {
            Ok(word_id) => Step::Placed(self.commit(&slot, word_id)),
            Err(NoFit) => {
                trace!(
                    "No word fits {:?} {:?} (length {}, from {})",
                    slot.anchor,
                    slot.direction,
                    slot.length,
                    skip_before,
                );
                match self.backtrack() {
                    BacktrackOutcome::Rewound => Step::Backtracked,
                    BacktrackOutcome::Exhausted => Step::Unsolvable,
                }
            }
        }
    }

    /// The placements currently in the grid, oldest first.
    pub fn choices(&self) -> Vec<Choice> {
        // Slot lengths only depend on where the blocks are, so the current grid will do.
        self.history
            .iter()
            .map(|entry| {
                let slot = Slot::at(&self.grid, entry.anchor, entry.direction)
                    .expect("history entry no longer anchors a slot");
                let word = self.word_for(entry, slot.length);
                Choice { anchor: entry.anchor, direction: entry.direction, word: word.to_string() }
            })
            .collect()
    }

    /// Keep stepping until the search finishes or one of the limits in `options` is hit.
    pub fn run(mut self, options: &FillOptions) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        let deadline = options.timeout.map(|timeout| start + timeout);

        loop {
            let step = self.step();

            if let Some(interval) = options.progress_interval {
                if interval > 0 && self.statistics.states % interval == 0 {
                    info!(
                        "{} states, {} backtracks, depth {}\n{}",
                        self.statistics.states,
                        self.statistics.backtracks,
                        self.history.len(),
                        self.grid,
                    );
                }
            }

            match step {
                Step::Placed(_) => {}
                Step::Backtracked => {
                    if let Some(max_backtracks) = options.max_backtracks {
                        if self.statistics.backtracks > max_backtracks {
                            return Err(FillFailure::ExceededBacktrackLimit(self.statistics.backtracks));
                        }
                    }
                }
                Step::Done => break,
                Step::Unsolvable => return Err(FillFailure::Unsolvable),
                Step::Stalled => {
                    return Err(FillFailure::Incomplete { blank_cells: self.grid.blank_cell_count() });
                }
            }

            if self.statistics.states % INTERRUPT_FREQUENCY == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() > deadline {
                        return Err(FillFailure::Timeout);
                    }
                }
            }
        }

        self.statistics.duration = start.elapsed();
        info!(
            "Filled {} slots in {:?} ({} states, {} backtracks)",
            self.history.len(),
            self.statistics.duration,
            self.statistics.states,
            self.statistics.backtracks,
        );

        Ok(FillSuccess { choices: self.choices(), statistics: self.statistics, grid: self.grid })
    }
}

/// Search for a valid fill for the given pattern and word list.
pub fn find_fill(
    grid: Grid,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    Filler::new(grid, word_list)?.run(options)
}
