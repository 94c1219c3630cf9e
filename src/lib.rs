pub mod backtracking_search;
pub mod grid;
pub mod history;
pub mod slot;
pub mod word_list;

pub use backtracking_search::{
    find_fill, Choice, FillFailure, FillOptions, FillSuccess, Filler, InputError, Statistics, Step,
};
pub use grid::{render_grid, Cell, Grid, GridError};
pub use slot::{locate_best_slot, Direction, Slot};
pub use word_list::{WordList, WordListError, WordOrder};

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// Fill the given pattern from the word list with default options. This is the whole search in
/// one call: it either returns a complete grid with no repeated words, or explains why it
/// couldn't.
pub fn run(grid: Grid, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    find_fill(grid, word_list, &FillOptions::default())
}

#[cfg(test)]
mod tests {
    use crate::{run, Cell, FillFailure, Grid, InputError, WordList, WordOrder};

    #[test]
    fn test_run_fills_grid() {
        let grid: Grid = "
            #.#
            ...
            #.#
            ".parse().unwrap();
        let words = WordList::new(vec![vec!["cat", "dog", "cot"]], WordOrder::Shuffled(3));

        let result = run(grid, &words).expect("Failed to find a fill");

        println!("{:?}", result.statistics);
        println!("{}", result.grid);
        assert!(result.grid.is_complete());
        // DOG and COT are the only pair sharing a middle letter.
        assert_eq!(result.grid.get((2, 2)), Cell::Letter(b'O'));
        let mut words: Vec<_> = result.choices.iter().map(|choice| choice.word.as_str()).collect();
        words.sort();
        assert_eq!(words, vec!["COT", "DOG"]);
    }

    #[test]
    fn test_run_rejects_missing_lengths() {
        let words = WordList::new(vec![vec!["cat"]], WordOrder::Given);

        assert_eq!(
            run("....".parse().unwrap(), &words).unwrap_err(),
            FillFailure::InvalidInput(InputError::NoWordsOfLength(4)),
        );
    }
}
