use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Placeholder standing in for the space between the parts of a multi-word answer. It occupies a
/// cell like any letter, and is distinct from both `A-Z` and the block character.
pub const SEPARATOR: u8 = b'_';

/// An identifier for a given word, based on its index in the word list's bin for its length.
pub type WordId = usize;

/// How the words from each source should be ordered within their bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordOrder {
    /// Keep the order the words were given in.
    Given,
    /// Shuffle each source separately, using an RNG seeded with the given value.
    Shuffled(u64),
}

#[derive(Error, Debug)]
pub enum WordListError {
    #[error("failed to read word list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Words grouped ("binned") by length. `bins[n]` holds every accepted word with exactly `n`
/// cells, in search order.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    bins: Vec<Vec<String>>,
    rejected: usize,
}

/// Normalize a raw word list entry: uppercase it and collapse each run of inner whitespace into a
/// single `SEPARATOR`. Returns `None` for empty entries and entries containing anything other than
/// ASCII letters and spaces.
pub fn normalize_word(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }
    if !parts.iter().all(|part| part.chars().all(|c| c.is_ascii_alphabetic())) {
        return None;
    }

    Some(parts.join(&(SEPARATOR as char).to_string()).to_ascii_uppercase())
}

impl WordList {
    /// Build a word list from one or more sources, each an ordered list of raw entries. Sources
    /// are appended in the order given, so words from earlier sources come first in every bin.
    pub fn new<S, W>(sources: S, order: WordOrder) -> WordList
    where
        S: IntoIterator<Item = Vec<W>>,
        W: AsRef<str>,
    {
        let mut rng = match order {
            WordOrder::Given => None,
            WordOrder::Shuffled(seed) => Some(SmallRng::seed_from_u64(seed)),
        };

        let mut word_list = WordList::default();

        for mut source in sources {
            if let Some(rng) = rng.as_mut() {
                source.shuffle(rng);
            }

            for raw in &source {
                match normalize_word(raw.as_ref()) {
                    Some(word) => word_list.push(word),
                    None => {
                        if !raw.as_ref().trim().is_empty() {
                            word_list.rejected += 1;
                        }
                    }
                }
            }
        }

        for (length, bin) in word_list.bins.iter().enumerate() {
            if !bin.is_empty() {
                debug!("{} words of length {}", bin.len(), length);
            }
        }
        if word_list.rejected > 0 {
            debug!("Skipped {} entries with unsupported characters", word_list.rejected);
        }

        word_list
    }

    /// Build a word list from readers holding one entry per line.
    pub fn from_readers<R: BufRead>(readers: Vec<R>, order: WordOrder) -> io::Result<WordList> {
        let sources = readers
            .into_iter()
            .map(|reader| reader.lines().collect::<io::Result<Vec<String>>>())
            .collect::<io::Result<Vec<_>>>()?;

        Ok(WordList::new(sources, order))
    }

    /// Load word list files, one entry per line.
    pub fn load<P: AsRef<Path>>(paths: &[P], order: WordOrder) -> Result<WordList, WordListError> {
        let sources = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let to_error = |source| WordListError::Io { path: path.to_path_buf(), source };

                BufReader::new(File::open(path).map_err(to_error)?)
                    .lines()
                    .collect::<io::Result<Vec<String>>>()
                    .map_err(to_error)
            })
            .collect::<Result<Vec<_>, WordListError>>()?;

        Ok(WordList::new(sources, order))
    }

    fn push(&mut self, word: String) {
        let len = word.len();
        if len >= self.bins.len() {
            self.bins.resize_with(len + 1, Vec::new);
        }
        self.bins[len].push(word);
    }

    /// All words with the given length, in search order.
    pub fn bin(&self, length: usize) -> &[String] {
        self.bins.get(length).map(|bin| bin.as_slice()).unwrap_or(&[])
    }

    pub fn word(&self, length: usize, word_id: WordId) -> &str {
        &self.bins[length][word_id]
    }

    /// Length of the longest accepted word, or 0 if there are none.
    pub fn max_length(&self) -> usize {
        self.bins.iter().rposition(|bin| !bin.is_empty()).unwrap_or(0)
    }

    /// Total number of accepted words.
    pub fn len(&self) -> usize {
        self.bins.iter().map(|bin| bin.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries that were skipped because of unsupported characters.
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("cat"), Some("CAT".to_string()));
        assert_eq!(normalize_word("  new   york "), Some("NEW_YORK".to_string()));
        assert_eq!(normalize_word("o'clock"), None);
        assert_eq!(normalize_word("route 66"), None);
        assert_eq!(normalize_word("   "), None);
    }

    #[test]
    fn test_words_are_binned_by_length() {
        let word_list = WordList::new(
            vec![vec!["cat", "horse", "dog", "new york", "", "x-ray"]],
            WordOrder::Given,
        );

        assert_eq!(word_list.bin(3), &["CAT", "DOG"]);
        assert_eq!(word_list.bin(5), &["HORSE"]);
        assert_eq!(word_list.bin(8), &["NEW_YORK"]);
        assert!(word_list.bin(4).is_empty());
        assert!(word_list.bin(40).is_empty());
        assert_eq!(word_list.word(3, 1), "DOG");
        assert_eq!(word_list.len(), 4);
        assert_eq!(word_list.max_length(), 8);
        assert_eq!(word_list.rejected_count(), 1);
    }

    #[test]
    fn test_earlier_sources_come_first() {
        let word_list = WordList::new(
            vec![vec!["zzz", "yyy"], vec!["aaa", "bbb"]],
            WordOrder::Given,
        );

        assert_eq!(word_list.bin(3), &["ZZZ", "YYY", "AAA", "BBB"]);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        // 20 words each of lengths 3, 5 and 7.
        let words: Vec<String> = (0..60)
            .map(|i| format!("{}{}", "ab".repeat(1 + i % 3), (b'a' + (i / 3) as u8) as char))
            .collect();

        let first = WordList::new(vec![words.clone()], WordOrder::Shuffled(7));
        let second = WordList::new(vec![words.clone()], WordOrder::Shuffled(7));
        let given = WordList::new(vec![words], WordOrder::Given);

        for length in 0..8 {
            assert_eq!(first.bin(length), second.bin(length));

            let mut shuffled = first.bin(length).to_vec();
            let mut original = given.bin(length).to_vec();
            shuffled.sort();
            original.sort();
            assert_eq!(shuffled, original);
        }
    }

    #[test]
    fn test_shuffle_keeps_sources_separate() {
        let word_list = WordList::new(
            vec![vec!["aa", "bb", "cc"], vec!["dd", "ee", "ff"]],
            WordOrder::Shuffled(42),
        );

        let bin = word_list.bin(2);
        let mut head = bin[..3].to_vec();
        head.sort();
        assert_eq!(head, &["AA", "BB", "CC"]);
    }

    #[test]
    fn test_from_readers() {
        let word_list = WordList::from_readers(
            vec![&b"apple\nice cream\r\n\nkiwi\n"[..]],
            WordOrder::Given,
        ).unwrap();

        assert_eq!(word_list.bin(5), &["APPLE"]);
        assert_eq!(word_list.bin(9), &["ICE_CREAM"]);
        assert_eq!(word_list.bin(4), &["KIWI"]);
    }
}
