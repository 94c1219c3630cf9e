use bit_set::BitSet;
use smallvec::SmallVec;

use crate::grid::{Grid, GridCoord};
use crate::slot::{attempt_key, attempt_key_capacity, AttemptKey, Direction};
use crate::word_list::WordId;
use crate::MAX_SLOT_COUNT;

/// A record of one slot assignment: where the slot starts, which way it runs, and which word of
/// its length bin was placed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub anchor: GridCoord,
    pub direction: Direction,
    pub word_id: WordId,
}

/// The ordered list of slots filled so far. The set of attempted slots is exactly the set of
/// slots with an entry here, kept alongside as a bit set for fast lookup.
#[derive(Debug, Clone)]
pub struct History {
    entries: SmallVec<[HistoryEntry; MAX_SLOT_COUNT]>,
    attempted: BitSet,
    keys: SmallVec<[AttemptKey; MAX_SLOT_COUNT]>,
}

impl History {
    pub fn new(grid: &Grid) -> History {
        History {
            entries: SmallVec::new(),
            attempted: BitSet::with_capacity(attempt_key_capacity(grid)),
            keys: SmallVec::new(),
        }
    }

    pub fn push(&mut self, grid: &Grid, entry: HistoryEntry) {
        let key = attempt_key(grid, entry.anchor, entry.direction);
        debug_assert!(!self.attempted.contains(key), "slot recorded twice: {:?}", entry);

        self.attempted.insert(key);
        self.keys.push(key);
        self.entries.push(entry);
    }

    /// Remove and return the most recent entry, making its slot available again.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        let entry = self.entries.pop()?;
        if let Some(key) = self.keys.pop() {
            self.attempted.remove(key);
        }
        Some(entry)
    }

    /// Slots that have already been filled, by attempt key.
    pub fn attempted(&self) -> &BitSet {
        &self.attempted
    }

    pub fn contains(&self, key: AttemptKey) -> bool {
        self.attempted.contains(key)
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
