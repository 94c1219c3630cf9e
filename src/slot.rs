use bit_set::BitSet;
use smallvec::SmallVec;

use crate::grid::{Grid, GridCoord};
use crate::MAX_SLOT_LENGTH;

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    /// Order in which directions are checked at each cell while scanning.
    pub const SCAN_ORDER: [Direction; 2] = [Direction::Down, Direction::Across];

    /// The (row, col) step from one cell of a run to the next.
    fn step(self) -> GridCoord {
        match self {
            Direction::Across => (0, 1),
            Direction::Down => (1, 0),
        }
    }
}

/// Key identifying a slot by its anchor and direction, unique within one grid.
pub type AttemptKey = usize;

/// Compute the attempt key for an anchor. Across and down slots sharing an anchor get distinct
/// keys.
pub fn attempt_key(grid: &Grid, (row, col): GridCoord, direction: Direction) -> AttemptKey {
    (row * grid.stride() + col) * 2 + direction as usize
}

/// Number of distinct attempt keys for the given grid, for sizing sets.
pub fn attempt_key_capacity(grid: &Grid) -> usize {
    (grid.height() + 2) * grid.stride() * 2
}

/// A maximal run of open cells, measured against the current state of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub anchor: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// How many cells of the run already hold a letter.
    pub intersections: usize,
}

impl Slot {
    /// Return the slot anchored at `anchor` in the given direction, if there is one. A cell
    /// anchors an across slot if it is open, the cell to its left is blocked, and the cell to its
    /// right is open (and likewise above/below for down slots).
    pub fn at(grid: &Grid, anchor: GridCoord, direction: Direction) -> Option<Slot> {
        let (row, col) = anchor;
        let (dr, dc) = direction.step();

        if grid.get(anchor).is_blocked()
            || !grid.get((row - dr, col - dc)).is_blocked()
            || grid.get((row + dr, col + dc)).is_blocked()
        {
            return None;
        }

        let mut length = 0;
        let mut intersections = 0;
        loop {
            let cell = grid.get((row + dr * length, col + dc * length));
            if cell.is_blocked() {
                break;
            }
            if cell.is_letter() {
                intersections += 1;
            }
            length += 1;
        }

        Some(Slot { anchor, direction, length, intersections })
    }

    /// The coords of each cell of this slot, in order.
    pub fn cells(&self) -> SmallVec<[GridCoord; MAX_SLOT_LENGTH]> {
        let (row, col) = self.anchor;
        let (dr, dc) = self.direction.step();

        (0..self.length).map(|idx| (row + dr * idx, col + dc * idx)).collect()
    }

    pub fn key(&self, grid: &Grid) -> AttemptKey {
        attempt_key(grid, self.anchor, self.direction)
    }
}

/// Every slot in the grid, in scan order: row-major over the interior, down before across at
/// each cell.
pub fn all_slots(grid: &Grid) -> Vec<Slot> {
    grid.interior_coords()
        .flat_map(|loc| Direction::SCAN_ORDER.iter().filter_map(move |&dir| Slot::at(grid, loc, dir)))
        .collect()
}

/// Choose the next slot to fill among the slots whose keys are not in `attempted`. We prefer the
/// slot with the most filled-in cells, then the longest one; remaining ties go to whichever comes
/// first in scan order. Returns `None` if every slot has been attempted.
pub fn locate_best_slot(grid: &Grid, attempted: &BitSet) -> Option<Slot> {
    let mut best: Option<Slot> = None;

    for slot in all_slots(grid) {
        if attempted.contains(slot.key(grid)) {
            continue;
        }

        let is_better = match &best {
            None => true,
            Some(best) => {
                (slot.intersections, slot.length) > (best.intersections, best.length)
            }
        };
        if is_better {
            best = Some(slot);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::slot::Direction::{Across, Down};

    #[test]
    fn test_anchor_rule() {
        let grid: Grid = "
            #..
            ...
            .#.
            ".parse().unwrap();

        assert_eq!(
            Slot::at(&grid, (1, 2), Across),
            Some(Slot { anchor: (1, 2), direction: Across, length: 2, intersections: 0 }),
        );
        assert_eq!(Slot::at(&grid, (1, 2), Down).map(|slot| slot.length), Some(2));
        assert_eq!(
            Slot::at(&grid, (2, 1), Down),
            Some(Slot { anchor: (2, 1), direction: Down, length: 2, intersections: 0 }),
        );
        assert_eq!(Slot::at(&grid, (1, 3), Down).map(|slot| slot.length), Some(3));

        // Not the start of a run.
        assert_eq!(Slot::at(&grid, (2, 2), Across), None);
        // Blocked cell.
        assert_eq!(Slot::at(&grid, (1, 1), Across), None);
        // Single open cell between blocks.
        assert_eq!(Slot::at(&grid, (3, 1), Across), None);
        assert_eq!(Slot::at(&grid, (3, 3), Down), None);
    }

    #[test]
    fn test_slot_cells_and_intersections() {
        let mut grid: Grid = "....".parse().unwrap();
        grid.set((1, 2), Cell::Letter(b'A'));
        grid.set((1, 4), Cell::Letter(b'B'));

        let slot = Slot::at(&grid, (1, 1), Across).unwrap();

        assert_eq!(slot.length, 4);
        assert_eq!(slot.intersections, 2);
        assert_eq!(slot.cells().as_slice(), &[(1, 1), (1, 2), (1, 3), (1, 4)]);
    }

    #[test]
    fn test_attempt_keys_are_distinct() {
        let grid: Grid = "...\n...\n...".parse().unwrap();

        let mut keys: Vec<_> = grid.interior_coords()
            .flat_map(|loc| [attempt_key(&grid, loc, Across), attempt_key(&grid, loc, Down)])
            .collect();
        let count = keys.len();
        keys.sort();
        keys.dedup();

        assert_eq!(keys.len(), count);
        assert!(keys.iter().all(|&key| key < attempt_key_capacity(&grid)));
    }

    #[test]
    fn test_all_slots_scan_order() {
        let grid: Grid = "
            ...
            .#.
            ...
            ".parse().unwrap();

        let slots: Vec<_> = all_slots(&grid).iter().map(|slot| (slot.anchor, slot.direction)).collect();

        assert_eq!(slots, vec![
            ((1, 1), Down),
            ((1, 1), Across),
            ((1, 3), Down),
            ((3, 1), Across),
        ]);
    }

    #[test]
    fn test_locate_prefers_intersections_then_length() {
        let mut grid: Grid = "
            ....#
            ....#
            #....
            ".parse().unwrap();

        // With nothing filled in, the longest slot wins; ties go to the first one found.
        let best = locate_best_slot(&grid, &BitSet::new()).unwrap();
        assert_eq!((best.anchor, best.direction, best.length), ((1, 1), Across, 4));

        // A shorter slot with more filled cells beats a longer one.
        grid.set((1, 1), Cell::Letter(b'X'));
        grid.set((2, 1), Cell::Letter(b'Y'));
        let best = locate_best_slot(&grid, &BitSet::new()).unwrap();
        assert_eq!((best.anchor, best.direction, best.length), ((1, 1), Down, 2));
        assert_eq!(best.intersections, 2);
    }

    #[test]
    fn test_locate_skips_attempted_slots() {
        let grid: Grid = ".....".parse().unwrap();
        let mut attempted = BitSet::new();

        let best = locate_best_slot(&grid, &attempted).unwrap();
        assert_eq!((best.anchor, best.direction, best.length), ((1, 1), Across, 5));

        attempted.insert(best.key(&grid));
        assert_eq!(locate_best_slot(&grid, &attempted), None);
    }
}
