use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Character used for blocked cells in templates and rendered grids.
pub const BLOCK_CHAR: char = '#';

/// Character used for open (blank) cells in templates and rendered grids.
pub const BLANK_CHAR: char = '.';

/// Zero-indexed (row, col) coords in the bordered grid, so the interior starts at (1, 1).
pub type GridCoord = (usize, usize);

/// The state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Blocked,
    Blank,
    Letter(u8),
}

impl Cell {
    pub fn is_blocked(self) -> bool {
        self == Cell::Blocked
    }

    pub fn is_letter(self) -> bool {
        matches!(self, Cell::Letter(_))
    }
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("pattern has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("unexpected character {ch:?} at row {row}, column {col}")]
    InvalidChar { ch: char, row: usize, col: usize },
    #[error("failed to read pattern {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A crossword grid surrounded by a one-cell ring of blocked cells. The ring means every interior
/// cell has four neighbours, so run boundaries can be found by looking for `Cell::Blocked`
/// without bounds checks.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,

    /// The cells as they were in the pattern, used to wipe the grid when backtracking.
    pattern: Vec<Cell>,
}

impl Grid {
    /// Build a grid from interior rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Result<Grid, GridError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.len()).ok_or(GridError::Empty)?;
        if width == 0 {
            return Err(GridError::Empty);
        }

        let stride = width + 2;
        let mut cells = vec![Cell::Blocked; stride * (height + 2)];

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged { row: y, expected: width, found: row.len() });
            }
            let start = (y + 1) * stride + 1;
            cells[start..start + width].copy_from_slice(row);
        }

        Ok(Grid { width, height, pattern: cells.clone(), cells })
    }

    /// Load a pattern from a template file; see `FromStr` for the format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Grid, GridError> {
        let path = path.as_ref();
        fs::read_to_string(path)
            .map_err(|source| GridError::Io { path: path.to_path_buf(), source })?
            .parse()
    }

    /// Interior width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Interior height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width of a row including the border.
    pub fn stride(&self) -> usize {
        self.width + 2
    }

    pub fn get(&self, (row, col): GridCoord) -> Cell {
        self.cells[row * self.stride() + col]
    }

    /// Overwrite an interior cell. The border is never written.
    pub fn set(&mut self, (row, col): GridCoord, cell: Cell) {
        debug_assert!(row >= 1 && row <= self.height && col >= 1 && col <= self.width);
        let stride = self.stride();
        self.cells[row * stride + col] = cell;
    }

    /// Iterate over the coords of every interior cell in row-major order.
    pub fn interior_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (1..=self.height).flat_map(move |row| (1..=self.width).map(move |col| (row, col)))
    }

    /// Restore every cell to its pattern state.
    pub fn reset(&mut self) {
        self.cells.copy_from_slice(&self.pattern);
    }

    pub fn open_cell_count(&self) -> usize {
        self.interior_coords().filter(|&loc| !self.get(loc).is_blocked()).count()
    }

    pub fn blank_cell_count(&self) -> usize {
        self.interior_coords().filter(|&loc| self.get(loc) == Cell::Blank).count()
    }

    /// True if no open cell is left blank.
    pub fn is_complete(&self) -> bool {
        self.blank_cell_count() == 0
    }
}

/// Parse a template with `#` for blocks, `.` for open cells, and letters representing
/// themselves. Lines are trimmed and empty lines are ignored, so templates can be indented.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(template: &str) -> Result<Grid, GridError> {
        let lines: Vec<&str> =
            template.lines().map(|line| line.trim()).filter(|line| !line.is_empty()).collect();

        let rows = lines.iter().enumerate().map(|(row, line)| {
            line.chars().enumerate().map(|(col, ch)| {
                match ch {
                    BLOCK_CHAR => Ok(Cell::Blocked),
                    BLANK_CHAR => Ok(Cell::Blank),
                    ch if ch.is_ascii_alphabetic() => Ok(Cell::Letter(ch.to_ascii_uppercase() as u8)),
                    ch => Err(GridError::InvalidChar { ch, row, col }),
                }
            }).collect::<Result<Vec<Cell>, GridError>>()
        }).collect::<Result<Vec<_>, GridError>>()?;

        Grid::from_rows(&rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 1..=self.height {
            if row > 1 {
                writeln!(f)?;
            }
            for col in 1..=self.width {
                let ch = match self.get((row, col)) {
                    Cell::Blocked => BLOCK_CHAR,
                    Cell::Blank => BLANK_CHAR,
                    Cell::Letter(byte) => byte as char,
                };
                write!(f, "{}", ch)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid {}x{}\n{}", self.width, self.height, self)
    }
}

/// Turn the given grid into a rendered string.
pub fn render_grid(grid: &Grid) -> String {
    grid.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let grid: Grid = "
            #..
            ...
            ..a
            ".parse().unwrap();

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get((1, 1)), Cell::Blocked);
        assert_eq!(grid.get((1, 2)), Cell::Blank);
        assert_eq!(grid.get((3, 3)), Cell::Letter(b'A'));
        assert_eq!(grid.open_cell_count(), 8);
        assert_eq!(grid.blank_cell_count(), 7);
    }

    #[test]
    fn test_border_is_blocked() {
        let grid: Grid = "..\n..".parse().unwrap();

        for i in 0..4 {
            assert!(grid.get((0, i)).is_blocked());
            assert!(grid.get((3, i)).is_blocked());
            assert!(grid.get((i, 0)).is_blocked());
            assert!(grid.get((i, 3)).is_blocked());
        }
    }

    #[test]
    fn test_render_matches_template() {
        let template = "#.b\n...\nc.#";
        let grid: Grid = template.parse().unwrap();

        assert_eq!(render_grid(&grid), "#.B\n...\nC.#");
    }

    #[test]
    fn test_reset_restores_pattern_letters() {
        let mut grid: Grid = "x..".parse().unwrap();
        grid.set((1, 2), Cell::Letter(b'Y'));
        grid.set((1, 3), Cell::Letter(b'Z'));
        assert!(grid.is_complete());

        grid.reset();

        assert_eq!(grid.to_string(), "X..");
        assert!(!grid.is_complete());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("".parse::<Grid>(), Err(GridError::Empty)));
        assert!(matches!(
            "...\n..".parse::<Grid>(),
            Err(GridError::Ragged { row: 1, expected: 3, found: 2 }),
        ));
        assert!(matches!(
            "..\n.?".parse::<Grid>(),
            Err(GridError::InvalidChar { ch: '?', row: 1, col: 1 }),
        ));
    }

    #[test]
    fn test_missing_file_keeps_io_source() {
        use std::error::Error;

        let err = Grid::from_file("no/such/pattern.txt").unwrap_err();

        match &err {
            GridError::Io { path, source } => {
                assert_eq!(path, Path::new("no/such/pattern.txt"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.source().is_some());
    }
}
