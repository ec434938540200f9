use crate::csp::{EngineConfig, IntVar, Session, all_different, eq};
use crate::error::PuzzleError;
use crate::extract::{Outcome, conclude, extract_grid};
use crate::grid::{Grid, declare_grid};
use crate::sat::cnf::Cnf;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sudoku givens, row by row. `0` marks a blank cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board(Vec<Vec<usize>>);

impl Board {
    /// Wraps rows of givens without validating them.
    #[must_use]
    pub const fn new(board: Vec<Vec<usize>>) -> Self {
        Self(board)
    }

    /// An all-blank `n x n` board.
    #[must_use]
    pub fn blank(size: Size) -> Self {
        let n = usize::from(size);
        Self(vec![vec![0; n]; n])
    }

    /// The givens, row by row.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.0
    }

    /// Value at `(row, col)`, `0` if blank.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<usize> {
        self.0.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Non-blank cells as `((row, col), value)`.
    pub fn givens(&self) -> impl Iterator<Item = ((usize, usize), usize)> + '_ {
        self.0.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(c, &v)| ((r, c), v))
        })
    }

    /// True if this board is a complete, valid solution that keeps every
    /// given of `givens`.
    #[must_use]
    pub fn is_solution_of(&self, givens: &Self) -> bool {
        let Ok(size) = validate_shape(self) else {
            return false;
        };
        if validate_shape(givens) != Ok(size) {
            return false;
        }
        let n = usize::from(size);
        let permutation = |cells: &[(usize, usize)]| {
            let mut seen = vec![false; n + 1];
            cells.iter().all(|&(r, c)| {
                let v = self.0[r][c];
                (1..=n).contains(&v) && !std::mem::replace(&mut seen[v], true)
            })
        };
        units(size).iter().all(|(_, cells)| permutation(cells))
            && givens.givens().all(|((r, c), v)| self.0[r][c] == v)
    }

    /// Board of decoded cell values, each of which must lie in `1..=n`.
    fn from_values(values: &Grid<i64>, size: Size) -> Result<Self, PuzzleError> {
        let max = usize::from(size);
        let cells = Grid::try_from_fn(values.rows(), values.cols(), |row, col| {
            let value = values[(row, col)];
            usize::try_from(value)
                .ok()
                .filter(|v| (1..=max).contains(v))
                .ok_or(PuzzleError::CellOutOfRange {
                    row,
                    col,
                    value,
                    max,
                })
        })?;
        Ok(Self(cells.into_rows()))
    }
}

impl From<Vec<Vec<usize>>> for Board {
    fn from(board: Vec<Vec<usize>>) -> Self {
        Self::new(board)
    }
}

impl<const N: usize> From<[[usize; N]; N]> for Board {
    fn from(board: [[usize; N]; N]) -> Self {
        Self::new(board.iter().map(|r| r.to_vec()).collect())
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.0 {
            writeln!(f, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }
}

/// Parses `n*n` cells. Single characters are read as digits, with `0` or `.`
/// for a blank; whitespace is ignored. Boards wider than 9 need their cells
/// separated by whitespace or commas.
impl FromStr for Board {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s
            .split(|ch: char| ch.is_whitespace() || ch == ',')
            .filter(|t| !t.is_empty())
            .collect_vec();
        let cells: Vec<usize> = if tokens.len() > 1 && square_size(tokens.len()).is_some() {
            tokens.into_iter().map(parse_cell).collect::<Result<_, _>>()?
        } else {
            s.chars()
                .filter(|ch| !ch.is_whitespace())
                .map(|ch| parse_cell(ch.encode_utf8(&mut [0; 4])))
                .collect::<Result<Vec<_>, _>>()?
        };

        let n = square_size(cells.len()).ok_or_else(|| {
            PuzzleError::Parse(format!("{} cells do not form a supported board", cells.len()))
        })?;
        Ok(Self(cells.chunks(n).map(<[usize]>::to_vec).collect()))
    }
}

fn parse_cell(token: &str) -> Result<usize, PuzzleError> {
    if token == "." {
        return Ok(0);
    }
    token
        .parse()
        .map_err(|_| PuzzleError::Parse(format!("unexpected cell `{token}`")))
}

fn square_size(cells: usize) -> Option<usize> {
    [4, 9, 16, 25].into_iter().find(|n| n * n == cells)
}

/// A 4x4 board with a unique solution.
pub const EXAMPLE_FOUR: [[usize; 4]; 4] = [[1, 0, 0, 0], [0, 4, 0, 1], [0, 0, 4, 0], [0, 2, 0, 3]];

/// A 9x9 board with a unique solution.
pub const EXAMPLE_NINE: [[usize; 9]; 9] = [
    [0, 0, 0, 0, 9, 4, 0, 3, 0],
    [0, 0, 0, 5, 1, 0, 0, 0, 7],
    [0, 8, 9, 0, 0, 0, 0, 4, 0],
    [0, 0, 0, 0, 0, 0, 2, 0, 8],
    [0, 6, 0, 2, 0, 1, 0, 5, 0],
    [1, 0, 2, 0, 0, 0, 0, 0, 0],
    [0, 7, 0, 0, 0, 0, 5, 2, 0],
    [9, 0, 0, 0, 6, 5, 0, 0, 0],
    [0, 4, 0, 9, 7, 0, 0, 0, 0],
];

/// A 16x16 board with a unique solution.
pub const EXAMPLE_SIXTEEN: [[usize; 16]; 16] = [
    [0, 11, 0, 0, 0, 2, 3, 14, 0, 0, 9, 12, 0, 0, 0, 16],
    [15, 12, 0, 0, 0, 11, 0, 1, 13, 10, 0, 0, 0, 0, 7, 2],
    [0, 0, 10, 0, 0, 0, 0, 0, 16, 11, 0, 1, 6, 4, 12, 3],
    [0, 16, 14, 1, 0, 4, 0, 6, 0, 3, 0, 15, 0, 8, 0, 0],
    [1, 6, 5, 12, 0, 0, 11, 0, 0, 9, 8, 0, 0, 0, 0, 0],
    [0, 0, 0, 7, 14, 1, 8, 0, 0, 15, 6, 0, 13, 5, 0, 4],
    [4, 15, 8, 0, 9, 13, 0, 0, 0, 0, 7, 16, 3, 0, 0, 0],
    [0, 9, 13, 0, 0, 0, 0, 15, 10, 0, 0, 0, 7, 6, 0, 11],
    [14, 0, 6, 11, 0, 0, 0, 12, 7, 0, 0, 0, 0, 3, 13, 0],
    [0, 0, 0, 5, 8, 14, 0, 0, 0, 0, 13, 11, 0, 1, 2, 6],
    [13, 0, 16, 4, 0, 15, 5, 0, 0, 1, 12, 6, 8, 0, 0, 0],
    [0, 0, 0, 0, 0, 16, 10, 0, 0, 8, 0, 0, 11, 9, 4, 5],
    [0, 0, 11, 0, 1, 0, 14, 0, 5, 0, 3, 0, 15, 7, 16, 0],
    [5, 13, 15, 3, 16, 0, 4, 7, 0, 0, 0, 0, 0, 2, 0, 0],
    [16, 1, 0, 0, 0, 0, 12, 2, 14, 0, 15, 0, 0, 0, 3, 8],
    [9, 0, 0, 0, 13, 5, 0, 0, 8, 6, 16, 0, 0, 0, 10, 0],
];

/// Supported board sides.
#[derive(Debug, Clone, PartialEq, Eq, Copy, PartialOrd, Ord, Hash)]
pub enum Size {
    /// 4x4 with 2x2 boxes.
    Four = 4,
    /// 9x9 with 3x3 boxes.
    Nine = 9,
    /// 16x16 with 4x4 boxes.
    Sixteen = 16,
    /// 25x25 with 5x5 boxes.
    TwentyFive = 25,
}

impl TryFrom<usize> for Size {
    type Error = PuzzleError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            9 => Ok(Self::Nine),
            16 => Ok(Self::Sixteen),
            25 => Ok(Self::TwentyFive),
            _ => Err(PuzzleError::InvalidSize(value)),
        }
    }
}

impl From<Size> for usize {
    fn from(size: Size) -> Self {
        size as Self
    }
}

impl Size {
    /// Side of one box.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Four => 2,
            Self::Nine => 3,
            Self::Sixteen => 4,
            Self::TwentyFive => 5,
        }
    }
}

/// Every row, column and box as a labelled list of cells.
fn units(size: Size) -> Vec<(String, Vec<(usize, usize)>)> {
    let n = usize::from(size);
    let b = size.block_size();
    let rows = (0..n).map(|r| (format!("row {r}"), (0..n).map(|c| (r, c)).collect_vec()));
    let cols = (0..n).map(|c| (format!("column {c}"), (0..n).map(|r| (r, c)).collect_vec()));
    let boxes = (0..n)
        .step_by(b)
        .cartesian_product((0..n).step_by(b))
        .map(|(br, bc)| {
            (
                format!("box ({br},{bc})"),
                (br..br + b).cartesian_product(bc..bc + b).collect_vec(),
            )
        });
    rows.chain(cols).chain(boxes).collect()
}

fn validate_shape(board: &Board) -> Result<Size, PuzzleError> {
    let n = board.0.len();
    let size = Size::try_from(n)?;
    if let Some(row) = board.0.iter().find(|row| row.len() != n) {
        return Err(PuzzleError::DimensionMismatch {
            expected: n,
            found: format!("a row of length {}", row.len()),
        });
    }
    Ok(size)
}

fn validate_range(board: &Board, size: Size) -> Result<(), PuzzleError> {
    let max = usize::from(size);
    match board.givens().find(|&(_, v)| v > max) {
        Some(((row, col), value)) => Err(PuzzleError::GivenOutOfRange {
            row,
            col,
            value,
            max,
        }),
        None => Ok(()),
    }
}

fn validate_distinct(board: &Board, size: Size) -> Result<(), PuzzleError> {
    let n = usize::from(size);
    for (unit, cells) in units(size) {
        let mut seen = vec![false; n + 1];
        for (r, c) in cells {
            let v = board.0[r][c];
            if v != 0 && std::mem::replace(&mut seen[v], true) {
                return Err(PuzzleError::DuplicateGiven { value: v, unit });
            }
        }
    }
    Ok(())
}

/// A validated Sudoku instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sudoku {
    board: Board,
    size: Size,
}

impl Sudoku {
    /// Validates the givens: a supported square size, values in `0..=n`, and
    /// no repeated given within a row, column or box.
    ///
    /// # Errors
    ///
    /// The first violation found, as a [`PuzzleError`].
    pub fn new(board: impl Into<Board>) -> Result<Self, PuzzleError> {
        let sudoku = Self::new_unchecked(board)?;
        validate_distinct(&sudoku.board, sudoku.size)?;
        Ok(sudoku)
    }

    /// Like [`Sudoku::new`] but lets contradictory givens through, so the
    /// engine decides them.
    ///
    /// # Errors
    ///
    /// Shape and range violations.
    pub fn new_unchecked(board: impl Into<Board>) -> Result<Self, PuzzleError> {
        let board = board.into();
        let size = validate_shape(&board)?;
        validate_range(&board, size)?;
        Ok(Self { board, size })
    }

    /// The givens.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The board side.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Declares one `[1, n]` variable per cell and asserts the row, column,
    /// box and given constraints.
    ///
    /// # Errors
    ///
    /// Engine failures while declaring or asserting.
    pub fn encode(&self, session: &mut Session) -> Result<Grid<IntVar>, PuzzleError> {
        let n = usize::from(self.size);
        #[allow(clippy::cast_possible_wrap)]
        let cells = declare_grid(session, "board", n, n, 1, n as i64)?;

        for (_, unit) in units(self.size) {
            session.assert(all_different(unit.into_iter().map(|pos| cells[pos])))?;
        }
        for (pos, v) in self.board.givens() {
            #[allow(clippy::cast_possible_wrap)]
            let v = v as i64;
            session.assert(eq(cells[pos], v))?;
        }
        Ok(cells)
    }

    /// # Errors
    ///
    /// Engine failures; an unsolvable board is [`Outcome::Infeasible`].
    pub fn solve(&self) -> Result<Outcome<Board>, PuzzleError> {
        self.solve_with(EngineConfig::default())
    }

    /// # Errors
    ///
    /// See [`Sudoku::solve`].
    pub fn solve_with(&self, config: EngineConfig) -> Result<Outcome<Board>, PuzzleError> {
        self.solve_in(&mut Session::new(config))
    }

    /// Solves in a caller-provided session, leaving its statistics readable.
    /// The cell variables are declared by name, so each call needs a fresh
    /// session.
    ///
    /// # Errors
    ///
    /// See [`Sudoku::solve`]; a reused session fails with
    /// `DuplicateVariable`.
    pub fn solve_in(&self, session: &mut Session) -> Result<Outcome<Board>, PuzzleError> {
        let cells = self.encode(session)?;
        log::debug!(
            "sudoku {n}x{n} with {} givens",
            self.board.givens().count(),
            n = usize::from(self.size)
        );
        conclude(session, |s| {
            extract_grid(s, &cells).and_then(|values| Board::from_values(&values, self.size))
        })
    }

    /// The compiled CNF, for DIMACS export.
    ///
    /// # Errors
    ///
    /// Engine failures while encoding.
    pub fn to_cnf(&self) -> Result<Cnf, PuzzleError> {
        let mut session = Session::default();
        self.encode(&mut session)?;
        Ok(session.cnf()?)
    }
}

impl TryFrom<Board> for Sudoku {
    type Error = PuzzleError;

    fn try_from(board: Board) -> Result<Self, Self::Error> {
        Self::new(board)
    }
}

impl From<Sudoku> for Board {
    fn from(sudoku: Sudoku) -> Self {
        sudoku.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_conversions() {
        assert_eq!(Size::try_from(16), Ok(Size::Sixteen));
        assert_eq!(Size::try_from(8), Err(PuzzleError::InvalidSize(8)));
        assert_eq!(usize::from(Size::TwentyFive), 25);
        assert_eq!(Size::Nine.block_size(), 3);
    }

    #[test]
    fn test_units() {
        let u = units(Size::Four);
        assert_eq!(u.len(), 12);
        assert!(u.iter().all(|(_, cells)| cells.len() == 4));
        assert_eq!(u[8].1, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(u[11].1, vec![(2, 2), (2, 3), (3, 2), (3, 3)]);
    }

    #[test]
    fn test_parse_digits() {
        let board: Board = "1... .4.1\n..4. .2.3".parse().unwrap();
        assert_eq!(board, Board::from(EXAMPLE_FOUR));
    }

    #[test]
    fn test_parse_separated() {
        let text = EXAMPLE_SIXTEEN
            .iter()
            .map(|row| row.iter().join(","))
            .join("\n");
        let board: Board = text.parse().unwrap();
        assert_eq!(board, Board::from(EXAMPLE_SIXTEEN));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("12x4".parse::<Board>(), Err(PuzzleError::Parse(_))));
        assert!(matches!("123".parse::<Board>(), Err(PuzzleError::Parse(_))));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Sudoku::new(vec![vec![0; 3]; 3]),
            Err(PuzzleError::InvalidSize(3))
        );
        assert!(matches!(
            Sudoku::new(vec![vec![0; 4], vec![0; 4], vec![0; 3], vec![0; 4]]),
            Err(PuzzleError::DimensionMismatch { expected: 4, .. })
        ));

        let mut board = EXAMPLE_NINE;
        board[0][0] = 10;
        assert_eq!(
            Sudoku::new(board),
            Err(PuzzleError::GivenOutOfRange {
                row: 0,
                col: 0,
                value: 10,
                max: 9
            })
        );

        let mut board = EXAMPLE_NINE;
        board[0][0] = 9;
        assert_eq!(
            Sudoku::new(board),
            Err(PuzzleError::DuplicateGiven {
                value: 9,
                unit: "row 0".to_string()
            })
        );
        assert!(Sudoku::new_unchecked(board).is_ok());
    }

    #[test]
    fn test_solve_four() {
        let givens = Board::from(EXAMPLE_FOUR);
        let solved = Sudoku::new(givens.clone())
            .unwrap()
            .solve()
            .unwrap()
            .solved()
            .unwrap();
        assert!(solved.is_solution_of(&givens));
        assert_eq!(
            solved,
            Board::from([[1, 3, 2, 4], [2, 4, 3, 1], [3, 1, 4, 2], [4, 2, 1, 3]])
        );
    }

    #[test]
    fn test_solve_nine() {
        let givens = Board::from(EXAMPLE_NINE);
        let outcome = Sudoku::new(givens.clone()).unwrap().solve().unwrap();
        assert!(outcome.solved().unwrap().is_solution_of(&givens));
    }

    #[test]
    fn test_contradictory_givens_are_infeasible() {
        let mut board = EXAMPLE_FOUR;
        board[0][1] = 1;
        let outcome = Sudoku::new_unchecked(board).unwrap().solve().unwrap();
        assert_eq!(outcome, Outcome::Infeasible);
    }

    #[test]
    fn test_is_solution_of_rejects() {
        let givens = Board::from(EXAMPLE_FOUR);
        let good = Board::from([[1, 3, 2, 4], [2, 4, 3, 1], [3, 1, 4, 2], [4, 2, 1, 3]]);
        assert!(good.is_solution_of(&givens));
        let swapped = Board::from([[3, 1, 2, 4], [2, 4, 3, 1], [1, 3, 4, 2], [4, 2, 1, 3]]);
        assert!(!swapped.is_solution_of(&givens));
        assert!(!givens.is_solution_of(&givens));
    }

    #[test]
    fn test_decoded_values_must_be_in_range() {
        let values = Grid::from_fn(4, 4, |r, c| i64::try_from((r + c) % 4 + 1).unwrap());
        let board = Board::from_values(&values, Size::Four).unwrap();
        assert_eq!(board.get(1, 3), Some(1));

        let mut values = values;
        values[(2, 1)] = -1;
        assert_eq!(
            Board::from_values(&values, Size::Four),
            Err(PuzzleError::CellOutOfRange {
                row: 2,
                col: 1,
                value: -1,
                max: 4
            })
        );
        values[(2, 1)] = 0;
        assert!(Board::from_values(&values, Size::Four).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Board::from(EXAMPLE_FOUR).to_string(),
            "1 0 0 0\n0 4 0 1\n0 0 4 0\n0 2 0 3\n"
        );
    }

    #[test]
    fn test_to_cnf_header() {
        let cnf = Sudoku::new(EXAMPLE_FOUR).unwrap().to_cnf().unwrap();
        assert!(cnf.to_string().starts_with("p cnf "));
        assert!(!cnf.is_empty());
    }
}
