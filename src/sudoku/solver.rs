use crate::sat::cnf::{self, Clause, Cnf, Literal};
use crate::sat::dimacs;
use crate::sat::gateway::{GatewayError, SatSolver, Verdict};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Side length of the grid; the encoding is fixed to classic 9x9 Sudoku.
pub const SIZE: usize = 9;

const BLOCK: usize = 3;

/// Size of the variable space: one variable per (row, col, digit) triple.
pub const NUM_VARS: usize = SIZE * SIZE * SIZE;

/// A 9x9 grid of digits in `[0, 9]`, where 0 means "empty".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board([[u8; SIZE]; SIZE]);

/// One problem-domain atom: "cell (row, col) holds digit".
///
/// Rows and columns are zero-based in `[0, 9)`, digits are in `[1, 9]`.
/// Atoms outside those bounds are a caller contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    pub row: usize,
    pub col: usize,
    pub digit: usize,
}

impl Variable {
    #[must_use]
    pub const fn new(row: usize, col: usize, digit: usize) -> Self {
        Self { row, col, digit }
    }

    /// Maps the atom onto its CNF variable, a bijection onto `[1, 729]`.
    #[must_use]
    pub const fn encode(self) -> usize {
        self.row * SIZE * SIZE + self.col * SIZE + (self.digit - 1) + 1
    }

    /// Exact algebraic inverse of [`Variable::encode`].
    #[must_use]
    pub const fn decode(var: usize) -> Self {
        let offset = var - 1;
        Self {
            row: offset / (SIZE * SIZE),
            col: (offset / SIZE) % SIZE,
            digit: offset % SIZE + 1,
        }
    }

    fn literal(self) -> Literal {
        i32::try_from(self.encode()).expect("variable exceeds literal range")
    }
}

fn generate_cell_clauses() -> Vec<Clause> {
    let mut clauses = vec![];
    for row in 0..SIZE {
        for col in 0..SIZE {
            let vars: Vec<Literal> = (1..=SIZE)
                .map(|digit| Variable::new(row, col, digit).literal())
                .collect();
            clauses.extend(cnf::exactly_one(&vars));
        }
    }
    clauses
}

fn generate_row_clauses() -> Vec<Clause> {
    let mut clauses = vec![];
    for row in 0..SIZE {
        for digit in 1..=SIZE {
            let vars: Vec<Literal> = (0..SIZE)
                .map(|col| Variable::new(row, col, digit).literal())
                .collect();
            clauses.extend(cnf::exactly_one(&vars));
        }
    }
    clauses
}

fn generate_column_clauses() -> Vec<Clause> {
    let mut clauses = vec![];
    for col in 0..SIZE {
        for digit in 1..=SIZE {
            let vars: Vec<Literal> = (0..SIZE)
                .map(|row| Variable::new(row, col, digit).literal())
                .collect();
            clauses.extend(cnf::exactly_one(&vars));
        }
    }
    clauses
}

fn generate_box_clauses() -> Vec<Clause> {
    let mut clauses = vec![];
    for band in 0..BLOCK {
        for stack in 0..BLOCK {
            for digit in 1..=SIZE {
                let mut vars = Vec::with_capacity(SIZE);
                for r in 0..BLOCK {
                    for c in 0..BLOCK {
                        let row = band * BLOCK + r;
                        let col = stack * BLOCK + c;
                        vars.push(Variable::new(row, col, digit).literal());
                    }
                }
                clauses.extend(cnf::exactly_one(&vars));
            }
        }
    }
    clauses
}

/// One unit clause per pre-filled cell, forcing that assignment.
fn generate_given_clauses(board: &Board) -> Vec<Clause> {
    let mut clauses = vec![];
    for (row, cells) in board.0.iter().enumerate() {
        for (col, &digit) in cells.iter().enumerate() {
            if digit != 0 {
                let var = Variable::new(row, col, digit as usize);
                clauses.push(Clause::from_slice(&[var.literal()]));
            }
        }
    }
    clauses
}

impl Board {
    #[must_use]
    pub const fn new(cells: [[u8; SIZE]; SIZE]) -> Self {
        Self(cells)
    }

    /// Builds the full clause base for this grid: the four exactly-one
    /// constraint families over the fixed 729-variable space, then the unit
    /// clauses for the givens.
    #[must_use]
    pub fn to_cnf(&self) -> Cnf {
        let clauses = generate_cell_clauses()
            .into_iter()
            .chain(generate_row_clauses())
            .chain(generate_column_clauses())
            .chain(generate_box_clauses())
            .chain(generate_given_clauses(self))
            .collect();

        Cnf::new(NUM_VARS, clauses)
    }

    /// Reconstructs a grid from a satisfying assignment.
    ///
    /// Only positive literals carry information; each one is inverted back to
    /// its (row, col, digit) atom. The exactly-one constraints guarantee at
    /// most one positive literal per cell, so no uniqueness check is repeated
    /// here.
    #[must_use]
    pub fn decode_model(model: &[Literal]) -> Self {
        let mut cells = [[0; SIZE]; SIZE];
        for &lit in model.iter().filter(|&&lit| lit > 0) {
            let var = Variable::decode(lit.unsigned_abs() as usize);
            cells[var.row][var.col] =
                u8::try_from(var.digit).expect("digit exceeds cell range");
        }
        Self(cells)
    }

    /// Encodes the grid, hands the DIMACS file to the solver and decodes the
    /// model.
    ///
    /// `Ok(None)` means the solver proved the grid unsolvable, a legitimate
    /// outcome distinct from the error cases.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] when the CNF file cannot be written or the
    /// solver cannot produce a verdict.
    pub fn solve(
        &self,
        solver: &dyn SatSolver,
        cnf_path: &Path,
    ) -> Result<Option<Self>, GatewayError> {
        let cnf = self.to_cnf();
        debug!(
            num_vars = cnf.num_vars,
            num_clauses = cnf.len(),
            "encoded grid"
        );
        dimacs::write_file(&cnf, cnf_path)?;

        match solver.solve(cnf_path)? {
            Verdict::Satisfiable(model) => Ok(Some(Self::decode_model(&model))),
            Verdict::Unsatisfiable => Ok(None),
        }
    }
}

impl From<[[u8; SIZE]; SIZE]> for Board {
    fn from(cells: [[u8; SIZE]; SIZE]) -> Self {
        Self::new(cells)
    }
}

impl From<Board> for [[u8; SIZE]; SIZE] {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// Errors from reading a grid out of its textual form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error("expected {SIZE} rows, found {rows}")]
    WrongRowCount { rows: usize },

    #[error("row {row} has {cells} cells, expected {SIZE}")]
    WrongCellCount { row: usize, cells: usize },

    #[error("unrecognised cell symbol {symbol:?}")]
    BadSymbol { symbol: char },
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Nine non-empty lines of nine symbols each; `1`-`9` are givens, `0`,
    /// `.` and `_` are empty cells. Whitespace inside a line is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() != SIZE {
            return Err(ParseBoardError::WrongRowCount { rows: lines.len() });
        }

        let mut cells = [[0; SIZE]; SIZE];
        for (row, line) in lines.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != SIZE {
                return Err(ParseBoardError::WrongCellCount {
                    row,
                    cells: symbols.len(),
                });
            }
            for (col, &symbol) in symbols.iter().enumerate() {
                cells[row][col] = match symbol {
                    '0' | '.' | '_' => 0,
                    '1'..='9' => symbol as u8 - b'0',
                    other => return Err(ParseBoardError::BadSymbol { symbol: other }),
                };
            }
        }

        Ok(Self(cells))
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row, cells) in self.0.iter().enumerate() {
            if row % BLOCK == 0 && row != 0 {
                writeln!(f, "{}", "-".repeat(21))?;
            }
            for (col, &cell) in cells.iter().enumerate() {
                if col % BLOCK == 0 && col != 0 {
                    write!(f, "| ")?;
                }
                if cell == 0 {
                    write!(f, ". ")?;
                } else {
                    write!(f, "{cell} ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The reference grid as literally given, with two 5s in its first row. It is
/// kept as a deliberate unsolvable fixture: encoding it must yield an
/// unsatisfiable instance, reported as such rather than silently "solved".
pub const EXAMPLE_CONFLICT: [[u8; SIZE]; SIZE] = [
    [5, 3, 5, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// The classic solvable puzzle (the conflict fixture with its first row fixed).
pub const EXAMPLE_CLASSIC: [[u8; SIZE]; SIZE] = [
    [5, 3, 0, 0, 7, 0, 0, 0, 0],
    [6, 0, 0, 1, 9, 5, 0, 0, 0],
    [0, 9, 8, 0, 0, 0, 0, 6, 0],
    [8, 0, 0, 0, 6, 0, 0, 0, 3],
    [4, 0, 0, 8, 0, 3, 0, 0, 1],
    [7, 0, 0, 0, 2, 0, 0, 0, 6],
    [0, 6, 0, 0, 0, 0, 2, 8, 0],
    [0, 0, 0, 4, 1, 9, 0, 0, 5],
    [0, 0, 0, 0, 8, 0, 0, 7, 9],
];

/// A grid with a single given digit; trivially satisfiable.
pub const EXAMPLE_ONE_GIVEN: [[u8; SIZE]; SIZE] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 1],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cnf::Model;

    /// The canonical solution of [`EXAMPLE_CLASSIC`].
    const CLASSIC_SOLUTION: [[u8; SIZE]; SIZE] = [
        [5, 3, 4, 6, 7, 8, 9, 1, 2],
        [6, 7, 2, 1, 9, 5, 3, 4, 8],
        [1, 9, 8, 3, 4, 2, 5, 6, 7],
        [8, 5, 9, 7, 6, 1, 4, 2, 3],
        [4, 2, 6, 8, 5, 3, 7, 9, 1],
        [7, 1, 3, 9, 2, 4, 8, 5, 6],
        [9, 6, 1, 5, 3, 7, 2, 8, 4],
        [2, 8, 7, 4, 1, 9, 6, 3, 5],
        [3, 4, 5, 2, 8, 6, 1, 7, 9],
    ];

    /// Builds the full 729-literal model a correct solver would return for a
    /// completely filled grid.
    fn model_of(cells: &[[u8; SIZE]; SIZE]) -> Model {
        (1..=NUM_VARS)
            .map(|var| {
                let atom = Variable::decode(var);
                let lit = i32::try_from(var).unwrap();
                if cells[atom.row][atom.col] as usize == atom.digit {
                    lit
                } else {
                    -lit
                }
            })
            .collect()
    }

    fn is_valid_solution(board: &Board) -> bool {
        let groups = |cells: &[[u8; SIZE]; SIZE]| {
            let mut ok = true;
            for i in 0..SIZE {
                let mut row_seen = [false; SIZE + 1];
                let mut col_seen = [false; SIZE + 1];
                for j in 0..SIZE {
                    let r = cells[i][j] as usize;
                    let c = cells[j][i] as usize;
                    ok &= (1..=SIZE).contains(&r) && !row_seen[r];
                    row_seen[r] = true;
                    ok &= (1..=SIZE).contains(&c) && !col_seen[c];
                    col_seen[c] = true;
                }
            }
            for band in 0..BLOCK {
                for stack in 0..BLOCK {
                    let mut seen = [false; SIZE + 1];
                    for r in 0..BLOCK {
                        for c in 0..BLOCK {
                            let v = cells[band * BLOCK + r][stack * BLOCK + c] as usize;
                            ok &= v >= 1 && !seen[v];
                            seen[v] = true;
                        }
                    }
                }
            }
            ok
        };
        groups(&board.0)
    }

    #[test]
    fn test_encode_spot_values() {
        assert_eq!(Variable::new(0, 0, 1).encode(), 1);
        assert_eq!(Variable::new(0, 0, 9).encode(), 9);
        assert_eq!(Variable::new(0, 1, 1).encode(), 10);
        assert_eq!(Variable::new(1, 0, 1).encode(), 82);
        assert_eq!(Variable::new(8, 8, 9).encode(), NUM_VARS);
    }

    #[test]
    fn test_encode_decode_roundtrip_over_full_domain() {
        for row in 0..SIZE {
            for col in 0..SIZE {
                for digit in 1..=SIZE {
                    let atom = Variable::new(row, col, digit);
                    assert_eq!(Variable::decode(atom.encode()), atom);
                }
            }
        }
    }

    #[test]
    fn test_decode_encode_roundtrip_over_full_range() {
        for var in 1..=NUM_VARS {
            assert_eq!(Variable::decode(var).encode(), var);
        }
    }

    #[test]
    fn test_empty_grid_clause_count() {
        // 4 constraint families x 81 groups x (1 + C(9,2)) clauses, no givens.
        let cnf = Board::new([[0; SIZE]; SIZE]).to_cnf();
        assert_eq!(cnf.num_vars, NUM_VARS);
        assert_eq!(cnf.len(), 4 * 81 * 37);
    }

    #[test]
    fn test_givens_add_one_unit_clause_each() {
        let base = Board::new([[0; SIZE]; SIZE]).to_cnf().len();
        let classic = Board::new(EXAMPLE_CLASSIC).to_cnf();
        assert_eq!(classic.len(), base + 30);

        let sparse = Board::new(EXAMPLE_ONE_GIVEN).to_cnf();
        assert_eq!(sparse.len(), base + 1);
        let unit = Clause::from_slice(&[Variable::new(8, 8, 1).literal()]);
        assert!(sparse.clauses.contains(&unit));
    }

    #[test]
    fn test_conflict_fixture_is_contradictory() {
        // The duplicated 5 forces two unit clauses whose variables also occur
        // negated together in a row pairwise clause, so no model satisfies
        // all three.
        let cnf = Board::new(EXAMPLE_CONFLICT).to_cnf();
        let first = Variable::new(0, 0, 5).literal();
        let second = Variable::new(0, 2, 5).literal();

        assert!(cnf.clauses.contains(&Clause::from_slice(&[first])));
        assert!(cnf.clauses.contains(&Clause::from_slice(&[second])));
        assert!(cnf.clauses.contains(&Clause::from_slice(&[-first, -second])));
    }

    #[test]
    fn test_classic_solution_model_satisfies_encoding() {
        let cnf = Board::new(EXAMPLE_CLASSIC).to_cnf();
        assert!(cnf.is_satisfied_by(&model_of(&CLASSIC_SOLUTION)));
    }

    #[test]
    fn test_classic_solution_model_violates_conflict_encoding() {
        let cnf = Board::new(EXAMPLE_CONFLICT).to_cnf();
        assert!(!cnf.is_satisfied_by(&model_of(&CLASSIC_SOLUTION)));
    }

    #[test]
    fn test_decode_model_recovers_grid_and_preserves_givens() {
        let decoded = Board::decode_model(&model_of(&CLASSIC_SOLUTION));
        assert_eq!(decoded, Board::new(CLASSIC_SOLUTION));
        assert!(is_valid_solution(&decoded));

        // Every given of the puzzle survives decoding unchanged.
        for row in 0..SIZE {
            for col in 0..SIZE {
                let given = EXAMPLE_CLASSIC[row][col];
                if given != 0 {
                    assert_eq!(decoded.0[row][col], given);
                }
            }
        }
    }

    #[test]
    fn test_single_given_grid_admits_a_full_solution() {
        // Relabelling digits of a valid solution keeps it valid; swapping
        // 1 and 9 puts a 1 in the bottom-right cell, matching the single
        // given of the sparse fixture.
        let mut swapped = CLASSIC_SOLUTION;
        for row in swapped.iter_mut() {
            for cell in row.iter_mut() {
                *cell = match *cell {
                    1 => 9,
                    9 => 1,
                    other => other,
                };
            }
        }

        let cnf = Board::new(EXAMPLE_ONE_GIVEN).to_cnf();
        let model = model_of(&swapped);
        assert!(cnf.is_satisfied_by(&model));

        let decoded = Board::decode_model(&model);
        assert!(is_valid_solution(&decoded));
        assert_eq!(decoded.0[8][8], 1);
    }

    #[test]
    fn test_solve_through_stub_solver() {
        struct Stub(Verdict);
        impl SatSolver for Stub {
            fn solve(&self, _: &Path) -> Result<Verdict, GatewayError> {
                Ok(self.0.clone())
            }
        }

        let path = std::env::temp_dir().join("sudoku_stub_test.cnf");
        let board = Board::new(EXAMPLE_CLASSIC);

        let stub = Stub(Verdict::Satisfiable(model_of(&CLASSIC_SOLUTION)));
        let solved = board.solve(&stub, &path).unwrap();
        assert_eq!(solved, Some(Board::new(CLASSIC_SOLUTION)));

        let stub = Stub(Verdict::Unsatisfiable);
        let unsolved = Board::new(EXAMPLE_CONFLICT).solve(&stub, &path).unwrap();
        assert_eq!(unsolved, None);
    }

    #[test]
    fn test_parse_board_from_text() {
        let text = "53..7....\n\
                    6..195...\n\
                    .98....6.\n\
                    8...6...3\n\
                    4..8.3..1\n\
                    7...2...6\n\
                    .6....28.\n\
                    ...419..5\n\
                    ....8..79";
        let board: Board = text.parse().unwrap();
        assert_eq!(board, Board::new(EXAMPLE_CLASSIC));
    }

    #[test]
    fn test_parse_board_rejects_bad_shapes() {
        assert_eq!(
            "123".parse::<Board>(),
            Err(ParseBoardError::WrongRowCount { rows: 1 })
        );

        let short_row = "53..7....\n\
                         6..195...\n\
                         .98....6.\n\
                         8...6...3\n\
                         4..8.3..1\n\
                         7...2...6\n\
                         .6....28.\n\
                         ...419..5\n\
                         ....8..7";
        assert_eq!(
            short_row.parse::<Board>(),
            Err(ParseBoardError::WrongCellCount { row: 8, cells: 8 })
        );

        let bad_symbol = "53..7...x\n\
                          6..195...\n\
                          .98....6.\n\
                          8...6...3\n\
                          4..8.3..1\n\
                          7...2...6\n\
                          .6....28.\n\
                          ...419..5\n\
                          ....8..79";
        assert_eq!(
            bad_symbol.parse::<Board>(),
            Err(ParseBoardError::BadSymbol { symbol: 'x' })
        );
    }

    #[test]
    fn test_display_marks_empty_cells_and_blocks() {
        let rendered = Board::new(EXAMPLE_CLASSIC).to_string();
        assert!(rendered.starts_with("5 3 . | . 7 . | . . . \n"));
        assert_eq!(rendered.matches("---------------------").count(), 2);
    }
}
