use serde::{Deserialize, Serialize};

/// Number of cells on a 3x3 board.
pub const CELL_COUNT: usize = 9;

/// A trio of cell indexes that wins the match when one mark claims all three.
pub type IndexTrio = [usize; 3];

/// Every winnable trio, in the order they are checked.
pub const WINNABLE_INDEX_TRIOS: [IndexTrio; 8] = [
    [0, 3, 6], // column 1
    [1, 4, 7], // column 2
    [2, 5, 8], // column 3
    [0, 4, 8], // diagonal 1
    [2, 4, 6], // diagonal 2
    [0, 1, 2], // row 1
    [3, 4, 5], // row 2
    [6, 7, 8], // row 3
];

/// Mark placed by a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Mark {
    O,
    X,
}

impl Mark {
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::O => "O",
            Mark::X => "X",
        }
    }
}

/// Contents of a single cell. Serialized as `"O"`, `"X"` or `""`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Claimed(Mark),
}

impl Cell {
    pub fn is_occupied(self) -> bool {
        matches!(self, Cell::Claimed(_))
    }

    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Claimed(mark) => Some(mark),
            Cell::Empty => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cell::Claimed(mark) => mark.as_str(),
            Cell::Empty => "",
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "" => Ok(Cell::Empty),
            "O" => Ok(Cell::Claimed(Mark::O)),
            "X" => Ok(Cell::Claimed(Mark::X)),
            other => Err(serde::de::Error::custom(format!(
                "invalid cell value: {other}"
            ))),
        }
    }
}

/// Outcome of judging a board snapshot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Judgement {
    pub has_ended: bool,
    pub winning_trio: Option<IndexTrio>,
}

/// The 3x3 grid plus the trio that won it, if any.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    cells: [Cell; CELL_COUNT],
    winning_index_trio: Option<IndexTrio>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw cells. Used to judge arbitrary snapshots.
    pub fn from_cells(cells: [Cell; CELL_COUNT]) -> Self {
        Self {
            cells,
            winning_index_trio: None,
        }
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn winning_index_trio(&self) -> Option<IndexTrio> {
        self.winning_index_trio
    }

    /// Returns `false` for indexes outside the board.
    pub fn is_occupied(&self, index: usize) -> bool {
        self.cell(index).is_some_and(Cell::is_occupied)
    }

    pub fn judge(&self) -> Judgement {
        evaluate(&self.cells)
    }

    /// Claims an empty cell. Claimed cells are never overwritten.
    pub(crate) fn claim(&mut self, index: usize, mark: Mark) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if !cell.is_occupied() => {
                *cell = Cell::Claimed(mark);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn record_winning_trio(&mut self, trio: IndexTrio) {
        self.winning_index_trio = Some(trio);
    }
}

/// Judges a board snapshot.
///
/// Trios are checked in [`WINNABLE_INDEX_TRIOS`] order and the first trio fully claimed
/// by one mark is reported. Without a winner the match has ended only once every cell
/// is occupied.
///
/// # Examples
///
/// ```
/// use tictac_engine::board::{evaluate, Cell, Mark};
///
/// let o = Cell::Claimed(Mark::O);
/// let x = Cell::Claimed(Mark::X);
/// let e = Cell::Empty;
///
/// let judgement = evaluate(&[o, o, o, x, x, e, e, e, e]);
/// assert!(judgement.has_ended);
/// assert_eq!(judgement.winning_trio, Some([0, 1, 2]));
///
/// let judgement = evaluate(&[o, x, e, e, e, e, e, e, e]);
/// assert!(!judgement.has_ended);
/// ```
pub fn evaluate(cells: &[Cell; CELL_COUNT]) -> Judgement {
    let winning_trio = WINNABLE_INDEX_TRIOS.iter().copied().find(|trio| {
        let [a, b, c] = trio.map(|index| cells[index]);
        a.is_occupied() && a == b && b == c
    });

    let has_ended = winning_trio.is_some() || cells.iter().all(|cell| cell.is_occupied());

    Judgement {
        has_ended,
        winning_trio,
    }
}
