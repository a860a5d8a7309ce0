use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::CoreError;
use crate::types::{Cell, Position, Side};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Scan order for flips: NW, N, NE, W, E, SW, S, SE.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// For every square and direction, the squares out to the edge, nearest first.
static RAYS: Lazy<[[Vec<u8>; 8]; NUM_SQUARES]> = Lazy::new(|| {
    std::array::from_fn(|pos| {
        let (row, col) = pos_to_row_col(pos);
        std::array::from_fn(|dir| {
            let (dr, dc) = DIRECTIONS[dir];
            let mut ray = Vec::with_capacity(BOARD_SIZE - 1);
            let (mut r, mut c) = (row + dr, col + dc);
            while in_bounds(r, c) {
                ray.push((r as usize * BOARD_SIZE + c as usize) as u8);
                r += dr;
                c += dc;
            }
            ray
        })
    })
});

/// Othello board represented by two disjoint bitboards.
///
/// Bit `row * 8 + col` is set in `black` or `white` when that square holds a
/// disc of the corresponding colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    pub fn empty() -> Self {
        Self { black: 0, white: 0 }
    }

    /// Builds a board from raw masks. A square set in both masks stays black.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        debug_assert_eq!(black & white, 0, "bitboards overlap");
        Self {
            black,
            white: white & !black,
        }
    }

    /// Returns `(black, white)` masks.
    pub fn bitboards(&self) -> (u64, u64) {
        (self.black, self.white)
    }

    pub fn cell(&self, pos: usize) -> Cell {
        let square = bit(pos);
        if (self.black & square) != 0 {
            Cell::Disc(Side::Black)
        } else if (self.white & square) != 0 {
            Cell::Disc(Side::White)
        } else {
            Cell::Empty
        }
    }

    /// Returns legal move mask for the given side.
    pub fn legal_moves(&self, side: Side) -> u64 {
        let (me, opp) = self.split(side);
        let occupied = me | opp;

        (0..NUM_SQUARES)
            .filter(|&pos| (occupied & bit(pos)) == 0)
            .filter(|&pos| Self::collect_flips(pos, me, opp) != 0)
            .fold(0u64, |legal, pos| legal | bit(pos))
    }

    pub fn has_legal_move(&self, side: Side) -> bool {
        self.legal_moves(side) != 0
    }

    /// Mask of discs `side` would capture by playing at `pos`; 0 when illegal.
    pub fn flips(&self, pos: usize, side: Side) -> u64 {
        let (me, opp) = self.split(side);
        Self::collect_flips(pos, me, opp)
    }

    /// Captured squares in direction-scan order, nearest disc first.
    pub fn flip_squares(&self, pos: usize, side: Side) -> Vec<usize> {
        let (me, opp) = self.split(side);
        if pos >= NUM_SQUARES || ((me | opp) & bit(pos)) != 0 {
            return Vec::new();
        }

        let mut out = Vec::new();
        for ray in &RAYS[pos] {
            let run = ray_flips(ray, me, opp);
            if run != 0 {
                out.extend(
                    ray.iter()
                        .map(|&sq| sq as usize)
                        .filter(|&sq| (run & bit(sq)) != 0),
                );
            }
        }
        out
    }

    /// Places one disc and flips captured discs.
    /// Returns flipped bit mask. Returns 0 (board untouched) when move is illegal.
    pub fn place(&mut self, pos: usize, side: Side) -> u64 {
        let (me, opp) = self.split(side);

        let flips = Self::collect_flips(pos, me, opp);
        if flips == 0 {
            return 0;
        }

        let next_me = me | bit(pos) | flips;
        let next_opp = opp & !flips;

        match side {
            Side::Black => {
                self.black = next_me;
                self.white = next_opp;
            }
            Side::White => {
                self.white = next_me;
                self.black = next_opp;
            }
        }

        flips
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    pub fn count_of(&self, side: Side) -> u8 {
        let (me, _) = self.split(side);
        me.count_ones() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count();
        NUM_SQUARES as u8 - black_count - white_count
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        std::array::from_fn(|pos| self.cell(pos).code())
    }

    /// Text diagram with row/column indices; squares in `hints` show as `*`.
    pub fn render(&self, hints: u64) -> String {
        let header: String = std::iter::once(' ')
            .chain((0..BOARD_SIZE).map(|c| char::from(b'0' + c as u8)))
            .collect();

        let mut out = String::with_capacity((BOARD_SIZE + 3) * (BOARD_SIZE + 2));
        out.push_str(&header);
        out.push('\n');
        for row in 0..BOARD_SIZE {
            let label = char::from(b'0' + row as u8);
            out.push(label);
            for col in 0..BOARD_SIZE {
                let pos = row * BOARD_SIZE + col;
                out.push(match self.cell(pos) {
                    Cell::Disc(side) => side.symbol(),
                    Cell::Empty if (hints & bit(pos)) != 0 => '*',
                    Cell::Empty => '.',
                });
            }
            out.push(label);
            out.push('\n');
        }
        out.push_str(&header);
        out
    }

    fn split(&self, side: Side) -> (u64, u64) {
        match side {
            Side::Black => (self.black, self.white),
            Side::White => (self.white, self.black),
        }
    }

    fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
        if pos >= NUM_SQUARES {
            return 0;
        }
        if ((me | opp) & bit(pos)) != 0 {
            return 0;
        }

        RAYS[pos]
            .iter()
            .fold(0u64, |flips, ray| flips | ray_flips(ray, me, opp))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

/// Parses eight rows of eight cells: `.` empty, `X`/`B` black, `O`/`W` white.
/// Blank lines and surrounding whitespace are ignored.
impl FromStr for Board {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(CoreError::ParseBoard(format!(
                "expected {BOARD_SIZE} rows, got {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() != BOARD_SIZE {
                return Err(CoreError::ParseBoard(format!(
                    "row {row} has {} cells",
                    cells.len()
                )));
            }
            for (col, cell) in cells.into_iter().enumerate() {
                let square = bit(row * BOARD_SIZE + col);
                match cell.to_ascii_uppercase() {
                    '.' => {}
                    'X' | 'B' => board.black |= square,
                    'O' | 'W' => board.white |= square,
                    other => {
                        return Err(CoreError::ParseBoard(format!(
                            "unexpected '{other}' at row {row}, col {col}"
                        )));
                    }
                }
            }
        }
        Ok(board)
    }
}

/// Opponent run along `ray` closed by one of `me`'s discs, else 0.
fn ray_flips(ray: &[u8], me: u64, opp: u64) -> u64 {
    let mut line = 0u64;
    for &sq in ray {
        let square = bit(sq as usize);
        if (opp & square) != 0 {
            line |= square;
        } else if (me & square) != 0 {
            return line;
        } else {
            return 0;
        }
    }
    0
}

pub(crate) fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

/// Set bits of `mask` in ascending (row-major) order.
pub fn squares(mut mask: u64) -> impl Iterator<Item = usize> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let pos = mask.trailing_zeros() as usize;
        mask &= mask - 1;
        Some(pos)
    })
}

pub(crate) fn positions(mask: u64) -> Vec<Position> {
    squares(mask).map(Position::from_index).collect()
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
