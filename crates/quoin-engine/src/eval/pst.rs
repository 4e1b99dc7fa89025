//! Piece-square tables.
//!
//! Tables are written from White's perspective in LERF order: index 0 = A1,
//! index 7 = H1, index 63 = H8. Black lookups flip the rank with `index ^ 56`.

use chess::{Board, Color, Piece};

#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_PST: [i32; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

const TABLES: [&[i32; 64]; 6] = [
    &PAWN_PST,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_PST,
];

/// Piece-square value for one piece of the given color.
pub fn pst_value(piece: Piece, color: Color, square_index: usize) -> i32 {
    let index = match color {
        Color::White => square_index,
        Color::Black => square_index ^ 56,
    };
    TABLES[piece.to_index()][index]
}

/// Piece-square contribution of every piece on the board, from White's
/// perspective.
pub fn psqt(board: &Board) -> i32 {
    let mut score = 0;
    for square in *board.combined() {
        let piece = match board.piece_on(square) {
            Some(piece) => piece,
            None => continue,
        };
        let color = match board.color_on(square) {
            Some(color) => color,
            None => continue,
        };
        let value = pst_value(piece, color, square.to_index());
        score += match color {
            Color::White => value,
            Color::Black => -value,
        };
    }
    score
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chess::Board;

    use super::*;

    #[test]
    fn starting_psqt_is_even() {
        assert_eq!(psqt(&Board::default()), 0);
    }

    #[test]
    fn black_lookup_mirrors_white() {
        // A white knight on f3 (21) equals a black knight on f6 (45).
        assert_eq!(
            pst_value(Piece::Knight, Color::White, 21),
            pst_value(Piece::Knight, Color::Black, 21 ^ 56)
        );
    }

    #[test]
    fn centralized_knight_beats_rim_knight() {
        let central = Board::from_str("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let rim = Board::from_str("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();
        assert!(psqt(&central) > psqt(&rim));
    }
}
