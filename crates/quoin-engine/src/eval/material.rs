//! Material balance.

use chess::{Board, Color, Piece, ALL_PIECES, NUM_PIECES};

/// Base piece values in centipawns, indexed by `Piece::to_index()`.
pub const PIECE_VALUE: [i32; NUM_PIECES] = [100, 320, 330, 500, 900, 0];

/// Centipawn value of a piece.
pub fn piece_value(piece: Piece) -> i32 {
    PIECE_VALUE[piece.to_index()]
}

/// Weighted material count from White's perspective.
pub fn material(board: &Board) -> i32 {
    let mut score = 0;
    for piece in ALL_PIECES {
        let bb = *board.pieces(piece);
        let white = (bb & *board.color_combined(Color::White)).popcnt() as i32;
        let black = (bb & *board.color_combined(Color::Black)).popcnt() as i32;
        score += piece_value(piece) * (white - black);
    }
    score
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chess::Board;

    use super::*;

    #[test]
    fn starting_material_is_even() {
        assert_eq!(material(&Board::default()), 0);
    }

    #[test]
    fn queen_for_rook_imbalance() {
        // White queen vs black rook.
        let board = Board::from_str("r3k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert_eq!(material(&board), piece_value(Piece::Queen) - piece_value(Piece::Rook));
    }

    #[test]
    fn kings_are_free() {
        assert_eq!(piece_value(Piece::King), 0);
    }
}
