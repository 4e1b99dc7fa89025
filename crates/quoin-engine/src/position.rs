//! Position adapter — the board collaborator the search works against.
//!
//! Wraps the copy-make `chess::Board` in an explicit stack so the search gets
//! balanced make/unmake semantics: every `make_move` pushes a board, every
//! `unmake_move` pops one, and the pairing is asserted in debug builds.

use std::str::FromStr;

use chess::{Board, ChessMove, Color, Piece, EMPTY};

use crate::eval;
use crate::search::negamax::MATE_SCORE;

/// Index a `[T; 2]` side pair by color (White = 0, Black = 1).
pub(crate) fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

/// A game position plus the trail of boards the search has made moves on.
///
/// The bottom of the stack is the game position being searched; everything
/// above it is search-transient and unwound by `unmake_move`.
#[derive(Debug, Clone)]
pub struct Position {
    stack: Vec<Board>,
    base_ply: u32,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self {
            stack: vec![Board::default()],
            base_ply: 0,
        }
    }

    /// Parse a FEN string.
    ///
    /// The game ply is reconstructed from the side-to-move and fullmove
    /// fields, since the board itself does not carry move counters.
    pub fn from_fen(fen: &str) -> Result<Self, chess::Error> {
        let board = Board::from_str(fen)?;
        let fullmove: u32 = fen
            .split_whitespace()
            .nth(5)
            .and_then(|field| field.parse().ok())
            .unwrap_or(1);
        let base_ply = 2 * fullmove.saturating_sub(1)
            + u32::from(board.side_to_move() == Color::Black);
        Ok(Self {
            stack: vec![board],
            base_ply,
        })
    }

    /// The current board (top of the stack).
    pub fn board(&self) -> &Board {
        self.stack.last().expect("position stack is never empty")
    }

    /// Zobrist key of the current board.
    pub fn key(&self) -> u64 {
        self.board().get_hash()
    }

    pub fn side_to_move(&self) -> Color {
        self.board().side_to_move()
    }

    /// Whether the side to move is in check.
    pub fn in_check(&self) -> bool {
        *self.board().checkers() != EMPTY
    }

    /// Half-moves played since the start of the game, counting moves applied
    /// with [`play`](Self::play) but not search-transient makes.
    pub fn game_ply(&self) -> u32 {
        self.base_ply
    }

    /// Play a game move: apply it permanently and collapse the stack.
    pub fn play(&mut self, mv: ChessMove) {
        let next = self.board().make_move_new(mv);
        self.stack.clear();
        self.stack.push(next);
        self.base_ply += 1;
    }

    /// Make a move for the search. Paired with [`unmake_move`](Self::unmake_move).
    pub fn make_move(&mut self, mv: ChessMove) {
        let next = self.board().make_move_new(mv);
        self.stack.push(next);
    }

    /// Undo the most recent [`make_move`](Self::make_move).
    pub fn unmake_move(&mut self) {
        debug_assert!(
            self.stack.len() > 1,
            "unmake_move without a matching make_move"
        );
        self.stack.pop();
    }

    /// Whether `mv` is a capture or a promotion.
    ///
    /// En passant lands on an empty square, so it is recognized as a pawn
    /// switching files instead of by the destination's occupancy.
    pub fn is_capture_or_promotion(&self, mv: ChessMove) -> bool {
        if mv.get_promotion().is_some() {
            return true;
        }
        let board = self.board();
        if board.piece_on(mv.get_dest()).is_some() {
            return true;
        }
        board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && mv.get_source().get_file() != mv.get_dest().get_file()
    }

    /// Static evaluation from the side to move's perspective.
    pub fn evaluate(&self) -> i32 {
        let white = eval::evaluate(self.board());
        match self.side_to_move() {
            Color::White => white,
            Color::Black => -white,
        }
    }

    /// Score for a node with no legal moves: mate at distance `ply` when in
    /// check, otherwise stalemate.
    pub fn evaluate_leaf(&self, ply: usize) -> i32 {
        if self.in_check() {
            -(MATE_SCORE - ply as i32)
        } else {
            0
        }
    }
}
