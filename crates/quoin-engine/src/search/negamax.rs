//! Negamax alpha-beta with transposition probing and quiescence leaves.
//!
//! Cancellation is the only failure mode: `None` bubbles up the recursion
//! and every call site checks it before touching the value. A cancelled node
//! stores nothing and updates no heuristics.

use std::sync::atomic::Ordering;

use chess::ChessMove;

use crate::search::ordering::MovePicker;
use crate::search::tt::Bound;
use crate::search::Searcher;

/// Score bound; never produced as a real evaluation.
pub const INF: i32 = 30_000;

/// Base score for checkmate; the actual score is `MATE_SCORE - ply`, so
/// nearer mates score higher.
pub const MATE_SCORE: i32 = 29_000;

/// Scores beyond this magnitude denote a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Ply ceiling for the search and the frame stack.
pub const MAX_PLY: usize = 64;

impl Searcher {
    /// True while the search may continue: stop flag unset and clock unspent.
    ///
    /// Called at every node entry. Depth 1 runs with limits disarmed so a
    /// best move always exists (see the driver).
    pub(super) fn check_search_limit(&self) -> bool {
        if !self.limits_armed {
            return true;
        }
        if self.stop.load(Ordering::Acquire) {
            return false;
        }
        self.time.within_limit()
    }

    /// One interior node of the negamax tree. Returns the side-to-move score,
    /// or `None` when the search was cancelled somewhere below.
    pub(super) fn search_node(
        &mut self,
        mut alpha: i32,
        beta: i32,
        ply: usize,
        depth_end: usize,
    ) -> Option<i32> {
        if !self.check_search_limit() {
            return None;
        }
        if ply >= depth_end {
            return self.quiescence(alpha, beta, ply);
        }

        debug_assert!(alpha < beta && -INF <= alpha && beta <= INF);
        self.stats.nodes += 1;

        let key = self.position.key();
        let entry = self.tt.probe(key, ply);
        if entry.is_some() {
            self.stats.tt_hit += 1;
        }

        let depth_to_go = depth_end - ply;
        if let Some(e) = entry {
            // A depth-adequate bound in the right direction settles this node
            // outright; the stored entry already covers it, so nothing new is
            // written.
            if usize::from(e.depth) >= depth_to_go {
                if e.score >= beta && matches!(e.bound, Bound::Lower | Bound::Exact) {
                    self.stats.tt_cut += 1;
                    return Some(e.score);
                }
                if e.score <= alpha && e.bound == Bound::Upper {
                    self.stats.tt_cut += 1;
                    return Some(e.score);
                }
            }
        }

        let in_check = self.position.in_check();
        let tt_move = entry.and_then(|e| e.best_move);
        let mut evaluation = entry.and_then(|e| e.eval);
        if evaluation.is_none() {
            evaluation = Some(self.position.evaluate());
        }

        let mut score = -INF;
        let mut best_move: Option<ChessMove> = None;
        let mut bound = Bound::Upper;
        let mut interrupted = false;
        let mut move_count = 0usize;
        let mut searched_quiets: Vec<ChessMove> = Vec::new();
        let mut searched_captures: Vec<ChessMove> = Vec::new();

        let killers = self.frames.frame(ply).killers;
        let mut picker =
            MovePicker::new(&self.position, &self.history, tt_move, killers, in_check, false);

        while let Some(mv) = picker.next() {
            move_count += 1;
            if self.position.is_capture_or_promotion(mv) {
                searched_captures.push(mv);
            } else {
                searched_quiets.push(mv);
            }

            self.make_move(mv, ply);
            let child = self.search_node(-beta, -alpha, ply + 1, depth_end);
            self.unmake_move();

            let child_score = match child {
                Some(s) => s,
                None => {
                    interrupted = true;
                    break;
                }
            };
            score = score.max(-child_score);

            if score >= beta {
                bound = Bound::Lower;
                best_move = Some(mv);
                break;
            }
            if score > alpha {
                bound = Bound::Exact;
                alpha = score;
                best_move = Some(mv);
                self.frames.update_pv(ply, mv);
            }
        }

        if interrupted {
            return None;
        }

        if move_count == 0 {
            // Checkmate or stalemate; the leaf score encodes mate distance.
            score = score.max(self.position.evaluate_leaf(ply));
        }

        debug_assert!(-INF < score && score < INF, "search score out of range");
        self.tt
            .store(key, depth_to_go as u8, score, evaluation, best_move, bound, ply);

        if bound == Bound::Lower {
            if let Some(best) = best_move {
                self.frames.update_killers(ply, best);
                self.update_history(best, &searched_quiets, &searched_captures, depth_to_go);
            }
        }

        Some(score)
    }

    /// Quiescence: search only forcing moves so the static eval is never
    /// taken in the middle of a capture sequence.
    fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        if !self.check_search_limit() {
            return None;
        }

        self.stats.nodes += 1;
        if ply >= MAX_PLY {
            return Some(self.position.evaluate());
        }

        let key = self.position.key();
        let entry = self.tt.probe(key, ply);
        if entry.is_some() {
            self.stats.tt_hit += 1;
        }

        if let Some(e) = entry {
            // All quiescence entries sit at depth 0, so any hit is
            // depth-adequate here.
            if e.score >= beta && matches!(e.bound, Bound::Lower | Bound::Exact) {
                self.stats.tt_cut += 1;
                return Some(e.score);
            }
            if e.score <= alpha && e.bound == Bound::Upper {
                self.stats.tt_cut += 1;
                return Some(e.score);
            }
        }

        let in_check = self.position.in_check();
        let tt_move = entry.and_then(|e| e.best_move);
        let mut evaluation = entry.and_then(|e| e.eval);
        let static_eval = match evaluation {
            Some(eval) => eval,
            None => {
                let eval = self.position.evaluate();
                evaluation = Some(eval);
                eval
            }
        };

        // Stand pat: the side to move may decline to continue the sequence.
        let mut score = static_eval;
        let mut best_move: Option<ChessMove> = None;
        let mut bound = Bound::Upper;
        let mut interrupted = false;

        if score >= beta {
            bound = Bound::Lower;
        } else {
            if score > alpha {
                alpha = score;
            }

            let killers = self.frames.frame(ply).killers;
            let mut picker =
                MovePicker::new(&self.position, &self.history, tt_move, killers, in_check, true);
            let mut move_count = 0usize;

            while let Some(mv) = picker.next() {
                move_count += 1;

                self.make_move(mv, ply);
                let child = self.quiescence(-beta, -alpha, ply + 1);
                self.unmake_move();

                let child_score = match child {
                    Some(s) => s,
                    None => {
                        interrupted = true;
                        break;
                    }
                };
                score = score.max(-child_score);

                if score >= beta {
                    bound = Bound::Lower;
                    best_move = Some(mv);
                    break;
                }
                if score > alpha {
                    bound = Bound::Exact;
                    alpha = score;
                }
            }

            // A captures-only picker cannot see quiet stalemates; "no moves"
            // is meaningful only when every evasion was generated.
            if !interrupted && in_check && move_count == 0 {
                score = self.position.evaluate_leaf(ply);
            }
        }

        if interrupted {
            return None;
        }

        debug_assert!(-INF < score && score < INF, "quiescence score out of range");
        self.tt.store(key, 0, score, evaluation, best_move, bound, ply);

        Some(score)
    }

    /// Make `mv` and reset the child frame's PV; killers in that frame
    /// survive for the sibling subtrees.
    fn make_move(&mut self, mv: ChessMove, ply: usize) {
        self.position.make_move(mv);
        self.frames.frame_mut(ply + 1).reset();
    }

    fn unmake_move(&mut self) {
        self.position.unmake_move();
    }

    /// Cutoff bookkeeping: reward the move that cut, penalize the moves that
    /// were tried before it. Moves the picker never reached are untouched,
    /// which is what makes the tables converge.
    fn update_history(
        &mut self,
        best: ChessMove,
        quiets: &[ChessMove],
        captures: &[ChessMove],
        depth_to_go: usize,
    ) {
        let bonus = (depth_to_go * depth_to_go) as i32;
        let side = self.position.side_to_move();
        let best_is_capture = self.position.is_capture_or_promotion(best);
        let board = self.position.board();
        let piece_at =
            |mv: ChessMove| board.piece_on(mv.get_source()).unwrap_or(chess::Piece::Pawn);

        if best_is_capture {
            self.history
                .update_capture(side, piece_at(best), best.get_dest().to_index(), bonus);
        } else {
            self.history
                .update_quiet(side, piece_at(best), best.get_dest().to_index(), bonus);
            for &mv in quiets {
                if mv == best {
                    continue;
                }
                self.history
                    .update_quiet(side, piece_at(mv), mv.get_dest().to_index(), -bonus);
            }
        }

        for &mv in captures {
            if mv == best {
                continue;
            }
            self.history
                .update_capture(side, piece_at(mv), mv.get_dest().to_index(), -bonus);
        }
    }
}
