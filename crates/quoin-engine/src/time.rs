//! Time management — derive a per-move deadline from clock parameters.

use std::time::{Duration, Instant};

use chess::Color;

use crate::position::color_index;
use crate::search::negamax::MAX_PLY;

/// Fraction of the computed budget actually spent, leaving slack for the
/// final iteration to be discarded and the move to be sent.
const SAFETY_FACTOR: f64 = 0.8;

/// ~30 years in milliseconds; stands in for "no deadline".
const INFINITE_MS: f64 = 1e12;

/// Parameters of a `go` request. Times are in milliseconds; zero means the
/// parameter was not supplied.
#[derive(Debug, Clone)]
pub struct GoParams {
    /// Remaining clock per side, indexed White = 0, Black = 1.
    pub time: [u64; 2],
    /// Increment per move per side.
    pub inc: [u64; 2],
    /// Moves until the next time control (0 = unknown).
    pub movestogo: u64,
    /// Exact time to spend on this move (0 = unset).
    pub movetime: u64,
    /// Maximum search depth.
    pub depth: usize,
    /// Search until stopped, ignoring every clock parameter (`go infinite`).
    pub infinite: bool,
}

impl Default for GoParams {
    fn default() -> Self {
        Self {
            time: [0; 2],
            inc: [0; 2],
            movestogo: 0,
            movetime: 0,
            depth: MAX_PLY,
            infinite: false,
        }
    }
}

/// Wall-clock deadline for one search.
///
/// [`within_limit`](Self::within_limit) is called at every node, so it does
/// nothing beyond one clock read and one comparison.
#[derive(Debug, Clone)]
pub struct TimeControl {
    start: Instant,
    finish: Instant,
}

impl TimeControl {
    /// A control that never expires.
    pub fn infinite() -> Self {
        let start = Instant::now();
        Self {
            start,
            finish: start + Duration::from_millis(INFINITE_MS as u64),
        }
    }

    /// Compute the deadline for one move.
    ///
    /// `infinite` wins over everything: a GUI may send the clock along with
    /// `go infinite` and the search must still run until stopped. Otherwise
    /// the budget is the minimum of `movetime` (when set) and a share of the
    /// remaining clock, `(time + inc * (cnt - 1)) / cnt`, where `cnt` is
    /// `movestogo` when supplied and otherwise an estimate that shrinks as
    /// the game progresses. Early in the game the share is additionally
    /// capped so the opening does not eat the clock. The result is scaled by
    /// [`SAFETY_FACTOR`] before the deadline is fixed.
    pub fn initialize(&mut self, go: &GoParams, side: Color, game_ply: u32) {
        self.start = Instant::now();

        if go.infinite {
            self.finish = self.start + Duration::from_millis(INFINITE_MS as u64);
            return;
        }

        let mut duration = INFINITE_MS;

        if go.movetime != 0 {
            duration = duration.min(go.movetime as f64);
        }

        let own = color_index(side);
        if go.time[own] != 0 {
            let time = go.time[own] as f64;
            let inc = go.inc[own] as f64;
            let cnt = if go.movestogo != 0 {
                go.movestogo
            } else {
                (32u64.saturating_sub(u64::from(game_ply) / 2)).max(10)
            } as f64;
            duration = duration.min((time + inc * (cnt - 1.0)) / cnt);

            if game_ply <= 8 {
                let opening_cap = 1000.0 + 125.0 * f64::from(game_ply);
                duration = duration.min(opening_cap);
            }
        }

        self.finish = self.start + Duration::from_millis((SAFETY_FACTOR * duration) as u64);
    }

    /// True while the deadline has not passed.
    pub fn within_limit(&self) -> bool {
        Instant::now() < self.finish
    }

    /// Time since the control was (re)initialized.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The budget this control was given.
    pub fn budget(&self) -> Duration {
        self.finish - self.start
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::infinite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_limits_is_effectively_infinite() {
        let mut control = TimeControl::infinite();
        control.initialize(&GoParams::default(), Color::White, 20);
        assert!(control.within_limit());
        assert!(control.budget() > Duration::from_secs(3600));
    }

    #[test]
    fn infinite_overrides_clock_parameters() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            infinite: true,
            time: [300_000, 300_000],
            inc: [2_000, 2_000],
            movetime: 50,
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 20);
        assert!(control.within_limit());
        assert!(control.budget() > Duration::from_secs(3600));
    }

    #[test]
    fn movetime_scaled_by_safety_factor() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            movetime: 1000,
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 20);
        assert_eq!(control.budget(), Duration::from_millis(800));
    }

    #[test]
    fn movestogo_splits_remaining_time() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            time: [30_000, 0],
            movestogo: 30,
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 40);
        // 30000 / 30 = 1000ms, times 0.8.
        assert_eq!(control.budget(), Duration::from_millis(800));
    }

    #[test]
    fn increment_extends_the_share() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            time: [0, 30_000],
            inc: [0, 1_000],
            movestogo: 10,
            ..GoParams::default()
        };
        control.initialize(&go, Color::Black, 40);
        // (30000 + 1000 * 9) / 10 = 3900ms, times 0.8.
        assert_eq!(control.budget(), Duration::from_millis(3120));
    }

    #[test]
    fn opening_cap_applies_through_ply_eight() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            time: [600_000, 0],
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 4);
        // Share would be 600000/30 = 20000ms; the opening cap 1000 + 125*4
        // wins, times 0.8.
        assert_eq!(control.budget(), Duration::from_millis(1200));
    }

    #[test]
    fn cap_gone_after_the_opening() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            time: [600_000, 0],
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 9);
        // cnt = max(10, 32 - 4) = 28; 600000/28 ~= 21428ms, times 0.8.
        assert!(control.budget() > Duration::from_secs(10));
    }

    #[test]
    fn movetime_beats_larger_clock_share() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            time: [600_000, 0],
            movetime: 100,
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 40);
        assert_eq!(control.budget(), Duration::from_millis(80));
    }

    #[test]
    fn deadline_actually_expires() {
        let mut control = TimeControl::infinite();
        let go = GoParams {
            movetime: 1,
            ..GoParams::default()
        };
        control.initialize(&go, Color::White, 40);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!control.within_limit());
    }

    #[test]
    fn default_go_params_search_full_depth() {
        let go = GoParams::default();
        assert_eq!(go.depth, MAX_PLY);
        assert_eq!(go.movestogo, 0);
    }
}
