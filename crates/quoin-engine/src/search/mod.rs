//! Iterative-deepening driver, aspiration windows, and the worker
//! coordinator that runs searches off-thread.

pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use chess::ChessMove;
use tracing::debug;

use crate::position::Position;
use crate::time::{GoParams, TimeControl};
use heuristics::{FrameStack, HistoryTable};
use negamax::{INF, MAX_PLY};
use tt::TranspositionTable;

/// Counters accumulated over one root search call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub tt_hit: u64,
    pub tt_cut: u64,
    pub time_ms: u64,
    pub nps: u64,
}

/// One completed depth of the iterative deepening loop.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: usize,
    /// Score in centipawns from the side to move; mate scores exceed
    /// [`negamax::MATE_THRESHOLD`].
    pub score: i32,
    /// Principal variation; empty when the position has no legal move.
    pub pv: Vec<ChessMove>,
    pub stats: SearchStats,
}

/// Progress events delivered to the `go` callback on the worker thread.
///
/// Info events arrive in increasing depth order, at most one per completed
/// depth, interleaved with free-form Debug events, and the stream ends with
/// exactly one BestMove.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Info(SearchReport),
    Debug(String),
    BestMove(SearchReport),
}

/// Everything a search mutates, owned by exactly one thread at a time: the
/// controller between searches, the worker during one.
pub struct Searcher {
    pub(crate) position: Position,
    pub(crate) tt: TranspositionTable,
    pub(crate) history: HistoryTable,
    pub(crate) frames: FrameStack,
    pub(crate) time: TimeControl,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) limits_armed: bool,
    pub(crate) stats: SearchStats,
}

impl Searcher {
    fn new(stop: Arc<AtomicBool>) -> Self {
        Self {
            position: Position::startpos(),
            tt: TranspositionTable::new(16),
            history: HistoryTable::new(),
            frames: FrameStack::new(),
            time: TimeControl::infinite(),
            stop,
            limits_armed: true,
            stats: SearchStats::default(),
        }
    }

    /// The full iterative-deepening loop, reporting through `emit`.
    fn run(&mut self, go: &GoParams, emit: &mut dyn FnMut(SearchEvent)) {
        self.time
            .initialize(go, self.position.side_to_move(), self.position.game_ply());

        emit(SearchEvent::Debug(format!(
            "ply = {}, side = {:?}, eval = {}, budget = {}ms",
            self.position.game_ply(),
            self.position.side_to_move(),
            self.position.evaluate(),
            self.time.budget().as_millis(),
        )));

        let depth_end = go.depth.clamp(1, MAX_PLY);

        // Depth 1 runs with limits disarmed: a best move must exist even if
        // the clock was already spent when the search started.
        self.limits_armed = false;
        let mut best = self
            .search_root(1, -INF, INF)
            .expect("an unlimited depth-1 search cannot be cancelled");
        self.limits_armed = true;
        emit(SearchEvent::Info(best.clone()));

        for depth in 2..=depth_end {
            let report = if depth < 4 {
                self.search_root(depth, -INF, INF)
            } else {
                self.search_aspiration(depth, best.score)
            };

            // A result arriving after the deadline may be incomplete: drop
            // it and fall back to the previous depth.
            let report = match report {
                Some(report) => report,
                None => break,
            };
            if !self.check_search_limit() {
                break;
            }

            best = report;
            emit(SearchEvent::Info(best.clone()));
            emit(SearchEvent::Debug(format!(
                "tt_hit = {}, tt_cut = {}",
                best.stats.tt_hit, best.stats.tt_cut,
            )));
        }

        emit(SearchEvent::BestMove(best));
    }

    /// One fixed-depth search over the given window. `None` means cancelled.
    fn search_root(&mut self, depth: usize, alpha: i32, beta: i32) -> Option<SearchReport> {
        self.stats = SearchStats::default();
        self.frames.frame_mut(0).reset();

        let score = self.search_node(alpha, beta, 0, depth)?;

        let mut stats = self.stats;
        stats.time_ms = self.time.elapsed().as_millis() as u64 + 1;
        stats.nps = stats.nodes * 1000 / stats.time_ms;
        Some(SearchReport {
            depth,
            score,
            pv: self.frames.frame(0).pv().to_vec(),
            stats,
        })
    }

    /// Search inside a window around the previous depth's score, widening
    /// geometrically until the score lands strictly inside.
    ///
    /// A fail-low drags the target down, a fail-high pushes it up, and the
    /// widening doubles each round, so the window reaches (-INF, INF) in
    /// O(log range) steps if the score keeps escaping.
    fn search_aspiration(&mut self, depth: usize, previous: i32) -> Option<SearchReport> {
        const INITIAL_DELTA: i64 = 25;

        // i64: the target can drift well past the score range before the
        // window saturates.
        let mut target = i64::from(previous);
        let mut delta = INITIAL_DELTA;

        loop {
            let alpha = (target - delta).max(i64::from(-INF)) as i32;
            let beta = (target + delta).min(i64::from(INF)) as i32;

            let report = self.search_root(depth, alpha, beta)?;
            if !self.check_search_limit() {
                return None;
            }

            let score = report.score;
            if alpha < score && score < beta {
                return Some(report);
            }

            if score <= alpha {
                target -= delta;
            }
            if score >= beta {
                target += delta;
            }
            delta *= 2;
        }
    }
}

/// Coordinates the worker thread that runs searches.
///
/// `go` moves the [`Searcher`] onto a fresh worker and returns immediately;
/// `wait` joins the worker and takes the searcher back; `stop` requests
/// cancellation first. The stop flag is reset once the worker is joined, and
/// it is the only state the two threads share during a search.
pub struct Engine {
    searcher: Option<Searcher>,
    worker: Option<JoinHandle<Searcher>>,
    stop: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        Self {
            searcher: Some(Searcher::new(Arc::clone(&stop))),
            worker: None,
            stop,
        }
    }

    /// True while a worker thread holds the searcher.
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Replace the position to search next. Must not be called mid-search.
    pub fn set_position(&mut self, position: Position) {
        self.searcher_mut().position = position;
    }

    /// The position the next search will start from.
    pub fn position(&self) -> &Position {
        &self
            .searcher
            .as_ref()
            .expect("engine accessed while a search is running")
            .position
    }

    /// Forget learned state (transposition table and history) between games.
    pub fn new_game(&mut self) {
        let searcher = self.searcher_mut();
        searcher.tt.clear();
        searcher.history.clear();
    }

    fn searcher_mut(&mut self) -> &mut Searcher {
        self.searcher
            .as_mut()
            .expect("engine accessed while a search is running")
    }

    /// Start a search on a worker thread.
    ///
    /// `emit` receives the event stream on that thread. Calling `go` again
    /// before the previous search was joined via [`wait`](Self::wait) or
    /// [`stop`](Self::stop) is a programming error.
    pub fn go<F>(&mut self, go: GoParams, mut emit: F)
    where
        F: FnMut(SearchEvent) + Send + 'static,
    {
        assert!(
            self.worker.is_none(),
            "go called while a search is still running"
        );
        let mut searcher = self
            .searcher
            .take()
            .expect("searcher lost without a running worker");
        debug!(depth = go.depth, "starting search");
        self.worker = Some(std::thread::spawn(move || {
            searcher.run(&go, &mut emit);
            searcher
        }));
    }

    /// Join the running search, if any, and reset the stop flag.
    pub fn wait(&mut self) {
        if let Some(worker) = self.worker.take() {
            let searcher = worker.join().expect("search worker panicked");
            self.searcher = Some(searcher);
            self.stop.store(false, Ordering::Release);
        }
    }

    /// Request cancellation and join the worker.
    pub fn stop(&mut self) {
        if self.worker.is_some() {
            self.stop.store(true, Ordering::Release);
        }
        self.wait();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
