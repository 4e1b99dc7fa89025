//! The UCI engine loop: reads commands from stdin, drives the search
//! coordinator, and prints events the search worker emits.

use std::io::{self, BufRead};

use tracing::{debug, info, warn};

use quoin_engine::{Engine, GoParams, SearchEvent};

use crate::command::{parse_command, Command};
use crate::error::UciError;

/// The UCI front-end, owning the search coordinator.
pub struct UciEngine {
    engine: Engine,
}

impl UciEngine {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }

    /// Run the UCI loop until `quit` or stdin closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received UCI command");
            match parse_command(trimmed) {
                Ok(Command::Quit) => break,
                Ok(cmd) => self.dispatch(cmd),
                Err(e) => warn!(error = %e, "UCI parse error"),
            }
        }

        // Join any search still in flight before exiting.
        self.engine.stop();
        info!("quoin shutting down");
        Ok(())
    }

    fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::Uci => {
                println!("id name quoin");
                println!("id author the quoin authors");
                println!("uciok");
            }
            Command::IsReady => println!("readyok"),
            Command::UciNewGame => {
                self.engine.wait();
                self.engine.new_game();
            }
            Command::Position(position) => {
                self.engine.wait();
                self.engine.set_position(position);
            }
            Command::Go(params) => self.handle_go(params),
            Command::Stop => self.engine.stop(),
            Command::Unknown(cmd) => {
                if !cmd.is_empty() {
                    debug!(cmd = %cmd, "ignoring unknown command");
                }
            }
            // Quit is intercepted by the run loop.
            Command::Quit => {}
        }
    }

    fn handle_go(&mut self, params: GoParams) {
        // A search still running here means the GUI never sent stop; join it
        // before starting over.
        self.engine.wait();
        self.engine.go(params, print_event);
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Print one search event in UCI form. Runs on the worker thread.
fn print_event(event: SearchEvent) {
    match event {
        SearchEvent::Info(report) => {
            let pv: Vec<String> = report.pv.iter().map(|mv| mv.to_string()).collect();
            println!(
                "info depth {} score cp {} time {} nodes {} nps {} pv {}",
                report.depth,
                report.score,
                report.stats.time_ms,
                report.stats.nodes,
                report.stats.nps,
                pv.join(" "),
            );
        }
        SearchEvent::Debug(message) => println!("info string {message}"),
        SearchEvent::BestMove(report) => match report.pv.first() {
            Some(mv) => println!("bestmove {mv}"),
            // No legal move in the root position.
            None => println!("bestmove 0000"),
        },
    }
}
