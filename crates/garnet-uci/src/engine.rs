//! Event-driven UCI engine loop.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use garnet_core::{Board, divide};
use garnet_engine::{
    CHECKMATE, IterationReport, MATE_BOUND, SearchControl, SearchResult, Searcher, limits_from_go,
};

use crate::command::{Command, GoParams, PositionInput, parse_command};
use crate::error::UciError;

/// Bounds for the UCI `Hash` option, in MiB.
const HASH_MIN_MB: usize = 1;
const HASH_MAX_MB: usize = 4096;

/// Internal engine state — idle or searching.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// The UCI engine, holding the current position and the searcher.
///
/// Runs an event-driven loop on the main thread: a reader thread owns
/// stdin and forwards parsed commands over a channel, and `go` hands the
/// searcher to a worker thread that reports back with a `SearchDone`
/// event. `stop` flips the shared stop flag the search polls.
pub struct UciEngine {
    board: Board,
    history: Vec<u64>,
    searcher: Option<Searcher>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    pending_hash_mb: Option<usize>,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        Self {
            board: Board::starting_position(),
            history: Vec::new(),
            searcher: Some(Searcher::new()),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            pending_hash_mb: None,
        }
    }

    /// Run the UCI event loop, reading from stdin until `quit` or EOF.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        // Reader thread: owns stdin, forwards parsed commands.
        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UCI command");
                        if stdin_tx
                            .send(EngineEvent::UciCommand(parse_command(trimmed)))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(input) => self.handle_position(input),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption { name, value } => self.handle_setoption(&name, &value),
                    Command::Perft(depth) => self.handle_perft(depth),
                    Command::Stop => self.handle_stop(),
                    Command::Quit => {
                        // Wind down any active search before exiting so the
                        // worker thread never outlives the channel.
                        if !matches!(self.state, EngineState::Idle) {
                            self.handle_stop();
                            for ev in &rx {
                                if let EngineEvent::SearchDone(done) = ev {
                                    self.finish_search(done);
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(_) => {}
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
            }
        }

        info!("garnet shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name garnet {}", env!("CARGO_PKG_VERSION"));
        println!("id author the garnet developers");
        println!(
            "option name Hash type spin default {} min {HASH_MIN_MB} max {HASH_MAX_MB}",
            Searcher::DEFAULT_HASH_MB
        );
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.board = Board::starting_position();
        self.history.clear();
        if let Some(ref mut searcher) = self.searcher {
            searcher.clear_tt();
        }
    }

    fn handle_position(&mut self, input: PositionInput) {
        self.board = input.board;
        self.history = input.history;
    }

    fn handle_setoption(&mut self, name: &str, value: &str) {
        if !name.eq_ignore_ascii_case("hash") {
            debug!(name, "ignoring unknown option");
            return;
        }

        let Ok(mb) = value.parse::<usize>() else {
            warn!(value, "invalid Hash value");
            return;
        };
        let mb = mb.clamp(HASH_MIN_MB, HASH_MAX_MB);

        match self.searcher {
            Some(ref mut searcher) => searcher.resize_tt(mb),
            // Search thread owns the searcher; resize when it comes back.
            None => self.pending_hash_mb = Some(mb),
        }
    }

    fn handle_perft(&self, depth: usize) {
        let mut total = 0u64;
        for (uci, nodes) in divide(&self.board, depth) {
            println!("{uci}: {nodes}");
            total += nodes;
        }
        println!();
        println!("Nodes searched: {total}");
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while already searching, ignoring");
            return;
        }

        self.stop_flag = Arc::new(AtomicBool::new(false));

        let control = limits_from_go(
            params.wtime,
            params.btime,
            params.winc,
            params.binc,
            params.movestogo,
            params.movetime,
            params.infinite,
            self.board.side_to_move(),
            Arc::clone(&self.stop_flag),
        );

        let max_depth = params.depth.unwrap_or(i32::MAX);

        // The search thread owns the searcher until SearchDone comes back.
        let mut searcher = self.searcher.take().unwrap_or_default();
        let board = self.board;
        let history = self.history.clone();
        let tx = tx.clone();

        std::thread::spawn(move || {
            let result = searcher.search(&board, &history, max_depth, &control, |report| {
                print_info(report, &control);
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        });

        self.state = EngineState::Searching;
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;

        if let Some(mb) = self.pending_hash_mb.take() {
            searcher.resize_tt(mb);
        }
        self.searcher = Some(searcher);
        self.state = EngineState::Idle;

        if done.result.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", done.result.best_move.to_uci());
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Print one `info` line for a completed iteration.
fn print_info(report: &IterationReport<'_>, control: &SearchControl) {
    let pv: String = report
        .pv
        .iter()
        .map(|m| m.to_uci())
        .collect::<Vec<_>>()
        .join(" ");

    println!(
        "info depth {} seldepth {} nodes {} time {} score {} pv {}",
        report.depth,
        report.seldepth,
        report.nodes,
        control.elapsed().as_millis(),
        format_score(report.score),
        pv,
    );
}

/// Format a search score as `cp <v>` or `mate <k>`.
///
/// Mate distances are reported in moves, rounded up from plies, with the
/// same formula for winning and losing mates.
fn format_score(score: i32) -> String {
    if score.abs() > MATE_BOUND {
        let moves = (CHECKMATE - score.abs() + 1) / 2;
        if score > 0 {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {score}")
    }
}
