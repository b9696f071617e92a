//! Search: iterative deepening driver over the negamax core.

pub mod control;
pub mod draw;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod see;
pub mod tt;

use garnet_core::{Board, Move, generate_legal_moves};

use control::SearchControl;
use negamax::{CHECKMATE, MATE_BOUND, MAX_SEARCH_PLY, PvLine, SearchContext, negamax};
use tt::TranspositionTable;

/// Initial aspiration half-window in centipawns.
const ASPIRATION_DELTA: i32 = 10;

/// Snapshot of one completed deepening iteration, handed to the driver's
/// callback for `info` output.
#[derive(Debug)]
pub struct IterationReport<'a> {
    /// Completed depth.
    pub depth: i32,
    /// Deepest ply reached, including quiescence.
    pub seldepth: usize,
    /// Nodes visited so far in this search.
    pub nodes: u64,
    /// Score of the completed iteration, side-to-move perspective.
    pub score: i32,
    /// Principal variation of the completed iteration.
    pub pv: &'a [Move],
}

/// Result of a completed search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move at the last completed depth (null if the root position
    /// has no legal moves).
    pub best_move: Move,
    /// Principal variation of the last completed iteration.
    pub pv: Vec<Move>,
    /// Score of the last completed iteration, side-to-move perspective.
    pub score: i32,
    /// Total nodes visited.
    pub nodes: u64,
    /// Last completed depth.
    pub depth: i32,
    /// Deepest ply reached.
    pub seldepth: usize,
}

/// Iterative-deepening searcher owning the transposition table.
pub struct Searcher {
    tt: TranspositionTable,
}

impl Searcher {
    /// Default transposition table size in MiB.
    pub const DEFAULT_HASH_MB: usize = 16;

    /// Create a searcher with the default table size.
    pub fn new() -> Self {
        Self::with_hash(Self::DEFAULT_HASH_MB)
    }

    /// Create a searcher with a `mb`-MiB transposition table.
    pub fn with_hash(mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(mb),
        }
    }

    /// Reallocate the transposition table (UCI `setoption name Hash`).
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt.resize(mb);
    }

    /// Zero the transposition table, preserving the allocation.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Run iterative deepening up to `max_depth` or until stopped.
    ///
    /// `game_hashes` are the Zobrist keys of every position played before
    /// `board`, oldest first; the search extends this list down its own
    /// line to detect repetitions. `on_iter` fires after each completed
    /// iteration. The result reflects the last *completed* iteration:
    /// anything from an interrupted one is discarded.
    pub fn search<F>(
        &mut self,
        board: &Board,
        game_hashes: &[u64],
        max_depth: i32,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(&IterationReport<'_>),
    {
        self.tt.clear();

        let mut ctx = SearchContext::new(&mut self.tt, control, game_hashes, board);
        let mut pv = PvLine::new();
        let max_depth = max_depth.clamp(1, MAX_SEARCH_PLY as i32 - 1);

        let mut completed_score = 0;
        let mut completed_depth = 0;
        let mut completed_pv: Vec<Move> = Vec::new();

        // Depth 1 runs with the full window; aspiration needs a previous
        // score to center on.
        let mut score = negamax(board, -CHECKMATE, CHECKMATE, 1, 0, &mut ctx, &mut pv);
        if !control.stopped() {
            completed_score = score;
            completed_depth = 1;
            completed_pv = pv.moves().to_vec();
            on_iter(&IterationReport {
                depth: 1,
                seldepth: ctx.seldepth,
                nodes: ctx.nodes,
                score,
                pv: pv.moves(),
            });
        }

        for depth in 2..=max_depth {
            if control.should_stop_iterating() {
                break;
            }

            // Aspiration window around the previous score. Mate scores get
            // the full window; a narrow window around them misbehaves.
            let mut delta = if depth >= 5 && score.abs() < MATE_BOUND {
                ASPIRATION_DELTA
            } else {
                CHECKMATE
            };
            let mut alpha = (score - delta).max(-CHECKMATE);
            let mut beta = (score + delta).min(CHECKMATE);

            while !control.stopped() {
                let attempt = negamax(board, alpha, beta, depth, 0, &mut ctx, &mut pv);
                if control.stopped() {
                    break;
                }
                score = attempt;

                // The bound checks also require room to widen: a mated
                // root scores exactly -CHECKMATE, which must terminate the
                // loop rather than fail low against an unwidenable window.
                if score <= alpha && alpha > -CHECKMATE {
                    // Fail low: pull beta toward alpha and widen downward.
                    beta = (alpha + beta) / 2;
                    alpha = (alpha - delta).max(-CHECKMATE);
                } else if score >= beta && beta < CHECKMATE {
                    beta = (beta + delta).min(CHECKMATE);
                } else {
                    completed_score = score;
                    completed_depth = depth;
                    completed_pv = pv.moves().to_vec();
                    on_iter(&IterationReport {
                        depth,
                        seldepth: ctx.seldepth,
                        nodes: ctx.nodes,
                        score,
                        pv: pv.moves(),
                    });
                    break;
                }

                delta += delta / 2;
            }
        }

        let nodes = ctx.nodes;
        let seldepth = ctx.seldepth;

        // The root TT entry carries the best move. Re-validate it against
        // the legal move list — a hash collision must never surface as an
        // illegal bestmove — and fall back to the completed PV.
        let root_moves = generate_legal_moves(board);
        let tt_move = self
            .tt
            .probe(board.hash())
            .map_or(Move::NULL, |entry| entry.best_move());
        let best_move = if root_moves.as_slice().contains(&tt_move) {
            tt_move
        } else {
            completed_pv.first().copied().unwrap_or(Move::NULL)
        };

        SearchResult {
            best_move,
            pv: completed_pv,
            score: completed_score,
            nodes,
            depth: completed_depth,
            seldepth,
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher").field("tt", &self.tt).finish()
    }
}
