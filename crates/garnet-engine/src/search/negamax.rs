//! The fail-soft negamax node and quiescence search.

use garnet_core::{Board, Move, PieceKind, PromotionPiece, generate_legal_moves};

use crate::eval::{STATIC_MATERIAL_VALUE, evaluate};
use crate::search::control::SearchControl;
use crate::search::draw::is_draw;
use crate::search::heuristics::{CounterTable, HistoryTable, KillerTable, StackEntry};
use crate::search::ordering::{
    self, COUNTER, DELTA_CUTOFF, FUTILITY, LMP, MovePicker, SEE_MARGIN, lmr_reduction,
};
use crate::search::see::see;
use crate::search::tt::{Bound, TranspositionTable};

/// Score of a checkmate delivered at the root.
pub const CHECKMATE: i32 = 32_767;

/// Scores with a larger magnitude than this encode "mate in N plies".
pub const MATE_BOUND: i32 = 30_000;

/// Hard ceiling on search depth; every ply-indexed array has this length.
pub const MAX_SEARCH_PLY: usize = 128;

/// A principal variation: the engine's expected line of play.
///
/// Each node owns one; a parent splices `(move, child_pv)` whenever a move
/// improves alpha, so a completed search leaves the full line at the root.
pub struct PvLine {
    moves: [Move; MAX_SEARCH_PLY],
    len: usize,
}

impl PvLine {
    /// Create an empty line.
    pub fn new() -> Self {
        Self {
            moves: [Move::NULL; MAX_SEARCH_PLY],
            len: 0,
        }
    }

    /// Reset to the empty line.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Replace this line with `mv` followed by the child's line.
    fn load(&mut self, mv: Move, child: &PvLine) {
        self.moves[0] = mv;
        let tail = child.len.min(MAX_SEARCH_PLY - 1);
        self.moves[1..=tail].copy_from_slice(&child.moves[..tail]);
        self.len = tail + 1;
    }

    /// The moves of the line.
    pub fn moves(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// First move of the line, if any.
    pub fn first(&self) -> Option<Move> {
        self.moves().first().copied()
    }
}

impl Default for PvLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state threaded through one `Search` call.
///
/// Owns the heuristic tables (rebuilt per search, satisfying the zeroed-
/// tables invariant), the per-ply stack, and the Zobrist history used for
/// repetition detection: game-history hashes first, then the hashes of the
/// current search path, the current node's position last.
pub(super) struct SearchContext<'a> {
    pub nodes: u64,
    pub seldepth: usize,
    pub tt: &'a mut TranspositionTable,
    pub control: &'a SearchControl,
    pub killers: KillerTable,
    pub counters: CounterTable,
    pub history: HistoryTable,
    pub stack: Box<[StackEntry; MAX_SEARCH_PLY]>,
    pub hashes: Vec<u64>,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        tt: &'a mut TranspositionTable,
        control: &'a SearchControl,
        game_hashes: &[u64],
        root: &Board,
    ) -> Self {
        let mut hashes = Vec::with_capacity(game_hashes.len() + MAX_SEARCH_PLY);
        hashes.extend_from_slice(game_hashes);
        hashes.push(root.hash());

        Self {
            nodes: 0,
            seldepth: 0,
            tt,
            control,
            killers: KillerTable::new(),
            counters: CounterTable::new(),
            history: HistoryTable::new(),
            stack: Box::new([StackEntry::EMPTY; MAX_SEARCH_PLY]),
            hashes,
        }
    }

    /// Hashes of every position before the current node.
    fn prior_hashes(&self) -> &[u64] {
        &self.hashes[..self.hashes.len() - 1]
    }
}

/// Fail-soft negamax with transposition table, selectivity heuristics, and
/// PVS re-searches.
///
/// Returns a score in `[-CHECKMATE, CHECKMATE]` from the side to move's
/// perspective. `pv` is populated only when a move improves alpha. A
/// stopped search returns 0 at every frame without writing the TT.
pub(super) fn negamax(
    board: &Board,
    mut alpha: i32,
    mut beta: i32,
    depth: i32,
    ply: usize,
    ctx: &mut SearchContext<'_>,
    pv: &mut PvLine,
) -> i32 {
    pv.clear();
    let mut child_pv = PvLine::new();

    let is_pv = beta - alpha > 1;
    let is_root = ply == 0;
    let a0 = alpha;
    let skip_move = ctx.stack[ply].skip_move;

    if depth == 0 {
        return quiesce(board, alpha, beta, ply, ctx, pv);
    }

    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply);

    if !is_root {
        if is_draw(board, ctx.prior_hashes()) {
            return 0;
        }

        if ply >= MAX_SEARCH_PLY - 1 {
            return evaluate(board);
        }

        // Mate distance pruning: no line from here can beat a mate already
        // found closer to the root.
        alpha = alpha.max(-CHECKMATE + ply as i32);
        beta = beta.min(CHECKMATE - ply as i32 - 1);
        if alpha >= beta {
            return alpha;
        }
    }

    ctx.control.should_stop(ctx.nodes);

    let tt_entry = if skip_move.is_null() {
        ctx.tt.probe(board.hash())
    } else {
        None
    };
    let tt_move = tt_entry.map_or(Move::NULL, |e| e.best_move());

    if let Some(entry) = tt_entry
        && entry.depth() >= depth
    {
        let score = entry.score(ply);
        match entry.bound() {
            Bound::Exact => return score,
            Bound::Lower if score >= beta => return score,
            Bound::Upper if score <= alpha => return score,
            _ => {}
        }
    }

    let static_eval = match tt_entry {
        Some(entry) => entry.eval(),
        None => evaluate(board),
    };
    ctx.stack[ply].static_eval = static_eval;
    // Computed before any TT refinement of the eval, by contract.
    let improving = ply >= 2 && static_eval > ctx.stack[ply - 2].static_eval;

    let in_check = board.in_check();

    if !is_pv && !in_check {
        // The TT score is a better bound on the true value than the raw
        // static eval when its bound kind points the same way.
        let mut eval = static_eval;
        if let Some(entry) = tt_entry
            && entry.depth() >= depth
        {
            let tt_score = entry.score(ply);
            let dir = if tt_score > eval { Bound::Lower } else { Bound::Upper };
            if entry.bound() == dir {
                eval = tt_score;
            }
        }

        // Reverse futility pruning.
        if depth <= 6 && eval - FUTILITY[depth as usize] >= beta && eval < MATE_BOUND {
            return eval;
        }

        // Null-move pruning: hand the opponent a free move; if the reduced
        // search still fails high the real search would too. Skipped after
        // a null move, under a singular probe, and without non-pawn
        // material (zugzwang).
        if depth >= 3
            && ply >= 1
            && !ctx.stack[ply - 1].current_move.is_null()
            && skip_move.is_null()
            && eval >= beta
            && board.has_non_pawn_material(board.side_to_move())
        {
            let r = (3 + depth / 6 + ((eval - beta) / 200).min(3)).min(depth);

            ctx.stack[ply].current_move = Move::NULL;
            let null_board = board.make_null();
            ctx.hashes.push(null_board.hash());

            let score =
                -negamax(&null_board, -beta, -beta + 1, depth - r, ply + 1, ctx, &mut child_pv);

            ctx.hashes.pop();

            if ctx.control.stopped() {
                return 0;
            }
            if score >= beta {
                return beta;
            }
        }
    }

    ctx.stack[ply + 1].skip_move = Move::NULL;
    ctx.killers.clear_ply(ply + 1);

    let previous_move = if ply >= 1 {
        ctx.stack[ply - 1].current_move
    } else {
        Move::NULL
    };

    let moves = generate_legal_moves(board);
    let mut picker = MovePicker::new_main(
        &moves,
        board,
        tt_move,
        &ctx.killers,
        &ctx.counters,
        &ctx.history,
        previous_move,
        ply,
    );

    let mut best_score = -CHECKMATE;
    let mut best_move = Move::NULL;
    let mut num_moves: i32 = 0;

    while let Some((mv, move_score)) = picker.pick_next() {
        if mv == skip_move {
            continue;
        }

        let tactical = mv.is_promotion() || ordering::is_capture(board, mv);

        if !is_pv && best_score > -MATE_BOUND {
            // Late-move pruning: quiet moves this late rarely matter.
            if depth <= 8 && !tactical && num_moves >= LMP[improving as usize][depth as usize] {
                continue;
            }

            // SEE pruning: skip moves losing too much material for the depth.
            if see(board, mv) < SEE_MARGIN[tactical as usize][(depth as usize).min(63)] {
                continue;
            }
        }

        // Singular extension: if every alternative to the TT move fails a
        // reduced search below sBeta, the TT move is "singular" and earns
        // an extra ply; if the reduced search instead beats beta, several
        // moves do, and sBeta stands in for the node (multi-cut).
        let mut singular_extension = false;
        if depth >= 8
            && skip_move.is_null()
            && !is_root
            && let Some(entry) = tt_entry
            && mv == entry.best_move()
            && entry.depth() >= depth - 3
            && entry.score(ply).abs() < MATE_BOUND
            && entry.bound() == Bound::Lower
        {
            let s_beta = (entry.score(ply) - depth * 2).max(-CHECKMATE);
            let s_depth = depth / 2 - 1;

            ctx.stack[ply].skip_move = mv;
            let score = negamax(board, s_beta - 1, s_beta, s_depth, ply, ctx, pv);
            ctx.stack[ply].skip_move = Move::NULL;

            if score < s_beta {
                singular_extension = true;
            } else if s_beta >= beta {
                return s_beta;
            }
        }

        num_moves += 1;
        ctx.stack[ply].current_move = mv;
        let child = board.make_move(mv);
        ctx.tt.prefetch(child.hash());
        ctx.hashes.push(child.hash());

        let gives_check = child.in_check();
        let new_depth = depth + i32::from(singular_extension || gives_check);

        // Late-move reduction for quiet moves after the first.
        let mut r = 1;
        if depth >= 2 && num_moves > 1 && !tactical {
            r = lmr_reduction(depth, num_moves);

            r += i32::from(!is_pv) + i32::from(!improving) - i32::from(move_score >= COUNTER);

            if move_score >= COUNTER {
                r -= 1;
            } else {
                r -= ((move_score - 149) / 50).min(2);
            }

            r = r.clamp(1, depth - 1);
        }

        // PVS re-search ladder: reduced null window, full-depth null
        // window, then full window for PV nodes.
        let mut score = alpha + 1;
        if r != 1 {
            score = -negamax(&child, -alpha - 1, -alpha, new_depth - r, ply + 1, ctx, &mut child_pv);
        }
        if (r != 1 && score > alpha) || (r == 1 && !(is_pv && num_moves == 1)) {
            score = -negamax(&child, -alpha - 1, -alpha, new_depth - 1, ply + 1, ctx, &mut child_pv);
        }
        if is_pv && (num_moves == 1 || (score > alpha && (is_root || score < beta))) {
            score = -negamax(&child, -beta, -alpha, new_depth - 1, ply + 1, ctx, &mut child_pv);
        }

        ctx.hashes.pop();

        if ctx.control.stopped() {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;

            if score > alpha {
                alpha = score;
                pv.load(mv, &child_pv);
            }

            if alpha >= beta {
                if !tactical {
                    ctx.killers.store(ply, mv);
                    if !previous_move.is_null() {
                        ctx.counters.store(previous_move, mv);
                    }
                    ctx.history.add_history(board.side_to_move(), mv, depth);
                }

                // Quiets searched ahead of the cutoff move failed to cut;
                // charge their butterfly counters.
                let yielded = picker.picked();
                for &earlier in &yielded[..yielded.len() - 1] {
                    if earlier.is_promotion() || ordering::is_capture(board, earlier) {
                        continue;
                    }
                    ctx.history.add_butterfly(board.side_to_move(), earlier, depth);
                }

                break;
            }
        }
    }

    if moves.is_empty() {
        return if in_check { -CHECKMATE + ply as i32 } else { 0 };
    }

    if skip_move.is_null() {
        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score <= a0 {
            Bound::Upper
        } else {
            Bound::Exact
        };
        ctx.tt.put(board.hash(), depth, best_score, bound, best_move, ply, static_eval);
    }

    debug_assert!((-CHECKMATE..=CHECKMATE).contains(&best_score));
    best_score
}

/// Fail-soft quiescence search: captures and queen promotions only.
///
/// Resolves the horizon effect by playing out forcing sequences until the
/// stand-pat evaluation is the best option. Terminates without a depth
/// counter because each recursion consumes a capture or promotion.
pub(super) fn quiesce(
    board: &Board,
    mut alpha: i32,
    beta: i32,
    ply: usize,
    ctx: &mut SearchContext<'_>,
    pv: &mut PvLine,
) -> i32 {
    pv.clear();
    let mut child_pv = PvLine::new();

    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply);

    if is_draw(board, ctx.prior_hashes()) {
        return 0;
    }

    if ply >= MAX_SEARCH_PLY - 1 {
        return evaluate(board);
    }

    ctx.control.should_stop(ctx.nodes);

    let tt_entry = ctx.tt.probe(board.hash());
    if let Some(entry) = tt_entry {
        let score = entry.score(ply);
        match entry.bound() {
            Bound::Exact => return score,
            Bound::Lower if score >= beta => return score,
            Bound::Upper if score <= alpha => return score,
            _ => {}
        }
    }

    let static_eval = match tt_entry {
        Some(entry) => entry.eval(),
        None => evaluate(board),
    };
    ctx.stack[ply].static_eval = static_eval;

    // Stand pat, sharpened by the TT score when its bound points the
    // same way.
    let mut stand_pat = static_eval;
    if let Some(entry) = tt_entry {
        let tt_score = entry.score(ply);
        let dir = if tt_score > stand_pat { Bound::Lower } else { Bound::Upper };
        if entry.bound() == dir {
            stand_pat = tt_score;
        }
    }

    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    let mut best_score = stand_pat;

    let moves = generate_legal_moves(board);
    let mut picker = MovePicker::new_noisy(&moves, board);

    while let Some((mv, move_score)) = picker.pick_next() {
        if mv.is_promotion() {
            // Under-promotions are noise here, not wins.
            if mv.promotion_piece() != PromotionPiece::Queen {
                continue;
            }
        } else {
            // Delta pruning: even winning this victim outright cannot
            // bring the score near alpha.
            let victim = if mv.is_en_passant() {
                PieceKind::Pawn
            } else {
                board.piece_on(mv.dest()).unwrap_or(PieceKind::Pawn)
            };
            if stand_pat + DELTA_CUTOFF + STATIC_MATERIAL_VALUE[victim.index()] < alpha {
                continue;
            }
        }

        // SEE-losing captures sort last with negative scores; everything
        // from here on loses material.
        if move_score < 0 {
            break;
        }

        ctx.stack[ply].current_move = mv;
        let child = board.make_move(mv);
        ctx.hashes.push(child.hash());

        let score = -quiesce(&child, -beta, -alpha, ply + 1, ctx, &mut child_pv);

        ctx.hashes.pop();

        if ctx.control.stopped() {
            return 0;
        }

        if score > best_score {
            best_score = score;

            if score > alpha {
                alpha = score;
                pv.load(mv, &child_pv);
            }

            if alpha >= beta {
                break;
            }
        }
    }

    best_score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn context<'a>(
        tt: &'a mut TranspositionTable,
        control: &'a SearchControl,
        board: &Board,
    ) -> SearchContext<'a> {
        SearchContext::new(tt, control, &[], board)
    }

    fn search(board: &Board, depth: i32) -> (i32, Vec<Move>) {
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = context(&mut tt, &control, board);
        let mut pv = PvLine::new();
        let score = negamax(board, -CHECKMATE, CHECKMATE, depth, 0, &mut ctx, &mut pv);
        (score, pv.moves().to_vec())
    }

    #[test]
    fn mate_in_one_is_found() {
        // White queen h5 takes f7: checkmate.
        let board: Board = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
            .parse()
            .unwrap();
        let (score, pv) = search(&board, 2);
        assert_eq!(score, CHECKMATE - 1);
        assert_eq!(pv[0].to_uci(), "h5f7");
    }

    #[test]
    fn mated_side_scores_negative_checkmate() {
        // Black to move, already checkmated.
        let board: Board = "7k/6Q1/5K2/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let (score, _) = search(&board, 1);
        assert_eq!(score, -CHECKMATE);
    }

    #[test]
    fn stalemate_scores_zero() {
        let board: Board = "k7/2K5/1Q6/8/8/8/8/8 b - - 0 1".parse().unwrap();
        let (score, pv) = search(&board, 3);
        assert_eq!(score, 0);
        assert!(pv.is_empty());
    }

    #[test]
    fn fifty_move_draw_scores_zero_at_non_root() {
        // Root is exempt from the draw check; probe one ply down instead.
        let board: Board = "8/8/4k3/8/8/4K3/8/R7 w - - 99 80".parse().unwrap();
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = context(&mut tt, &control, &board);
        let mut pv = PvLine::new();
        // Any quiet move pushes the clock past 99.
        let score = negamax(&board, -CHECKMATE, CHECKMATE, 2, 0, &mut ctx, &mut pv);
        assert_eq!(score, 0, "every continuation is a fifty-move draw");
    }

    #[test]
    fn stopped_search_returns_zero_and_writes_nothing() {
        let board = Board::starting_position();
        let mut tt = TranspositionTable::new(1);
        let stopped = Arc::new(AtomicBool::new(true));
        let control = SearchControl::new_infinite(stopped);
        let mut ctx = context(&mut tt, &control, &board);
        let mut pv = PvLine::new();
        let score = negamax(&board, -CHECKMATE, CHECKMATE, 6, 0, &mut ctx, &mut pv);
        assert_eq!(score, 0);
        assert!(tt.probe(board.hash()).is_none(), "stopped search must not store");
    }

    #[test]
    fn quiescence_never_below_stand_pat() {
        // White to move with a hanging queen en prise: stand pat floors
        // the score even though every capture line loses material.
        let board: Board = "4k3/8/8/3q4/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = context(&mut tt, &control, &board);
        let mut pv = PvLine::new();
        let stand_pat = evaluate(&board);
        let score = quiesce(&board, -CHECKMATE, CHECKMATE, 0, &mut ctx, &mut pv);
        assert!(score >= stand_pat);
    }

    #[test]
    fn root_entry_written_with_exact_bound() {
        let board = Board::starting_position();
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = context(&mut tt, &control, &board);
        let mut pv = PvLine::new();
        let score = negamax(&board, -CHECKMATE, CHECKMATE, 3, 0, &mut ctx, &mut pv);

        let entry = tt.probe(board.hash()).expect("root entry stored");
        assert_eq!(entry.bound(), Bound::Exact);
        assert_eq!(entry.depth(), 3);
        assert_eq!(entry.score(0), score);
        assert_eq!(Some(entry.best_move()), pv.first());
    }

    #[test]
    fn bare_kings_score_zero_throughout() {
        // Insufficient material: every child node is an immediate draw.
        let board: Board = "8/8/4k3/8/8/4K3/8/8 w - - 0 1".parse().unwrap();
        let (score, _) = search(&board, 6);
        assert_eq!(score, 0);
    }

    #[test]
    fn pv_line_splicing() {
        let mut parent = PvLine::new();
        let mut child = PvLine::new();
        let m1 = Move::new(garnet_core::Square::E2, garnet_core::Square::E4);
        let m2 = Move::new(garnet_core::Square::E7, garnet_core::Square::E5);
        child.load(m2, &PvLine::new());
        parent.load(m1, &child);
        assert_eq!(parent.moves(), &[m1, m2]);
        assert_eq!(parent.first(), Some(m1));
    }
}
