//! Move ordering: score tiers, MVV-LVA, and the selection-sort picker.
//!
//! Score bands, highest first:
//! - TT move:                `HASH`
//! - Promotions:             `GOOD_CAPTURE` + 150..200
//! - SEE-winning captures:   `GOOD_CAPTURE` + MVV-LVA
//! - Killer moves:           `KILLER1` / `KILLER2`
//! - Counter move:           `COUNTER`
//! - Quiet moves:            history/butterfly ratio, capped below `COUNTER`
//! - SEE-losing captures:    `BAD_CAPTURE` + SEE
//!
//! The search itself relies on a single inequality: any score at or above
//! `COUNTER` marks a move "important" enough to reduce less.

use std::sync::OnceLock;

use garnet_core::{Board, Move, MoveList, PieceKind, PromotionPiece};

use crate::search::heuristics::{CounterTable, HistoryTable, KillerTable};
use crate::search::see::see;

/// Score of the transposition-table move.
pub const HASH: i32 = 100_000;
/// Base score of SEE-winning captures and promotions.
pub const GOOD_CAPTURE: i32 = 90_000;
/// Score of the first killer slot.
pub const KILLER1: i32 = 80_000;
/// Score of the second killer slot.
pub const KILLER2: i32 = 79_000;
/// Score of the counter move to the previous move.
pub const COUNTER: i32 = 78_000;
/// Base score of SEE-losing captures (always sorts below quiets).
pub const BAD_CAPTURE: i32 = -100_000;

/// MVV-LVA scores indexed by `[victim][attacker]`.
///
/// Weights: Pawn=1, Knight=3, Bishop=3, Rook=5, Queen=9, King=0.
/// Formula: `victim_weight * 16 - attacker_weight`.
const MVV_LVA: [[i32; 6]; 6] = [
    // victim = Pawn (weight 1)
    [15, 13, 13, 11, 7, 16],
    // victim = Knight (weight 3)
    [47, 45, 45, 43, 39, 48],
    // victim = Bishop (weight 3)
    [47, 45, 45, 43, 39, 48],
    // victim = Rook (weight 5)
    [79, 77, 77, 75, 71, 80],
    // victim = Queen (weight 9)
    [143, 141, 141, 139, 135, 144],
    // victim = King (weight 0)
    [-1, -3, -3, -5, -9, 0],
];

// ---------------------------------------------------------------------------
// Pruning and reduction tables
// ---------------------------------------------------------------------------

/// Margin per remaining depth for reverse futility pruning.
pub const FUTILITY_MARGIN: i32 = 85;
/// Quiescence delta-pruning margin.
pub const DELTA_CUTOFF: i32 = 200;
/// SEE pruning slope for quiet moves (scaled by depth squared).
const SEE_PRUNE_CUTOFF: i32 = -20;
/// SEE pruning slope for captures (scaled by depth).
const SEE_PRUNE_CAPTURE_CUTOFF: i32 = -70;

const TABLE_DEPTHS: usize = 64;

/// Late-move pruning move-count thresholds, `[improving][depth]`.
pub static LMP: [[i32; TABLE_DEPTHS]; 2] = {
    let mut t = [[0; TABLE_DEPTHS]; 2];
    let mut d = 0;
    while d < TABLE_DEPTHS {
        t[0][d] = (3 + (d * d) as i32) / 2;
        t[1][d] = 3 + (d * d) as i32;
        d += 1;
    }
    t
};

/// SEE pruning thresholds, `[tactical][depth]`.
pub static SEE_MARGIN: [[i32; TABLE_DEPTHS]; 2] = {
    let mut t = [[0; TABLE_DEPTHS]; 2];
    let mut d = 0;
    while d < TABLE_DEPTHS {
        t[0][d] = SEE_PRUNE_CUTOFF * (d * d) as i32;
        t[1][d] = SEE_PRUNE_CAPTURE_CUTOFF * d as i32;
        d += 1;
    }
    t
};

/// Reverse futility margins per depth.
pub static FUTILITY: [i32; TABLE_DEPTHS] = {
    let mut t = [0; TABLE_DEPTHS];
    let mut d = 0;
    while d < TABLE_DEPTHS {
        t[d] = FUTILITY_MARGIN * d as i32;
        d += 1;
    }
    t
};

static LMR_TABLE: OnceLock<[[i32; TABLE_DEPTHS]; TABLE_DEPTHS]> = OnceLock::new();

/// Late-move reduction in plies for `(depth, move_number)`.
///
/// `LMR[d][m] = floor(0.6 + ln(d) * ln(1.2 m) / 2.5)`, built lazily since
/// `ln` is not const-evaluable.
pub fn lmr_reduction(depth: i32, num_moves: i32) -> i32 {
    let table = LMR_TABLE.get_or_init(|| {
        let mut t = [[0i32; TABLE_DEPTHS]; TABLE_DEPTHS];
        for (d, row) in t.iter_mut().enumerate().skip(1) {
            for (m, entry) in row.iter_mut().enumerate().skip(1) {
                *entry = (0.6 + (d as f64).ln() * (1.2 * m as f64).ln() / 2.5) as i32;
            }
        }
        t
    });
    table[depth.clamp(0, 63) as usize][num_moves.clamp(0, 63) as usize]
}

// ---------------------------------------------------------------------------
// Move classification and scoring
// ---------------------------------------------------------------------------

/// Return `true` if `mv` captures a piece (including en passant).
#[inline]
pub fn is_capture(board: &Board, mv: Move) -> bool {
    mv.is_en_passant() || (!mv.is_castle() && board.occupied().contains(mv.dest()))
}

/// Return the MVV-LVA score for a capture.
fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        PieceKind::Pawn
    } else {
        board.piece_on(mv.dest()).unwrap_or(PieceKind::Pawn)
    };
    let attacker = board.piece_on(mv.source()).unwrap_or(PieceKind::Pawn);
    MVV_LVA[victim.index()][attacker.index()]
}

/// Score a single move for the main search.
#[allow(clippy::too_many_arguments)]
fn score_move(
    board: &Board,
    mv: Move,
    tt_move: Move,
    killers: &KillerTable,
    counters: &CounterTable,
    history: &HistoryTable,
    previous: Move,
    ply: usize,
) -> i32 {
    if mv == tt_move {
        return HASH;
    }

    if mv.is_promotion() {
        return match mv.promotion_piece() {
            PromotionPiece::Queen => GOOD_CAPTURE + 200,
            PromotionPiece::Rook => GOOD_CAPTURE + 170,
            PromotionPiece::Bishop | PromotionPiece::Knight => GOOD_CAPTURE + 160,
        };
    }

    if is_capture(board, mv) {
        let see_score = see(board, mv);
        return if see_score >= 0 {
            GOOD_CAPTURE + mvv_lva(board, mv)
        } else {
            BAD_CAPTURE + see_score
        };
    }

    if mv == killers.primary(ply) {
        return KILLER1;
    }
    if mv == killers.secondary(ply) {
        return KILLER2;
    }
    if !previous.is_null() && counters.probe(previous) == mv {
        return COUNTER;
    }

    history.score(board.side_to_move(), mv).min(COUNTER - 1)
}

/// Score a noisy move for quiescence.
///
/// SEE-losing captures score negative, which the quiescence loop uses as
/// its stopping condition; under-promotions get a token positive score and
/// are skipped by the caller.
fn score_noisy(board: &Board, mv: Move) -> i32 {
    if mv.is_promotion() {
        return match mv.promotion_piece() {
            PromotionPiece::Queen => GOOD_CAPTURE + 200,
            _ => 1,
        };
    }

    let see_score = see(board, mv);
    if see_score >= 0 {
        GOOD_CAPTURE + mvv_lva(board, mv)
    } else {
        see_score
    }
}

// ---------------------------------------------------------------------------
// MovePicker
// ---------------------------------------------------------------------------

/// Incremental move picker: one selection-sort step per call.
///
/// `pick_next` brings the highest-scoring remaining move to the cursor and
/// yields it with its score, so the search can consult the ordering score
/// for reduction decisions and replay the yielded prefix for butterfly
/// updates after a cutoff.
pub struct MovePicker {
    moves: [Move; 256],
    scores: [i32; 256],
    len: usize,
    cursor: usize,
}

impl MovePicker {
    /// Build a picker over all legal moves, scored for the main search.
    #[allow(clippy::too_many_arguments)]
    pub fn new_main(
        moves: &MoveList,
        board: &Board,
        tt_move: Move,
        killers: &KillerTable,
        counters: &CounterTable,
        history: &HistoryTable,
        previous: Move,
        ply: usize,
    ) -> Self {
        let mut picker = Self {
            moves: [Move::NULL; 256],
            scores: [0; 256],
            len: moves.len(),
            cursor: 0,
        };
        for i in 0..moves.len() {
            picker.moves[i] = moves[i];
            picker.scores[i] =
                score_move(board, moves[i], tt_move, killers, counters, history, previous, ply);
        }
        picker
    }

    /// Build a picker over noisy moves only (captures and promotions),
    /// scored for quiescence.
    pub fn new_noisy(moves: &MoveList, board: &Board) -> Self {
        let mut picker = Self {
            moves: [Move::NULL; 256],
            scores: [0; 256],
            len: 0,
            cursor: 0,
        };
        for i in 0..moves.len() {
            let mv = moves[i];
            if !mv.is_promotion() && !is_capture(board, mv) {
                continue;
            }
            picker.moves[picker.len] = mv;
            picker.scores[picker.len] = score_noisy(board, mv);
            picker.len += 1;
        }
        picker
    }

    /// One selection-sort step: swap the best remaining move to the cursor
    /// and yield it with its ordering score.
    pub fn pick_next(&mut self) -> Option<(Move, i32)> {
        if self.cursor >= self.len {
            return None;
        }

        let mut best_idx = self.cursor;
        for i in (self.cursor + 1)..self.len {
            if self.scores[i] > self.scores[best_idx] {
                best_idx = i;
            }
        }

        self.moves.swap(self.cursor, best_idx);
        self.scores.swap(self.cursor, best_idx);

        let picked = (self.moves[self.cursor], self.scores[self.cursor]);
        self.cursor += 1;
        Some(picked)
    }

    /// Moves yielded so far, in yield order (the last entry is the move
    /// most recently returned by [`pick_next`](Self::pick_next)).
    pub fn picked(&self) -> &[Move] {
        &self.moves[..self.cursor]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_core::{Board, Color, Square, generate_legal_moves};

    fn empty_heuristics() -> (KillerTable, CounterTable, HistoryTable) {
        (KillerTable::new(), CounterTable::new(), HistoryTable::new())
    }

    fn main_picker(board: &Board, tt_move: Move) -> MovePicker {
        let moves = generate_legal_moves(board);
        let (killers, counters, history) = empty_heuristics();
        MovePicker::new_main(&moves, board, tt_move, &killers, &counters, &history, Move::NULL, 0)
    }

    #[test]
    fn score_tiers_are_ordered() {
        assert!(HASH > GOOD_CAPTURE + 200);
        assert!(GOOD_CAPTURE > KILLER1);
        assert!(KILLER1 > KILLER2);
        assert!(KILLER2 > COUNTER);
        assert!(COUNTER > 0);
        assert!(BAD_CAPTURE < 0);
    }

    #[test]
    fn pawn_takes_queen_beats_queen_takes_pawn() {
        assert!(
            MVV_LVA[PieceKind::Queen.index()][PieceKind::Pawn.index()]
                > MVV_LVA[PieceKind::Pawn.index()][PieceKind::Queen.index()]
        );
    }

    #[test]
    fn tt_move_yielded_first() {
        let board = Board::starting_position();
        let moves = generate_legal_moves(&board);
        let tt_move = moves[10];
        let mut picker = main_picker(&board, tt_move);
        let (first, score) = picker.pick_next().unwrap();
        assert_eq!(first, tt_move);
        assert_eq!(score, HASH);
    }

    #[test]
    fn good_capture_before_quiets() {
        // White queen on d4 can take the undefended pawn on e5.
        let board: Board = "4k3/8/8/4p3/3Q4/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut picker = main_picker(&board, Move::NULL);
        let (first, score) = picker.pick_next().unwrap();
        assert_eq!(first.dest(), Square::E5);
        assert!(score >= GOOD_CAPTURE);
    }

    #[test]
    fn losing_capture_sorts_below_quiets() {
        // Queen takes a pawn defended by another pawn: SEE-losing.
        let board: Board = "4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&board);
        let (killers, counters, history) = empty_heuristics();
        let qxc5 = moves
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.source() == Square::E3 && m.dest() == Square::C5)
            .unwrap();
        let score = score_move(&board, qxc5, Move::NULL, &killers, &counters, &history, Move::NULL, 0);
        assert!(score < BAD_CAPTURE / 2, "got {score}");
    }

    #[test]
    fn killer_and_counter_tiers() {
        let board = Board::starting_position();
        let moves = generate_legal_moves(&board);
        let (mut killers, mut counters, history) = empty_heuristics();

        let k1 = moves[3];
        let k2 = moves[4];
        let reply = moves[5];
        let previous = Move::new(Square::E7, Square::E5);

        killers.store(2, k2);
        killers.store(2, k1);
        counters.store(previous, reply);

        let score_of = |mv: Move| {
            score_move(&board, mv, Move::NULL, &killers, &counters, &history, previous, 2)
        };
        assert_eq!(score_of(k1), KILLER1);
        assert_eq!(score_of(k2), KILLER2);
        assert_eq!(score_of(reply), COUNTER);
    }

    #[test]
    fn quiet_history_score_capped_below_counter() {
        let board = Board::starting_position();
        let moves = generate_legal_moves(&board);
        let (killers, counters, mut history) = empty_heuristics();
        let mv = moves[0];
        // Pump the history far past the cap.
        for _ in 0..2000 {
            history.add_history(Color::White, mv, 30);
        }
        let score =
            score_move(&board, mv, Move::NULL, &killers, &counters, &history, Move::NULL, 0);
        assert_eq!(score, COUNTER - 1);
    }

    #[test]
    fn noisy_picker_empty_in_quiet_position() {
        let board = Board::starting_position();
        let moves = generate_legal_moves(&board);
        let mut picker = MovePicker::new_noisy(&moves, &board);
        assert!(picker.pick_next().is_none());
    }

    #[test]
    fn noisy_picker_yields_captures_and_promotions() {
        // Pawn on e7 can promote; queen on d4 can capture e5.
        let board: Board = "7k/4P3/8/4p3/3Q4/8/8/4K3 w - - 0 1".parse().unwrap();
        let moves = generate_legal_moves(&board);
        let mut picker = MovePicker::new_noisy(&moves, &board);
        let mut yielded = Vec::new();
        while let Some((mv, _)) = picker.pick_next() {
            yielded.push(mv);
        }
        assert!(yielded.iter().all(|m| m.is_promotion() || is_capture(&board, *m)));
        // 4 promotions + Qxe5.
        assert_eq!(yielded.len(), 5);
    }

    #[test]
    fn picked_tracks_yield_order() {
        let board = Board::starting_position();
        let mut picker = main_picker(&board, Move::NULL);
        let (first, _) = picker.pick_next().unwrap();
        let (second, _) = picker.pick_next().unwrap();
        assert_eq!(picker.picked(), &[first, second]);
    }

    #[test]
    fn lmp_table_matches_formula() {
        assert_eq!(LMP[0][4], (3 + 16) / 2);
        assert_eq!(LMP[1][4], 3 + 16);
        // Improving nodes always tolerate more moves.
        for d in 1..TABLE_DEPTHS {
            assert!(LMP[1][d] >= LMP[0][d]);
        }
    }

    #[test]
    fn see_margin_matches_formula() {
        assert_eq!(SEE_MARGIN[0][3], -20 * 9);
        assert_eq!(SEE_MARGIN[1][3], -70 * 3);
    }

    #[test]
    fn futility_table_matches_formula() {
        assert_eq!(FUTILITY[6], 6 * FUTILITY_MARGIN);
    }

    #[test]
    fn lmr_grows_with_depth_and_move_count() {
        let shallow = lmr_reduction(3, 2);
        let deep = lmr_reduction(30, 30);
        assert!(deep > shallow);
        assert_eq!(lmr_reduction(1, 1), 0);
        // Out-of-range indices clamp instead of panicking.
        assert_eq!(lmr_reduction(200, 200), lmr_reduction(63, 63));
    }
}
