//! Draw detection: repetition, insufficient material, and the fifty-move rule.
//!
//! Draws always score exactly 0. A single recurrence of a position on the
//! current line counts as a repetition draw — waiting for the formal
//! threefold would only delay the inevitable score.

use garnet_core::{Board, Color, PieceKind};

/// Return `true` if the current position already occurred among
/// `prior_hashes` (most recent last), within the reach of the halfmove
/// clock. Positions older than the last irreversible move can never repeat.
pub fn is_repetition(board: &Board, prior_hashes: &[u64]) -> bool {
    let window = board.halfmove_clock() as usize;
    prior_hashes
        .iter()
        .rev()
        .take(window)
        .any(|&h| h == board.hash())
}

/// Return `true` if neither side can possibly deliver checkmate.
///
/// Covers K vs K, K+minor vs K, and KNN vs K. Positions with any pawn,
/// rook, or queen are never material draws.
pub fn is_material_draw(board: &Board) -> bool {
    let pawns = board.pieces(PieceKind::Pawn);
    let rooks = board.pieces(PieceKind::Rook);
    let queens = board.pieces(PieceKind::Queen);
    if (pawns | rooks | queens).is_nonempty() {
        return false;
    }

    let knights = board.pieces(PieceKind::Knight);
    let bishops = board.pieces(PieceKind::Bishop);
    let minors = knights.count() + bishops.count();

    if minors <= 1 {
        return true;
    }

    // Two knights on the same side cannot force mate against a bare king.
    if minors == 2 && bishops.is_empty() {
        let white_knights = (knights & board.side(Color::White)).count();
        return white_knights == 2 || white_knights == 0;
    }

    false
}

/// Combined draw test used at every search node.
pub fn is_draw(board: &Board, prior_hashes: &[u64]) -> bool {
    board.halfmove_clock() > 99 || is_material_draw(board) || is_repetition(board, prior_hashes)
}
