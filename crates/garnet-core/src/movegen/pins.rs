//! Checker and pin detection for legal generation.

use crate::attacks::{between, bishop_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::piece_kind::PieceKind;

/// Find the enemy pieces giving check and the friendly pieces pinned to
/// the king.
///
/// Checkers decide between normal generation, evasions, and king-only
/// moves; pinned pieces are restricted to the line through the king.
pub(crate) fn find_checkers_and_pins(board: &Board) -> (Bitboard, Bitboard) {
    let us = board.side_to_move();
    let them = us.flip();
    let king_sq = board.king_square(us);
    let ours = board.side(us);
    let theirs = board.side(them);
    let occupied = board.occupied();

    // Leapers give check or they don't; they can never pin.
    let mut checkers = ((knight_attacks(king_sq) & board.pieces(PieceKind::Knight))
        | (pawn_attacks(us, king_sq) & board.pieces(PieceKind::Pawn)))
        & theirs;
    let mut pinned = Bitboard::EMPTY;

    // Enemy sliders aligned with the king, seen on an empty board: with
    // nothing between them they give check, with exactly one friendly
    // piece between they pin it.
    let queens = board.pieces(PieceKind::Queen);
    let diagonal =
        bishop_attacks(king_sq, Bitboard::EMPTY) & (board.pieces(PieceKind::Bishop) | queens);
    let orthogonal =
        rook_attacks(king_sq, Bitboard::EMPTY) & (board.pieces(PieceKind::Rook) | queens);

    for attacker_sq in (diagonal | orthogonal) & theirs {
        let blockers = between(king_sq, attacker_sq) & occupied;
        match blockers.count() {
            0 => checkers |= attacker_sq.bitboard(),
            1 => pinned |= blockers & ours,
            _ => {}
        }
    }

    (checkers, pinned)
}
