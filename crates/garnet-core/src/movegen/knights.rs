//! Knight moves.

use crate::attacks::knight_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece_kind::PieceKind;

use super::MoveList;

/// Generate knight moves into `targets` (non-friendly squares, already
/// intersected with the check mask when evading).
///
/// Pinned knights are excluded up front: a knight's move always leaves
/// any line it stood on.
pub(super) fn gen_knights(board: &Board, pinned: Bitboard, targets: Bitboard, list: &mut MoveList) {
    let us = board.side_to_move();
    let knights = board.pieces(PieceKind::Knight) & board.side(us) & !pinned;

    for src in knights {
        for dst in knight_attacks(src) & targets {
            list.push(Move::new(src, dst));
        }
    }
}
