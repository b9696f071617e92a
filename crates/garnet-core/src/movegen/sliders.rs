//! Bishop, rook, and queen moves.

use crate::attacks::{bishop_attacks, line, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::Move;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::MoveList;

/// Generate slider moves into `targets` (non-friendly squares, already
/// intersected with the check mask when evading).
pub(super) fn gen_sliders(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    targets: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let ours = board.side(us);
    let occupied = board.occupied();

    let sliders: [(PieceKind, fn(Square, Bitboard) -> Bitboard); 3] = [
        (PieceKind::Bishop, bishop_attacks),
        (PieceKind::Rook, rook_attacks),
        (PieceKind::Queen, queen_attacks),
    ];

    for (kind, attacks) in sliders {
        for src in board.pieces(kind) & ours {
            let mut reachable = attacks(src, occupied) & targets;
            // A pinned slider may still slide, but only along the pin.
            if pinned.contains(src) {
                reachable &= line(king_sq, src);
            }
            for dst in reachable {
                list.push(Move::new(src, dst));
            }
        }
    }
}
