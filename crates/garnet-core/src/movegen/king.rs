//! King moves and castling.

use crate::attacks::king_attacks;
use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::chess_move::Move;
use crate::square::Square;

use super::MoveList;
use super::square_attacked;

/// One castling option: the right that allows it, the squares that must
/// be empty, and the squares the king crosses that must be safe.
struct CastleLane {
    right: CastleRights,
    empty: &'static [Square],
    safe: [Square; 2],
    king_from: Square,
    king_to: Square,
}

/// The four lanes, grouped by `Color::index()`.
static LANES: [[CastleLane; 2]; 2] = [
    [
        CastleLane {
            right: CastleRights::WHITE_KING,
            empty: &[Square::F1, Square::G1],
            safe: [Square::F1, Square::G1],
            king_from: Square::E1,
            king_to: Square::G1,
        },
        CastleLane {
            right: CastleRights::WHITE_QUEEN,
            empty: &[Square::B1, Square::C1, Square::D1],
            safe: [Square::C1, Square::D1],
            king_from: Square::E1,
            king_to: Square::C1,
        },
    ],
    [
        CastleLane {
            right: CastleRights::BLACK_KING,
            empty: &[Square::F8, Square::G8],
            safe: [Square::F8, Square::G8],
            king_from: Square::E8,
            king_to: Square::G8,
        },
        CastleLane {
            right: CastleRights::BLACK_QUEEN,
            empty: &[Square::B8, Square::C8, Square::D8],
            safe: [Square::C8, Square::D8],
            king_from: Square::E8,
            king_to: Square::C8,
        },
    ],
];

/// Generate king steps and castling.
pub(super) fn gen_king(board: &Board, king_sq: Square, list: &mut MoveList) {
    let us = board.side_to_move();
    let them = us.flip();

    // Destination safety is probed with the king lifted off the board, so
    // it cannot shelter behind its own square from a slider.
    let without_king = board.occupied() ^ king_sq.bitboard();
    for dst in king_attacks(king_sq) & !board.side(us) {
        if !square_attacked(board, dst, them, without_king) {
            list.push(Move::new(king_sq, dst));
        }
    }

    // No castling out of check.
    let occupied = board.occupied();
    if square_attacked(board, king_sq, them, occupied) {
        return;
    }

    for lane in &LANES[us.index()] {
        if board.castling().contains(lane.right)
            && !lane.empty.iter().any(|&sq| occupied.contains(sq))
            && !lane.safe.iter().any(|&sq| square_attacked(board, sq, them, occupied))
        {
            list.push(Move::new_castle(lane.king_from, lane.king_to));
        }
    }
}
