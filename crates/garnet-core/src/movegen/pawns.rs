//! Pawn moves: pushes, captures, promotions, en passant.

use crate::attacks::{line, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, PromotionPiece};
use crate::color::Color;
use crate::piece_kind::PieceKind;
use crate::square::Square;

use super::MoveList;

/// Generate pawn moves. `EVASIONS` is set when the king is in check, in
/// which case en passant must additionally resolve the check.
pub(super) fn gen_pawns<const EVASIONS: bool>(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = us.flip();
    let enemy = board.side(them);
    let occupied = board.occupied();
    let empty = !occupied;
    let pawns = board.pieces(PieceKind::Pawn) & board.side(us);

    let (forward, promo_rank, double_rank) = match us {
        Color::White => (8i8, Bitboard::RANK_8, Bitboard::RANK_4),
        Color::Black => (-8i8, Bitboard::RANK_1, Bitboard::RANK_5),
    };
    let advance = |bb: Bitboard| match us {
        Color::White => bb << 8,
        Color::Black => bb >> 8,
    };
    // A pinned pawn may only move along the line its pin runs on.
    let pin_allows =
        |src: Square, dst: Square| !pinned.contains(src) || line(king_sq, src).contains(dst);
    let source_of = |dst: Square, steps: i8| {
        Square::from_index_unchecked((dst.index() as i8 - steps * forward) as u8)
    };

    // Pushes: one step into an empty square, two from the home rank. The
    // double push is derived before the check mask cuts the single-push
    // set, since its intermediate square need not block the check.
    let reachable = advance(pawns) & empty;
    let double = advance(reachable) & empty & double_rank & check_mask;
    let single = reachable & check_mask;

    for dst in single & !promo_rank {
        let src = source_of(dst, 1);
        if pin_allows(src, dst) {
            list.push(Move::new(src, dst));
        }
    }

    for dst in single & promo_rank {
        let src = source_of(dst, 1);
        if pin_allows(src, dst) {
            for promo in PromotionPiece::ALL {
                list.push(Move::new_promotion(src, dst, promo));
            }
        }
    }

    for dst in double {
        let src = source_of(dst, 2);
        if pin_allows(src, dst) {
            list.push(Move::new(src, dst));
        }
    }

    // Captures, promoting on the last rank.
    for src in pawns {
        for dst in pawn_attacks(us, src) & enemy & check_mask {
            if !pin_allows(src, dst) {
                continue;
            }
            if promo_rank.contains(dst) {
                for promo in PromotionPiece::ALL {
                    list.push(Move::new_promotion(src, dst, promo));
                }
            } else {
                list.push(Move::new(src, dst));
            }
        }
    }

    // En passant. The victim does not stand on the target square, which
    // makes this the one move where two pieces leave their squares at
    // once, so it gets its own legality checks.
    if let Some(ep_sq) = board.en_passant() {
        let victim_sq = Square::from_index_unchecked(match us {
            Color::White => ep_sq.index() as u8 - 8,
            Color::Black => ep_sq.index() as u8 + 8,
        });

        for src in pawn_attacks(them, ep_sq) & pawns {
            // When evading, the capture must block the check or remove
            // the checking pawn.
            if EVASIONS && !check_mask.contains(ep_sq) && !check_mask.contains(victim_sq) {
                continue;
            }

            if !pin_allows(src, ep_sq) {
                continue;
            }

            // Removing both pawns at once can uncover a rook or queen on
            // the rank they shared with the king.
            let after = (occupied ^ src.bitboard() ^ victim_sq.bitboard()) | ep_sq.bitboard();
            let rank_sliders =
                (board.pieces(PieceKind::Rook) | board.pieces(PieceKind::Queen)) & enemy;
            if (rook_attacks(king_sq, after) & rank_sliders).is_nonempty() {
                continue;
            }

            list.push(Move::new_en_passant(src, ep_sq));
        }
    }
}
