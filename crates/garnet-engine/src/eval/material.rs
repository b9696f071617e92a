//! Material counting with a bishop-pair bonus.

use garnet_core::{Board, Color, PieceKind};

use crate::eval::score::{S, Score};

/// Tapered piece values indexed by [`PieceKind::index()`]. Minor pieces
/// hold their value into the endgame; rooks and queens gain a little as
/// the board empties. The king carries no material value.
pub const PIECE_VALUE: [Score; PieceKind::COUNT] = [
    S(100, 120), // pawn
    S(320, 310), // knight
    S(330, 320), // bishop
    S(500, 520), // rook
    S(900, 950), // queen
    S(0, 0),     // king
];

/// Two bishops cover both square colors; worth a markup on their summed
/// value, growing in open endgame positions.
const BISHOP_PAIR: Score = S(50, 60);

/// Material balance from White's perspective.
pub fn material(board: &Board) -> Score {
    side_material(board, Color::White) - side_material(board, Color::Black)
}

/// One side's total material plus its bishop-pair bonus.
fn side_material(board: &Board, color: Color) -> Score {
    let own = board.side(color);

    let mut total = Score::ZERO;
    for kind in PieceKind::ALL {
        let count = (board.pieces(kind) & own).count() as i16;
        total += PIECE_VALUE[kind.index()] * count;
    }

    if (board.pieces(PieceKind::Bishop) & own).count() >= 2 {
        total += BISHOP_PAIR;
    }

    total
}
