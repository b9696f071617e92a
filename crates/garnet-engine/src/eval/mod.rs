//! Static evaluation: tapered material + piece-square scoring.

pub mod material;
pub mod phase;
pub mod pst;
pub mod score;

use garnet_core::{Board, Color, PieceKind};

use self::phase::{MAX_PHASE, game_phase};
use self::pst::square_bonus;
use self::score::Score;

/// Flat material scale in centipawns, indexed by [`PieceKind::index()`].
///
/// Shared by SEE and quiescence delta pruning, which need a single phase-free
/// value per piece type. The king value dwarfs any exchange sequence so SEE
/// never trades into an illegal king capture.
pub const STATIC_MATERIAL_VALUE: [i32; PieceKind::COUNT] = [100, 320, 330, 500, 900, 20_000];

/// Tempo bonus for the side to move.
const TEMPO: i32 = 10;

/// Static evaluation in centipawns from the side to move's perspective.
///
/// Sums material balance and piece-square bonuses (both White-relative),
/// tapers middlegame against endgame values by remaining material, then
/// flips the sign for Black and adds a tempo bonus.
pub fn evaluate(board: &Board) -> i32 {
    let mut total = material::material(board);

    for color in Color::ALL {
        let sign = match color {
            Color::White => 1i16,
            Color::Black => -1i16,
        };
        for kind in PieceKind::ALL {
            for sq in board.pieces(kind) & board.side(color) {
                total += square_bonus(kind, color, sq) * sign;
            }
        }
    }

    let white_cp = taper(total, game_phase(board));

    let stm_cp = match board.side_to_move() {
        Color::White => white_cp,
        Color::Black => -white_cp,
    };
    stm_cp + TEMPO
}

/// Blend middlegame and endgame components by game phase.
fn taper(score: Score, phase: i32) -> i32 {
    let mg = score.mg() as i32;
    let eg = score.eg() as i32;
    (mg * phase + eg * (MAX_PHASE - phase)) / MAX_PHASE
}
