//! Perft: exhaustive move-path counting to validate the generator.

use crate::board::Board;
use crate::movegen::generate_legal_moves;

/// Count leaf nodes of the legal move tree at `depth`.
///
/// Depth 0 is the position itself. At depth 1 the move count is returned
/// directly (bulk counting) instead of making each move.
pub fn perft(board: &Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal_moves(board);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for mv in moves.as_slice() {
        let child = board.make_move(*mv);
        nodes += perft(&child, depth - 1);
    }
    nodes
}

/// Perft with a per-root-move breakdown, sorted by UCI notation.
///
/// The standard tool for bisecting a generator bug: compare each line
/// against a known-good engine and descend into the first mismatch.
pub fn divide(board: &Board, depth: usize) -> Vec<(String, u64)> {
    let moves = generate_legal_moves(board);
    let mut results: Vec<(String, u64)> = moves
        .as_slice()
        .iter()
        .map(|mv| {
            let child = board.make_move(*mv);
            let count = if depth <= 1 { 1 } else { perft(&child, depth - 1) };
            (mv.to_uci(), count)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::fen::STARTING_FEN;

    /// Reference positions with known node counts per depth, from the
    /// standard perft suite. Exercises castling, en passant, promotions,
    /// pins, and discovered checks.
    const SUITE: &[(&str, &[u64])] = &[
        (STARTING_FEN, &[20, 400, 8_902, 197_281]),
        // "Kiwipete": dense middlegame with every special move available.
        (
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &[48, 2_039, 97_862, 4_085_603],
        ),
        // Endgame with en passant pins along the fifth rank.
        ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2_812, 43_238]),
        // Promotion-heavy position.
        (
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[6, 264, 9_467, 422_333],
        ),
        // "Position 5": castling legality edge cases.
        (
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            &[44, 1_486, 62_379, 2_103_487],
        ),
    ];

    #[test]
    fn perft_suite_shallow_depths() {
        for (fen, expected) in SUITE {
            let board: Board = fen.parse().unwrap();
            for (depth, &nodes) in expected.iter().enumerate().take(3) {
                assert_eq!(perft(&board, depth + 1), nodes, "{fen} at depth {}", depth + 1);
            }
        }
    }

    #[test]
    fn perft_suite_depth_four() {
        for (fen, expected) in SUITE {
            let board: Board = fen.parse().unwrap();
            assert_eq!(perft(&board, 4), expected[3], "{fen} at depth 4");
        }
    }

    #[test]
    #[ignore] // slow
    fn perft_startpos_depth_five() {
        let board = Board::starting_position();
        assert_eq!(perft(&board, 5), 4_865_609);
    }

    #[test]
    fn perft_depth_zero_is_one() {
        assert_eq!(perft(&Board::starting_position(), 0), 1);
    }

    #[test]
    fn divide_sums_to_perft() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let breakdown = divide(&board, 3);
        assert_eq!(breakdown.len(), 48);
        let total: u64 = breakdown.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&board, 3));
        // Sorted by move notation for stable diffing.
        for pair in breakdown.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
