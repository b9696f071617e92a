//! Zobrist keys, generated at compile time from a fixed seed.

use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::file::File;
use crate::piece::Piece;
use crate::square::Square;

/// Every key the hash is composed from, filled by one pass over a
/// deterministic pseudo-random stream.
struct Keys {
    pieces: [[u64; Square::COUNT]; Piece::COUNT],
    turn: u64,
    castling: [u64; 16],
    en_passant: [u64; File::COUNT],
}

const SEED: u64 = 0x47a5_2e76_0c91_d3b8;

/// splitmix64 step: returns `(key, next_state)`.
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    (z ^ (z >> 31), next)
}

const fn generate() -> Keys {
    let mut keys = Keys {
        pieces: [[0; Square::COUNT]; Piece::COUNT],
        turn: 0,
        castling: [0; 16],
        en_passant: [0; File::COUNT],
    };
    let mut state = SEED;

    let mut p = 0;
    while p < Piece::COUNT {
        let mut sq = 0;
        while sq < Square::COUNT {
            let (key, next) = splitmix64(state);
            keys.pieces[p][sq] = key;
            state = next;
            sq += 1;
        }
        p += 1;
    }

    let (key, next) = splitmix64(state);
    keys.turn = key;
    state = next;

    let mut c = 0;
    while c < 16 {
        let (key, next) = splitmix64(state);
        keys.castling[c] = key;
        state = next;
        c += 1;
    }

    let mut f = 0;
    while f < File::COUNT {
        let (key, next) = splitmix64(state);
        keys.en_passant[f] = key;
        state = next;
        f += 1;
    }

    let _ = state;
    keys
}

static KEYS: Keys = generate();

/// Key for `piece` standing on `sq`.
#[inline]
pub(crate) fn piece(piece: Piece, sq: Square) -> u64 {
    KEYS.pieces[piece.index()][sq.index()]
}

/// Key XORed in whenever Black is to move.
#[inline]
pub(crate) fn turn() -> u64 {
    KEYS.turn
}

/// Key for a castling-rights configuration.
#[inline]
pub(crate) fn castling(rights: CastleRights) -> u64 {
    KEYS.castling[rights.bits() as usize]
}

/// Key for an en passant target on `file`. Only the file matters: the
/// rank is implied by the side to move.
#[inline]
pub(crate) fn en_passant_file(file: File) -> u64 {
    KEYS.en_passant[file.index()]
}

/// Hash a board from nothing. The incremental updates in `make_move`
/// must always agree with this.
pub(crate) fn full_hash(board: &Board) -> u64 {
    let mut hash = 0u64;

    for p in Piece::ALL {
        for sq in board.pieces(p.kind()) & board.side(p.color()) {
            hash ^= piece(p, sq);
        }
    }

    if board.side_to_move() == Color::Black {
        hash ^= turn();
    }

    hash ^= castling(board.castling());

    if let Some(ep_sq) = board.en_passant() {
        hash ^= en_passant_file(ep_sq.file());
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_keys_are_distinct() {
        let mut keys: Vec<u64> = KEYS.pieces.iter().flatten().copied().collect();
        keys.push(KEYS.turn);
        keys.extend_from_slice(&KEYS.castling);
        keys.extend_from_slice(&KEYS.en_passant);

        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total, "key stream produced a collision");
        assert!(!keys.contains(&0), "a zero key would be invisible to XOR");
    }

    #[test]
    fn hash_depends_on_every_state_component() {
        let base: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1"
            .parse()
            .unwrap();
        let other_side: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse()
            .unwrap();
        let no_castling: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w - - 0 1"
            .parse()
            .unwrap();
        let with_ep: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e3 0 1"
            .parse()
            .unwrap();

        let hashes = [
            full_hash(&base),
            full_hash(&other_side),
            full_hash(&no_castling),
            full_hash(&with_ep),
        ];
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn clocks_do_not_affect_the_hash() {
        // The halfmove clock and move number stay out of the hash so
        // transpositions at different game stages share entries.
        let early: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1".parse().unwrap();
        let late: Board = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 42 90".parse().unwrap();
        assert_eq!(full_hash(&early), full_hash(&late));
    }

    #[test]
    fn board_field_matches_full_hash() {
        let board = Board::starting_position();
        assert_ne!(board.hash(), 0);
        assert_eq!(board.hash(), full_hash(&board));
    }
}
