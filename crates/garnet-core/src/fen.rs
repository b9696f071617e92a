//! FEN parsing and printing.

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::file::File;
use crate::piece_kind::PieceKind;
use crate::rank::Rank;
use crate::square::Square;
use crate::zobrist;

/// The standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    /// Parse the six FEN fields: placement, active color, castling,
    /// en passant, halfmove clock, fullmove number. The board is
    /// structurally validated and its Zobrist hash computed before it is
    /// returned, so a parsed board is always search-ready.
    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::WrongFieldCount {
                found: fields.len(),
            });
        }

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }

        let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        // FEN lists ranks top-down, 8 first.
        for (rank_index, rank_str) in ranks.iter().enumerate() {
            let rank = Rank::from_index(7 - rank_index as u8).unwrap();
            let mut file_index: u8 = 0;

            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(FenError::InvalidPieceChar { character: c });
                    }
                    file_index += digit as u8;
                } else {
                    let kind = PieceKind::from_fen_char(c)
                        .ok_or(FenError::InvalidPieceChar { character: c })?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };

                    if file_index >= 8 {
                        return Err(FenError::BadRankLength {
                            rank_index,
                            length: file_index as usize + 1,
                        });
                    }

                    let sq = Square::new(rank, File::from_index(file_index).unwrap());
                    pieces[kind.index()] = pieces[kind.index()] | sq.bitboard();
                    sides[color.index()] = sides[color.index()] | sq.bitboard();
                    file_index += 1;
                }
            }

            if file_index != 8 {
                return Err(FenError::BadRankLength {
                    rank_index,
                    length: file_index as usize,
                });
            }
        }

        let occupied = sides[Color::White.index()] | sides[Color::Black.index()];

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                });
            }
        };

        let castling = CastleRights::from_fen(fields[2])?;

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(Square::from_algebraic(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?)
        };

        let halfmove_clock =
            fields[4]
                .parse::<u16>()
                .map_err(|_| FenError::InvalidMoveCounter {
                    field: "halfmove clock",
                    found: fields[4].to_string(),
                })?;

        let fullmove_number =
            fields[5]
                .parse::<u16>()
                .map_err(|_| FenError::InvalidMoveCounter {
                    field: "fullmove number",
                    found: fields[5].to_string(),
                })?;

        let mut board = Board::from_raw(
            pieces,
            sides,
            occupied,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            0,
        );
        board.validate()?;
        board.set_hash(zobrist::full_hash(&board));
        Ok(board)
    }
}

impl fmt::Display for Board {
    /// Serialize to FEN. Inverse of the `FromStr` parser for every board
    /// the parser accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank_idx in (0u8..8).rev() {
            let rank = Rank::from_index(rank_idx).unwrap();
            let mut empty_count = 0u8;

            for file_idx in 0u8..8 {
                let sq = Square::new(rank, File::from_index(file_idx).unwrap());

                match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(kind), Some(color)) => {
                        if empty_count > 0 {
                            write!(f, "{empty_count}")?;
                            empty_count = 0;
                        }
                        let c = match color {
                            Color::White => kind.fen_char().to_ascii_uppercase(),
                            Color::Black => kind.fen_char(),
                        };
                        write!(f, "{c}")?;
                    }
                    _ => empty_count += 1,
                }
            }

            if empty_count > 0 {
                write!(f, "{empty_count}")?;
            }
            if rank_idx > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {}", self.side_to_move())?;
        write!(f, " {}", self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}

#[cfg(test)]
mod tests {
    use super::STARTING_FEN;
    use crate::board::Board;
    use crate::zobrist::full_hash;

    #[track_caller]
    fn roundtrip(fen: &str) {
        let board: Board = fen.parse().unwrap();
        assert_eq!(format!("{board}"), fen);
        // A parsed board always carries a valid incremental hash.
        assert_eq!(board.hash(), full_hash(&board));
    }

    #[test]
    fn roundtrips_assorted_positions() {
        roundtrip(STARTING_FEN);
        // Sicilian with an en passant target.
        roundtrip("rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2");
        // Kiwipete.
        roundtrip("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        // Sparse endgame, no castling rights.
        roundtrip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        // Black to move, nonzero clocks.
        roundtrip("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    }

    #[test]
    fn constructor_and_fen_agree_on_the_start_position() {
        let from_fen: Board = STARTING_FEN.parse().unwrap();
        assert_eq!(Board::starting_position(), from_fen);
        assert_eq!(Board::starting_position().hash(), from_fen.hash());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let bad = [
            "e4 e5",                                                      // too few fields
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1",   // bad piece char
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",    // short rank
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",   // bad color
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1",   // bad castling
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",  // bad ep square
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - abc 1", // bad clock
        ];
        for fen in bad {
            assert!(fen.parse::<Board>().is_err(), "accepted: {fen}");
        }
    }

    #[test]
    fn structurally_invalid_boards_are_rejected() {
        // Two white kings.
        assert!(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNK w KQkq - 0 1"
                .parse::<Board>()
                .is_err()
        );
        // Pawn on the back rank.
        assert!(
            "Pnbqkbnr/1ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
                .parse::<Board>()
                .is_err()
        );
    }
}
