//! Error types for FEN parsing and board validation.

/// Why a FEN string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The string does not have the six space-separated FEN fields.
    #[error("expected 6 FEN fields, found {found}")]
    WrongFieldCount {
        /// Number of fields found.
        found: usize,
    },

    /// The placement field does not describe eight ranks.
    #[error("expected 8 ranks in piece placement, found {found}")]
    WrongRankCount {
        /// Number of ranks found.
        found: usize,
    },

    /// One rank of the placement covers more or fewer than eight squares.
    #[error("rank {rank_index} describes {length} squares, expected 8")]
    BadRankLength {
        /// Zero-based rank position in the FEN string (0 = rank 8).
        rank_index: usize,
        /// Squares the rank actually described.
        length: usize,
    },

    /// The placement contains a letter that names no piece.
    #[error("invalid piece character: '{character}'")]
    InvalidPieceChar {
        /// The offending character.
        character: char,
    },

    /// The active-color field is neither `w` nor `b`.
    #[error("invalid active color: \"{found}\"")]
    InvalidColor {
        /// The offending field.
        found: String,
    },

    /// The castling field contains a letter other than `KQkq`.
    #[error("invalid castling character: '{character}'")]
    InvalidCastlingChar {
        /// The offending character.
        character: char,
    },

    /// The en passant field is neither `-` nor a square.
    #[error("invalid en passant square: \"{found}\"")]
    InvalidEnPassant {
        /// The offending field.
        found: String,
    },

    /// A move counter is not a number.
    #[error("invalid {field}: \"{found}\"")]
    InvalidMoveCounter {
        /// Which counter ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The offending field.
        found: String,
    },

    /// The fields parsed but describe an impossible board.
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),
}

/// Structural problems a [`Board`](crate::board::Board) can be rejected for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A side does not have exactly one king.
    #[error("expected 1 king for {color}, found {count}")]
    InvalidKingCount {
        /// Which side has the wrong king count.
        color: &'static str,
        /// Kings found for that side.
        count: u32,
    },

    /// Pawns stand on the first or eighth rank.
    #[error("pawns found on back rank")]
    PawnsOnBackRank,

    /// Two piece bitboards claim the same square.
    #[error("overlapping piece bitboards")]
    OverlappingPieces,

    /// The cached occupancy disagrees with the side bitboards.
    #[error("occupied bitboard is inconsistent with side bitboards")]
    InconsistentOccupied,

    /// The two side bitboards overlap.
    #[error("white and black side bitboards overlap")]
    InconsistentSides,
}

#[cfg(test)]
mod tests {
    use super::{BoardError, FenError};

    #[test]
    fn messages_name_the_problem() {
        let err = FenError::WrongFieldCount { found: 4 };
        assert_eq!(err.to_string(), "expected 6 FEN fields, found 4");

        let err = FenError::InvalidCastlingChar { character: 'x' };
        assert_eq!(err.to_string(), "invalid castling character: 'x'");

        assert_eq!(BoardError::PawnsOnBackRank.to_string(), "pawns found on back rank");
    }

    #[test]
    fn board_errors_convert_and_chain() {
        let fen_err: FenError = BoardError::OverlappingPieces.into();
        assert!(matches!(fen_err, FenError::InvalidBoard(_)));
        assert_eq!(fen_err.to_string(), "invalid board: overlapping piece bitboards");
        // The source chain surfaces the underlying board error.
        assert!(std::error::Error::source(&fen_err).is_some());
    }
}
