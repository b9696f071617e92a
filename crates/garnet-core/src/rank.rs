//! Board ranks 1 through 8.

use std::fmt;

/// A row of the board. `Rank1` is White's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    Rank1 = 0,
    Rank2 = 1,
    Rank3 = 2,
    Rank4 = 3,
    Rank5 = 4,
    Rank6 = 5,
    Rank7 = 6,
    Rank8 = 7,
}

impl Rank {
    /// Number of ranks.
    pub const COUNT: usize = 8;

    /// All ranks, 1 through 8.
    pub const ALL: [Rank; Rank::COUNT] = [
        Rank::Rank1,
        Rank::Rank2,
        Rank::Rank3,
        Rank::Rank4,
        Rank::Rank5,
        Rank::Rank6,
        Rank::Rank7,
        Rank::Rank8,
    ];

    /// Array index, 0 through 7.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank for a zero-based index; `None` past the eighth.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Rank> {
        if (index as usize) < Rank::COUNT {
            Some(Rank::ALL[index as usize])
        } else {
            None
        }
    }
}

impl fmt::Display for Rank {
    /// The algebraic digit, `1` through `8`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn index_and_from_index_agree() {
        for (i, rank) in Rank::ALL.into_iter().enumerate() {
            assert_eq!(rank.index(), i);
            assert_eq!(Rank::from_index(i as u8), Some(rank));
        }
        assert_eq!(Rank::from_index(8), None);
        assert_eq!(Rank::from_index(u8::MAX), None);
    }

    #[test]
    fn algebraic_digits_and_order() {
        assert_eq!(Rank::Rank1.to_string(), "1");
        assert_eq!(Rank::Rank8.to_string(), "8");
        assert!(Rank::Rank1 < Rank::Rank8);
    }
}
