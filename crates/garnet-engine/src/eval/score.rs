//! Paired middlegame/endgame score arithmetic.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// An evaluation term carrying separate middlegame and endgame values.
///
/// Terms accumulate componentwise through the evaluation; the final
/// tapering step blends the two halves by game phase. `i16` components
/// keep the struct register-sized while holding any realistic sum.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Score {
    mg: i16,
    eg: i16,
}

impl Score {
    /// The zero term.
    pub const ZERO: Score = S(0, 0);

    /// Middlegame component.
    #[inline]
    pub const fn mg(self) -> i16 {
        self.mg
    }

    /// Endgame component.
    #[inline]
    pub const fn eg(self) -> i16 {
        self.eg
    }
}

/// Term constructor. The terse uppercase name is the convention across
/// hand-crafted evaluations, where tables of hundreds of terms need to
/// stay readable.
#[allow(non_snake_case)]
#[inline]
pub const fn S(mg: i16, eg: i16) -> Score {
    Score { mg, eg }
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Score) -> Score {
        S(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Score) -> Score {
        S(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) {
        *self = *self - rhs;
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Score {
        S(-self.mg, -self.eg)
    }
}

impl Mul<i16> for Score {
    type Output = Score;

    #[inline]
    fn mul(self, rhs: i16) -> Score {
        S(self.mg * rhs, self.eg * rhs)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S({}, {})", self.mg, self.eg)
    }
}

#[cfg(test)]
mod tests {
    use super::{S, Score};

    #[test]
    fn components_are_independent() {
        let s = S(37, -81);
        assert_eq!(s.mg(), 37);
        assert_eq!(s.eg(), -81);
        assert_eq!(Score::ZERO.mg(), 0);
        assert_eq!(Score::ZERO.eg(), 0);
    }

    #[test]
    fn arithmetic_is_componentwise() {
        assert_eq!(S(10, 20) + S(30, 40), S(40, 60));
        assert_eq!(S(50, 60) - S(10, 20), S(40, 40));
        assert_eq!(-S(10, -20), S(-10, 20));
        assert_eq!(S(10, 20) * 3, S(30, 60));
        assert_eq!(S(10, 20) * -2, S(-20, -40));
    }

    #[test]
    fn assign_operators_match_their_operators() {
        let mut s = S(1, 2);
        s += S(3, 4);
        assert_eq!(s, S(4, 6));
        s -= S(4, 4);
        assert_eq!(s, S(0, 2));
    }
}
