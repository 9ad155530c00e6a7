use core::fmt;

use crate::Dir;

/// The balance factor of a node: which of its two subtrees, if either, is one level taller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Balance {
    /// The left subtree is one level taller than the right.
    LeftHigh,
    /// Both subtrees have the same height.
    #[default]
    Even,
    /// The right subtree is one level taller than the left.
    RightHigh,
}

impl Balance {
    /// Returns the balance of a node whose `dir` subtree is the taller one.
    #[inline]
    pub(crate) const fn leaning(dir: Dir) -> Balance {
        match dir {
            Dir::Left => Balance::LeftHigh,
            Dir::Right => Balance::RightHigh,
        }
    }

    /// Returns `true` if the `dir` subtree is the taller one.
    #[inline]
    pub(crate) fn leans(self, dir: Dir) -> bool {
        self == Balance::leaning(dir)
    }

    /// Returns the balance matching a height difference of `left - right`.
    ///
    /// Differences outside of `-1..=1` have no balance factor.
    pub fn from_height_diff(diff: isize) -> Option<Balance> {
        match diff {
            1 => Some(Balance::LeftHigh),
            0 => Some(Balance::Even),
            -1 => Some(Balance::RightHigh),
            _ => None,
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Balance::LeftHigh => "LH",
            Balance::Even => "EH",
            Balance::RightHigh => "RH",
        };

        f.write_str(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaning() {
        assert!(Balance::leaning(Dir::Left).leans(Dir::Left));
        assert!(!Balance::leaning(Dir::Left).leans(Dir::Right));
        assert!(Balance::leaning(!Dir::Left).leans(Dir::Right));
        assert!(!Balance::Even.leans(Dir::Left));
        assert!(!Balance::Even.leans(Dir::Right));
    }

    #[test]
    fn height_diff() {
        assert_eq!(Balance::from_height_diff(1), Some(Balance::LeftHigh));
        assert_eq!(Balance::from_height_diff(0), Some(Balance::Even));
        assert_eq!(Balance::from_height_diff(-1), Some(Balance::RightHigh));
        assert_eq!(Balance::from_height_diff(2), None);
        assert_eq!(Balance::from_height_diff(-2), None);
    }
}
