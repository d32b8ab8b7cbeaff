/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{Bitboard, Color};

/// Represents a single square on an `8x8` chess board.
///
/// Squares are indexed from the top-left corner of the board as White sees
/// it: a8 is 0, b8 is 1, h8 is 7, a7 is 8, and h1 is 63. Equivalently,
/// `index = rank * 8 + file`, where files run a = 0 through h = 7 and ranks
/// run top-down, rank 8 = 0 through rank 1 = 7:
/// ```text
/// 8|  0  1  2  3  4  5  6  7
/// 7|  8  9 10 11 12 13 14 15
/// 6| 16 17 18 19 20 21 22 23
/// 5| 24 25 26 27 28 29 30 31
/// 4| 32 33 34 35 36 37 38 39
/// 3| 40 41 42 43 44 45 46 47
/// 2| 48 49 50 51 52 53 54 55
/// 1| 56 57 58 59 60 61 62 63
///  +------------------------
///     a  b  c  d  e  f  g  h
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    pub const A8: Self = Self::new(File::A, Rank::EIGHT);
    pub const B8: Self = Self::new(File::B, Rank::EIGHT);
    pub const C8: Self = Self::new(File::C, Rank::EIGHT);
    pub const D8: Self = Self::new(File::D, Rank::EIGHT);
    pub const E8: Self = Self::new(File::E, Rank::EIGHT);
    pub const F8: Self = Self::new(File::F, Rank::EIGHT);
    pub const G8: Self = Self::new(File::G, Rank::EIGHT);
    pub const H8: Self = Self::new(File::H, Rank::EIGHT);

    pub const A7: Self = Self::new(File::A, Rank::SEVEN);
    pub const B7: Self = Self::new(File::B, Rank::SEVEN);
    pub const C7: Self = Self::new(File::C, Rank::SEVEN);
    pub const D7: Self = Self::new(File::D, Rank::SEVEN);
    pub const E7: Self = Self::new(File::E, Rank::SEVEN);
    pub const F7: Self = Self::new(File::F, Rank::SEVEN);
    pub const G7: Self = Self::new(File::G, Rank::SEVEN);
    pub const H7: Self = Self::new(File::H, Rank::SEVEN);

    pub const A6: Self = Self::new(File::A, Rank::SIX);
    pub const B6: Self = Self::new(File::B, Rank::SIX);
    pub const C6: Self = Self::new(File::C, Rank::SIX);
    pub const D6: Self = Self::new(File::D, Rank::SIX);
    pub const E6: Self = Self::new(File::E, Rank::SIX);
    pub const F6: Self = Self::new(File::F, Rank::SIX);
    pub const G6: Self = Self::new(File::G, Rank::SIX);
    pub const H6: Self = Self::new(File::H, Rank::SIX);

    pub const A5: Self = Self::new(File::A, Rank::FIVE);
    pub const B5: Self = Self::new(File::B, Rank::FIVE);
    pub const C5: Self = Self::new(File::C, Rank::FIVE);
    pub const D5: Self = Self::new(File::D, Rank::FIVE);
    pub const E5: Self = Self::new(File::E, Rank::FIVE);
    pub const F5: Self = Self::new(File::F, Rank::FIVE);
    pub const G5: Self = Self::new(File::G, Rank::FIVE);
    pub const H5: Self = Self::new(File::H, Rank::FIVE);

    pub const A4: Self = Self::new(File::A, Rank::FOUR);
    pub const B4: Self = Self::new(File::B, Rank::FOUR);
    pub const C4: Self = Self::new(File::C, Rank::FOUR);
    pub const D4: Self = Self::new(File::D, Rank::FOUR);
    pub const E4: Self = Self::new(File::E, Rank::FOUR);
    pub const F4: Self = Self::new(File::F, Rank::FOUR);
    pub const G4: Self = Self::new(File::G, Rank::FOUR);
    pub const H4: Self = Self::new(File::H, Rank::FOUR);

    pub const A3: Self = Self::new(File::A, Rank::THREE);
    pub const B3: Self = Self::new(File::B, Rank::THREE);
    pub const C3: Self = Self::new(File::C, Rank::THREE);
    pub const D3: Self = Self::new(File::D, Rank::THREE);
    pub const E3: Self = Self::new(File::E, Rank::THREE);
    pub const F3: Self = Self::new(File::F, Rank::THREE);
    pub const G3: Self = Self::new(File::G, Rank::THREE);
    pub const H3: Self = Self::new(File::H, Rank::THREE);

    pub const A2: Self = Self::new(File::A, Rank::TWO);
    pub const B2: Self = Self::new(File::B, Rank::TWO);
    pub const C2: Self = Self::new(File::C, Rank::TWO);
    pub const D2: Self = Self::new(File::D, Rank::TWO);
    pub const E2: Self = Self::new(File::E, Rank::TWO);
    pub const F2: Self = Self::new(File::F, Rank::TWO);
    pub const G2: Self = Self::new(File::G, Rank::TWO);
    pub const H2: Self = Self::new(File::H, Rank::TWO);

    pub const A1: Self = Self::new(File::A, Rank::ONE);
    pub const B1: Self = Self::new(File::B, Rank::ONE);
    pub const C1: Self = Self::new(File::C, Rank::ONE);
    pub const D1: Self = Self::new(File::D, Rank::ONE);
    pub const E1: Self = Self::new(File::E, Rank::ONE);
    pub const F1: Self = Self::new(File::F, Rank::ONE);
    pub const G1: Self = Self::new(File::G, Rank::ONE);
    pub const H1: Self = Self::new(File::H, Rank::ONE);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    const FILE_MASK: u8 = 0b0000_0111;

    /// Creates a new [`Square`] from the provided [`File`] and [`Rank`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Square, File, Rank};
    /// assert_eq!(Square::new(File::C, Rank::FOUR), Square::C4);
    /// ```
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(rank.0 << 3 | file.0)
    }

    /// Creates a new [`Square`] from the provided index value.
    ///
    /// The provided `index` must be `[0, 63]` or else an error is returned.
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index > Self::MAX as usize {
            bail!(
                "Invalid index for Square: Must be between [{}, {}]. Got {index}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(index as u8))
    }

    /// Creates a new [`Square`] from the provided index value, without
    /// error checking.
    #[inline(always)]
    pub const fn from_index_unchecked(index: u8) -> Self {
        debug_assert!(index < 64, "Index must be between [0, 64)");
        Self(index)
    }

    /// Returns an iterator over all 64 squares, a8 first and h1 last.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Fetches the inner index value of this [`Square`].
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Fetches the [`File`] of this [`Square`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Square, File};
    /// assert_eq!(Square::C4.file(), File::C);
    /// ```
    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & Self::FILE_MASK)
    }

    /// Fetches the [`Rank`] of this [`Square`].
    ///
    /// # Example
    /// ```
    /// # use newt::{Square, Rank};
    /// assert_eq!(Square::C4.rank(), Rank::FOUR);
    /// ```
    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Alias for [`Bitboard::from_square`].
    #[inline(always)]
    pub const fn bitboard(&self) -> Bitboard {
        Bitboard::from_square(*self)
    }

    /// Attempts to offset this [`Square`] by the given file and rank deltas.
    ///
    /// A positive `rank_delta` moves toward rank 1 (down the board as White
    /// sees it). Returns `None` if either axis leaves the board.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::C4.offset(1, -1), Some(Square::D5));
    /// assert_eq!(Square::C4.offset(-1, 1), Some(Square::B3));
    /// assert_eq!(Square::A8.offset(-1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let Some(file) = self.file().offset(file_delta) else {
            return None;
        };

        let Some(rank) = self.rank().offset(rank_delta) else {
            return None;
        };

        Some(Self::new(file, rank))
    }

    /// Creates a [`Square`] from its two-character algebraic name, e.g. `c4`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::from_uci("c4").unwrap(), Square::C4);
    /// assert!(Square::from_uci("z9").is_err());
    /// assert!(Square::from_uci("c44").is_err());
    /// ```
    #[inline(always)]
    pub fn from_uci(square: &str) -> Result<Self> {
        let bytes = square.as_bytes();
        if bytes.len() != 2 {
            bail!("Invalid Square string: Must contain exactly 2 characters. Got {square}");
        }
        let file = File::from_char(bytes[0] as char)?;
        let rank = Rank::from_char(bytes[1] as char)?;

        Ok(Self::new(file, rank))
    }

    /// Converts this [`Square`] to its algebraic name.
    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl TryFrom<usize> for Square {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::from_index(value)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    /// A [`Square`] can be used to index into an array of 64 elements.
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({})", self.file(), self.rank(), self.0)
    }
}

/// Represents one of the eight ranks (rows) of the board.
///
/// Following the square indexing, rank 8 has the internal value 0 and
/// rank 1 the value 7.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const EIGHT: Self = Self(0);
    pub const SEVEN: Self = Self(1);
    pub const SIX: Self = Self(2);
    pub const FIVE: Self = Self(3);
    pub const FOUR: Self = Self(4);
    pub const THREE: Self = Self(5);
    pub const TWO: Self = Self(6);
    pub const ONE: Self = Self(7);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 7;
    pub const COUNT: usize = 8;

    /// Construct a new [`Rank`] from the provided internal value.
    #[inline(always)]
    pub fn new(rank: u8) -> Result<Self> {
        if rank > Self::MAX {
            bail!(
                "Invalid int for Rank: Must be between [{}, {}]. Got {rank}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(rank))
    }

    /// Construct a new [`Rank`] from the provided value, ignoring safety
    /// checks.
    #[inline(always)]
    pub const fn new_unchecked(rank: u8) -> Self {
        Self(rank)
    }

    /// Parses a [`Rank`] from its digit character, `'1'` through `'8'`.
    #[inline(always)]
    pub fn from_char(rank: char) -> Result<Self> {
        if !('1'..='8').contains(&rank) {
            bail!("Invalid char for Rank: Must be between [1, 8]. Got {rank}");
        }
        Ok(Self(b'8' - rank as u8))
    }

    /// Back rank relative to `color`: rank 1 for White, rank 8 for Black.
    #[inline(always)]
    pub const fn back(color: Color) -> Self {
        match color {
            Color::White => Self::ONE,
            Color::Black => Self::EIGHT,
        }
    }

    /// Rank a pawn of `color` starts on.
    #[inline(always)]
    pub const fn pawn_start(color: Color) -> Self {
        match color {
            Color::White => Self::TWO,
            Color::Black => Self::SEVEN,
        }
    }

    /// Rank a pawn of `color` reaches with a two-square thrust.
    #[inline(always)]
    pub const fn pawn_thrust(color: Color) -> Self {
        match color {
            Color::White => Self::FOUR,
            Color::Black => Self::FIVE,
        }
    }

    /// Rank of the en-passant target square left behind by a two-square
    /// thrust of `color`.
    #[inline(always)]
    pub const fn en_passant(color: Color) -> Self {
        match color {
            Color::White => Self::THREE,
            Color::Black => Self::SIX,
        }
    }

    /// Rank a pawn of `color` must stand on to capture en passant.
    #[inline(always)]
    pub const fn en_passant_capture(color: Color) -> Self {
        match color {
            Color::White => Self::FIVE,
            Color::Black => Self::FOUR,
        }
    }

    /// Rank a pawn of `color` promotes on.
    #[inline(always)]
    pub const fn promotion(color: Color) -> Self {
        match color {
            Color::White => Self::EIGHT,
            Color::Black => Self::ONE,
        }
    }

    /// Fetches the internal value, 0 for rank 8 through 7 for rank 1.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The digit character naming this rank.
    #[inline(always)]
    pub const fn char(&self) -> char {
        (b'8' - self.0) as char
    }

    /// Attempts to offset this [`Rank`] by `delta`, toward rank 1 when
    /// positive. Returns `None` when leaving the board.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        if let Some(value) = self.0.checked_add_signed(delta) {
            if value <= Self::MAX {
                return Some(Self(value));
            }
        }
        None
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

/// Represents one of the eight files (columns) of the board, a = 0
/// through h = 7.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    pub const MIN: u8 = 0;
    pub const MAX: u8 = 7;
    pub const COUNT: usize = 8;

    /// Construct a new [`File`] from the provided internal value.
    #[inline(always)]
    pub fn new(file: u8) -> Result<Self> {
        if file > Self::MAX {
            bail!(
                "Invalid int for File: Must be between [{}, {}]. Got {file}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(file))
    }

    /// Construct a new [`File`] from the provided value, ignoring safety
    /// checks.
    #[inline(always)]
    pub const fn new_unchecked(file: u8) -> Self {
        Self(file)
    }

    /// Parses a [`File`] from its letter, `'a'` through `'h'`.
    #[inline(always)]
    pub fn from_char(file: char) -> Result<Self> {
        if !('a'..='h').contains(&file) {
            bail!("Invalid char for File: Must be between [a, h]. Got {file}");
        }
        Ok(Self(file as u8 - b'a'))
    }

    /// Fetches the internal value, 0 for the a-file through 7 for the
    /// h-file.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The letter naming this file.
    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }

    /// Attempts to offset this [`File`] by `delta`, toward the h-file when
    /// positive. Returns `None` when leaving the board.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        if let Some(value) = self.0.checked_add_signed(delta) {
            if value <= Self::MAX {
                return Some(Self(value));
            }
        }
        None
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;
    #[inline(always)]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::from_char(value)
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_at() {
        assert_eq!(Square::new(File::A, Rank::ONE), Square::A1);
        assert_eq!(Square::new(File::B, Rank::ONE), Square::B1);
        assert_eq!(Square::new(File::A, Rank::EIGHT), Square::A8);
        assert_eq!(Square::A8.index(), 0);
        assert_eq!(Square::H1.index(), 63);
    }

    #[test]
    fn test_file_and_rank() {
        assert_eq!(Square::A1.file(), File::A);
        assert_eq!(Square::B1.file(), File::B);
        assert_eq!(Square::A1.rank(), Rank(7));
        assert_eq!(Square::A2.rank(), Rank(6));
    }

    #[test]
    fn test_round_trips() {
        for sq in Square::iter() {
            assert_eq!(Square::new(sq.file(), sq.rank()), sq);
            assert_eq!(Square::from_uci(&sq.to_uci()).unwrap(), sq);
        }
    }

    #[test]
    fn test_algebraic_names() {
        assert_eq!(Square::A1.to_uci(), "a1");
        assert_eq!(Square::A2.to_uci(), "a2");
        assert_eq!(Square::H8.to_uci(), "h8");
        assert_eq!(Square::from_uci("b1").unwrap(), Square::B1);

        assert!(Square::from_uci("").is_err());
        assert!(Square::from_uci("a").is_err());
        assert!(Square::from_uci("a9").is_err());
        assert!(Square::from_uci("i1").is_err());
        assert!(Square::from_index(64).is_err());
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Square::E2.offset(0, -2), Some(Square::E4));
        assert_eq!(Square::E7.offset(0, 2), Some(Square::E5));
        assert_eq!(Square::A1.offset(-1, 0), None);
        assert_eq!(Square::H8.offset(1, 0), None);
        assert_eq!(Square::D4.offset(0, 4), None);
    }
}
