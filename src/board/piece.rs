/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Index};

use anyhow::{bail, Result};

/// Represents the color of a player, piece, square, etc. within a chess
/// board.
///
/// White moves first, so [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// Creates a new [`Color`] from a `bool`, where `false = White`.
    #[inline(always)]
    pub const fn from_bool(is_black: bool) -> Self {
        if is_black {
            Self::Black
        } else {
            Self::White
        }
    }

    /// Creates a [`Color`] from the ASCII case of `c`: uppercase is White,
    /// lowercase is Black.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        Self::from_bool(c.is_ascii_lowercase())
    }

    /// Returns `true` if this [`Color`] is White.
    #[inline(always)]
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    /// Returns `true` if this [`Color`] is Black.
    #[inline(always)]
    pub const fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }

    /// Returns this [`Color`]'s opponent.
    ///
    /// # Example
    /// ```
    /// # use newt::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank-index delta of a single pawn push for this color.
    ///
    /// Ranks are indexed top-down (rank 8 = 0), so White pawns move toward
    /// lower rank indices.
    ///
    /// # Example
    /// ```
    /// # use newt::Color;
    /// assert_eq!(Color::White.forward(), -1);
    /// assert_eq!(Color::Black.forward(), 1);
    /// ```
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// Returns this [`Color`] as a `usize`, 0 for White and 1 for Black.
    ///
    /// Useful for indexing into per-color arrays.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Parses a [`Color`] from its FEN side-to-move token.
    #[inline(always)]
    pub fn from_uci(color: &str) -> Result<Self> {
        match color {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("Invalid side to move: Must be 'w' or 'b'. Got {color}"),
        }
    }

    /// The FEN side-to-move character for this [`Color`].
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;
    /// A [`Color`] can be used to index into an array of 2 elements.
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        &self[index.index()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}

/// Represents the kind of a chess piece, independent of its color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceKind {
    /// Number of piece kind variants.
    pub const COUNT: usize = 6;

    /// All piece kinds a pawn may promote to, in the order the move
    /// generator emits them.
    pub const PROMOTIONS: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];

    /// Returns the piece kind named by `letter` in English algebraic
    /// notation, accepting either case.
    ///
    /// # Example
    /// ```
    /// # use newt::PieceKind;
    /// assert_eq!(PieceKind::from_char('n').unwrap(), PieceKind::Knight);
    /// assert_eq!(PieceKind::from_char('Q').unwrap(), PieceKind::Queen);
    /// assert!(PieceKind::from_char('x').is_err());
    /// ```
    #[inline(always)]
    pub fn from_char(letter: char) -> Result<Self> {
        match letter.to_ascii_lowercase() {
            'p' => Ok(Self::Pawn),
            'n' => Ok(Self::Knight),
            'b' => Ok(Self::Bishop),
            'r' => Ok(Self::Rook),
            'q' => Ok(Self::Queen),
            'k' => Ok(Self::King),
            _ => bail!("Unknown piece letter: {letter}"),
        }
    }

    /// The lowercase letter naming this piece kind in English algebraic
    /// notation.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Returns `true` if this kind slides along ranks, files, or
    /// diagonals.
    #[inline(always)]
    pub const fn is_slider(&self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}

/// A piece on the board: a [`PieceKind`] together with its [`Color`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
}

impl Piece {
    /// Creates a new [`Piece`].
    #[inline(always)]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Fetches the [`PieceKind`] of this [`Piece`].
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Fetches the [`Color`] of this [`Piece`].
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Parses a [`Piece`] from its FEN character, where uppercase letters
    /// are White pieces and lowercase letters are Black pieces.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Piece, PieceKind};
    /// let piece = Piece::from_char('N').unwrap();
    /// assert_eq!(piece.kind(), PieceKind::Knight);
    /// assert_eq!(piece.color(), Color::White);
    /// ```
    #[inline(always)]
    pub fn from_char(c: char) -> Result<Self> {
        Ok(Self::new(PieceKind::from_char(c)?, Color::from_case(c)))
    }

    /// The FEN character for this [`Piece`].
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.char().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_letters() {
        for kind in [
            PieceKind::King,
            PieceKind::Queen,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
            PieceKind::Pawn,
        ] {
            assert_eq!(PieceKind::from_char(kind.char()).unwrap(), kind);
        }
        assert!(PieceKind::from_char('z').is_err());
    }

    #[test]
    fn test_piece_case() {
        assert_eq!(Piece::from_char('K').unwrap().color(), Color::White);
        assert_eq!(Piece::from_char('k').unwrap().color(), Color::Black);
        assert_eq!(Piece::from_char('R').unwrap().char(), 'R');
        assert_eq!(Piece::from_char('r').unwrap().char(), 'r');
    }
}
