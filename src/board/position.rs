/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use anyhow::{bail, Context, Result};

use super::{Bitboard, Color, File, Move, Piece, PieceKind, Rank, Square, Unmove};

/// FEN for the standard chess starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The four independent castling permissions.
///
/// A right being held does not mean castling is currently legal; it means
/// the king and the corresponding rook have not yet moved.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct CastlingRights {
    white_kingside: bool,
    white_queenside: bool,
    black_kingside: bool,
    black_queenside: bool,
}

impl CastlingRights {
    /// No castling rights for either side.
    pub const NONE: Self = Self {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    /// All four castling rights.
    pub const ALL: Self = Self {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    /// Parses the FEN castling field: any subset of `KQkq`, or `-`.
    #[inline(always)]
    pub fn from_uci(field: &str) -> Self {
        Self {
            white_kingside: field.contains('K'),
            white_queenside: field.contains('Q'),
            black_kingside: field.contains('k'),
            black_queenside: field.contains('q'),
        }
    }

    /// Returns `true` if `color` still holds its kingside right.
    #[inline(always)]
    pub const fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    /// Returns `true` if `color` still holds its queenside right.
    #[inline(always)]
    pub const fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    /// Returns `true` if `color` holds either right.
    #[inline(always)]
    pub const fn any(&self, color: Color) -> bool {
        self.kingside(color) || self.queenside(color)
    }

    /// Removes the kingside right of `color`.
    #[inline(always)]
    pub fn clear_kingside(&mut self, color: Color) {
        match color {
            Color::White => self.white_kingside = false,
            Color::Black => self.black_kingside = false,
        }
    }

    /// Removes the queenside right of `color`.
    #[inline(always)]
    pub fn clear_queenside(&mut self, color: Color) {
        match color {
            Color::White => self.white_queenside = false,
            Color::Black => self.black_queenside = false,
        }
    }

    /// Removes both rights of `color`.
    #[inline(always)]
    pub fn clear_both(&mut self, color: Color) {
        self.clear_kingside(color);
        self.clear_queenside(color);
    }
}

impl fmt::Display for CastlingRights {
    /// Formats as the FEN castling field.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return write!(f, "-");
        }
        if self.white_kingside {
            write!(f, "K")?;
        }
        if self.white_queenside {
            write!(f, "Q")?;
        }
        if self.black_kingside {
            write!(f, "k")?;
        }
        if self.black_queenside {
            write!(f, "q")?;
        }
        Ok(())
    }
}

/// The authoritative, mutable state of a chess position.
///
/// The 64-entry square array is the source of truth; one occupancy
/// [`Bitboard`] per color is kept synchronized by [`Board::set_piece`] and
/// [`Board::set_empty`]. The board is mutated only through those two
/// methods and [`Board::make_move`]/[`Board::unmake_move`]; a make
/// followed immediately by an unmake with its token restores the previous
/// state exactly.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; Square::COUNT],
    occupied: [Bitboard; Color::COUNT],
    side_to_move: Color,
    en_passant_target: Option<Square>,
    castling_rights: CastlingRights,
}

impl Board {
    /// Creates an empty board with White to move and no castling rights.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            squares: [None; Square::COUNT],
            occupied: [Bitboard::EMPTY; Color::COUNT],
            side_to_move: Color::White,
            en_passant_target: None,
            castling_rights: CastlingRights::NONE,
        }
    }

    /// The color whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The en-passant target square, if the previous move was a pawn
    /// double push.
    #[inline(always)]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    /// The current castling rights.
    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// The kingside and queenside rights of `color`, in that order.
    #[inline(always)]
    pub const fn castling_rights_for(&self, color: Color) -> (bool, bool) {
        (
            self.castling_rights.kingside(color),
            self.castling_rights.queenside(color),
        )
    }

    /// Fetches the piece on `square`, if any.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// The occupancy bitboard of `color`, with exactly one set bit per
    /// piece of that color.
    #[inline(always)]
    pub const fn pieces_bitboard(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    /// Iterates the pieces of `color` together with their squares, in
    /// ascending square order.
    #[inline(always)]
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces_bitboard(color)
            .iter()
            .map(|sq| (sq, self.squares[sq.index()].unwrap()))
    }

    /// The square of `color`'s king.
    ///
    /// Falls back to a1 if the king is absent; boards without both kings
    /// are outside the supported state space.
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(color)
            .find(|(_, piece)| piece.kind() == PieceKind::King)
            .map(|(square, _)| square)
            .unwrap_or(Square::A1)
    }

    /// Places a piece on `square`, replacing any existing occupant.
    #[inline(always)]
    pub fn set_piece(&mut self, square: Square, kind: PieceKind, color: Color) {
        self.set_empty(square);
        self.squares[square.index()] = Some(Piece::new(kind, color));
        self.occupied[color.index()] |= square.bitboard();
    }

    /// Clears `square`. A no-op if it is already empty.
    #[inline(always)]
    pub fn set_empty(&mut self, square: Square) {
        if let Some(piece) = self.squares[square.index()].take() {
            self.occupied[piece.color().index()] &= !square.bitboard();
        }
    }

    pub(crate) fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Makes `mv` on the board and returns the token that undoes it.
    ///
    /// The move must be legal in the current position; `make_move` applies
    /// it without validation.
    ///
    /// # Panics
    /// If the source square is empty.
    pub fn make_move(&mut self, mv: Move) -> Unmove {
        let us = self.side_to_move;
        let moved = self
            .piece_at(mv.from())
            .expect("make_move: no piece on source square")
            .kind();
        let captured = self.piece_at(mv.to()).map(|piece| piece.kind());

        let unmove = Unmove {
            from: mv.from(),
            to: mv.to(),
            captured,
            promotion: mv.promotion().is_some(),
            ep_target: self.en_passant_target,
            rights: self.castling_rights,
        };

        // A promoting pawn lands as the promoted piece
        let placed = match (moved, mv.promotion()) {
            (PieceKind::Pawn, Some(kind)) => kind,
            _ => moved,
        };

        self.set_empty(mv.from());
        self.set_piece(mv.to(), placed, us);

        // A pawn changing file without capturing is taking en passant;
        // remove the captured pawn behind the target square
        let is_en_passant =
            moved == PieceKind::Pawn && captured.is_none() && mv.from().file() != mv.to().file();
        if is_en_passant {
            self.set_empty(Square::new(mv.to().file(), mv.from().rank()));
        }

        // A king moving two files from e is castling; bring the rook over
        if moved == PieceKind::King && mv.from().file() == File::E {
            let back = Rank::back(us);

            if mv.to().file() == File::C {
                self.set_empty(Square::new(File::A, back));
                self.set_piece(Square::new(File::D, back), PieceKind::Rook, us);
            } else if mv.to().file() == File::G {
                self.set_empty(Square::new(File::H, back));
                self.set_piece(Square::new(File::F, back), PieceKind::Rook, us);
            }
        }

        // A double push leaves an en-passant target behind the pawn
        self.en_passant_target = None;
        if moved == PieceKind::Pawn
            && mv.from().rank() == Rank::pawn_start(us)
            && mv.to().rank() == Rank::pawn_thrust(us)
        {
            self.en_passant_target = Some(Square::new(mv.from().file(), Rank::en_passant(us)));
        }

        // Update castling rights for the mover
        if moved == PieceKind::King {
            self.castling_rights.clear_both(us);
        } else if moved == PieceKind::Rook && mv.from().file() == File::A {
            self.castling_rights.clear_queenside(us);
        } else if moved == PieceKind::Rook && mv.from().file() == File::H {
            self.castling_rights.clear_kingside(us);
        }

        // Capturing a rook on its home corner removes the victim's right
        if captured == Some(PieceKind::Rook) {
            let them = us.opponent();
            let back = Rank::back(them);

            if mv.to() == Square::new(File::A, back) {
                self.castling_rights.clear_queenside(them);
            } else if mv.to() == Square::new(File::H, back) {
                self.castling_rights.clear_kingside(them);
            }
        }

        self.side_to_move = us.opponent();

        unmove
    }

    /// Unmakes the move recorded in `unmove`, restoring the board to the
    /// exact state it held before the matching [`Board::make_move`].
    ///
    /// The token must be the one returned by the matching `make_move`,
    /// with no intervening mutation on a different branch.
    ///
    /// # Panics
    /// If the destination square is empty, which indicates the token does
    /// not match the board.
    pub fn unmake_move(&mut self, unmove: Unmove) {
        self.side_to_move = self.side_to_move.opponent();
        let us = self.side_to_move;

        // A promotion started life as a pawn; anything else is whatever
        // now stands on the destination
        let moved = if unmove.promotion {
            PieceKind::Pawn
        } else {
            self.piece_at(unmove.to)
                .expect("unmake_move: no piece on destination square")
                .kind()
        };

        self.set_piece(unmove.from, moved, us);

        if let Some(captured) = unmove.captured {
            self.set_piece(unmove.to, captured, us.opponent());
        } else {
            self.set_empty(unmove.to);
        }

        // Restore a pawn captured en passant
        let was_en_passant = moved == PieceKind::Pawn
            && unmove.captured.is_none()
            && unmove.from.file() != unmove.to.file();
        if was_en_passant {
            self.set_piece(
                Square::new(unmove.to.file(), unmove.from.rank()),
                PieceKind::Pawn,
                us.opponent(),
            );
        }

        // Return the castling rook to its corner
        if moved == PieceKind::King && unmove.from.file() == File::E {
            let back = Rank::back(us);

            if unmove.to.file() == File::C {
                self.set_empty(Square::new(File::D, back));
                self.set_piece(Square::new(File::A, back), PieceKind::Rook, us);
            } else if unmove.to.file() == File::G {
                self.set_empty(Square::new(File::F, back));
                self.set_piece(Square::new(File::H, back), PieceKind::Rook, us);
            }
        }

        self.en_passant_target = unmove.ep_target;
        self.castling_rights = unmove.rights;
    }

    /// Loads a board from a FEN string.
    ///
    /// The first three fields (piece placement, side to move, castling
    /// rights) are interpreted; any trailing fields (en-passant target,
    /// halfmove clock, fullmove number) are accepted and ignored.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();
        let mut fields = fen.split_whitespace();

        let placement = fields
            .next()
            .context("FEN is missing the piece placement field")?;

        let mut file_index: u8 = 0;
        let mut rank_index: u8 = 0;

        for c in placement.chars() {
            if let Some(digit) = c.to_digit(10) {
                file_index += digit as u8;
                if file_index > 8 {
                    bail!("FEN rank overflows the board: {placement}");
                }
            } else if c == '/' {
                rank_index += 1;
                file_index = 0;
                if rank_index > 7 {
                    bail!("FEN has too many ranks: {placement}");
                }
            } else if c.is_ascii_alphabetic() {
                if file_index > 7 {
                    bail!("FEN rank overflows the board: {placement}");
                }
                let piece =
                    Piece::from_char(c).with_context(|| format!("Unexpected letter: {c}"))?;
                let square = Square::new(
                    File::new_unchecked(file_index),
                    Rank::new_unchecked(rank_index),
                );
                board.set_piece(square, piece.kind(), piece.color());
                file_index += 1;
            } else {
                bail!("Unexpected character in FEN: {c}");
            }
        }

        let side = fields.next().context("FEN is missing the side to move")?;
        board.side_to_move = Color::from_uci(side)?;

        let rights = fields
            .next()
            .context("FEN is missing the castling rights")?;
        board.castling_rights = CastlingRights::from_uci(rights);

        // En-passant target, halfmove clock, and fullmove number are
        // accepted but not interpreted

        Ok(board)
    }

    /// Emits the FEN of this position: the three fields the parser
    /// interprets, without the trailing clock fields.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();

        for rank_index in 0..8 {
            let mut empty_run = 0;

            for file_index in 0..8 {
                let square = Square::new(
                    File::new_unchecked(file_index),
                    Rank::new_unchecked(rank_index),
                );

                match self.piece_at(square) {
                    None => empty_run += 1,
                    Some(piece) => {
                        if empty_run > 0 {
                            placement.push(char::from_digit(empty_run, 10).unwrap());
                            empty_run = 0;
                        }
                        placement.push(piece.char());
                    }
                }
            }

            if empty_run > 0 {
                placement.push(char::from_digit(empty_run, 10).unwrap());
            }
            if rank_index != 7 {
                placement.push('/');
            }
        }

        format!(
            "{placement} {} {}",
            self.side_to_move.char(),
            self.castling_rights
        )
    }
}

impl Default for Board {
    /// An empty board; see [`Board::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Renders the position as an ASCII grid, eighth rank first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank_index in 0..8 {
            write!(f, "{} |", 8 - rank_index)?;

            for file_index in 0..8 {
                let square = Square::new(
                    File::new_unchecked(file_index),
                    Rank::new_unchecked(rank_index),
                );
                let c = self.piece_at(square).map(|p| p.char()).unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   ----------------")?;
        writeln!(f, "    a b c d e f g h")?;
        write!(f, "{} to move", self.side_to_move)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        write!(
            f,
            "castling: {}, en passant: {:?}",
            self.castling_rights, self.en_passant_target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The occupancy bitboards must mirror the square array exactly.
    fn assert_consistent(board: &Board) {
        for square in Square::iter() {
            match board.piece_at(square) {
                Some(piece) => {
                    assert!(board.pieces_bitboard(piece.color()).get(square));
                    assert!(!board.pieces_bitboard(piece.color().opponent()).get(square));
                }
                None => {
                    assert!(!board.pieces_bitboard(Color::White).get(square));
                    assert!(!board.pieces_bitboard(Color::Black).get(square));
                }
            }
        }
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ",
            "4k3/8/8/8/8/8/4P3/4K3 w -",
            "8/8/8/8/8/8/8/8 b -",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.to_fen(), fen);
            assert_consistent(&board);
        }
    }

    #[test]
    fn test_fen_ignores_trailing_fields() {
        let bare = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w -").unwrap();
        let full = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - e3 0 1").unwrap();
        assert_eq!(bare, full);
        assert_eq!(full.en_passant_target(), None);
    }

    #[test]
    fn test_fen_errors() {
        assert!(Board::from_fen("").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 x -").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/x w -").is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8 w -").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8/8 w -").is_err());
        assert!(Board::from_fen("ppppppppp/8/8/8/8/8/8/8 w -").is_err());
    }

    #[test]
    fn test_start_position_layout() {
        let board = Board::from_fen(START_FEN).unwrap();
        assert_eq!(
            board.piece_at(Square::E1),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Square::D8),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert_eq!(board.piece_at(Square::E4), None);
        assert_eq!(board.side_to_move(), Color::White);
        assert_eq!(board.castling_rights(), CastlingRights::ALL);
        assert_eq!(board.king_square(Color::White), Square::E1);
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_consistent(&board);
    }

    #[test]
    fn test_double_push_sets_en_passant_target() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w -").unwrap();
        let e2e4 = Move::from_uci("e2e4").unwrap();
        assert!(board.legal_moves().contains(&e2e4));

        let unmove = board.make_move(e2e4);

        assert_eq!(board.en_passant_target(), Some(Square::E3));
        assert_eq!(board.side_to_move(), Color::Black);

        board.unmake_move(unmove);
        assert_eq!(board.en_passant_target(), None);
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn test_single_push_clears_en_passant_target() {
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w -").unwrap();
        board.make_move(Move::from_uci("e2e3").unwrap());
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn test_kingside_castle_moves_rook() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq").unwrap();
        let before = board.clone();

        let unmove = board.make_move(Move::from_uci("e1g1").unwrap());

        assert_eq!(
            board.piece_at(Square::G1),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Square::F1),
            Some(Piece::new(PieceKind::Rook, Color::White))
        );
        assert_eq!(board.piece_at(Square::H1), None);
        assert_eq!(board.piece_at(Square::E1), None);
        assert!(!board.castling_rights().any(Color::White));
        assert!(board.castling_rights().any(Color::Black));
        assert_consistent(&board);

        board.unmake_move(unmove);
        assert_eq!(board, before);
    }

    #[test]
    fn test_queenside_castle_moves_rook() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq").unwrap();
        let before = board.clone();

        let unmove = board.make_move(Move::from_uci("e8c8").unwrap());

        assert_eq!(
            board.piece_at(Square::C8),
            Some(Piece::new(PieceKind::King, Color::Black))
        );
        assert_eq!(
            board.piece_at(Square::D8),
            Some(Piece::new(PieceKind::Rook, Color::Black))
        );
        assert_eq!(board.piece_at(Square::A8), None);
        assert!(!board.castling_rights().any(Color::Black));

        board.unmake_move(unmove);
        assert_eq!(board, before);
    }

    #[test]
    fn test_rook_move_clears_one_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq").unwrap();
        board.make_move(Move::from_uci("h1h2").unwrap());

        let (kingside, queenside) = board.castling_rights_for(Color::White);
        assert!(!kingside);
        assert!(queenside);
    }

    #[test]
    fn test_capturing_corner_rook_clears_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq").unwrap();
        let before = board.clone();

        let unmove = board.make_move(Move::from_uci("a1a8").unwrap());

        // The mover loses queenside (rook left the a-file), and so does
        // the victim (rook captured on its corner)
        assert!(!board.castling_rights().queenside(Color::White));
        assert!(!board.castling_rights().queenside(Color::Black));
        assert!(board.castling_rights().kingside(Color::White));
        assert!(board.castling_rights().kingside(Color::Black));

        board.unmake_move(unmove);
        assert_eq!(board, before);
    }

    #[test]
    fn test_en_passant_capture_and_unmake() {
        let mut board = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - -").unwrap();
        board.make_move(Move::from_uci("d7d5").unwrap());
        let before = board.clone();

        let unmove = board.make_move(Move::from_uci("e5d6").unwrap());

        assert_eq!(
            board.piece_at(Square::D6),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
        assert_eq!(board.piece_at(Square::D5), None);
        assert_eq!(board.piece_at(Square::E5), None);
        assert_consistent(&board);

        board.unmake_move(unmove);
        assert_eq!(board, before);
    }

    #[test]
    fn test_promotion_and_unmake() {
        let mut board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w -").unwrap();
        let before = board.clone();

        let unmove = board.make_move(Move::from_uci("a7a8q").unwrap());
        assert_eq!(
            board.piece_at(Square::A8),
            Some(Piece::new(PieceKind::Queen, Color::White))
        );
        assert_eq!(board.piece_at(Square::A7), None);

        board.unmake_move(unmove);
        assert_eq!(board, before);
    }

    #[test]
    fn test_make_unmake_restores_board_for_every_legal_move() {
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ -",
            "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - -",
        ] {
            let mut board = Board::from_fen(fen).unwrap();
            let before = board.clone();

            for mv in board.legal_moves() {
                let unmove = board.make_move(mv);
                assert_consistent(&board);
                board.unmake_move(unmove);
                assert_eq!(board, before, "make/unmake of {mv} changed {fen}");
            }
        }
    }
}
