/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::sync::OnceLock;

use arrayvec::ArrayVec;

use super::{Bitboard, Board, Color, File, Move, MoveList, Piece, PieceKind, Rank, Square};

// Include the pre-generated attack data
include!("magics.rs");

/// Magic-indexed attack lookup for one sliding piece family (rook or
/// bishop).
///
/// For each of the 64 squares the table stores the magic multiplier, the
/// relevant-bit count, the relevant-occupancy mask, and an attack array
/// indexed by the high bits of `(occupancy & mask) * magic`. For every
/// occupancy subset of the relevant mask, the indexed entry equals the
/// attack set obtained by ray tracing through that occupancy, stopping at
/// and including the first blocker.
pub struct SlidingAttackTable {
    magics: [u64; 64],
    relevant_bits: [u32; 64],
    relevant_masks: [u64; 64],
    attacks: Vec<Vec<Bitboard>>,
}

impl SlidingAttackTable {
    /// Builds a table by enumerating, for each square, every subset of the
    /// relevant occupancy mask and ray tracing its attack set.
    ///
    /// Magic collisions are harmless: two subsets may share an index only
    /// when their attack sets are identical, so the writes are idempotent.
    fn new(
        magics: [u64; 64],
        relevant_bits: [u32; 64],
        relevant_masks: [u64; 64],
        attack_set: fn(Square, Bitboard) -> Bitboard,
    ) -> Self {
        let mut attacks = Vec::with_capacity(Square::COUNT);

        for index in 0..Square::COUNT {
            let square = Square::from_index_unchecked(index as u8);
            let mask = relevant_masks[index];
            let mut table = vec![Bitboard::EMPTY; 1 << relevant_bits[index]];

            // Carry-Rippler traversal of all subsets of the mask
            let mut subset: u64 = 0;
            loop {
                let occupancy = Bitboard::new(subset);
                let key = magic_key(subset, magics[index], relevant_bits[index]);
                table[key] = attack_set(square, occupancy);

                subset = subset.wrapping_sub(mask) & mask;
                if subset == 0 {
                    break;
                }
            }

            attacks.push(table);
        }

        Self {
            magics,
            relevant_bits,
            relevant_masks,
            attacks,
        }
    }

    /// Fetches the attack set for a piece on `square` given the full
    /// occupancy `all`, in constant time.
    #[inline(always)]
    pub fn attacks(&self, square: Square, all: Bitboard) -> Bitboard {
        let index = square.index();
        let relevant = all.inner() & self.relevant_masks[index];
        let key = magic_key(relevant, self.magics[index], self.relevant_bits[index]);
        self.attacks[index][key]
    }
}

/// The magic index: an unsigned 64-bit multiply whose overflow is
/// discarded, keeping only the top `relevant_bits` bits.
#[inline(always)]
fn magic_key(relevant_occupancy: u64, magic: u64, relevant_bits: u32) -> usize {
    (relevant_occupancy.wrapping_mul(magic) >> (64 - relevant_bits)) as usize
}

/// The rook and bishop sliding attack tables.
///
/// Built once on first use and shared process-wide; they are immutable
/// after construction.
pub struct AttackTables {
    pub rook: SlidingAttackTable,
    pub bishop: SlidingAttackTable,
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Fetches the shared sliding attack tables, building them on first call.
#[inline]
pub fn attack_tables() -> &'static AttackTables {
    TABLES.get_or_init(|| AttackTables {
        rook: SlidingAttackTable::new(
            ROOK_MAGICS,
            ROOK_RELEVANT_BITS,
            ROOK_RELEVANT_MASKS,
            rook_ray_attacks,
        ),
        bishop: SlidingAttackTable::new(
            BISHOP_MAGICS,
            BISHOP_RELEVANT_BITS,
            BISHOP_RELEVANT_MASKS,
            bishop_ray_attacks,
        ),
    })
}

/// Squares attacked along one ray from `square`, stopping at and including
/// the first square occupied in `occupancy`.
pub(crate) fn ray_attacks(
    square: Square,
    occupancy: Bitboard,
    file_delta: i8,
    rank_delta: i8,
) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    let mut current = square;

    while let Some(next) = current.offset(file_delta, rank_delta) {
        result |= next.bitboard();
        if occupancy.get(next) {
            break;
        }
        current = next;
    }

    result
}

/// Bishop attacks from `square` by ray tracing through `occupancy`.
pub(crate) fn bishop_ray_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, occupancy, -1, -1)
        | ray_attacks(square, occupancy, 1, -1)
        | ray_attacks(square, occupancy, -1, 1)
        | ray_attacks(square, occupancy, 1, 1)
}

/// Rook attacks from `square` by ray tracing through `occupancy`.
pub(crate) fn rook_ray_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(square, occupancy, -1, 0)
        | ray_attacks(square, occupancy, 1, 0)
        | ray_attacks(square, occupancy, 0, -1)
        | ray_attacks(square, occupancy, 0, 1)
}

/// Squares attacked by a pawn of `color` on `square` (diagonal captures
/// only, not pushes).
#[inline(always)]
pub fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    match color {
        Color::White => Bitboard::new(WHITE_PAWN_ATTACKS[square.index()]),
        Color::Black => Bitboard::new(BLACK_PAWN_ATTACKS[square.index()]),
    }
}

/// Squares attacked by a knight on `square`.
#[inline(always)]
pub fn knight_attacks(square: Square) -> Bitboard {
    Bitboard::new(KNIGHT_ATTACKS[square.index()])
}

/// Squares attacked by a king on `square`.
#[inline(always)]
pub fn king_attacks(square: Square) -> Bitboard {
    Bitboard::new(KING_ATTACKS[square.index()])
}

/// Rook attacks from `square` on an otherwise empty board, used as an
/// x-ray prefilter in pin detection.
#[inline(always)]
pub(crate) fn unobstructed_rook_attacks(square: Square) -> Bitboard {
    Bitboard::new(UNOBSTRUCTED_ROOK_ATTACKS[square.index()])
}

/// Bishop attacks from `square` on an otherwise empty board.
#[inline(always)]
pub(crate) fn unobstructed_bishop_attacks(square: Square) -> Bitboard {
    Bitboard::new(UNOBSTRUCTED_BISHOP_ATTACKS[square.index()])
}

/// The attack set of `piece` standing on `square`, given the full
/// occupancy `all`. Pawn attack sets cover captures only.
pub fn piece_attacks(piece: Piece, square: Square, all: Bitboard) -> Bitboard {
    let tables = attack_tables();

    match piece.kind() {
        PieceKind::Pawn => pawn_attacks(square, piece.color()),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::King => king_attacks(square),
        PieceKind::Bishop => tables.bishop.attacks(square, all),
        PieceKind::Rook => tables.rook.attacks(square, all),
        PieceKind::Queen => tables.rook.attacks(square, all) | tables.bishop.attacks(square, all),
    }
}

/// Sign of `x`, as used for stepping along a board ray.
#[inline(always)]
const fn signum(x: i8) -> i8 {
    if x < 0 {
        -1
    } else if x > 0 {
        1
    } else {
        0
    }
}

/// Enemy pieces currently giving check, at most two in any reachable
/// position.
type Checkers = ArrayVec<(PieceKind, Square), 16>;

impl Board {
    /// Generates all legal moves for the side to move.
    ///
    /// # Example
    /// ```
    /// # use newt::Board;
    /// let board = Board::from_fen(newt::START_FEN).unwrap();
    /// assert_eq!(board.legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> MoveList {
        self.generate_moves(false)
    }

    /// Generates only the legal moves that land on an enemy-occupied
    /// square.
    pub fn legal_captures(&self) -> MoveList {
        self.generate_moves(true)
    }

    /// Generates the legal moves whose source is `square`.
    pub fn legal_moves_from(&self, square: Square) -> MoveList {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from() == square)
            .collect()
    }

    /// Returns `true` if the side to move is in check.
    pub fn is_check(&self) -> bool {
        let us = self.side_to_move();
        let all = self.pieces_bitboard(us) | self.pieces_bitboard(us.opponent());
        let king_square = self.king_square(us);
        let (danger, _) = self.king_danger_and_checkers(all, king_square);

        danger.intersects_square(king_square)
    }

    /// Returns `true` if the previous move left its mover's king in check.
    ///
    /// Used for post-hoc validation in perft harnesses.
    pub fn detect_illegal_move(&mut self) -> bool {
        self.toggle_side_to_move();
        let is_check = self.is_check();
        self.toggle_side_to_move();
        is_check
    }

    fn generate_moves(&self, captures_only: bool) -> MoveList {
        let mut moves = MoveList::new();

        let us = self.side_to_move();
        let them = us.opponent();

        let friendly = self.pieces_bitboard(us);
        let enemy = self.pieces_bitboard(them);
        let all = friendly | enemy;

        let king_square = self.king_square(us);
        let (king_danger, checkers) = self.king_danger_and_checkers(all, king_square);
        let pins = self.pin_mask(all, king_square);
        let is_check = king_danger.intersects_square(king_square);

        let promotion_rank = Rank::promotion(us);

        for from in friendly {
            let piece = self.piece_at(from).unwrap();

            // In double check only the king may move
            if checkers.len() > 1 && piece.kind() != PieceKind::King {
                continue;
            }

            // Pseudo-legal destination squares
            let mut move_set = if piece.kind() == PieceKind::Pawn {
                self.pawn_move_set(from, us, all, enemy, king_square)
            } else {
                piece_attacks(piece, from, all) & !friendly
            };

            // The king may not walk into danger
            if piece.kind() == PieceKind::King {
                move_set &= !king_danger;
            }

            // A pinned piece may only move along the ray from the king
            // through it. The ray is traced on an empty board, so it
            // extends past the pinner; the further squares are already
            // excluded by the pseudo-legal filter.
            if pins.intersects_square(from) {
                let file_delta = signum(from.file().0 as i8 - king_square.file().0 as i8);
                let rank_delta = signum(from.rank().0 as i8 - king_square.rank().0 as i8);
                move_set &= ray_attacks(king_square, Bitboard::EMPTY, file_delta, rank_delta);
            }

            // In single check a non-king move must capture the checker or
            // interpose on the checking ray
            if checkers.len() == 1 && piece.kind() != PieceKind::King {
                let (checker_kind, checker_square) = checkers[0];
                let mut valid = checker_square.bitboard();

                if checker_kind.is_slider() {
                    let file_delta = signum(checker_square.file().0 as i8 - king_square.file().0 as i8);
                    let rank_delta = signum(checker_square.rank().0 as i8 - king_square.rank().0 as i8);
                    valid |= ray_attacks(king_square, all, file_delta, rank_delta);
                }

                move_set &= valid;
            }

            if captures_only {
                move_set &= enemy;
            }

            for to in move_set {
                if piece.kind() == PieceKind::Pawn && to.rank() == promotion_rank {
                    for kind in PieceKind::PROMOTIONS {
                        moves.push(Move::new_promotion(from, to, kind));
                    }
                } else {
                    moves.push(Move::new(from, to));
                }
            }
        }

        if !captures_only {
            self.generate_castling(&mut moves, all, king_danger, is_check);
        }

        moves
    }

    /// Appends the legal castling moves, encoded as the plain king moves
    /// e1g1/e1c1 (e8g8/e8c8 for Black).
    fn generate_castling(
        &self,
        moves: &mut MoveList,
        all: Bitboard,
        king_danger: Bitboard,
        is_check: bool,
    ) {
        let us = self.side_to_move();
        let back = Rank::back(us);

        let (kingside_right, queenside_right) = self.castling_rights_for(us);

        let kingside_occupancy = Square::new(File::F, back)
            .bitboard()
            .set(Square::new(File::G, back));
        // The king does not pass through the b-file square, so it may be
        // attacked; it only has to be empty.
        let queenside_danger = Square::new(File::C, back)
            .bitboard()
            .set(Square::new(File::D, back));
        let queenside_occupancy = queenside_danger.set(Square::new(File::B, back));

        // The rook must still be standing on its corner
        let friendly_rook = |file: File| {
            self.piece_at(Square::new(file, back))
                .is_some_and(|p| p.kind() == PieceKind::Rook && p.color() == us)
        };

        let can_castle_kingside = kingside_right
            && (kingside_occupancy & all).is_empty()
            && (kingside_occupancy & king_danger).is_empty()
            && friendly_rook(File::H)
            && !is_check;

        let can_castle_queenside = queenside_right
            && (queenside_occupancy & all).is_empty()
            && (queenside_danger & king_danger).is_empty()
            && friendly_rook(File::A)
            && !is_check;

        if can_castle_kingside {
            moves.push(Move::new(
                Square::new(File::E, back),
                Square::new(File::G, back),
            ));
        }

        if can_castle_queenside {
            moves.push(Move::new(
                Square::new(File::E, back),
                Square::new(File::C, back),
            ));
        }
    }

    /// Pseudo-legal destination squares for a pawn of `color` on `square`:
    /// single and double pushes onto empty squares, captures onto enemy
    /// pieces, and the en-passant capture when permitted.
    fn pawn_move_set(
        &self,
        square: Square,
        color: Color,
        all: Bitboard,
        enemy: Bitboard,
        king_square: Square,
    ) -> Bitboard {
        let mut result = Bitboard::EMPTY;
        let forward = color.forward();

        // Single and double advances
        if let Some(advance) = square.offset(0, forward) {
            if !all.get(advance) {
                result |= advance.bitboard();

                if square.rank() == Rank::pawn_start(color) {
                    if let Some(thrust) = square.offset(0, 2 * forward) {
                        if !all.get(thrust) {
                            result |= thrust.bitboard();
                        }
                    }
                }
            }
        }

        // Captures, including en passant unless the capture would slide
        // both pawns off a rank shared with the king and an enemy slider
        let mut en_passant = Bitboard::EMPTY;
        if let Some(target) = self.en_passant_target() {
            if !self.en_passant_pinned(square, color, king_square, target) {
                en_passant = target.bitboard();
            }
        }

        result | pawn_attacks(square, color) & (enemy | en_passant)
    }

    /// Detects the horizontal en-passant pin: the capturing pawn and the
    /// captured pawn both vacate the capture rank in one move, which must
    /// not expose the king to a rook or queen on that rank.
    fn en_passant_pinned(
        &self,
        pawn_square: Square,
        color: Color,
        king_square: Square,
        target: Square,
    ) -> bool {
        let rank = Rank::en_passant_capture(color);

        if king_square.rank() != rank || pawn_square.rank() != rank {
            return false;
        }

        let captured_pawn_square = Square::new(target.file(), rank);
        let them = color.opponent();

        let mut pinning = false;
        for square in self.pieces_bitboard(them) {
            let piece = self.piece_at(square).unwrap();
            if square.rank() != rank
                || !matches!(piece.kind(), PieceKind::Rook | PieceKind::Queen)
            {
                continue;
            }

            // March file-wise from the king toward the slider; every
            // occupied square in between must be one of the two pawns
            let direction = signum(square.file().0 as i8 - king_square.file().0 as i8);
            let mut blocked = false;
            let mut file = king_square.file().0 as i8 + direction;

            while file != square.file().0 as i8 {
                let between = Square::new(File::new_unchecked(file as u8), rank);
                if self.piece_at(between).is_some()
                    && between != pawn_square
                    && between != captured_pawn_square
                {
                    blocked = true;
                    break;
                }
                file += direction;
            }

            if !blocked {
                pinning = true;
                break;
            }
        }

        pinning
    }

    /// Computes the set of squares the king may not occupy, along with the
    /// enemy pieces currently giving check.
    ///
    /// The king is removed from the blocker set so that sliding attacks
    /// x-ray through it: the king cannot block an attack against itself by
    /// stepping along the attacking ray.
    fn king_danger_and_checkers(&self, all: Bitboard, king_square: Square) -> (Bitboard, Checkers) {
        let them = self.side_to_move().opponent();
        let all_except_king = all.unset(king_square);

        let mut danger = Bitboard::EMPTY;
        let mut checkers = Checkers::new();

        for square in self.pieces_bitboard(them) {
            let piece = self.piece_at(square).unwrap();
            let attacks = piece_attacks(piece, square, all_except_king);
            danger |= attacks;

            if attacks.intersects_square(king_square) {
                checkers.push((piece.kind(), square));
            }
        }

        (danger, checkers)
    }

    /// Computes the bitboard of friendly pieces pinned to the king.
    ///
    /// A piece is pinned iff it is attacked by an enemy slider and would
    /// also be attacked by a slider of the same family standing on the
    /// king's square. The unobstructed king attacks prefilter which enemy
    /// sliders can possibly pin, avoiding attack lookups for the rest.
    fn pin_mask(&self, all: Bitboard, king_square: Square) -> Bitboard {
        let tables = attack_tables();
        let them = self.side_to_move().opponent();

        let mut enemy_rook_attacks = Bitboard::EMPTY;
        let mut enemy_bishop_attacks = Bitboard::EMPTY;

        let king_rook_attacks = tables.rook.attacks(king_square, all);
        let king_bishop_attacks = tables.bishop.attacks(king_square, all);

        let king_rook_xray = unobstructed_rook_attacks(king_square);
        let king_bishop_xray = unobstructed_bishop_attacks(king_square);

        for square in self.pieces_bitboard(them) {
            let kind = self.piece_at(square).unwrap().kind();

            if matches!(kind, PieceKind::Rook | PieceKind::Queen)
                && king_rook_xray.intersects_square(square)
            {
                enemy_rook_attacks |= tables.rook.attacks(square, all);
            }
            if matches!(kind, PieceKind::Bishop | PieceKind::Queen)
                && king_bishop_xray.intersects_square(square)
            {
                enemy_bishop_attacks |= tables.bishop.attacks(square, all);
            }
        }

        (enemy_rook_attacks & king_rook_attacks) | (enemy_bishop_attacks & king_bishop_attacks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::START_FEN;

    /// Every magic lookup must agree with ray tracing, for every subset of
    /// the relevant occupancy mask.
    #[test]
    fn test_magic_tables_match_ray_tracing() {
        let tables = attack_tables();

        for index in 0..Square::COUNT {
            let square = Square::from_index_unchecked(index as u8);

            for (table, mask, attack_set) in [
                (
                    &tables.rook,
                    ROOK_RELEVANT_MASKS[index],
                    rook_ray_attacks as fn(Square, Bitboard) -> Bitboard,
                ),
                (
                    &tables.bishop,
                    BISHOP_RELEVANT_MASKS[index],
                    bishop_ray_attacks,
                ),
            ] {
                let mut subset: u64 = 0;
                loop {
                    let occupancy = Bitboard::new(subset);
                    assert_eq!(
                        table.attacks(square, occupancy),
                        attack_set(square, occupancy),
                        "magic lookup mismatch on {square}"
                    );

                    subset = subset.wrapping_sub(mask) & mask;
                    if subset == 0 {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn test_unobstructed_tables_match_ray_tracing() {
        for square in Square::iter() {
            assert_eq!(
                unobstructed_rook_attacks(square),
                rook_ray_attacks(square, Bitboard::EMPTY)
            );
            assert_eq!(
                unobstructed_bishop_attacks(square),
                bishop_ray_attacks(square, Bitboard::EMPTY)
            );
        }
    }

    #[test]
    fn test_starting_position() {
        let board = Board::from_fen(START_FEN).unwrap();
        assert!(!board.is_check());
        assert_eq!(board.legal_moves().len(), 20);
        assert!(board.legal_captures().is_empty());
    }

    #[test]
    fn test_moves_from_square() {
        let board = Board::from_fen(START_FEN).unwrap();
        let knight_moves = board.legal_moves_from(Square::B1);
        assert_eq!(knight_moves.len(), 2);
        assert!(knight_moves.iter().all(|mv| mv.from() == Square::B1));
    }

    #[test]
    fn test_en_passant_capture_generated() {
        // White pawn on e5; Black answers with d7d5, allowing e5d6
        let mut board = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - -").unwrap();
        board.make_move(Move::from_uci("d7d5").unwrap());

        assert_eq!(board.en_passant_target(), Some(Square::D6));
        let capture = Move::from_uci("e5d6").unwrap();
        assert!(board.legal_moves().contains(&capture));
    }

    #[test]
    fn test_en_passant_horizontal_pin() {
        // King h5 and rook a5 share the capture rank: taking en passant
        // would clear both pawns off the fifth rank and expose the king
        let mut board = Board::from_fen("4k3/3p4/8/4P2K/8/8/8/8 b - -").unwrap();
        board.make_move(Move::from_uci("d7d5").unwrap());
        board.set_piece(Square::A5, PieceKind::Rook, Color::Black);

        let capture = Move::from_uci("e5d6").unwrap();
        assert!(!board.legal_moves().contains(&capture));

        // A queen pins the same way
        board.set_piece(Square::A5, PieceKind::Queen, Color::Black);
        assert!(!board.legal_moves().contains(&capture));

        // An unrelated piece on the rank breaks the pin
        board.set_piece(Square::B5, PieceKind::Knight, Color::Black);
        assert!(board.legal_moves().contains(&capture));
    }

    #[test]
    fn test_double_check_only_king_moves() {
        // Rook on e6 and pawn on d2 both give check: only the king moves
        let board = Board::from_fen("4k3/8/4r3/8/8/8/3p4/4K3 w - -").unwrap();
        let moves = board.legal_moves();
        assert!(moves.iter().all(|mv| mv.from() == Square::E1));
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_castling_through_attack_forbidden() {
        // Black queen on f3 covers f1, barring kingside castling
        let board = Board::from_fen("4k3/8/8/8/8/5q2/8/R3K2R w KQ -").unwrap();
        let moves = board.legal_moves();
        assert!(!moves.contains(&Move::from_uci("e1g1").unwrap()));
    }

    #[test]
    fn test_castling_queenside_b_file_attack_allowed() {
        // The king does not cross b1, so an attack there is irrelevant
        let board = Board::from_fen("1r2k3/8/8/8/8/8/8/R3K2R w KQ -").unwrap();
        let moves = board.legal_moves();
        assert!(moves.contains(&Move::from_uci("e1c1").unwrap()));
    }
}
