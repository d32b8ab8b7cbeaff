/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{PieceKind, Square};

// Piece-square tables, in centipawns.
//
// Each table is laid out with h1 at index 0 and a8 at index 63; the first
// textual row is the first rank read from h to a, the last row the eighth
// rank. Every lookup mirrors the square index (`63 - index`), for both
// colors alike, so the values are oriented for White and a Black piece
// reads the entry of the square it stands on.

/// Pawns: push toward promotion, hold the center, keep the shield intact.
#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Pawn advancement dominates the endgame.
#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,   5,   5,   5,   5,   5,   5,   5,
     10,  10,  10,  10,  10,  10,  10,  10,
     20,  20,  20,  20,  20,  20,  20,  20,
     35,  35,  35,  35,  35,  35,  35,  35,
     60,  60,  60,  60,  60,  60,  60,  60,
    100, 100, 100, 100, 100, 100, 100, 100,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Knights: centralize, stay off the rim.
#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    -40, -30, -20, -20, -20, -20, -30, -40,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -20,   5,  15,  20,  20,  15,   5, -20,
    -20,   5,  15,  20,  20,  15,   5, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -40, -30, -20, -20, -20, -20, -30, -40,
];

/// Bishops: long diagonals, avoid the corners.
#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const BISHOP_EG: [i32; 64] = [
    -15, -10,  -5,  -5,  -5,  -5, -10, -15,
     -10,   0,   5,   5,   5,   5,   0, -10,
      -5,   5,  10,  10,  10,  10,   5,  -5,
      -5,   5,  10,  15,  15,  10,   5,  -5,
      -5,   5,  10,  15,  15,  10,   5,  -5,
      -5,   5,  10,  10,  10,  10,   5,  -5,
     -10,   0,   5,   5,   5,   5,   0, -10,
     -15, -10,  -5,  -5,  -5,  -5, -10, -15,
];

/// Rooks: seventh rank and the central files.
#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const ROOK_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      5,   5,   5,   5,   5,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

/// Queens: modest centralization, nothing else.
#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const QUEEN_EG: [i32; 64] = [
    -10,  -5,  -5,   0,   0,  -5,  -5, -10,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,   0,
      0,   0,   5,   5,   5,   5,   0,   0,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
    -10,  -5,  -5,   0,   0,  -5,  -5, -10,
];

/// Kings hide behind their pawns in the middlegame.
#[rustfmt::skip]
const KING_MG: [i32; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

/// Kings walk to the center in the endgame.
#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50, -30, -30, -30, -30, -30, -30, -50,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -50, -40, -30, -20, -20, -30, -40, -50,
];

/// The middlegame and endgame tables for `kind`.
const fn tables_for(kind: PieceKind) -> (&'static [i32; 64], &'static [i32; 64]) {
    match kind {
        PieceKind::Pawn => (&PAWN_MG, &PAWN_EG),
        PieceKind::Knight => (&KNIGHT_MG, &KNIGHT_EG),
        PieceKind::Bishop => (&BISHOP_MG, &BISHOP_EG),
        PieceKind::Rook => (&ROOK_MG, &ROOK_EG),
        PieceKind::Queen => (&QUEEN_MG, &QUEEN_EG),
        PieceKind::King => (&KING_MG, &KING_EG),
    }
}

/// Positional bonus, in pawns, for a piece of `kind` standing on `square`,
/// blending the middlegame and endgame tables by `endgame_weight` in
/// `[0, 1]`.
///
/// The mirrored index applies to every piece regardless of color, so a
/// Black piece reads the White-oriented entry of the square it stands on.
#[inline(always)]
pub(crate) fn bonus(kind: PieceKind, square: Square, endgame_weight: f64) -> f64 {
    let index = 63 - square.index();
    let (mg, eg) = tables_for(kind);

    mix(mg[index] as f64 * 0.01, eg[index] as f64 * 0.01, endgame_weight)
}

/// Linear interpolation from `a` to `b` by `t`.
#[inline(always)]
fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_orientation() {
        // Index 0 is h1, index 63 is a8: a White pawn one step from
        // promotion outscores one still at home
        assert!(bonus(PieceKind::Pawn, Square::E7, 0.0) > bonus(PieceKind::Pawn, Square::E2, 0.0));

        // A castled White king scores better than an exposed one
        assert!(bonus(PieceKind::King, Square::G1, 0.0) > bonus(PieceKind::King, Square::E4, 0.0));

        // Knights prefer the center over the rim
        assert!(
            bonus(PieceKind::Knight, Square::D4, 0.0) > bonus(PieceKind::Knight, Square::A1, 0.0)
        );
    }

    #[test]
    fn test_mirror_applies_to_both_colors() {
        // The lookup takes no color: a piece on e2 and a piece on e7 read
        // different entries no matter whose piece stands there
        assert_eq!(bonus(PieceKind::Pawn, Square::E2, 0.0), -0.20);
        assert_eq!(bonus(PieceKind::Pawn, Square::E7, 0.0), 0.50);
    }

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(mix(1.0, 3.0, 0.0), 1.0);
        assert_eq!(mix(1.0, 3.0, 1.0), 3.0);
        assert_eq!(mix(1.0, 3.0, 0.5), 2.0);
    }
}
