/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// 64-bit sets of squares.
mod bitboard;

/// Squares, files, and ranks.
mod square;

/// Colors, piece kinds, and pieces.
mod piece;

/// Moves, undo tokens, and move lists.
mod moves;

/// Attack tables and legal move generation.
mod movegen;

/// The board state, make/unmake, and the FEN codec.
mod position;

/// Perft node counting.
mod perft;

pub use bitboard::*;
pub use moves::*;
pub use movegen::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
