/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move generation, and the FEN codec.
mod board;

/// Static evaluation of chess positions.
mod eval;

/// Piece-square table data used by the evaluator.
mod psqt;

/// Negamax alpha-beta search with quiescence.
mod search;

pub use board::*;
pub use eval::*;
pub use search::*;
