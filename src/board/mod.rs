// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! Kwazam board and rules engine
//!
//! Kwazam is a two-player chess variant played on a board five squares
//! wide and eight squares tall. Each side starts with a home row of five
//! pieces and a row of five Runners in front of it. Capturing the
//! opposing Commander wins the game. Every second half-move (by default)
//! all Towers become Diagonals and all Diagonals become Towers.
//!
//! Some of the key abstractions include:
//!
//! * A `Square` represents the coordinates for a single square,
//!   `x` in `0..5` and `y` in `0..8`. `First` starts on rows 0 and 1,
//!   `Second` on rows 6 and 7.
//!
//! * A `Mask` is a 64-bit (u64) value in which each of the low 40 bits
//!   maps to a square on the board. Masks represent occupancy or the
//!   destinations of a piece and can be combined with `|`, `&` and `!`.
//!   The `iter()` method provides a double-ended iterator of squares.
//!
//! * A `Piece` has a `PieceKind` (`Runner`, `Jumper`, `Commander`,
//!   `Tower` or `Diagonal`), an `Owner` and its current `Square`.
//!   Runners also carry a `Heading`. New pieces come from `make_piece`.
//!
//! * `Board` stores the pieces, at most one per square, alongside
//!   per-owner occupancy masks. It knows nothing about turns.
//!
//! * `destinations` computes where a piece may go without touching the
//!   board. `legal_destinations` does the same but also turns a Runner
//!   around when it has reached the far edge; this is the only place a
//!   Runner's heading changes.
//!
//! * `GameState` is the engine: it owns the board, whose turn it is,
//!   the half-move count and the winner. `apply_move` is the only way
//!   to advance a game and leaves the state untouched when it fails.
//!
//! * The `save` functions convert a `GameState` to and from the
//!   plain-text save-file format.
//!

mod backrank;
mod material;
mod moves;
mod play;
mod position;
mod save;
mod square;

pub use backrank::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use save::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Owner;
}

/// A fresh game under the standard rules with `First` to move.
pub fn new_game<S: Into<String>>(player1: S, player2: S) -> GameState {
    GameState::new(player1, player2)
}
