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

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use strum::IntoEnumIterator;

use super::backrank::Layout;
use super::material::{Heading, Owner, Pair, Piece};
use super::moves::MoveError;
use super::square::{Mask, Square, SQUARE_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Squares([Option<Piece>; SQUARE_COUNT]);

impl Squares {
    fn empty() -> Self {
        Self([None; SQUARE_COUNT])
    }
}

impl Index<Square> for Squares {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index.to_index()]
    }
}

impl IndexMut<Square> for Squares {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index.to_index()]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Masks {
    pieces: Pair<Mask>,
    commanders: Mask,
}

impl Masks {
    fn empty() -> Self {
        Self {
            pieces: Pair::new(Mask::empty(), Mask::empty()),
            commanders: Mask::empty(),
        }
    }
}

impl From<&Squares> for Masks {
    fn from(value: &Squares) -> Self {
        let mut masks = Masks::empty();
        for piece in value.0.iter().flatten() {
            masks.pieces[piece.owner()] |= piece.position();
            if piece.kind().is_commander() {
                masks.commanders |= piece.position();
            }
        }
        masks
    }
}

/// The 5×8 grid. Each square holds at most one piece and every stored
/// piece's `position` matches the square it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: Squares,
    masks: Masks,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&Layout::standard())
    }
}

impl Board {
    pub fn new(layout: &Layout) -> Self {
        let mut board = Self::empty();
        for piece in layout.pieces() {
            let replaced = board.place(piece);
            debug_assert!(replaced.is_none());
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            squares: Squares::empty(),
            masks: Masks::empty(),
        }
    }

    #[inline]
    pub fn in_bounds(x: isize, y: isize) -> bool {
        super::square::in_bounds(x, y)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square]
    }

    /// Puts `piece` on its own position, returning whatever was there.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        let square = piece.position();
        let replaced = self.remove(square);
        self.squares[square] = Some(piece);
        self.masks.pieces[piece.owner()] |= square;
        if piece.kind().is_commander() {
            self.masks.commanders |= square;
        }
        replaced
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        if let Some(piece) = self.squares[square].take() {
            self.masks.pieces[piece.owner()].reset(square);
            self.masks.commanders.reset(square);
            return Some(piece);
        }
        None
    }

    /// Relocates the piece on `from` to the empty square `to`. No legality
    /// or capture handling; the caller clears `to` first.
    pub fn move_piece(&mut self, from: Square, to: Square) -> Result<(), MoveError> {
        if self.is_occupied(to) {
            return Err(MoveError::PreconditionViolated("destination is occupied"));
        }
        let mut piece = self
            .remove(from)
            .ok_or(MoveError::PreconditionViolated("no piece to move"))?;
        piece.set_position(to);
        self.place(piece);
        Ok(())
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.squares.0.iter().flatten()
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.squares[square].is_some()
    }

    #[inline]
    pub fn occupied_by(&self, owner: Owner) -> Mask {
        self.masks.pieces[owner]
    }

    /// Where `owner`'s Commander stands, if it is still on the board.
    pub fn commander(&self, owner: Owner) -> Option<Square> {
        (self.masks.commanders & self.masks.pieces[owner]).iter().next()
    }

    /// Owners that have lost their Commander.
    pub fn without_commander(&self) -> impl Iterator<Item = Owner> + '_ {
        Owner::iter().filter(|owner| self.commander(*owner).is_none())
    }

    /// Swaps every Tower and Diagonal in place. Returns how many changed.
    pub fn transform_all(&mut self) -> usize {
        self.squares
            .0
            .iter_mut()
            .flatten()
            .map(|piece| piece.transform())
            .filter(|changed| *changed)
            .count()
    }

    pub(super) fn set_heading(&mut self, square: Square, heading: Heading) {
        if let Some(piece) = self.squares[square].as_mut() {
            piece.set_heading(heading);
        }
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

#[cfg(test)]
impl Board {
    pub fn with(mut self, piece: Piece) -> Self {
        self.place(piece);
        self
    }
    pub fn without(mut self, square: Square) -> Self {
        self.remove(square);
        self
    }
}
