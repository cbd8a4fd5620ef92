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

use once_cell::sync::Lazy;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::debug;

use super::material::{Owner, Piece, PieceKind};
use super::position::Board;
use super::square::{Direction, Mask, Offset, Square, SQUARE_COUNT};

use PieceKind::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece at {0}")]
    NoPieceAtSource(Square),
    #[error("Not {0}'s turn")]
    NotYourTurn(Owner),
    #[error("Not a legal move: {0} to {1}")]
    IllegalDestination(Square, Square),
    #[error("The game is over")]
    GameOver,
    #[error("Internal error: {0}")]
    PreconditionViolated(&'static str),
}

/// Squares `piece` can reach on `board`.
///
/// Never contains the piece's own square or a square held by its owner. An
/// enemy-held square is included and ends the ray it lies on. Runners are
/// evaluated with their effective heading (see `Piece::effective_heading`)
/// but the board is left untouched; use `legal_destinations` to commit the
/// reversal.
pub fn destinations(piece: &Piece, board: &Board) -> Mask {
    let from = piece.position();
    let ours = board.occupied_by(piece.owner());
    match piece.kind() {
        Commander => COMMANDER_MOVES[from] & !ours,
        Jumper => JUMPER_MOVES[from] & !ours,
        Tower => slide(board, piece, Direction::orthogonals()),
        Diagonal => slide(board, piece, Direction::diagonals()),
        Runner => {
            let Some(heading) = piece.effective_heading() else {
                return Mask::empty();
            };
            match from + Offset::new(0, heading.step()) {
                Some(to) if !ours.contains(to) => to.to_mask(),
                _ => Mask::empty(),
            }
        }
    }
}

/// Destinations of the piece on `from`, committing a Runner's reversal to
/// the board first.
///
/// A Runner that stands on the edge it was marching toward turns around as
/// soon as its moves are asked for, whether or not it then moves. This is
/// the only place that mutation happens.
pub fn legal_destinations(board: &mut Board, from: Square) -> Mask {
    let Some(piece) = board.piece_at(from) else {
        return Mask::empty();
    };
    if let (Some(current), Some(effective)) = (piece.heading(), piece.effective_heading()) {
        if current != effective {
            debug!(square = %from, heading = %effective, "runner reverses");
            board.set_heading(from, effective);
        }
    }
    match board.piece_at(from) {
        Some(piece) => destinations(&piece, board),
        None => Mask::empty(),
    }
}

/// Walks each direction one square at a time until the edge or the first
/// occupant. An enemy occupant is included, a friendly one is not.
fn slide<I>(board: &Board, piece: &Piece, directions: I) -> Mask
where
    I: IntoIterator<Item = Direction>,
{
    let ours = board.occupied_by(piece.owner());
    let theirs = board.occupied_by(!piece.owner());
    let mut mask = Mask::empty();
    for dir in directions {
        let mut next = piece.position() + dir;
        while let Some(square) = next {
            if ours.contains(square) {
                break;
            }
            mask |= square;
            if theirs.contains(square) {
                break;
            }
            next = square + dir;
        }
    }
    mask
}

/// Squares of `owner`'s pieces that can reach `target`.
pub fn attackers(board: &Board, owner: Owner, target: Square) -> Mask {
    board
        .occupied_by(owner)
        .iter()
        .filter_map(|square| board.piece_at(square))
        .filter(|piece| destinations(piece, board).contains(target))
        .map(|piece| piece.position())
        .collect()
}

static COMMANDER_MOVES: Lazy<[Mask; SQUARE_COUNT]> = Lazy::new(|| {
    let mut array = [Mask::default(); SQUARE_COUNT];
    for square in Square::iter() {
        array[square] = Mask::from_squares(Direction::iter().filter_map(|dir| square + dir));
    }
    array
});

static JUMPER_MOVES: Lazy<[Mask; SQUARE_COUNT]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); SQUARE_COUNT];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});
