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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use thiserror::Error;

use super::material::{make_piece, Owner, Pair, Piece, PieceKind};
use super::square::{Square, HEIGHT, WIDTH};
use PieceKind::{Commander, Diagonal, Jumper, Runner, Tower};

#[derive(Error, Debug, Serialize, Deserialize)]
pub enum BackRankError {
    #[error("Expecting exactly 5 pieces")]
    ArgError,
    #[error("Expecting exactly 1 commander")]
    CommanderCount,
    #[error("Runners belong on the front row")]
    MisplacedRunner,
}

use BackRankError::*;

/// The five pieces that start on an owner's home row, left to right.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<PieceKind>", into = "Vec<PieceKind>")]
pub struct BackRank {
    pieces: [PieceKind; WIDTH],
}

impl BackRank {
    /// Home row for `First` in the standard game.
    pub const FIRST: Self = Self {
        pieces: [Tower, Jumper, Commander, Jumper, Diagonal],
    };
    /// Home row for `Second` in the standard game.
    pub const SECOND: Self = Self {
        pieces: [Diagonal, Jumper, Commander, Jumper, Tower],
    };

    pub fn build<I>(pieces: I) -> Result<Self>
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Ok(Self::inner_build(pieces)?)
    }

    fn inner_build<I>(pieces: I) -> Result<Self, BackRankError>
    where
        I: IntoIterator<Item = PieceKind>,
    {
        let pieces: Vec<PieceKind> = pieces.into_iter().collect();
        let pieces: [PieceKind; WIDTH] = pieces.try_into().map_err(|_| ArgError)?;
        if pieces.iter().any(|kind| kind.is_runner()) {
            return Err(MisplacedRunner);
        }
        if pieces.iter().filter(|kind| kind.is_commander()).count() != 1 {
            return Err(CommanderCount);
        }
        Ok(Self { pieces })
    }

    pub fn pieces(&self) -> [PieceKind; WIDTH] {
        self.pieces
    }
}

impl Index<usize> for BackRank {
    type Output = PieceKind;
    fn index(&self, x: usize) -> &Self::Output {
        &self.pieces[x]
    }
}

impl TryFrom<Vec<PieceKind>> for BackRank {
    type Error = BackRankError;
    fn try_from(value: Vec<PieceKind>) -> Result<Self, Self::Error> {
        Self::inner_build(value)
    }
}

impl From<BackRank> for Vec<PieceKind> {
    fn from(value: BackRank) -> Self {
        value.pieces.to_vec()
    }
}

/// Initial placement: a home row and a row of Runners in front of it for
/// each owner. `First` starts on rows 0 and 1, `Second` on rows 7 and 6.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    back_ranks: Pair<BackRank>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::standard()
    }
}

impl Layout {
    pub const fn standard() -> Self {
        Self::new(BackRank::FIRST, BackRank::SECOND)
    }

    pub const fn new(first: BackRank, second: BackRank) -> Self {
        Self {
            back_ranks: Pair::new(first, second),
        }
    }

    pub fn back_rank(&self, owner: Owner) -> &BackRank {
        &self.back_ranks[owner]
    }

    pub const fn home_row(owner: Owner) -> usize {
        match owner {
            Owner::First => 0,
            Owner::Second => HEIGHT - 1,
        }
    }

    pub const fn runner_row(owner: Owner) -> usize {
        match owner {
            Owner::First => 1,
            Owner::Second => HEIGHT - 2,
        }
    }

    /// Every piece of the initial setup, built through `make_piece`.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        [Owner::First, Owner::Second]
            .into_iter()
            .flat_map(move |owner| {
                let back_rank = self.back_rank(owner);
                (0..WIDTH).flat_map(move |x| {
                    [
                        make_piece(back_rank[x], owner, Square::new(x, Self::home_row(owner))),
                        make_piece(Runner, owner, Square::new(x, Self::runner_row(owner))),
                    ]
                })
            })
    }
}
