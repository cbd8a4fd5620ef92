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
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut, Not};
use strum_macros::Display;
use strum_macros::EnumIter;

use super::square::{Square, HEIGHT};

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Owner {
    First,
    Second,
}

use Owner::{First, Second};

impl Owner {
    /// Code used in save-file tokens.
    pub const fn code(&self) -> char {
        match self {
            First => 'F',
            Second => 'S',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'F' => Some(First),
            'S' => Some(Second),
            _ => None,
        }
    }
}

impl Not for Owner {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        match self {
            First => Second,
            Second => First,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pair<T>((T, T));

impl<T> Pair<T> {
    pub const fn new(first: T, second: T) -> Self {
        Self((first, second))
    }
}

impl<T> Pair<T> {
    pub fn first(&self) -> &T {
        &self.0 .0
    }
    pub fn first_mut(&mut self) -> &mut T {
        &mut self.0 .0
    }
    pub fn second(&self) -> &T {
        &self.0 .1
    }
    pub fn second_mut(&mut self) -> &mut T {
        &mut self.0 .1
    }
}

impl<T: Hash> Hash for Pair<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first().hash(state);
        self.second().hash(state);
    }
}

impl<T> Index<Owner> for Pair<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: Owner) -> &Self::Output {
        match index {
            First => self.first(),
            Second => self.second(),
        }
    }
}

impl<T> IndexMut<Owner> for Pair<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: Owner) -> &mut Self::Output {
        match index {
            First => self.first_mut(),
            Second => self.second_mut(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PieceKind {
    /// "Ram": marches one square, reversing at the far edge.
    Runner,
    /// "Biz": L-shaped jumps.
    Jumper,
    /// "Sau": one square in any direction; losing it loses the game.
    Commander,
    /// "Tor": orthogonal slider.
    Tower,
    /// "Xor": diagonal slider.
    Diagonal,
}

use PieceKind::{Commander, Diagonal, Jumper, Runner, Tower};

impl PieceKind {
    /// The kind this one becomes when the Tower/Diagonal swap fires.
    pub fn transformed(&self) -> Self {
        match *self {
            Tower => Diagonal,
            Diagonal => Tower,
            kind => kind,
        }
    }

    pub fn transforms(&self) -> bool {
        matches!(*self, Tower | Diagonal)
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Runner => "RAM",
            Jumper => "BIZ",
            Commander => "SAU",
            Tower => "TOR",
            Diagonal => "XOR",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "RAM" => Some(Runner),
            "BIZ" => Some(Jumper),
            "SAU" => Some(Commander),
            "TOR" => Some(Tower),
            "XOR" => Some(Diagonal),
            _ => None,
        }
    }

    pub fn is_runner(&self) -> bool {
        matches!(*self, Runner)
    }
    pub fn is_commander(&self) -> bool {
        matches!(*self, Commander)
    }
}

/// Marching direction of a Runner along the y axis.
#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Heading {
    /// Toward increasing y.
    Ascending,
    /// Toward decreasing y.
    Descending,
}

impl Heading {
    #[inline]
    pub const fn step(&self) -> isize {
        match self {
            Heading::Ascending => 1,
            Heading::Descending => -1,
        }
    }

    #[inline]
    pub const fn reversed(&self) -> Self {
        match self {
            Heading::Ascending => Heading::Descending,
            Heading::Descending => Heading::Ascending,
        }
    }

    /// The row a Runner with this heading cannot advance past.
    #[inline]
    pub const fn far_edge(&self) -> usize {
        match self {
            Heading::Ascending => HEIGHT - 1,
            Heading::Descending => 0,
        }
    }

    /// Heading a freshly set up Runner marches in.
    pub const fn initial(owner: Owner) -> Self {
        match owner {
            First => Heading::Ascending,
            Second => Heading::Descending,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    owner: Owner,
    position: Square,
    heading: Option<Heading>,
}

/// Creates a piece in its initial state. Runners get the heading of their
/// owner's side; other kinds carry no heading.
pub fn make_piece(kind: PieceKind, owner: Owner, position: Square) -> Piece {
    let heading = kind.is_runner().then(|| Heading::initial(owner));
    Piece {
        kind,
        owner,
        position,
        heading,
    }
}

impl Piece {
    /// A Runner with an explicit heading, as restored from a save file.
    pub fn runner(owner: Owner, position: Square, heading: Heading) -> Self {
        Self {
            kind: Runner,
            owner,
            position,
            heading: Some(heading),
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }
    #[inline]
    pub fn owner(&self) -> Owner {
        self.owner
    }
    #[inline]
    pub fn position(&self) -> Square {
        self.position
    }
    #[inline]
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// The heading this Runner will march in when next asked to move:
    /// reversed if it already stands on the far edge it was heading for.
    pub fn effective_heading(&self) -> Option<Heading> {
        self.heading.map(|heading| {
            if self.position.y() == heading.far_edge() {
                heading.reversed()
            } else {
                heading
            }
        })
    }

    pub(super) fn set_position(&mut self, position: Square) {
        self.position = position;
    }

    pub(super) fn set_heading(&mut self, heading: Heading) {
        debug_assert!(self.kind.is_runner());
        self.heading = Some(heading);
    }

    pub(super) fn transform(&mut self) -> bool {
        if self.kind.transforms() {
            self.kind = self.kind.transformed();
            return true;
        }
        false
    }
}
