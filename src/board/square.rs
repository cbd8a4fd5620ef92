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
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitOrAssign, Not};
use std::ops::{Index, IndexMut};
use strum_macros::EnumIter;

/// Number of columns (x axis).
pub const WIDTH: usize = 5;
/// Number of rows (y axis).
pub const HEIGHT: usize = 8;
pub const SQUARE_COUNT: usize = WIDTH * HEIGHT;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    y: u8,
    x: u8,
}

impl Square {
    /// Builds a square from coordinates already known to be on the board.
    #[inline]
    pub const fn new(x: usize, y: usize) -> Self {
        debug_assert!(x < WIDTH && y < HEIGHT);
        Self {
            x: x as u8,
            y: y as u8,
        }
    }

    #[inline]
    pub const fn try_new(x: isize, y: isize) -> Option<Self> {
        if in_bounds(x, y) {
            Some(Self::new(x as usize, y as usize))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Self {
        debug_assert!(index < SQUARE_COUNT);
        Self::new(index % WIDTH, index / WIDTH)
    }

    #[inline]
    pub const fn x(&self) -> usize {
        self.x as usize
    }
    #[inline]
    pub const fn y(&self) -> usize {
        self.y as usize
    }
    #[inline]
    pub const fn to_index(&self) -> usize {
        self.y() * WIDTH + self.x()
    }
    #[inline]
    pub const fn to_mask(&self) -> Mask {
        Mask::new(0x1 << self.to_index())
    }

    /// All squares in row-major order.
    pub fn iter() -> impl DoubleEndedIterator<Item = Square> {
        (0..SQUARE_COUNT).map(Square::from_index)
    }
}

/// True when `(x, y)` lies on the 5×8 board.
#[inline]
pub const fn in_bounds(x: isize, y: isize) -> bool {
    x >= 0 && y >= 0 && (x as usize) < WIDTH && (y as usize) < HEIGHT
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: isize,
    pub y: isize,
}

impl Offset {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }
}

impl Add<Offset> for Square {
    type Output = Option<Square>;
    fn add(self, rhs: Offset) -> Self::Output {
        Square::try_new(self.x() as isize + rhs.x, self.y() as isize + rhs.y)
    }
}

impl Index<Square> for [Mask; SQUARE_COUNT] {
    type Output = Mask;
    fn index(&self, square: Square) -> &Self::Output {
        &self[square.to_index()]
    }
}

impl IndexMut<Square> for [Mask; SQUARE_COUNT] {
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self[square.to_index()]
    }
}

/// Unit steps. `Up` points toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

use Direction::{Down, DownLeft, DownRight, Left, Right, Up, UpLeft, UpRight};

impl Direction {
    #[inline]
    pub fn is_orthogonal(&self) -> bool {
        matches!(*self, Up | Left | Right | Down)
    }
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        matches!(*self, UpLeft | UpRight | DownLeft | DownRight)
    }
    pub fn orthogonals() -> impl Iterator<Item = Self> {
        [Up, Left, Right, Down].into_iter()
    }
    pub fn diagonals() -> impl Iterator<Item = Self> {
        [UpLeft, UpRight, DownLeft, DownRight].into_iter()
    }
}

impl From<Direction> for Offset {
    fn from(value: Direction) -> Self {
        match value {
            UpLeft => Self::new(-1, -1),
            Up => Self::new(0, -1),
            UpRight => Self::new(1, -1),
            Left => Self::new(-1, 0),
            Right => Self::new(1, 0),
            DownLeft => Self::new(-1, 1),
            Down => Self::new(0, 1),
            DownRight => Self::new(1, 1),
        }
    }
}

impl Add<Direction> for Square {
    type Output = Option<Square>;
    fn add(self, rhs: Direction) -> Self::Output {
        let offset: Offset = rhs.into();
        self + offset
    }
}

/// A set of squares, one bit per square in row-major order.
#[derive(Clone, Serialize, Deserialize, Copy, PartialEq, Eq, Hash, Default)]
pub struct Mask(u64);

impl Mask {
    const BOARD: u64 = (1 << SQUARE_COUNT) - 1;

    #[inline]
    pub const fn new(val: u64) -> Self {
        Self(val & Self::BOARD)
    }

    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn all() -> Self {
        Self(Self::BOARD)
    }

    pub fn from_squares<I>(squares: I) -> Self
    where
        I: IntoIterator<Item = Square>,
    {
        squares
            .into_iter()
            .map(|square| square.to_mask())
            .reduce(|m1, m2| m1 | m2)
            .unwrap_or_default()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn reset(&mut self, square: Square) {
        self.0 &= !square.to_mask().0;
    }

    #[inline]
    pub const fn contains(&self, square: Square) -> bool {
        (self.0 & square.to_mask().0) != 0
    }

    pub fn iter(&self) -> MaskIter {
        MaskIter(self.0)
    }

    pub fn to_vec(&self) -> Vec<Square> {
        self.iter().collect()
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let square = Square::new(x, y);
                write!(f, "{}", if self.contains(square) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Not for Mask {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::BOARD)
    }
}

impl BitOr for Mask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitOr<Square> for Mask {
    type Output = Self;

    fn bitor(self, rhs: Square) -> Self {
        Self(self.0 | rhs.to_mask().0)
    }
}

impl BitOrAssign<Square> for Mask {
    fn bitor_assign(&mut self, rhs: Square) {
        self.0 |= rhs.to_mask().0;
    }
}

impl BitAnd for Mask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl FromIterator<Square> for Mask {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        Self::from_squares(iter)
    }
}

impl IntoIterator for Mask {
    type Item = Square;
    type IntoIter = MaskIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskIter(u64);

impl Iterator for MaskIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let square = Square::from_index(self.0.trailing_zeros() as usize);
            self.0 &= !square.to_mask().0;
            return Some(square);
        }
        None
    }
}

impl DoubleEndedIterator for MaskIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            let square = Square::from_index(63 - self.0.leading_zeros() as usize);
            self.0 &= !square.to_mask().0;
            return Some(square);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_square_index_is_row_major() {
        assert_eq!(Square::new(0, 0).to_index(), 0);
        assert_eq!(Square::new(4, 0).to_index(), 4);
        assert_eq!(Square::new(0, 1).to_index(), 5);
        assert_eq!(Square::new(4, 7).to_index(), 39);
        for square in Square::iter() {
            assert_eq!(Square::from_index(square.to_index()), square);
        }
    }
    #[test]
    fn test_bounds() {
        assert!(in_bounds(0, 0));
        assert!(in_bounds(4, 7));
        assert!(!in_bounds(5, 0));
        assert!(!in_bounds(0, 8));
        assert!(!in_bounds(-1, 3));
        assert_eq!(Square::try_new(2, -1), None);
    }
    #[test]
    fn test_offset_off_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner + Up, None);
        assert_eq!(corner + Left, None);
        assert_eq!(corner + DownRight, Some(Square::new(1, 1)));
        assert_eq!(Square::new(4, 7) + Offset::new(1, 0), None);
    }
    #[test]
    fn test_directions_partition() {
        assert_eq!(Direction::iter().filter(|d| d.is_orthogonal()).count(), 4);
        assert_eq!(Direction::iter().filter(|d| d.is_diagonal()).count(), 4);
    }
    #[test]
    fn test_mask_iter_both_ends() {
        let mask = Mask::from_squares([Square::new(1, 0), Square::new(3, 5), Square::new(4, 7)]);
        assert_eq!(mask.len(), 3);
        let forward: Vec<_> = mask.iter().collect();
        let mut backward: Vec<_> = mask.iter().rev().collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward[0], Square::new(1, 0));
    }
    #[test]
    fn test_mask_not_stays_on_board() {
        let mask = !Mask::empty();
        assert_eq!(mask, Mask::all());
        assert_eq!(mask.len(), SQUARE_COUNT);
    }
}
