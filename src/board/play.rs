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
use std::num::NonZeroU16;
use std::ops::Index;
use thiserror::Error;
use tracing::{debug, info};

use super::backrank::Layout;
use super::material::{Heading, Owner, Pair, Piece, PieceKind};
use super::moves::{attackers, destinations, legal_destinations, MoveError};
use super::position::Board;
use super::square::{Mask, Square};
use super::Turn;
use crate::{GameResult, WinReason};

use MoveError::*;

const DEFAULT_TRANSFORM_PERIOD: NonZeroU16 = match NonZeroU16::new(2) {
    Some(period) => period,
    None => panic!("transform period must be non-zero"),
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesError {
    #[error("Transform period must be at least one half-move")]
    ZeroPeriod,
}

/// Tunable parts of the rule set. `Default` is the standard game:
/// Towers and Diagonals swap every two half-moves from the standard layout.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Rules {
    transform_period: NonZeroU16,
    layout: Layout,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            transform_period: DEFAULT_TRANSFORM_PERIOD,
            layout: Layout::standard(),
        }
    }
}

impl Rules {
    pub fn new(transform_period: u16, layout: Layout) -> Result<Self> {
        let transform_period = NonZeroU16::new(transform_period).ok_or(RulesError::ZeroPeriod)?;
        Ok(Self {
            transform_period,
            layout,
        })
    }
    pub fn transform_period(&self) -> u16 {
        self.transform_period.get()
    }
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
    fn transforms_after(&self, half_move_count: u32) -> bool {
        half_move_count % u32::from(self.transform_period.get()) == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Finished(Owner),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Quiet,
    Capture(Piece),
}

/// What happened when a move was applied, for the caller to render or
/// persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub kind: MoveKind,
    pub transformed: bool,
    pub winner: Option<Owner>,
}

impl MoveOutcome {
    pub fn is_capture(&self) -> bool {
        matches!(self.kind, MoveKind::Capture(_))
    }
}

/// One occupied square as seen by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub square: Square,
    pub owner: Owner,
    pub kind: PieceKind,
    pub heading: Option<Heading>,
}

impl From<&Piece> for SnapshotEntry {
    fn from(piece: &Piece) -> Self {
        Self {
            square: piece.position(),
            owner: piece.owner(),
            kind: piece.kind(),
            heading: piece.heading(),
        }
    }
}

/// Read-only copy of the board, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub turn: Owner,
    pub half_move_count: u32,
    pub winner: Option<Owner>,
    pub entries: Vec<SnapshotEntry>,
}

impl BoardSnapshot {
    pub fn get(&self, square: Square) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|entry| entry.square == square)
    }
}

/// A game in progress: the board, whose turn it is, how many half-moves
/// have been played and, once a Commander falls, who won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    turn: Owner,
    half_move_count: u32,
    winner: Option<Owner>,
    players: Pair<String>,
    rules: Rules,
}

impl GameState {
    pub fn new<S: Into<String>>(player1: S, player2: S) -> Self {
        Self::with_rules(player1, player2, Rules::default())
    }

    pub fn with_rules<S: Into<String>>(player1: S, player2: S, rules: Rules) -> Self {
        Self {
            board: Board::new(rules.layout()),
            turn: Owner::First,
            half_move_count: 0,
            winner: None,
            players: Pair::new(player1.into(), player2.into()),
            rules,
        }
    }

    /// Rebuilds a game from stored parts. A board already missing a
    /// Commander comes back finished.
    pub fn restore(
        players: Pair<String>,
        board: Board,
        turn: Owner,
        half_move_count: u32,
        rules: Rules,
    ) -> Self {
        let winner = decide_winner(&board, !turn);
        Self {
            board,
            turn,
            half_move_count,
            winner,
            players,
            rules,
        }
    }

    /// Starts over with the same players and rules.
    pub fn reset(&mut self) {
        let players = std::mem::take(&mut self.players);
        *self = Self::with_rules(
            players.first().clone(),
            players.second().clone(),
            self.rules,
        );
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn half_move_count(&self) -> u32 {
        self.half_move_count
    }
    pub fn winner(&self) -> Option<Owner> {
        self.winner
    }
    pub fn rules(&self) -> &Rules {
        &self.rules
    }
    pub fn players(&self) -> &Pair<String> {
        &self.players
    }
    pub fn player_name(&self, owner: Owner) -> &str {
        &self.players[owner]
    }
    pub fn status(&self) -> GameStatus {
        match self.winner {
            Some(winner) => GameStatus::Finished(winner),
            None => GameStatus::InProgress,
        }
    }
    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }
    pub fn result(&self) -> Option<GameResult> {
        self.winner
            .map(|winner| GameResult::Win(winner, WinReason::CommanderCaptured))
    }

    /// Destinations for the piece on `from`. Empty if the square is empty,
    /// the piece belongs to the side not on move, or the game is over.
    /// Asking about a Runner on its far edge turns it around.
    pub fn legal_moves(&mut self, from: Square) -> Mask {
        match self.board.piece_at(from) {
            Some(piece) if piece.owner() == self.turn && !self.is_finished() => {
                legal_destinations(&mut self.board, from)
            }
            _ => Mask::empty(),
        }
    }

    /// Validates and plays `from` → `to`. On error nothing changes.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        if self.is_finished() {
            return Err(GameOver);
        }
        let piece = self.board.piece_at(from).ok_or(NoPieceAtSource(from))?;
        if piece.owner() != self.turn {
            return Err(NotYourTurn(piece.owner()));
        }
        // Validate without touching the board so a rejected move leaves no trace
        if !destinations(&piece, &self.board).contains(to) {
            return Err(IllegalDestination(from, to));
        }
        let half_move_count = self
            .half_move_count
            .checked_add(1)
            .ok_or(PreconditionViolated("half-move count overflow"))?;

        let reachable = legal_destinations(&mut self.board, from);
        debug_assert!(reachable.contains(to));
        let kind = match self.board.remove(to) {
            Some(captured) => MoveKind::Capture(captured),
            None => MoveKind::Quiet,
        };
        self.board.move_piece(from, to)?;
        self.half_move_count = half_move_count;
        debug!(
            owner = %piece.owner(),
            kind = %piece.kind(),
            %from,
            %to,
            capture = matches!(kind, MoveKind::Capture(_)),
            half_moves = self.half_move_count,
            "move applied"
        );

        let transformed = self.rules.transforms_after(self.half_move_count);
        if transformed {
            let count = self.board.transform_all();
            info!(half_moves = self.half_move_count, count, "towers and diagonals transform");
        }

        self.winner = decide_winner(&self.board, piece.owner());
        match self.winner {
            Some(winner) => info!(%winner, "commander captured, game over"),
            None => self.turn = !self.turn,
        }

        Ok(MoveOutcome {
            kind,
            transformed,
            winner: self.winner,
        })
    }

    /// Whether any opposing piece could reach `owner`'s Commander. Purely
    /// advisory: moves that leave a Commander attacked are still legal.
    pub fn is_in_check(&self, owner: Owner) -> bool {
        match self.board.commander(owner) {
            Some(square) => !attackers(&self.board, !owner, square).is_empty(),
            None => false,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            turn: self.turn,
            half_move_count: self.half_move_count,
            winner: self.winner,
            entries: self.board.pieces().map(SnapshotEntry::from).collect(),
        }
    }
}

/// The side whose Commander survives. If neither does, the side that
/// just moved takes the game.
fn decide_winner(board: &Board, mover: Owner) -> Option<Owner> {
    match (board.commander(Owner::First), board.commander(Owner::Second)) {
        (Some(_), Some(_)) => None,
        (Some(_), None) => Some(Owner::First),
        (None, Some(_)) => Some(Owner::Second),
        (None, None) => Some(mover),
    }
}

impl Turn for GameState {
    #[inline]
    fn turn(&self) -> Owner {
        self.turn
    }
}

impl Index<Square> for GameState {
    type Output = Option<Piece>;
    fn index(&self, index: Square) -> &Self::Output {
        self.board.index(index)
    }
}

impl AsRef<Board> for GameState {
    fn as_ref(&self) -> &Board {
        &self.board
    }
}
