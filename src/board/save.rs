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

//! Plain-text save files.
//!
//! A save file is a short header followed by the board, one line per row
//! starting at y = 0:
//!
//! ```text
//! ===== Kwazam Game Save =====
//! Player 1 (FIRST): Alice
//! Player 2 (SECOND): Bob
//! Current Turn: FIRST
//! Half Moves: 0
//!
//! ===== Game Board =====
//! F_TOR     F_BIZ     F_SAU     F_BIZ     F_XOR
//! F_RAM_D   F_RAM_D   F_RAM_D   F_RAM_D   F_RAM_D
//! .....     .....     .....     .....     .....
//! ...
//! ```
//!
//! Runner tokens carry `_D` when heading toward increasing y and `_U`
//! when heading toward decreasing y.

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use super::material::{make_piece, Heading, Owner, Pair, Piece, PieceKind};
use super::play::{GameState, Rules};
use super::position::Board;
use super::square::{Square, HEIGHT, WIDTH};
use super::Turn;

const TITLE: &str = "===== Kwazam Game Save =====";
const BOARD_HEADER: &str = "===== Game Board =====";
const PLAYER_1: &str = "Player 1 (FIRST)";
const PLAYER_2: &str = "Player 2 (SECOND)";
const CURRENT_TURN: &str = "Current Turn";
const HALF_MOVES: &str = "Half Moves";
const EMPTY_CELL: &str = ".....";
const CELL_WIDTH: usize = 10;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Unable to access saved game: {0}")]
    Io(#[from] io::Error),
    #[error("Saved game is missing {0}")]
    MissingSection(&'static str),
    #[error("Malformed header line: {0:?}")]
    BadHeader(String),
    #[error("Board row {row} has {found} cells, expecting 5")]
    BadRow { row: usize, found: usize },
    #[error("Unrecognized token {token:?} at {square}")]
    BadToken { square: Square, token: String },
    #[error("Player name {0:?} cannot be saved")]
    BadName(String),
}

use PersistenceError::*;

fn turn_label(owner: Owner) -> &'static str {
    match owner {
        Owner::First => "FIRST",
        Owner::Second => "SECOND",
    }
}

fn parse_turn(label: &str) -> Option<Owner> {
    match label {
        "FIRST" => Some(Owner::First),
        "SECOND" => Some(Owner::Second),
        _ => None,
    }
}

fn heading_code(heading: Heading) -> char {
    match heading {
        Heading::Ascending => 'D',
        Heading::Descending => 'U',
    }
}

fn token(piece: Option<&Piece>) -> String {
    let Some(piece) = piece else {
        return EMPTY_CELL.to_string();
    };
    let mut token = format!("{}_{}", piece.owner().code(), piece.kind().code());
    if let Some(heading) = piece.heading() {
        token.push('_');
        token.push(heading_code(heading));
    }
    token
}

fn parse_token(token: &str, square: Square) -> Result<Option<Piece>, PersistenceError> {
    if token == EMPTY_CELL {
        return Ok(None);
    }
    let bad_token = || BadToken {
        square,
        token: token.to_string(),
    };
    let parts: Vec<&str> = token.split('_').collect();
    let (owner, kind, heading) = match parts.as_slice() {
        [owner, kind] => (*owner, *kind, None),
        [owner, kind, heading] => (*owner, *kind, Some(*heading)),
        _ => return Err(bad_token()),
    };
    let mut chars = owner.chars();
    let owner = match (chars.next(), chars.next()) {
        (Some(code), None) => Owner::from_code(code),
        _ => None,
    }
    .ok_or_else(bad_token)?;
    let kind = PieceKind::from_code(kind).ok_or_else(bad_token)?;
    match (kind.is_runner(), heading) {
        (true, Some("D")) => Ok(Some(Piece::runner(owner, square, Heading::Ascending))),
        (true, Some("U")) => Ok(Some(Piece::runner(owner, square, Heading::Descending))),
        (false, None) => Ok(Some(make_piece(kind, owner, square))),
        _ => Err(bad_token()),
    }
}

/// A name survives the header line only if it is a single line with no
/// surrounding whitespace.
fn check_name(name: &str) -> Result<&str, PersistenceError> {
    if name.trim() != name || name.chars().any(char::is_control) {
        return Err(BadName(name.to_string()));
    }
    Ok(name)
}

/// Renders `state` in the save-file format. Fails if a player name would
/// not read back unchanged.
pub fn to_text(state: &GameState) -> Result<String, PersistenceError> {
    let first = check_name(state.player_name(Owner::First))?;
    let second = check_name(state.player_name(Owner::Second))?;
    let mut lines = vec![
        TITLE.to_string(),
        format!("{PLAYER_1}: {first}"),
        format!("{PLAYER_2}: {second}"),
        format!("{CURRENT_TURN}: {}", turn_label(state.turn())),
        format!("{HALF_MOVES}: {}", state.half_move_count()),
        String::new(),
        BOARD_HEADER.to_string(),
    ];
    for y in 0..HEIGHT {
        let row: String = (0..WIDTH)
            .map(|x| {
                let piece = state.board().piece_at(Square::new(x, y));
                format!("{:<width$}", token(piece.as_ref()), width = CELL_WIDTH)
            })
            .collect();
        lines.push(row);
    }
    let mut text = lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Parses a saved game played under the standard rules.
pub fn from_text(text: &str) -> Result<GameState, PersistenceError> {
    from_text_with_rules(text, Rules::default())
}

pub fn from_text_with_rules(text: &str, rules: Rules) -> Result<GameState, PersistenceError> {
    parse(text, rules).map_err(|err| {
        warn!(%err, "rejected saved game");
        err
    })
}

fn parse(text: &str, rules: Rules) -> Result<GameState, PersistenceError> {
    let mut lines = text.lines();

    let mut found_title = false;
    let mut found_board = false;
    let mut first_name = None;
    let mut second_name = None;
    let mut turn = None;
    let mut half_moves = None;
    for line in lines.by_ref() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if line == TITLE {
            found_title = true;
            continue;
        }
        if line == BOARD_HEADER {
            found_board = true;
            break;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| BadHeader(line.to_string()))?;
        let value = value.trim();
        match key.trim() {
            PLAYER_1 => first_name = Some(value.to_string()),
            PLAYER_2 => second_name = Some(value.to_string()),
            CURRENT_TURN => {
                turn = Some(parse_turn(value).ok_or_else(|| BadHeader(line.to_string()))?)
            }
            HALF_MOVES => {
                let count: u32 = value.parse().map_err(|_| BadHeader(line.to_string()))?;
                half_moves = Some(count);
            }
            _ => return Err(BadHeader(line.to_string())),
        }
    }
    if !found_title {
        return Err(MissingSection("the save title"));
    }
    if !found_board {
        return Err(MissingSection("the board header"));
    }
    let first_name = first_name.ok_or(MissingSection("player 1"))?;
    let second_name = second_name.ok_or(MissingSection("player 2"))?;
    let turn = turn.ok_or(MissingSection("the current turn"))?;
    let half_moves = half_moves.unwrap_or(match turn {
        Owner::First => 0,
        Owner::Second => 1,
    });

    let mut board = Board::empty();
    let rows: Vec<&str> = lines.filter(|line| !line.trim().is_empty()).collect();
    if rows.len() < HEIGHT {
        return Err(MissingSection("board rows"));
    }
    for (y, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.split_whitespace().collect();
        if y >= HEIGHT || cells.len() != WIDTH {
            return Err(BadRow {
                row: y,
                found: cells.len(),
            });
        }
        for (x, cell) in cells.into_iter().enumerate() {
            if let Some(piece) = parse_token(cell, Square::new(x, y))? {
                board.place(piece);
            }
        }
    }

    let state = GameState::restore(
        Pair::new(first_name, second_name),
        board,
        turn,
        half_moves,
        rules,
    );
    debug!(
        turn = %state.turn(),
        half_moves = state.half_move_count(),
        finished = state.is_finished(),
        "loaded saved game"
    );
    Ok(state)
}

pub fn save<P: AsRef<Path>>(state: &GameState, path: P) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    let text = to_text(state)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    debug!(path = %path.display(), "saved game");
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<GameState, PersistenceError> {
    let text = fs::read_to_string(path)?;
    from_text(&text)
}

/// True when `path` is a non-empty file.
pub fn has_saved_game<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.len() > 0)
        .unwrap_or(false)
}

/// Deletes the save file. Returns `false` if there was nothing to delete.
pub fn clear_saved_game<P: AsRef<Path>>(path: P) -> Result<bool, PersistenceError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameStatus, MoveError};
    use Owner::*;
    use PieceKind::*;

    fn sq(x: usize, y: usize) -> Square {
        Square::new(x, y)
    }

    #[test]
    fn test_initial_text() {
        let text = to_text(&GameState::new("Alice", "Bob")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], TITLE);
        assert_eq!(lines[1], "Player 1 (FIRST): Alice");
        assert_eq!(lines[2], "Player 2 (SECOND): Bob");
        assert_eq!(lines[3], "Current Turn: FIRST");
        assert_eq!(lines[4], "Half Moves: 0");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], BOARD_HEADER);
        assert_eq!(lines.len(), 15);
        assert_eq!(
            lines[7],
            "F_TOR     F_BIZ     F_SAU     F_BIZ     F_XOR     "
        );
        assert!(lines[8].starts_with("F_RAM_D   F_RAM_D"));
        assert_eq!(lines[9].trim_end(), ".....     .....     .....     .....     .....");
        assert!(lines[13].starts_with("S_RAM_U   "));
        assert!(lines[14].starts_with("S_XOR     S_BIZ     S_SAU"));
    }
    #[test]
    fn test_round_trip_initial() {
        let state = GameState::new("Alice", "Bob");
        assert_eq!(from_text(&to_text(&state).unwrap()).unwrap(), state);
    }
    #[test]
    fn test_round_trip_mid_game() {
        let mut state = GameState::new("Alice", "Bob");
        state.apply_move(sq(0, 1), sq(0, 2)).unwrap();
        state.apply_move(sq(0, 6), sq(0, 5)).unwrap();
        state.apply_move(sq(1, 0), sq(2, 2)).unwrap();
        let loaded = from_text(&to_text(&state).unwrap()).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.turn(), Second);
        assert_eq!(loaded.half_move_count(), 3);
        assert_eq!(loaded.board().piece_at(sq(0, 0)).map(|p| p.kind()), Some(Diagonal));
    }
    #[test]
    fn test_round_trip_reversed_runner() {
        let board = Board::empty()
            .with(make_piece(Commander, First, sq(0, 0)))
            .with(make_piece(Commander, Second, sq(4, 7)))
            .with(Piece::runner(First, sq(2, 6), Heading::Descending))
            .with(Piece::runner(Second, sq(3, 1), Heading::Ascending));
        let state = GameState::restore(
            Pair::new("Alice".into(), "Bob".into()),
            board,
            First,
            7,
            Rules::default(),
        );
        let text = to_text(&state).unwrap();
        assert!(text.contains("F_RAM_U"));
        assert!(text.contains("S_RAM_D"));
        assert_eq!(from_text(&text).unwrap(), state);
    }
    #[test]
    fn test_half_moves_line_is_optional() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replace("Half Moves: 0\n", "");
        assert_eq!(from_text(&text).unwrap().half_move_count(), 0);
        let text = text.replace("Current Turn: FIRST", "Current Turn: SECOND");
        let state = from_text(&text).unwrap();
        assert_eq!(state.turn(), Second);
        assert_eq!(state.half_move_count(), 1);
    }
    #[test]
    fn test_missing_commander_loads_finished() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("S_SAU", ".....", 1);
        let state = from_text(&text).unwrap();
        assert_eq!(state.status(), GameStatus::Finished(First));
    }
    #[test]
    fn test_missing_board_header() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replace(BOARD_HEADER, "");
        assert!(matches!(from_text(&text), Err(MissingSection(_)) | Err(BadHeader(_))));
        let text = "===== Kwazam Game Save =====\nPlayer 1 (FIRST): A\n";
        assert!(matches!(from_text(text), Err(MissingSection(_))));
    }
    #[test]
    fn test_bad_turn() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replace("Current Turn: FIRST", "Current Turn: PURPLE");
        assert!(matches!(from_text(&text), Err(BadHeader(_))));
    }
    #[test]
    fn test_bad_half_moves() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replace("Half Moves: 0", "Half Moves: lots");
        assert!(matches!(from_text(&text), Err(BadHeader(_))));
    }
    #[test]
    fn test_short_row() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("F_XOR", "", 1);
        assert!(matches!(from_text(&text), Err(BadRow { row: 0, found: 4 })));
    }
    #[test]
    fn test_missing_rows() {
        let text = to_text(&GameState::new("Alice", "Bob")).unwrap();
        let truncated: Vec<&str> = text.lines().take(12).collect();
        assert!(matches!(
            from_text(&truncated.join("\n")),
            Err(MissingSection(_))
        ));
    }
    #[test]
    fn test_extra_row() {
        let mut text = to_text(&GameState::new("Alice", "Bob")).unwrap();
        text.push_str(".....     .....     .....     .....     .....\n");
        assert!(matches!(from_text(&text), Err(BadRow { row: 8, .. })));
    }
    #[test]
    fn test_unknown_token() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("F_BIZ", "F_KNT", 1);
        match from_text(&text) {
            Err(BadToken { square, token }) => {
                assert_eq!(square, sq(1, 0));
                assert_eq!(token, "F_KNT");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    #[test]
    fn test_runner_needs_heading() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("F_RAM_D", "F_RAM  ", 1);
        assert!(matches!(from_text(&text), Err(BadToken { .. })));
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("F_TOR", "F_TOR_U", 1);
        assert!(matches!(from_text(&text), Err(BadToken { .. })));
    }
    #[test]
    fn test_unknown_owner() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replacen("S_SAU", "R_SAU", 1);
        assert!(matches!(from_text(&text), Err(BadToken { .. })));
    }
    #[test]
    fn test_file_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("savegame.txt");
        assert!(!has_saved_game(&path));
        assert!(matches!(load(&path), Err(Io(_))));

        let mut state = GameState::new("Alice", "Bob");
        state.apply_move(sq(2, 1), sq(2, 2)).unwrap();
        save(&state, &path).unwrap();
        assert!(has_saved_game(&path));
        assert_eq!(load(&path).unwrap(), state);

        assert!(clear_saved_game(&path).unwrap());
        assert!(!has_saved_game(&path));
        assert!(!clear_saved_game(&path).unwrap());
    }
    #[test]
    fn test_empty_file_is_not_a_saved_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savegame.txt");
        fs::write(&path, "").unwrap();
        assert!(!has_saved_game(&path));
        assert!(!has_saved_game(dir.path()));
    }
    #[test]
    fn test_names_round_trip() {
        let state = GameState::new("Alice Liddell", "Bob: the Builder");
        let loaded = from_text(&to_text(&state).unwrap()).unwrap();
        assert_eq!(loaded.player_name(First), "Alice Liddell");
        assert_eq!(loaded.player_name(Second), "Bob: the Builder");
    }
    #[test]
    fn test_padded_name_rejected() {
        let state = GameState::new(" Alice ", "Bob");
        assert!(matches!(to_text(&state), Err(BadName(name)) if name == " Alice "));
    }
    #[test]
    fn test_multi_line_name_rejected() {
        let state = GameState::new("Alice\nCurrent Turn: SECOND\nHalf Moves: 9", "Bob");
        assert!(matches!(to_text(&state), Err(BadName(_))));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("savegame.txt");
        assert!(matches!(save(&state, &path), Err(BadName(_))));
        assert!(!path.exists());
    }
    #[test]
    fn test_exhausted_half_move_count_loads_but_cannot_advance() {
        let text = to_text(&GameState::new("Alice", "Bob"))
            .unwrap()
            .replace("Half Moves: 0", "Half Moves: 4294967295");
        let mut state = from_text(&text).unwrap();
        assert_eq!(state.half_move_count(), u32::MAX);
        let before = state.clone();
        assert!(matches!(
            state.apply_move(sq(0, 1), sq(0, 2)),
            Err(MoveError::PreconditionViolated(_))
        ));
        assert_eq!(state, before);
    }
}
