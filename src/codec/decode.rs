//! CSV text to score matrix.

use crate::error::{LedgerError, Result};
use crate::types::{Game, MonthDate, Score, Snapshot};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Games and players decoded from CSV, before a month and lock flag are
/// attached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreMatrix {
    pub games: Vec<Game>,
    pub players: Vec<String>,
}

impl ScoreMatrix {
    /// Attach the month and lock flag, which come from the file location.
    pub fn into_snapshot(self, date: MonthDate, locked: bool) -> Snapshot {
        Snapshot {
            date,
            locked,
            games: self.games,
            players: self.players,
        }
    }
}

/// Decode CSV text into a score matrix.
///
/// The header's cells after the first name the games, in column order.
/// Every other row is a player name followed by exactly one integer score
/// per game. A player repeated on a later row replaces the earlier scores
/// but keeps its first position.
///
/// Names are kept exactly as written, surrounding whitespace included, so
/// `alice` and ` alice` stay two players. Score cells are trimmed.
pub fn decode(text: &str) -> Result<ScoreMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(LedgerError::parse(1, "missing header row")),
    };
    let header_line = line_of(&header);

    let mut game_names: Vec<String> = Vec::with_capacity(header.len().saturating_sub(1));
    let mut seen = HashSet::new();
    for name in header.iter().skip(1) {
        if name.is_empty() {
            return Err(LedgerError::parse(header_line, "empty game name in header"));
        }
        if !seen.insert(name) {
            return Err(LedgerError::parse(
                header_line,
                format!("duplicate game {name:?} in header"),
            ));
        }
        game_names.push(name.to_string());
    }

    let mut players: Vec<String> = Vec::new();
    let mut rows: HashMap<String, Vec<Score>> = HashMap::new();

    for record in records {
        let record = record?;
        let line = line_of(&record);

        let player = record.get(0).unwrap_or_default();
        if player.is_empty() {
            return Err(LedgerError::parse(line, "empty player name"));
        }

        let cells = record.len().saturating_sub(1);
        if cells != game_names.len() {
            let problem = if cells < game_names.len() { "too few" } else { "too many" };
            return Err(LedgerError::parse(
                line,
                format!(
                    "{problem} score cells for {player:?}: got {cells}, expected {}",
                    game_names.len()
                ),
            ));
        }

        let mut scores = Vec::with_capacity(cells);
        for (cell, game) in record.iter().skip(1).zip(&game_names) {
            let score: Score = cell.trim().parse().map_err(|_| {
                LedgerError::parse(
                    line,
                    format!("non-integer score {cell:?} for {player:?} in {game:?}"),
                )
            })?;
            scores.push(score);
        }

        if rows.insert(player.to_string(), scores).is_none() {
            players.push(player.to_string());
        }
    }

    let games = game_names
        .into_iter()
        .enumerate()
        .map(|(column, name)| Game {
            name,
            scores: players
                .iter()
                .map(|p| (p.clone(), rows[p][column]))
                .collect(),
        })
        .collect();

    Ok(ScoreMatrix { games, players })
}

/// Read and decode one versioned file.
pub fn decode_file(path: impl AsRef<Path>, date: MonthDate, locked: bool) -> Result<Snapshot> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(decode(&text)?.into_snapshot(date, locked))
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}
