//! Boundary validation for incoming snapshots.
//!
//! A request layer deserializes a [`SnapshotDraft`] from the wire and calls
//! [`SnapshotDraft::validate`]. Only the resulting [`Snapshot`] reaches the
//! ledger, which trusts it as input.

use crate::error::{Result, ValidationError};
use crate::types::{Game, MonthDate, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

const GAME_NAME_CHARS: RangeInclusive<usize> = 2..=50;
const PLAYER_NAME_CHARS: RangeInclusive<usize> = 1..=50;

/// Unvalidated game as received from a caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameDraft {
    pub name: String,
    pub scores: BTreeMap<String, i64>,
}

/// Unvalidated snapshot as received from a caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SnapshotDraft {
    pub date: String,
    pub locked: bool,
    pub games: Vec<GameDraft>,
    pub players: Vec<String>,
}

impl SnapshotDraft {
    /// Deserialize a draft from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Snapshot> {
        let draft: SnapshotDraft = serde_json::from_str(json)?;
        Ok(draft.validate()?)
    }

    /// Check every boundary rule and build the snapshot.
    pub fn validate(self) -> std::result::Result<Snapshot, ValidationError> {
        let date = MonthDate::parse(&self.date)
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        let mut seen_players = HashSet::new();
        for player in &self.players {
            if !PLAYER_NAME_CHARS.contains(&player.chars().count()) {
                return Err(ValidationError::PlayerNameLength(player.clone()));
            }
            if !seen_players.insert(player.as_str()) {
                return Err(ValidationError::DuplicatePlayer(player.clone()));
            }
        }

        let mut seen_games = HashSet::new();
        let mut games = Vec::with_capacity(self.games.len());
        for draft in self.games {
            if !GAME_NAME_CHARS.contains(&draft.name.chars().count()) {
                return Err(ValidationError::GameNameLength(draft.name));
            }
            if !seen_games.insert(draft.name.clone()) {
                return Err(ValidationError::DuplicateGame(draft.name));
            }
            for (player, &score) in &draft.scores {
                if !seen_players.contains(player.as_str()) {
                    return Err(ValidationError::UnknownPlayer {
                        game: draft.name.clone(),
                        player: player.clone(),
                    });
                }
                if score <= 0 {
                    return Err(ValidationError::NonPositiveScore {
                        game: draft.name.clone(),
                        player: player.clone(),
                        score,
                    });
                }
            }
            games.push(Game {
                name: draft.name,
                scores: draft.scores,
            });
        }

        Ok(Snapshot {
            date,
            locked: self.locked,
            games,
            players: self.players,
        })
    }
}

impl From<&Snapshot> for SnapshotDraft {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            date: snapshot.date.to_string(),
            locked: snapshot.locked,
            games: snapshot
                .games
                .iter()
                .map(|g| GameDraft {
                    name: g.name.clone(),
                    scores: g.scores.clone(),
                })
                .collect(),
            players: snapshot.players.clone(),
        }
    }
}
