//! Score matrix to CSV text.

use crate::error::{LedgerError, Result};
use crate::types::Snapshot;

/// First cell of every header row.
pub const HEADER_LABEL: &str = "Player";

/// Encode a snapshot as CSV.
///
/// Rows follow the snapshot's player order and columns its game order. A
/// player with no score for a game gets `0`. The month and lock flag are
/// not part of the text.
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header = Vec::with_capacity(snapshot.games.len() + 1);
    header.push(HEADER_LABEL);
    header.extend(snapshot.games.iter().map(|g| g.name.as_str()));
    writer.write_record(&header)?;

    for player in &snapshot.players {
        let mut row = Vec::with_capacity(snapshot.games.len() + 1);
        row.push(player.clone());
        for game in &snapshot.games {
            let score = game.scores.get(player).copied().unwrap_or(0);
            row.push(score.to_string());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LedgerError::Csv(e.to_string()))
}
