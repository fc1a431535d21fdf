//! CSV codec for score matrices.
//!
//! The format is one header row followed by one row per player:
//!
//! ```text
//! Player,<Game1>,<Game2>,...
//! <player1>,<score>,<score>,...
//! ```
//!
//! Decoding is strict (every player row carries one score per game);
//! encoding fills a missing score with `0`.

mod decode;
mod encode;

pub use decode::{decode, decode_file, ScoreMatrix};
pub use encode::{encode, HEADER_LABEL};
