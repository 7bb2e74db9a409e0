//! Empathy Checkers - checkers where every piece has a mind of its own
//!
//! The board engine handles checkers legality; the emotional layer decides
//! whether a piece is willing to move at all.

pub mod ai;
pub mod board;
pub mod content;
pub mod core;
pub mod emotion;
pub mod empathy;
pub mod game;
pub mod piece;
pub mod storm;
