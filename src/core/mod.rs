pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{PhaseDurations, SimulationConfig};
pub use error::{GameError, RejectReason, Result};
pub use rng::{GameRng, ScriptedRng, SeededRng};
pub use types::{MatchId, PieceId, Position, Team, Turn};
