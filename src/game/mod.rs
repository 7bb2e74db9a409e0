//! Match layer: state, turn loop, events and snapshots

pub mod events;
pub mod orchestrator;
pub mod snapshot;
pub mod state;

pub use events::{CollectingSink, EventLog, EventSink, GameEvent, TracingSink};
pub use orchestrator::{ActionResult, Match};
pub use snapshot::{Recovery, Snapshot};
pub use state::{GameState, MatchOutcome, Morale, PendingChain, WinReason};
