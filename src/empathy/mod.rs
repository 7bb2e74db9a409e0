//! Empathy resolution: command catalog, prediction, outcomes, combos, history

pub mod catalog;
pub mod combos;
pub mod history;
pub mod resolution;

pub use catalog::{CommandId, CommandTag, EmpathyCommand};
pub use combos::{ComboEffect, ComboId, ComboTracker};
pub use history::{EmpathyHistory, InteractionRecord};
pub use resolution::{CommandOption, EmpathySystem, Outcome, Resolution};
