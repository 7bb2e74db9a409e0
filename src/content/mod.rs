//! Team and personality content
//!
//! Content is immutable once loaded. The core refers to teams by id and
//! never hardcodes a roster.

pub mod team;

pub use team::{PieceDefinition, TeamDefinition};

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::core::error::Result;

const BUILTIN_TEAMS: [&str; 2] = [
    include_str!("../../data/teams/hearthside.toml"),
    include_str!("../../data/teams/ironclad.toml"),
];

/// Loaded team definitions by id
#[derive(Debug, Default)]
pub struct TeamRegistry {
    teams: AHashMap<String, TeamDefinition>,
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the compiled-in teams
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for contents in BUILTIN_TEAMS {
            registry.register(TeamDefinition::from_toml_str(contents)?);
        }
        Ok(registry)
    }

    pub fn register(&mut self, team: TeamDefinition) {
        debug!(team = %team.id, pieces = team.pieces.len(), "Registered team");
        self.teams.insert(team.id.clone(), team);
    }

    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let contents = fs::read_to_string(path)?;
        let team = TeamDefinition::from_toml_str(&contents)?;
        let id = team.id.clone();
        self.register(team);
        Ok(id)
    }

    /// Load every `.toml` in `dir`; files that fail are logged and skipped
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|e| e == "toml").unwrap_or(false))
            .collect();
        paths.sort();
        for path in paths {
            match self.load_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping team file"),
            }
        }
        Ok(loaded)
    }

    pub fn get(&self, id: &str) -> Option<&TeamDefinition> {
        self.teams.get(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.teams.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
