use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{StoreError, TeamStore};
use crate::model::team::{NewTeam, Team, TeamPatch};

#[derive(Debug, Default)]
struct State {
    teams: Vec<Team>,
    last_id: i32,
}

/// In-process `TeamStore`. Mirrors the table defaults: statistics start at
/// zero and ids come from an increasing sequence that is never reused.
#[derive(Debug, Default)]
pub struct MemoryTeamStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryTeamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows as-is, e.g. to set up position collisions.
    pub fn with_teams(teams: Vec<Team>) -> Self {
        let last_id = teams.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(State { teams, last_id }),
            ..Self::default()
        }
    }

    /// Number of store operations attempted so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following operation fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of the stored rows in insertion order.
    pub fn snapshot(&self) -> Vec<Team> {
        self.state.lock().map(|s| s.teams.clone()).unwrap_or_default()
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("Failed to acquire lock".to_string()))
    }
}

#[async_trait]
impl TeamStore for MemoryTeamStore {
    async fn list(&self) -> Result<Vec<Team>, StoreError> {
        let state = self.begin()?;
        let mut teams = state.teams.clone();
        teams.sort_by_key(|t| (t.position, t.id));
        Ok(teams)
    }

    async fn create(&self, team: &NewTeam) -> Result<Team, StoreError> {
        let mut state = self.begin()?;
        let position = state
            .teams
            .iter()
            .map(|t| t.position)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StoreError::Unavailable("integer out of range".to_string()))?;
        state.last_id += 1;
        let created = Team {
            id: state.last_id,
            name: team.name.clone(),
            logo_url: Some(team.logo_url.clone()),
            position,
            games_played: 0,
            wins: 0,
            losses: 0,
            ot_losses: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            updated_at: Utc::now(),
        };
        state.teams.push(created.clone());
        Ok(created)
    }

    async fn update(&self, patch: &TeamPatch) -> Result<Option<Team>, StoreError> {
        let mut state = self.begin()?;
        let Some(id) = patch.id else {
            return Ok(None);
        };
        Ok(state.teams.iter_mut().find(|t| t.id == id).map(|team| {
            patch.apply(team);
            team.updated_at = Utc::now();
            team.clone()
        }))
    }

    async fn delete(&self, id: Option<i32>) -> Result<(), StoreError> {
        let mut state = self.begin()?;
        if let Some(id) = id {
            state.teams.retain(|t| t.id != id);
        }
        Ok(())
    }
}
