//! Storage seam for the `teams` table.
//!
//! `PgTeamStore` talks to PostgreSQL with one connection per operation;
//! `MemoryTeamStore` keeps rows in process for tests and local runs.

mod memory;
mod postgres;

pub use memory::MemoryTeamStore;
pub use postgres::PgTeamStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::team::{NewTeam, Team, TeamPatch};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    /// All teams, ascending by position (ties by id).
    async fn list(&self) -> Result<Vec<Team>, StoreError>;

    /// Insert a team at the next free position (max + 1, or 1 when empty).
    ///
    /// Reading the max and inserting are separate statements, so concurrent
    /// creates can end up sharing a position.
    async fn create(&self, team: &NewTeam) -> Result<Team, StoreError>;

    /// Set the patch's fields and refresh `updated_at`. `None` when no row has
    /// the patch's id. Callers must not pass an empty patch.
    async fn update(&self, patch: &TeamPatch) -> Result<Option<Team>, StoreError>;

    /// Hard delete; succeeds whether or not the row existed.
    async fn delete(&self, id: Option<i32>) -> Result<(), StoreError>;
}
