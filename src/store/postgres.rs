use async_trait::async_trait;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use tracing::{info_span, instrument, warn, Instrument};

use super::{StoreError, TeamStore};
use crate::config::Config;
use crate::model::team::{FieldValue, NewTeam, Team, TeamPatch};

/// Columns read into `Team`, in struct order. `updated_at` is cast so that
/// both `timestamp` and `timestamptz` columns decode as `DateTime<Utc>`.
macro_rules! team_columns {
    () => {
        "id, name, logo_url, position, games_played, wins, losses, ot_losses, \
         goals_for, goals_against, points, updated_at::timestamptz AS updated_at"
    };
}

const TEAM_COLUMNS: &str = team_columns!();
const LIST_TEAMS: &str = concat!("SELECT ", team_columns!(), " FROM teams ORDER BY position ASC, id ASC");
const NEXT_POSITION: &str = "SELECT COALESCE(MAX(position), 0) + 1 FROM teams";
const INSERT_TEAM: &str = concat!(
    "INSERT INTO teams (name, logo_url, position) VALUES ($1, $2, $3) RETURNING ",
    team_columns!()
);
const DELETE_TEAM: &str = "DELETE FROM teams WHERE id = $1";

/// PostgreSQL-backed store. Holds only the connection string; every operation
/// opens its own connection and closes it before returning.
#[derive(Clone)]
pub struct PgTeamStore {
    database_url: String,
}

impl PgTeamStore {
    pub fn new(config: &Config) -> Self {
        Self { database_url: config.database_url.clone() }
    }

    async fn connect(&self) -> Result<PgConnection, StoreError> {
        PgConnection::connect(&self.database_url)
            .instrument(info_span!("db_connect"))
            .await
            .map_err(Into::into)
    }
}

/// Close a connection after the work on it succeeded. A failed close is only
/// logged since the statements have already run; on error paths the
/// connection is dropped instead, which also releases it.
async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close database connection cleanly");
    }
}

/// `UPDATE teams SET <patched columns>, updated_at = CURRENT_TIMESTAMP WHERE id = $n RETURNING ...`
fn update_query(patch: &TeamPatch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE teams SET ");
    let mut set = builder.separated(", ");
    // Column names come from TeamPatch::assignments, never from the request.
    for (column, value) in patch.assignments() {
        set.push(format!("{} = ", column));
        match value {
            FieldValue::Text(text) => set.push_bind_unseparated(text.to_string()),
            FieldValue::Int(n) => set.push_bind_unseparated(n),
        };
    }
    set.push("updated_at = CURRENT_TIMESTAMP");
    builder.push(" WHERE id = ");
    builder.push_bind(patch.id);
    builder.push(" RETURNING ");
    builder.push(TEAM_COLUMNS);
    builder
}

#[async_trait]
impl TeamStore for PgTeamStore {
    #[instrument(level = "info", skip(self))]
    async fn list(&self) -> Result<Vec<Team>, StoreError> {
        let mut conn = self.connect().await?;
        let teams = sqlx::query_as::<_, Team>(LIST_TEAMS)
            .fetch_all(&mut conn)
            .await?;
        release(conn).await;
        Ok(teams)
    }

    #[instrument(level = "info", skip(self, team))]
    async fn create(&self, team: &NewTeam) -> Result<Team, StoreError> {
        let mut conn = self.connect().await?;
        let next_position: i32 = sqlx::query_scalar(NEXT_POSITION)
            .fetch_one(&mut conn)
            .await?;
        let created = sqlx::query_as::<_, Team>(INSERT_TEAM)
            .bind(&team.name)
            .bind(&team.logo_url)
            .bind(next_position)
            .fetch_one(&mut conn)
            .await?;
        release(conn).await;
        Ok(created)
    }

    #[instrument(level = "info", skip(self, patch), fields(id = ?patch.id))]
    async fn update(&self, patch: &TeamPatch) -> Result<Option<Team>, StoreError> {
        let mut builder = update_query(patch);
        let mut conn = self.connect().await?;
        let updated = builder
            .build_query_as::<Team>()
            .fetch_optional(&mut conn)
            .await?;
        release(conn).await;
        Ok(updated)
    }

    #[instrument(level = "info", skip(self))]
    async fn delete(&self, id: Option<i32>) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        sqlx::query(DELETE_TEAM).bind(id).execute(&mut conn).await?;
        release(conn).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Names `FromRow` will look up, i.e. the output name of each selected column.
    fn selected_names(columns: &str) -> Vec<&str> {
        columns
            .split(',')
            .map(|c| c.trim().rsplit(' ').next().unwrap_or_default())
            .collect()
    }

    #[test]
    fn selected_columns_cover_every_team_field() {
        let team = Team {
            id: 1,
            name: String::new(),
            logo_url: None,
            position: 1,
            games_played: 0,
            wins: 0,
            losses: 0,
            ot_losses: 0,
            goals_for: 0,
            goals_against: 0,
            points: 0,
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&team).unwrap();
        let mut fields: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let mut selected = selected_names(TEAM_COLUMNS);
        fields.sort_unstable();
        selected.sort_unstable();
        assert_eq!(selected, fields);
    }

    #[test]
    fn updated_at_is_read_as_timestamptz() {
        assert!(TEAM_COLUMNS.ends_with("updated_at::timestamptz AS updated_at"));
    }

    #[test]
    fn list_orders_by_position_then_id() {
        assert_eq!(
            LIST_TEAMS,
            format!("SELECT {} FROM teams ORDER BY position ASC, id ASC", TEAM_COLUMNS)
        );
    }

    #[test]
    fn create_takes_one_past_the_current_max_position() {
        assert_eq!(NEXT_POSITION, "SELECT COALESCE(MAX(position), 0) + 1 FROM teams");
        assert_eq!(
            INSERT_TEAM,
            format!(
                "INSERT INTO teams (name, logo_url, position) VALUES ($1, $2, $3) RETURNING {}",
                TEAM_COLUMNS
            )
        );
    }

    #[test]
    fn delete_has_no_condition_besides_id() {
        assert_eq!(DELETE_TEAM, "DELETE FROM teams WHERE id = $1");
    }

    #[test]
    fn update_statement_lists_only_patched_columns() {
        let patch = TeamPatch {
            id: Some(3),
            wins: Some(5),
            name: Some("Owls".into()),
            ..Default::default()
        };
        let builder = update_query(&patch);
        assert_eq!(
            builder.sql(),
            format!(
                "UPDATE teams SET name = $1, wins = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 RETURNING {}",
                TEAM_COLUMNS
            )
        );
    }
}
