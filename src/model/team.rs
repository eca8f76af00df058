use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One standings row of the `teams` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub position: i32,
    pub games_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub ot_losses: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    // Maintained by the caller, never derived from wins/losses here.
    pub points: i32,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request. Absent or null fields become empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logo_url: String,
}

/// Body of an update request: the target id plus whichever fields should change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPatch {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_played: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ot_losses: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_for: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals_against: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// Body of a delete request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: Option<i32>,
}

/// A value assigned to one column by a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i32),
}

impl TeamPatch {
    /// Column assignments carried by this patch, in a fixed column order.
    /// The `id` is a selector and never appears here.
    pub fn assignments(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        let text = [("name", &self.name), ("logo_url", &self.logo_url)];
        let ints = [
            ("games_played", self.games_played),
            ("wins", self.wins),
            ("losses", self.losses),
            ("ot_losses", self.ot_losses),
            ("goals_for", self.goals_for),
            ("goals_against", self.goals_against),
            ("points", self.points),
            ("position", self.position),
        ];

        let mut out: Vec<(&'static str, FieldValue<'_>)> = text
            .into_iter()
            .filter_map(|(column, value)| value.as_deref().map(|v| (column, FieldValue::Text(v))))
            .collect();
        out.extend(
            ints.into_iter()
                .filter_map(|(column, value)| value.map(|v| (column, FieldValue::Int(v)))),
        );
        out
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    /// Apply the present fields to an in-memory row. Does not touch `updated_at`.
    pub fn apply(&self, team: &mut Team) {
        if let Some(name) = &self.name {
            team.name = name.clone();
        }
        if let Some(logo_url) = &self.logo_url {
            team.logo_url = Some(logo_url.clone());
        }
        let ints = [
            (&mut team.games_played, self.games_played),
            (&mut team.wins, self.wins),
            (&mut team.losses, self.losses),
            (&mut team.ot_losses, self.ot_losses),
            (&mut team.goals_for, self.goals_for),
            (&mut team.goals_against, self.goals_against),
            (&mut team.points, self.points),
            (&mut team.position, self.position),
        ];
        for (slot, value) in ints {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
