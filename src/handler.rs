use lambda_runtime::{Error, LambdaEvent};
use serde::de::{self, DeserializeOwned, Unexpected};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::TeamsError;
use crate::model::request::{Request, Response, ADMIN_PASSWORD_HEADER};
use crate::model::team::{NewTeam, TeamPatch, TeamRef};
use crate::store::TeamStore;

/// The teams endpoint: one entry point dispatched on the request method.
pub struct TeamsResource<S> {
    store: S,
    admin_password: String,
}

impl<S: TeamStore> TeamsResource<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self { store, admin_password: config.admin_password().to_string() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lambda entry point. Every outcome, including storage failures, is
    /// rendered as a response; the runtime only sees an error if it can't
    /// deliver the payload.
    #[instrument(skip(self, event), fields(request_id = %event.context.request_id))]
    pub async fn handle_event(&self, event: LambdaEvent<Request>) -> Result<Response, Error> {
        Ok(self.handle(event.payload).await)
    }

    #[instrument(skip(self, request), fields(method = %request.method()))]
    pub async fn handle(&self, request: Request) -> Response {
        match self.dispatch(&request).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    async fn dispatch(&self, request: &Request) -> Result<Response, TeamsError> {
        let method = request.method();
        match method.as_str() {
            "OPTIONS" => Ok(Response::preflight()),
            "GET" => self.list().await,
            "POST" | "PUT" | "DELETE" => {
                self.authorize(request)?;
                match method.as_str() {
                    "POST" => self.create(parse_body(request)?).await,
                    "PUT" => self.update(parse_body(request)?).await,
                    _ => self.delete(parse_body(request)?).await,
                }
            }
            other => Err(TeamsError::MethodNotAllowed(other.to_string())),
        }
    }

    fn authorize(&self, request: &Request) -> Result<(), TeamsError> {
        let supplied = request.header(ADMIN_PASSWORD_HEADER).unwrap_or_default();
        if !supplied.is_empty() && constant_time_eq(supplied, &self.admin_password) {
            Ok(())
        } else {
            Err(TeamsError::Unauthorized)
        }
    }

    async fn list(&self) -> Result<Response, TeamsError> {
        let teams = self.store.list().await?;
        info!(count = teams.len(), "Listed teams");
        let body = serde_json::to_value(&teams).map_err(TeamsError::Encode)?;
        Ok(Response::json(200, &body))
    }

    async fn create(&self, team: NewTeam) -> Result<Response, TeamsError> {
        let created = self.store.create(&team).await?;
        info!(id = created.id, position = created.position, "Created team");
        let body = serde_json::to_value(&created).map_err(TeamsError::Encode)?;
        Ok(Response::json(201, &body))
    }

    async fn update(&self, patch: TeamPatch) -> Result<Response, TeamsError> {
        if patch.is_empty() {
            return Err(TeamsError::NoFieldsToUpdate);
        }
        match self.store.update(&patch).await? {
            Some(team) => {
                info!(id = team.id, fields = patch.assignments().len(), "Updated team");
                let body = serde_json::to_value(&team).map_err(TeamsError::Encode)?;
                Ok(Response::json(200, &body))
            }
            None => {
                info!(id = ?patch.id, "Update matched no team");
                Ok(Response::json(200, &json!({})))
            }
        }
    }

    async fn delete(&self, target: TeamRef) -> Result<Response, TeamsError> {
        self.store.delete(target.id).await?;
        info!(id = ?target.id, "Deleted team");
        Ok(Response::json(200, &json!({ "success": true })))
    }
}

/// Decode a write body. Only a JSON object is accepted; serde would otherwise
/// map array elements onto struct fields by position.
fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T, TeamsError> {
    let value: Value = serde_json::from_str(request.json_body()).map_err(TeamsError::InvalidBody)?;
    if !value.is_object() {
        let unexpected = Unexpected::Other("non-object JSON");
        return Err(TeamsError::InvalidBody(<serde_json::Error as de::Error>::invalid_type(
            unexpected,
            &"a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(TeamsError::InvalidBody)
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
