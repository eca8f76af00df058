use thiserror::Error;
use tracing::{error, warn};

use crate::model::request::Response;
use crate::store::StoreError;

/// Everything that can end a request before the happy path does.
#[derive(Error, Debug)]
pub enum TeamsError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl TeamsError {
    pub fn status_code(&self) -> u16 {
        match self {
            TeamsError::Unauthorized => 401,
            TeamsError::MethodNotAllowed(_) => 405,
            TeamsError::InvalidBody(_) | TeamsError::NoFieldsToUpdate => 400,
            TeamsError::Encode(_) | TeamsError::Storage(_) => 500,
        }
    }

    /// Log the cause and render the caller-facing response. Server-side
    /// failures only ever expose a generic message.
    pub fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            TeamsError::Unauthorized => "Unauthorized",
            TeamsError::MethodNotAllowed(_) => "Method not allowed",
            TeamsError::InvalidBody(_) => "Invalid request body",
            TeamsError::NoFieldsToUpdate => "No fields to update",
            TeamsError::Encode(_) | TeamsError::Storage(_) => "Internal server error",
        };
        if status >= 500 {
            error!(error = %self, status, "Request failed");
        } else {
            warn!(error = %self, status, "Request rejected");
        }
        Response::error(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_do_not_leak_detail() {
        let err = TeamsError::from(StoreError::Unavailable("password authentication failed".into()));
        let resp = err.into_response();
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body, r#"{"error":"Internal server error"}"#);
    }

    #[test]
    fn client_errors_map_to_their_status() {
        assert_eq!(TeamsError::Unauthorized.status_code(), 401);
        assert_eq!(TeamsError::MethodNotAllowed("PATCH".into()).status_code(), 405);
        assert_eq!(TeamsError::NoFieldsToUpdate.status_code(), 400);
        let bad = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(TeamsError::InvalidBody(bad).status_code(), 400);
    }

    #[test]
    fn unauthorized_body_matches_contract() {
        let resp = TeamsError::Unauthorized.into_response();
        let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
        assert_eq!(resp.headers.get("Access-Control-Allow-Origin").map(String::as_str), Some("*"));
    }
}
