use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const PREFLIGHT_MAX_AGE: &str = "86400";

/// Proxy event delivered by the HTTP gateway. Keys we don't read are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl Request {
    /// Upper-cased method; a missing method is treated as `GET`.
    pub fn method(&self) -> String {
        self.http_method
            .as_deref()
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    /// Header lookup ignoring the case of the header name. An exact-case
    /// key wins over other spellings of the same name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        headers
            .get(name)
            .or_else(|| {
                headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// Raw JSON body, with a missing or blank body read as an empty object.
    pub fn json_body(&self) -> &str {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => body,
            _ => "{}",
        }
    }
}

/// Proxy response handed back to the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl Response {
    /// JSON response with the standard content-type and CORS origin headers.
    pub fn json(status_code: u16, body: &serde_json::Value) -> Self {
        let headers = HashMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self { status_code, headers, body: body.to_string(), is_base64_encoded: false }
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &serde_json::json!({ "error": message }))
    }

    /// CORS preflight answer: empty body, allowed methods and headers, cache lifetime.
    pub fn preflight() -> Self {
        let headers = HashMap::from([
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ("Access-Control-Allow-Methods".to_string(), ALLOW_METHODS.to_string()),
            (
                "Access-Control-Allow-Headers".to_string(),
                format!("Content-Type, {}", ADMIN_PASSWORD_HEADER),
            ),
            ("Access-Control-Max-Age".to_string(), PREFLIGHT_MAX_AGE.to_string()),
        ]);
        Self { status_code: 200, headers, body: String::new(), is_base64_encoded: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_headers(pairs: &[(&str, &str)]) -> Request {
        Request {
            http_method: Some("POST".to_string()),
            headers: Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()),
            body: None,
        }
    }

    #[test]
    fn exact_header_name_wins_over_other_casings() {
        let req = with_headers(&[("x-admin-password", "lower"), ("X-Admin-Password", "exact")]);
        assert_eq!(req.header(ADMIN_PASSWORD_HEADER), Some("exact"));
        let req = with_headers(&[("X-ADMIN-PASSWORD", "upper"), ("X-Admin-Password", "exact")]);
        assert_eq!(req.header(ADMIN_PASSWORD_HEADER), Some("exact"));
    }

    #[test]
    fn other_casings_are_found_when_exact_name_is_absent() {
        let req = with_headers(&[("x-admin-password", "lower")]);
        assert_eq!(req.header(ADMIN_PASSWORD_HEADER), Some("lower"));
        assert_eq!(with_headers(&[]).header(ADMIN_PASSWORD_HEADER), None);
    }
}
