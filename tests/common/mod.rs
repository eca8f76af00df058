#![allow(dead_code)]

use hockey_standings_lambda_rust::model::request::{Request, Response};
use serde_json::Value;

pub fn request(method: &str) -> Request {
    Request { http_method: Some(method.to_string()), ..Default::default() }
}

pub trait RequestExt {
    fn with_header(self, name: &str, value: &str) -> Self;
    fn with_body(self, body: impl Into<String>) -> Self;
}

impl RequestExt for Request {
    fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(Default::default)
            .insert(name.to_string(), value.to_string());
        self
    }

    fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

pub trait ResponseExt {
    fn header(&self, name: &str) -> Option<&str>;
    fn json_value(&self) -> Value;
}

impl ResponseExt for Response {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `Value::Null` for an empty or non-JSON body.
    fn json_value(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}
