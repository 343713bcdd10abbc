//! Device Transport
//!
//! The request/response boundary of the client. Discovery and the accessor
//! facade only ever talk to a `Transport`, so tests and alternative
//! back-ends can be injected in place of the HTTP implementation.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BsbLanResult;

/// Decoded `/JQ` body: parameter ID to raw entry
pub type RawResponse = serde_json::Map<String, Value>;

/// Body of a `/JS` write request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetRequest {
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "EnumValue", skip_serializing_if = "Option::is_none")]
    pub enum_value: Option<i64>,
    /// "1" performs the write; "0" only checks that it would be accepted
    #[serde(rename = "Type")]
    pub kind: String,
}

impl SetRequest {
    pub fn value(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            value: Some(value.into()),
            enum_value: None,
            kind: "1".to_string(),
        }
    }

    pub fn enum_value(parameter: impl Into<String>, value: i64) -> Self {
        Self {
            parameter: parameter.into(),
            value: None,
            enum_value: Some(value),
            kind: "1".to_string(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Batched parameter query (`/JQ`) for the given IDs
    async fn query(&self, ids: &[String]) -> BsbLanResult<RawResponse>;

    /// Controller identity and firmware (`/JI`)
    async fn device_info(&self) -> BsbLanResult<Value>;

    /// Parameter write (`/JS`)
    async fn set(&self, request: &SetRequest) -> BsbLanResult<Value>;

    /// INF telegram (`GET /I{parameter}={value}`): pushes a value the
    /// controller would otherwise receive from a room unit.
    async fn inf_telegram(&self, parameter: &str, value: &str) -> BsbLanResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_body_shape() {
        let body = serde_json::to_value(SetRequest::value("1610", "60.0")).unwrap();
        assert_eq!(body, json!({"Parameter": "1610", "Value": "60.0", "Type": "1"}));

        let body = serde_json::to_value(SetRequest::enum_value("700", 3)).unwrap();
        assert_eq!(body, json!({"Parameter": "700", "EnumValue": 3, "Type": "1"}));
    }
}
