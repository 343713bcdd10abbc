use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::{RawResponse, SetRequest, Transport};
use crate::config::BsbLanConfig;
use crate::error::{BsbLanError, BsbLanResult};

/// HTTP transport speaking the BSB-LAN JSON API
pub struct HttpTransport {
    client: Client,
    config: BsbLanConfig,
}

impl HttpTransport {
    pub fn new(config: BsbLanConfig) -> BsbLanResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("bsblan-rs/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BsbLanError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Reuse an existing client, e.g. one shared across several devices.
    pub fn with_client(client: Client, config: BsbLanConfig) -> Self {
        Self { client, config }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.config.endpoint(path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.basic_auth() {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> BsbLanResult<Value> {
        let res = request.send().await?.error_for_status()?;
        let text = res.text().await?;
        serde_json::from_str(&text).map_err(|e| BsbLanError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn query(&self, ids: &[String]) -> BsbLanResult<RawResponse> {
        // The firmware expects literal commas, so the query is not form-encoded
        let path = format!("/JQ?Parameter={}", ids.join(","));
        debug!("POST {}", path);

        let body = self.send(self.post(&path)).await?;

        match body {
            Value::Object(map) => Ok(map),
            other => Err(BsbLanError::InvalidResponse(format!(
                "expected a JSON object from /JQ, got {}",
                other
            ))),
        }
    }

    async fn device_info(&self) -> BsbLanResult<Value> {
        debug!("POST /JI");
        self.send(self.post("/JI")).await
    }

    async fn set(&self, request: &SetRequest) -> BsbLanResult<Value> {
        debug!("POST /JS Parameter={}", request.parameter);
        self.send(self.post("/JS").json(request)).await
    }

    async fn inf_telegram(&self, parameter: &str, value: &str) -> BsbLanResult<()> {
        let path = format!("/I{}={}", parameter, value);
        debug!("GET {}", path);
        let request = self.authorize(self.client.get(self.config.endpoint(&path)));
        request.send().await?.error_for_status()?;
        Ok(())
    }
}
