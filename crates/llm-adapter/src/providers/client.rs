use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use super::factory::Vendor;
use crate::errors::{AdapterError, AdapterResult};

/// The vendor's chat endpoint: one json request in, one json response out
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn create(&self, payload: Value) -> AdapterResult<Value>;
}

pub fn http_client() -> AdapterResult<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(600)) // 10 minutes timeout
        .build()?;
    Ok(client)
}

/// Build request headers, rejecting values that cannot be sent (e.g. a key with newlines)
pub fn headers(vendor: Vendor, pairs: &[(&'static str, &str)]) -> AdapterResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            AdapterError::InvalidRequest(format!("{} header `{}` has an invalid value", vendor, name))
        })?;
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// Turn a non-2xx response into `AdapterError::Api`, keeping the body for diagnosis
pub async fn check_status(vendor: Vendor, response: Response) -> AdapterResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    Err(AdapterError::Api {
        vendor,
        status: status.as_u16(),
        body,
    })
}

pub struct HttpChatClient {
    client: Client,
    vendor: Vendor,
    url: String,
    headers: HeaderMap,
}

impl HttpChatClient {
    pub fn new(client: Client, vendor: Vendor, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            client,
            vendor,
            url: url.into(),
            headers,
        }
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn create(&self, payload: Value) -> AdapterResult<Value> {
        let response = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await?;

        let response = check_status(self.vendor, response).await?;
        let status = response.status();

        let body: Value = response.json().await?;
        // Some gateways report failures with a 200 and an error object
        if let Some(error) = body.get("error") {
            return Err(AdapterError::Api {
                vendor: self.vendor,
                status: status.as_u16(),
                body: error.to_string(),
            });
        }

        Ok(body)
    }
}
