//! REST client for the agent's process endpoints.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;
use crate::types::{ControlAck, ControlAction, ProcessList};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    pub async fn processes(&self) -> Result<ProcessList, ClientError> {
        let resp = self
            .http
            .get(self.endpoint("/api/processes")?)
            .send()
            .await?;
        parse(resp).await
    }

    pub async fn control(
        &self,
        pid: u32,
        action: ControlAction,
    ) -> Result<ControlAck, ClientError> {
        let path = format!("/api/processes/{pid}/{}", action.path());
        let resp = self.http.post(self.endpoint(&path)?).send().await?;
        parse(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status().as_u16();
    let body: Value = resp.json().await?;
    decode_body(status, body)
}

/// The agent reports some failures as 200 with an `error` field, so the
/// body is checked regardless of status.
pub fn decode_body<T: DeserializeOwned>(status: u16, body: Value) -> Result<T, ClientError> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(ClientError::Agent {
            status,
            message: message.to_string(),
        });
    }
    if !(200..300).contains(&status) {
        return Err(ClientError::Agent {
            status,
            message: format!("unexpected status {status}"),
        });
    }
    serde_json::from_value(body).map_err(|e| ClientError::Agent {
        status,
        message: format!("bad response: {e}"),
    })
}
