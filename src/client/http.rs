use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, error};

use super::{DeleteBody, RecordClient, UpdateBody, COLLECTION_PATH};
use crate::config::Config;
use crate::errors::{ClientError, ClientResult};
use crate::purchase::{NewPurchase, PurchaseRecord, RecordId};

/// Longest slice of an error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// reqwest-backed client for the `/racao` collection.
#[derive(Debug, Clone)]
pub struct HttpRecordClient {
    client: Client,
    collection_url: String,
}

impl HttpRecordClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        let collection_url = format!("{}{}", base_url.trim_end_matches('/'), COLLECTION_PATH);
        Ok(Self {
            client,
            collection_url,
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    async fn send(&self, method: &'static str, request: RequestBuilder) -> ClientResult<Response> {
        debug!(method, url = %self.collection_url, "sending request");
        let response = request.send().await.map_err(|err| {
            let failure = ClientError::Transport {
                url: self.collection_url.clone(),
                message: err.to_string(),
            };
            error!(method, error = %failure, "request failed");
            failure
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(method, status = status.as_u16(), "request succeeded");
            return Ok(response);
        }

        let mut body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!(method, error = %err, "could not read error response body");
                String::new()
            }
        };
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|index| body.is_char_boundary(*index))
                .unwrap_or(0);
            body.truncate(cut);
        }
        let failure = ClientError::Status {
            status: status.as_u16(),
            body,
        };
        error!(method, error = %failure, "server rejected request");
        Err(failure)
    }
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    async fn list_all(&self) -> ClientResult<Vec<PurchaseRecord>> {
        let response = self
            .send("GET", self.client.get(&self.collection_url))
            .await?;
        let records = response.json::<Vec<PurchaseRecord>>().await.map_err(|err| {
            let failure = ClientError::Decode(err.to_string());
            error!(error = %failure, "could not decode purchase list");
            failure
        })?;
        debug!(count = records.len(), "fetched purchases");
        Ok(records)
    }

    async fn create(&self, purchase: &NewPurchase) -> ClientResult<()> {
        self.send("POST", self.client.post(&self.collection_url).json(purchase))
            .await
            .map(|_| ())
    }

    async fn update(&self, id: &RecordId, purchase: &NewPurchase) -> ClientResult<()> {
        let body = UpdateBody {
            id,
            fields: purchase,
        };
        self.send("PATCH", self.client.patch(&self.collection_url).json(&body))
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: &RecordId) -> ClientResult<()> {
        let body = DeleteBody { id };
        self.send("DELETE", self.client.delete(&self.collection_url).json(&body))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_ignores_trailing_slash() {
        let client =
            HttpRecordClient::new("http://10.0.0.1:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.collection_url(), "http://10.0.0.1:3001/racao");
    }

    #[test]
    fn from_config_uses_configured_base_url() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let client = HttpRecordClient::from_config(&config).unwrap();
        assert_eq!(client.collection_url(), "http://127.0.0.1:9/racao");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base_url = format!("http://127.0.0.1:{port}");
        let client = HttpRecordClient::new(&base_url, Duration::from_secs(2)).unwrap();
        let err = client.list_all().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }), "{err:?}");
    }
}
