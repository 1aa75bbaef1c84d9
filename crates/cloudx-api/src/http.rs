//! HTTP implementation of the container backend

use crate::{
    ActionBody, ActionEnvelope, ApiError, ContainerBackend, ContainerRecord, InventoryEnvelope,
    LifecycleRequest, LogsEnvelope, Result,
};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// REST client for the `/api/containers` routes
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    /// Build `{base}/api/containers[/{id}/{leaf}]`, encoding the id as one path segment
    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty().extend(["api", "containers"]);
            segments.extend(tail);
        }
        Ok(url)
    }

    /// Decode the JSON envelope. A failed HTTP status still carries an envelope
    /// most of the time, so the body wins over the status code when it parses.
    async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<T>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::Transport(format!("HTTP {}", status))),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }
}

#[async_trait]
impl ContainerBackend for HttpBackend {
    async fn list(&self) -> Result<Vec<ContainerRecord>> {
        let url = self.url(&[])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let envelope: InventoryEnvelope = Self::read_envelope(response).await?;
        envelope.into_result()
    }

    async fn action(&self, request: &LifecycleRequest) -> Result<()> {
        let url = self.url(&[request.container_id.as_str(), "action"])?;
        tracing::debug!("POST {} action={}", url, request.action);

        let response = self
            .client
            .post(url)
            .json(&ActionBody {
                action: request.action,
            })
            .send()
            .await?;
        let envelope: ActionEnvelope = Self::read_envelope(response).await?;
        envelope.into_result()
    }

    async fn logs(&self, container_id: &str) -> Result<Option<String>> {
        let url = self.url(&[container_id, "logs"])?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let envelope: LogsEnvelope = Self::read_envelope(response).await?;
        envelope.into_result()
    }

    fn endpoint(&self) -> String {
        self.base.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBackend {
        HttpBackend::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_building() {
        let b = backend("http://localhost:5000");
        assert_eq!(
            b.url(&[]).unwrap().as_str(),
            "http://localhost:5000/api/containers"
        );
        assert_eq!(
            b.url(&["abc", "logs"]).unwrap().as_str(),
            "http://localhost:5000/api/containers/abc/logs"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let b = backend("http://host/dashboard/");
        assert_eq!(
            b.url(&["abc", "action"]).unwrap().as_str(),
            "http://host/dashboard/api/containers/abc/action"
        );
    }

    #[test]
    fn test_container_id_is_one_segment() {
        let b = backend("http://host");
        let url = b.url(&["../etc/passwd", "logs"]).unwrap();
        assert_eq!(url.path(), "/api/containers/..%2Fetc%2Fpasswd/logs");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpBackend::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
