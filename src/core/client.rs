use crate::domain::model::{ConnectorStatus, PluginInfo};
use crate::utils::error::{OpsError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Kafka Connect REST API 的薄封裝
#[derive(Debug, Clone)]
pub struct ConnectClient {
    base_url: String,
    http: Client,
}

impl ConnectClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn ensure_success(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(OpsError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = self.endpoint(path);
        tracing::debug!("GET {}", endpoint);

        let response = self.http.get(&endpoint).send().await?;
        let response = Self::ensure_success(&endpoint, response).await?;
        Ok(response.json().await?)
    }

    /// 就緒探測：任何傳輸錯誤或非 2xx 都視為「還沒好」
    pub async fn is_ready(&self) -> bool {
        let endpoint = self.endpoint("/connectors");
        match self.http.get(&endpoint).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Connect REST API not reachable yet: {}", e);
                false
            }
        }
    }

    pub async fn list_connectors(&self) -> Result<Vec<String>> {
        self.get_json("/connectors").await
    }

    pub async fn list_plugins(&self) -> Result<Vec<PluginInfo>> {
        self.get_json("/connector-plugins").await
    }

    pub async fn connector_status(&self, name: &str) -> Result<ConnectorStatus> {
        self.get_json(&format!("/connectors/{}/status", name)).await
    }

    /// Connector 設定是不透明的 JSON，不做結構化解析
    pub async fn connector_config(&self, name: &str) -> Result<serde_json::Value> {
        self.get_json(&format!("/connectors/{}/config", name)).await
    }

    /// 以原樣的 JSON 內容提交 connector 設定
    pub async fn put_connector_config(&self, name: &str, body: &str) -> Result<serde_json::Value> {
        let endpoint = self.endpoint(&format!("/connectors/{}/config", name));
        tracing::debug!("PUT {}", endpoint);

        let response = self
            .http
            .put(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;

        let response = Self::ensure_success(&endpoint, response).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_connector(&self, name: &str) -> Result<()> {
        let endpoint = self.endpoint(&format!("/connectors/{}", name));
        tracing::debug!("DELETE {}", endpoint);

        let response = self.http.delete(&endpoint).send().await?;
        Self::ensure_success(&endpoint, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ConnectClient::new("http://localhost:8083/", Duration::from_secs(10));
        assert_eq!(client.base_url(), "http://localhost:8083");
        assert_eq!(
            client.endpoint("/connectors/x/status"),
            "http://localhost:8083/connectors/x/status"
        );
    }
}
