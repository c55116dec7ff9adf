use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{HistoryApi, ProjectInfo, WorkspaceUsage, SERVER_PAGE_LIMIT};
use crate::config::ServerConfig;
use crate::history::Version;
use crate::{CartosyncError, Result};

/// Reqwest-backed implementation of [`HistoryApi`].
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionsPage {
    versions: Vec<Version>,
    count: usize,
}

impl HttpClient {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| CartosyncError::Config(format!("invalid server URL: {}", e)))?;
        let client = Client::builder()
            .user_agent(concat!("cartosync/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| CartosyncError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpClient {
            client,
            base_url,
            token: config.auth_token(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| CartosyncError::Config(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(url = %url, "GET");
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| CartosyncError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(api_error(status, message));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| CartosyncError::Parse(format!("invalid server response: {}", e)))
    }
}

fn api_error(status: StatusCode, message: String) -> CartosyncError {
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        message
    };
    CartosyncError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl HistoryApi for HttpClient {
    async fn project_info(&self, project: &str) -> Result<ProjectInfo> {
        let url = self.endpoint(&format!("v1/projects/{}", project))?;
        self.get_json(url).await
    }

    async fn list_versions(&self, project: &str, since: u64, to: u64) -> Result<Vec<Version>> {
        let mut collected = Vec::new();
        let mut page = 1usize;
        loop {
            let mut url = self.endpoint(&format!("v1/projects/{}/versions", project))?;
            url.query_pairs_mut()
                .append_pair("since", &since.to_string())
                .append_pair("to", &to.to_string())
                .append_pair("page", &page.to_string())
                .append_pair("per_page", &SERVER_PAGE_LIMIT.to_string());

            let batch: VersionsPage = self.get_json(url).await?;
            let received = batch.versions.len();
            collected.extend(batch.versions);

            if collected.len() >= batch.count || received == 0 {
                break;
            }
            page += 1;
        }
        Ok(collected)
    }

    async fn workspace_usage(&self, workspace_id: u64) -> Result<WorkspaceUsage> {
        let url = self.endpoint(&format!("v1/workspaces/{}/usage", workspace_id))?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = ServerConfig {
            url: "not a url".to_string(),
            auth_token_env: "CARTOSYNC_TEST_TOKEN_UNSET".to_string(),
            timeout_secs: 5,
            connect_timeout_secs: 5,
        };
        assert!(matches!(
            HttpClient::new(&config),
            Err(CartosyncError::Config(_))
        ));
    }

    #[test]
    fn test_api_error_uses_canonical_reason_when_body_empty() {
        let err = api_error(StatusCode::FORBIDDEN, String::new());
        match err {
            CartosyncError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
