use crate::error::ClientError;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use stacks_browser::HierarchyService;
use stacks_browser::NodeKey;
use stacks_protocol::AssetHit;
use stacks_protocol::AssetSummary;
use stacks_protocol::BulkUpdateRequest;
use stacks_protocol::BulkUpdateResponse;
use stacks_protocol::CellUpdateRequest;
use stacks_protocol::CellUpdateResponse;
use stacks_protocol::ColumnFilters;
use stacks_protocol::FolderHit;
use stacks_protocol::FolderSummary;
use stacks_protocol::VocabKind;
use stacks_protocol::VocabMap;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP implementation of [`HierarchyService`] against the remote hierarchy
/// service. Errors are typed here; the browser's fetch coordinator is the
/// layer that converts them into empty results.
#[derive(Clone)]
pub struct HttpHierarchyClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpHierarchyClient {
    pub fn new(opts: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(opts.timeout).build()?;
        Ok(Self {
            http,
            base_url: opts.base_url.trim_end_matches('/').to_string(),
            token: opts.token,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(resp.json().await?)
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.patch(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }
        Ok(resp.json().await?)
    }
}

fn search_params(query: &str, filters: &ColumnFilters) -> Vec<(String, String)> {
    let mut params = vec![("q".to_string(), query.to_string())];
    params.extend(
        filters
            .iter()
            .map(|(column, value)| (column.as_str().to_string(), value.clone())),
    );
    params
}

#[async_trait]
impl HierarchyService for HttpHierarchyClient {
    async fn child_folders(&self, parent: Option<&NodeKey>) -> Result<Vec<FolderSummary>> {
        let query: Vec<(String, String)> = parent
            .map(|key| vec![("parent".to_string(), key.as_str().to_string())])
            .unwrap_or_default();
        Ok(self.get_json("/v1/hierarchy/children", &query).await?)
    }

    async fn child_assets(&self, parent: &NodeKey) -> Result<Vec<AssetSummary>> {
        let query = vec![("parent".to_string(), parent.as_str().to_string())];
        Ok(self.get_json("/v1/hierarchy/assets", &query).await?)
    }

    async fn search_folders(
        &self,
        query: &str,
        filters: &ColumnFilters,
    ) -> Result<Vec<FolderHit>> {
        Ok(self
            .get_json("/v1/search/folders", &search_params(query, filters))
            .await?)
    }

    async fn search_assets(&self, query: &str, filters: &ColumnFilters) -> Result<Vec<AssetHit>> {
        Ok(self
            .get_json("/v1/search/assets", &search_params(query, filters))
            .await?)
    }

    async fn vocabulary(&self, kind: VocabKind) -> Result<VocabMap> {
        let path = format!("/v1/vocab/{kind}");
        Ok(self.get_json(&path, &[]).await?)
    }

    async fn update_cell(&self, request: CellUpdateRequest) -> Result<CellUpdateResponse> {
        Ok(self.patch_json("/v1/update/cell", &request).await?)
    }

    async fn bulk_update(&self, request: BulkUpdateRequest) -> Result<BulkUpdateResponse> {
        Ok(self.patch_json("/v1/update/bulk", &request).await?)
    }
}
