//! 远程记录存储
//!
//! 通过HTTP访问外部记录服务。所有请求都携带项目ID和公钥，网络错误和非2xx响应
//! 统一转换为传输错误。

use crate::store::{BatchResponse, FetchQuery, FetchResponse, RecordResponse, RecordStore};
use async_trait::async_trait;
use medihub_core::{MediHubError, RecordId, Result};
use medihub_records::ExternalRecord;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info};

/// 项目ID请求头
pub const PROJECT_HEADER: &str = "X-Project-Id";

/// 远程存储连接参数
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub endpoint: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout: Duration,
}

/// 远程记录存储
#[derive(Debug, Clone)]
pub struct RemoteStore {
    settings: RemoteSettings,
    client: reqwest::Client,
}

impl RemoteStore {
    pub fn new(settings: RemoteSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| MediHubError::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!("Remote record store configured for {}", settings.endpoint);
        Ok(Self { settings, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.settings.endpoint
    }

    fn records_url(&self, collection: &str) -> String {
        format!(
            "{}/tables/{}/records",
            self.settings.endpoint.trim_end_matches('/'),
            collection
        )
    }

    /// 添加认证头
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(PROJECT_HEADER, &self.settings.project_id)
            .bearer_auth(&self.settings.public_key)
    }

    /// 发送请求并解析响应信封
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> Result<T> {
        let response = self.authorize(request).send().await.map_err(|e| {
            error!("Remote store request failed ({}): {}", action, e);
            MediHubError::Transport(format!("Failed to {}: {}", action, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Remote store returned {} ({})", status, action);
            return Err(MediHubError::Transport(format!(
                "Failed to {}: server returned {}",
                action, status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Malformed remote store response ({}): {}", action, e);
            MediHubError::Transport(format!("Failed to {}: malformed response", action))
        })
    }
}

#[async_trait]
impl RecordStore for RemoteStore {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch(&self, collection: &str, query: &FetchQuery) -> Result<FetchResponse> {
        debug!("Fetching {} from remote store", collection);
        let url = format!("{}/query", self.records_url(collection));
        let request = self.client.post(&url).json(query);
        self.send(request, &format!("fetch {}", collection)).await
    }

    async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<RecordResponse> {
        debug!("Fetching {} record {} from remote store", collection, id);
        let url = format!("{}/{}", self.records_url(collection), id);
        let request = self.authorize(self.client.get(&url));

        let response = request.send().await.map_err(|e| {
            error!("Remote store request failed (get {} {}): {}", collection, id, e);
            MediHubError::Transport(format!("Failed to fetch {} {}: {}", collection, id, e))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(RecordResponse::missing());
        }
        if !response.status().is_success() {
            let status = response.status();
            error!("Remote store returned {} (get {} {})", status, collection, id);
            return Err(MediHubError::Transport(format!(
                "Failed to fetch {} {}: server returned {}",
                collection, id, status
            )));
        }

        response.json::<RecordResponse>().await.map_err(|e| {
            error!("Malformed remote store response (get {} {}): {}", collection, id, e);
            MediHubError::Transport(format!("Failed to fetch {} {}: malformed response", collection, id))
        })
    }

    async fn create(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
        info!("Creating {} {} record(s) in remote store", records.len(), collection);
        let request = self
            .client
            .post(self.records_url(collection))
            .json(&json!({ "records": records }));
        self.send(request, &format!("create {}", collection)).await
    }

    async fn update(&self, collection: &str, records: Vec<ExternalRecord>) -> Result<BatchResponse> {
        info!("Updating {} {} record(s) in remote store", records.len(), collection);
        let request = self
            .client
            .put(self.records_url(collection))
            .json(&json!({ "records": records }));
        self.send(request, &format!("update {}", collection)).await
    }

    async fn delete(&self, collection: &str, ids: Vec<RecordId>) -> Result<BatchResponse> {
        info!("Deleting {} record(s) {:?} from remote store", collection, ids);
        let request = self
            .client
            .delete(self.records_url(collection))
            .json(&json!({ "RecordIds": ids }));
        self.send(request, &format!("delete {}", collection)).await
    }
}
