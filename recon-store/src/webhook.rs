use crate::app_config::WebhookConfig;
use async_trait::async_trait;
use recon_catalog::{normalize_contract_services, CatalogSource, ContractService, RawContractService, Service};
use recon_core::sink::{MappingRecord, MappingSink};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {0}")]
    Status(StatusCode),

    #[error("Upstream returned an empty body")]
    EmptyBody,

    #[error("Could not decode upstream response: {0}")]
    Decode(String),
}

/// Client for the n8n proxy webhooks in front of the PSA and the data store.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    base_url: String,
    services_name_path: String,
    contract_services_path: String,
    mapping_path: String,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            services_name_path: config.services_name_path.clone(),
            contract_services_path: config.contract_services_path.clone(),
            mapping_path: config.mapping_path.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Global service list. The proxy answers POST normally but some
    /// deployments only route GET, so a rejected POST is retried once as GET.
    pub async fn fetch_service_names(&self) -> Result<Vec<Service>, WebhookError> {
        let url = self.url(&self.services_name_path);
        debug!(%url, "fetching service names");

        match self.client.post(&url).json(&json!({})).send().await {
            Ok(response) if response.status().is_success() => decode_list(response).await,
            Ok(response) => {
                warn!(status = %response.status(), "service name POST rejected, retrying as GET");
                self.fetch_service_names_get(&url).await
            }
            Err(e) => {
                warn!(error = %e, "service name POST failed, retrying as GET");
                self.fetch_service_names_get(&url).await
            }
        }
    }

    async fn fetch_service_names_get(&self, url: &str) -> Result<Vec<Service>, WebhookError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status()));
        }
        decode_list(response).await
    }

    /// Priced services for one contract. The endpoint takes
    /// `{"contractIds": [id]}` and its own filtering is unreliable, so the
    /// result is filtered by contract id again here.
    pub async fn fetch_contract_services(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ContractService>, WebhookError> {
        let url = self.url(&self.contract_services_path);
        debug!(%url, contract_id, "fetching contract services");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "contractIds": [contract_id] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status()));
        }

        let raw: Vec<RawContractService> = decode_list(response).await?;
        Ok(normalize_contract_services(raw, contract_id))
    }

    /// One mapping record to the data store. Any non-success status is an
    /// error so the submitter aborts the remaining batch.
    pub async fn submit_mapping(&self, record: &MappingRecord) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(self.url(&self.mapping_path))
            .json(record)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(WebhookError::Status(response.status()));
        }
        Ok(())
    }
}

async fn decode_list<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, WebhookError> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Err(WebhookError::EmptyBody);
    }
    serde_json::from_str(&text).map_err(|e| WebhookError::Decode(e.to_string()))
}

#[async_trait]
impl CatalogSource for WebhookClient {
    async fn fetch_service_names(
        &self,
    ) -> Result<Vec<Service>, Box<dyn std::error::Error + Send + Sync>> {
        WebhookClient::fetch_service_names(self).await.map_err(Into::into)
    }

    async fn fetch_contract_services(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ContractService>, Box<dyn std::error::Error + Send + Sync>> {
        WebhookClient::fetch_contract_services(self, contract_id)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl MappingSink for WebhookClient {
    async fn submit(
        &self,
        record: &MappingRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.submit_mapping(record).await.map_err(Into::into)
    }
}
