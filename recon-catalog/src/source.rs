use crate::service::{ContractService, Service};
use async_trait::async_trait;

/// Fetch seam for the PSA webhook proxies. Implementations return canonical
/// records; all wire-shape normalization happens on their side of the seam.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// The global service list.
    async fn fetch_service_names(
        &self,
    ) -> Result<Vec<Service>, Box<dyn std::error::Error + Send + Sync>>;

    /// Priced instances for one contract, already filtered to that contract.
    async fn fetch_contract_services(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ContractService>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Canned source for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalogSource {
    pub services: Vec<Service>,
    pub contract_services: Vec<ContractService>,
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_service_names(
        &self,
    ) -> Result<Vec<Service>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.services.clone())
    }

    async fn fetch_contract_services(
        &self,
        contract_id: i64,
    ) -> Result<Vec<ContractService>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .contract_services
            .iter()
            .filter(|cs| cs.contract_id == contract_id)
            .cloned()
            .collect())
    }
}
