use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The flat record the data-store webhook accepts, one per submitted
/// selection. Field names follow the webhook's wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub contract_id: i64,
    pub contract_name: String,
    pub organization_name: String,
    pub autotask_company: String,
    /// Stringly typed upstream; a missing company id is sent as "0".
    pub autotask_company_id: String,
    pub service_id: i64,
    pub service_name: String,
    pub invoice_description: String,
    pub internal_description: String,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub adjusted_price: f64,
    pub plan: String,
    pub plan_value: String,
}

/// Delivery seam for mapping records. Implementations must fail on any
/// non-success response so the submitter can abort the remaining batch.
#[async_trait]
pub trait MappingSink: Send + Sync {
    async fn submit(
        &self,
        record: &MappingRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
