use async_trait::async_trait;

/// Keys shared with the upstream wizard steps. The names carry the browser
/// session-storage contract verbatim; the five documents are independent and
/// nothing synchronizes them across keys.
pub mod keys {
    /// Contract selections written by the contract-mapping step (consumed).
    pub const CONTRACT_CONFIGURATION: &str = "finalContractConfiguration";
    /// User-designated CSV columns (consumed).
    pub const BILLING_CONFIGURATION: &str = "billingConfiguration";
    /// PSA organization name to vendor CSV name mappings (consumed).
    pub const ORGANIZATION_MAPPINGS: &str = "organizationMappings";
    /// Raw vendor CSV text as uploaded (consumed).
    pub const VENDOR_CSV_DATA: &str = "vendorCsvData";
    /// The generated service configuration (produced).
    pub const SERVICES_CONFIGURATION: &str = "finalServicesConfiguration";

    pub const ALL: [&str; 5] = [
        CONTRACT_CONFIGURATION,
        BILLING_CONFIGURATION,
        ORGANIZATION_MAPPINGS,
        VENDOR_CSV_DATA,
        SERVICES_CONFIGURATION,
    ];
}

/// Injected replacement for browser session storage: flat string values under
/// well-known keys, no transaction across keys.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    async fn set(
        &self,
        key: &str,
        value: String,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn remove(&self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
