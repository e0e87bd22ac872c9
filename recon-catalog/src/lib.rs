pub mod billing;
pub mod contract;
pub mod service;
pub mod source;
pub mod vendor;

pub use billing::{csv_name_for, BillingConfiguration, OrganizationMapping};
pub use contract::{ContractIndex, ContractSelection};
pub use service::{
    normalize_contract_services, ContractService, RawContractService, Service, ServiceCatalog,
};
pub use source::{CatalogSource, StaticCatalogSource};
pub use vendor::CsvTable;
