use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Global catalog entry from the PSA service list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
}

/// Canonical per-contract priced instance of a service.
///
/// Upstream records arrive with varying field names and stringly typed
/// prices; everything is collapsed to this one shape at ingestion and no
/// later call site deals with the variants again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractService {
    pub service_id: i64,
    pub contract_id: i64,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub adjusted_price: f64,
    pub invoice_description: Option<String>,
    pub internal_description: Option<String>,
}

/// Wire shape of a contract-service record as the webhook proxy returns it.
/// The service id arrives as `serviceID` or `id`, the unit price as
/// `unitPrice` or `internalCurrencyUnitPrice`, and prices may be numbers or
/// numeric strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawContractService {
    #[serde(rename = "serviceID")]
    pub service_id: Option<i64>,
    pub id: Option<i64>,
    #[serde(rename = "contractID")]
    pub contract_id: Option<i64>,
    #[serde(rename = "unitPrice")]
    pub unit_price: Option<Value>,
    #[serde(rename = "internalCurrencyUnitPrice")]
    pub internal_currency_unit_price: Option<Value>,
    #[serde(rename = "unitCost")]
    pub unit_cost: Option<Value>,
    #[serde(rename = "internalCurrencyAdjustedPrice")]
    pub internal_currency_adjusted_price: Option<Value>,
    #[serde(rename = "invoiceDescription")]
    pub invoice_description: Option<String>,
    #[serde(rename = "internalDescription")]
    pub internal_description: Option<String>,
}

impl RawContractService {
    /// Collapse to the canonical shape. Records without a service id or
    /// contract id cannot be matched to anything and are dropped.
    pub fn into_canonical(self) -> Option<ContractService> {
        let service_id = self.service_id.or(self.id)?;
        let contract_id = self.contract_id?;

        Some(ContractService {
            service_id,
            contract_id,
            unit_price: price_of(self.unit_price.or(self.internal_currency_unit_price)),
            unit_cost: price_of(self.unit_cost),
            adjusted_price: price_of(self.internal_currency_adjusted_price),
            invoice_description: self.invoice_description,
            internal_description: self.internal_description,
        })
    }
}

/// Prices arrive as numbers or numeric strings; anything else is 0.
fn price_of(value: Option<Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Normalize a fetched batch, keeping only records for the requested
/// contract. The upstream endpoint's own filtering is unreliable, so the
/// caller-side filter stays.
pub fn normalize_contract_services(
    raw: Vec<RawContractService>,
    contract_id: i64,
) -> Vec<ContractService> {
    raw.into_iter()
        .filter_map(RawContractService::into_canonical)
        .filter(|cs| cs.contract_id == contract_id)
        .collect()
}

/// The two fetched lists, replace-assigned wholesale on every load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceCatalog {
    services: Vec<Service>,
    contract_services: Vec<ContractService>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_services(&mut self, services: Vec<Service>) {
        self.services = services;
    }

    pub fn replace_contract_services(&mut self, contract_services: Vec<ContractService>) {
        self.contract_services = contract_services;
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn contract_services(&self) -> &[ContractService] {
        &self.contract_services
    }

    pub fn is_loaded(&self) -> bool {
        !self.services.is_empty()
    }

    /// Case-insensitive substring filter over service names.
    pub fn search_services(&self, query: &str) -> Vec<&Service> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.services.iter().collect();
        }
        self.services
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn service_name(&self, service_id: i64) -> Option<&str> {
        self.services
            .iter()
            .find(|s| s.id == service_id)
            .map(|s| s.name.as_str())
    }

    pub fn contract_services_for(&self, contract_id: i64) -> Vec<&ContractService> {
        self.contract_services
            .iter()
            .filter(|cs| cs.contract_id == contract_id)
            .collect()
    }

    pub fn find_contract_service(
        &self,
        contract_id: i64,
        service_id: i64,
    ) -> Option<&ContractService> {
        self.contract_services
            .iter()
            .find(|cs| cs.contract_id == contract_id && cs.service_id == service_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawContractService {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_canonicalizes_field_variants() {
        // serviceID + unitPrice as a string
        let a = raw(r#"{"serviceID": 101, "contractID": 5, "unitPrice": "10.50"}"#)
            .into_canonical()
            .unwrap();
        assert_eq!(a.service_id, 101);
        assert_eq!(a.contract_id, 5);
        assert_eq!(a.unit_price, 10.5);

        // id + internalCurrencyUnitPrice as a number
        let b = raw(r#"{"id": 102, "contractID": 5, "internalCurrencyUnitPrice": 7.25}"#)
            .into_canonical()
            .unwrap();
        assert_eq!(b.service_id, 102);
        assert_eq!(b.unit_price, 7.25);
    }

    #[test]
    fn test_absent_prices_default_to_zero() {
        let cs = raw(r#"{"id": 101, "contractID": 5}"#).into_canonical().unwrap();
        assert_eq!(cs.unit_price, 0.0);
        assert_eq!(cs.unit_cost, 0.0);
        assert_eq!(cs.adjusted_price, 0.0);
        assert!(cs.invoice_description.is_none());
    }

    #[test]
    fn test_unidentifiable_records_are_dropped() {
        assert!(raw(r#"{"contractID": 5, "unitPrice": 1}"#).into_canonical().is_none());
        assert!(raw(r#"{"id": 101, "unitPrice": 1}"#).into_canonical().is_none());
    }

    #[test]
    fn test_normalize_filters_by_contract() {
        let batch = vec![
            raw(r#"{"serviceID": 101, "contractID": 5, "unitPrice": "10.50"}"#),
            raw(r#"{"serviceID": 102, "contractID": 6, "unitPrice": 3}"#),
            raw(r#"{"unitPrice": 9}"#),
        ];

        let kept = normalize_contract_services(batch, 5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].service_id, 101);
    }

    #[test]
    fn test_catalog_lookups() {
        let mut catalog = ServiceCatalog::new();
        catalog.replace_services(vec![
            Service { id: 101, name: "Managed Backup".into() },
            Service { id: 102, name: "Endpoint Security".into() },
        ]);
        catalog.replace_contract_services(vec![ContractService {
            service_id: 101,
            contract_id: 5,
            unit_price: 10.5,
            unit_cost: 4.0,
            adjusted_price: 10.5,
            invoice_description: None,
            internal_description: None,
        }]);

        assert_eq!(catalog.service_name(101), Some("Managed Backup"));
        assert_eq!(catalog.search_services("backup").len(), 1);
        assert_eq!(catalog.search_services("").len(), 2);
        assert_eq!(catalog.contract_services_for(5).len(), 1);
        assert!(catalog.find_contract_service(5, 101).is_some());
        assert!(catalog.find_contract_service(5, 999).is_none());
    }
}
