use chrono::{DateTime, NaiveDate, Utc};
use recon_catalog::{ContractIndex, ContractSelection, ServiceCatalog};
use recon_core::selection::SelectionState;
use recon_core::session::{keys, SessionStore};
use serde::{Deserialize, Serialize};

/// One resolved selection, enriched with contract and pricing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub organization: String,
    pub plan: String,
    pub contract_id: i64,
    pub contract_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub adjusted_price: f64,
    pub invoice_description: Option<String>,
}

/// The exportable document: everything the submission step needs, produced
/// once per Generate action and immutable until regenerated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalConfiguration {
    pub generated_at: DateTime<Utc>,
    pub selections: Vec<ContractSelection>,
    pub summary: Vec<SummaryRecord>,
}

impl FinalConfiguration {
    /// Download filename carrying the selected-service count and the date.
    pub fn export_filename(&self, today: NaiveDate) -> String {
        format!(
            "service-selections-{}services-{}.json",
            self.summary.len(),
            today.format("%Y-%m-%d")
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("No service selected for: {}", .0.join(", "))]
    MissingSelections(Vec<String>),

    #[error("No summary records could be resolved from the current selections")]
    EmptySummary,

    #[error("Could not persist the generated configuration: {0}")]
    Persist(String),
}

/// Folds the selection state and the fetched catalog into one
/// `FinalConfiguration`, persisted under `finalServicesConfiguration`.
pub struct ConfigurationAggregator;

impl ConfigurationAggregator {
    pub async fn generate(
        selections: &[ContractSelection],
        state: &SelectionState,
        catalog: &ServiceCatalog,
        store: &dyn SessionStore,
    ) -> Result<FinalConfiguration, AggregationError> {
        // 1. Every organization/plan combination must have a selection;
        //    otherwise fail with the missing display names, producing nothing.
        let missing: Vec<String> = selections
            .iter()
            .filter(|s| state.selected(&s.selection_key()).is_none())
            .map(|s| s.display_name())
            .collect();
        if !missing.is_empty() {
            return Err(AggregationError::MissingSelections(missing));
        }

        // 2. Resolve each selection into a summary record. Iteration follows
        //    the stored contract order so the output is deterministic.
        let index = ContractIndex::build(selections);
        let mut summary = Vec::new();
        for selection in selections {
            let key = selection.selection_key();
            let Some(service_id) = state.selected(&key) else {
                continue;
            };
            let Some(contract) = index.get(&key) else {
                continue;
            };
            let Some(priced) = catalog.find_contract_service(contract.contract_id, service_id)
            else {
                continue;
            };

            summary.push(SummaryRecord {
                organization: key.organization().to_string(),
                plan: key.plan().to_string(),
                contract_id: contract.contract_id,
                contract_name: contract.contract_name.clone(),
                service_id,
                service_name: catalog
                    .service_name(service_id)
                    .unwrap_or_default()
                    .to_string(),
                unit_price: priced.unit_price,
                unit_cost: priced.unit_cost,
                adjusted_price: priced.adjusted_price,
                invoice_description: priced.invoice_description.clone(),
            });
        }

        // 3. Selections that resolve to nothing signal a systemic mismatch;
        //    do not silently succeed with an empty document.
        if summary.is_empty() {
            return Err(AggregationError::EmptySummary);
        }

        // 4. Persist and return. Regenerating overwrites the stored document.
        let config = FinalConfiguration {
            generated_at: Utc::now(),
            selections: selections.to_vec(),
            summary,
        };
        let text = serde_json::to_string(&config)
            .map_err(|e| AggregationError::Persist(e.to_string()))?;
        store
            .set(keys::SERVICES_CONFIGURATION, text)
            .await
            .map_err(|e| AggregationError::Persist(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recon_catalog::{ContractService, Service};
    use recon_core::selection::SelectionKey;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapStore(Mutex<HashMap<String, String>>);

    impl MapStore {
        fn new() -> Self {
            Self(Mutex::new(HashMap::new()))
        }
    }

    #[async_trait]
    impl SessionStore for MapStore {
        async fn get(
            &self,
            key: &str,
        ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(
            &self,
            key: &str,
            value: String,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn acme_selection() -> ContractSelection {
        ContractSelection {
            contract_id: 5,
            contract_name: "Acme Agreement".into(),
            autotask_company: "Acme Inc".into(),
            autotask_company_id: Some(905),
            organization_name: "Acme".into(),
            plan: None,
        }
    }

    fn catalog_with_acme() -> ServiceCatalog {
        let mut catalog = ServiceCatalog::new();
        catalog.replace_services(vec![Service { id: 101, name: "Managed Backup".into() }]);
        catalog.replace_contract_services(vec![ContractService {
            service_id: 101,
            contract_id: 5,
            unit_price: 10.5,
            unit_cost: 4.0,
            adjusted_price: 10.5,
            invoice_description: Some("Backup".into()),
            internal_description: None,
        }]);
        catalog
    }

    #[tokio::test]
    async fn test_missing_selection_blocks_aggregation() {
        let selections = vec![acme_selection()];
        let state = SelectionState::new();
        let store = MapStore::new();

        let err = ConfigurationAggregator::generate(
            &selections,
            &state,
            &catalog_with_acme(),
            &store,
        )
        .await
        .unwrap_err();

        match err {
            AggregationError::MissingSelections(names) => assert_eq!(names, vec!["Acme"]),
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get(keys::SERVICES_CONFIGURATION).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolves_priced_record() {
        let selections = vec![acme_selection()];
        let mut state = SelectionState::new();
        state.select(SelectionKey::new("Acme", None), 101);
        let store = MapStore::new();

        let config = ConfigurationAggregator::generate(
            &selections,
            &state,
            &catalog_with_acme(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(config.summary.len(), 1);
        let record = &config.summary[0];
        assert_eq!(record.organization, "Acme");
        assert_eq!(record.plan, "default");
        assert_eq!(record.contract_id, 5);
        assert_eq!(record.service_name, "Managed Backup");
        assert_eq!(record.unit_price, 10.5);

        // Persisted under the produced session key
        let stored = store.get(keys::SERVICES_CONFIGURATION).await.unwrap().unwrap();
        let parsed: FinalConfiguration = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed.summary.len(), 1);
    }

    #[tokio::test]
    async fn test_unresolvable_selections_fail_as_empty_summary() {
        let selections = vec![acme_selection()];
        let mut state = SelectionState::new();
        // Chosen service has no priced instance under the contract
        state.select(SelectionKey::new("Acme", None), 999);
        let store = MapStore::new();

        let err = ConfigurationAggregator::generate(
            &selections,
            &state,
            &catalog_with_acme(),
            &store,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AggregationError::EmptySummary));
    }

    #[tokio::test]
    async fn test_summary_counts_resolvable_entries_only() {
        let mut selections = vec![acme_selection()];
        selections.push(ContractSelection {
            contract_id: 6,
            contract_name: "Globex Agreement".into(),
            autotask_company: "Globex".into(),
            autotask_company_id: None,
            organization_name: "Globex".into(),
            plan: Some("gold".into()),
        });

        let mut state = SelectionState::new();
        state.select(SelectionKey::new("Acme", None), 101);
        // Globex picked a service the catalog has no priced record for
        state.select(SelectionKey::new("Globex", Some("gold")), 555);
        let store = MapStore::new();

        let config = ConfigurationAggregator::generate(
            &selections,
            &state,
            &catalog_with_acme(),
            &store,
        )
        .await
        .unwrap();

        assert_eq!(config.summary.len(), 1);
        assert_eq!(config.summary[0].organization, "Acme");
    }

    #[test]
    fn test_export_filename() {
        let config = FinalConfiguration {
            generated_at: Utc::now(),
            selections: vec![],
            summary: vec![
                SummaryRecord {
                    organization: "Acme".into(),
                    plan: "default".into(),
                    contract_id: 5,
                    contract_name: "Acme Agreement".into(),
                    service_id: 101,
                    service_name: "Managed Backup".into(),
                    unit_price: 10.5,
                    unit_cost: 4.0,
                    adjusted_price: 10.5,
                    invoice_description: None,
                };
                3
            ],
        };

        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert_eq!(
            config.export_filename(today),
            "service-selections-3services-2026-08-04.json"
        );
    }
}
