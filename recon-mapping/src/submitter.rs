use crate::aggregator::FinalConfiguration;
use crate::throttle::Throttle;
use recon_catalog::{
    csv_name_for, BillingConfiguration, ContractIndex, CsvTable, OrganizationMapping,
    ServiceCatalog,
};
use recon_core::selection::SelectionKey;
use recon_core::sink::{MappingRecord, MappingSink};
use serde::Serialize;
use tokio::time::Duration;
use tracing::warn;

/// Optional CSV cross-reference inputs pulled from the session. Any part may
/// be absent; the cross-reference then simply yields nothing.
#[derive(Debug, Default)]
pub struct CsvContext {
    pub billing: Option<BillingConfiguration>,
    pub mappings: Vec<OrganizationMapping>,
    pub table: Option<CsvTable>,
}

impl CsvContext {
    /// Best-effort plan value for one organization/plan pair. The CSV row is
    /// matched on the mapped organization name (falling back to the PSA name
    /// when no mapping entry exists) and, when a plan column is configured,
    /// on the plan.
    pub fn plan_value(&self, organization: &str, plan: &str) -> Option<String> {
        let billing = self.billing.as_ref()?;
        let table = self.table.as_ref()?;

        let csv_name = csv_name_for(&self.mappings, organization).unwrap_or(organization);
        let org_column = table.column(&billing.org_column)?;
        let plan_column = billing.plan_column.as_deref().and_then(|c| table.column(c));
        let value_column = billing
            .plan_value_column
            .as_deref()
            .and_then(|c| table.column(c))?;

        let row = table.find_row(org_column, csv_name, plan_column, Some(plan))?;
        table.value(row, value_column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    /// Records delivered to the sink.
    pub sent: usize,
    /// Records dropped because a contract or priced service no longer
    /// resolved.
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Generated configuration has no summary records")]
    EmptySummary,

    #[error("Submission failed at record {index}: {source}")]
    Sink {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Drains the generated summary in order, one POST per record, paced by the
/// throttle. Lookup misses skip the record; a sink failure aborts the whole
/// remaining batch.
pub struct SequentialSubmitter {
    delay: Duration,
}

impl SequentialSubmitter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn submit_all(
        &self,
        config: &FinalConfiguration,
        catalog: &ServiceCatalog,
        context: &CsvContext,
        sink: &dyn MappingSink,
    ) -> Result<SubmitOutcome, SubmitError> {
        if config.summary.is_empty() {
            return Err(SubmitError::EmptySummary);
        }

        let index = ContractIndex::build(&config.selections);
        let mut throttle = Throttle::new(self.delay);
        let mut sent = 0;
        let mut skipped = 0;

        for (position, record) in config.summary.iter().enumerate() {
            // 1. Re-resolve the contract and the priced service.
            let key = SelectionKey::new(&record.organization, Some(&record.plan));
            let Some(contract) = index.get(&key) else {
                warn!(key = %key, "no contract for summary record, skipping");
                skipped += 1;
                continue;
            };
            let Some(priced) = catalog.find_contract_service(contract.contract_id, record.service_id)
            else {
                warn!(
                    contract_id = contract.contract_id,
                    service_id = record.service_id,
                    "no priced service for summary record, skipping"
                );
                skipped += 1;
                continue;
            };

            // 2. Flat payload with the defaulting rules the webhook expects.
            let payload = MappingRecord {
                contract_id: contract.contract_id,
                contract_name: contract.contract_name.clone(),
                organization_name: contract.organization_name.clone(),
                autotask_company: contract.autotask_company.clone(),
                autotask_company_id: contract
                    .autotask_company_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "0".to_string()),
                service_id: record.service_id,
                service_name: record.service_name.clone(),
                invoice_description: priced.invoice_description.clone().unwrap_or_default(),
                internal_description: priced.internal_description.clone().unwrap_or_default(),
                unit_price: priced.unit_price,
                unit_cost: priced.unit_cost,
                adjusted_price: priced.adjusted_price,
                plan: record.plan.clone(),
                plan_value: context
                    .plan_value(&record.organization, &record.plan)
                    .unwrap_or_default(),
            };

            // 3. Paced, ordered delivery. A request failure aborts the batch;
            //    the caller drops the machine back to Generated for a retry
            //    from the top.
            throttle.pace().await;
            sink.submit(&payload)
                .await
                .map_err(|source| SubmitError::Sink { index: position, source })?;
            sent += 1;
        }

        Ok(SubmitOutcome { sent, skipped })
    }
}

/// Sink that records every payload, optionally failing at a fixed position.
/// Kept next to the submitter for tests, the way mock adapters sit next to
/// the orchestrators they fake.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub received: std::sync::Mutex<Vec<MappingRecord>>,
    pub fail_at: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(position: usize) -> Self {
        Self { received: std::sync::Mutex::new(Vec::new()), fail_at: Some(position) }
    }

    pub fn received(&self) -> Vec<MappingRecord> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MappingSink for RecordingSink {
    async fn submit(
        &self,
        record: &MappingRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut received = self.received.lock().unwrap();
        if self.fail_at == Some(received.len()) {
            return Err("simulated webhook failure".into());
        }
        received.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::SummaryRecord;
    use chrono::Utc;
    use recon_catalog::{ContractSelection, ContractService, Service};

    fn selection(org: &str, contract_id: i64, company_id: Option<i64>) -> ContractSelection {
        ContractSelection {
            contract_id,
            contract_name: format!("{} Agreement", org),
            autotask_company: format!("{} Inc", org),
            autotask_company_id: company_id,
            organization_name: org.to_string(),
            plan: None,
        }
    }

    fn summary(org: &str, contract_id: i64, service_id: i64) -> SummaryRecord {
        SummaryRecord {
            organization: org.to_string(),
            plan: "default".to_string(),
            contract_id,
            contract_name: format!("{} Agreement", org),
            service_id,
            service_name: "Managed Backup".to_string(),
            unit_price: 10.5,
            unit_cost: 4.0,
            adjusted_price: 10.5,
            invoice_description: Some("Backup".to_string()),
        }
    }

    fn priced(contract_id: i64, service_id: i64) -> ContractService {
        ContractService {
            service_id,
            contract_id,
            unit_price: 10.5,
            unit_cost: 4.0,
            adjusted_price: 10.5,
            invoice_description: Some("Backup".to_string()),
            internal_description: None,
        }
    }

    fn fixture(orgs: &[(&str, i64, i64)]) -> (FinalConfiguration, ServiceCatalog) {
        let mut catalog = ServiceCatalog::new();
        catalog.replace_services(vec![Service { id: 101, name: "Managed Backup".into() }]);
        catalog.replace_contract_services(
            orgs.iter().map(|&(_, c, s)| priced(c, s)).collect(),
        );

        let config = FinalConfiguration {
            generated_at: Utc::now(),
            selections: orgs.iter().map(|&(o, c, _)| selection(o, c, Some(900 + c))).collect(),
            summary: orgs.iter().map(|&(o, c, s)| summary(o, c, s)).collect(),
        };
        (config, catalog)
    }

    #[tokio::test]
    async fn test_submits_every_record_in_order() {
        let (config, catalog) = fixture(&[("Acme", 5, 101), ("Globex", 6, 101), ("Initech", 7, 101)]);
        let sink = RecordingSink::new();

        let outcome = SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &sink)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome { sent: 3, skipped: 0 });
        let orgs: Vec<String> = sink
            .received()
            .iter()
            .map(|r| r.organization_name.clone())
            .collect();
        assert_eq!(orgs, vec!["Acme", "Globex", "Initech"]);
    }

    #[tokio::test]
    async fn test_sink_failure_aborts_remaining_batch() {
        let (config, catalog) = fixture(&[("Acme", 5, 101), ("Globex", 6, 101), ("Initech", 7, 101)]);
        let sink = RecordingSink::failing_at(1);

        let err = SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &sink)
            .await
            .unwrap_err();

        match err {
            SubmitError::Sink { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
        // Record 0 went out, records 1 and 2 did not
        assert_eq!(sink.received().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_miss_skips_and_continues() {
        let (mut config, catalog) = fixture(&[("Acme", 5, 101), ("Globex", 6, 101)]);
        // Summary record whose contract no longer resolves
        config.summary.insert(0, summary("Vanished", 99, 101));
        let sink = RecordingSink::new();

        let outcome = SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &sink)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome { sent: 2, skipped: 1 });
    }

    #[tokio::test]
    async fn test_empty_summary_is_an_error() {
        let (mut config, catalog) = fixture(&[("Acme", 5, 101)]);
        config.summary.clear();

        let err = SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &RecordingSink::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::EmptySummary));
    }

    #[tokio::test]
    async fn test_missing_company_id_becomes_zero_string() {
        let (mut config, catalog) = fixture(&[("Acme", 5, 101)]);
        config.selections[0].autotask_company_id = None;
        let sink = RecordingSink::new();

        SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &sink)
            .await
            .unwrap();

        assert_eq!(sink.received()[0].autotask_company_id, "0");
    }

    #[tokio::test]
    async fn test_csv_plan_value_enriches_payload() {
        let (config, catalog) = fixture(&[("Acme", 5, 101)]);
        let context = CsvContext {
            billing: Some(BillingConfiguration {
                org_column: "Customer".into(),
                plan_column: None,
                plan_value_column: Some("Seats".into()),
            }),
            mappings: vec![OrganizationMapping {
                organization_name: "Acme".into(),
                csv_name: "ACME Industries".into(),
            }],
            table: Some(CsvTable::parse("Customer,Seats\nACME Industries,25\n")),
        };
        let sink = RecordingSink::new();

        SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &context, &sink)
            .await
            .unwrap();

        assert_eq!(sink.received()[0].plan_value, "25");
    }

    #[tokio::test]
    async fn test_absent_csv_leaves_plan_value_empty() {
        let (config, catalog) = fixture(&[("Acme", 5, 101)]);
        let sink = RecordingSink::new();

        SequentialSubmitter::new(Duration::ZERO)
            .submit_all(&config, &catalog, &CsvContext::default(), &sink)
            .await
            .unwrap();

        assert_eq!(sink.received()[0].plan_value, "");
    }
}
