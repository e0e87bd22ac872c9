use recon_core::selection::SelectionKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One organization (or organization+plan) picked in the contract-mapping
/// step, read back from the `finalContractConfiguration` session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSelection {
    pub contract_id: i64,
    pub contract_name: String,
    pub autotask_company: String,
    #[serde(default)]
    pub autotask_company_id: Option<i64>,
    pub organization_name: String,
    #[serde(default)]
    pub plan: Option<String>,
}

impl ContractSelection {
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey::new(&self.organization_name, self.plan.as_deref())
    }

    /// Human-readable combination name for error messages.
    pub fn display_name(&self) -> String {
        match self.plan.as_deref() {
            Some(plan) if !plan.trim().is_empty() => {
                format!("{} ({})", self.organization_name, plan.trim())
            }
            _ => self.organization_name.clone(),
        }
    }
}

/// Stored selections indexed by canonical key, built once per pass. Replaces
/// the repeated multi-shape key probing the wizard did at every use site.
pub struct ContractIndex<'a> {
    by_key: HashMap<SelectionKey, &'a ContractSelection>,
}

impl<'a> ContractIndex<'a> {
    pub fn build(selections: &'a [ContractSelection]) -> Self {
        let by_key = selections
            .iter()
            .map(|s| (s.selection_key(), s))
            .collect();
        Self { by_key }
    }

    pub fn get(&self, key: &SelectionKey) -> Option<&'a ContractSelection> {
        self.by_key.get(key).copied()
    }
}
