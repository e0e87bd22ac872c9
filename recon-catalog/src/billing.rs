use serde::{Deserialize, Serialize};

/// User-designated vendor CSV columns from the `billingConfiguration`
/// session document. Only the organization column is mandatory; plan
/// matching and plan-value extraction are optional extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingConfiguration {
    pub org_column: String,
    #[serde(default)]
    pub plan_column: Option<String>,
    #[serde(default)]
    pub plan_value_column: Option<String>,
}

/// Maps a PSA organization to the name it carries in the vendor CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMapping {
    pub organization_name: String,
    pub csv_name: String,
}

/// Exact lookup on the PSA organization name.
pub fn csv_name_for<'a>(
    mappings: &'a [OrganizationMapping],
    organization: &str,
) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| m.organization_name == organization)
        .map(|m| m.csv_name.as_str())
}
