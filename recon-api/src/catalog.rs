use axum::{
    extract::{Path, Query, State},
    Json,
};
use recon_catalog::{ContractSelection, ContractService, Service};
use recon_core::session::keys;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::session::read_json_document;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoadCatalogResponse {
    pub services: usize,
    pub contract_services: usize,
    pub contracts: usize,
}

#[derive(Debug, Deserialize)]
pub struct ServiceSearchParams {
    pub q: Option<String>,
}

/// POST /v1/catalog/load
/// Fetch the global service list plus the priced services of every stored
/// contract, then replace-assign both lists. Selections made against the
/// previous lists are dropped.
pub async fn load_catalog(
    State(state): State<AppState>,
) -> Result<Json<LoadCatalogResponse>, AppError> {
    // 1. The stored contract selections decide which contracts to fetch.
    let selections: Vec<ContractSelection> =
        read_json_document(state.store.as_ref(), keys::CONTRACT_CONFIGURATION).await?;

    // 2. Global service list.
    let services = state
        .source
        .fetch_service_names()
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;

    // 3. Priced instances per contract, awaited one at a time.
    let mut contract_ids: Vec<i64> = Vec::new();
    for selection in &selections {
        if !contract_ids.contains(&selection.contract_id) {
            contract_ids.push(selection.contract_id);
        }
    }

    let mut contract_services = Vec::new();
    for contract_id in &contract_ids {
        let batch = state
            .source
            .fetch_contract_services(*contract_id)
            .await
            .map_err(|e| AppError::UpstreamError(e.to_string()))?;
        contract_services.extend(batch);
    }

    // 4. Wholesale replacement; stale selections go with the old lists.
    let response = {
        let mut catalog = state.catalog.write().await;
        catalog.replace_services(services);
        catalog.replace_contract_services(contract_services);
        LoadCatalogResponse {
            services: catalog.services().len(),
            contract_services: catalog.contract_services().len(),
            contracts: contract_ids.len(),
        }
    };
    state.selections.write().await.clear_all();

    info!(
        services = response.services,
        contract_services = response.contract_services,
        contracts = response.contracts,
        "catalog loaded"
    );
    Ok(Json(response))
}

/// GET /v1/catalog/services?q=
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<ServiceSearchParams>,
) -> Json<Vec<Service>> {
    let catalog = state.catalog.read().await;
    let services = catalog
        .search_services(params.q.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(services)
}

/// GET /v1/catalog/contracts/{contract_id}/services
pub async fn contract_services(
    State(state): State<AppState>,
    Path(contract_id): Path<i64>,
) -> Json<Vec<ContractService>> {
    let catalog = state.catalog.read().await;
    let services = catalog
        .contract_services_for(contract_id)
        .into_iter()
        .cloned()
        .collect();
    Json(services)
}
