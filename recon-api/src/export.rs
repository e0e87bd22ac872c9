use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use recon_catalog::{BillingConfiguration, ContractSelection, CsvTable, OrganizationMapping};
use recon_core::session::{keys, SessionStore};
use recon_mapping::{
    AggregationError, ConfigurationAggregator, CsvContext, ExportPhase, FinalConfiguration,
    SequentialSubmitter, SubmitError, SubmitOutcome,
};
use serde::Serialize;
use tracing::info;

use crate::error::{machine_error, store_error, AppError};
use crate::session::{read_json_document, read_optional_document};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub summary_count: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: ExportPhase,
    pub selection_count: usize,
    pub summary_count: Option<usize>,
}

/// POST /v1/export/generate
/// Run the aggregator over the current selections and catalog. Fails with
/// the missing combination names when any organization/plan has no
/// selection; a success overwrites any previously generated configuration.
pub async fn generate(State(state): State<AppState>) -> Result<Json<GenerateResponse>, AppError> {
    // 1. Claim the machine before doing any work.
    state.machine.write().await.begin_generate().map_err(machine_error)?;

    // 2. Aggregate; the machine settles back if anything fails.
    let result = run_generate(&state).await;

    let mut machine = state.machine.write().await;
    match result {
        Ok(config) => {
            let response = GenerateResponse {
                summary_count: config.summary.len(),
                generated_at: config.generated_at,
            };
            machine.finish_generate(config).map_err(machine_error)?;
            info!(summary_count = response.summary_count, "configuration generated");
            Ok(Json(response))
        }
        Err(e) => {
            machine.abort_generate();
            Err(e)
        }
    }
}

async fn run_generate(state: &AppState) -> Result<FinalConfiguration, AppError> {
    let selections: Vec<ContractSelection> =
        read_json_document(state.store.as_ref(), keys::CONTRACT_CONFIGURATION).await?;

    let chosen = state.selections.read().await;
    let catalog = state.catalog.read().await;

    ConfigurationAggregator::generate(&selections, &chosen, &catalog, state.store.as_ref())
        .await
        .map_err(|e| match e {
            AggregationError::MissingSelections(_) | AggregationError::EmptySummary => {
                AppError::UnprocessableError(e.to_string())
            }
            AggregationError::Persist(msg) => AppError::InternalServerError(msg),
        })
}

/// GET /v1/export/download
/// The persisted configuration as a file attachment; the filename carries
/// the selected-service count and today's date.
pub async fn download(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let text = state
        .store
        .get(keys::SERVICES_CONFIGURATION)
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            AppError::NotFoundError("No generated configuration to download".to_string())
        })?;

    let config: FinalConfiguration = serde_json::from_str(&text)
        .map_err(|e| AppError::InternalServerError(format!("stored configuration: {}", e)))?;
    let filename = config.export_filename(Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        text,
    ))
}

/// POST /v1/export/submit
/// Drain the generated summary through the mapping sink, one record at a
/// time. A webhook failure aborts the batch and leaves the machine in
/// Failed, from where a re-submit retries from the top.
pub async fn submit(State(state): State<AppState>) -> Result<Json<SubmitOutcome>, AppError> {
    // 1. Transition and take a copy of the generated configuration.
    let config = {
        let mut machine = state.machine.write().await;
        machine.begin_send().map_err(machine_error)?.clone()
    };

    // 2. Best-effort CSV cross-reference inputs.
    let context = load_csv_context(state.store.as_ref()).await;

    // 3. Ordered, throttled drain. The catalog is cloned so a long batch
    //    does not hold the lock against concurrent reads.
    let catalog = state.catalog.read().await.clone();
    let submitter = SequentialSubmitter::new(state.submit_delay);
    let result = submitter
        .submit_all(&config, &catalog, &context, state.sink.as_ref())
        .await;

    let mut machine = state.machine.write().await;
    match result {
        Ok(outcome) => {
            machine.finish_send().map_err(machine_error)?;
            info!(sent = outcome.sent, skipped = outcome.skipped, "mapping batch submitted");
            Ok(Json(outcome))
        }
        Err(e) => {
            machine.fail_send().map_err(machine_error)?;
            match e {
                SubmitError::EmptySummary => Err(AppError::UnprocessableError(e.to_string())),
                SubmitError::Sink { .. } => Err(AppError::UpstreamError(e.to_string())),
            }
        }
    }
}

/// GET /v1/export/status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let machine = state.machine.read().await;
    let selections = state.selections.read().await;

    Json(StatusResponse {
        phase: machine.phase(),
        selection_count: selections.count(),
        summary_count: machine.configuration().map(|c| c.summary.len()),
    })
}

async fn load_csv_context(store: &dyn SessionStore) -> CsvContext {
    let billing: Option<BillingConfiguration> =
        read_optional_document(store, keys::BILLING_CONFIGURATION).await;
    let mappings: Vec<OrganizationMapping> =
        read_optional_document(store, keys::ORGANIZATION_MAPPINGS)
            .await
            .unwrap_or_default();
    let table = match store.get(keys::VENDOR_CSV_DATA).await {
        Ok(Some(text)) => Some(CsvTable::parse(&text)),
        _ => None,
    };

    CsvContext { billing, mappings, table }
}
