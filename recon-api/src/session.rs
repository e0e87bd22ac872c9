use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use recon_core::session::{keys, SessionStore};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{store_error, AppError};
use crate::state::AppState;

/// PUT /v1/session/{key}
/// Seed one of the wizard's session documents. The body is stored verbatim:
/// four of the keys hold JSON, `vendorCsvData` holds raw CSV text.
pub async fn put_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: String,
) -> Result<StatusCode, AppError> {
    let key = known_key(&key)?;
    state.store.set(key, body).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/session/{key}
pub async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String, AppError> {
    let key = known_key(&key)?;
    state
        .store
        .get(key)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("No session data under {}", key)))
}

fn known_key(key: &str) -> Result<&'static str, AppError> {
    keys::ALL
        .iter()
        .copied()
        .find(|k| *k == key)
        .ok_or_else(|| AppError::NotFoundError(format!("Unknown session key: {}", key)))
}

/// Read and parse a required session document.
pub(crate) async fn read_json_document<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Result<T, AppError> {
    let text = store
        .get(key)
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            AppError::UnprocessableError(format!("Session document {} is missing", key))
        })?;

    serde_json::from_str(&text).map_err(|e| {
        AppError::UnprocessableError(format!("Session document {} is malformed: {}", key, e))
    })
}

/// Read an optional session document; malformed content is treated as
/// absent (with a warning) rather than failing the caller.
pub(crate) async fn read_optional_document<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Option<T> {
    match store.get(key).await {
        Ok(Some(text)) => match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed session document");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(key, error = %e, "session read failed");
            None
        }
    }
}
