use axum::{Json, extract::State};
use tracing::{error, info, warn};

use super::AppState;
use super::error::ApiError;

/// `GET /cotacao`: fetch the current bid, append it to the store and
/// return it as a JSON string.
pub async fn get_cotacao(State(state): State<AppState>) -> Result<Json<String>, ApiError> {
    info!("Received request for /cotacao");

    let quote = state.provider.fetch_quote().await.map_err(|e| {
        warn!(error = %e, "Error fetching exchange rate");
        ApiError::from(e)
    })?;
    info!(bid = %quote.bid, "Received exchange rate");

    // Fresh budget, independent of the upstream call
    let record = tokio::time::timeout(state.store_timeout, state.store.insert_bid(&quote.bid))
        .await
        .map_err(|_| {
            error!(timeout = ?state.store_timeout, "Timed out saving exchange rate");
            ApiError::StoreTimeout
        })?
        .map_err(|e| {
            error!(error = %e, "Error saving exchange rate to database");
            ApiError::from(e)
        })?;
    info!(id = record.id, "Exchange rate saved to database");

    info!("Response sent to client");
    Ok(Json(record.bid))
}
