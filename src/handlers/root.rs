//! Root endpoint handler.
//!
//! `/` issues a permanent redirect to the configured metrics path so that
//! opening the exporter in a browser lands on the metrics page.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request, redirecting to {}", state.metrics_path);
    Redirect::permanent(&state.metrics_path)
}
