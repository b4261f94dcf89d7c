//! HTTP scoring service: one event per request.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;

use crate::batch::EventOutput;
use crate::error::RegressionError;
use crate::event::EventRecord;
use crate::producer::ElectronRegressionProducer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceStats {
    pub events: u64,
    pub electrons: u64,
    pub failures: u64,
}

#[derive(Clone)]
pub struct AppState {
    producer: Arc<ElectronRegressionProducer>,
    stats: Arc<Mutex<ServiceStats>>,
}

impl AppState {
    pub fn new(producer: ElectronRegressionProducer) -> Self {
        Self {
            producer: Arc::new(producer),
            stats: Arc::new(Mutex::new(ServiceStats::default())),
        }
    }

    pub fn stats(&self) -> ServiceStats {
        *self.stats.lock()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/produce", post(produce))
        .route("/stats", get(stats))
        .with_state(state)
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn status_for(err: &RegressionError) -> StatusCode {
    match err {
        RegressionError::MissingProduct(_)
        | RegressionError::ProductType { .. }
        | RegressionError::DuplicateProduct(_)
        | RegressionError::SizeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn produce(
    State(state): State<AppState>,
    Json(mut record): Json<EventRecord>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state.producer.produce(&mut record);
    let mut stats = state.stats.lock();
    match result {
        Ok(maps) => {
            stats.events += 1;
            stats.electrons += maps.energy.len() as u64;
            let body = serde_json::to_value(EventOutput::new(&record, &maps)).map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
            })?;
            Ok(Json(body))
        }
        Err(e) => {
            stats.failures += 1;
            tracing::warn!(run = record.run, event = record.event, error = %e, "event rejected");
            Err((status_for(&e), Json(json!({ "error": e.to_string() }))))
        }
    }
}

async fn stats(State(state): State<AppState>) -> Json<ServiceStats> {
    Json(state.stats())
}
