//! REST API handlers
//!
//! Successful responses carry `{"status": "success", "data": ...}`. A dispatch
//! that skipped some of the selected records answers with `"status": "partial"`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::{
    process_debug, process_info, timestamp, DispatchRequest, GroupSelection, MaterialType, NewRecord, ProcessId,
    RecordId, RecordQuery, RecordState, SortKey, SortOrder,
};
use std::sync::Arc;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;

type ApiState = State<Arc<WebServerState>>;

/// Query string of `GET /api/records`; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct RecordsParams {
    #[serde(rename = "type")]
    pub material_type: Option<String>,
    pub state: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn parse_date(name: &str, value: &str) -> WebServerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| WebServerError::invalid_request(format!("{name}: expected YYYY-MM-DD, got '{value}'")))
}

impl RecordsParams {
    pub fn into_query(self) -> WebServerResult<RecordQuery> {
        let material_type = non_empty(self.material_type)
            .map(|text| text.parse::<MaterialType>())
            .transpose()
            .map_err(|e| WebServerError::invalid_request(format!("type: {e}")))?;
        let state = non_empty(self.state)
            .map(|text| text.parse::<RecordState>())
            .transpose()
            .map_err(|e| WebServerError::invalid_request(format!("state: {e}")))?;
        let from = non_empty(self.from).map(|text| parse_date("from", &text)).transpose()?;
        let to = non_empty(self.to).map(|text| parse_date("to", &text)).transpose()?;
        let sort = non_empty(self.sort)
            .map(|text| text.parse::<SortKey>())
            .transpose()
            .map_err(|e| WebServerError::invalid_request(format!("sort: {e}")))?;
        let order = non_empty(self.order)
            .map(|text| text.parse::<SortOrder>())
            .transpose()
            .map_err(|e| WebServerError::invalid_request(format!("order: {e}")))?
            .unwrap_or_default();

        Ok(RecordQuery {
            material_type,
            state,
            from,
            to,
            search: non_empty(self.search),
            sort,
            order,
        })
    }
}

/// Body of `POST /api/dispatches`; the dispatch time defaults to now
#[derive(Debug, Deserialize)]
pub struct DispatchBody {
    #[serde(default)]
    pub selection: Vec<GroupSelection>,
    #[serde(default)]
    pub authorized_by: String,
    #[serde(default, with = "timestamp::lenient_option")]
    pub dispatched_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DispatchBody {
    fn into_request(self, now: NaiveDateTime) -> DispatchRequest {
        DispatchRequest {
            selection: self.selection,
            authorized_by: self.authorized_by,
            dispatched_at: self.dispatched_at.unwrap_or(now),
            notes: self.notes,
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> WebServerResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| WebServerError::invalid_request(rejection.body_text()))
}

fn success(data: impl serde::Serialize) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": data,
    }))
}

/// Health check - /health
pub async fn health_check(State(state): ApiState) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "uptime": state.get_uptime_seconds(),
        "backend": state.backend,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List records - GET /api/records
pub async fn list_records(State(state): ApiState, Query(params): Query<RecordsParams>) -> WebServerResult<Json<Value>> {
    let query = params.into_query()?;
    let records = state.tracker.records(query).await?;
    Ok(Json(json!({
        "status": "success",
        "count": records.len(),
        "data": records,
    })))
}

/// Register a record - POST /api/records
pub async fn create_record(
    State(state): ApiState,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> WebServerResult<(StatusCode, Json<Value>)> {
    let input = json_body(payload)?;
    let record = state.tracker.register(input).await?;
    process_info!(ProcessId::current(), "📝 Record {} registered via API", record.id);
    Ok((StatusCode::CREATED, success(record)))
}

/// Get one record - GET /api/records/:id
pub async fn get_record(State(state): ApiState, Path(id): Path<String>) -> WebServerResult<Json<Value>> {
    let record_id = id
        .parse::<RecordId>()
        .map_err(|e| WebServerError::invalid_request(e.to_string()))?;
    let record = state.tracker.record(record_id).await?;
    Ok(success(record))
}

/// Active records grouped by type - GET /api/groups
pub async fn list_groups(State(state): ApiState) -> WebServerResult<Json<Value>> {
    Ok(success(state.tracker.groups().await?))
}

/// Dispatch history - GET /api/dispatches
pub async fn list_dispatches(State(state): ApiState) -> WebServerResult<Json<Value>> {
    Ok(success(state.tracker.history().await?))
}

/// Dispatch selected groups - POST /api/dispatches
pub async fn create_dispatch(
    State(state): ApiState,
    payload: Result<Json<DispatchBody>, JsonRejection>,
) -> WebServerResult<(StatusCode, Json<Value>)> {
    let request = json_body(payload)?.into_request(Local::now().naive_local());
    let outcome = state.tracker.dispatch(request).await?;

    process_info!(
        ProcessId::current(),
        "📦 Dispatch {} created via API ({} records)",
        outcome.batch.dispatch_id,
        outcome.batch.record_count
    );
    let status = if outcome.is_partial() { "partial" } else { "success" };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": status,
            "data": outcome,
        })),
    ))
}

/// Dashboard counters - GET /api/stats
pub async fn get_stats(State(state): ApiState) -> WebServerResult<Json<Value>> {
    Ok(success(state.tracker.stats().await?))
}

/// Per-type summary - GET /api/report
pub async fn get_report(State(state): ApiState) -> WebServerResult<Json<Value>> {
    Ok(success(state.tracker.type_summary().await?))
}

/// Reload from storage - POST /api/reload
pub async fn reload(State(state): ApiState) -> WebServerResult<Json<Value>> {
    process_debug!(ProcessId::current(), "🔄 Reload requested via API");
    Ok(success(state.tracker.reload().await?))
}
