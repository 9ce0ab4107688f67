use axum::{
    extract::State,
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::command::{self, Command};
use crate::reply::ReplyEnvelope;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Route one command. Handler failures come back as `200` with a `fail` envelope;
/// only an unknown command name is rejected at the HTTP level.
pub async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<ReplyEnvelope>, (StatusCode, Json<ErrorResponse>)> {
    let command: Command = request
        .command
        .parse()
        .map_err(|e: command::UnknownCommand| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() })))?;

    let parameters = match request.parameters {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };

    let envelope = command::dispatch(&state.service, command, parameters).await;
    if command.is_write() && envelope.is_ok() {
        tracing::info!(command = %command, id = ?envelope.parameters.get("id"), "stored new object");
    }

    Ok(Json(envelope))
}
