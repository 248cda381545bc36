use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::Response,
    Extension, Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::{
    middleware::RequestId,
    party::run_session,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct PartyMembers {
    pub party_id: String,
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub members: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestion: String,
}

/// Members currently connected to a party
pub async fn members(
    State(state): State<AppState>,
    Path(party_id): Path<String>,
) -> Json<PartyMembers> {
    let members = state.registry.members(&party_id).await;
    Json(PartyMembers { party_id, members })
}

/// Runs the group suggestion engine for an explicit member list
pub async fn suggest_for_members(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SuggestRequest>,
) -> Json<SuggestResponse> {
    // A blank id can never resolve to a user, so it is dropped like any other
    // unknown member.
    let members: Vec<String> = request
        .members
        .into_iter()
        .filter(|m| !m.trim().is_empty())
        .collect();

    tracing::info!(
        request_id = %request_id,
        members = members.len(),
        "Processing group suggestion request"
    );

    let suggestion = state.suggester.suggest(&members).await;

    Json(SuggestResponse {
        suggestion: suggestion.to_string(),
    })
}

/// GET /api/v1/ws/:party_id/:user_id
///
/// Upgrades to a WebSocket and runs the member's party session on it. The
/// user id is whatever the client calls itself, in practice an email.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((party_id, user_id)): Path<(String, String)>,
) -> Response {
    tracing::info!(party = %party_id, member = %user_id, "WebSocket upgrade requested");

    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        run_session(
            &state.registry,
            &state.suggester,
            &party_id,
            &user_id,
            sink,
            stream,
        )
        .await;
    })
}
