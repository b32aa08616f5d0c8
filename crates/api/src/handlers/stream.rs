//! Server-Sent Events relay of a web's workflow progress.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use webs_core::types::DbId;
use webs_mastra::RelayEvent;

use crate::engine::relay;
use crate::error::AppResult;
use crate::handlers::webs::load_owned_web;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Encode one relay event as an SSE frame: `event: <type>`, `data: <json>`.
pub fn to_sse_event(event: &RelayEvent) -> Event {
    let frame = Event::default().event(event.event_type());
    match serde_json::to_string(event) {
        Ok(json) => frame.data(json),
        Err(e) => {
            tracing::error!(error = %e, event_type = event.event_type(), "Failed to encode stream event");
            frame.data(r#"{"type":"error","message":"Failed to encode event","recoverable":false}"#)
        }
    }
}

/// GET /api/v1/webs/{id}/stream
///
/// Opens with `connected`, then relays `step-progress`, `quick-metadata`,
/// `workflow-status`, `workflow-waiting` and `error` events until exactly
/// one `workflow-complete` or `workflow-failed`, after which the stream
/// closes.
pub async fn stream(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let web = load_owned_web(&state, id, &user.user_id).await?;
    tracing::info!(web_id = %id, status = %web.status(), "Stream opened");

    let events = ReceiverStream::new(relay::spawn(state, web))
        .map(|event| Ok::<_, Infallible>(to_sse_event(&event)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
