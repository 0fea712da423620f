// --------------------------------------------------
// Handles the scheduling endpoint.
//
// POST / takes the full scheduling request as JSON and
// responds with either the ordered task events or an
// {"err": "..."} envelope describing what went wrong.
// --------------------------------------------------

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::events::TaskEvent;
use crate::models::ScheduleRequest;
use crate::schedule;

#[derive(Debug, Serialize)]
pub struct TaskEventResponse {
    pub title: String,
    pub start: String,
    pub end: String,
    pub finish: bool,
}

impl From<&TaskEvent> for TaskEventResponse {
    fn from(event: &TaskEvent) -> Self {
        TaskEventResponse {
            title: event.title.clone(),
            // RFC3339 in the request's timezone, explicit offset.
            start: event.start.to_rfc3339(),
            end: event.end.to_rfc3339(),
            finish: event.finish,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrResponse {
    pub err: String,
}

fn err_response(message: String) -> Response {
    Json(ErrResponse { err: message }).into_response()
}

// The body is parsed by hand so malformed JSON also comes back through the
// error envelope instead of a bare transport rejection.
pub async fn handle_schedule(body: String) -> Response {
    let request: ScheduleRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => return err_response(e.to_string()),
    };

    match schedule::compute_schedule(request) {
        Ok(events) => {
            let response: Vec<TaskEventResponse> = events.iter().map(Into::into).collect();
            Json(response).into_response()
        }
        Err(e) => {
            tracing::warn!("schedule computation failed: {e}");
            err_response(e.to_string())
        }
    }
}
