use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::*;

use crate::axumstate::AxumState;
use crate::dispatch::DispatchError;

/// POST request handler forwarding a plugin call to the dispatcher
///
/// The body carries the method's JSON parameters and may be empty for methods without any.
#[axum::debug_handler]
pub async fn post_invoke(
    state: axum::extract::State<AxumState>,
    Path(method): Path<String>,
    params: String,
) -> Response {
    let dispatcher = state.dispatcher.clone();

    // Driver calls block, keep them off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        let Ok(mut dispatcher) = dispatcher.lock() else {
            return Err(None);
        };
        dispatcher.invoke(&method, &params).map_err(Some)
    })
    .await;

    match outcome {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(Err(Some(err @ DispatchError::UnknownMethod(_)))) => {
            warn!("POST invoke rejected: {err}");
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Ok(Err(Some(err @ DispatchError::InvalidParams { .. }))) => {
            warn!("POST invoke rejected: {err}");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Ok(Err(Some(err))) => {
            error!("POST invoke failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
        Ok(Err(None)) => {
            // Unable to lock mutex, or mutex was poisoned
            error!(
                "unable to lock the dispatcher in post_invoke, mutex poisoned - Returning INTERNAL_SERVER_ERROR"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!("plugin call task did not complete: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
