use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use aare_core::AareError;

use crate::WebState;
use crate::dto::{RequestRejection, parse_verify_request};
use crate::error::{aare_error_response, method_not_allowed_response, rejection_response};

pub async fn verify(
    State(state): State<WebState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::NO_CONTENT, Body::empty()).into_response();
    }
    if method != Method::POST {
        return method_not_allowed_response();
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return rejection_response(RequestRejection::BodyTooLarge);
        }
        Err(_) => return rejection_response(RequestRejection::UnreadableBody),
    };

    let request = match parse_verify_request(&body) {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || service.verify(&request)).await;
    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(err)) => aare_error_response(err, "verify"),
        Err(join_err) => aare_error_response(
            AareError::Internal(format!("verification task failed: {join_err}")),
            "verify",
        ),
    }
}
