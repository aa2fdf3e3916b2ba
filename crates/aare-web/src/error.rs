use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;
use uuid::Uuid;

use aare_core::AareError;

use crate::dto::{ErrorBody, InternalErrorBody, METHOD_NOT_ALLOWED_MESSAGE, RequestRejection};

pub fn rejection_response(rejection: RequestRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: rejection.message().to_string(),
        }),
    )
        .into_response()
}

pub fn method_not_allowed_response() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

/// The one translation from a pipeline failure to an HTTP response. The raw
/// error is logged with the trace id; the client sees only the sanitized form.
#[expect(
    clippy::needless_pass_by_value,
    reason = "handlers naturally own error values from `Result` and pass them through"
)]
pub fn aare_error_response(err: AareError, operation: &str) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    error!(
        operation,
        trace_id = %trace_id,
        code = err.code(),
        error = %err,
        "request failed"
    );
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(InternalErrorBody {
            error: err.client_message().to_string(),
            kind: err.code().to_string(),
            trace_id,
        }),
    )
        .into_response()
}
