use axum::{
    extract::Request,
    http::{
        HeaderMap, HeaderValue,
        header::{self, ORIGIN},
    },
    middleware::Next,
    response::Response,
};

pub const ALLOWED_ORIGINS: [&str; 4] = [
    "https://aare.ai",
    "https://www.aare.ai",
    "http://localhost:8000",
    "http://localhost:3000",
];

/// Emitted for any origin outside the allow-list.
pub const PRIMARY_ORIGIN: &str = ALLOWED_ORIGINS[0];

const ALLOW_HEADERS: &str = "Content-Type,x-api-key,Authorization";
const ALLOW_METHODS: &str = "OPTIONS,POST";

/// Echo an allow-listed origin exactly; anything else gets the primary domain,
/// which browsers then refuse for the foreign page.
#[must_use]
pub fn allowed_origin(origin: Option<&str>) -> &'static str {
    origin
        .and_then(|origin| {
            ALLOWED_ORIGINS
                .iter()
                .copied()
                .find(|allowed| *allowed == origin)
        })
        .unwrap_or(PRIMARY_ORIGIN)
}

pub async fn cors_headers_middleware(request: Request, next: Next) -> Response {
    let origin = allowed_origin(
        request
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok()),
    );
    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut(), origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &'static str) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(origin),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
}
