use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Baseline security headers for server-rendered pages.
///
/// The CSP must admit the Google Identity Services script and its iframe,
/// which the sign-in pages embed; everything else is same-origin.
pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        header::HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        header::HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' https://accounts.google.com; \
             frame-src https://accounts.google.com; \
             connect-src 'self' https://accounts.google.com; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:",
        ),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        header::HeaderValue::from_static("DENY"),
    );

    response
}
