use axum::http::HeaderMap;

const LOCAL_DEFAULT: &str = "http://localhost:3000";

/// Resolve the browser-facing base URL of this site.
///
/// Preference order: configured public URL, the request's own origin,
/// then a hardcoded localhost default. Trailing slashes are stripped so
/// joined paths never double up.
pub fn site_url(configured: Option<&str>, request_origin: Option<&str>) -> String {
    let url = configured
        .or(request_origin)
        .unwrap_or(LOCAL_DEFAULT);
    url.trim_end_matches('/').to_string()
}

pub fn absolute_url(configured: Option<&str>, request_origin: Option<&str>, path: &str) -> String {
    let base = site_url(configured, request_origin);
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Reconstruct the request origin from proxy-aware headers.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers.get("host").and_then(|v| v.to_str().ok())?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{}://{}", proto, host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_url_wins() {
        assert_eq!(
            site_url(Some("https://trade.example.com/"), Some("http://other")),
            "https://trade.example.com"
        );
    }

    #[test]
    fn falls_back_to_request_origin_then_default() {
        assert_eq!(
            site_url(None, Some("https://app.example.com")),
            "https://app.example.com"
        );
        assert_eq!(site_url(None, None), "http://localhost:3000");
    }

    #[test]
    fn absolute_url_joins_paths() {
        assert_eq!(
            absolute_url(Some("https://x.dev"), None, "/reset-password"),
            "https://x.dev/reset-password"
        );
        assert_eq!(
            absolute_url(None, None, "reset-password"),
            "http://localhost:3000/reset-password"
        );
    }

    #[test]
    fn origin_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("host", "trade.example.com".parse().unwrap());
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("http://trade.example.com")
        );
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("https://trade.example.com")
        );
    }
}
