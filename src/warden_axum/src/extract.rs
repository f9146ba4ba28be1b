use axum::http::{HeaderMap, header};

use warden_core::RequestOrigin;

/// Pulls the request origin out of the transport headers. Both values are
/// advisory; they only ever reach the audit trail.
pub fn origin_from_headers(headers: &HeaderMap) -> RequestOrigin {
    RequestOrigin {
        ip: header_string(headers, "x-forwarded-for"),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn picks_up_forwarded_ip_and_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.5"));

        let origin = origin_from_headers(&headers);
        assert_eq!(origin.ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(origin.user_agent.as_deref(), Some("curl/8.5"));
    }

    #[test]
    fn missing_headers_leave_origin_empty() {
        let origin = origin_from_headers(&HeaderMap::new());
        assert_eq!(origin, RequestOrigin::default());
    }
}
