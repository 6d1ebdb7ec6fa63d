//! Session cookie rendering and extraction.
//!
//! One cookie, fixed attributes: HttpOnly, SameSite=Lax, Path=/, 7-day
//! Max-Age, Secure outside development. Revocation clears it by setting an
//! empty value with Max-Age=0.

use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE_NAME: &str = "session";

/// Session lifetime: one week, in seconds.
pub const SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

/// A freshly issued session cookie, ready to be set on the response.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub value: String,
    pub secure: bool,
}

impl SessionCookie {
    /// Renders the Set-Cookie header value.
    pub fn header_value(&self) -> String {
        render_cookie(&self.value, SESSION_TTL_SECS, self.secure)
    }
}

/// Set-Cookie value that clears the session immediately.
pub fn clearing_header_value(secure: bool) -> String {
    render_cookie("", 0, secure)
}

fn render_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pulls the session cookie value out of the request's Cookie header, if any.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_value_development() {
        let cookie = SessionCookie {
            value: "abc123".to_string(),
            secure: false,
        };
        assert_eq!(
            cookie.header_value(),
            "session=abc123; Max-Age=604800; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_header_value_production_is_secure() {
        let cookie = SessionCookie {
            value: "abc123".to_string(),
            secure: true,
        };
        assert!(cookie.header_value().ends_with("; Secure"));
    }

    #[test]
    fn test_clearing_header_value_zeroes_max_age() {
        let cleared = clearing_header_value(false);
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn test_session_from_headers_picks_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok42; lang=en"),
        );
        assert_eq!(session_from_headers(&headers), Some("tok42".to_string()));
    }

    #[test]
    fn test_session_from_headers_missing_or_empty() {
        assert_eq!(session_from_headers(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(session_from_headers(&headers), None);
    }
}
