use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use hyper::Request;
use hyper::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

/// Peer address of the accepted connection, stashed in the request
/// extensions by the accept loop.  Proxy headers take precedence over it.
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub IpAddr);

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract cookie value by name
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                let name = parts.next()?.trim();
                let value = parts.next()?.trim();
                if name == cookie_name {
                    debug!("Cookie found: {}", cookie_name);
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}

/// Set a cookie with options
pub fn set_cookie(
    name: &str,
    value: &str,
    max_age: Option<Duration>,
    path: Option<&str>,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue> {
    let mut cookie = format!("{}={}", name, value);

    if let Some(age) = max_age {
        cookie.push_str(&format!("; Max-Age={}", age.as_secs()));
    }

    if let Some(p) = path {
        cookie.push_str(&format!("; Path={}", p));
    }

    if http_only {
        cookie.push_str("; HttpOnly");
    }

    if secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str("; SameSite=Strict");

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|e| {
        warn!("Failed to create cookie header for {}: {}", name, e);
        anyhow!("Invalid cookie value: {}", e)
    })
}

/// Create a session cookie (expires when browser closes)
pub fn create_session_cookie(name: &str, value: &str, secure: bool) -> Result<HeaderValue> {
    debug!("Creating session cookie: {}", name);
    set_cookie(name, value, None, Some("/"), true, secure)
}

/// Delete a cookie by setting it to expire
pub fn delete_cookie(name: &str) -> Result<HeaderValue> {
    debug!("Deleting cookie: {}", name);
    set_cookie(
        name,
        "",
        Some(Duration::from_secs(0)),
        Some("/"),
        true,
        false,
    )
}

/// Resolve the client IP address for a request.
///
/// Proxy headers win (X-Forwarded-For, then X-Real-IP); otherwise the
/// socket peer address recorded in [`ClientAddr`] is used.
pub fn get_client_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    if let Some(forwarded) = get_header_value(req.headers(), "x-forwarded-for") {
        if let Some(ip) = forwarded.split(',').next().and_then(|s| s.trim().parse().ok()) {
            return Some(ip);
        }
    }

    if let Some(real_ip) = get_header_value(req.headers(), "x-real-ip") {
        if let Ok(ip) = real_ip.trim().parse() {
            return Some(ip);
        }
    }

    req.extensions().get::<ClientAddr>().map(|addr| addr.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req_with_headers(pairs: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in pairs {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn cookie_lookup_handles_multiple_cookies() {
        let req = req_with_headers(&[("cookie", "a=1; session_id=abc-def; b=2")]);

        assert_eq!(
            get_cookie(req.headers(), "session_id").as_deref(),
            Some("abc-def")
        );
        assert_eq!(get_cookie(req.headers(), "a").as_deref(), Some("1"));
        assert!(get_cookie(req.headers(), "missing").is_none());
    }

    #[test]
    fn session_cookie_carries_the_expected_attributes() {
        let value = create_session_cookie("session_id", "tok", false).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "session_id=tok; Path=/; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn deleted_cookie_expires_immediately() {
        let value = delete_cookie("session_id").unwrap();
        let s = value.to_str().unwrap();
        assert!(s.starts_with("session_id=;"));
        assert!(s.contains("Max-Age=0"));
    }

    #[test]
    fn client_ip_prefers_forwarded_headers() {
        let mut req = req_with_headers(&[
            ("x-forwarded-for", "198.51.100.9, 10.0.0.1"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        req.extensions_mut()
            .insert(ClientAddr("127.0.0.1".parse().unwrap()));

        assert_eq!(get_client_ip(&req), Some("198.51.100.9".parse().unwrap()));
    }

    #[test]
    fn client_ip_falls_back_to_the_peer_address() {
        let mut req = req_with_headers(&[("x-forwarded-for", "not-an-ip")]);
        req.extensions_mut()
            .insert(ClientAddr("127.0.0.1".parse().unwrap()));

        assert_eq!(get_client_ip(&req), Some("127.0.0.1".parse().unwrap()));

        let bare = req_with_headers(&[]);
        assert_eq!(get_client_ip(&bare), None);
    }
}
