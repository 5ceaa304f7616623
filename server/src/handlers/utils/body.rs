use std::collections::HashMap;

use anyhow::{Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::Request;
use hyper::body::Body;

use super::headers::get_header_value;

/// Largest request body any endpoint accepts.  Every payload on this API
/// is a small JSON object; anything bigger never reaches a handler.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Collect the request body into one contiguous buffer.
///
/// Errors on transport failure and on bodies past [`MAX_BODY_BYTES`];
/// callers answer both with a 400, never a business status.
pub async fn collect_body<B>(req: Request<B>) -> Result<Bytes>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| anyhow!("Failed to read request body: {}", e))?;
    Ok(collected.to_bytes())
}

/// True when the request declares a JSON payload
pub fn is_json<T>(req: &Request<T>) -> bool {
    get_header_value(req.headers(), "content-type")
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false)
}

/// Parse a form-urlencoded body into a key → value map
pub fn parse_form(body: &Bytes) -> HashMap<String, String> {
    form_urlencoded::parse(body.as_ref()).into_owned().collect()
}

/// Extract a named query string parameter, percent-decoded
pub fn get_query_param<T>(req: &Request<T>, name: &str) -> Option<String> {
    req.uri().query().and_then(|query| {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[tokio::test]
    async fn bodies_past_the_cap_are_refused() {
        let big = vec![b'x'; MAX_BODY_BYTES + 1];
        let req = Request::builder()
            .body(Full::new(Bytes::from(big)))
            .unwrap();
        assert!(collect_body(req).await.is_err());

        let small = Request::builder()
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();
        assert_eq!(collect_body(small).await.unwrap().as_ref(), b"{}");
    }

    #[test]
    fn content_type_sniffing_matches_parameterized_json() {
        let json = Request::builder()
            .header("content-type", "application/json; charset=utf-8")
            .body(())
            .unwrap();
        assert!(is_json(&json));

        let form = Request::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap();
        assert!(!is_json(&form));

        let bare = Request::builder().body(()).unwrap();
        assert!(!is_json(&bare));
    }

    #[test]
    fn form_bodies_decode_percent_escapes() {
        let body = Bytes::from_static(b"email=a%40b.co&password=p%26q");
        let params = parse_form(&body);

        assert_eq!(params["email"], "a@b.co");
        assert_eq!(params["password"], "p&q");
    }

    #[test]
    fn query_params_resolve_by_name() {
        let req = Request::builder()
            .uri("/activate?key=abc-123&x=1")
            .body(())
            .unwrap();

        assert_eq!(get_query_param(&req, "key").as_deref(), Some("abc-123"));
        assert_eq!(get_query_param(&req, "x").as_deref(), Some("1"));
        assert!(get_query_param(&req, "missing").is_none());

        let bare = Request::builder().uri("/activate").body(()).unwrap();
        assert!(get_query_param(&bare, "key").is_none());
    }
}
