use std::convert::Infallible;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::{Response, StatusCode, header};
use serde::Serialize;
use tracing::debug;

use shared::types::ErrorResponse;

/// Box a byte chunk into the body type every handler returns
pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    Full::new(chunk.into()).boxed()
}

/// Serialize any `Serialize` type and deliver it as a JSON response.
/// This is the primary helper all handlers should use instead of
/// writing their own one-off serialization + response-building blocks.
pub fn deliver_serialized_json<T: Serialize>(
    data: &T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let json = serde_json::to_string(data).context("Failed to serialize response")?;

    debug!("Delivering serialized JSON response, size: {} bytes", json.len());

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))?;

    Ok(response)
}

/// 400 for requests whose body could not be read at all — too large, or
/// the transport broke mid-stream.  Readable-but-malformed payloads answer
/// their endpoint's status enum instead.
pub fn deliver_bad_request(detail: &str) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    deliver_serialized_json(&ErrorResponse::bad_request(detail), StatusCode::BAD_REQUEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_request_is_a_400_envelope() {
        let response = deliver_bad_request("body too large").unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "BAD_REQUEST");
        assert_eq!(parsed["message"], "body too large");
    }

    #[tokio::test]
    async fn serialized_json_carries_content_type_and_body() {
        #[derive(Serialize)]
        struct Probe {
            status: &'static str,
        }

        let response = deliver_serialized_json(&Probe { status: "ok" }, StatusCode::OK).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn error_envelopes_serialize_through_the_same_path() {
        use shared::types::ErrorResponse;

        let response =
            deliver_serialized_json(&ErrorResponse::not_found("/nope"), StatusCode::NOT_FOUND)
                .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["code"], "NOT_FOUND");
        assert_eq!(parsed["message"], "No route for /nope");
    }
}
