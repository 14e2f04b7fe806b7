//! Regression coverage for the HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("nope"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_codes_match_error_codes(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

async fn response_json(error: Error) -> (StatusCode, Option<String>, Value) {
    let response = error.error_response();
    let status = response.status();
    let trace_header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("read response body");
    let value = serde_json::from_slice(&bytes).expect("error payload is JSON");
    (status, trace_header, value)
}

#[actix_web::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("connection string leaked")
        .with_trace_id("abc")
        .with_details(json!({ "secret": "x" }));

    let (status, trace_header, value) = response_json(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace_header.as_deref(), Some("abc"));
    assert_eq!(
        value.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
    assert!(value.get("details").is_none());
}

#[actix_web::test]
async fn validation_errors_expose_details() {
    let error = Error::invalid_request("bad").with_details(json!({ "field": "email" }));

    let (status, _, value) = response_json(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value.get("message").and_then(Value::as_str), Some("bad"));
    assert_eq!(
        value
            .get("details")
            .and_then(|details| details.get("field"))
            .and_then(Value::as_str),
        Some("email")
    );
}

#[actix_web::test]
async fn trace_header_is_absent_without_a_trace_id() {
    let (_, trace_header, _) = response_json(Error::not_found("missing")).await;
    assert!(trace_header.is_none());
}
