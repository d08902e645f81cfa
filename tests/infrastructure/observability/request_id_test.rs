use axum::body::Body;
use axum::{Extension, Router};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use colloquy::infrastructure::observability::{
    REQUEST_ID_HEADER, RequestId, request_id_middleware,
};
use tower::ServiceExt;

fn app() -> Router {
    Router::new()
        .route(
            "/",
            get(|Extension(RequestId(id)): Extension<RequestId>| async move { id }),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

#[tokio::test]
async fn given_request_with_id_when_handled_then_echoes_same_id() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&body[..], b"req-42");
}

#[tokio::test]
async fn given_request_without_id_when_handled_then_generates_uuid() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let id = response.headers()[REQUEST_ID_HEADER]
        .to_str()
        .expect("ascii header");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[test]
fn given_header_with_whitespace_or_oversized_id_when_resolving_then_generates_fresh_id() {
    for supplied in ["has space".to_string(), "x".repeat(200)] {
        let mut headers = HeaderMap::new();
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&supplied).expect("header value"),
        );

        let RequestId(id) = RequestId::from_headers(&headers);

        assert_ne!(id, supplied);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }
}
