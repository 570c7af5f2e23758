//! End-to-end dispatch through a running gateway.

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn get_with_sub_path_reaches_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = common::start_gateway(common::config_with(&[("auth", &backend.uri())])).await;

    let res = common::client()
        .get(gateway.url("/api/auth/users"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "[]");

    let received = backend.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.is_empty());
}

#[tokio::test]
async fn post_to_service_root_with_trailing_slash_base() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_bytes(br#"{"x":1}"#.to_vec()))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&backend)
        .await;

    let base = format!("{}/", backend.uri());
    let gateway = common::start_gateway(common::config_with(&[("user", &base)])).await;

    let res = common::client()
        .post(gateway.url("/api/user"))
        .header("content-type", "application/json")
        .body(r#"{"x":1}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let received = backend.received_requests().await.unwrap();
    assert_eq!(received[0].url.path(), "/");
    assert_eq!(received[0].body, br#"{"x":1}"#);
}

#[tokio::test]
async fn unknown_service_never_contacts_a_backend() {
    let (backend_addr, connections) = common::start_counting_backend().await;
    let gateway = common::start_gateway(common::config_with(&[(
        "auth",
        &format!("http://{backend_addr}"),
    )]))
    .await;

    let res = common::client()
        .get(gateway.url("/api/billing"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Service not found" }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refused_connection_is_503_with_tried_url() {
    let dead = common::refused_addr().await;
    let base = format!("http://{dead}");
    let gateway = common::start_gateway(common::config_with(&[("auth", &base)])).await;

    let res = common::client()
        .get(gateway.url("/api/auth/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Service auth unavailable");
    assert_eq!(body["tried_url"], format!("{base}/health"));
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn timeout_is_503_with_exact_target_url() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&backend)
        .await;

    let mut config = common::config_with(&[("survey", &backend.uri())]);
    config.upstream.timeout_secs = 1;
    let gateway = common::start_gateway(config).await;

    let res = common::client()
        .get(gateway.url("/api/survey/slow?page=1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Service survey unavailable");
    assert_eq!(body["tried_url"], format!("{}/slow", backend.uri()));
    assert_eq!(body["detail"], "request timed out after 1000ms");
}

#[tokio::test]
async fn backend_sees_its_own_host_and_caller_headers() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(query_param("fields", "name,email"))
        .and(header("cookie", "session=abc123"))
        .and(header("x-custom", "kept"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&backend)
        .await;

    let gateway = common::start_gateway(common::config_with(&[("user", &backend.uri())])).await;

    let res = common::client()
        .get(gateway.url("/api/user/profile?fields=name,email"))
        .header("cookie", "session=abc123")
        .header("x-custom", "kept")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let received = backend.received_requests().await.unwrap();
    let host = received[0].headers.get("host").unwrap().to_str().unwrap();
    let backend_authority = backend.address().to_string();
    assert_eq!(host, backend_authority);
    assert_ne!(host, gateway.addr.to_string());
    assert!(received[0].headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn backend_errors_are_relayed_not_translated() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/surveys/9"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("x-backend", "survey")
                .set_body_json(json!({ "error": "db down" })),
        )
        .mount(&backend)
        .await;

    let gateway = common::start_gateway(common::config_with(&[("survey", &backend.uri())])).await;

    let res = common::client()
        .delete(gateway.url("/api/survey/surveys/9"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["x-backend"], "survey");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "db down" }));
}

#[tokio::test]
async fn relayed_body_is_framed_by_the_gateway() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/payments/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("updated"))
        .mount(&backend)
        .await;

    let gateway = common::start_gateway(common::config_with(&[("payment", &backend.uri())])).await;

    let res = common::client()
        .put(gateway.url("/api/payment/payments/1"))
        .body("amount=10")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    if let Some(len) = res.content_length() {
        assert_eq!(len, "updated".len() as u64);
    }
    assert_eq!(res.text().await.unwrap(), "updated");
}

#[tokio::test]
async fn unsupported_method_is_405_without_forwarding() {
    let (backend_addr, connections) = common::start_counting_backend().await;
    let gateway = common::start_gateway(common::config_with(&[(
        "auth",
        &format!("http://{backend_addr}"),
    )]))
    .await;

    let res = common::client()
        .patch(gateway.url("/api/auth/users/1"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_and_landing_are_local() {
    let (backend_addr, connections) = common::start_counting_backend().await;
    let gateway = common::start_gateway(common::config_with(&[(
        "auth",
        &format!("http://{backend_addr}"),
    )]))
    .await;
    let client = common::client();

    let res = client.get(gateway.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["port"], gateway.addr.port());

    let res = client.get(gateway.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["available_endpoints"]["auth_service"], "/api/auth");

    assert_eq!(connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_body_is_413() {
    let backend = MockServer::start().await;
    let mut config = common::config_with(&[("user", &backend.uri())]);
    config.limits.max_body_size = 8;
    let gateway = common::start_gateway(config).await;

    let res = common::client()
        .post(gateway.url("/api/user/upload"))
        .body(vec![b'x'; 64])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(backend.received_requests().await.unwrap().is_empty());
}
