use aquaferme_api::LiveMessage;
use aquaferme_api::models::{AlerteType, CreateAlerteRequest, UserRole};
use aquaferme_server::tests::{create_test_alerte, create_test_bassin};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, read_json};

#[tokio::test]
async fn test_get_alertes_with_filters() {
    let app = MockApp::new().await.with_alerte_handle();
    let b1 = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    let b2 = create_test_bassin(app.storage.clone(), "B2", 1000).await;
    create_test_alerte(app.storage.clone(), Some(b1.id), Some("ph"), AlerteType::Warning, false).await;
    create_test_alerte(app.storage.clone(), Some(b1.id), Some("oxygen"), AlerteType::Error, true).await;
    create_test_alerte(app.storage.clone(), Some(b2.id), Some("temperature"), AlerteType::Error, false).await;

    let request = Request::builder()
        .uri("/api/alertes")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let alertes = read_json(response).await;
    let alertes = alertes.as_array().unwrap();
    assert_eq!(alertes.len(), 3);
    // Most recent first
    assert_eq!(alertes[0]["parametre"], json!("temperature"));

    let request = Request::builder()
        .uri(format!("/api/alertes?resolved=false&bassin_id={}", b1.id))
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let alertes = read_json(response).await;
    assert_eq!(alertes.as_array().unwrap().len(), 1);
    assert_eq!(alertes[0]["parametre"], json!("ph"));

    let request = Request::builder()
        .uri("/api/alertes?type=error")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let alertes = read_json(response).await;
    assert_eq!(alertes.as_array().unwrap().len(), 2);
    assert!(alertes.as_array().unwrap().iter().all(|a| a["type"] == json!("error")));
}

#[tokio::test]
async fn test_create_alerte_is_broadcast() {
    let app = MockApp::new().await.with_alerte_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;

    let (_, mut live) = app.live_router.subscribe().await;

    let request = Request::builder()
        .uri("/api/alertes")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(
            serde_json::to_string(&CreateAlerteRequest {
                message: "Vidange prevue demain".to_string(),
                alerte_type: AlerteType::Info,
                bassin_id: Some(bassin.id),
            })
            .unwrap(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let alerte = read_json(response).await;
    assert_eq!(alerte["message"], json!("Vidange prevue demain"));
    assert_eq!(alerte["resolved"], json!(false));

    match live.recv().await.unwrap() {
        LiveMessage::Alerte(broadcast) => assert_eq!(json!(broadcast.id), alerte["id"]),
        other => panic!("unexpected message {}", other.kind()),
    }

    // Unknown bassin
    let request = Request::builder()
        .uri("/api/alertes")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(
            json!({ "message": "Test", "bassin_id": 999 }).to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Blank message
    let request = Request::builder()
        .uri("/api/alertes")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(json!({ "message": "   " }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolve_alerte() {
    let app = MockApp::new().await.with_alerte_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    let alerte = create_test_alerte(app.storage.clone(), Some(bassin.id), Some("ph"), AlerteType::Warning, false).await;

    let (_, token) = app.login_as("observateur@test.com", UserRole::Observateur).await;

    let request = Request::builder()
        .uri(format!("/api/alertes/{}/resolve", alerte.id))
        .method(Method::PUT)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri(format!("/api/alertes/{}/resolve", alerte.id))
        .method(Method::PUT)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let resolved = read_json(response).await;
    assert_eq!(resolved["resolved"], json!(true));

    let request = Request::builder()
        .uri("/api/alertes/999/resolve")
        .method(Method::PUT)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_alerte() {
    let app = MockApp::new().await.with_alerte_handle();
    let alerte = create_test_alerte(app.storage.clone(), None, None, AlerteType::Info, true).await;

    let request = Request::builder()
        .uri(format!("/api/alertes/{}", alerte.id))
        .method(Method::DELETE)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .uri(format!("/api/alertes/{}", alerte.id))
        .method(Method::DELETE)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
