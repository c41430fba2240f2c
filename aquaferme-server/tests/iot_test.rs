use aquaferme_api::LiveMessage;
use aquaferme_api::models::{CreateDeviceRequest, CreateMesureRequest, UserRole};
use aquaferme_server::handles::DEVICE_KEY_HEADER;
use aquaferme_server::tests::{create_test_bassin, create_test_device};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, read_json};

fn device_mesure_request(key: Option<&str>, body: &CreateMesureRequest) -> Request<Body> {
    let mut builder = Request::builder()
        .uri("/api/iot/mesures")
        .method(Method::POST)
        .header("Content-Type", "application/json");

    if let Some(key) = key {
        builder = builder.header(DEVICE_KEY_HEADER, key);
    }

    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn heartbeat_request(key: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/iot/heartbeat")
        .method(Method::POST)
        .header(DEVICE_KEY_HEADER, key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_register_device() {
    let app = MockApp::new().await.with_iot_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;

    let request = Request::builder()
        .uri("/api/iot/devices")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(
            serde_json::to_string(&CreateDeviceRequest {
                nom: "sonde-b1".to_string(),
                bassin_id: Some(bassin.id),
                type_capteur: Some("multiparametre".to_string()),
            })
            .unwrap(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let device = read_json(response).await;
    assert_eq!(device["nom"], json!("sonde-b1"));
    assert_eq!(device["online"], json!(false));
    assert_eq!(device["device_key"].as_str().unwrap().len(), 32);

    // Listing never exposes the key
    let request = Request::builder()
        .uri("/api/iot/devices")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let devices = read_json(response).await;
    assert_eq!(devices.as_array().unwrap().len(), 1);
    assert!(devices[0].get("device_key").is_none());

    // Duplicate name
    let request = Request::builder()
        .uri("/api/iot/devices")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(json!({ "nom": "sonde-b1" }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_regenerate_device_key() {
    let app = MockApp::new().await.with_iot_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    let device = create_test_device(app.storage.clone(), "sonde-b1", Some(bassin.id), "old-key").await;

    let request = Request::builder()
        .uri(format!("/api/iot/devices/{}", device.id))
        .method(Method::PUT)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(json!({ "regenerate_key": true }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    let new_key = updated["device_key"].as_str().unwrap().to_string();
    assert_ne!(new_key, "old-key");

    let response = app.router.clone().oneshot(heartbeat_request("old-key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.router.clone().oneshot(heartbeat_request(&new_key)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_heartbeat_marks_device_online() {
    let app = MockApp::new().await.with_iot_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    let device = create_test_device(app.storage.clone(), "sonde-b1", Some(bassin.id), "key-1").await;
    create_test_device(app.storage.clone(), "sonde-b2", None, "key-2").await;

    let (_, mut live) = app.live_router.subscribe().await;

    let response = app.router.clone().oneshot(heartbeat_request("key-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status = read_json(response).await;
    assert_eq!(status["device_id"], json!(device.id));
    assert_eq!(status["online"], json!(true));
    assert!(status["last_seen"].is_string());

    match live.recv().await.unwrap() {
        LiveMessage::IotConnected(status) => assert_eq!(status.device_id, device.id),
        other => panic!("unexpected message {}", other.kind()),
    }

    let request = Request::builder()
        .uri("/api/iot/status")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let snapshot = read_json(response).await;
    let online: Vec<bool> = snapshot
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["online"].as_bool().unwrap())
        .collect();
    assert_eq!(online.iter().filter(|o| **o).count(), 1);
    assert_eq!(online.len(), 2);
}

#[tokio::test]
async fn test_device_mesure_requires_key() {
    let app = MockApp::new().await.with_iot_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    create_test_device(app.storage.clone(), "sonde-b1", Some(bassin.id), "key-1").await;
    create_test_device(app.storage.clone(), "sonde-libre", None, "key-2").await;

    let reading = CreateMesureRequest {
        temperature: Some(26.0),
        ..Default::default()
    };

    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(None, &reading))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(Some("unknown"), &reading))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Device not installed in a tank
    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(Some("key-2"), &reading))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(Some("key-1"), &CreateMesureRequest::default()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_device_mesure_raises_alerte() {
    let app = MockApp::new().await.with_iot_handle().with_alerte_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    create_test_device(app.storage.clone(), "sonde-b1", Some(bassin.id), "key-1").await;

    let (_, mut live) = app.live_router.subscribe().await;

    let reading = CreateMesureRequest {
        temperature: Some(26.0),
        ph: Some(7.0),
        oxygen: Some(2.0),
        ..Default::default()
    };

    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(Some("key-1"), &reading))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mesure = read_json(response).await;
    assert_eq!(mesure["bassin_id"], json!(bassin.id));

    let mut kinds = Vec::new();
    for _ in 0..4 {
        kinds.push(live.recv().await.unwrap().kind());
    }
    assert_eq!(kinds, vec!["iot_connected", "iot_status_update", "mesure", "alerte"]);

    let request = Request::builder()
        .uri("/api/alertes?resolved=false")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let alertes = read_json(response).await;
    assert_eq!(alertes.as_array().unwrap().len(), 1);
    assert_eq!(alertes[0]["parametre"], json!("oxygen"));
    assert_eq!(alertes[0]["bassin_id"], json!(bassin.id));
}

#[tokio::test]
async fn test_live_socket_requires_token() {
    let app = MockApp::new().await.with_iot_handle();

    let request = Request::builder()
        .uri("/api/iot/ws")
        .method(Method::GET)
        .header("Connection", "upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/iot/ws?token=forged")
        .method(Method::GET)
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_observateur_cannot_manage_devices() {
    let app = MockApp::new().await.with_iot_handle();
    let (_, token) = app.login_as("observateur@test.com", UserRole::Observateur).await;

    let request = Request::builder()
        .uri("/api/iot/devices")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "nom": "sonde" }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/iot/status")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

type LiveSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_frame(socket: &mut LiveSocket) -> Value {
    let message = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
        .await
        .expect("no frame within 5s")
        .unwrap()
        .unwrap();
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn test_live_socket_streams_snapshot_then_events() {
    let app = MockApp::new().await.with_iot_handle();
    let bassin = create_test_bassin(app.storage.clone(), "B1", 1000).await;
    let device = create_test_device(app.storage.clone(), "sonde-b1", Some(bassin.id), "key-1").await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let (mut socket, _) = connect_async(format!("ws://{}/api/iot/ws?token={}", address, app.token))
        .await
        .unwrap();

    let snapshot = next_frame(&mut socket).await;
    assert_eq!(snapshot["type"], json!("iot_status_snapshot"));
    assert_eq!(snapshot["data"][0]["device_id"], json!(device.id));
    assert_eq!(snapshot["data"][0]["online"], json!(false));

    let reading = CreateMesureRequest {
        temperature: Some(26.0),
        ph: Some(7.0),
        oxygen: Some(2.0),
        ..Default::default()
    };

    let response = app
        .router
        .clone()
        .oneshot(device_mesure_request(Some("key-1"), &reading))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let connected = next_frame(&mut socket).await;
    assert_eq!(connected["type"], json!("iot_connected"));
    assert_eq!(connected["data"]["device_id"], json!(device.id));
    assert_eq!(connected["data"]["online"], json!(true));

    assert_eq!(next_frame(&mut socket).await["type"], json!("iot_status_update"));

    let mesure = next_frame(&mut socket).await;
    assert_eq!(mesure["type"], json!("mesure"));
    assert_eq!(mesure["data"]["bassin_id"], json!(bassin.id));

    let alerte = next_frame(&mut socket).await;
    assert_eq!(alerte["type"], json!("alerte"));
    assert_eq!(alerte["data"]["parametre"], json!("oxygen"));
}
