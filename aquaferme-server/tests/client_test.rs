use aquaferme_api::models::{CreateClientRequest, UserRole};
use aquaferme_server::tests::{create_test_client, create_test_lot, create_test_vente};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::mock_app::{MockApp, read_json};

fn create_client_request(token: &str, nom: &str, distributeur_id: Option<i32>) -> Request<Body> {
    Request::builder()
        .uri("/api/clients")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&CreateClientRequest {
                nom: nom.to_string(),
                email: Some(format!("{}@clients.test", nom.to_lowercase())),
                telephone: Some("+225 07 00 00 00".to_string()),
                adresse: None,
                distributeur_id,
            })
            .unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_admin_assigns_client_owner() {
    let app = MockApp::new().await.with_client_handle();
    let (seller, _) = app.login_as("seller@test.com", UserRole::Distributeur).await;
    let (operateur, _) = app.login_as("operateur@test.com", UserRole::Operateur).await;

    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&app.token, "Hotel", Some(seller.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let client = read_json(response).await;
    assert_eq!(client["distributeur_id"], json!(seller.id));

    // Owners must be distributors
    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&app.token, "Cantine", Some(operateur.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&app.token, "Cantine", Some(999)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unowned client
    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&app.token, "Cantine", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let client = read_json(response).await;
    assert_eq!(client["distributeur_id"], json!(null));
}

#[tokio::test]
async fn test_distributeur_owns_its_clients() {
    let app = MockApp::new().await.with_client_handle();
    let (seller, token) = app.login_as("seller@test.com", UserRole::Distributeur).await;
    let (other, _) = app.login_as("other@test.com", UserRole::Distributeur).await;
    let foreign = create_test_client(app.storage.clone(), "Foreign", Some(other.id)).await;

    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&token, "Maquis", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let client = read_json(response).await;
    assert_eq!(client["distributeur_id"], json!(seller.id));

    // Cannot hand a client to someone else
    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&token, "Poissonnerie", Some(other.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri("/api/clients")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let clients = read_json(response).await;
    let clients = clients.as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["nom"], json!("Maquis"));

    let request = Request::builder()
        .uri(format!("/api/clients/{}", foreign.id))
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri(format!("/api/clients/{}", foreign.id))
        .method(Method::PUT)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(json!({ "nom": "Stolen" }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_client() {
    let app = MockApp::new().await.with_client_handle();
    let client = create_test_client(app.storage.clone(), "Hotel", None).await;

    let request = Request::builder()
        .uri(format!("/api/clients/{}", client.id))
        .method(Method::PUT)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::from(
            json!({ "nom": "Hotel du Port", "adresse": "Rue du port" }).to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    assert_eq!(updated["nom"], json!("Hotel du Port"));
    assert_eq!(updated["adresse"], json!("Rue du port"));
    assert_eq!(updated["email"], json!(client.email));
}

#[tokio::test]
async fn test_delete_client() {
    let app = MockApp::new().await.with_client_handle();
    let buyer = create_test_client(app.storage.clone(), "Buyer", None).await;
    let idle = create_test_client(app.storage.clone(), "Idle", None).await;
    let lot = create_test_lot(app.storage.clone(), "L1", 100, None).await;
    create_test_vente(app.storage.clone(), lot.id, 5, 2.0, app.admin.id, Some(buyer.id)).await;

    let request = Request::builder()
        .uri(format!("/api/clients/{}", buyer.id))
        .method(Method::DELETE)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let request = Request::builder()
        .uri(format!("/api/clients/{}", idle.id))
        .method(Method::DELETE)
        .header("Authorization", format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_operateur_reads_but_cannot_manage_clients() {
    let app = MockApp::new().await.with_client_handle();
    let (_, token) = app.login_as("operateur@test.com", UserRole::Operateur).await;
    create_test_client(app.storage.clone(), "Hotel", None).await;

    let request = Request::builder()
        .uri("/api/clients")
        .method(Method::GET)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(create_client_request(&token, "Cantine", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
