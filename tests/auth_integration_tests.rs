use actix_web::{App, test, web};
use parkeasy::data::memory::InMemoryKeyValueStore;
use parkeasy::domain::repository::KeyValueStore;
use parkeasy::domain::user::{SignInRequest, SignUpRequest};
use parkeasy::infrastructure::config::AppConfig;
use parkeasy::presentation::handlers::{AppState, configure};
use std::sync::Arc;
use std::time::Duration;

macro_rules! setup_auth_test {
    () => {{
        let store = InMemoryKeyValueStore::new();
        let config = AppConfig {
            payment_delay: Duration::ZERO,
            ..AppConfig::default()
        };
        let state = web::Data::new(
            AppState::new(Arc::new(store.clone()), &config).unwrap(),
        );

        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        (app, store)
    }};
}

fn sign_up_body(email: &str, password: &str) -> SignUpRequest {
    SignUpRequest {
        name: "Asha Rao".to_string(),
        email: email.to_string(),
        phone: "9876543210".to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

#[actix_web::test]
async fn test_sign_up_then_dashboard() {
    let (app, store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(sign_up_body("asha@example.com", "secret12"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userEmail"], "asha@example.com");
    assert_eq!(body["redirect"], "/dashboard");

    assert_eq!(
        store.get("isAuthenticated").await.unwrap().as_deref(),
        Some("true")
    );
    let users = store.get("users").await.unwrap().unwrap();
    assert!(users.contains("asha@example.com"));

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["displayName"], "asha");
    assert_eq!(body["userName"], "Asha Rao");
}

#[actix_web::test]
async fn test_sign_up_short_password() {
    let (app, store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(sign_up_body("a@b.com", "short"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body["details"]["message"],
        "Password must be at least 6 characters"
    );
    assert!(store.get("isAuthenticated").await.unwrap().is_none());
}

#[actix_web::test]
async fn test_sign_up_duplicate_email() {
    let (app, _store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(sign_up_body("dup@example.com", "secret12"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-up")
        .set_json(sign_up_body("dup@example.com", "secret34"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_sign_in_lenient_for_long_password() {
    let (app, _store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(SignInRequest {
            email: "walkin@example.com".to_string(),
            password: "longenough".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["userName"], "walkin");
}

#[actix_web::test]
async fn test_sign_in_short_password_unknown_user() {
    let (app, _store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(SignInRequest {
            email: "walkin@example.com".to_string(),
            password: "abc".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_sign_in_empty_fields() {
    let (app, _store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(serde_json::json!({ "email": "", "password": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_gated_page_without_session_redirects() {
    let (app, _store) = setup_auth_test!();

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["details"]["redirect"], "/");
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let (app, store) = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/auth/sign-in")
        .set_json(SignInRequest {
            email: "walkin@example.com".to_string(),
            password: "longenough".to_string(),
        })
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post().uri("/api/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["redirect"], "/");

    assert!(store.get("isAuthenticated").await.unwrap().is_none());
    assert!(store.get("userEmail").await.unwrap().is_none());

    let req = test::TestRequest::get().uri("/api/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}
