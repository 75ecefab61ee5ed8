use actix_web::{App, test, web};
use session_auth_api::application::auth_service::AuthService;
use session_auth_api::data::session_store::InMemorySessionStore;
use session_auth_api::data::user_repository::InMemoryUserRepository;
use session_auth_api::domain::user::{LoginRequest, RegisterRequest};
use session_auth_api::infrastructure::config::AppConfig;
use session_auth_api::presentation::handlers::{
    AppState, current_user, index, login, logout, register,
};
use std::sync::Arc;

macro_rules! setup_auth_test {
    () => {{
        let user_repository = Arc::new(InMemoryUserRepository::new());
        let session_store = Arc::new(InMemorySessionStore::new());
        let auth_service = Arc::new(AuthService::new(user_repository, session_store));

        let state = web::Data::new(AppState {
            auth_service,
            config: AppConfig::default(),
        });

        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .route("/", web::get().to(index))
                .service(
                    web::scope("/api")
                        .route("/register", web::post().to(register))
                        .route("/login", web::post().to(login))
                        .route("/@me", web::get().to(current_user))
                        .route("/logout", web::post().to(logout)),
                ),
        )
        .await;

        app
    }};
}

#[actix_web::test]
async fn test_index_returns_plain_text() {
    let app = setup_auth_test!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[actix_web::test]
async fn test_register_returns_created_user_and_cookie() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "a@x.com".to_string(),
            password: "p1".to_string(),
        })
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "session_id")
        .expect("register must set a session cookie");
    assert!(!cookie.value().is_empty());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["email"], "a@x.com");
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn test_register_missing_fields_returns_400() {
    let app = setup_auth_test!();

    // Empty values
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({ "email": "", "password": "p1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Absent field
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(serde_json::json!({ "email": "a@x.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_register_duplicate_email_returns_409() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "duplicate@example.com".to_string(),
            password: "pass1".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "duplicate@example.com".to_string(),
            password: "pass2".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    // No second row: a later registration still gets the next sequential id
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "third@example.com".to_string(),
            password: "pass3".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 2);
}

#[actix_web::test]
async fn test_login_with_correct_credentials_returns_same_id() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "flow@example.com".to_string(),
            password: "password123".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    let registered: serde_json::Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&LoginRequest {
            email: "flow@example.com".to_string(),
            password: "password123".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(
        resp.response()
            .cookies()
            .any(|c| c.name() == "session_id" && !c.value().is_empty())
    );

    let logged_in: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(logged_in["id"], registered["id"]);
    assert_eq!(logged_in["email"], "flow@example.com");
}

#[actix_web::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup_auth_test!();

    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(&RegisterRequest {
            email: "known@example.com".to_string(),
            password: "right".to_string(),
        })
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&LoginRequest {
            email: "unknown@example.com".to_string(),
            password: "whatever".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let unknown_body: serde_json::Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&LoginRequest {
            email: "known@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let wrong_body: serde_json::Value = test::read_body_json(resp).await;

    // Identical bodies: no way to tell "no such user" from "bad password"
    assert_eq!(unknown_body, wrong_body);
}
