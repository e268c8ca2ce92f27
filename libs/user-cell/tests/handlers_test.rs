use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::Json;
use axum_extra::TypedHeader;
use headers::Authorization;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{JwtTestUtils, MockStoreRows, TestConfig, TestUser};
use user_cell::handlers::{get_profile, login_user, register_user, update_profile};
use user_cell::models::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use user_cell::services::AccountService;

fn register_request(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> RegisterRequest {
    RegisterRequest {
        name: name.map(|s| s.to_string()),
        email: email.map(|s| s.to_string()),
        password: password.map(|s| s.to_string()),
    }
}

fn update_request() -> UpdateProfileRequest {
    UpdateProfileRequest {
        name: Some("Test User".to_string()),
        phone: Some("0851234567".to_string()),
        dob: Some("1990-01-01".to_string()),
        gender: Some("Female".to_string()),
        address: None,
        image: None,
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_rejects_missing_fields() {
    let config = TestConfig::default().to_arc();

    for request in [
        register_request(None, Some("a@b.com"), Some("longenough")),
        register_request(Some("Test"), None, Some("longenough")),
        register_request(Some("Test"), Some("a@b.com"), None),
        register_request(Some("   "), Some("a@b.com"), Some("longenough")),
    ] {
        let result = register_user(State(config.clone()), Json(request)).await;
        let response = result.unwrap().0;
        assert_eq!(response["success"], false);
        assert_eq!(response["message"], "Missing Details");
    }
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let config = TestConfig::default().to_arc();
    let request = register_request(Some("Test"), Some("not-an-email"), Some("longenough"));

    let response = register_user(State(config), Json(request)).await.unwrap().0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Enter a valid Email");
}

#[tokio::test]
async fn register_rejects_short_password() {
    let config = TestConfig::default().to_arc();
    let request = register_request(Some("Test"), Some("a@b.com"), Some("short"));

    let response = register_user(State(config), Json(request)).await.unwrap().0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Enter a Strong Password");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.test@example.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": Uuid::new_v4().to_string() }])),
        )
        .mount(&mock_server)
        .await;

    let request = register_request(Some("Test"), Some("test@example.com"), Some("longenough"));
    let response = register_user(State(config), Json(request)).await.unwrap().0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "User already exists");
}

#[tokio::test]
async fn register_issues_a_token_for_the_created_user() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let created_id = Uuid::new_v4().to_string();
    let stored_hash = AccountService::hash_password("longenough").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.test@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::user_row(&created_id, &stored_hash)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = register_request(Some("Test"), Some("test@example.com"), Some("longenough"));
    let response = register_user(State(config.clone()), Json(request))
        .await
        .unwrap()
        .0;

    assert_eq!(response["success"], true);
    let token = response["token"].as_str().unwrap();
    let auth_user = validate_token(token, &config.supabase_jwt_secret).unwrap();
    assert_eq!(auth_user.id, created_id);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_with_unknown_email_fails() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.ghost@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let request = LoginRequest {
        email: "ghost@example.com".to_string(),
        password: "longenough".to_string(),
    };
    let response = login_user(State(config), Json(request)).await.unwrap().0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "User does not exist");
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let stored_hash = AccountService::hash_password("the-real-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::user_row(&Uuid::new_v4().to_string(), &stored_hash)
        ])))
        .mount(&mock_server)
        .await;

    let request = LoginRequest {
        email: "test@example.com".to_string(),
        password: "not-the-password".to_string(),
    };
    let response = login_user(State(config), Json(request)).await.unwrap().0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Invalid credentials");
}

#[tokio::test]
async fn login_with_the_right_password_issues_a_valid_token() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user_id = Uuid::new_v4().to_string();
    let stored_hash = AccountService::hash_password("the-real-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::user_row(&user_id, &stored_hash)
        ])))
        .mount(&mock_server)
        .await;

    let request = LoginRequest {
        email: "test@example.com".to_string(),
        password: "the-real-password".to_string(),
    };
    let response = login_user(State(config.clone()), Json(request))
        .await
        .unwrap()
        .0;

    assert_eq!(response["success"], true);
    let token = response["token"].as_str().unwrap();
    let auth_user = validate_token(token, &config.supabase_jwt_secret).unwrap();
    assert_eq!(auth_user.id, user_id);
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn bearer(token: &str) -> TypedHeader<Authorization<headers::authorization::Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

#[tokio::test]
async fn profile_is_returned_without_the_password_hash() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .and(query_param("select", "id,name,email,image,phone,address,gender,dob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::user_profile_row(&user.id)
        ])))
        .mount(&mock_server)
        .await;

    let response = get_profile(State(config), bearer(&token), Extension(user.to_auth_user()))
        .await
        .unwrap()
        .0;

    assert_eq!(response["success"], true);
    assert_eq!(response["userData"]["email"], "test@example.com");
    assert!(response["userData"].get("password_hash").is_none());
}

#[tokio::test]
async fn profile_update_requires_the_core_fields() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut request = update_request();
    request.phone = None;

    let response = update_profile(
        State(config),
        bearer(&token),
        Extension(user.to_auth_user()),
        Json(request),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Data Missing");
}

#[tokio::test]
async fn profile_update_with_a_bad_address_writes_nothing() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut request = update_request();
    request.address = Some("{line1: unquoted".to_string());

    let response = update_profile(
        State(config),
        bearer(&token),
        Extension(user.to_auth_user()),
        Json(request),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Invalid address format");
}

#[tokio::test]
async fn profile_update_persists_the_new_fields() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::user_profile_row(&user.id)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = update_request();
    request.address = Some(r#"{"line1":"24 Main St","line2":"Dublin"}"#.to_string());

    let response = update_profile(
        State(config),
        bearer(&token),
        Extension(user.to_auth_user()),
        Json(request),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Profile Updated");
}

#[tokio::test]
async fn profile_update_uploads_the_avatar_as_a_second_write() {
    let mock_server = MockServer::start().await;
    let config = Arc::new(TestConfig::with_store_url(&mock_server.uri()));
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    // Profile-field write, then the avatar URL write.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::user_profile_row(&user.id)
        ])))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/profiles/.+\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = update_request();
    request.image = Some("data:image/png;base64,aGVsbG8=".to_string());

    let response = update_profile(
        State(config),
        bearer(&token),
        Extension(user.to_auth_user()),
        Json(request),
    )
    .await
    .unwrap()
    .0;

    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "Profile Updated");
}
