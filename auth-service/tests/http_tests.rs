mod common;

use auth_service::domain::access::models::UserId;
use auth_service::domain::access::models::ValidityWindow;
use auth_service::domain::access::ports::TokenStore;
use chrono::Utc;
use common::cookie_token;
use common::TestApp;
use reqwest::header::LOCATION;
use reqwest::header::SET_COOKIE;
use reqwest::StatusCode;

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("Missing Location header")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_login_page_preserves_query() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/login?redirect=%2Fsecured")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("<form"));
    assert!(body.contains("redirect=%2Fsecured"));
}

#[tokio::test]
async fn test_signup_page_renders_form() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/signup").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("name=\"email\""));
    assert!(body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_signup_sets_cookie_and_follows_redirect() {
    let app = TestApp::spawn().await;

    let response = app
        .signup("?redirect=%2Fsecured", "new@example.com", "secret")
        .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/secured");

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("auth_token="));
    assert!(cookie.contains("; Expires="));
    assert!(cookie.ends_with("; Secure; Path=/"));

    let token = cookie_token(&response);
    assert!(token.parse::<auth::Token>().is_ok());
    assert_eq!(app.db.token_count("new@example.com").await, 1);
}

#[tokio::test]
async fn test_issued_cookie_grants_access() {
    let app = TestApp::spawn().await;

    let signup = app.signup("", "new@example.com", "secret").await;
    assert_eq!(signup.status(), StatusCode::FOUND);
    let token = cookie_token(&signup);

    let response = app
        .get_with_token("/secured", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), token);
}

#[tokio::test]
async fn test_login_defaults_to_root() {
    let app = TestApp::spawn().await;

    app.signup("", "user@example.com", "secret").await;

    let response = app.login("", "user@example.com", "secret").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");

    // Each successful login issues a fresh token
    let token = cookie_token(&response);
    assert!(!token.is_empty());
    assert_eq!(app.db.token_count("user@example.com").await, 2);
}

#[tokio::test]
async fn test_login_bad_credentials_are_generic() {
    let app = TestApp::spawn().await;

    app.signup("", "user@example.com", "secret").await;

    let wrong_password = app.login("", "user@example.com", "nope").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(SET_COOKIE).is_none());
    let wrong_password_body = wrong_password.text().await.unwrap();

    let unknown_user = app.login("", "nobody@example.com", "secret").await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let unknown_user_body = unknown_user.text().await.unwrap();

    assert_eq!(wrong_password_body, "invalid credentials");
    assert_eq!(wrong_password_body, unknown_user_body);
    assert_eq!(app.db.token_count("user@example.com").await, 1);
}

#[tokio::test]
async fn test_login_missing_field_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .form(&[("email", "user@example.com")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_methods_are_bad_request() {
    let app = TestApp::spawn().await;

    let put = app
        .api_client
        .put(&format!("{}/auth/login", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), StatusCode::BAD_REQUEST);

    let delete = app
        .api_client
        .delete(&format!("{}/auth/signup", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);

    for path in ["/auth/login", "/auth/signup"] {
        let head = app
            .api_client
            .head(&format!("{}{}", app.address, path))
            .send()
            .await
            .unwrap();
        assert_eq!(head.status(), StatusCode::BAD_REQUEST, "HEAD {}", path);
    }
}

#[tokio::test]
async fn test_signup_duplicate_email_is_bad_request() {
    let app = TestApp::spawn().await;

    let first = app.signup("", "user@example.com", "secret").await;
    assert_eq!(first.status(), StatusCode::FOUND);

    let second = app.signup("", "user@example.com", "other").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert!(second.headers().get(SET_COOKIE).is_none());
    assert!(second.text().await.unwrap().starts_with("create user:"));
}

#[tokio::test]
async fn test_signup_invalid_email_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app.signup("", "not-an-email", "secret").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_secured_without_cookie_redirects_to_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/secured").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        format!("{}?redirect=%2Fsecured", app.login_url)
    );
}

#[tokio::test]
async fn test_secured_with_garbage_cookie_redirects_to_login() {
    let app = TestApp::spawn().await;

    let response = app
        .get_with_token("/secured", "not base64!")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(location(&response).starts_with(&app.login_url));
}

#[tokio::test]
async fn test_secured_with_expired_token_redirects_to_login() {
    let app = TestApp::spawn().await;

    app.signup("", "user@example.com", "secret").await;

    let now = Utc::now();
    let expired = ValidityWindow::new(
        now - chrono::Duration::hours(48),
        now - chrono::Duration::hours(24),
    )
    .unwrap();
    let issued = app
        .repository
        .generate(&UserId::new("user@example.com".to_string()).unwrap(), expired)
        .await
        .unwrap();

    let response = app
        .get_with_token("/secured", &issued.token.encode())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location(&response),
        format!("{}?redirect=%2Fsecured", app.login_url)
    );
}

#[tokio::test]
async fn test_unusable_redirect_persists_nothing() {
    let app = TestApp::spawn().await;

    app.signup("", "user@example.com", "secret").await;
    assert_eq!(app.db.token_count("user@example.com").await, 1);

    let login = app.login("?redirect=%0D%0A", "user@example.com", "secret").await;
    assert_eq!(login.status(), StatusCode::BAD_REQUEST);
    assert!(login.headers().get(SET_COOKIE).is_none());
    assert_eq!(app.db.token_count("user@example.com").await, 1);

    // Signup is refused before the user is created
    let signup = app.signup("?redirect=%0D%0A", "other@example.com", "secret").await;
    assert_eq!(signup.status(), StatusCode::BAD_REQUEST);
    let retry = app.signup("", "other@example.com", "secret").await;
    assert_eq!(retry.status(), StatusCode::FOUND);
}
