// SPDX-License-Identifier: MIT

//! Auth cookie attribute tests.
//!
//! These tests verify cookie removal attributes on logout match the
//! creation attributes for development and production configurations.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use fintrack::config::Config;
use tower::ServiceExt;

mod common;

fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

#[tokio::test]
async fn test_logout_cookie_removal_development_attributes() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::COOKIE, "accessToken=test; refreshToken=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = set_cookie_headers(&response);
    let access_cookie = find_cookie(&set_cookies, "accessToken");
    let refresh_cookie = find_cookie(&set_cookies, "refreshToken");

    for cookie in [&access_cookie, &refresh_cookie] {
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}

#[tokio::test]
async fn test_logout_cookie_removal_production_attributes() {
    let mut config = Config::test_default();
    config.environment = "production".to_string();
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::COOKIE, "accessToken=test; refreshToken=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = set_cookie_headers(&response);
    let access_cookie = find_cookie(&set_cookies, "accessToken");
    let refresh_cookie = find_cookie(&set_cookies, "refreshToken");

    for cookie in [&access_cookie, &refresh_cookie] {
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Secure"));
    }
}

#[tokio::test]
async fn test_logout_without_cookies_still_succeeds() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Logout never fails, even with no session at all
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookies = set_cookie_headers(&response);
    assert!(set_cookies.iter().any(|c| c.starts_with("accessToken=")));
    assert!(set_cookies.iter().any(|c| c.starts_with("refreshToken=")));
}
