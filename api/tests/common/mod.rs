#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{ACCEPT, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response};
use blogly_api::{AppState, router};
use blogly_service::sea_orm::{ConnectOptions, Database};
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use tower::ServiceExt;
use tower_cookies::Key;

pub const HTML: &str = "text/html";
pub const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

pub async fn app() -> Router {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let state = AppState::new(db, Key::generate()).unwrap();
    router(state, concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, accept: Option<&str>) -> Response<Body> {
    let mut request = Request::get(uri);
    if let Some(accept) = accept {
        request = request.header(ACCEPT, accept);
    }
    send(app, request.body(Body::empty()).unwrap()).await
}

/// Sends a JSON body and asks for JSON back.
pub async fn json(app: &Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, JSON)
        .header(ACCEPT, JSON)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Submits an HTML form the way a browser does.
pub async fn form(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, FORM)
        .header(ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
        .body(Body::from(body.to_owned()))
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(ACCEPT, HTML)
        .header(COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

pub fn content_type(response: &Response<Body>) -> &str {
    response.headers()[CONTENT_TYPE].to_str().unwrap()
}

/// The `name=value` part of the flash cookie the response sets.
pub fn flash_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("_flash="))
        .and_then(|value| value.split(';').next())
        .map(str::to_owned)
}
