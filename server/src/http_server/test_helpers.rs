use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use cookbook::Cookbook;
use db::{MemoryIngredients, MemoryRecipes};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    http_server::{cookies::CookieKey, routes::make_router},
    spoonacular::SpoonacularConfig,
    uploads::UploadConfig,
    vision::VisionConfig,
    AppConfig, AppState,
};

/// Mocked gateways, in-memory stores and a fresh upload folder per call.
pub(crate) fn test_state() -> AppState {
    let folder = std::env::temp_dir().join(format!("fridge-to-plate-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&folder).unwrap();

    let app = AppConfig {
        port: 0,
        database_url: None,
        uploads: UploadConfig {
            folder,
            max_content_length: 1024 * 1024,
            allowed_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
        },
        vision: VisionConfig::mock(),
        spoonacular: SpoonacularConfig::mock(),
    };

    AppState::new(
        app,
        Cookbook::from_static_dir().unwrap(),
        Arc::new(MemoryIngredients::default()),
        Arc::new(MemoryRecipes::default()),
        CookieKey(tower_cookies::Key::generate()),
    )
}

pub(crate) fn create_test_app(state: AppState) -> Router {
    make_router(state.app.uploads.max_content_length).with_state(state)
}

const BOUNDARY: &str = "fridge-to-plate-boundary";

/// A `multipart/form-data` POST carrying a single file field.
pub(crate) fn multipart_request(uri: &str, field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub(crate) async fn response_body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

pub(crate) async fn response_body_string(response: Response<Body>) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}
