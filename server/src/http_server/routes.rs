use axum::{
    extract::DefaultBodyLimit,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;

use crate::{
    http_server::{api, pages, templates},
    AppState,
};

const SITE_CSS: &str = include_str!("../../static/site.css");

pub(crate) fn make_router(max_content_length: usize) -> Router<AppState> {
    Router::new()
        .route("/static/site.css", get(stylesheet))
        .route("/", get(pages::home::home_page))
        .route("/about", get(pages::home::about_page))
        .route(
            "/capture",
            get(pages::capture::capture_get).post(pages::capture::capture_post),
        )
        .route(
            "/ingredients",
            get(pages::ingredients::ingredients_index).post(pages::ingredients::ingredients_post),
        )
        .route("/ingredients/add", post(api::ingredients::add_ingredient))
        .route("/ingredients/upload", post(api::ingredients::upload_image))
        .route(
            "/ingredients/delete/{ingredient_id}",
            post(pages::ingredients::ingredient_delete),
        )
        .route("/recipes", get(pages::recipes::recipes_index))
        .route("/recipes/save", post(api::recipes::save_recipe))
        .route("/recipes/fusion", post(api::recipes::fusion))
        .route("/recipes/{recipe_id}", get(pages::recipes::recipe_get))
        .route("/recipes/detail/{recipe_id}", get(pages::recipes::recipe_get))
        .route("/fusion", post(api::recipes::fusion))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_content_length))
        .layer(CookieManagerLayer::new())
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], SITE_CSS)
}

async fn fallback() -> impl IntoResponse {
    (axum::http::StatusCode::NOT_FOUND, templates::not_found_page())
}
