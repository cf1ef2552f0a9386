use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use color_eyre::eyre::eyre;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    http_server::{pages::capture::recognize_upload, JsonError, ServerError, WithStatus as _},
    AppState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct AddIngredient {
    name: Option<String>,
    quantity: Option<String>,
}

pub(crate) async fn add_ingredient(
    State(state): State<AppState>,
    Json(body): Json<AddIngredient>,
) -> Result<Json<Value>, JsonError> {
    let Some(name) = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return Err(ServerError(eyre!("Name is required"), StatusCode::BAD_REQUEST).into());
    };
    let quantity = body.quantity.as_deref().filter(|q| !q.is_empty());

    let ingredient = state
        .ingredients
        .add(name, quantity)
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(json!({
        "success": true,
        "ingredient": ingredient,
    })))
}

pub(crate) async fn upload_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, JsonError> {
    let ingredients = recognize_upload(&state, multipart).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Recognized {} ingredients", ingredients.len()),
        "ingredients": ingredients,
    })))
}
