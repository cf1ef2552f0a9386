use axum::{extract::State, http::StatusCode, Json};
use color_eyre::eyre::eyre;
use cookbook::Recipe;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    http_server::{JsonError, ServerError, WithStatus as _},
    AppState,
};

/// Cuisines come either as a list or as the two `cuisine1`/`cuisine2` fields
/// the fusion form posts. Ingredients default to everything on hand.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FusionRequest {
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    cuisines: Vec<String>,
    cuisine1: Option<String>,
    cuisine2: Option<String>,
}

impl FusionRequest {
    fn requested_cuisines(&self) -> Vec<String> {
        let cuisines = if self.cuisines.is_empty() {
            [&self.cuisine1, &self.cuisine2]
                .into_iter()
                .flatten()
                .cloned()
                .collect()
        } else {
            self.cuisines.clone()
        };

        cuisines
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

pub(crate) async fn fusion(
    State(state): State<AppState>,
    Json(request): Json<FusionRequest>,
) -> Result<Json<Value>, JsonError> {
    let cuisines = request.requested_cuisines();
    if cuisines.is_empty() {
        return Err(ServerError(eyre!("Cuisines are required"), StatusCode::BAD_REQUEST).into());
    }

    let ingredients = if request.ingredients.is_empty() {
        state
            .ingredients
            .names()
            .await
            .with_status(StatusCode::INTERNAL_SERVER_ERROR)?
    } else {
        request.ingredients
    };
    if ingredients.is_empty() {
        return Err(ServerError(
            eyre!("No ingredients available"),
            StatusCode::BAD_REQUEST,
        )
        .into());
    }

    let recipe = state
        .recipes
        .fusion_recipe(&state.cookbook, &ingredients, &cuisines)
        .await;
    tracing::info!(recipe_id = recipe.id, title = %recipe.title, "Generated fusion recipe");

    Ok(Json(json!({
        "success": true,
        "recipe": recipe,
    })))
}

/// Keeps a recipe, typically a fusion recipe, so it can be opened again from
/// `/recipes/{id}`.
pub(crate) async fn save_recipe(
    State(state): State<AppState>,
    Json(recipe): Json<Recipe>,
) -> Result<Json<Value>, JsonError> {
    let existing = state
        .saved_recipes
        .get(recipe.id)
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;
    if existing.is_some() {
        return Err(ServerError(
            eyre!("Recipe {} is already saved", recipe.id),
            StatusCode::CONFLICT,
        )
        .into());
    }

    let saved = state
        .saved_recipes
        .save(&recipe)
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(json!({
        "success": true,
        "recipe": Recipe::from(saved),
    })))
}
