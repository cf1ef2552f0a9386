use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};
use color_eyre::eyre::eyre;
use db::Ingredient;
use maud::{html, Markup};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    http_server::{
        cookies::recognized_ingredients, templates::base, ResponseResult, ServerError,
        WithStatus as _,
    },
    AppState,
};

fn ingredient_row(ingredient: &Ingredient) -> Markup {
    html! {
      li .ingredient {
        span .name { (ingredient.name) }
        @if let Some(quantity) = &ingredient.quantity {
          span .quantity { " (" (quantity) ")" }
        }

        form action={ "/ingredients/delete/" (ingredient.ingredient_id) } method="post" .inline {
          button type="submit" .link { "Remove" }
        }
      }
    }
}

pub(crate) async fn ingredients_index(
    State(state): State<AppState>,
    cookies: Cookies,
) -> ResponseResult<Markup> {
    let ingredients = state
        .ingredients
        .list()
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;
    let recognized = recognized_ingredients(&cookies, &state.cookie_key);

    Ok(base(
        "Ingredients",
        html! {
          h1 { "Your ingredients" }

          @if !recognized.is_empty() {
            p .notice { "We spotted " (recognized.join(", ")) " in your photo." }
          }

          @if ingredients.is_empty() {
            p { "Nothing here yet. " a href="/capture" { "Snap your fridge" } " or add something below." }
          } @else {
            ul .ingredients {
              @for ingredient in &ingredients {
                (ingredient_row(ingredient))
              }
            }

            a .button href="/recipes" { "Find recipes" }
          }

          h2 { "Add an ingredient" }
          form action="/ingredients" method="post" .card {
            label { "Name" input type="text" name="name" required; }
            label { "Quantity" input type="text" name="quantity" placeholder="optional"; }
            button type="submit" .button { "Add" }
          }
        },
    ))
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewIngredientForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    quantity: Option<String>,
}

pub(crate) async fn ingredients_post(
    State(state): State<AppState>,
    Form(form): Form<NewIngredientForm>,
) -> ResponseResult {
    let name = form.name.trim();
    let quantity = form
        .quantity
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());

    if name.is_empty() {
        tracing::debug!("Ignoring ingredient form without a name");
    } else {
        state
            .ingredients
            .add(name, quantity)
            .await
            .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    Ok(Redirect::to("/ingredients").into_response())
}

pub(crate) async fn ingredient_delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ResponseResult {
    let not_found = || ServerError(eyre!("Ingredient {raw_id} not found"), StatusCode::NOT_FOUND);
    let ingredient_id: Uuid = raw_id.parse().map_err(|_| not_found())?;

    let deleted = state
        .ingredients
        .delete(ingredient_id)
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let Some(deleted) = deleted else {
        return Err(not_found());
    };
    tracing::info!(name = %deleted.name, "Removed ingredient");

    Ok(Redirect::to("/ingredients").into_response())
}
