use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use color_eyre::eyre::eyre;
use cookbook::Recipe;
use maud::{html, Markup, PreEscaped};

use crate::{
    http_server::{
        templates::{
            base,
            recipes::{recipe_detail, RecipeCard},
        },
        ResponseResult, ServerError, WithStatus as _,
    },
    AppState,
};

/// Posts the chosen cuisines to `/fusion`, shows the result and lets the user
/// keep it through `/recipes/save`.
const FUSION_SCRIPT: &str = r#"
const form = document.getElementById("fusion-form");
const output = document.getElementById("fusion-result");

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const data = new FormData(form);
  const response = await fetch("/fusion", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ cuisine1: data.get("cuisine1"), cuisine2: data.get("cuisine2") }),
  });
  const body = await response.json();
  if (!body.success) {
    output.textContent = body.error;
    return;
  }

  const recipe = body.recipe;
  output.innerHTML = "";
  const title = document.createElement("h3");
  title.textContent = recipe.title;
  const ingredients = document.createElement("p");
  ingredients.textContent = recipe.ingredients.join(", ");
  const steps = document.createElement("pre");
  steps.textContent = recipe.instructions;
  const save = document.createElement("button");
  save.className = "button";
  save.textContent = "Save this recipe";
  save.addEventListener("click", async () => {
    const saved = await fetch("/recipes/save", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(recipe),
    });
    if (saved.ok) {
      window.location = "/recipes/" + recipe.id;
    } else {
      save.textContent = (await saved.json()).error;
    }
  });
  output.append(title, ingredients, steps, save);
});
"#;

fn fusion_form(state: &AppState) -> Markup {
    let cuisines: Vec<&str> = state.cookbook.cuisines.names().collect();

    html! {
      section .fusion {
        h2 { "Try a fusion" }
        p { "Pick two cuisines and we'll blend them around what you have." }

        form #fusion-form .card {
          @for field in ["cuisine1", "cuisine2"] {
            select name=(field) {
              @for (i, cuisine) in cuisines.iter().enumerate() {
                @let preselected = (field == "cuisine1" && i == 0) || (field == "cuisine2" && i == 1);
                option value=(cuisine) selected[preselected] { (cuisine) }
              }
            }
          }
          button type="submit" .button { "Fuse" }
        }

        div #fusion-result {}
        script { (PreEscaped(FUSION_SCRIPT)) }
      }
    }
}

pub(crate) async fn recipes_index(State(state): State<AppState>) -> ResponseResult<Markup> {
    let on_hand = state
        .ingredients
        .names()
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let recipes = if on_hand.is_empty() {
        vec![]
    } else {
        state.recipes.find_recipes(&state.cookbook, &on_hand).await
    };
    tracing::debug!(on_hand = on_hand.len(), found = recipes.len(), "Matched recipes");

    let saved: Vec<Recipe> = state
        .saved_recipes
        .list()
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?
        .into_iter()
        .map(Recipe::from)
        .collect();

    Ok(base(
        "Recipes",
        html! {
          h1 { "Recipes" }

          @if on_hand.is_empty() {
            p { "Add some " a href="/ingredients" { "ingredients" } " first and we'll find recipes for them." }
          } @else if recipes.is_empty() {
            p { "No recipes use " (on_hand.join(", ")) " yet." }
          } @else {
            p { "Recipes for " (on_hand.join(", ")) ":" }

            div .recipe-grid {
              @for recipe in &recipes {
                (RecipeCard(recipe))
              }
            }
          }

          @if !on_hand.is_empty() {
            (fusion_form(&state))
          }

          @if !saved.is_empty() {
            section .saved {
              h2 { "Saved recipes" }

              div .recipe-grid {
                @for recipe in &saved {
                  (RecipeCard(recipe))
                }
              }
            }
          }
        },
    ))
}

/// Looks the id up through the recipe gateway first, then among saved
/// recipes, so saved fusion recipes stay reachable.
pub(crate) async fn recipe_get(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ResponseResult<Markup> {
    let not_found = || ServerError(eyre!("Recipe {raw_id} not found"), StatusCode::NOT_FOUND);
    let recipe_id: i64 = raw_id.parse().map_err(|_| not_found())?;

    let recipe = match state.recipes.get_recipe(&state.cookbook, recipe_id).await {
        Some(recipe) => Some(recipe),
        None => state
            .saved_recipes
            .get(recipe_id)
            .await
            .with_status(StatusCode::INTERNAL_SERVER_ERROR)?
            .map(Recipe::from),
    };

    let Some(recipe) = recipe else {
        return Err(not_found());
    };

    Ok(base(&recipe.title, recipe_detail(&recipe)))
}
