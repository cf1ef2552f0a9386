use cookbook::Recipe;
use maud::{html, Markup, Render};

/// Summary card linking to the recipe's detail page.
pub struct RecipeCard<'a>(pub &'a Recipe);

impl Render for RecipeCard<'_> {
    fn render(&self) -> Markup {
        let recipe = self.0;

        html! {
          article .recipe-card {
            @if let Some(image_url) = &recipe.image_url {
              img src=(image_url) alt=(recipe.title);
            }

            h3 { a href={ "/recipes/" (recipe.id) } { (recipe.title) } }

            p .meta {
              @if let Some(minutes) = recipe.ready_in_minutes {
                span { (minutes) " min" }
              }
              @if let Some(servings) = recipe.servings {
                span { "Serves " (servings) }
              }
              @for cuisine in &recipe.cuisines {
                span .tag { (cuisine) }
              }
            }

            @if let Some(summary) = &recipe.summary {
              p { (summary) }
            }
          }
        }
    }
}

pub fn recipe_detail(recipe: &Recipe) -> Markup {
    html! {
      article .recipe-detail {
        h1 { (recipe.title) }

        @if recipe.is_fusion {
          p .tag { "Fusion" }
        }

        @if let Some(image_url) = &recipe.image_url {
          img src=(image_url) alt=(recipe.title);
        }

        p .meta {
          @if let Some(minutes) = recipe.ready_in_minutes {
            span { "Ready in " (minutes) " minutes" }
          }
          @if let Some(servings) = recipe.servings {
            span { "Serves " (servings) }
          }
        }

        @if let Some(summary) = &recipe.summary {
          p .summary { (summary) }
        }

        h2 { "Ingredients" }
        ul {
          @for ingredient in &recipe.ingredients {
            li { (ingredient) }
          }
        }

        h2 { "Instructions" }
        ol {
          @for step in recipe.steps() {
            li { (step) }
          }
        }

        @if let Some(source_url) = &recipe.source_url {
          p { a href=(source_url) { "Original recipe" } }
        }
      }
    }
}
