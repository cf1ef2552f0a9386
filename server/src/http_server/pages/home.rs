use maud::{html, Markup};

use crate::http_server::templates::base;

pub(crate) async fn home_page() -> Markup {
    base(
        "Home",
        html! {
          section .hero {
            h1 { "Turn what's in your fridge into dinner" }
            p .subtitle {
              "Snap a photo of your fridge, let us pick out the ingredients, and get recipes that use what you already have."
            }
            a .button href="/capture" { "Snap your fridge" }
          }

          section .steps {
            div {
              h2 { "1. Capture" }
              p { "Upload a photo and we'll recognize the ingredients in it." }
            }
            div {
              h2 { "2. Review" }
              p { "Add anything we missed and remove what's run out." }
            }
            div {
              h2 { "3. Cook" }
              p { "Browse matching recipes, or mix two cuisines into a fusion dish." }
            }
          }
        },
    )
}

pub(crate) async fn about_page() -> Markup {
    base(
        "About",
        html! {
          h1 { "About FridgeToPlate" }
          p {
            "FridgeToPlate helps cut down on food waste by suggesting recipes built around the ingredients you already have."
          }
          p {
            "Recipes are ranked by how much of each one you can make from your fridge. "
            "Fusion recipes blend the ingredients, techniques and flavors of two cuisines."
          }
        },
    )
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::http_server::test_helpers::{create_test_app, response_body_string, test_state};

    #[tokio::test]
    async fn test_static_pages_render() {
        for (path, expected) in [
            ("/", "into dinner"),
            ("/about", "About FridgeToPlate"),
        ] {
            let app = create_test_app(test_state());

            let response = app
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = response_body_string(response).await;
            assert!(body.contains(expected), "{path} should contain {expected}");
        }
    }
}
