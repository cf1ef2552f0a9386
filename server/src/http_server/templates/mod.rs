use axum::http::StatusCode;
use maud::{html, Markup, Render, DOCTYPE};

pub(crate) mod recipes;

pub fn head(title: &str) -> Markup {
    html! {
      head {
        meta charset="utf-8";
        meta name="viewport" content="width=device-width, initial-scale=1";
        title { (title) " | FridgeToPlate" }
        link rel="stylesheet" href="/static/site.css" {}
      }
    }
}

struct HeaderLink {
    href: &'static str,
    text: &'static str,
}

impl Render for HeaderLink {
    fn render(&self) -> Markup {
        html! {
          li { a href=(self.href) { (self.text) } }
        }
    }
}

pub fn header() -> Markup {
    let links = [
        HeaderLink { href: "/capture", text: "Snap your fridge" },
        HeaderLink { href: "/ingredients", text: "Ingredients" },
        HeaderLink { href: "/recipes", text: "Recipes" },
        HeaderLink { href: "/about", text: "About" },
    ];

    html! {
      header .site-header {
        a .logo href="/" { "FridgeToPlate" }

        nav {
          ul {
            @for link in &links {
              (link)
            }
          }
        }
      }
    }
}

pub fn base(title: &str, inner: Markup) -> Markup {
    html! {
      (DOCTYPE)
      html lang="en" {
        (head(title))

        body {
          (header())

          main .container {
            (inner)
          }
        }
      }
    }
}

pub fn not_found_page() -> Markup {
    base(
        "Not found",
        html! {
          h1 { "Page not found" }
          p { "We couldn't find what you were looking for." }
          a .button href="/" { "Back to the kitchen" }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> Markup {
    base(
        "Error",
        html! {
          h1 { (status.canonical_reason().unwrap_or("Error")) }
          p .error { (message) }
          a .button href="/" { "Back to the kitchen" }
        },
    )
}
