use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use color_eyre::eyre::eyre;
use maud::{html, Markup};
use tower_cookies::Cookies;

use crate::{
    http_server::{
        cookies::remember_recognized, templates::base, ResponseResult, ServerError, WithStatus as _,
    },
    AppState,
};

fn capture_page(error: Option<&str>) -> Markup {
    base(
        "Snap your fridge",
        html! {
          h1 { "Snap your fridge" }
          p { "Upload a photo of your fridge or pantry and we'll pick out the ingredients." }

          @if let Some(error) = error {
            p .error { (error) }
          }

          form action="/capture" method="post" enctype="multipart/form-data" .card {
            input type="file" name="image" accept="image/png,image/jpeg" required;
            button type="submit" .button { "Recognize ingredients" }
          }
        },
    )
}

pub(crate) async fn capture_get() -> Markup {
    capture_page(None)
}

pub(crate) async fn capture_post(
    State(state): State<AppState>,
    cookies: Cookies,
    multipart: Multipart,
) -> ResponseResult {
    match recognize_upload(&state, multipart).await {
        Ok(ingredients) => {
            remember_recognized(&cookies, &state.cookie_key, &ingredients)
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

            Ok(Redirect::to("/ingredients").into_response())
        }
        Err(ServerError(err, status)) if status.is_client_error() => {
            tracing::warn!(error = %err, "Rejected upload");

            Ok((status, capture_page(Some(&err.to_string()))).into_response())
        }
        Err(err) => Err(err),
    }
}

fn multipart_error(err: MultipartError) -> ServerError {
    let status = err.status();

    ServerError(err.into(), status)
}

/// Saves the `image` field of an upload, recognizes what's in it and adds any
/// new ingredients to the store. Returns every recognized name, including
/// ones that were already stored.
pub(crate) async fn recognize_upload(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Vec<String>, ServerError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, contents));
        break;
    }

    let Some((filename, contents)) = upload else {
        return Err(ServerError(eyre!("No file part"), StatusCode::BAD_REQUEST));
    };

    if filename.is_empty() {
        return Err(ServerError(eyre!("No selected file"), StatusCode::BAD_REQUEST));
    }

    if !state.app.uploads.allowed_file(&filename) {
        return Err(ServerError(
            eyre!("File type not allowed"),
            StatusCode::BAD_REQUEST,
        ));
    }

    let path = state
        .app
        .uploads
        .save(&filename, &contents)
        .await
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;

    let ingredients = state
        .vision
        .recognize_ingredients(&state.cookbook.vocabulary, &filename, &contents)
        .await;

    for name in &ingredients {
        state
            .ingredients
            .add(name, None)
            .await
            .with_status(StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    tracing::info!(
        path = %path.display(),
        recognized = ?ingredients,
        "Recognized ingredients in upload"
    );

    Ok(ingredients)
}
