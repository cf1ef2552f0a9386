use std::fmt::Debug;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;

use crate::http_server::templates;

/// An error on its way to becoming an HTML response.
#[derive(Error)]
#[error("{0}")]
pub struct ServerError(pub(crate) eyre::Report, pub(crate) StatusCode);

impl Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Status Code: {}\n", self.1))?;
        f.write_str("ServerError: \n")?;

        Debug::fmt(&self.0, f)
    }
}

impl ServerError {
    fn report(&self) {
        if self.1.is_server_error() {
            sentry::capture_error(self);

            tracing::error!(error = ?self.0, status = %self.1, "ServerError");
        } else {
            tracing::warn!(error = %self.0, status = %self.1, "Request rejected");
        }
    }

    /// What the client gets to see. Server side failures stay vague.
    fn public_message(&self) -> String {
        if self.1.is_server_error() {
            "Something went wrong on our end".to_string()
        } else {
            self.0.to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.report();

        let page = if self.1 == StatusCode::NOT_FOUND {
            templates::not_found_page()
        } else {
            templates::error_page(self.1, &self.public_message())
        };

        (self.1, page).into_response()
    }
}

impl From<eyre::Report> for ServerError {
    fn from(err: eyre::Report) -> Self {
        ServerError(err, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// The same failures as [`ServerError`], answered as
/// `{"success": false, "error": ...}` for the JSON endpoints.
#[derive(Debug)]
pub struct JsonError(pub(crate) ServerError);

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let JsonError(err) = self;
        err.report();

        let body = json!({
            "success": false,
            "error": err.public_message(),
        });

        (err.1, Json(body)).into_response()
    }
}

impl From<ServerError> for JsonError {
    fn from(err: ServerError) -> Self {
        JsonError(err)
    }
}

impl From<eyre::Report> for JsonError {
    fn from(err: eyre::Report) -> Self {
        JsonError(err.into())
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError>;
}

impl<T, E> WithStatus<T> for Result<T, E>
where
    E: Into<eyre::Report>,
{
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.map_err(|e| ServerError(e.into(), status))
    }
}
