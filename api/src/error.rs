use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use blogly_service::sea_orm::DbErr;
use blogly_service::{Resource, ServiceError};
use tera::Context;

use crate::envelope;
use crate::negotiate::Format;
use crate::state::AppState;

/// Served when the not-found template cannot be rendered.
const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Not Found</title></head>\n\
<body>\n<h1>Not Found</h1>\n<p>The requested page does not exist.</p>\n\
<p><a href=\"/\">Back home</a></p>\n</body>\n</html>\n";

/// Marks a response that should carry the site's HTML 404 page.
#[derive(Debug, Clone, Copy)]
struct NotFoundPage;

/// Swaps the plain 404 body for the rendered `not_found.html.tera`.
pub async fn render_not_found(State(state): State<AppState>, response: Response) -> Response {
    if response.extensions().get::<NotFoundPage>().is_none() {
        return response;
    }

    match state.templates.render("not_found.html.tera", &Context::new()) {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render the not found page");
            response
        }
    }
}

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid {1} ID")]
    NotFound(Format, Resource),
    /// Validation failure on a JSON request
    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
    #[error("invalid request body: {0}")]
    BadRequest(String),
    #[error("no acceptable representation")]
    NotAcceptable,
    /// No route matches the request path
    #[error("page not found")]
    NoRoute,
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error(transparent)]
    Template(#[from] tera::Error),
}

impl AppError {
    /// Maps a service failure for a request answered in `format`.
    pub fn from_service(err: ServiceError, format: Format) -> Self {
        match err {
            ServiceError::Validation(errors) => Self::Invalid(errors),
            ServiceError::NotFound(resource) => Self::NotFound(format, resource),
            ServiceError::Db(err) => Self::Db(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(Format::Json, _) => {
                envelope::error(StatusCode::NOT_FOUND, vec![self.to_string()])
            }
            Self::NotFound(Format::Html, _) | Self::NoRoute => {
                let mut response = (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
                response.extensions_mut().insert(NotFoundPage);
                response
            }
            Self::Invalid(errors) => envelope::error(StatusCode::BAD_REQUEST, errors),
            Self::BadRequest(_) => envelope::error(StatusCode::BAD_REQUEST, vec![self.to_string()]),
            Self::NotAcceptable => {
                (StatusCode::NOT_ACCEPTABLE, "Not Acceptable").into_response()
            }
            Self::Db(_) | Self::Template(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
