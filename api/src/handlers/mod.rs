pub mod home;
pub mod posts;
pub mod tags;
pub mod users;

use axum::response::Response;
use blogly_service::{Resource, ServiceError};
use serde_json::Value;

use crate::envelope;
use crate::error::AppError;
use crate::flash::{Flash, FlashMessage};
use crate::negotiate::Format;

/// Path IDs that are not integers name nothing, so they are not found.
fn parse_id(raw: &str, format: Format, resource: Resource) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format, resource))
}

/// Answers a form submission.
///
/// Success flashes `message` and redirects to the page `target` picks.
/// Validation errors are flashed one by one and send the browser back to
/// `retry`.
fn form_redirect<T>(
    flash: &Flash,
    result: Result<T, ServiceError>,
    retry: &str,
    message: &str,
    target: impl FnOnce(T) -> String,
) -> Result<Response, AppError> {
    match result {
        Ok(value) => Ok(flash.redirect(&target(value), vec![FlashMessage::success(message)])),
        Err(ServiceError::Validation(errors)) => {
            let messages = errors.into_iter().map(FlashMessage::error).collect();
            Ok(flash.redirect(retry, messages))
        }
        Err(err) => Err(AppError::from_service(err, Format::Html)),
    }
}

/// Answers an API call with a success envelope built from the result.
fn json_reply<T>(
    result: Result<T, ServiceError>,
    payload: impl FnOnce(T) -> Value,
) -> Result<Response, AppError> {
    result
        .map(|value| envelope::success(payload(value)))
        .map_err(|err| AppError::from_service(err, Format::Json))
}
