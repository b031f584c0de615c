//! JSON response envelopes: `{"type": "success", ...}` and
//! `{"type": "error", "errors": [...]}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};

/// A success envelope carrying the fields of `payload`, which must be a JSON
/// object or `null`.
pub fn success(payload: Value) -> Response {
    let mut body = Map::new();
    body.insert("type".to_owned(), Value::from("success"));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }

    Json(Value::Object(body)).into_response()
}

pub fn error(status: StatusCode, errors: Vec<String>) -> Response {
    (status, Json(json!({ "type": "error", "errors": errors }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_merges_payload() {
        let response = success(json!({ "user_id": 3 }));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_of(response).await,
            json!({ "type": "success", "user_id": 3 })
        );
    }

    #[tokio::test]
    async fn bare_success() {
        assert_eq!(body_of(success(Value::Null)).await, json!({ "type": "success" }));
    }

    #[tokio::test]
    async fn error_lists_every_message() {
        let response = error(
            StatusCode::BAD_REQUEST,
            vec!["missing parameter: title".to_owned(), "Invalid tag ID 2".to_owned()],
        );
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_of(response).await,
            json!({
                "type": "error",
                "errors": ["missing parameter: title", "Invalid tag ID 2"],
            })
        );
    }
}
