//! Request bodies, read according to their `Content-Type`.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use mime::Mime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

const TAG_FIELD_PREFIX: &str = "tag_";

/// A decoded request body.
///
/// JSON bodies are kept as sent. Urlencoded form bodies become an object of
/// strings, so both arrive at the same parameter types.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    fields: Value,
    form: bool,
}

impl Payload {
    /// An empty body or a JSON `null` reads as an empty object.
    pub fn json(bytes: &[u8]) -> Result<Self, AppError> {
        let fields = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(bytes).map_err(|e| AppError::BadRequest(e.to_string()))?
        };
        let fields = match fields {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        Ok(Self { fields, form: false })
    }

    pub fn form(bytes: &[u8]) -> Result<Self, AppError> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_bytes(bytes).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let fields = pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<Map<_, _>>();

        Ok(Self {
            fields: Value::Object(fields),
            form: true,
        })
    }

    /// Folds `tag_<id>` checkbox fields into a `tags` list. A form always
    /// names its full tag set, so the list is present even when empty.
    pub fn with_form_tags(mut self) -> Self {
        if !self.form {
            return self;
        }

        if let Value::Object(fields) = &mut self.fields {
            let tag_keys: Vec<String> = fields
                .keys()
                .filter(|key| key.starts_with(TAG_FIELD_PREFIX))
                .cloned()
                .collect();
            let tags = tag_keys
                .into_iter()
                .filter_map(|key| {
                    fields.remove(&key);
                    key.strip_prefix(TAG_FIELD_PREFIX).map(Value::from)
                })
                .collect();
            fields.insert("tags".to_owned(), Value::Array(tags));
        }

        self
    }

    pub fn parse<T: DeserializeOwned>(self) -> Result<T, AppError> {
        serde_json::from_value(self.fields).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok())
            .is_some_and(|mime| {
                mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
            });

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if is_json {
            Self::json(&bytes)
        } else {
            Self::form(&bytes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogly_service::{PostParams, TagRef, UserParams};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_body_is_an_empty_object() {
        let params: UserParams = Payload::json(b"").unwrap().parse().unwrap();
        assert_eq!(params, UserParams::default());
    }

    #[test]
    fn null_json_body_is_an_empty_object() {
        let params: UserParams = Payload::json(b" null ").unwrap().parse().unwrap();
        assert_eq!(params, UserParams::default());
    }

    #[test]
    fn malformed_json_is_a_bad_request() {
        assert!(matches!(
            Payload::json(b"{\"first_name\": "),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn form_fields_are_strings() {
        let params: UserParams = Payload::form(b"first_name=Ada&last_name=Lovelace&image_url=")
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(params.first_name.as_deref(), Some("Ada"));
        assert_eq!(params.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(params.image_url, Some(Some(String::new())));
    }

    #[test]
    fn tag_checkboxes_become_a_tag_list() {
        let params: PostParams = Payload::form(b"title=T&content=C&tag_3=on&tag_1=on")
            .unwrap()
            .with_form_tags()
            .parse()
            .unwrap();
        let mut tags = params.tags.unwrap();
        tags.sort_by_key(|tag| tag.to_string());
        assert_eq!(
            tags,
            vec![TagRef::Text("1".to_owned()), TagRef::Text("3".to_owned())]
        );
    }

    #[test]
    fn form_without_checkboxes_clears_tags() {
        let params: PostParams = Payload::form(b"title=T&content=C")
            .unwrap()
            .with_form_tags()
            .parse()
            .unwrap();
        assert_eq!(params.tags, Some(vec![]));
    }

    #[test]
    fn json_tags_are_left_alone() {
        let params: PostParams = Payload::json(br#"{"title": "T"}"#)
            .unwrap()
            .with_form_tags()
            .parse()
            .unwrap();
        assert_eq!(params.tags, None);
    }
}
