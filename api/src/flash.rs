//! One-shot messages carried across a redirect in a signed cookie.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies, Key};

const FLASH_COOKIE_NAME: &str = "_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ValuedMessage {
    #[serde(rename = "_")]
    value: Vec<FlashMessage>,
}

fn encode(messages: Vec<FlashMessage>) -> Option<String> {
    let json = serde_json::to_vec(&ValuedMessage { value: messages }).ok()?;
    Some(URL_SAFE_NO_PAD.encode(json))
}

fn decode(raw: &str) -> Option<Vec<FlashMessage>> {
    let json = URL_SAFE_NO_PAD.decode(raw).ok()?;
    serde_json::from_slice::<ValuedMessage>(&json)
        .ok()
        .map(|message| message.value)
}

fn flash_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE_NAME, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(Duration::seconds(60));
    cookie
}

/// Access to the flash cookie of the current request.
pub struct Flash {
    cookies: Cookies,
    key: Key,
}

impl Flash {
    /// Returns pending messages and clears them.
    pub fn take(&self) -> Vec<FlashMessage> {
        let signed = self.cookies.signed(&self.key);
        let Some(cookie) = signed.get(FLASH_COOKIE_NAME) else {
            return Vec::new();
        };
        signed.remove(flash_cookie(String::new()));

        decode(cookie.value()).unwrap_or_default()
    }

    /// Stores `messages` and redirects to `to` with `303 See Other`.
    pub fn redirect(&self, to: &str, messages: Vec<FlashMessage>) -> Response {
        if !messages.is_empty() {
            match encode(messages) {
                Some(value) => self.cookies.signed(&self.key).add(flash_cookie(value)),
                None => tracing::warn!("dropping flash messages that failed to serialize"),
            }
        }

        Redirect::to(to).into_response()
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;

        Ok(Self {
            cookies,
            key: Key::from_ref(state),
        })
    }
}
