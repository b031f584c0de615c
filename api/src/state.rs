use axum::extract::FromRef;
use axum::response::Html;
use blogly_service::sea_orm::DatabaseConnection;
use tera::{Context, Tera};
use tower_cookies::Key;

use crate::error::AppError;
use crate::flash::Flash;

const TEMPLATE_GLOB: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*");

#[derive(Clone)]
pub struct AppState {
    pub templates: Tera,
    pub conn: DatabaseConnection,
    pub key: Key,
}

impl AppState {
    pub fn new(conn: DatabaseConnection, key: Key) -> Result<Self, tera::Error> {
        let mut templates = Tera::new(TEMPLATE_GLOB)?;
        templates.autoescape_on(vec![".html.tera"]);

        Ok(Self {
            templates,
            conn,
            key,
        })
    }

    /// Renders a page, handing it any pending flash messages.
    pub fn page(
        &self,
        name: &str,
        mut ctx: Context,
        flash: &Flash,
    ) -> Result<Html<String>, AppError> {
        ctx.insert("flashes", &flash.take());
        Ok(Html(self.templates.render(name, &ctx)?))
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
