use axum::extract::State;
use axum::response::Html;
use blogly_service::Query;
use tera::Context;

use crate::error::AppError;
use crate::flash::Flash;
use crate::state::AppState;

const RECENT_POSTS: u64 = 5;

pub async fn homepage(
    State(state): State<AppState>,
    flash: Flash,
) -> Result<Html<String>, AppError> {
    let posts = Query::find_recent_posts(&state.conn, RECENT_POSTS).await?;

    let mut ctx = Context::new();
    ctx.insert("posts", &posts);
    state.page("homepage.html.tera", ctx, &flash)
}

pub async fn not_found() -> AppError {
    AppError::NoRoute
}
