mod config;
mod envelope;
mod error;
mod flash;
mod handlers;
mod negotiate;
mod payload;
mod state;

use std::path::Path;

use axum::Router;
use axum::middleware::map_response_with_state;
use axum::routing::{get, post};
use blogly_service::sea_orm::{ConnectOptions, Database};
use clap::Parser;
use migration::{Migrator, MigratorTrait};
use tower_cookies::CookieManagerLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use flash::{FlashKind, FlashMessage};
pub use negotiate::Format;
pub use state::AppState;

use handlers::{home, posts, tags, users};

const DEFAULT_LOG_FILTER: &str = "info,blogly_api=debug,blogly_service=debug";

pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(home::homepage))
        .route("/users", get(users::list))
        .route("/users/new", get(users::new_form).post(users::create))
        .route(
            "/users/{id}",
            get(users::show).patch(users::update).delete(users::delete),
        )
        .route("/users/{id}/edit", get(users::edit_form).post(users::edit))
        .route("/users/{id}/delete", post(users::remove))
        .route("/users/{id}/posts", get(users::list_posts))
        .route(
            "/users/{id}/posts/new",
            get(users::new_post_form).post(users::create_post),
        )
        .route(
            "/posts/{id}",
            get(posts::show).patch(posts::update).delete(posts::delete),
        )
        .route("/posts/{id}/edit", get(posts::edit_form).post(posts::edit))
        .route("/posts/{id}/delete", post(posts::remove))
        .route("/tags", get(tags::list))
        .route("/tags/new", get(tags::new_form).post(tags::create))
        .route(
            "/tags/{id}",
            get(tags::show).patch(tags::update).delete(tags::delete),
        )
        .route("/tags/{id}/edit", get(tags::edit_form).post(tags::edit))
        .route("/tags/{id}/delete", post(tags::remove))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(home::not_found)
        .layer(map_response_with_state(state.clone(), error::render_not_found))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut options = ConnectOptions::new(config.database_url()?);
    options
        .sqlx_logging(config.echo_sql)
        .sqlx_logging_level(log::LevelFilter::Debug);
    let conn = Database::connect(options).await?;
    Migrator::up(&conn, None).await?;

    let state = AppState::new(conn, config.cookie_key()?)?;
    let app = router(state, config.static_dir());

    let server_url = config.server_url();
    let listener = tokio::net::TcpListener::bind(&server_url).await?;
    tracing::info!("listening on http://{server_url}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
}

pub fn main() {
    let result = start();

    if let Some(err) = result.err() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
